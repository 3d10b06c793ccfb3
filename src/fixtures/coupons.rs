//! Coupon Fixtures

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use serde::Deserialize;

use crate::{
    coupons::{CouponDiscount, CouponRule},
    fixtures::{
        FixtureError,
        carts::{parse_percentage, parse_price},
    },
};

/// Wrapper for coupons in YAML
#[derive(Debug, Deserialize)]
pub struct CouponsFixture {
    /// Map of coupon code -> coupon fixture
    pub coupons: FxHashMap<String, CouponFixture>,
}

/// Coupon Fixture
#[derive(Debug, Deserialize)]
pub struct CouponFixture {
    /// Discount kind: `flat` or `percent`
    pub kind: String,

    /// Flat discount amount (e.g., "100.00 INR")
    #[serde(default)]
    pub amount: Option<String>,

    /// Percentage off (e.g., "10%")
    #[serde(default)]
    pub percent: Option<String>,

    /// Largest percentage discount (e.g., "500.00 INR")
    #[serde(default)]
    pub cap: Option<String>,

    /// Minimum cart total (e.g., "999.00 INR")
    #[serde(default)]
    pub minimum: Option<String>,

    /// Vendor the coupon is limited to
    #[serde(default)]
    pub vendor: Option<String>,
}

impl CouponFixture {
    /// Convert into a coupon rule for `code`, checking every amount is in `currency`.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind is unknown, a required field is missing,
    /// or an amount is malformed or in another currency.
    pub fn try_into_rule(
        self,
        code: &str,
        currency: &'static Currency,
    ) -> Result<CouponRule, FixtureError> {
        let discount = match self.kind.as_str() {
            "flat" => {
                let amount = self.amount.as_deref().ok_or_else(|| {
                    FixtureError::InvalidCouponData(format!("{code}: flat coupon needs an amount"))
                })?;

                CouponDiscount::Flat(price_in(amount, currency)?)
            }
            "percent" => {
                let percent = self.percent.as_deref().ok_or_else(|| {
                    FixtureError::InvalidCouponData(format!("{code}: percent coupon needs a percent"))
                })?;

                CouponDiscount::Percent {
                    percent: parse_percentage(percent)?,
                    cap_minor: self
                        .cap
                        .as_deref()
                        .map(|cap| price_in(cap, currency))
                        .transpose()?,
                }
            }
            other => return Err(FixtureError::UnsupportedCouponKind(other.to_string())),
        };

        let mut rule = CouponRule::new(code, discount);

        if let Some(minimum) = self.minimum.as_deref() {
            rule = rule.with_minimum(price_in(minimum, currency)?);
        }

        if let Some(vendor) = self.vendor {
            rule = rule.for_vendor(vendor);
        }

        Ok(rule)
    }
}

fn price_in(s: &str, currency: &'static Currency) -> Result<i64, FixtureError> {
    let (minor_units, price_currency) = parse_price(s)?;

    if price_currency != currency {
        return Err(FixtureError::CurrencyMismatch(
            currency.iso_alpha_code.to_string(),
            price_currency.iso_alpha_code.to_string(),
        ));
    }

    if minor_units < 0 {
        return Err(FixtureError::InvalidPrice(s.to_string()));
    }

    Ok(minor_units)
}
