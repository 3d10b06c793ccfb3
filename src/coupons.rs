//! Coupons
//!
//! A coupon is a code plus a discount amount. Eligibility (minimum order
//! value, vendor scope) is decided by a [`CouponValidator`], normally the
//! backend; [`CouponBook`] is an in-memory validator for fixtures and tests.
//! Whatever the validator returns, [`apply_discount`] never lets the payable
//! total drop below zero.

use std::fmt;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::{major_from_minor, round_minor};

/// Message shown to shoppers for any rejected code.
pub const INVALID_COUPON_MESSAGE: &str = "Invalid coupon code";

/// A coupon code, trimmed and upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CouponCode(String);

impl CouponCode {
    /// Normalize a code as typed by a shopper.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_uppercase())
    }

    /// The normalized code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CouponCode {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

impl From<&str> for CouponCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<CouponCode> for String {
    fn from(code: CouponCode) -> Self {
        code.0
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated coupon ready to apply to a checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct Coupon<'a> {
    code: CouponCode,
    discount: Money<'a, Currency>,
}

impl<'a> Coupon<'a> {
    /// Create a coupon. Negative discounts are treated as zero.
    pub fn new(code: impl Into<CouponCode>, discount: Money<'a, Currency>) -> Self {
        let discount = if discount.to_minor_units() < 0 {
            Money::from_minor(0, discount.currency())
        } else {
            discount
        };

        Self {
            code: code.into(),
            discount,
        }
    }

    /// The coupon code.
    pub fn code(&self) -> &CouponCode {
        &self.code
    }

    /// The discount granted by the coupon.
    pub fn discount(&self) -> Money<'a, Currency> {
        self.discount
    }
}

/// Why a coupon code was not accepted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CouponRejection {
    /// No coupon with this code exists.
    #[error("unknown coupon code {0}")]
    UnknownCode(CouponCode),

    /// The cart total is below the coupon's minimum order value.
    #[error(
        "coupon {code} needs an order of at least {}, cart total is {}",
        display_minor(.minimum_minor),
        display_minor(.cart_total_minor)
    )]
    BelowMinimum {
        /// The rejected code
        code: CouponCode,
        /// Minimum order value, minor units
        minimum_minor: i64,
        /// Cart total at validation time, minor units
        cart_total_minor: i64,
    },

    /// The coupon is limited to a vendor the cart is not from.
    #[error("coupon {code} is only valid for vendor {vendor_id}")]
    VendorMismatch {
        /// The rejected code
        code: CouponCode,
        /// Vendor the coupon is scoped to
        vendor_id: String,
    },
}

impl CouponRejection {
    /// The message shown to the shopper. Details stay in logs.
    #[expect(
        clippy::unused_self,
        reason = "shoppers see one message whatever the reason"
    )]
    pub fn user_message(&self) -> &'static str {
        INVALID_COUPON_MESSAGE
    }
}

#[expect(
    clippy::trivially_copy_pass_by_ref,
    reason = "thiserror hands format arguments over by reference"
)]
fn display_minor(minor: &i64) -> Decimal {
    major_from_minor(*minor)
}

/// Validates coupon codes against a cart.
pub trait CouponValidator {
    /// Check `code` for a cart with the given total and vendor.
    ///
    /// # Errors
    ///
    /// Returns a [`CouponRejection`] when the code does not exist or the cart
    /// is not eligible.
    fn validate<'a>(
        &self,
        code: &CouponCode,
        cart_total: Money<'a, Currency>,
        vendor_id: Option<&str>,
    ) -> Result<Coupon<'a>, CouponRejection>;
}

/// How a coupon's discount is worked out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CouponDiscount {
    /// A fixed amount off, in minor units
    Flat(i64),

    /// A percentage of the cart total, optionally capped (minor units)
    Percent {
        /// Share of the cart total
        percent: Percentage,
        /// Largest discount allowed, minor units
        cap_minor: Option<i64>,
    },
}

impl CouponDiscount {
    /// Discount in minor units for a cart total in minor units.
    pub fn amount_minor(&self, cart_total_minor: i64) -> i64 {
        match *self {
            CouponDiscount::Flat(amount) => amount.max(0),
            CouponDiscount::Percent { percent, cap_minor } => {
                let amount = Decimal::from(cart_total_minor)
                    .checked_mul(percent * Decimal::ONE)
                    .map_or(0, round_minor)
                    .max(0);

                cap_minor.map_or(amount, |cap| amount.min(cap))
            }
        }
    }
}

/// Eligibility rules for one coupon code.
#[derive(Debug, Clone, PartialEq)]
pub struct CouponRule {
    /// Normalized code
    pub code: CouponCode,

    /// Discount granted
    pub discount: CouponDiscount,

    /// Minimum cart total (inclusive, minor units)
    pub minimum_minor: Option<i64>,

    /// Vendor the coupon is limited to
    pub vendor_id: Option<String>,
}

impl CouponRule {
    /// A rule with no minimum and no vendor scope.
    pub fn new(code: impl Into<CouponCode>, discount: CouponDiscount) -> Self {
        Self {
            code: code.into(),
            discount,
            minimum_minor: None,
            vendor_id: None,
        }
    }

    /// Require a minimum cart total.
    #[must_use]
    pub fn with_minimum(mut self, minimum_minor: i64) -> Self {
        self.minimum_minor = Some(minimum_minor);
        self
    }

    /// Limit the coupon to one vendor.
    #[must_use]
    pub fn for_vendor(mut self, vendor_id: impl Into<String>) -> Self {
        self.vendor_id = Some(vendor_id.into());
        self
    }

    fn check<'a>(
        &self,
        cart_total: Money<'a, Currency>,
        vendor_id: Option<&str>,
    ) -> Result<Coupon<'a>, CouponRejection> {
        let cart_total_minor = cart_total.to_minor_units();

        if let Some(minimum_minor) = self.minimum_minor
            && cart_total_minor < minimum_minor
        {
            return Err(CouponRejection::BelowMinimum {
                code: self.code.clone(),
                minimum_minor,
                cart_total_minor,
            });
        }

        if let Some(scope) = &self.vendor_id
            && vendor_id != Some(scope.as_str())
        {
            return Err(CouponRejection::VendorMismatch {
                code: self.code.clone(),
                vendor_id: scope.clone(),
            });
        }

        Ok(Coupon::new(
            self.code.clone(),
            Money::from_minor(
                self.discount.amount_minor(cart_total_minor),
                cart_total.currency(),
            ),
        ))
    }
}

/// In-memory coupon validator keyed by normalized code.
#[derive(Debug, Clone, Default)]
pub struct CouponBook {
    rules: FxHashMap<CouponCode, CouponRule>,
}

impl CouponBook {
    /// An empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a rule.
    pub fn insert(&mut self, rule: CouponRule) {
        self.rules.insert(rule.code.clone(), rule);
    }

    /// Look up a rule by code.
    pub fn get(&self, code: &CouponCode) -> Option<&CouponRule> {
        self.rules.get(code)
    }

    /// Number of rules in the book.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the book has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<CouponRule> for CouponBook {
    fn from_iter<I: IntoIterator<Item = CouponRule>>(iter: I) -> Self {
        let mut book = Self::new();

        for rule in iter {
            book.insert(rule);
        }

        book
    }
}

impl CouponValidator for CouponBook {
    fn validate<'a>(
        &self,
        code: &CouponCode,
        cart_total: Money<'a, Currency>,
        vendor_id: Option<&str>,
    ) -> Result<Coupon<'a>, CouponRejection> {
        self.rules
            .get(code)
            .ok_or_else(|| CouponRejection::UnknownCode(code.clone()))?
            .check(cart_total, vendor_id)
    }
}

/// Subtract a discount from a total, flooring the result at zero.
pub fn apply_discount<'a>(
    pre_discount_total: Money<'a, Currency>,
    discount: Money<'a, Currency>,
) -> Money<'a, Currency> {
    Money::from_minor(
        apply_discount_minor(
            pre_discount_total.to_minor_units(),
            discount.to_minor_units(),
        ),
        pre_discount_total.currency(),
    )
}

/// [`apply_discount`] on minor units.
pub fn apply_discount_minor(pre_discount_total_minor: i64, discount_minor: i64) -> i64 {
    pre_discount_total_minor.saturating_sub(discount_minor).max(0)
}
