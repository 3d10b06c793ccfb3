//! Cart Fixtures

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, INR, USD},
};
use serde::Deserialize;

use crate::{fixtures::FixtureError, lines::CartLine, money::minor_from_major, tax::GstRate};

/// Wrapper for cart lines in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Cart lines, in display order
    #[serde(default)]
    pub lines: Vec<CartLineFixture>,
}

/// Cart Line Fixture
#[derive(Debug, Deserialize)]
pub struct CartLineFixture {
    /// Product id
    pub product: String,

    /// Product name
    pub name: String,

    /// Selling vendor
    #[serde(default)]
    pub vendor: Option<String>,

    /// Unit price (e.g., "1499.00 INR")
    pub price: String,

    /// Units in the cart
    #[serde(default = "one")]
    pub quantity: u32,

    /// GST rate in percentage points; omitted means exempt
    #[serde(default)]
    pub gst: Decimal,
}

fn one() -> u32 {
    1
}

impl TryFrom<CartLineFixture> for CartLine<'_> {
    type Error = FixtureError;

    fn try_from(fixture: CartLineFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;

        if minor_units < 0 {
            return Err(FixtureError::InvalidPrice(fixture.price));
        }

        if fixture.gst.is_sign_negative() && !fixture.gst.is_zero() {
            return Err(FixtureError::InvalidPercentage(fixture.gst.to_string()));
        }

        let line = CartLine::new(
            fixture.product,
            fixture.name,
            Money::from_minor(minor_units, currency),
            fixture.quantity,
            GstRate::new(fixture.gst),
        );

        Ok(match fixture.vendor {
            Some(vendor) => line.with_vendor(vendor),
            None => line,
        })
    }
}

/// Parse price string (e.g., "1499.00 INR") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(currency_code), None) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let minor_units = amount
        .parse::<Decimal>()
        .ok()
        .and_then(minor_from_major)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match currency_code {
        "INR" => INR,
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    Ok((minor_units, currency))
}

/// Parse percentage string (e.g., "10%" or "0.10") into a `Percentage`
///
/// # Errors
///
/// Returns an error if the string cannot be parsed.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();

    let (number, scale) = match trimmed.strip_suffix('%') {
        Some(points) => (points.trim(), Decimal::ONE_HUNDRED),
        None => (trimmed, Decimal::ONE),
    };

    let value = number
        .parse::<Decimal>()
        .ok()
        .and_then(|value| value.checked_div(scale))
        .and_then(|value| value.to_f64())
        .ok_or_else(|| FixtureError::InvalidPercentage(s.to_string()))?;

    Ok(Percentage::from(value))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parse_price_reads_rupees() -> TestResult {
        let (minor, currency) = parse_price("1499.00 INR")?;

        assert_eq!(minor, 149_900);
        assert_eq!(currency, INR);

        Ok(())
    }

    #[test]
    fn parse_price_rounds_sub_paise_half_away_from_zero() -> TestResult {
        assert_eq!(parse_price("0.005 INR")?.0, 1);
        assert_eq!(parse_price("2.994 INR")?.0, 299);

        Ok(())
    }

    #[test]
    fn parse_price_rejects_invalid_format() {
        assert!(matches!(parse_price("1499INR"), Err(FixtureError::InvalidPrice(_))));
        assert!(matches!(parse_price("1 499 INR"), Err(FixtureError::InvalidPrice(_))));
        assert!(matches!(parse_price("abc INR"), Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_percentage_accepts_both_formats() -> TestResult {
        let points = parse_percentage("10%")?;
        let fraction = parse_percentage("0.1")?;

        assert_eq!(points * Decimal::ONE_HUNDRED, Decimal::from(10));
        assert_eq!(fraction * Decimal::ONE_HUNDRED, Decimal::from(10));

        Ok(())
    }

    #[test]
    fn parse_percentage_rejects_garbage() {
        assert!(matches!(
            parse_percentage("ten%"),
            Err(FixtureError::InvalidPercentage(_))
        ));
    }

    #[test]
    fn line_fixture_defaults_quantity_and_gst() -> TestResult {
        let fixture: CartLineFixture =
            serde_norway::from_str("product: p1\nname: Atta\nprice: 450.00 INR\n")?;
        let line = CartLine::try_from(fixture)?;

        assert_eq!(line.quantity(), 1);
        assert_eq!(line.gst_rate(), GstRate::exempt());

        Ok(())
    }
}
