//! Fixtures
//!
//! YAML carts and coupon books, read from `<base>/carts/<name>.yml` and
//! `<base>/coupons/<name>.yml`.

use std::{fs, path::PathBuf};

use rusty_money::iso::{Currency, INR};
use thiserror::Error;
use tracing::debug;

use crate::{
    cart::{Cart, CartError},
    coupons::CouponBook,
    fixtures::{carts::CartFixture, coupons::CouponsFixture},
    lines::CartLine,
};

pub mod carts;
pub mod coupons;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between amounts
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Unsupported coupon kind
    #[error("Unsupported coupon kind: {0}")]
    UnsupportedCouponKind(String),

    /// Invalid coupon data
    #[error("Invalid coupon data: {0}")]
    InvalidCouponData(String),

    /// Cart creation error
    #[error("Failed to create cart: {0}")]
    Cart(#[from] CartError),
}

/// Fixture
#[derive(Debug, Clone)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Currency for the fixture set, fixed by the first priced cart line
    currency: Option<&'static Currency>,
}

impl Fixture {
    /// Create a new fixture reader with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new fixture reader with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            currency: None,
        }
    }

    /// Load a cart from a YAML fixture file
    ///
    /// An empty cart is priced in INR unless an earlier cart fixed the currency.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if a line is
    /// invalid, or if lines are priced in different currencies.
    pub fn load_cart(&mut self, name: &str) -> Result<Cart<'static>, FixtureError> {
        let file_path = self.base_path.join("carts").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CartFixture = serde_norway::from_str(&contents)?;

        let lines = fixture
            .lines
            .into_iter()
            .map(CartLine::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        for line in &lines {
            let currency = line.unit_price().currency();

            match self.currency {
                Some(existing) if existing != currency => {
                    return Err(FixtureError::CurrencyMismatch(
                        existing.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
                Some(_) => {}
                None => self.currency = Some(currency),
            }
        }

        debug!(cart = name, lines = lines.len(), "loaded cart fixture");

        Ok(Cart::with_lines(lines, self.currency())?)
    }

    /// Load a coupon book from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a coupon
    /// is invalid or priced in another currency.
    pub fn load_coupons(&self, name: &str) -> Result<CouponBook, FixtureError> {
        let file_path = self.base_path.join("coupons").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CouponsFixture = serde_norway::from_str(&contents)?;
        let currency = self.currency();

        let book = fixture
            .coupons
            .into_iter()
            .map(|(code, coupon)| coupon.try_into_rule(&code, currency))
            .collect::<Result<CouponBook, _>>()?;

        debug!(book = name, coupons = book.len(), "loaded coupon fixture");

        Ok(book)
    }

    /// Currency of the loaded carts, INR before any cart is loaded
    pub fn currency(&self) -> &'static Currency {
        self.currency.unwrap_or(INR)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use rusty_money::{Money, iso::INR};
    use tempfile::TempDir;
    use testresult::TestResult;

    use super::*;
    use crate::coupons::{CouponCode, CouponValidator};

    fn write_fixture(base: &Path, category: &str, name: &str, contents: &str) -> TestResult {
        let dir = base.join(category);

        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("{name}.yml")), contents)?;

        Ok(())
    }

    const CART: &str = "\
lines:
  - product: kurta
    name: Cotton Kurta
    vendor: jaipur-looms
    price: 1499.00 INR
    quantity: 2
    gst: 12
  - product: tiffin
    name: Steel Tiffin
    vendor: jaipur-looms
    price: 450.00 INR
    gst: 18
";

    #[test]
    fn fixture_loads_cart() -> TestResult {
        let dir = TempDir::new()?;

        write_fixture(dir.path(), "carts", "small", CART)?;

        let mut fixture = Fixture::with_base_path(dir.path());
        let cart = fixture.load_cart("small")?;

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.subtotal(), Money::from_minor(344_800, INR));
        assert_eq!(cart.vendor_id(), Some("jaipur-looms"));
        assert_eq!(fixture.currency(), INR);

        Ok(())
    }

    #[test]
    fn fixture_loads_empty_cart_in_inr() -> TestResult {
        let dir = TempDir::new()?;

        write_fixture(dir.path(), "carts", "empty", "lines: []\n")?;

        let cart = Fixture::with_base_path(dir.path()).load_cart("empty")?;

        assert!(cart.is_empty());
        assert_eq!(cart.currency(), INR);

        Ok(())
    }

    #[test]
    fn fixture_rejects_mixed_currencies() -> TestResult {
        let dir = TempDir::new()?;

        write_fixture(
            dir.path(),
            "carts",
            "mixed",
            "lines:\n  - {product: a, name: A, price: 1.00 INR}\n  - {product: b, name: B, price: 1.00 USD}\n",
        )?;

        let result = Fixture::with_base_path(dir.path()).load_cart("mixed");

        assert!(matches!(result, Err(FixtureError::CurrencyMismatch(_, _))));

        Ok(())
    }

    #[test]
    fn fixture_rejects_zero_quantity() -> TestResult {
        let dir = TempDir::new()?;

        write_fixture(
            dir.path(),
            "carts",
            "zero",
            "lines:\n  - {product: a, name: A, price: 1.00 INR, quantity: 0}\n",
        )?;

        let result = Fixture::with_base_path(dir.path()).load_cart("zero");

        assert!(matches!(result, Err(FixtureError::Cart(CartError::ZeroQuantity(0)))));

        Ok(())
    }

    #[test]
    fn fixture_loads_coupon_book() -> TestResult {
        let dir = TempDir::new()?;

        write_fixture(
            dir.path(),
            "coupons",
            "default",
            "coupons:\n  welcome100:\n    kind: flat\n    amount: 100.00 INR\n    minimum: 999.00 INR\n",
        )?;

        let book = Fixture::with_base_path(dir.path()).load_coupons("default")?;
        let coupon = book.validate(
            &CouponCode::new("WELCOME100"),
            Money::from_minor(100_000, INR),
            None,
        )?;

        assert_eq!(book.len(), 1);
        assert_eq!(coupon.discount(), Money::from_minor(10_000, INR));

        Ok(())
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = Fixture::with_base_path("/nonexistent").load_coupons("default");

        assert!(matches!(result, Err(FixtureError::Io(_))));
    }

    #[test]
    fn default_reads_from_fixtures_dir() {
        let fixture = Fixture::default();

        assert_eq!(fixture.base_path, PathBuf::from("./fixtures"));
        assert_eq!(fixture.currency(), INR);
    }
}
