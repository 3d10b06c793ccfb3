//! Cart lines

use rusty_money::{Money, iso::Currency};

use crate::tax::GstRate;

/// One product line in a cart.
#[derive(Clone, Debug, PartialEq)]
pub struct CartLine<'a> {
    product_id: String,
    name: String,
    vendor_id: Option<String>,
    unit_price: Money<'a, Currency>,
    quantity: u32,
    gst_rate: GstRate,
}

impl<'a> CartLine<'a> {
    /// Creates a new line for `quantity` units of a product.
    pub fn new(
        product_id: impl Into<String>,
        name: impl Into<String>,
        unit_price: Money<'a, Currency>,
        quantity: u32,
        gst_rate: GstRate,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            vendor_id: None,
            unit_price,
            quantity,
            gst_rate,
        }
    }

    /// Sets the vendor selling this product.
    #[must_use]
    pub fn with_vendor(mut self, vendor_id: impl Into<String>) -> Self {
        self.vendor_id = Some(vendor_id.into());
        self
    }

    /// Backend product identifier
    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// Product display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Vendor selling the product, if known
    pub fn vendor_id(&self) -> Option<&str> {
        self.vendor_id.as_deref()
    }

    /// Price of a single unit, before tax
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Number of units
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// GST rate charged on this line
    pub fn gst_rate(&self) -> GstRate {
        self.gst_rate
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    /// Line total in minor units (unit price times quantity, tax excluded).
    pub fn line_total_minor(&self) -> i64 {
        self.unit_price
            .to_minor_units()
            .saturating_mul(i64::from(self.quantity))
    }

    /// Line total, tax excluded.
    pub fn line_total(&self) -> Money<'a, Currency> {
        Money::from_minor(self.line_total_minor(), self.unit_price.currency())
    }

    /// GST on the line total in minor units, rounded on its own.
    pub fn gst_minor(&self) -> i64 {
        self.gst_rate.tax_on_minor(self.line_total_minor())
    }

    /// GST on the line total, rounded on its own.
    pub fn gst_amount(&self) -> Money<'a, Currency> {
        Money::from_minor(self.gst_minor(), self.unit_price.currency())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso::INR;

    use super::*;

    #[test]
    fn line_total_is_price_times_quantity() {
        let line = CartLine::new(
            "kurta",
            "Cotton kurta",
            Money::from_minor(10_000, INR),
            2,
            GstRate::new(Decimal::from(18)),
        );

        assert_eq!(line.line_total(), Money::from_minor(20_000, INR));
        assert_eq!(line.gst_amount(), Money::from_minor(3_600, INR));
    }

    #[test]
    fn exempt_line_has_no_gst() {
        let line = CartLine::new(
            "atta",
            "Whole wheat atta",
            Money::from_minor(45_000, INR),
            1,
            GstRate::exempt(),
        );

        assert_eq!(line.gst_minor(), 0);
    }

    #[test]
    fn with_vendor_sets_vendor() {
        let line = CartLine::new(
            "diya",
            "Clay diya",
            Money::from_minor(4_900, INR),
            12,
            GstRate::new(Decimal::from(12)),
        )
        .with_vendor("vendor-jaipur");

        assert_eq!(line.vendor_id(), Some("vendor-jaipur"));
        assert_eq!(line.product_id(), "diya");
        assert_eq!(line.quantity(), 12);
    }
}
