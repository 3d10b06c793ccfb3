//! Billing
//!
//! Assembles the checkout summary: cart subtotal, GST, shipping and coupon
//! discount. The summary is recomputed from scratch whenever the cart or the
//! coupon changes; the backend recomputes it again when the order is created
//! and its figures win.

use rusty_money::{Money, iso::Currency};

use crate::{
    cart::Cart,
    coupons::{Coupon, CouponCode, apply_discount_minor},
    shipping::ShippingPolicy,
    tax::{TaxBreakdown, TaxGroup},
};

/// Settings passed into every billing computation.
///
/// Figures are always in the cart's own currency.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillingSettings {
    /// Shipping tier table
    pub shipping: ShippingPolicy,
}

/// The figures shown at checkout and sent with the order.
#[derive(Debug, Clone, PartialEq)]
pub struct BillingSummary<'a> {
    cart_total: Money<'a, Currency>,
    taxes: TaxBreakdown<'a>,
    shipping_charges: Money<'a, Currency>,
    coupon_code: Option<CouponCode>,
    coupon_discount: Money<'a, Currency>,
    total_amount: Money<'a, Currency>,
}

impl<'a> BillingSummary<'a> {
    /// Compute the summary for a cart and an optional applied coupon.
    ///
    /// `totalAmount = max(0, cart total + GST + shipping - discount)`.
    pub fn compute(
        cart: &Cart<'a>,
        coupon: Option<&Coupon<'a>>,
        settings: &BillingSettings,
    ) -> Self {
        let currency = cart.currency();

        debug_assert!(
            coupon.is_none_or(|coupon| coupon.discount().currency() == currency),
            "coupon discount must be in the cart currency"
        );

        let cart_total = cart.subtotal();
        let taxes = TaxBreakdown::from_cart(cart);
        let shipping_charges = settings.shipping.resolve(&cart_total);
        let coupon_discount = coupon.map_or(0, |coupon| coupon.discount().to_minor_units());

        let pre_discount_minor = cart_total
            .to_minor_units()
            .saturating_add(taxes.gst_amount().to_minor_units())
            .saturating_add(shipping_charges.to_minor_units());

        let total_minor = apply_discount_minor(pre_discount_minor, coupon_discount);

        Self {
            cart_total,
            taxes,
            shipping_charges,
            coupon_code: coupon.map(|coupon| coupon.code().clone()),
            coupon_discount: Money::from_minor(coupon_discount, currency),
            total_amount: Money::from_minor(total_minor, currency),
        }
    }

    /// Sum of line totals, before tax
    pub fn cart_total(&self) -> Money<'a, Currency> {
        self.cart_total
    }

    /// Headline GST: the sum of every line's rounded GST
    pub fn gst_amount(&self) -> Money<'a, Currency> {
        self.taxes.gst_amount()
    }

    /// GST grouped by rate, highest rate first
    pub fn tax_groups(&self) -> &[TaxGroup<'a>] {
        self.taxes.groups()
    }

    /// Shipping fee for the cart subtotal
    pub fn shipping_charges(&self) -> Money<'a, Currency> {
        self.shipping_charges
    }

    /// Code of the applied coupon, if any
    pub fn coupon_code(&self) -> Option<&CouponCode> {
        self.coupon_code.as_ref()
    }

    /// Discount requested by the applied coupon (zero without one)
    pub fn coupon_discount(&self) -> Money<'a, Currency> {
        self.coupon_discount
    }

    /// Cart total plus GST plus shipping, before the coupon
    pub fn pre_discount_total(&self) -> Money<'a, Currency> {
        Money::from_minor(
            self.cart_total
                .to_minor_units()
                .saturating_add(self.gst_amount().to_minor_units())
                .saturating_add(self.shipping_charges.to_minor_units()),
            self.cart_total.currency(),
        )
    }

    /// Amount payable, never negative
    pub fn total_amount(&self) -> Money<'a, Currency> {
        self.total_amount
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso::{GBP, INR};
    use testresult::TestResult;

    use super::*;
    use crate::{lines::CartLine, tax::GstRate};

    fn cart<'a>(lines: &[(i64, u32, i64)]) -> Result<Cart<'a>, crate::cart::CartError> {
        let lines: Vec<CartLine<'a>> = lines
            .iter()
            .map(|&(price, quantity, rate)| {
                CartLine::new(
                    "sku",
                    "Product",
                    Money::from_minor(price, INR),
                    quantity,
                    GstRate::new(Decimal::from(rate)),
                )
            })
            .collect();

        Cart::with_lines(lines, INR)
    }

    #[test]
    fn untaxed_cart_without_coupon() -> TestResult {
        let cart = cart(&[(250_000, 1, 0)])?;

        let summary = BillingSummary::compute(&cart, None, &BillingSettings::default());

        assert_eq!(summary.cart_total(), Money::from_minor(250_000, INR));
        assert_eq!(summary.gst_amount(), Money::from_minor(0, INR));
        assert_eq!(summary.shipping_charges(), Money::from_minor(30_000, INR));
        assert_eq!(summary.coupon_discount(), Money::from_minor(0, INR));
        assert_eq!(summary.coupon_code(), None);
        assert_eq!(summary.total_amount(), Money::from_minor(280_000, INR));

        Ok(())
    }

    #[test]
    fn taxed_cart_with_coupon() -> TestResult {
        // 5000.00 at 5% GST = 250.00
        let cart = cart(&[(500_000, 1, 5)])?;
        let coupon = Coupon::new("SAVE1000", Money::from_minor(100_000, INR));

        let summary = BillingSummary::compute(&cart, Some(&coupon), &BillingSettings::default());

        assert_eq!(summary.gst_amount(), Money::from_minor(25_000, INR));
        assert_eq!(summary.shipping_charges(), Money::from_minor(20_000, INR));
        assert_eq!(summary.pre_discount_total(), Money::from_minor(545_000, INR));
        assert_eq!(summary.total_amount(), Money::from_minor(445_000, INR));
        assert_eq!(summary.coupon_code().map(CouponCode::as_str), Some("SAVE1000"));

        Ok(())
    }

    #[test]
    fn oversized_coupon_floors_total_at_zero() -> TestResult {
        let cart = cart(&[(7_000, 1, 0)])?;
        let coupon = Coupon::new("HUGE", Money::from_minor(50_000, INR));

        let summary = BillingSummary::compute(&cart, Some(&coupon), &BillingSettings::default());

        assert_eq!(summary.pre_discount_total(), Money::from_minor(37_000, INR));
        assert_eq!(summary.total_amount(), Money::from_minor(0, INR));

        Ok(())
    }

    #[test]
    fn free_shipping_at_threshold() -> TestResult {
        let cart = cart(&[(300_000, 2, 12)])?;

        let summary = BillingSummary::compute(&cart, None, &BillingSettings::default());

        assert_eq!(summary.shipping_charges(), Money::from_minor(0, INR));
        assert_eq!(summary.gst_amount(), Money::from_minor(72_000, INR));
        assert_eq!(summary.total_amount(), Money::from_minor(672_000, INR));

        Ok(())
    }

    #[test]
    fn figures_follow_the_cart_currency() -> TestResult {
        let cart = Cart::with_lines(
            vec![CartLine::new(
                "sku",
                "Tea Towel",
                Money::from_minor(1_250, GBP),
                2,
                GstRate::new(Decimal::from(5)),
            )],
            GBP,
        )?;
        let coupon = Coupon::new("TEN", Money::from_minor(1_000, GBP));

        let summary = BillingSummary::compute(&cart, Some(&coupon), &BillingSettings::default());

        assert_eq!(summary.cart_total().currency(), GBP);
        assert_eq!(summary.shipping_charges().currency(), GBP);
        assert_eq!(summary.total_amount().currency(), GBP);
        // 25.00 + 1.25 GST + 300.00 shipping - 10.00
        assert_eq!(summary.total_amount().to_minor_units(), 31_625);

        Ok(())
    }

    #[test]
    fn settings_override_shipping() -> TestResult {
        let cart = cart(&[(100_000, 1, 0)])?;
        let settings = BillingSettings {
            shipping: ShippingPolicy::flat(4_900),
        };

        let summary = BillingSummary::compute(&cart, None, &settings);

        assert_eq!(summary.shipping_charges(), Money::from_minor(4_900, INR));
        assert_eq!(summary.total_amount(), Money::from_minor(104_900, INR));

        Ok(())
    }

    #[test]
    fn recomputing_is_stable() -> TestResult {
        let cart = cart(&[(19_999, 3, 18), (4_550, 2, 5), (120_000, 1, 0)])?;
        let coupon = Coupon::new("X", Money::from_minor(1_000, INR));
        let settings = BillingSettings::default();

        let first = BillingSummary::compute(&cart, Some(&coupon), &settings);
        let second = BillingSummary::compute(&cart, Some(&coupon), &settings);

        assert_eq!(first, second);

        Ok(())
    }
}
