//! Billing invariants checked over generated carts.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::INR};
use testresult::TestResult;

use bazaar::{
    billing::{BillingSettings, BillingSummary},
    cart::Cart,
    coupons::{Coupon, apply_discount},
    lines::CartLine,
    shipping::ShippingPolicy,
    tax::{GstRate, TaxBreakdown},
};

const RATES: [i64; 5] = [0, 5, 12, 18, 28];

/// Deterministic pseudo-random carts, so failures are reproducible.
fn carts() -> impl Iterator<Item = Result<Cart<'static>, bazaar::cart::CartError>> {
    let mut seed: u64 = 0x5EED_CAFE;

    (0..200).map(move |cart_idx| {
        let mut lines = Vec::new();

        for line_idx in 0..=(cart_idx % 6) {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);

            let price = i64::try_from(seed >> 44).unwrap_or(0) % 900_000;
            let quantity = u32::try_from((seed >> 20) % 5).unwrap_or(0) + 1;
            let rate = RATES
                .get(usize::try_from(seed % 5).unwrap_or(0))
                .copied()
                .unwrap_or(0);

            lines.push(CartLine::new(
                format!("sku-{cart_idx}-{line_idx}"),
                "Generated",
                Money::from_minor(price, INR),
                quantity,
                GstRate::new(Decimal::from(rate)),
            ));
        }

        Cart::with_lines(lines, INR)
    })
}

#[test]
fn gst_is_the_sum_of_line_gst() -> TestResult {
    for cart in carts() {
        let cart = cart?;
        let taxes = TaxBreakdown::from_cart(&cart);

        let by_line: i64 = cart.iter().map(CartLine::gst_minor).sum();
        let by_group: i64 = taxes.groups().iter().map(|g| g.total().to_minor_units()).sum();

        assert_eq!(taxes.gst_amount().to_minor_units(), by_line);
        assert_eq!(by_group, by_line);
    }

    Ok(())
}

#[test]
fn tax_groups_are_distinct_and_descending() -> TestResult {
    for cart in carts() {
        let taxes = TaxBreakdown::from_cart(&cart?);
        let rates: Vec<Decimal> = taxes.groups().iter().map(|g| g.rate().percent()).collect();

        assert!(
            rates.windows(2).all(|pair| matches!(pair, [a, b] if a > b)),
            "rates not strictly descending: {rates:?}"
        );
        assert!(rates.iter().all(|rate| *rate > Decimal::ZERO));
    }

    Ok(())
}

#[test]
fn tax_aggregation_is_idempotent() -> TestResult {
    for cart in carts() {
        let cart = cart?;

        assert_eq!(TaxBreakdown::from_cart(&cart), TaxBreakdown::from_cart(&cart));
    }

    Ok(())
}

#[test]
fn total_is_assembled_from_its_parts() -> TestResult {
    let settings = BillingSettings::default();

    for (idx, cart) in carts().enumerate() {
        let cart = cart?;
        let discount = i64::try_from(idx).unwrap_or(0) * 2_500;
        let coupon = Coupon::new("GENERATED", Money::from_minor(discount, INR));

        let summary = BillingSummary::compute(&cart, Some(&coupon), &settings);

        let expected = (summary.cart_total().to_minor_units()
            + summary.gst_amount().to_minor_units()
            + summary.shipping_charges().to_minor_units()
            - discount)
            .max(0);

        assert_eq!(summary.total_amount().to_minor_units(), expected);
        assert!(summary.total_amount().to_minor_units() >= 0);
        assert_eq!(
            summary.shipping_charges().to_minor_units(),
            settings.shipping.fee_minor(summary.cart_total().to_minor_units())
        );
    }

    Ok(())
}

#[test]
fn shipping_boundaries() {
    let policy = ShippingPolicy::default();

    assert_eq!(policy.fee_minor(299_999), 30_000);
    assert_eq!(policy.fee_minor(300_000), 20_000);
    assert_eq!(policy.fee_minor(599_999), 20_000);
    assert_eq!(policy.fee_minor(600_000), 0);
}

#[test]
fn discount_never_makes_total_negative() {
    for (pre, discount) in [(10_000, 50_000), (0, 0), (10_000, 10_000), (10_000, 1)] {
        let total = apply_discount(Money::from_minor(pre, INR), Money::from_minor(discount, INR));

        assert_eq!(total.to_minor_units(), (pre - discount).max(0));
    }
}
