//! Bazaar prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    adapters::{
        AdapterError, CartItemRecord, CouponValidationRecord, OrderRecord, OrderStatus,
        ProductRecord, VendorRef, cart_from_json,
    },
    billing::{BillingSettings, BillingSummary},
    cart::{Cart, CartError},
    checkout::{
        Checkout, Gstin, GstinError, OrderItem, OrderRequest, OrderSubmitter, PaymentMethod,
    },
    coupons::{
        Coupon, CouponBook, CouponCode, CouponDiscount, CouponRejection, CouponRule,
        CouponValidator, INVALID_COUPON_MESSAGE, apply_discount,
    },
    fixtures::{Fixture, FixtureError},
    lines::CartLine,
    receipt::{Receipt, ReceiptError},
    shipping::{ShippingPolicy, ShippingTier},
    tax::{GstRate, TaxBreakdown, TaxGroup},
};
