//! Bazaar
//!
//! Bazaar is the billing core of a marketplace checkout: it groups GST by
//! rate, picks the shipping tier, applies coupon discounts and assembles the
//! order payload, all in integer minor units with half-away-from-zero
//! rounding.

pub mod adapters;
pub mod billing;
pub mod cart;
pub mod checkout;
pub mod coupons;
pub mod fixtures;
pub mod lines;
pub mod money;
pub mod prelude;
pub mod receipt;
pub mod shipping;
pub mod tax;
