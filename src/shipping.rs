//! Shipping
//!
//! Shipping is a flat fee picked from a tier table by the cart subtotal
//! (before tax and discounts). Each tier's threshold is inclusive, so a
//! subtotal exactly on a threshold gets that tier's cheaper fee. A subtotal
//! below every threshold, negative ones included, pays the fallback fee.

use rusty_money::{Money, iso::Currency};
use smallvec::{SmallVec, smallvec};

/// A subtotal threshold and the fee charged from that threshold upwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingTier {
    /// Lowest subtotal (inclusive, minor units) that qualifies for this tier.
    pub threshold_minor: i64,

    /// Fee charged in this tier, in minor units.
    pub fee_minor: i64,
}

/// Tiered flat-rate shipping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingPolicy {
    /// Tiers, highest threshold first.
    tiers: SmallVec<[ShippingTier; 4]>,
    fallback_fee_minor: i64,
}

impl ShippingPolicy {
    /// Subtotal from which shipping is free (6000.00).
    pub const FREE_FROM_MINOR: i64 = 600_000;

    /// Subtotal from which the reduced fee applies (3000.00).
    pub const REDUCED_FROM_MINOR: i64 = 300_000;

    /// Reduced fee (200.00).
    pub const REDUCED_FEE_MINOR: i64 = 20_000;

    /// Fee for subtotals under every threshold (300.00).
    pub const STANDARD_FEE_MINOR: i64 = 30_000;

    /// A policy with no tiers, charging `fallback_fee_minor` on every order.
    pub fn flat(fallback_fee_minor: i64) -> Self {
        Self {
            tiers: SmallVec::new(),
            fallback_fee_minor,
        }
    }

    /// Add a tier. Tiers can be added in any order.
    #[must_use]
    pub fn with_tier(mut self, threshold_minor: i64, fee_minor: i64) -> Self {
        let position = self
            .tiers
            .iter()
            .position(|tier| tier.threshold_minor < threshold_minor)
            .unwrap_or(self.tiers.len());

        self.tiers.insert(
            position,
            ShippingTier {
                threshold_minor,
                fee_minor,
            },
        );

        self
    }

    /// Tiers, highest threshold first.
    pub fn tiers(&self) -> &[ShippingTier] {
        &self.tiers
    }

    /// Fee charged when no tier matches.
    pub fn fallback_fee_minor(&self) -> i64 {
        self.fallback_fee_minor
    }

    /// Fee in minor units for a subtotal in minor units.
    pub fn fee_minor(&self, subtotal_minor: i64) -> i64 {
        self.tiers
            .iter()
            .find(|tier| subtotal_minor >= tier.threshold_minor)
            .map_or(self.fallback_fee_minor, |tier| tier.fee_minor)
    }

    /// Fee for a cart subtotal, in the subtotal's currency.
    pub fn resolve<'a>(&self, subtotal: &Money<'a, Currency>) -> Money<'a, Currency> {
        Money::from_minor(
            self.fee_minor(subtotal.to_minor_units()),
            subtotal.currency(),
        )
    }
}

impl Default for ShippingPolicy {
    /// Free from 6000, 200 from 3000, 300 below that.
    fn default() -> Self {
        Self {
            tiers: smallvec![
                ShippingTier {
                    threshold_minor: Self::FREE_FROM_MINOR,
                    fee_minor: 0,
                },
                ShippingTier {
                    threshold_minor: Self::REDUCED_FROM_MINOR,
                    fee_minor: Self::REDUCED_FEE_MINOR,
                },
            ],
            fallback_fee_minor: Self::STANDARD_FEE_MINOR,
        }
    }
}
