//! GST
//!
//! Goods and Services Tax is charged per cart line at the line's rate. For
//! display and invoicing the tax is grouped by rate, and every group is split
//! into equal State (SGST) and Central (CGST) halves.
//!
//! All rounding is eager: each line's tax is rounded on its own, the headline
//! GST is the plain sum of those rounded amounts, and each half of a group is
//! rounded independently. `sgst + cgst` can therefore be one paisa away from a
//! group's total; that difference is kept as-is.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{
    cart::Cart,
    lines::CartLine,
    money::{half_of_minor, percent_of_minor},
};

/// Decimal places used for the canonical form of a rate.
const RATE_SCALE: u32 = 2;

/// A GST rate in percentage points (`18` means 18%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GstRate(Decimal);

impl GstRate {
    /// Create a rate from percentage points.
    pub fn new(percent: Decimal) -> Self {
        Self(percent)
    }

    /// The zero rate used for tax-exempt goods.
    pub fn exempt() -> Self {
        Self(Decimal::ZERO)
    }

    /// Percentage points as given.
    pub fn percent(&self) -> Decimal {
        self.0
    }

    /// The rate rounded to two decimals, so `5`, `5.0` and `5.00` are one key.
    pub fn canonical(&self) -> Self {
        let mut percent = self
            .0
            .round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointAwayFromZero);
        percent.rescale(RATE_SCALE);

        Self(percent)
    }

    /// Half of the rate, rounded to two decimals. Used for both SGST and CGST.
    pub fn half(&self) -> Decimal {
        let mut half = (self.0 / Decimal::TWO)
            .round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointAwayFromZero);
        half.rescale(RATE_SCALE);

        half
    }

    /// Whether this rate charges any tax.
    pub fn is_taxable(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Tax on an amount in minor units, rounded to a whole minor unit.
    pub fn tax_on_minor(&self, minor: i64) -> i64 {
        percent_of_minor(minor, self.0)
    }
}

impl From<Decimal> for GstRate {
    fn from(percent: Decimal) -> Self {
        Self::new(percent)
    }
}

impl fmt::Display for GstRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

/// All lines sharing one GST rate, with the SGST/CGST split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxGroup<'a> {
    rate: GstRate,
    total: Money<'a, Currency>,
    half_rate: Decimal,
    half_amount: Money<'a, Currency>,
}

impl<'a> TaxGroup<'a> {
    fn new(rate: GstRate, total_minor: i64, currency: &'a Currency) -> Self {
        Self {
            rate,
            total: Money::from_minor(total_minor, currency),
            half_rate: rate.half(),
            half_amount: Money::from_minor(half_of_minor(total_minor), currency),
        }
    }

    /// The group's rate in canonical two-decimal form.
    pub fn rate(&self) -> GstRate {
        self.rate
    }

    /// Sum of the per-line GST for every line at this rate.
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// State GST rate.
    pub fn sgst_rate(&self) -> Decimal {
        self.half_rate
    }

    /// Central GST rate. Always equal to [`TaxGroup::sgst_rate`].
    pub fn cgst_rate(&self) -> Decimal {
        self.half_rate
    }

    /// State GST amount, half the group total rounded on its own.
    pub fn sgst_amount(&self) -> Money<'a, Currency> {
        self.half_amount
    }

    /// Central GST amount, half the group total rounded on its own.
    pub fn cgst_amount(&self) -> Money<'a, Currency> {
        self.half_amount
    }
}

/// Headline GST for a cart and its per-rate breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxBreakdown<'a> {
    gst_amount: Money<'a, Currency>,
    groups: SmallVec<[TaxGroup<'a>; 4]>,
}

impl<'a> TaxBreakdown<'a> {
    /// Aggregate the GST of every line in a cart.
    pub fn from_cart(cart: &Cart<'a>) -> Self {
        Self::from_lines(cart.lines(), cart.currency())
    }

    /// Aggregate the GST of a sequence of lines priced in `currency`.
    ///
    /// Groups with a zero rate or a zero total are left out, and the rest
    /// are ordered from the highest rate down.
    pub fn from_lines(lines: &[CartLine<'a>], currency: &'a Currency) -> Self {
        let mut totals: FxHashMap<GstRate, i64> = FxHashMap::default();
        let mut order: SmallVec<[GstRate; 4]> = SmallVec::new();
        let mut gst_minor = 0_i64;

        for line in lines {
            let tax = line.gst_minor();
            let key = line.gst_rate().canonical();

            gst_minor = gst_minor.saturating_add(tax);

            let total = totals.entry(key).or_insert_with(|| {
                order.push(key);
                0
            });
            *total = total.saturating_add(tax);
        }

        let mut groups: SmallVec<[TaxGroup<'a>; 4]> = order
            .into_iter()
            .filter_map(|rate| {
                let total = totals.get(&rate).copied().unwrap_or_default();

                (rate.is_taxable() && total > 0).then(|| TaxGroup::new(rate, total, currency))
            })
            .collect();

        // Keys are unique, so the stable sort never has to break a tie.
        groups.sort_by(|a, b| b.rate.cmp(&a.rate));

        Self {
            gst_amount: Money::from_minor(gst_minor, currency),
            groups,
        }
    }

    /// Sum of every line's rounded GST.
    pub fn gst_amount(&self) -> Money<'a, Currency> {
        self.gst_amount
    }

    /// Taxable groups, highest rate first.
    pub fn groups(&self) -> &[TaxGroup<'a>] {
        &self.groups
    }
}
