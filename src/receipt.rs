//! Receipt

use std::io;

use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{billing::BillingSummary, cart::Cart};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// IO error
    #[error("IO error")]
    IO,
}

/// A printable checkout receipt: the cart lines and their billing summary.
#[derive(Debug, Clone, Copy)]
pub struct Receipt<'r, 'a> {
    cart: &'r Cart<'a>,
    summary: &'r BillingSummary<'a>,
}

impl<'r, 'a> Receipt<'r, 'a> {
    /// Create a receipt for a cart and the summary computed from it.
    pub fn new(cart: &'r Cart<'a>, summary: &'r BillingSummary<'a>) -> Self {
        Self { cart, summary }
    }

    /// Writes the line table and the summary table.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let lines = self.line_table();
        let summary = self.summary_table();

        writeln!(out, "\n{lines}\n{summary}").map_err(|_err| ReceiptError::IO)
    }

    fn line_table(&self) -> String {
        let mut builder = Builder::default();

        builder.push_record(["#", "Item", "Qty", "Unit Price", "GST %", "Line Total"]);

        for (idx, line) in self.cart.iter().enumerate() {
            builder.push_record([
                (idx + 1).to_string(),
                line.name().to_string(),
                line.quantity().to_string(),
                line.unit_price().to_string(),
                line.gst_rate().to_string(),
                line.line_total().to_string(),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(2..), Alignment::right());

        table.to_string()
    }

    fn summary_table(&self) -> String {
        let summary = self.summary;
        let mut builder = Builder::default();

        builder.push_record(["Subtotal".to_string(), summary.cart_total().to_string()]);

        for group in summary.tax_groups() {
            builder.push_record([
                format!("SGST @ {}%", group.sgst_rate().normalize()),
                group.sgst_amount().to_string(),
            ]);
            builder.push_record([
                format!("CGST @ {}%", group.cgst_rate().normalize()),
                group.cgst_amount().to_string(),
            ]);
        }

        builder.push_record(["GST".to_string(), summary.gst_amount().to_string()]);
        builder.push_record([
            "Shipping".to_string(),
            shipping_label(summary.shipping_charges()),
        ]);

        if let Some(code) = summary.coupon_code() {
            builder.push_record([
                format!("Discount ({code})"),
                format!("-{}", summary.coupon_discount()),
            ]);
        }

        builder.push_record(["Total".to_string(), summary.total_amount().to_string()]);

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::last(), Color::BOLD);
        table.modify(Columns::last(), Alignment::right());

        table.to_string()
    }
}

fn shipping_label(fee: Money<'_, Currency>) -> String {
    if fee.to_minor_units() == 0 {
        "FREE".to_string()
    } else {
        fee.to_string()
    }
}
