//! Bazaar checkout CLI
//!
//! Loads a cart fixture, optionally applies a coupon from a coupon book, and
//! prints either the receipt or the order-creation payload.

use std::{
    io::{self, Write},
    process::ExitCode,
};

use anyhow::Context;
use tracing::{error, info};

use bazaar::{checkout::Checkout, fixtures::Fixture, receipt::Receipt};

use crate::config::{CheckoutConfig, OutputFormat};

mod config;
mod observability;

fn main() -> ExitCode {
    // Load configuration from .env and CLI arguments
    let config = match CheckoutConfig::load() {
        Ok(config) => config,
        Err(err) => {
            _ = err.print();

            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(err) = observability::init_subscriber(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialise, must use eprintln"
        )]
        {
            eprintln!("{err}");
        }

        return ExitCode::FAILURE;
    }

    match run(&config, io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");

            ExitCode::FAILURE
        }
    }
}

fn run(config: &CheckoutConfig, mut out: impl Write) -> anyhow::Result<()> {
    let mut fixture = Fixture::with_base_path(&config.fixtures);

    let cart = fixture
        .load_cart(&config.cart)
        .with_context(|| format!("failed to load cart fixture `{}`", config.cart))?;

    info!(cart = %config.cart, lines = cart.len(), subtotal = %cart.subtotal(), "cart loaded");

    let mut checkout = Checkout::new(cart, config.billing_settings()?);

    checkout.set_gstin(config.gstin.clone());

    if let Some(code) = &config.coupon {
        let book = fixture
            .load_coupons(&config.coupons)
            .with_context(|| format!("failed to load coupon fixture `{}`", config.coupons))?;

        // JSON output keeps stdout to the payload; the rejection is logged.
        if let Err(rejection) = checkout.apply_coupon(code, &book)
            && config.output == OutputFormat::Table
        {
            writeln!(out, "{code}: {}", rejection.user_message())?;
        }
    }

    match config.output {
        OutputFormat::Table => {
            let summary = checkout.summary();

            Receipt::new(checkout.cart(), &summary).write_to(&mut out)?;
        }
        OutputFormat::Json => {
            let address_id = config
                .address_id
                .as_deref()
                .context("--address-id is required for JSON output")?;

            let order = checkout.order_request(address_id, config.payment);

            serde_json::to_writer_pretty(&mut out, &order)?;
            writeln!(out)?;
        }
    }

    Ok(())
}
