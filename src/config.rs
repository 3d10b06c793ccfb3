//! CLI configuration

use std::path::PathBuf;

use anyhow::{Context, ensure};
use clap::{Args, Parser, ValueEnum};
use rust_decimal::Decimal;

use bazaar::{
    billing::BillingSettings,
    checkout::{Gstin, PaymentMethod},
    money::minor_from_major,
    shipping::ShippingPolicy,
};

/// Log output format.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// What to print for the checkout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Receipt table with the billing summary.
    Table,

    /// The order-creation payload as JSON.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub(crate) struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Shipping tier overrides, in major units.
#[derive(Debug, Args)]
pub(crate) struct ShippingConfig {
    /// Subtotal from which shipping is free
    #[arg(long, env = "BAZAAR_FREE_SHIPPING_FROM", default_value = "6000")]
    pub free_shipping_from: Decimal,

    /// Subtotal from which the reduced fee applies
    #[arg(long, env = "BAZAAR_REDUCED_SHIPPING_FROM", default_value = "3000")]
    pub reduced_shipping_from: Decimal,

    /// Reduced shipping fee
    #[arg(long, env = "BAZAAR_REDUCED_SHIPPING_FEE", default_value = "200")]
    pub reduced_shipping_fee: Decimal,

    /// Fee below every threshold
    #[arg(long, env = "BAZAAR_STANDARD_SHIPPING_FEE", default_value = "300")]
    pub standard_shipping_fee: Decimal,
}

impl ShippingConfig {
    /// Build the shipping tier table.
    ///
    /// # Errors
    ///
    /// Returns an error if an amount is negative or too large.
    pub fn policy(&self) -> anyhow::Result<ShippingPolicy> {
        let free_from = minor("--free-shipping-from", self.free_shipping_from)?;
        let reduced_from = minor("--reduced-shipping-from", self.reduced_shipping_from)?;
        let reduced_fee = minor("--reduced-shipping-fee", self.reduced_shipping_fee)?;
        let standard_fee = minor("--standard-shipping-fee", self.standard_shipping_fee)?;

        ensure!(
            reduced_from <= free_from,
            "--reduced-shipping-from must not exceed --free-shipping-from"
        );

        Ok(ShippingPolicy::flat(standard_fee)
            .with_tier(reduced_from, reduced_fee)
            .with_tier(free_from, 0))
    }
}

fn minor(flag: &str, amount: Decimal) -> anyhow::Result<i64> {
    ensure!(!amount.is_sign_negative(), "{flag} must not be negative, got {amount}");

    minor_from_major(amount).with_context(|| format!("{flag} is out of range: {amount}"))
}

/// Bazaar checkout configuration
#[derive(Debug, Parser)]
#[command(name = "bazaar", about = "Marketplace checkout billing", long_about = None)]
pub(crate) struct CheckoutConfig {
    /// Directory holding `carts/` and `coupons/` fixtures
    #[arg(long, env = "BAZAAR_FIXTURES", default_value = "./fixtures")]
    pub fixtures: PathBuf,

    /// Cart fixture name
    #[arg(long)]
    pub cart: String,

    /// Coupon book fixture name
    #[arg(long, default_value = "default")]
    pub coupons: String,

    /// Coupon code to apply
    #[arg(long)]
    pub coupon: Option<String>,

    /// Payment method
    #[arg(long, value_enum, default_value_t = PaymentMethod::Upi)]
    pub payment: PaymentMethod,

    /// Delivery address id, needed for the order payload
    #[arg(long, required_if_eq("output", "json"))]
    pub address_id: Option<String>,

    /// Customer GSTIN for a business invoice
    #[arg(long)]
    pub gstin: Option<Gstin>,

    /// Output format (table, json)
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Shipping tier overrides.
    #[command(flatten)]
    pub shipping: ShippingConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl CheckoutConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Billing settings from the shipping overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the shipping overrides are invalid.
    pub fn billing_settings(&self) -> anyhow::Result<BillingSettings> {
        Ok(BillingSettings {
            shipping: self.shipping.policy()?,
        })
    }
}
