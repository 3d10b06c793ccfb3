//! Checkout
//!
//! A [`Checkout`] is the state behind the checkout page: the cart, at most
//! one applied coupon, the last coupon error, and the customer's GSTIN. The
//! billing summary is never stored; it is recomputed from that state on
//! demand, so a failed order submission can simply be retried.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    billing::{BillingSettings, BillingSummary},
    cart::Cart,
    coupons::{Coupon, CouponCode, CouponRejection, CouponValidator},
    lines::CartLine,
    money::to_major,
};

/// How the shopper pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum PaymentMethod {
    /// Unified Payments Interface, paid by QR code at checkout
    #[serde(rename = "UPI", alias = "upi", alias = "Upi")]
    Upi,

    /// Cash on delivery
    #[serde(rename = "COD", alias = "cod", alias = "Cod")]
    Cod,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Cod => "COD",
        })
    }
}

/// Errors for malformed GST identification numbers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GstinError {
    /// Not exactly 15 characters.
    #[error("GSTIN must be 15 characters, got {0}")]
    Length(usize),

    /// A character is not valid at its position (position, character).
    #[error("invalid character {1:?} at position {0} of GSTIN")]
    InvalidCharacter(usize, char),
}

/// A customer's GST identification number.
///
/// Layout: two-digit state code, ten-character PAN (five letters, four
/// digits, one letter), an entity digit or letter, a literal `Z`, and a check
/// character. Stored upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Gstin(String);

impl Gstin {
    /// The GSTIN as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The two-digit state code.
    pub fn state_code(&self) -> &str {
        self.0.get(..2).unwrap_or_default()
    }
}

impl FromStr for Gstin {
    type Err = GstinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let gstin = s.trim().to_uppercase();
        let len = gstin.chars().count();

        if len != 15 {
            return Err(GstinError::Length(len));
        }

        for (idx, c) in gstin.chars().enumerate() {
            let valid = match idx {
                0 | 1 | 7..=10 => c.is_ascii_digit(),
                2..=6 | 11 => c.is_ascii_uppercase(),
                13 => c == 'Z',
                _ => c.is_ascii_alphanumeric(),
            };

            if !valid {
                return Err(GstinError::InvalidCharacter(idx, c));
            }
        }

        Ok(Self(gstin))
    }
}

impl<'de> Deserialize<'de> for Gstin {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;

        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Gstin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One ordered product in an [`OrderRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Backend product id
    pub product_id: String,

    /// Product name at the time of ordering
    pub product_name: String,

    /// Vendor selling the product
    pub vendor_id: Option<String>,

    /// Units ordered
    pub quantity: u32,

    /// Unit price, major units
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// GST rate in percentage points
    #[serde(with = "rust_decimal::serde::float")]
    pub gst_percentage: Decimal,
}

impl From<&CartLine<'_>> for OrderItem {
    fn from(line: &CartLine<'_>) -> Self {
        Self {
            product_id: line.product_id().to_string(),
            product_name: line.name().to_string(),
            vendor_id: line.vendor_id().map(str::to_string),
            quantity: line.quantity(),
            price: to_major(line.unit_price()),
            gst_percentage: line.gst_rate().percent(),
        }
    }
}

/// The order-creation payload sent to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// Ordered products
    pub items: Vec<OrderItem>,

    /// Sum of line totals, before tax
    #[serde(with = "rust_decimal::serde::float")]
    pub cart_total: Decimal,

    /// Headline GST
    #[serde(with = "rust_decimal::serde::float")]
    pub gst_amount: Decimal,

    /// Shipping fee
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping_charges: Decimal,

    /// Applied coupon, `null` without one
    pub coupon_code: Option<CouponCode>,

    /// Coupon discount requested
    #[serde(with = "rust_decimal::serde::float")]
    pub coupon_discount: Decimal,

    /// Amount payable
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,

    /// Selected delivery address
    pub address_id: String,

    /// Selected payment method
    pub payment_method: PaymentMethod,

    /// Customer GSTIN for a business invoice
    pub gst_number: Option<Gstin>,
}

/// Sends orders to the backend.
pub trait OrderSubmitter {
    /// What the backend returns for an accepted order
    type Confirmation;

    /// Why an order was not accepted
    type Error;

    /// Submit an order.
    ///
    /// # Errors
    ///
    /// Returns the submitter's error when the order is not accepted.
    fn submit(&mut self, order: &OrderRequest) -> Result<Self::Confirmation, Self::Error>;
}

/// Checkout state for one shopper.
#[derive(Debug, Clone)]
pub struct Checkout<'a> {
    cart: Cart<'a>,
    settings: BillingSettings,
    coupon: Option<Coupon<'a>>,
    coupon_error: Option<CouponRejection>,
    gstin: Option<Gstin>,
}

impl<'a> Checkout<'a> {
    /// Start a checkout for a cart.
    pub fn new(cart: Cart<'a>, settings: BillingSettings) -> Self {
        Self {
            cart,
            settings,
            coupon: None,
            coupon_error: None,
            gstin: None,
        }
    }

    /// The cart being checked out.
    pub fn cart(&self) -> &Cart<'a> {
        &self.cart
    }

    /// Mutable access to the cart.
    ///
    /// Subtotal, GST and shipping follow any edit. The applied coupon was
    /// validated against the cart at apply time and keeps its discount until
    /// [`Checkout::revalidate_coupon`] runs again.
    pub fn cart_mut(&mut self) -> &mut Cart<'a> {
        &mut self.cart
    }

    /// Billing settings in use.
    pub fn settings(&self) -> &BillingSettings {
        &self.settings
    }

    /// The applied coupon, if any.
    pub fn coupon(&self) -> Option<&Coupon<'a>> {
        self.coupon.as_ref()
    }

    /// Why the last coupon attempt failed, if it did.
    pub fn coupon_error(&self) -> Option<&CouponRejection> {
        self.coupon_error.as_ref()
    }

    /// The message to show under the coupon field, if any.
    pub fn coupon_message(&self) -> Option<&'static str> {
        self.coupon_error.as_ref().map(CouponRejection::user_message)
    }

    /// Validate and apply a coupon code.
    ///
    /// A successful code replaces any applied coupon and clears the error. A
    /// rejected code removes the applied coupon and records the rejection.
    ///
    /// # Errors
    ///
    /// Returns the validator's [`CouponRejection`].
    pub fn apply_coupon(
        &mut self,
        code: &str,
        validator: &impl CouponValidator,
    ) -> Result<&Coupon<'a>, CouponRejection> {
        let code = CouponCode::new(code);
        let cart_total = self.cart.subtotal();

        match validator.validate(&code, cart_total, self.cart.vendor_id()) {
            Ok(coupon) => {
                debug!(code = %coupon.code(), discount = %coupon.discount(), "applied coupon");

                self.coupon_error = None;

                let coupon: &Coupon<'a> = self.coupon.insert(coupon);

                Ok(coupon)
            }
            Err(rejection) => {
                warn!(code = %code, reason = %rejection, "coupon rejected");

                self.coupon = None;
                self.coupon_error = Some(rejection.clone());

                Err(rejection)
            }
        }
    }

    /// Apply a coupon already validated elsewhere, e.g. by the backend.
    pub fn set_coupon(&mut self, coupon: Coupon<'a>) {
        debug!(code = %coupon.code(), "applied pre-validated coupon");

        self.coupon = Some(coupon);
        self.coupon_error = None;
    }

    /// Validate the applied coupon again against the current cart.
    ///
    /// Does nothing without an applied coupon. Otherwise behaves like
    /// [`Checkout::apply_coupon`] with the same code: a percent discount is
    /// recomputed, and a coupon the cart no longer qualifies for is removed.
    ///
    /// # Errors
    ///
    /// Returns the validator's [`CouponRejection`].
    pub fn revalidate_coupon(
        &mut self,
        validator: &impl CouponValidator,
    ) -> Result<(), CouponRejection> {
        let Some(code) = self.coupon.as_ref().map(|coupon| coupon.code().clone()) else {
            return Ok(());
        };

        self.apply_coupon(code.as_str(), validator).map(|_coupon| ())
    }

    /// Remove the applied coupon and clear any coupon error.
    pub fn remove_coupon(&mut self) {
        if let Some(coupon) = self.coupon.take() {
            debug!(code = %coupon.code(), "removed coupon");
        }

        self.coupon_error = None;
    }

    /// The customer's GSTIN, if given.
    pub fn gstin(&self) -> Option<&Gstin> {
        self.gstin.as_ref()
    }

    /// Set or clear the customer's GSTIN.
    pub fn set_gstin(&mut self, gstin: Option<Gstin>) {
        self.gstin = gstin;
    }

    /// Compute the billing summary for the current state.
    #[tracing::instrument(level = "debug", skip_all, fields(lines = self.cart.len()))]
    pub fn summary(&self) -> BillingSummary<'a> {
        let summary = BillingSummary::compute(&self.cart, self.coupon.as_ref(), &self.settings);

        debug!(total = %summary.total_amount(), "computed billing summary");

        summary
    }

    /// Build the order payload for the current state.
    pub fn order_request(&self, address_id: &str, payment_method: PaymentMethod) -> OrderRequest {
        let summary = self.summary();

        OrderRequest {
            items: self.cart.iter().map(OrderItem::from).collect(),
            cart_total: to_major(&summary.cart_total()),
            gst_amount: to_major(&summary.gst_amount()),
            shipping_charges: to_major(&summary.shipping_charges()),
            coupon_code: summary.coupon_code().cloned(),
            coupon_discount: to_major(&summary.coupon_discount()),
            total_amount: to_major(&summary.total_amount()),
            address_id: address_id.to_string(),
            payment_method,
            gst_number: self.gstin.clone(),
        }
    }

    /// Submit the order.
    ///
    /// On success the cart is emptied and the coupon removed. On failure
    /// nothing changes, so the caller can retry.
    ///
    /// # Errors
    ///
    /// Returns the submitter's error unchanged.
    pub fn place_order<S: OrderSubmitter>(
        &mut self,
        address_id: &str,
        payment_method: PaymentMethod,
        submitter: &mut S,
    ) -> Result<S::Confirmation, S::Error> {
        let order = self.order_request(address_id, payment_method);

        let confirmation = submitter.submit(&order)?;

        info!(
            lines = order.items.len(),
            total = %order.total_amount,
            payment = %payment_method,
            "order placed"
        );

        self.cart.clear();
        self.remove_coupon();

        Ok(confirmation)
    }
}
