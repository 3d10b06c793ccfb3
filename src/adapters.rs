//! Backend adapters
//!
//! Backend endpoints disagree on field names (`price` vs `sellingPrice`,
//! `_id` vs `id`, a vendor id vs a populated vendor object) and sometimes
//! send numbers as strings. Every response is decoded here into one typed
//! record, and nothing past this module looks at raw JSON.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    cart::{Cart, CartError},
    checkout::PaymentMethod,
    coupons::{Coupon, CouponCode},
    lines::CartLine,
    money::minor_from_major,
    tax::GstRate,
};

/// Errors raised while normalizing backend responses.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The response is not valid JSON or misses a required field.
    #[error("Failed to decode backend response: {0}")]
    Json(#[from] serde_json::Error),

    /// An amount that must not be negative was (field, value).
    #[error("Negative {0}: {1}")]
    NegativeAmount(&'static str, Decimal),

    /// An amount too large to represent in minor units (field, value).
    #[error("{0} out of range: {1}")]
    AmountOutOfRange(&'static str, Decimal),

    /// The normalized lines do not form a valid cart.
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// A vendor reference: either a bare id or a populated vendor document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum VendorRef {
    /// Just the vendor id
    Id(String),

    /// A populated vendor document
    Vendor {
        /// Vendor id
        #[serde(alias = "_id", alias = "vendorId")]
        id: String,

        /// Vendor or shop name
        #[serde(default, alias = "shopName", alias = "businessName")]
        name: Option<String>,
    },
}

impl VendorRef {
    /// The vendor id, whichever shape it came in.
    pub fn id(&self) -> &str {
        match self {
            VendorRef::Id(id) | VendorRef::Vendor { id, .. } => id,
        }
    }
}

/// A product as returned by the catalog endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductRecord {
    /// Product id
    #[serde(alias = "_id", alias = "productId")]
    pub id: String,

    /// Display name
    #[serde(alias = "productName", alias = "title")]
    pub name: String,

    /// Unit price, major units
    #[serde(alias = "unitPrice", alias = "sellingPrice", alias = "salePrice")]
    pub price: Decimal,

    /// GST rate in percentage points; missing means exempt
    #[serde(
        default,
        alias = "gstPercentage",
        alias = "gstRate",
        alias = "gst_percentage"
    )]
    pub gst: Option<Decimal>,

    /// Selling vendor
    #[serde(default, alias = "vendorId", alias = "vendor_id")]
    pub vendor: Option<VendorRef>,

    /// HSN tax classification code
    #[serde(default, alias = "hsn", alias = "hsnCode")]
    pub hsn_code: Option<String>,
}

impl ProductRecord {
    /// Decode a single product.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] if the JSON cannot be decoded.
    pub fn from_json(json: &str) -> Result<Self, AdapterError> {
        Ok(serde_json::from_str(json)?)
    }

    /// A cart line for `quantity` units of this product.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] if the price or GST rate is negative or
    /// the price does not fit in minor units.
    pub fn into_line<'a>(
        self,
        quantity: u32,
        currency: &'a Currency,
    ) -> Result<CartLine<'a>, AdapterError> {
        let price_minor = non_negative_minor("price", self.price)?;
        let gst = self.gst.unwrap_or_default();

        if gst.is_sign_negative() && !gst.is_zero() {
            return Err(AdapterError::NegativeAmount("GST rate", gst));
        }

        let line = CartLine::new(
            self.id,
            self.name,
            Money::from_minor(price_minor, currency),
            quantity,
            GstRate::new(gst),
        );

        Ok(match self.vendor {
            Some(vendor) => line.with_vendor(vendor.id()),
            None => line,
        })
    }
}

/// A cart entry: a product and how many of it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CartItemRecord {
    /// The product
    #[serde(alias = "productDetails", alias = "item")]
    pub product: ProductRecord,

    /// Units in the cart
    #[serde(alias = "qty", alias = "count")]
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CartResponse {
    Items(Vec<CartItemRecord>),
    Wrapped {
        #[serde(alias = "cart", alias = "cartItems")]
        items: Vec<CartItemRecord>,
    },
}

/// Decode a cart response into a [`Cart`].
///
/// Accepts a bare array of items or an object holding it under `items`,
/// `cart` or `cartItems`.
///
/// # Errors
///
/// Returns an [`AdapterError`] if the JSON cannot be decoded, an amount is
/// invalid, or an item has a zero quantity.
pub fn cart_from_json(json: &str, currency: &'static Currency) -> Result<Cart<'static>, AdapterError> {
    let items = match serde_json::from_str(json)? {
        CartResponse::Items(items) | CartResponse::Wrapped { items } => items,
    };

    let lines = items
        .into_iter()
        .map(|item| item.product.into_line(item.quantity, currency))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Cart::with_lines(lines, currency)?)
}

/// The coupon validation endpoint's answer for an accepted code.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CouponValidationRecord {
    /// Coupon code
    #[serde(alias = "couponCode")]
    pub code: String,

    /// Discount amount, major units
    #[serde(
        rename = "discountAmount",
        alias = "discount",
        alias = "discount_amount",
        alias = "discountValue"
    )]
    pub discount_amount: Decimal,
}

impl CouponValidationRecord {
    /// Decode a validation response.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] if the JSON cannot be decoded.
    pub fn from_json(json: &str) -> Result<Self, AdapterError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The validated coupon, with the code normalized.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] if the discount is negative or out of range.
    pub fn into_coupon<'a>(self, currency: &'a Currency) -> Result<Coupon<'a>, AdapterError> {
        let discount_minor = non_negative_minor("discount", self.discount_amount)?;

        Ok(Coupon::new(
            CouponCode::new(self.code),
            Money::from_minor(discount_minor, currency),
        ))
    }
}

/// Order lifecycle states. Unknown states are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum OrderStatus {
    /// Placed, awaiting vendor confirmation
    Pending,
    /// Accepted by the vendor
    Confirmed,
    /// Handed to the courier
    Shipped,
    /// Received by the customer
    Delivered,
    /// Cancelled by anyone
    Cancelled,
    /// A status this client does not know
    Other(String),
}

impl From<String> for OrderStatus {
    fn from(status: String) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "pending" | "placed" => OrderStatus::Pending,
            "confirmed" | "accepted" | "processing" => OrderStatus::Confirmed,
            "shipped" | "dispatched" | "in transit" => OrderStatus::Shipped,
            "delivered" | "completed" => OrderStatus::Delivered,
            "cancelled" | "canceled" => OrderStatus::Cancelled,
            _ => OrderStatus::Other(status),
        }
    }
}

/// An order as returned by the order listing endpoints.
///
/// Optional text stays `None` when absent; display code picks the fallback.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderRecord {
    /// Order id
    #[serde(alias = "_id", alias = "orderId")]
    pub id: String,

    /// Human-facing order number
    #[serde(
        default,
        alias = "orderNumber",
        alias = "orderNo",
        alias = "invoiceNumber"
    )]
    pub order_number: Option<String>,

    /// Lifecycle state
    #[serde(alias = "orderStatus")]
    pub status: OrderStatus,

    /// Amount payable, major units
    #[serde(alias = "totalAmount", alias = "total", alias = "grandTotal")]
    pub total_amount: Decimal,

    /// Payment method chosen at checkout
    #[serde(default, alias = "paymentMethod", alias = "paymentMode")]
    pub payment_method: Option<PaymentMethod>,

    /// Customer name
    #[serde(default, alias = "customerName", alias = "userName", alias = "name")]
    pub customer_name: Option<String>,

    /// Applied coupon
    #[serde(default, alias = "couponCode", alias = "coupon")]
    pub coupon_code: Option<CouponCode>,
}

impl OrderRecord {
    /// Decode a single order.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] if the JSON cannot be decoded.
    pub fn from_json(json: &str) -> Result<Self, AdapterError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decode a list of orders, bare or under `orders`/`data`.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] if the JSON cannot be decoded.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, AdapterError> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OrdersResponse {
            Orders(Vec<OrderRecord>),
            Wrapped {
                #[serde(alias = "data")]
                orders: Vec<OrderRecord>,
            },
        }

        Ok(match serde_json::from_str(json)? {
            OrdersResponse::Orders(orders) | OrdersResponse::Wrapped { orders } => orders,
        })
    }
}

fn non_negative_minor(field: &'static str, amount: Decimal) -> Result<i64, AdapterError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AdapterError::NegativeAmount(field, amount));
    }

    minor_from_major(amount).ok_or(AdapterError::AmountOutOfRange(field, amount))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::INR;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn product_aliases_normalize() -> TestResult {
        let shapes = [
            r#"{"_id": "p1", "name": "Kurta", "price": 1499, "gst": 12, "vendor": "v1"}"#,
            r#"{"id": "p1", "productName": "Kurta", "sellingPrice": "1499.00", "gstPercentage": "12", "vendorId": "v1"}"#,
            r#"{"productId": "p1", "title": "Kurta", "unitPrice": 1499.0, "gstRate": 12.0, "vendor": {"_id": "v1", "shopName": "Jaipur Looms"}}"#,
        ];

        for shape in shapes {
            let product = ProductRecord::from_json(shape)?;

            assert_eq!(product.id, "p1", "{shape}");
            assert_eq!(product.name, "Kurta", "{shape}");
            assert_eq!(product.price, Decimal::from(1499), "{shape}");
            assert_eq!(product.gst, Some(Decimal::from(12)), "{shape}");
            assert_eq!(product.vendor.as_ref().map(VendorRef::id), Some("v1"), "{shape}");
        }

        Ok(())
    }

    #[test]
    fn missing_gst_is_exempt() -> TestResult {
        let product = ProductRecord::from_json(r#"{"_id": "p2", "name": "Atta", "price": "450"}"#)?;
        let line = product.into_line(1, INR)?;

        assert_eq!(line.gst_rate(), GstRate::exempt());
        assert_eq!(line.vendor_id(), None);

        Ok(())
    }

    #[test]
    fn negative_price_is_rejected() -> TestResult {
        let product = ProductRecord::from_json(r#"{"_id": "p3", "name": "Bad", "price": -1}"#)?;

        assert!(matches!(
            product.into_line(1, INR),
            Err(AdapterError::NegativeAmount("price", _))
        ));

        Ok(())
    }

    #[test]
    fn cart_accepts_bare_and_wrapped_shapes() -> TestResult {
        let bare = r#"[{"product": {"_id": "p1", "name": "Kurta", "price": 100, "gst": 18}, "quantity": 2}]"#;
        let wrapped = r#"{"cartItems": [{"productDetails": {"_id": "p1", "name": "Kurta", "price": 100, "gst": 18}, "qty": 2}]}"#;

        for json in [bare, wrapped] {
            let cart = cart_from_json(json, INR)?;

            assert_eq!(cart.len(), 1);
            assert_eq!(cart.subtotal(), Money::from_minor(20_000, INR));
        }

        Ok(())
    }

    #[test]
    fn cart_with_zero_quantity_is_rejected() {
        let json = r#"[{"product": {"_id": "p1", "name": "Kurta", "price": 100}, "quantity": 0}]"#;

        assert!(matches!(
            cart_from_json(json, INR),
            Err(AdapterError::Cart(CartError::ZeroQuantity(0)))
        ));
    }

    #[test]
    fn coupon_validation_normalizes_code() -> TestResult {
        let record = CouponValidationRecord::from_json(r#"{"couponCode": "welcome100", "discount": "100"}"#)?;
        let coupon = record.into_coupon(INR)?;

        assert_eq!(coupon.code().as_str(), "WELCOME100");
        assert_eq!(coupon.discount(), Money::from_minor(10_000, INR));

        Ok(())
    }

    #[test]
    fn orders_normalize_and_keep_unknown_status() -> TestResult {
        let json = r#"{"data": [
            {"_id": "o1", "orderNo": "BZ-1001", "orderStatus": "Dispatched", "grandTotal": "4450.00", "paymentMode": "cod"},
            {"orderId": "o2", "status": "on hold", "totalAmount": 2800}
        ]}"#;

        let orders = OrderRecord::list_from_json(json)?;

        assert_eq!(orders.len(), 2);

        let first = orders.first();
        let second = orders.get(1);

        assert_eq!(first.map(|o| &o.status), Some(&OrderStatus::Shipped));
        assert_eq!(first.and_then(|o| o.payment_method), Some(PaymentMethod::Cod));
        assert_eq!(first.and_then(|o| o.order_number.as_deref()), Some("BZ-1001"));
        assert_eq!(
            second.map(|o| &o.status),
            Some(&OrderStatus::Other("on hold".to_string()))
        );
        assert_eq!(second.and_then(|o| o.customer_name.as_deref()), None);
        assert_eq!(second.map(|o| o.total_amount), Some(Decimal::from(2800)));

        Ok(())
    }

    #[test]
    fn single_order_decodes() -> TestResult {
        let order = OrderRecord::from_json(
            r#"{"id": "o3", "status": "DELIVERED", "total": 99.5, "couponCode": "festive10"}"#,
        )?;

        assert_eq!(order.status, OrderStatus::Delivered);
        assert_eq!(order.coupon_code, Some(CouponCode::new("FESTIVE10")));

        Ok(())
    }
}
