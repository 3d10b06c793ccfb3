//! Cart

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{lines::CartLine, money::sum_minor};

/// Errors related to cart construction or edits.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// A line's currency differs from the cart currency (index, line currency, cart currency).
    #[error("Line {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// A line was given a quantity of zero (index).
    #[error("Line {0} has a quantity of zero")]
    ZeroQuantity(usize),

    /// No line at the given index.
    #[error("No cart line at index {0}")]
    NoSuchLine(usize),
}

/// An ordered set of lines priced in one currency.
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    lines: Vec<CartLine<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create an empty cart.
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: Vec::new(),
            currency,
        }
    }

    /// Create a new cart with the given lines.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if a line is priced in another currency or has a zero quantity.
    pub fn with_lines(
        lines: impl Into<Vec<CartLine<'a>>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let lines = lines.into();

        lines
            .iter()
            .enumerate()
            .try_for_each(|(i, line)| check_line(i, line, currency))?;

        Ok(Cart { lines, currency })
    }

    /// Append a line to the cart.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if the line is priced in another currency or has a zero quantity.
    pub fn push(&mut self, line: CartLine<'a>) -> Result<(), CartError> {
        check_line(self.lines.len(), &line, self.currency)?;

        self.lines.push(line);

        Ok(())
    }

    /// Change the quantity of the line at `idx`.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if there is no such line or the quantity is zero.
    pub fn set_quantity(&mut self, idx: usize, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity(idx));
        }

        self.lines
            .get_mut(idx)
            .ok_or(CartError::NoSuchLine(idx))?
            .set_quantity(quantity);

        Ok(())
    }

    /// Remove and return the line at `idx`.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if there is no such line.
    pub fn remove(&mut self, idx: usize) -> Result<CartLine<'a>, CartError> {
        if idx >= self.lines.len() {
            return Err(CartError::NoSuchLine(idx));
        }

        Ok(self.lines.remove(idx))
    }

    /// Empty the cart, e.g. once an order has been placed.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of all line totals, before tax, shipping and discounts.
    pub fn subtotal(&self) -> Money<'a, Currency> {
        Money::from_minor(
            sum_minor(self.lines.iter().map(CartLine::line_total_minor)),
            self.currency,
        )
    }

    /// The cart's lines, in the order they were added.
    pub fn lines(&self) -> &[CartLine<'a>] {
        &self.lines
    }

    /// Iterate over the cart's lines.
    pub fn iter(&self) -> std::slice::Iter<'_, CartLine<'a>> {
        self.lines.iter()
    }

    /// The vendor of the first line that names one.
    ///
    /// Coupon eligibility is checked against this vendor.
    pub fn vendor_id(&self) -> Option<&str> {
        self.lines.iter().find_map(CartLine::vendor_id)
    }

    /// Get the number of lines in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

impl<'c, 'a> IntoIterator for &'c Cart<'a> {
    type Item = &'c CartLine<'a>;
    type IntoIter = std::slice::Iter<'c, CartLine<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn check_line(idx: usize, line: &CartLine<'_>, currency: &'static Currency) -> Result<(), CartError> {
    let line_currency = line.unit_price().currency();

    if line_currency != currency {
        return Err(CartError::CurrencyMismatch(
            idx,
            line_currency.iso_alpha_code,
            currency.iso_alpha_code,
        ));
    }

    if line.quantity() == 0 {
        return Err(CartError::ZeroQuantity(idx));
    }

    Ok(())
}
