//! Cart

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    menu::MenuItemKey,
    pricing::{PricingError, subtotal},
};

/// Errors related to cart construction or mutation.
#[derive(Debug, Error)]
pub enum CartError {
    /// A line's currency differs from the cart currency (index, line currency, cart currency).
    #[error("Line {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// No cart line references the given menu item.
    #[error("item {0:?} not in cart")]
    ItemNotFound(MenuItemKey),

    /// A quantity change overflowed the representable range.
    #[error("quantity change overflowed")]
    QuantityOverflow,
}

/// Outcome of a quantity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The line now has this quantity.
    Changed(u32),

    /// The change would have dropped the quantity below 1, so the line was removed.
    Removed,
}

/// A single item and quantity in the cart.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CartLine<'a> {
    item: MenuItemKey,
    unit_price: Money<'a, Currency>,
    quantity: u32,
}

impl<'a> CartLine<'a> {
    /// Create a new cart line. A quantity of 0 is treated as 1.
    pub fn new(item: MenuItemKey, unit_price: Money<'a, Currency>, quantity: u32) -> Self {
        Self {
            item,
            unit_price,
            quantity: quantity.max(1),
        }
    }

    /// The menu item this line references.
    pub fn item(&self) -> MenuItemKey {
        self.item
    }

    /// The unit price captured when the line was added.
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// The quantity ordered; always at least 1.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// The current session's cart: lines plus a single currency.
#[derive(Debug)]
pub struct Cart<'a> {
    lines: Vec<CartLine<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create a new empty cart in the given currency.
    #[must_use]
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
    /// Returns a `CartError` if any line's currency differs from the cart currency.
    pub fn with_lines(
        lines: impl Into<Vec<CartLine<'a>>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let lines = lines.into();

        lines.iter().enumerate().try_for_each(|(i, line)| {
            let line_currency = line.unit_price().currency();

            if line_currency == currency {
                Ok(())
            } else {
                Err(CartError::CurrencyMismatch(
                    i,
                    line_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ))
            }
        })?;

        Ok(Cart { lines, currency })
    }

    /// Add a line to the cart, merging quantities when the item is already present.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` on a currency mismatch or if the merged quantity overflows.
    pub fn add(&mut self, line: CartLine<'a>) -> Result<(), CartError> {
        let line_currency = line.unit_price().currency();

        if line_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                self.lines.len(),
                line_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        if let Some(existing) = self.lines.iter_mut().find(|l| l.item == line.item) {
            existing.quantity = existing
                .quantity
                .checked_add(line.quantity)
                .ok_or(CartError::QuantityOverflow)?;

            return Ok(());
        }

        self.lines.push(line);

        Ok(())
    }

    /// Change a line's quantity by a signed delta.
    ///
    /// A result below 1 removes the line instead of clamping.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if the item is not in the cart or the new quantity overflows.
    pub fn change_quantity(
        &mut self,
        item: MenuItemKey,
        delta: i32,
    ) -> Result<QuantityChange, CartError> {
        let position = self
            .lines
            .iter()
            .position(|l| l.item == item)
            .ok_or(CartError::ItemNotFound(item))?;

        let Some(line) = self.lines.get_mut(position) else {
            return Err(CartError::ItemNotFound(item));
        };

        let new_quantity = i64::from(line.quantity) + i64::from(delta);

        if new_quantity < 1 {
            self.lines.remove(position);
            return Ok(QuantityChange::Removed);
        }

        line.quantity = u32::try_from(new_quantity).map_err(|_err| CartError::QuantityOverflow)?;

        Ok(QuantityChange::Changed(line.quantity))
    }

    /// Remove a line from the cart, returning it.
    ///
    /// # Errors
    ///
    /// Returns a `CartError::ItemNotFound` if the item is not in the cart.
    pub fn remove(&mut self, item: MenuItemKey) -> Result<CartLine<'a>, CartError> {
        let position = self
            .lines
            .iter()
            .position(|l| l.item == item)
            .ok_or(CartError::ItemNotFound(item))?;

        Ok(self.lines.remove(position))
    }

    /// Get the line for a menu item.
    ///
    /// # Errors
    ///
    /// Returns a `CartError::ItemNotFound` if the item is not in the cart.
    pub fn get_line(&'a self, item: MenuItemKey) -> Result<&'a CartLine<'a>, CartError> {
        self.lines
            .iter()
            .find(|l| l.item == item)
            .ok_or(CartError::ItemNotFound(item))
    }

    /// Calculate the subtotal of the cart.
    ///
    /// # Errors
    ///
    /// Returns a `PricingError` if there was a money arithmetic or overflow error.
    pub fn subtotal(&'a self) -> Result<Money<'a, Currency>, PricingError> {
        if self.is_empty() {
            return Ok(Money::from_minor(0, self.currency));
        }

        subtotal(&self.lines)
    }

    /// Iterate over the lines in the cart.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine<'_>> {
        self.lines.iter()
    }

    /// Get the lines in the cart.
    #[must_use]
    pub fn lines(&self) -> &[CartLine<'a>] {
        &self.lines
    }

    /// Get the number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{
        Money,
        iso::{MYR, USD},
    };
    use slotmap::SlotMap;
    use testresult::TestResult;

    use super::*;

    fn keys(n: usize) -> Vec<MenuItemKey> {
        let mut map = SlotMap::<MenuItemKey, ()>::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    fn two_keys() -> (MenuItemKey, MenuItemKey) {
        let mut map = SlotMap::<MenuItemKey, ()>::with_key();
        (map.insert(()), map.insert(()))
    }

    #[test]
    fn new_with_currency() {
        let cart = Cart::new(MYR);

        assert_eq!(cart.currency(), MYR);
        assert!(cart.is_empty());
    }

    #[test]
    fn with_lines_currency_mismatch_errors() {
        let (pork, beef) = two_keys();

        let lines = [
            CartLine::new(pork, Money::from_minor(3800, MYR), 1),
            CartLine::new(beef, Money::from_minor(4200, USD), 1),
        ];

        let result = Cart::with_lines(lines, MYR);

        match result {
            Err(CartError::CurrencyMismatch(idx, line_currency, cart_currency)) => {
                assert_eq!(idx, 1);
                assert_eq!(line_currency, USD.iso_alpha_code);
                assert_eq!(cart_currency, MYR.iso_alpha_code);
            }
            other => panic!("expected CurrencyMismatch error, got {other:?}"),
        }
    }

    #[test]
    fn subtotal_sums_unit_price_times_quantity() -> TestResult {
        let (pork, beef) = two_keys();

        let cart = Cart::with_lines(
            [
                CartLine::new(pork, Money::from_minor(3800, MYR), 2),
                CartLine::new(beef, Money::from_minor(4200, MYR), 1),
            ],
            MYR,
        )?;

        assert_eq!(cart.subtotal()?, Money::from_minor(11800, MYR));

        Ok(())
    }

    #[test]
    fn subtotal_with_no_lines() -> TestResult {
        let cart = Cart::new(MYR);

        assert_eq!(cart.subtotal()?, Money::from_minor(0, MYR));

        Ok(())
    }

    #[test]
    fn add_merges_quantity_for_same_item() -> TestResult {
        let (pork, _) = two_keys();
        let mut cart = Cart::new(MYR);

        cart.add(CartLine::new(pork, Money::from_minor(3800, MYR), 1))?;
        cart.add(CartLine::new(pork, Money::from_minor(3800, MYR), 2))?;

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get_line(pork)?.quantity(), 3);

        Ok(())
    }

    #[test]
    fn add_rejects_currency_mismatch() {
        let (pork, _) = two_keys();
        let mut cart = Cart::new(MYR);

        let result = cart.add(CartLine::new(pork, Money::from_minor(3800, USD), 1));

        assert!(matches!(result, Err(CartError::CurrencyMismatch(0, _, _))));
    }

    #[test]
    fn change_quantity_updates_line() -> TestResult {
        let (pork, _) = two_keys();
        let mut cart = Cart::new(MYR);
        cart.add(CartLine::new(pork, Money::from_minor(3800, MYR), 2))?;

        let change = cart.change_quantity(pork, 1)?;

        assert_eq!(change, QuantityChange::Changed(3));
        assert_eq!(cart.get_line(pork)?.quantity(), 3);

        Ok(())
    }

    #[test]
    fn change_quantity_below_one_removes_line() -> TestResult {
        let (pork, _) = two_keys();
        let mut cart = Cart::new(MYR);
        cart.add(CartLine::new(pork, Money::from_minor(3800, MYR), 1))?;

        let change = cart.change_quantity(pork, -1)?;

        assert_eq!(change, QuantityChange::Removed);
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn change_quantity_missing_item_errors() {
        let (pork, _) = two_keys();
        let mut cart = Cart::new(MYR);

        let result = cart.change_quantity(pork, 1);

        assert!(matches!(result, Err(CartError::ItemNotFound(_))));
    }

    #[test]
    fn remove_returns_line() -> TestResult {
        let (pork, beef) = two_keys();
        let mut cart = Cart::new(MYR);
        cart.add(CartLine::new(pork, Money::from_minor(3800, MYR), 2))?;
        cart.add(CartLine::new(beef, Money::from_minor(4200, MYR), 1))?;

        let removed = cart.remove(pork)?;

        assert_eq!(removed.quantity(), 2);
        assert_eq!(cart.len(), 1);

        Ok(())
    }

    #[test]
    fn line_quantity_floor_is_one() {
        let keys = keys(1);
        let Some(&item) = keys.first() else {
            panic!("expected a key");
        };

        let line = CartLine::new(item, Money::from_minor(100, MYR), 0);

        assert_eq!(line.quantity(), 1);
    }

    #[test]
    fn iter_returns_lines_in_order() -> TestResult {
        let (pork, beef) = two_keys();

        let cart = Cart::with_lines(
            [
                CartLine::new(pork, Money::from_minor(3800, MYR), 2),
                CartLine::new(beef, Money::from_minor(4200, MYR), 1),
            ],
            MYR,
        )?;

        let prices: Vec<i64> = cart
            .iter()
            .map(|line| line.unit_price().to_minor_units())
            .collect();

        assert_eq!(prices, vec![3800, 4200]);

        Ok(())
    }
}
