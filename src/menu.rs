//! Menu

use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;

new_key_type! {
    /// Menu Item Key
    pub struct MenuItemKey;
}

/// A dish on the menu, as supplied by the catalog provider.
#[derive(Debug, Clone)]
pub struct MenuItem<'a> {
    /// Display name
    pub name: String,

    /// Unit price
    pub unit_price: Money<'a, Currency>,

    /// Category the item is listed under
    pub category: String,

    /// Whether the item can currently be ordered
    pub available: bool,
}

impl<'a> MenuItem<'a> {
    /// Create a new, available menu item.
    pub fn new(
        name: impl Into<String>,
        unit_price: Money<'a, Currency>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            unit_price,
            category: category.into(),
            available: true,
        }
    }
}
