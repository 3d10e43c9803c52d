//! Shops
//!
//! Pickup locations as supplied by the location provider. A closed shop stays
//! listed so the caller can render it, but checkout refuses to proceed with it.

use slotmap::new_key_type;

new_key_type! {
    /// Shop Key
    pub struct ShopKey;
}

/// A pickup location with its open/closed status.
#[derive(Debug, Clone)]
pub struct Shop {
    /// Display name
    pub name: String,

    /// Whether the shop is currently open for pickup
    pub is_open: bool,
}

impl Shop {
    /// Create a new shop.
    pub fn new(name: impl Into<String>, is_open: bool) -> Self {
        Self {
            name: name.into(),
            is_open,
        }
    }
}
