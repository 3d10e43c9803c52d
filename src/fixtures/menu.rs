//! Menu Fixtures

use rustc_hash::FxHashMap;
use serde::Deserialize;

/// Wrapper for a menu catalog in YAML.
#[derive(Debug, Deserialize)]
pub struct MenuFixture {
    /// ISO alpha currency code for every price in the file
    pub currency: String,

    /// Map of item key -> item fixture
    pub items: FxHashMap<String, MenuItemFixture>,
}

/// A menu item from YAML.
#[derive(Debug, Deserialize)]
pub struct MenuItemFixture {
    /// Display name
    pub name: String,

    /// Unit price, e.g. `"38.00"`
    pub price: String,

    /// Category the item is listed under
    pub category: String,

    /// Whether the item can currently be ordered
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}
