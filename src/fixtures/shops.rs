//! Shop Fixtures

use rustc_hash::FxHashMap;
use serde::Deserialize;

/// Wrapper for a pickup shop directory in YAML.
#[derive(Debug, Deserialize)]
pub struct ShopsFixture {
    /// Map of shop key -> shop fixture
    pub shops: FxHashMap<String, ShopFixture>,
}

/// A pickup shop from YAML.
#[derive(Debug, Deserialize)]
pub struct ShopFixture {
    /// Display name
    pub name: String,

    /// Whether the shop is open for pickup
    pub open: bool,
}
