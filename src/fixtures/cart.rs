//! Cart Fixtures
//!
//! Saved cart sessions: the explicit load/save hook for per-session cart
//! state, replacing any ambient storage.

use serde::{Deserialize, Serialize};

/// Wrapper for a saved cart session in YAML.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartFixture {
    /// Ordered cart lines
    pub lines: Vec<CartLineFixture>,
}

/// One saved cart line, referencing a menu item by its fixture key.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartLineFixture {
    /// Menu item key
    pub item: String,

    /// Quantity ordered
    pub quantity: u32,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn round_trips_through_yaml() -> TestResult {
        let fixture = CartFixture {
            lines: vec![
                CartLineFixture {
                    item: "pork-belly".to_string(),
                    quantity: 2,
                },
                CartLineFixture {
                    item: "bulgogi-beef".to_string(),
                    quantity: 1,
                },
            ],
        };

        let yaml = serde_norway::to_string(&fixture)?;
        let parsed: CartFixture = serde_norway::from_str(&yaml)?;

        assert_eq!(parsed, fixture);

        Ok(())
    }
}
