//! Orders
//!
//! Data contracts for the submission boundary. Amounts cross the boundary as
//! minor units plus an ISO currency code; rates as decimals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How the order will be fulfilled. Exactly one is active per checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// Collected by the customer from a shop
    #[default]
    Pickup,

    /// Delivered to an address
    Delivery,

    /// Consumed on premises
    DineIn,
}

/// Payment method chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Redirect to the customer's bank
    OnlineBanking,

    /// Scan-to-pay QR code
    QrPay,

    /// Bank card
    Card,
}

/// Status reported for a submitted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Accepted and confirmed by the kitchen
    #[default]
    Confirmed,

    /// Being prepared
    Preparing,

    /// Ready for pickup or handoff to the courier
    Ready,

    /// Fulfilled
    Completed,
}

/// Contact details for the person placing the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Full name
    pub name: String,

    /// Contact phone number
    pub phone: String,

    /// Contact email
    pub email: String,
}

/// One ordered item with the price captured at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Menu item identifier
    pub id: String,

    /// Quantity ordered
    pub quantity: u32,

    /// Unit price at order time, in minor units
    pub price_at_order_minor: i64,
}

/// The outbound order submission payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    /// Who is ordering
    pub customer: Customer,

    /// Ordered items
    pub lines: Vec<OrderLine>,

    /// How the order is fulfilled
    pub order_type: OrderType,

    /// Free-text kitchen instructions
    pub special_instructions: Option<String>,

    /// Payment method selected at checkout
    pub payment_method: PaymentMethod,

    /// Client-side estimated total, in minor units
    pub estimated_total_minor: i64,

    /// ISO alpha currency code for all amounts
    pub currency: String,
}

/// Per-item summary echoed back in the acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSummary {
    /// Item name
    pub name: String,

    /// Quantity ordered
    pub quantity: u32,

    /// Unit price, in minor units
    pub unit_price_minor: i64,

    /// Quantity × unit price, in minor units
    pub line_total_minor: i64,
}

/// Server-side financial breakdown of a created order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderFinancials {
    /// Sum of line totals, in minor units
    pub subtotal_minor: i64,

    /// Tax rate applied, as a fraction (e.g. 0.07)
    pub tax_rate: Decimal,

    /// Tax charged, in minor units
    pub tax_amount_minor: i64,

    /// Service fee charged, in minor units
    pub service_fee_minor: i64,

    /// Grand total, in minor units
    pub total_minor: i64,
}

/// Acknowledgment returned by the order-submission collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAcknowledgment {
    /// Assigned order identifier
    pub order_id: String,

    /// Order status at creation
    pub status: OrderStatus,

    /// Short confirmation code shown to the customer
    pub confirmation_number: String,

    /// Name echoed from the draft
    pub customer_name: String,

    /// Estimated minutes until the order is ready
    pub pickup_estimate_minutes: u32,

    /// Per-item summary
    pub items_summary: Vec<ItemSummary>,

    /// Financial breakdown
    pub financials: OrderFinancials,

    /// Instructions echoed from the draft
    pub instructions: Option<String>,
}

/// Request to open a payment session for a created order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSessionRequest {
    /// Order being paid for
    pub order_id: String,

    /// Amount to collect, in minor units
    pub amount_minor: i64,

    /// ISO alpha currency code
    pub currency: String,
}

/// Status of a payment session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentSessionStatus {
    /// Session opened, awaiting payment
    #[default]
    Created,

    /// Payment received
    Paid,

    /// Payment failed or was abandoned
    Failed,
}

/// An open payment session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSession {
    /// Session identifier
    pub session_id: String,

    /// Session status
    pub status: PaymentSessionStatus,

    /// Amount to collect, in minor units
    pub amount_minor: i64,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn order_type_serializes_snake_case() -> TestResult {
        let json = serde_norway::to_string(&OrderType::DineIn)?;

        assert_eq!(json.trim(), "dine_in");

        Ok(())
    }

    #[test]
    fn order_status_round_trips() -> TestResult {
        let status: OrderStatus = serde_norway::from_str("CONFIRMED")?;

        assert_eq!(status, OrderStatus::Confirmed);

        Ok(())
    }

    #[test]
    fn draft_round_trips_through_yaml() -> TestResult {
        let draft = OrderDraft {
            customer: Customer {
                name: "Customer".to_string(),
                phone: "012-3456789".to_string(),
                email: "c@example.com".to_string(),
            },
            lines: vec![OrderLine {
                id: "pork-belly".to_string(),
                quantity: 2,
                price_at_order_minor: 3800,
            }],
            order_type: OrderType::Delivery,
            special_instructions: None,
            payment_method: PaymentMethod::QrPay,
            estimated_total_minor: 7600,
            currency: "MYR".to_string(),
        };

        let yaml = serde_norway::to_string(&draft)?;
        let parsed: OrderDraft = serde_norway::from_str(&yaml)?;

        assert_eq!(parsed, draft);

        Ok(())
    }
}
