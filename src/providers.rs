//! Providers
//!
//! Seams for the external collaborators the engine submits to. Transport is
//! the embedding application's concern; these traits are plain call-and-return
//! and the checkout machine guarantees a single outstanding submission.

use std::sync::atomic::{AtomicU64, Ordering};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    checkout::SubmissionFailure,
    orders::{
        ItemSummary, OrderAcknowledgment, OrderDraft, OrderFinancials, OrderStatus, PaymentSession,
        PaymentSessionRequest, PaymentSessionStatus,
    },
    pricing::percent_of_minor,
};

/// Minutes until a submitted order is estimated to be ready.
const PICKUP_ESTIMATE_MINUTES: u32 = 30;

/// Errors returned by gateway collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The service processed the request and rejected it.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The request never completed.
    #[error("network error: {0}")]
    Network(String),
}

impl From<GatewayError> for SubmissionFailure {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Rejected(reason) => SubmissionFailure::Rejected(reason),
            GatewayError::Network(reason) => SubmissionFailure::Network(reason),
        }
    }
}

/// Accepts order drafts and returns created-order acknowledgments.
pub trait OrderGateway {
    /// Submit an order draft.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the order was rejected or unreachable.
    fn submit(&self, draft: &OrderDraft) -> Result<OrderAcknowledgment, GatewayError>;
}

/// Opens payment sessions for created orders.
pub trait PaymentGateway {
    /// Open a payment session.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the session could not be opened.
    fn create_session(&self, request: &PaymentSessionRequest)
    -> Result<PaymentSession, GatewayError>;
}

/// In-memory gateway for tests and demos.
///
/// Behaves like the real order service: sequential `KBQ-` order ids, a
/// 30-minute pickup estimate and 7% sales-tax financials computed from the
/// draft lines.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    next_order: AtomicU64,
    failure: Option<GatewayError>,
}

impl InMemoryGateway {
    /// A gateway that accepts every submission.
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway that fails every request with the given error.
    pub fn failing(failure: GatewayError) -> Self {
        Self {
            next_order: AtomicU64::new(0),
            failure: Some(failure),
        }
    }
}

impl OrderGateway for InMemoryGateway {
    fn submit(&self, draft: &OrderDraft) -> Result<OrderAcknowledgment, GatewayError> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }

        let seq = self.next_order.fetch_add(1, Ordering::Relaxed) + 1;
        let confirmation_number = format!("C{seq:04}");
        let order_id = format!("KBQ-{seq:06}");

        let mut items_summary = Vec::with_capacity(draft.lines.len());
        let mut subtotal_minor: i64 = 0;

        for line in &draft.lines {
            let line_total_minor = line
                .price_at_order_minor
                .checked_mul(i64::from(line.quantity))
                .ok_or_else(|| GatewayError::Rejected("line total overflowed".to_string()))?;

            subtotal_minor = subtotal_minor
                .checked_add(line_total_minor)
                .ok_or_else(|| GatewayError::Rejected("subtotal overflowed".to_string()))?;

            items_summary.push(ItemSummary {
                name: line.id.clone(),
                quantity: line.quantity,
                unit_price_minor: line.price_at_order_minor,
                line_total_minor,
            });
        }

        let tax_rate = Decimal::new(7, 2);
        let tax_amount_minor = percent_of_minor(Percentage::from(tax_rate), subtotal_minor)
            .map_err(|err| GatewayError::Rejected(err.to_string()))?;

        let service_fee_minor = 0;
        let total_minor = subtotal_minor
            .checked_add(tax_amount_minor)
            .and_then(|sum| sum.checked_add(service_fee_minor))
            .ok_or_else(|| GatewayError::Rejected("total overflowed".to_string()))?;

        Ok(OrderAcknowledgment {
            order_id,
            status: OrderStatus::Confirmed,
            confirmation_number,
            customer_name: draft.customer.name.clone(),
            pickup_estimate_minutes: PICKUP_ESTIMATE_MINUTES,
            items_summary,
            financials: OrderFinancials {
                subtotal_minor,
                tax_rate,
                tax_amount_minor,
                service_fee_minor,
                total_minor,
            },
            instructions: draft.special_instructions.clone(),
        })
    }
}

impl PaymentGateway for InMemoryGateway {
    fn create_session(
        &self,
        request: &PaymentSessionRequest,
    ) -> Result<PaymentSession, GatewayError> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }

        Ok(PaymentSession {
            session_id: format!("PAY-{}", request.order_id),
            status: PaymentSessionStatus::Created,
            amount_minor: request.amount_minor,
        })
    }
}
