//! Checkout
//!
//! The checkout progression state machine:
//!
//! ```text
//! Browsing --(proceed)--> ServiceDetailsEntry
//! ServiceDetailsEntry --(validate OK)--> PaymentMethodSelection
//! ServiceDetailsEntry --(validate FAIL)--> ServiceDetailsEntry
//! PaymentMethodSelection --(submit)--> Submitting
//! Submitting --(success)--> Confirmed
//! Submitting --(failure)--> Failed
//! Failed --(retry)--> PaymentMethodSelection
//! ```
//!
//! All cart mutations and recomputes are synchronous; the only asynchronous
//! boundary is order submission, which the machine guards so a single request
//! is outstanding at a time. Nothing here is fatal: every failure returns the
//! session to an interactive state.

use std::fmt;

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use slotmap::SlotMap;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    cart::Cart,
    menu::MenuItemKey,
    orders::{Customer, OrderDraft, OrderLine, OrderType, PaymentMethod},
    shops::{Shop, ShopKey},
    vouchers::{Voucher, VoucherKey},
};

pub mod address;

use address::DeliveryAddress;

/// A form field that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Pickup location selector
    PickupShop,

    /// Recipient full name
    FullName,

    /// Contact phone
    Phone,

    /// Address line 1
    AddressLine1,

    /// City
    City,

    /// State
    State,

    /// Postcode
    Postcode,
}

impl Field {
    /// Stable key for the field, matching the order form's field names.
    pub fn key(self) -> &'static str {
        match self {
            Field::PickupShop => "pickup_shop",
            Field::FullName => "full_name",
            Field::Phone => "phone",
            Field::AddressLine1 => "line1",
            Field::City => "city",
            Field::State => "state",
            Field::Postcode => "postcode",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A single keyed validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    /// Which field failed
    pub field: Field,

    /// Message to render next to the field
    pub message: &'static str,
}

impl FieldError {
    /// Create a new field error.
    pub fn new(field: Field, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Collected validation failures for one validation pass.
pub type FieldErrors = SmallVec<[FieldError; 8]>;

/// Where the session is in the checkout progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutState {
    /// Reviewing the cart
    #[default]
    Browsing,

    /// Entering order-type specific details
    ServiceDetailsEntry,

    /// Picking a payment method
    PaymentMethodSelection,

    /// Submission request in flight
    Submitting,

    /// Order accepted; terminal
    Confirmed,

    /// Submission failed; retry available
    Failed,
}

impl fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckoutState::Browsing => "browsing",
            CheckoutState::ServiceDetailsEntry => "service details entry",
            CheckoutState::PaymentMethodSelection => "payment method selection",
            CheckoutState::Submitting => "submitting",
            CheckoutState::Confirmed => "confirmed",
            CheckoutState::Failed => "failed",
        };

        f.write_str(name)
    }
}

/// Why a submission attempt failed. Both variants are recoverable via retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionFailure {
    /// The order service rejected the submission.
    #[error("order service rejected the submission: {0}")]
    Rejected(String),

    /// The submission never reached the order service.
    #[error("network failure before the order service replied: {0}")]
    Network(String),
}

/// Errors surfaced by checkout operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// One or more fields failed validation; re-render with the messages.
    #[error("{} field(s) failed validation", .0.len())]
    Validation(FieldErrors),

    /// The selected pickup location is closed.
    #[error("selected pickup location is closed")]
    LocationClosed,

    /// The selected voucher is no longer eligible; it has been cleared.
    #[error("voucher is no longer eligible for this order")]
    VoucherIneligible,

    /// No payment method has been chosen yet.
    #[error("no payment method selected")]
    NoPaymentMethod,

    /// A cart line references an item with no catalog identifier.
    #[error("cart item {0:?} has no catalog identifier")]
    UnknownItem(MenuItemKey),

    /// The operation is not allowed in the current state.
    #[error("cannot {action} while checkout is {state}")]
    InvalidState {
        /// State the session was in
        state: CheckoutState,

        /// Operation that was attempted
        action: &'static str,
    },
}

/// A single customer's checkout session.
///
/// Owns the per-session selections (order type, shop, address, payment method,
/// voucher); the cart itself is passed in where needed so it survives failed
/// submissions untouched.
#[derive(Debug, Default)]
pub struct Checkout {
    session_id: String,
    state: CheckoutState,
    order_type: OrderType,
    pickup_shop: Option<ShopKey>,
    address: DeliveryAddress,
    special_instructions: Option<String>,
    payment_method: Option<PaymentMethod>,
    selected_voucher: Option<VoucherKey>,
    field_errors: FieldErrors,
    last_failure: Option<SubmissionFailure>,
}

impl Checkout {
    /// Start a new checkout session. The default order type is pickup.
    pub fn new(session_id: impl Into<String>) -> Self {
        Checkout {
            session_id: session_id.into(),
            ..Checkout::default()
        }
    }

    /// The session identifier the submission guard is keyed by.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Current state.
    pub fn state(&self) -> CheckoutState {
        self.state
    }

    /// Active order type.
    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    /// Selected pickup shop, if any.
    pub fn pickup_shop(&self) -> Option<ShopKey> {
        self.pickup_shop
    }

    /// Delivery address as entered so far.
    pub fn address(&self) -> &DeliveryAddress {
        &self.address
    }

    /// Mutable access for form binding.
    pub fn address_mut(&mut self) -> &mut DeliveryAddress {
        &mut self.address
    }

    /// Free-text kitchen instructions.
    pub fn special_instructions(&self) -> Option<&str> {
        self.special_instructions.as_deref()
    }

    /// Set or clear the kitchen instructions.
    pub fn set_special_instructions(&mut self, instructions: Option<String>) {
        self.special_instructions = instructions;
    }

    /// Chosen payment method, if any.
    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    /// Currently selected voucher, if any.
    pub fn selected_voucher(&self) -> Option<VoucherKey> {
        self.selected_voucher
    }

    /// Field errors from the last validation pass.
    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    /// Failure recorded by the last submission attempt.
    pub fn last_failure(&self) -> Option<&SubmissionFailure> {
        self.last_failure.as_ref()
    }

    /// Switch the active order type.
    ///
    /// Switching destructively resets the other type's fields (pickup shop,
    /// delivery address) and clears field errors. If payment was already
    /// reached, the session regresses to service details entry so the new
    /// type is re-validated.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidState`] while submitting or after
    /// confirmation.
    pub fn set_order_type(&mut self, order_type: OrderType) -> Result<(), CheckoutError> {
        self.ensure_interactive("switch order type")?;

        if self.order_type == order_type {
            return Ok(());
        }

        debug!(session = %self.session_id, from = ?self.order_type, to = ?order_type, "order type switched");

        self.order_type = order_type;
        self.field_errors.clear();

        match order_type {
            OrderType::Delivery => {
                self.pickup_shop = None;
            }
            OrderType::Pickup => {
                self.address.clear();
            }
            OrderType::DineIn => {
                self.pickup_shop = None;
                self.address.clear();
            }
        }

        if matches!(
            self.state,
            CheckoutState::PaymentMethodSelection | CheckoutState::Failed
        ) {
            self.state = CheckoutState::ServiceDetailsEntry;
        }

        Ok(())
    }

    /// Select a pickup shop. Open/closed is checked when proceeding, not here,
    /// so the caller can render the selection with its status.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidState`] while submitting or after
    /// confirmation.
    pub fn select_pickup_shop(&mut self, shop: ShopKey) -> Result<(), CheckoutError> {
        self.ensure_interactive("select a pickup shop")?;
        self.pickup_shop = Some(shop);

        Ok(())
    }

    /// Move from cart review into service details entry.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidState`] unless browsing.
    pub fn proceed(&mut self) -> Result<(), CheckoutError> {
        if self.state != CheckoutState::Browsing {
            return Err(CheckoutError::InvalidState {
                state: self.state,
                action: "proceed to service details",
            });
        }

        self.state = CheckoutState::ServiceDetailsEntry;

        Ok(())
    }

    /// Validate the details required by the active order type and, on success,
    /// advance to payment method selection.
    ///
    /// Validation failures leave the session in service details entry with
    /// keyed field errors available from [`Checkout::field_errors`].
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Validation`]: required fields are missing or invalid.
    /// - [`CheckoutError::LocationClosed`]: the selected pickup shop is closed.
    /// - [`CheckoutError::InvalidState`]: not in service details entry.
    pub fn confirm_service_details(
        &mut self,
        shops: &SlotMap<ShopKey, Shop>,
    ) -> Result<(), CheckoutError> {
        if self.state != CheckoutState::ServiceDetailsEntry {
            return Err(CheckoutError::InvalidState {
                state: self.state,
                action: "confirm service details",
            });
        }

        match self.order_type {
            OrderType::Pickup => {
                let Some(shop) = self.pickup_shop.and_then(|key| shops.get(key)) else {
                    let errors: FieldErrors = SmallVec::from_slice(&[FieldError::new(
                        Field::PickupShop,
                        "Please select a pickup location",
                    )]);

                    self.field_errors = errors.clone();

                    return Err(CheckoutError::Validation(errors));
                };

                if !shop.is_open {
                    warn!(session = %self.session_id, shop = %shop.name, "pickup shop is closed");

                    return Err(CheckoutError::LocationClosed);
                }
            }
            OrderType::Delivery => {
                let errors = self.address.validate();

                if !errors.is_empty() {
                    self.field_errors = errors.clone();

                    return Err(CheckoutError::Validation(errors));
                }
            }
            OrderType::DineIn => {}
        }

        self.field_errors.clear();
        self.state = CheckoutState::PaymentMethodSelection;

        debug!(session = %self.session_id, "service details confirmed");

        Ok(())
    }

    /// Choose the payment method.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidState`] unless selecting a payment
    /// method.
    pub fn choose_payment_method(&mut self, method: PaymentMethod) -> Result<(), CheckoutError> {
        if self.state != CheckoutState::PaymentMethodSelection {
            return Err(CheckoutError::InvalidState {
                state: self.state,
                action: "choose a payment method",
            });
        }

        self.payment_method = Some(method);

        Ok(())
    }

    /// Select a voucher, replacing any current selection.
    ///
    /// Eligibility is a precondition for selection; an ineligible voucher is
    /// rejected and the current selection is kept. Returns the replaced key,
    /// if any.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::VoucherIneligible`] if the voucher's
    /// conditions are not met at the given subtotal.
    pub fn select_voucher(
        &mut self,
        key: VoucherKey,
        voucher: &Voucher<'_>,
        subtotal: &Money<'_, Currency>,
    ) -> Result<Option<VoucherKey>, CheckoutError> {
        if !voucher.is_eligible(subtotal) {
            return Err(CheckoutError::VoucherIneligible);
        }

        debug!(session = %self.session_id, ?key, "voucher selected");

        Ok(self.selected_voucher.replace(key))
    }

    /// Clear the voucher selection, returning the cleared key.
    pub fn clear_voucher(&mut self) -> Option<VoucherKey> {
        self.selected_voucher.take()
    }

    /// Re-validate the selected voucher after a cart change.
    ///
    /// A voucher that became ineligible (or disappeared from the book) is
    /// cleared so it cannot silently apply.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::VoucherIneligible`] if the selection was
    /// cleared; the caller should notify the customer.
    pub fn revalidate_voucher(
        &mut self,
        vouchers: &SlotMap<VoucherKey, Voucher<'_>>,
        subtotal: &Money<'_, Currency>,
    ) -> Result<(), CheckoutError> {
        let Some(key) = self.selected_voucher else {
            return Ok(());
        };

        let still_eligible = vouchers
            .get(key)
            .is_some_and(|voucher| voucher.is_eligible(subtotal));

        if still_eligible {
            return Ok(());
        }

        warn!(session = %self.session_id, ?key, "voucher no longer eligible; cleared");

        self.selected_voucher = None;

        Err(CheckoutError::VoucherIneligible)
    }

    /// Whether a submission could start right now.
    pub fn can_submit(&self) -> bool {
        self.state == CheckoutState::PaymentMethodSelection && self.payment_method.is_some()
    }

    /// Mark the submission as in flight.
    ///
    /// While submitting, every further `begin_submission` call is rejected, so
    /// at most one request is outstanding per session.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::NoPaymentMethod`]: no payment method chosen.
    /// - [`CheckoutError::InvalidState`]: not at payment method selection
    ///   (including a submission already in flight).
    pub fn begin_submission(&mut self) -> Result<(), CheckoutError> {
        if self.state != CheckoutState::PaymentMethodSelection {
            return Err(CheckoutError::InvalidState {
                state: self.state,
                action: "submit the order",
            });
        }

        if self.payment_method.is_none() {
            return Err(CheckoutError::NoPaymentMethod);
        }

        self.last_failure = None;
        self.state = CheckoutState::Submitting;

        debug!(session = %self.session_id, "submission started");

        Ok(())
    }

    /// Record a successful submission. Terminal.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidState`] unless a submission is in
    /// flight.
    pub fn complete_submission(&mut self) -> Result<(), CheckoutError> {
        if self.state != CheckoutState::Submitting {
            return Err(CheckoutError::InvalidState {
                state: self.state,
                action: "complete the submission",
            });
        }

        self.state = CheckoutState::Confirmed;

        debug!(session = %self.session_id, "order confirmed");

        Ok(())
    }

    /// Record a failed submission. The session keeps its selections and the
    /// failure is surfaced with a retry affordance; the engine never retries
    /// by itself.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidState`] unless a submission is in
    /// flight.
    pub fn fail_submission(&mut self, failure: SubmissionFailure) -> Result<(), CheckoutError> {
        if self.state != CheckoutState::Submitting {
            return Err(CheckoutError::InvalidState {
                state: self.state,
                action: "fail the submission",
            });
        }

        warn!(session = %self.session_id, %failure, "submission failed");

        self.last_failure = Some(failure);
        self.state = CheckoutState::Failed;

        Ok(())
    }

    /// Return to payment method selection after a failure.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidState`] unless the last submission
    /// failed.
    pub fn retry(&mut self) -> Result<(), CheckoutError> {
        if self.state != CheckoutState::Failed {
            return Err(CheckoutError::InvalidState {
                state: self.state,
                action: "retry the submission",
            });
        }

        self.state = CheckoutState::PaymentMethodSelection;

        Ok(())
    }

    /// Assemble the outbound order draft from the cart and the session's
    /// selections.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::NoPaymentMethod`]: no payment method chosen.
    /// - [`CheckoutError::UnknownItem`]: a cart line has no catalog
    ///   identifier in `item_ids`.
    pub fn order_draft(
        &self,
        cart: &Cart<'_>,
        item_ids: &FxHashMap<MenuItemKey, String>,
        customer: Customer,
        estimated_total: &Money<'_, Currency>,
    ) -> Result<OrderDraft, CheckoutError> {
        let Some(payment_method) = self.payment_method else {
            return Err(CheckoutError::NoPaymentMethod);
        };

        let lines = cart
            .iter()
            .map(|line| {
                let id = item_ids
                    .get(&line.item())
                    .ok_or(CheckoutError::UnknownItem(line.item()))?;

                Ok(OrderLine {
                    id: id.clone(),
                    quantity: line.quantity(),
                    price_at_order_minor: line.unit_price().to_minor_units(),
                })
            })
            .collect::<Result<Vec<_>, CheckoutError>>()?;

        Ok(OrderDraft {
            customer,
            lines,
            order_type: self.order_type,
            special_instructions: self.special_instructions.clone(),
            payment_method,
            estimated_total_minor: estimated_total.to_minor_units(),
            currency: cart.currency().iso_alpha_code.to_string(),
        })
    }

    /// Reject mutating operations while a submission is in flight or after
    /// the terminal state.
    fn ensure_interactive(&self, action: &'static str) -> Result<(), CheckoutError> {
        if matches!(
            self.state,
            CheckoutState::Submitting | CheckoutState::Confirmed
        ) {
            return Err(CheckoutError::InvalidState {
                state: self.state,
                action,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::MYR;
    use testresult::TestResult;

    use crate::cart::CartLine;

    use super::*;

    fn rm(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, MYR)
    }

    fn shops_with_open_and_closed() -> (SlotMap<ShopKey, Shop>, ShopKey, ShopKey) {
        let mut shops = SlotMap::with_key();
        let open = shops.insert(Shop::new("SanSan BBQ — KLCC", true));
        let closed = shops.insert(Shop::new("SanSan BBQ — Bangsar", false));

        (shops, open, closed)
    }

    fn filled_address() -> DeliveryAddress {
        DeliveryAddress {
            full_name: "Aina Binti Ahmad".to_string(),
            phone: "012-3456789".to_string(),
            line1: "12 Jalan Ampang".to_string(),
            line2: String::new(),
            city: "Kuala Lumpur".to_string(),
            state: "WP Kuala Lumpur".to_string(),
            postcode: "50450".to_string(),
        }
    }

    #[test]
    fn happy_path_reaches_confirmed() -> TestResult {
        let (shops, open, _) = shops_with_open_and_closed();
        let mut checkout = Checkout::new("session-1");

        checkout.select_pickup_shop(open)?;
        checkout.proceed()?;
        checkout.confirm_service_details(&shops)?;
        checkout.choose_payment_method(PaymentMethod::QrPay)?;
        checkout.begin_submission()?;
        checkout.complete_submission()?;

        assert_eq!(checkout.state(), CheckoutState::Confirmed);

        Ok(())
    }

    #[test]
    fn proceed_requires_browsing() -> TestResult {
        let mut checkout = Checkout::new("session-1");
        checkout.proceed()?;

        let result = checkout.proceed();

        assert!(matches!(
            result,
            Err(CheckoutError::InvalidState {
                state: CheckoutState::ServiceDetailsEntry,
                ..
            })
        ));

        Ok(())
    }

    #[test]
    fn pickup_without_shop_is_a_field_error() -> TestResult {
        let (shops, _, _) = shops_with_open_and_closed();
        let mut checkout = Checkout::new("session-1");
        checkout.proceed()?;

        let result = checkout.confirm_service_details(&shops);

        match result {
            Err(CheckoutError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert!(
                    errors.iter().any(|e| e.field == Field::PickupShop),
                    "expected a pickup shop error"
                );
            }
            other => panic!("expected Validation error, got {other:?}"),
        }

        assert_eq!(checkout.state(), CheckoutState::ServiceDetailsEntry);
        assert_eq!(checkout.field_errors().len(), 1);

        Ok(())
    }

    #[test]
    fn closed_shop_blocks_proceeding() -> TestResult {
        let (shops, _, closed) = shops_with_open_and_closed();
        let mut checkout = Checkout::new("session-1");

        checkout.select_pickup_shop(closed)?;
        checkout.proceed()?;

        let result = checkout.confirm_service_details(&shops);

        assert!(matches!(result, Err(CheckoutError::LocationClosed)));
        assert_eq!(checkout.state(), CheckoutState::ServiceDetailsEntry);

        Ok(())
    }

    #[test]
    fn delivery_validates_address_fields() -> TestResult {
        let (shops, _, _) = shops_with_open_and_closed();
        let mut checkout = Checkout::new("session-1");

        checkout.set_order_type(OrderType::Delivery)?;
        checkout.proceed()?;

        let result = checkout.confirm_service_details(&shops);

        match result {
            Err(CheckoutError::Validation(errors)) => {
                assert!(
                    errors.iter().any(|e| e.field == Field::Postcode),
                    "expected a postcode error"
                );
            }
            other => panic!("expected Validation error, got {other:?}"),
        }

        *checkout.address_mut() = filled_address();
        checkout.confirm_service_details(&shops)?;

        assert_eq!(checkout.state(), CheckoutState::PaymentMethodSelection);

        Ok(())
    }

    #[test]
    fn dine_in_needs_no_details() -> TestResult {
        let (shops, _, _) = shops_with_open_and_closed();
        let mut checkout = Checkout::new("session-1");

        checkout.set_order_type(OrderType::DineIn)?;
        checkout.proceed()?;
        checkout.confirm_service_details(&shops)?;

        assert_eq!(checkout.state(), CheckoutState::PaymentMethodSelection);

        Ok(())
    }

    #[test]
    fn switching_away_from_delivery_clears_address_and_errors() -> TestResult {
        let (shops, _, _) = shops_with_open_and_closed();
        let mut checkout = Checkout::new("session-1");

        checkout.set_order_type(OrderType::Delivery)?;
        checkout.address_mut().city = "Kuala Lumpur".to_string();
        checkout.proceed()?;

        // Fails validation and records field errors.
        let result = checkout.confirm_service_details(&shops);
        assert!(result.is_err(), "expected a validation failure");
        assert!(!checkout.field_errors().is_empty());

        checkout.set_order_type(OrderType::Pickup)?;

        assert!(checkout.address().is_empty());
        assert!(checkout.field_errors().is_empty());

        Ok(())
    }

    #[test]
    fn switching_to_delivery_clears_pickup_shop() -> TestResult {
        let (_, open, _) = shops_with_open_and_closed();
        let mut checkout = Checkout::new("session-1");

        checkout.select_pickup_shop(open)?;
        checkout.set_order_type(OrderType::Delivery)?;

        assert_eq!(checkout.pickup_shop(), None);

        Ok(())
    }

    #[test]
    fn switch_after_payment_selection_regresses_to_details() -> TestResult {
        let (shops, open, _) = shops_with_open_and_closed();
        let mut checkout = Checkout::new("session-1");

        checkout.select_pickup_shop(open)?;
        checkout.proceed()?;
        checkout.confirm_service_details(&shops)?;
        checkout.set_order_type(OrderType::DineIn)?;

        assert_eq!(checkout.state(), CheckoutState::ServiceDetailsEntry);

        Ok(())
    }

    #[test]
    fn submission_requires_payment_method() -> TestResult {
        let (shops, open, _) = shops_with_open_and_closed();
        let mut checkout = Checkout::new("session-1");

        checkout.select_pickup_shop(open)?;
        checkout.proceed()?;
        checkout.confirm_service_details(&shops)?;

        let result = checkout.begin_submission();

        assert!(matches!(result, Err(CheckoutError::NoPaymentMethod)));
        assert!(!checkout.can_submit());

        Ok(())
    }

    #[test]
    fn duplicate_submission_is_rejected() -> TestResult {
        let (shops, open, _) = shops_with_open_and_closed();
        let mut checkout = Checkout::new("session-1");

        checkout.select_pickup_shop(open)?;
        checkout.proceed()?;
        checkout.confirm_service_details(&shops)?;
        checkout.choose_payment_method(PaymentMethod::Card)?;
        checkout.begin_submission()?;

        let result = checkout.begin_submission();

        assert!(matches!(
            result,
            Err(CheckoutError::InvalidState {
                state: CheckoutState::Submitting,
                ..
            })
        ));

        Ok(())
    }

    #[test]
    fn failed_submission_keeps_failure_and_allows_retry() -> TestResult {
        let (shops, open, _) = shops_with_open_and_closed();
        let mut checkout = Checkout::new("session-1");

        checkout.select_pickup_shop(open)?;
        checkout.proceed()?;
        checkout.confirm_service_details(&shops)?;
        checkout.choose_payment_method(PaymentMethod::OnlineBanking)?;
        checkout.begin_submission()?;
        checkout.fail_submission(SubmissionFailure::Network("timed out".to_string()))?;

        assert_eq!(checkout.state(), CheckoutState::Failed);
        assert!(matches!(
            checkout.last_failure(),
            Some(SubmissionFailure::Network(_))
        ));

        checkout.retry()?;

        assert_eq!(checkout.state(), CheckoutState::PaymentMethodSelection);
        assert!(checkout.can_submit());

        Ok(())
    }

    #[test]
    fn confirmed_is_terminal() -> TestResult {
        let (shops, open, _) = shops_with_open_and_closed();
        let mut checkout = Checkout::new("session-1");

        checkout.select_pickup_shop(open)?;
        checkout.proceed()?;
        checkout.confirm_service_details(&shops)?;
        checkout.choose_payment_method(PaymentMethod::QrPay)?;
        checkout.begin_submission()?;
        checkout.complete_submission()?;

        assert!(matches!(
            checkout.set_order_type(OrderType::Delivery),
            Err(CheckoutError::InvalidState { .. })
        ));
        assert!(matches!(
            checkout.retry(),
            Err(CheckoutError::InvalidState { .. })
        ));

        Ok(())
    }

    #[test]
    fn selecting_a_second_voucher_replaces_the_first() -> TestResult {
        let mut vouchers = SlotMap::<VoucherKey, Voucher<'_>>::with_key();
        let first = vouchers.insert(Voucher::NewUserMinus {
            amount_off: rm(1000),
        });
        let second = vouchers.insert(Voucher::ThresholdMinus {
            min_subtotal: rm(25000),
            amount_off: rm(1000),
        });

        let mut checkout = Checkout::new("session-1");
        let subtotal = rm(26000);

        let first_voucher = vouchers.get(first).ok_or("missing voucher")?;
        let second_voucher = vouchers.get(second).ok_or("missing voucher")?;

        assert_eq!(
            checkout.select_voucher(first, first_voucher, &subtotal)?,
            None
        );
        assert_eq!(
            checkout.select_voucher(second, second_voucher, &subtotal)?,
            Some(first)
        );
        assert_eq!(checkout.selected_voucher(), Some(second));

        Ok(())
    }

    #[test]
    fn ineligible_voucher_cannot_be_selected() -> TestResult {
        let mut vouchers = SlotMap::<VoucherKey, Voucher<'_>>::with_key();
        let key = vouchers.insert(Voucher::ThresholdMinus {
            min_subtotal: rm(25000),
            amount_off: rm(1000),
        });

        let mut checkout = Checkout::new("session-1");
        let voucher = vouchers.get(key).ok_or("missing voucher")?;

        let result = checkout.select_voucher(key, voucher, &rm(10000));

        assert!(matches!(result, Err(CheckoutError::VoucherIneligible)));
        assert_eq!(checkout.selected_voucher(), None);

        Ok(())
    }

    #[test]
    fn revalidation_clears_voucher_after_cart_shrinks() -> TestResult {
        let mut vouchers = SlotMap::<VoucherKey, Voucher<'_>>::with_key();
        let key = vouchers.insert(Voucher::ThresholdMinus {
            min_subtotal: rm(25000),
            amount_off: rm(1000),
        });

        let mut checkout = Checkout::new("session-1");
        let voucher = vouchers.get(key).ok_or("missing voucher")?;
        checkout.select_voucher(key, voucher, &rm(26000))?;

        // An item was removed; the subtotal dropped below the threshold.
        let result = checkout.revalidate_voucher(&vouchers, &rm(20000));

        assert!(matches!(result, Err(CheckoutError::VoucherIneligible)));
        assert_eq!(checkout.selected_voucher(), None);

        // A second pass with no selection is a no-op.
        checkout.revalidate_voucher(&vouchers, &rm(20000))?;

        Ok(())
    }

    #[test]
    fn order_draft_captures_lines_and_totals() -> TestResult {
        let mut menu_keys = SlotMap::<MenuItemKey, ()>::with_key();
        let pork = menu_keys.insert(());
        let beef = menu_keys.insert(());

        let mut item_ids = FxHashMap::default();
        item_ids.insert(pork, "pork-belly".to_string());
        item_ids.insert(beef, "bulgogi-beef".to_string());

        let cart = Cart::with_lines(
            [
                CartLine::new(pork, rm(3800), 2),
                CartLine::new(beef, rm(4200), 1),
            ],
            MYR,
        )?;

        let (shops, open, _) = shops_with_open_and_closed();
        let mut checkout = Checkout::new("session-1");
        checkout.select_pickup_shop(open)?;
        checkout.proceed()?;
        checkout.confirm_service_details(&shops)?;
        checkout.choose_payment_method(PaymentMethod::Card)?;

        let customer = Customer {
            name: "Aina".to_string(),
            phone: "012-3456789".to_string(),
            email: "aina@example.com".to_string(),
        };

        let draft = checkout.order_draft(&cart, &item_ids, customer, &rm(11800))?;

        assert_eq!(draft.lines.len(), 2);
        assert_eq!(draft.estimated_total_minor, 11800);
        assert_eq!(draft.currency, "MYR");
        assert_eq!(draft.order_type, OrderType::Pickup);
        assert!(
            draft
                .lines
                .iter()
                .any(|l| l.id == "pork-belly" && l.quantity == 2),
            "expected the pork belly line"
        );

        Ok(())
    }

    #[test]
    fn order_draft_rejects_unmapped_items() -> TestResult {
        let mut menu_keys = SlotMap::<MenuItemKey, ()>::with_key();
        let pork = menu_keys.insert(());

        let cart = Cart::with_lines([CartLine::new(pork, rm(3800), 1)], MYR)?;

        let mut checkout = Checkout::new("session-1");
        checkout.proceed()?;

        let (shops, open, _) = shops_with_open_and_closed();
        checkout.select_pickup_shop(open)?;
        checkout.confirm_service_details(&shops)?;
        checkout.choose_payment_method(PaymentMethod::QrPay)?;

        let customer = Customer {
            name: "Aina".to_string(),
            phone: "012-3456789".to_string(),
            email: "aina@example.com".to_string(),
        };

        let result = checkout.order_draft(&cart, &FxHashMap::default(), customer, &rm(3800));

        assert!(matches!(result, Err(CheckoutError::UnknownItem(_))));

        Ok(())
    }
}
