//! Address
//!
//! Delivery address capture and field-level validation. Validation failures
//! are keyed per field so the caller can re-render the form with messages.

use smallvec::SmallVec;

use super::{Field, FieldError, FieldErrors};

/// A delivery address in the shape the order form collects it.
///
/// Line 2 is optional and never validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryAddress {
    /// Recipient full name
    pub full_name: String,

    /// Malaysian mobile number
    pub phone: String,

    /// Address line 1
    pub line1: String,

    /// Address line 2 (optional)
    pub line2: String,

    /// City
    pub city: String,

    /// State
    pub state: String,

    /// 5-digit postcode
    pub postcode: String,
}

impl DeliveryAddress {
    /// Validate all required fields, collecting one error per failing field.
    pub fn validate(&self) -> FieldErrors {
        let mut errors: FieldErrors = SmallVec::new();

        if self.full_name.trim().is_empty() {
            errors.push(FieldError::new(Field::FullName, "Full name is required"));
        }

        if self.phone.trim().is_empty() {
            errors.push(FieldError::new(Field::Phone, "Phone is required"));
        } else if !is_valid_my_mobile(self.phone.trim()) {
            errors.push(FieldError::new(
                Field::Phone,
                "Enter a valid Malaysian mobile number",
            ));
        }

        if self.line1.trim().is_empty() {
            errors.push(FieldError::new(
                Field::AddressLine1,
                "Address Line 1 is required",
            ));
        }

        if self.city.trim().is_empty() {
            errors.push(FieldError::new(Field::City, "City is required"));
        }

        if self.state.trim().is_empty() {
            errors.push(FieldError::new(Field::State, "State is required"));
        }

        if !is_valid_postcode(self.postcode.trim()) {
            errors.push(FieldError::new(
                Field::Postcode,
                "Postcode must be 5 digits",
            ));
        }

        errors
    }

    /// Whether every field is empty.
    pub fn is_empty(&self) -> bool {
        self.full_name.is_empty()
            && self.phone.is_empty()
            && self.line1.is_empty()
            && self.line2.is_empty()
            && self.city.is_empty()
            && self.state.is_empty()
            && self.postcode.is_empty()
    }

    /// Reset every field to empty.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Matches Malaysian mobile numbers: an optional `+`, an optional country `6`,
/// then `01`, a provider digit other than 5, an optional dash and 7 or 8
/// further digits.
fn is_valid_my_mobile(phone: &str) -> bool {
    let mut chars = phone.chars().peekable();

    if chars.peek() == Some(&'+') {
        chars.next();
    }

    if chars.peek() == Some(&'6') {
        chars.next();
    }

    if chars.next() != Some('0') || chars.next() != Some('1') {
        return false;
    }

    match chars.next() {
        Some(c) if c.is_ascii_digit() && c != '5' => {}
        _ => return false,
    }

    if chars.peek() == Some(&'-') {
        chars.next();
    }

    let rest: SmallVec<[char; 9]> = chars.collect();

    (7..=8).contains(&rest.len()) && rest.iter().all(char::is_ascii_digit)
}

/// Matches exactly five ASCII digits.
fn is_valid_postcode(postcode: &str) -> bool {
    postcode.len() == 5 && postcode.chars().all(|c| c.is_ascii_digit())
}
