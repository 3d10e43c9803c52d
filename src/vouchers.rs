//! Vouchers
//!
//! A closed set of discount rules so that application is exhaustive and
//! type-checked. At most one voucher is applied per order; selecting another
//! replaces the current one.
//!
//! Eligibility gates *selection*. After selection, [`Voucher::apply`] only
//! re-checks the thresholds baked into each rule, so callers must re-validate
//! with [`Voucher::is_eligible`] on every recompute if the cart has changed.

use decimal_percentage::Percentage;
use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;

use crate::{
    orders::OrderType,
    pricing::{PricingError, percent_of_minor},
};

new_key_type! {
    /// Voucher Key
    pub struct VoucherKey;
}

/// Voucher display metadata.
#[derive(Debug, Default, Clone)]
pub struct VoucherMeta {
    /// Label shown to the customer
    pub label: String,
}

/// Fee adjustment and discount produced by applying a voucher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoucherApplication<'a> {
    /// Delivery fee after the voucher, unchanged unless waived
    pub delivery_fee: Money<'a, Currency>,

    /// Amount taken off the order
    pub discount: Money<'a, Currency>,
}

/// A discount rule selected by the customer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Voucher<'a> {
    /// A flat amount off once the subtotal reaches a threshold.
    ThresholdMinus {
        /// Minimum subtotal for the discount to apply
        min_subtotal: Money<'a, Currency>,

        /// Amount taken off
        amount_off: Money<'a, Currency>,
    },

    /// Waives the delivery fee once the subtotal reaches a threshold.
    ///
    /// Has no effect on non-delivery orders and grants no direct discount.
    FreeDelivery {
        /// Minimum subtotal for the fee to be waived
        min_subtotal: Money<'a, Currency>,
    },

    /// A flat amount off for new customers.
    ///
    /// Identity gating is the caller's responsibility; the engine applies it
    /// unconditionally.
    NewUserMinus {
        /// Amount taken off
        amount_off: Money<'a, Currency>,
    },

    /// A percentage off the subtotal, optionally capped.
    PercentageOff {
        /// Fraction taken off the subtotal (e.g. 0.10)
        percent: Percentage,

        /// Upper bound on the discount amount
        max_discount: Option<Money<'a, Currency>>,

        /// Minimum subtotal for the discount to apply
        min_order: Option<Money<'a, Currency>>,
    },

    /// A flat amount off, optionally gated on a minimum order.
    FixedOff {
        /// Amount taken off
        amount: Money<'a, Currency>,

        /// Minimum subtotal for the discount to apply
        min_order: Option<Money<'a, Currency>>,
    },
}

impl<'a> Voucher<'a> {
    /// Whether this voucher may be selected at the given subtotal.
    pub fn is_eligible(&self, subtotal: &Money<'_, Currency>) -> bool {
        let subtotal_minor = subtotal.to_minor_units();

        match self {
            Voucher::ThresholdMinus { min_subtotal, .. }
            | Voucher::FreeDelivery { min_subtotal } => {
                subtotal_minor >= min_subtotal.to_minor_units()
            }
            Voucher::NewUserMinus { .. } => true,
            Voucher::PercentageOff { min_order, .. } | Voucher::FixedOff { min_order, .. } => {
                min_order.is_none_or(|min| subtotal_minor >= min.to_minor_units())
            }
        }
    }

    /// Apply this voucher, producing the adjusted delivery fee and the discount.
    ///
    /// Threshold rules that are not met leave the fee unchanged and grant no
    /// discount; they do not error.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a percentage calculation cannot be safely
    /// represented in minor units.
    pub fn apply(
        &self,
        order_type: OrderType,
        subtotal: &Money<'a, Currency>,
        delivery_fee: Money<'a, Currency>,
    ) -> Result<VoucherApplication<'a>, PricingError> {
        let currency = subtotal.currency();
        let zero = Money::from_minor(0, currency);
        let subtotal_minor = subtotal.to_minor_units();

        let application = match self {
            Voucher::ThresholdMinus {
                min_subtotal,
                amount_off,
            } => {
                let discount = if subtotal_minor >= min_subtotal.to_minor_units() {
                    *amount_off
                } else {
                    zero
                };

                VoucherApplication {
                    delivery_fee,
                    discount,
                }
            }
            Voucher::FreeDelivery { min_subtotal } => {
                let waived = order_type == OrderType::Delivery
                    && subtotal_minor >= min_subtotal.to_minor_units();

                VoucherApplication {
                    delivery_fee: if waived { zero } else { delivery_fee },
                    discount: zero,
                }
            }
            Voucher::NewUserMinus { amount_off } => VoucherApplication {
                delivery_fee,
                discount: *amount_off,
            },
            Voucher::PercentageOff {
                percent,
                max_discount,
                min_order,
            } => {
                let discount = if min_met(*min_order, subtotal_minor) {
                    let raw = percent_of_minor(*percent, subtotal_minor)?;
                    let capped = max_discount.map_or(raw, |max| raw.min(max.to_minor_units()));

                    Money::from_minor(capped, currency)
                } else {
                    zero
                };

                VoucherApplication {
                    delivery_fee,
                    discount,
                }
            }
            Voucher::FixedOff { amount, min_order } => {
                let discount = if min_met(*min_order, subtotal_minor) {
                    *amount
                } else {
                    zero
                };

                VoucherApplication {
                    delivery_fee,
                    discount,
                }
            }
        };

        Ok(application)
    }
}

/// True when there is no minimum order, or the subtotal meets it.
fn min_met(min_order: Option<Money<'_, Currency>>, subtotal_minor: i64) -> bool {
    min_order.is_none_or(|min| subtotal_minor >= min.to_minor_units())
}
