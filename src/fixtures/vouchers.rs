//! Voucher Fixtures

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use serde::Deserialize;

use crate::{
    fixtures::{FixtureError, parse_amount},
    vouchers::{Voucher, VoucherMeta},
};

/// Wrapper for a voucher book in YAML.
#[derive(Debug, Deserialize)]
pub struct VouchersFixture {
    /// ISO alpha currency code for every amount in the file
    pub currency: String,

    /// Map of voucher key -> voucher fixture
    pub vouchers: FxHashMap<String, VoucherFixture>,
}

/// A voucher from YAML.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VoucherFixture {
    /// A flat amount off once the subtotal reaches a threshold
    ThresholdMinus {
        /// Label shown to the customer
        label: String,

        /// Minimum subtotal, e.g. `"250.00"`
        min_subtotal: String,

        /// Amount taken off, e.g. `"10.00"`
        amount_off: String,
    },

    /// Waives the delivery fee once the subtotal reaches a threshold
    FreeDelivery {
        /// Label shown to the customer
        label: String,

        /// Minimum subtotal
        min_subtotal: String,
    },

    /// A flat amount off for new customers
    NewUserMinus {
        /// Label shown to the customer
        label: String,

        /// Amount taken off
        amount_off: String,
    },

    /// A percentage off the subtotal, optionally capped
    PercentageOff {
        /// Label shown to the customer
        label: String,

        /// Percent points taken off, 0 to 100
        percent: u32,

        /// Upper bound on the discount amount
        #[serde(default)]
        max_discount: Option<String>,

        /// Minimum subtotal for the discount to apply
        #[serde(default)]
        min_order: Option<String>,
    },

    /// A flat amount off, optionally gated on a minimum order
    FixedOff {
        /// Label shown to the customer
        label: String,

        /// Amount taken off
        amount: String,

        /// Minimum subtotal for the discount to apply
        #[serde(default)]
        min_order: Option<String>,
    },
}

impl VoucherFixture {
    /// Convert to [`VoucherMeta`] and [`Voucher`].
    ///
    /// # Errors
    ///
    /// Returns an error if an amount cannot be parsed or the percentage is
    /// out of range.
    pub fn try_into_voucher(
        self,
        currency: &'static Currency,
    ) -> Result<(VoucherMeta, Voucher<'static>), FixtureError> {
        let (label, voucher) = match self {
            VoucherFixture::ThresholdMinus {
                label,
                min_subtotal,
                amount_off,
            } => (
                label,
                Voucher::ThresholdMinus {
                    min_subtotal: parse_amount(&min_subtotal, currency)?,
                    amount_off: parse_amount(&amount_off, currency)?,
                },
            ),
            VoucherFixture::FreeDelivery {
                label,
                min_subtotal,
            } => (
                label,
                Voucher::FreeDelivery {
                    min_subtotal: parse_amount(&min_subtotal, currency)?,
                },
            ),
            VoucherFixture::NewUserMinus { label, amount_off } => (
                label,
                Voucher::NewUserMinus {
                    amount_off: parse_amount(&amount_off, currency)?,
                },
            ),
            VoucherFixture::PercentageOff {
                label,
                percent,
                max_discount,
                min_order,
            } => {
                if percent > 100 {
                    return Err(FixtureError::InvalidPercentage(percent));
                }

                (
                    label,
                    Voucher::PercentageOff {
                        percent: Percentage::from(Decimal::new(i64::from(percent), 2)),
                        max_discount: max_discount
                            .map(|amount| parse_amount(&amount, currency))
                            .transpose()?,
                        min_order: min_order
                            .map(|amount| parse_amount(&amount, currency))
                            .transpose()?,
                    },
                )
            }
            VoucherFixture::FixedOff {
                label,
                amount,
                min_order,
            } => (
                label,
                Voucher::FixedOff {
                    amount: parse_amount(&amount, currency)?,
                    min_order: min_order
                        .map(|amount| parse_amount(&amount, currency))
                        .transpose()?,
                },
            ),
        };

        Ok((VoucherMeta { label }, voucher))
    }
}
