//! Kedai prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartLine, QuantityChange},
    checkout::{
        Checkout, CheckoutError, CheckoutState, Field, FieldError, FieldErrors, SubmissionFailure,
        address::DeliveryAddress,
    },
    fees::delivery_fee,
    fixtures::{Fixture, FixtureError},
    loyalty::{LoyaltyError, StampCard},
    menu::{MenuItem, MenuItemKey},
    orders::{
        Customer, ItemSummary, OrderAcknowledgment, OrderDraft, OrderFinancials, OrderLine,
        OrderStatus, OrderType, PaymentMethod, PaymentSession, PaymentSessionRequest,
        PaymentSessionStatus,
    },
    pricing::PricingError,
    providers::{GatewayError, InMemoryGateway, OrderGateway, PaymentGateway},
    quote::{Quote, TaxRate, quote},
    receipt::{ReceiptError, summary_string, write_summary},
    shops::{Shop, ShopKey},
    vouchers::{Voucher, VoucherApplication, VoucherKey, VoucherMeta},
};
