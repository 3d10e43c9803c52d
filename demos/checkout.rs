//! Checkout Example
//!
//! Walks a fixture cart through the full checkout flow: quote, receipt,
//! validation and submission against the in-memory gateway.
//!
//! Use `-f` to load a fixture set by name
//! Use `-v` to apply a voucher by fixture key
//! Use `-d` to switch the order to delivery
//! Use `-s` to pick the pickup shop by fixture key

use std::io;

use anyhow::{Result, anyhow};
use clap::Parser;
use kedai::{
    checkout::{Checkout, address::DeliveryAddress},
    fixtures::Fixture,
    orders::{Customer, OrderType, PaymentMethod, PaymentSessionRequest},
    providers::{InMemoryGateway, OrderGateway, PaymentGateway},
    quote::{TaxRate, quote},
    receipt::write_summary,
    utils::DemoCheckoutArgs,
};

/// Checkout Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    let args = DemoCheckoutArgs::parse();

    let mut fixture = Fixture::new();
    fixture
        .load_menu(&args.fixture)?
        .load_shops(&args.fixture)?
        .load_vouchers(&args.fixture)?
        .load_cart(&args.fixture)?;

    let cart = fixture.cart()?;
    let subtotal = cart.subtotal()?;

    let mut checkout = Checkout::new("demo-session");

    if args.delivery {
        checkout.set_order_type(OrderType::Delivery)?;
        *checkout.address_mut() = demo_address();
    } else {
        let shop = fixture
            .shop_key(&args.shop)
            .ok_or_else(|| anyhow!("unknown shop fixture key: {}", args.shop))?;

        checkout.select_pickup_shop(shop)?;
    }

    let selected_voucher = match args.voucher.as_deref() {
        Some(key) => {
            let voucher_key = fixture
                .voucher_key(key)
                .ok_or_else(|| anyhow!("unknown voucher fixture key: {key}"))?;

            let voucher = fixture
                .vouchers()
                .get(voucher_key)
                .ok_or_else(|| anyhow!("voucher book is missing {key}"))?;

            checkout.select_voucher(voucher_key, voucher, &subtotal)?;

            Some(*voucher)
        }
        None => None,
    };

    let quote = quote(
        &cart,
        checkout.order_type(),
        selected_voucher.as_ref(),
        TaxRate::none(),
    )?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    write_summary(&mut handle, &cart, fixture.menu(), &quote)?;

    checkout.proceed()?;
    checkout.confirm_service_details(fixture.shops())?;
    checkout.choose_payment_method(PaymentMethod::QrPay)?;

    let customer = Customer {
        name: "Demo Customer".to_string(),
        phone: "012-3456789".to_string(),
        email: "demo@example.com".to_string(),
    };

    let draft = checkout.order_draft(&cart, fixture.item_ids(), customer, &quote.total())?;

    let gateway = InMemoryGateway::new();

    checkout.begin_submission()?;

    match gateway.submit(&draft) {
        Ok(ack) => {
            checkout.complete_submission()?;

            let session = gateway.create_session(&PaymentSessionRequest {
                order_id: ack.order_id.clone(),
                amount_minor: ack.financials.total_minor,
                currency: draft.currency.clone(),
            })?;

            println!(
                "Order {} confirmed ({}), ready in ~{} minutes",
                ack.order_id, ack.confirmation_number, ack.pickup_estimate_minutes
            );
            println!("Payment session {} ({:?})", session.session_id, session.status);
        }
        Err(err) => {
            checkout.fail_submission(err.into())?;

            println!("Submission failed; retry available: {:?}", checkout.last_failure());
        }
    }

    Ok(())
}

fn demo_address() -> DeliveryAddress {
    DeliveryAddress {
        full_name: "Demo Customer".to_string(),
        phone: "012-3456789".to_string(),
        line1: "12 Jalan Ampang".to_string(),
        line2: String::new(),
        city: "Kuala Lumpur".to_string(),
        state: "WP Kuala Lumpur".to_string(),
        postcode: "50450".to_string(),
    }
}
