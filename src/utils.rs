//! Utils

use clap::Parser;

/// Arguments for the checkout demo
#[derive(Debug, Parser)]
pub struct DemoCheckoutArgs {
    /// Fixture set to use for the menu, shops, vouchers and cart
    #[clap(short, long, default_value = "sansan")]
    pub fixture: String,

    /// Voucher to apply, by fixture key
    #[clap(short, long)]
    pub voucher: Option<String>,

    /// Deliver the order instead of picking it up
    #[clap(short, long)]
    pub delivery: bool,

    /// Pickup shop to collect from, by fixture key
    #[clap(short, long, default_value = "klcc")]
    pub shop: String,
}
