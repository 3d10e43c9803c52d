//! Receipt
//!
//! Order-summary rendering: one row per cart line and a totals block for the
//! quote, written to any `io::Write`.

use std::io;

use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use slotmap::SlotMap;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::Cart,
    menu::{MenuItem, MenuItemKey},
    pricing::{PricingError, line_total},
    quote::Quote,
};

/// Errors that can occur when writing an order summary.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// A cart line references an item missing from the menu catalog.
    #[error("Missing menu item")]
    MissingItem(MenuItemKey),

    /// Error calculating a line total.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Writes the order summary for a cart and its quote.
///
/// # Errors
///
/// Returns a [`ReceiptError`] if a cart line references an unknown menu item,
/// a line total cannot be calculated, or the writer fails.
pub fn write_summary(
    mut out: impl io::Write,
    cart: &Cart<'_>,
    menu: &SlotMap<MenuItemKey, MenuItem<'_>>,
    quote: &Quote<'_>,
) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(["", "Item", "Qty", "Unit Price", "Line Total"]);

    for (idx, line) in cart.iter().enumerate() {
        let item = menu
            .get(line.item())
            .ok_or(ReceiptError::MissingItem(line.item()))?;

        builder.push_record([
            format!("#{:<3}", idx + 1),
            item.name.clone(),
            line.quantity().to_string(),
            format!("{}", line.unit_price()),
            format!("{}", line_total(line)?),
        ]);
    }

    write_line_table(&mut out, builder)?;
    write_totals(&mut out, quote)?;

    Ok(())
}

fn write_line_table(out: &mut impl io::Write, builder: Builder) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..5), Alignment::right());

    writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)
}

fn write_totals(out: &mut impl io::Write, quote: &Quote<'_>) -> Result<(), ReceiptError> {
    let mut rows: Vec<(String, String)> = Vec::new();

    rows.push((" Subtotal:".to_string(), format!("{}  ", quote.subtotal())));

    if quote.fee_waived() {
        rows.push((" Delivery Fee:".to_string(), "FREE  ".to_string()));
    } else if quote.delivery_fee().to_minor_units() > 0 {
        rows.push((
            " Delivery Fee:".to_string(),
            format!("{}  ", quote.delivery_fee()),
        ));
    }

    if quote.discount().to_minor_units() > 0 {
        rows.push((
            " Voucher Discount:".to_string(),
            format!(
                "({:.2}%) -{}  ",
                discount_percent_points(quote),
                quote.discount()
            ),
        ));
    }

    if quote.tax().to_minor_units() > 0 {
        rows.push((" Tax:".to_string(), format!("{}  ", quote.tax())));
    }

    rows.push((
        " \x1b[1mTotal:\x1b[0m".to_string(),
        format!("\x1b[1m{}  \x1b[0m", quote.total()),
    ));

    let label_width = rows
        .iter()
        .map(|(label, _)| visible_width(label))
        .max()
        .unwrap_or(0);

    let value_width = rows
        .iter()
        .map(|(_, value)| visible_width(value))
        .max()
        .unwrap_or(0);

    for (label, value) in &rows {
        write_summary_line(out, label, value, label_width, value_width)?;
    }

    writeln!(out).map_err(|_err| ReceiptError::IO)
}

/// Discount relative to the pre-discount subtotal, in percent points.
fn discount_percent_points(quote: &Quote<'_>) -> Decimal {
    let subtotal_minor = quote.subtotal().to_minor_units();

    if subtotal_minor == 0 {
        return Decimal::ZERO;
    }

    let discount = Decimal::from_i64(quote.discount().to_minor_units()).unwrap_or(Decimal::ZERO);
    let subtotal = Decimal::from_i64(subtotal_minor).unwrap_or(Decimal::ONE);

    (discount / subtotal * Decimal::from_i64(100).unwrap_or(Decimal::ZERO)).round_dp(2)
}

/// Writes a summary line with a right-aligned label and a fixed-width value column.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_pad = label_col_width.saturating_sub(visible_width(label));
    let value_pad = value_col_width.saturating_sub(visible_width(value));

    writeln!(
        out,
        "{:>label_pad$}{label}  {value_pad}{value}",
        "",
        value_pad = " ".repeat(value_pad)
    )
    .map_err(|_err| ReceiptError::IO)
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// Render the summary to a string (test and demo helper).
///
/// # Errors
///
/// Returns a [`ReceiptError`] under the same conditions as [`write_summary`].
pub fn summary_string(
    cart: &Cart<'_>,
    menu: &SlotMap<MenuItemKey, MenuItem<'_>>,
    quote: &Quote<'_>,
) -> Result<String, ReceiptError> {
    let mut out = Vec::new();
    write_summary(&mut out, cart, menu, quote)?;

    String::from_utf8(out).map_err(|_err| ReceiptError::IO)
}
