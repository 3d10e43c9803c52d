//! Fixtures
//!
//! YAML-backed catalogs for demos and tests: menu, shops, voucher book and
//! saved cart sessions, with string fixture keys mapped onto slotmap keys.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use slotmap::{SecondaryMap, SlotMap};
use thiserror::Error;

use crate::{
    cart::{Cart, CartError, CartLine},
    fixtures::{
        cart::{CartFixture, CartLineFixture},
        menu::MenuFixture,
        shops::ShopsFixture,
        vouchers::VouchersFixture,
    },
    menu::{MenuItem, MenuItemKey},
    shops::{Shop, ShopKey},
    vouchers::{Voucher, VoucherKey, VoucherMeta},
};

pub mod cart;
pub mod menu;
pub mod shops;
pub mod vouchers;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading or writing fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Invalid amount format
    #[error("Invalid amount format: {0}")]
    InvalidAmount(String),

    /// Percentage out of the 0..=100 range
    #[error("Invalid percentage: {0}")]
    InvalidPercentage(u32),

    /// Menu item not found
    #[error("Menu item not found: {0}")]
    ItemNotFound(String),

    /// A cart line references an item with no fixture key
    #[error("Cart item {0:?} has no fixture key")]
    CartItemUnmapped(MenuItemKey),

    /// Currency mismatch between fixture files
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No currency known yet; load a menu or voucher file first
    #[error("No currency loaded yet; load a menu or voucher fixture first")]
    NoCurrency,

    /// Cart construction error
    #[error("Failed to create cart: {0}")]
    Cart(#[from] CartError),
}

/// Parse a money amount string (e.g. `"38.00"`) in the given currency.
///
/// # Errors
///
/// Returns [`FixtureError::InvalidAmount`] if the string is not a valid amount.
pub(crate) fn parse_amount(
    value: &str,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, FixtureError> {
    Money::from_str(value, currency).map_err(|_err| FixtureError::InvalidAmount(value.to_string()))
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Currency shared by every loaded file
    currency: Option<&'static Currency>,

    /// Catalogs with generated keys
    menu: SlotMap<MenuItemKey, MenuItem<'static>>,
    shops: SlotMap<ShopKey, Shop>,
    vouchers: SlotMap<VoucherKey, Voucher<'static>>,
    voucher_meta: SecondaryMap<VoucherKey, VoucherMeta>,

    /// String key -> `SlotMap` key mappings for lookups
    item_keys: FxHashMap<String, MenuItemKey>,
    shop_keys: FxHashMap<String, ShopKey>,
    voucher_keys: FxHashMap<String, VoucherKey>,

    /// Reverse item mapping, used when assembling drafts and saving carts
    item_ids: FxHashMap<MenuItemKey, String>,

    /// Pre-built cart lines from a loaded session
    cart_lines: Vec<CartLine<'static>>,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Create a new empty fixture with the default base path.
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with a custom base path.
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            currency: None,
            menu: SlotMap::with_key(),
            shops: SlotMap::with_key(),
            vouchers: SlotMap::with_key(),
            voucher_meta: SecondaryMap::new(),
            item_keys: FxHashMap::default(),
            shop_keys: FxHashMap::default(),
            voucher_keys: FxHashMap::default(),
            item_ids: FxHashMap::default(),
            cart_lines: Vec::new(),
        }
    }

    /// Load a menu catalog from a YAML fixture file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or on a
    /// currency mismatch with previously loaded files.
    pub fn load_menu(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("menu").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: MenuFixture = serde_norway::from_str(&contents)?;

        let currency = self.resolve_currency(&fixture.currency)?;

        for (key, item) in fixture.items {
            let menu_item = MenuItem {
                name: item.name,
                unit_price: parse_amount(&item.price, currency)?,
                category: item.category,
                available: item.available,
            };

            let item_key = self.menu.insert(menu_item);

            self.item_keys.insert(key.clone(), item_key);
            self.item_ids.insert(item_key, key);
        }

        Ok(self)
    }

    /// Load a pickup shop directory from a YAML fixture file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_shops(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("shops").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: ShopsFixture = serde_norway::from_str(&contents)?;

        for (key, shop) in fixture.shops {
            let shop_key = self.shops.insert(Shop::new(shop.name, shop.open));

            self.shop_keys.insert(key, shop_key);
        }

        Ok(self)
    }

    /// Load a voucher book from a YAML fixture file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, an amount is
    /// invalid, or on a currency mismatch with previously loaded files.
    pub fn load_vouchers(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("vouchers").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: VouchersFixture = serde_norway::from_str(&contents)?;

        let currency = self.resolve_currency(&fixture.currency)?;

        for (key, voucher_fixture) in fixture.vouchers {
            let (meta, voucher) = voucher_fixture.try_into_voucher(currency)?;

            let voucher_key = self.vouchers.insert(voucher);

            self.voucher_meta.insert(voucher_key, meta);
            self.voucher_keys.insert(key, voucher_key);
        }

        Ok(self)
    }

    /// Load a saved cart session from a YAML fixture file.
    ///
    /// Lines reference menu items by fixture key, so a menu must be loaded
    /// first; prices are taken from the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a line
    /// references an unknown item.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("carts").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CartFixture = serde_norway::from_str(&contents)?;

        for line in fixture.lines {
            let item_key = self
                .item_keys
                .get(&line.item)
                .ok_or_else(|| FixtureError::ItemNotFound(line.item.clone()))?;

            let item = self
                .menu
                .get(*item_key)
                .ok_or_else(|| FixtureError::ItemNotFound(line.item.clone()))?;

            self.cart_lines
                .push(CartLine::new(*item_key, item.unit_price, line.quantity));
        }

        Ok(self)
    }

    /// Save a cart as a session fixture, returning the written path.
    ///
    /// # Errors
    ///
    /// Returns an error if a line references an item with no fixture key or
    /// the file cannot be written.
    pub fn save_cart(&self, cart: &Cart<'_>, name: &str) -> Result<PathBuf, FixtureError> {
        let lines = cart
            .iter()
            .map(|line| {
                let item = self
                    .item_ids
                    .get(&line.item())
                    .ok_or(FixtureError::CartItemUnmapped(line.item()))?;

                Ok(CartLineFixture {
                    item: item.clone(),
                    quantity: line.quantity(),
                })
            })
            .collect::<Result<Vec<_>, FixtureError>>()?;

        let contents = serde_norway::to_string(&CartFixture { lines })?;

        let dir = self.base_path.join("carts");
        fs::create_dir_all(&dir)?;

        let file_path = dir.join(format!("{name}.yml"));
        fs::write(&file_path, contents)?;

        Ok(file_path)
    }

    /// Build a cart from the loaded session lines.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NoCurrency`] if no priced fixture has been
    /// loaded, or a cart construction error.
    pub fn cart(&self) -> Result<Cart<'static>, FixtureError> {
        let currency = self.currency.ok_or(FixtureError::NoCurrency)?;

        Ok(Cart::with_lines(self.cart_lines.clone(), currency)?)
    }

    /// Currency shared by the loaded fixture files.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NoCurrency`] if no priced fixture has been
    /// loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    /// The loaded menu catalog.
    pub fn menu(&self) -> &SlotMap<MenuItemKey, MenuItem<'static>> {
        &self.menu
    }

    /// The loaded shop directory.
    pub fn shops(&self) -> &SlotMap<ShopKey, Shop> {
        &self.shops
    }

    /// The loaded voucher book.
    pub fn vouchers(&self) -> &SlotMap<VoucherKey, Voucher<'static>> {
        &self.vouchers
    }

    /// Display metadata for the loaded vouchers.
    pub fn voucher_meta(&self) -> &SecondaryMap<VoucherKey, VoucherMeta> {
        &self.voucher_meta
    }

    /// Reverse item mapping, for draft assembly and cart saving.
    pub fn item_ids(&self) -> &FxHashMap<MenuItemKey, String> {
        &self.item_ids
    }

    /// Look up a menu item by fixture key.
    pub fn item_key(&self, key: &str) -> Option<MenuItemKey> {
        self.item_keys.get(key).copied()
    }

    /// Look up a shop by fixture key.
    pub fn shop_key(&self, key: &str) -> Option<ShopKey> {
        self.shop_keys.get(key).copied()
    }

    /// Look up a voucher by fixture key.
    pub fn voucher_key(&self, key: &str) -> Option<VoucherKey> {
        self.voucher_keys.get(key).copied()
    }

    /// Resolve a currency code, pinning the fixture currency on first use and
    /// rejecting mismatches afterwards.
    fn resolve_currency(&mut self, code: &str) -> Result<&'static Currency, FixtureError> {
        let currency =
            iso::find(code).ok_or_else(|| FixtureError::UnknownCurrency(code.to_string()))?;

        if let Some(existing) = self.currency {
            if existing != currency {
                return Err(FixtureError::CurrencyMismatch(
                    existing.iso_alpha_code.to_string(),
                    currency.iso_alpha_code.to_string(),
                ));
            }
        } else {
            self.currency = Some(currency);
        }

        Ok(currency)
    }
}
