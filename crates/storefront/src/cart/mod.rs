//! Cart state and derived totals.
//!
//! # Architecture
//!
//! - [`CartStore`] owns the ordered item list and its totals
//! - Every mutation recomputes totals and saves through [`CartPersistence`]
//! - Storage failures never fail a cart operation; the in-memory cart wins
//!
//! # Example
//!
//! ```rust,ignore
//! use fakestore_storefront::cart::CartStore;
//! use fakestore_storefront::storage::{CartPersistence, MemoryStore};
//!
//! let mut cart = CartStore::open(CartPersistence::new(MemoryStore::new(), "cart"));
//! cart.add_item(&product, 2)?;
//! println!("{}", cart.totals().grand_total_display());
//! ```

mod line_item;
mod totals;

pub use line_item::LineItem;
pub use totals::{CartTotals, FLAT_SHIPPING, TAX_RATE, compute_totals};

use chrono::Utc;
use fakestore_core::{CartState, ProductId};
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::catalog::Product;
use crate::checkout::{CheckoutConfirmation, CheckoutError, CheckoutForm};
use crate::error::add_breadcrumb;
use crate::storage::{CartPersistence, KeyValueStore};

/// Errors returned by cart mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Quantity must be at least 1.
    #[error("Quantity must be at least 1 (got {0})")]
    NonPositiveQuantity(i64),

    /// Quantity would exceed what a line item can hold.
    #[error("Quantity cannot exceed {max}")]
    QuantityTooLarge { max: u32 },

    /// Cart totals would be too large to represent.
    #[error("Cart total is too large")]
    TotalTooLarge,
}

/// The shopper's cart.
///
/// Items are unique by product id and keep the order they were first added
/// in. Totals are recomputed after every mutation.
#[derive(Debug)]
pub struct CartStore<S> {
    items: Vec<LineItem>,
    totals: CartTotals,
    persistence: CartPersistence<S>,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Open the cart, hydrating it from storage.
    pub fn open(persistence: CartPersistence<S>) -> Self {
        let items = persistence.load();
        // `load` discards records whose totals overflow.
        let totals = compute_totals(&items).unwrap_or_default();
        Self {
            items,
            totals,
            persistence,
        }
    }

    /// Items in the order they were added.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Current totals.
    #[must_use]
    pub const fn totals(&self) -> &CartTotals {
        &self.totals
    }

    #[must_use]
    pub fn state(&self) -> CartState {
        CartState::from_line_count(self.items.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all items.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Line item for a product, if it is in the cart.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    /// Storage the cart saves through.
    #[must_use]
    pub const fn persistence(&self) -> &CartPersistence<S> {
        &self.persistence
    }

    /// Add `quantity` units of a product, merging with an existing item.
    ///
    /// Returns the resulting quantity for the product.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NonPositiveQuantity`] if `quantity < 1`,
    /// [`CartError::QuantityTooLarge`] if the merged quantity would overflow,
    /// or [`CartError::TotalTooLarge`] if the cart totals would. The cart is
    /// unchanged on error.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> Result<u32, CartError> {
        let quantity = positive_quantity(quantity)?;

        let mut items = self.items.clone();
        let new_quantity = match items.iter_mut().find(|item| item.product_id == product.id) {
            Some(item) => {
                item.quantity = item
                    .quantity
                    .checked_add(quantity)
                    .ok_or(CartError::QuantityTooLarge { max: u32::MAX })?;
                item.quantity
            }
            None => {
                items.push(LineItem::from_product(product, quantity));
                quantity
            }
        };
        let totals = compute_totals(&items).ok_or(CartError::TotalTooLarge)?;

        info!(quantity = new_quantity, "Added item to cart");
        let product_id = product.id.to_string();
        add_breadcrumb(
            "cart",
            "Added item to cart",
            Some(&[("product_id", product_id.as_str())]),
        );
        self.items = items;
        self.commit(totals);
        Ok(new_quantity)
    }

    /// Set a product's quantity. Zero or less removes the item; an absent
    /// product is ignored.
    ///
    /// Returns whether the cart changed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::QuantityTooLarge`] if `quantity` does not fit a
    /// line item, or [`CartError::TotalTooLarge`] if the cart totals would
    /// overflow. The cart is unchanged on error.
    #[instrument(skip(self))]
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<bool, CartError> {
        let Some(index) = self.position(product_id) else {
            return Ok(false);
        };
        if quantity <= 0 {
            return Ok(self.remove_item(product_id).is_some());
        }

        let quantity = positive_quantity(quantity)?;
        let mut items = self.items.clone();
        let Some(item) = items.get_mut(index) else {
            return Ok(false);
        };
        if item.quantity == quantity {
            return Ok(false);
        }
        item.quantity = quantity;
        let totals = compute_totals(&items).ok_or(CartError::TotalTooLarge)?;

        info!(quantity, "Updated cart quantity");
        self.items = items;
        self.commit(totals);
        Ok(true)
    }

    /// Remove a product from the cart, returning its line item if present.
    #[instrument(skip(self))]
    pub fn remove_item(&mut self, product_id: ProductId) -> Option<LineItem> {
        let index = self.position(product_id)?;
        let removed = self.items.remove(index);
        // Dropping an item only lowers the totals, so they still fit.
        let totals = compute_totals(&self.items).unwrap_or_default();

        info!("Removed item from cart");
        self.commit(totals);
        Some(removed)
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub fn clear(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.items.clear();

        info!("Cleared cart");
        self.commit(CartTotals::default());
    }

    /// Validate the form, confirm the order, and empty the cart.
    ///
    /// The confirmation carries the totals as they were before clearing.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] if there is nothing to buy, or
    /// [`CheckoutError::Invalid`] with every failing field. The cart is
    /// unchanged on error.
    #[instrument(skip(self, form))]
    pub fn checkout(&mut self, form: &CheckoutForm) -> Result<CheckoutConfirmation, CheckoutError> {
        if self.items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let details = form.validate()?;

        let confirmation = CheckoutConfirmation {
            order_ref: Uuid::new_v4(),
            full_name: details.full_name,
            totals: self.totals,
            item_count: self.item_count(),
            placed_at: Utc::now(),
        };

        info!(
            order_ref = %confirmation.order_ref,
            grand_total = %confirmation.totals.grand_total_display(),
            items = confirmation.item_count,
            "Checkout complete"
        );
        add_breadcrumb("checkout", "Checkout complete", None);

        self.items.clear();
        self.commit(CartTotals::default());
        Ok(confirmation)
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.product_id == product_id)
    }

    fn commit(&mut self, totals: CartTotals) {
        self.totals = totals;
        self.persistence.save(&self.items);
    }
}

fn positive_quantity(quantity: i64) -> Result<u32, CartError> {
    if quantity < 1 {
        return Err(CartError::NonPositiveQuantity(quantity));
    }
    u32::try_from(quantity).map_err(|_| CartError::QuantityTooLarge { max: u32::MAX })
}
