//! Cart commands.

use std::io::{self, Write};

use fakestore_core::ProductId;
use fakestore_storefront::StorefrontSession;
use fakestore_storefront::cart::{CartStore, CartTotals, LineItem};
use fakestore_storefront::storage::KeyValueStore;

use crate::CliError;

/// Print the cart.
pub fn show(session: &StorefrontSession) -> Result<(), CliError> {
    write_cart(&mut io::stdout().lock(), session.cart())?;
    Ok(())
}

/// Fetch a product and add it to the cart.
pub async fn add(
    session: &mut StorefrontSession,
    id: ProductId,
    quantity: i64,
) -> Result<(), CliError> {
    let product = session.add_product(id, quantity).await?;
    let in_cart = session.cart().get(id).map_or(0, |item| item.quantity);

    let mut out = io::stdout().lock();
    writeln!(out, "Added {} to cart ({in_cart} in cart)", product.title)?;
    write_totals(&mut out, session.cart().totals())?;
    Ok(())
}

/// Set a product's quantity.
pub fn update(
    session: &mut StorefrontSession,
    id: ProductId,
    quantity: i64,
) -> Result<(), CliError> {
    let changed = session.update_quantity(id, quantity)?;

    let mut out = io::stdout().lock();
    match (changed, session.cart().get(id)) {
        (false, None) => writeln!(out, "Product {id} is not in the cart")?,
        (false, Some(item)) => {
            writeln!(out, "{} already has quantity {}", item.title, item.quantity)?;
        }
        (true, Some(item)) => writeln!(out, "Updated {} to {}", item.title, item.quantity)?,
        (true, None) => writeln!(out, "Removed product {id} from cart")?,
    }
    write_totals(&mut out, session.cart().totals())?;
    Ok(())
}

/// Remove a product.
pub fn remove(session: &mut StorefrontSession, id: ProductId) -> Result<(), CliError> {
    let mut out = io::stdout().lock();
    if session.remove_item(id) {
        writeln!(out, "Removed product {id} from cart")?;
    } else {
        writeln!(out, "Product {id} is not in the cart")?;
    }
    write_totals(&mut out, session.cart().totals())?;
    Ok(())
}

/// Empty the cart.
pub fn clear(session: &mut StorefrontSession) -> Result<(), CliError> {
    session.clear_cart();
    writeln!(io::stdout().lock(), "Cart cleared")?;
    Ok(())
}

fn write_cart<S: KeyValueStore>(
    out: &mut impl Write,
    cart: &CartStore<S>,
) -> io::Result<()> {
    if cart.is_empty() {
        return writeln!(out, "Your cart is empty. Browse with `fakestore products list`.");
    }

    for item in cart.items() {
        write_line_item(out, item)?;
    }
    writeln!(out, "\n{} items", cart.item_count())?;
    write_totals(out, cart.totals())
}

fn write_line_item(out: &mut impl Write, item: &LineItem) -> io::Result<()> {
    writeln!(
        out,
        "{:>5}  {:<40}  {:>3} x {:>10}  {:>10}",
        item.product_id,
        item.title,
        item.quantity,
        item.unit_price.to_string(),
        item.line_total()
            .map_or_else(|| "-".to_string(), fakestore_core::format_money)
    )
}

pub fn write_totals(out: &mut impl Write, totals: &CartTotals) -> io::Result<()> {
    writeln!(out, "Subtotal: {:>10}", totals.subtotal_display())?;
    writeln!(out, "Tax:      {:>10}", totals.tax_display())?;
    writeln!(out, "Shipping: {:>10}", totals.shipping_display())?;
    writeln!(out, "Total:    {:>10}", totals.grand_total_display())
}
