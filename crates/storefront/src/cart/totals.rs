//! Cart total calculation.
//!
//! Pricing is fixed: 10% tax on the subtotal and a flat $5.00 shipping fee
//! for any non-empty cart. There is no region or weight model.

use fakestore_core::format_money;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::cart::LineItem;

/// Tax rate applied to the subtotal (10%).
pub const TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Flat shipping fee for a non-empty cart ($5.00).
pub const FLAT_SHIPPING: Decimal = Decimal::from_parts(500, 0, 0, false, 2);

/// Totals derived from a cart's line items.
///
/// Values are full precision; use the `*_display` methods for cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub grand_total: Decimal,
}

impl CartTotals {
    /// Subtotal formatted as dollars.
    #[must_use]
    pub fn subtotal_display(&self) -> String {
        format_money(self.subtotal)
    }

    /// Tax formatted as dollars.
    #[must_use]
    pub fn tax_display(&self) -> String {
        format_money(self.tax)
    }

    /// Shipping formatted as dollars.
    #[must_use]
    pub fn shipping_display(&self) -> String {
        format_money(self.shipping)
    }

    /// Grand total formatted as dollars.
    #[must_use]
    pub fn grand_total_display(&self) -> String {
        format_money(self.grand_total)
    }
}

/// Compute subtotal, tax, shipping, and grand total for a list of items.
///
/// Returns `None` if any amount overflows a [`Decimal`].
#[must_use]
pub fn compute_totals(items: &[LineItem]) -> Option<CartTotals> {
    if items.is_empty() {
        return Some(CartTotals::default());
    }

    let subtotal = items.iter().try_fold(Decimal::ZERO, |sum, item| {
        sum.checked_add(item.line_total()?)
    })?;
    let tax = subtotal.checked_mul(TAX_RATE)?;
    let shipping = FLAT_SHIPPING;
    let grand_total = subtotal.checked_add(tax)?.checked_add(shipping)?;

    Some(CartTotals {
        subtotal,
        tax,
        shipping,
        grand_total,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fakestore_core::{Price, ProductId};

    use super::*;

    fn item(id: i32, price: Decimal, quantity: u32) -> LineItem {
        LineItem {
            product_id: ProductId::new(id),
            title: format!("Product {id}"),
            unit_price: Price::new(price).unwrap_or(Price::ZERO),
            quantity,
            image_ref: None,
        }
    }

    #[test]
    fn test_constants() {
        assert_eq!(TAX_RATE, Decimal::new(1, 1));
        assert_eq!(FLAT_SHIPPING, Decimal::from(5));
    }

    #[test]
    fn test_empty_cart_is_all_zero() {
        let totals = compute_totals(&[]).unwrap();
        assert_eq!(totals, CartTotals::default());
        assert!(totals.subtotal.is_zero());
        assert!(totals.tax.is_zero());
        assert!(totals.shipping.is_zero());
        assert!(totals.grand_total.is_zero());
    }

    #[test]
    fn test_two_items() {
        let totals = compute_totals(&[
            item(1, Decimal::from(10), 2),
            item(2, Decimal::from(5), 1),
        ])
        .unwrap();

        assert_eq!(totals.subtotal, Decimal::from(25));
        assert_eq!(totals.tax, Decimal::new(25, 1));
        assert_eq!(totals.shipping, Decimal::new(50, 1));
        assert_eq!(totals.grand_total, Decimal::new(325, 1));
        assert_eq!(totals.grand_total_display(), "$32.50");
    }

    #[test]
    fn test_no_compounding_rounding() {
        // 3 x $0.333 = $0.999 -> rounds once at display time, not per item.
        let totals = compute_totals(&[
            item(1, Decimal::new(333, 3), 1),
            item(2, Decimal::new(333, 3), 1),
            item(3, Decimal::new(333, 3), 1),
        ])
        .unwrap();

        assert_eq!(totals.subtotal, Decimal::new(999, 3));
        assert_eq!(totals.subtotal_display(), "$1.00");
        assert_eq!(totals.tax, Decimal::new(999, 4));
        assert_eq!(totals.tax_display(), "$0.10");
    }

    #[test]
    fn test_free_items_still_pay_shipping() {
        let totals = compute_totals(&[item(1, Decimal::ZERO, 4)]).unwrap();
        assert!(totals.subtotal.is_zero());
        assert_eq!(totals.shipping_display(), "$5.00");
        assert_eq!(totals.grand_total, Decimal::from(5));
    }

    #[test]
    fn test_overflow_is_none() {
        // Fits on its own, but tax pushes the grand total past the maximum.
        assert!(compute_totals(&[item(1, Decimal::MAX, 1)]).is_none());
        // Line total overflows.
        assert!(compute_totals(&[item(1, Decimal::MAX / Decimal::TEN, 11)]).is_none());
        // Each line fits, the sum does not.
        let half = Decimal::MAX / Decimal::TWO;
        assert!(compute_totals(&[item(1, half, 1), item(2, half, 1)]).is_none());
    }
}
