//! Cart line items.

use fakestore_core::{Price, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;

/// One product entry in the cart with its quantity.
///
/// The title, price, and image are copied from the product when it is first
/// added; later catalog changes do not reach into the cart. `quantity` is
/// always at least 1 while the item is in a cart.
///
/// Serialized as `{ "productId", "title", "price", "quantity", "imageRef" }`,
/// the layout stored in local storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: ProductId,
    pub title: String,
    #[serde(rename = "price")]
    pub unit_price: Price,
    pub quantity: u32,
    #[serde(default)]
    pub image_ref: Option<String>,
}

impl LineItem {
    /// Snapshot a product into a new line item.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            title: product.title.clone(),
            unit_price: product.price,
            quantity,
            image_ref: product.primary_image(),
        }
    }

    /// Unit price times quantity, at full precision, or `None` on overflow.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price.times(self.quantity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_layout() {
        let item = LineItem {
            product_id: ProductId::new(3),
            title: "Lamp".to_string(),
            unit_price: Price::from_cents(1050),
            quantity: 2,
            image_ref: Some("https://img.example/3.png".to_string()),
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "productId": 3,
                "title": "Lamp",
                "price": "10.50",
                "quantity": 2,
                "imageRef": "https://img.example/3.png"
            })
        );
    }

    #[test]
    fn test_line_total() {
        let item = LineItem {
            product_id: ProductId::new(1),
            title: "Mug".to_string(),
            unit_price: Price::from_cents(333),
            quantity: 3,
            image_ref: None,
        };
        assert_eq!(item.line_total(), Some(Decimal::new(999, 2)));
    }
}
