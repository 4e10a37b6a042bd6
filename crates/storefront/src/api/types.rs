//! Domain types for the backend product/cart API.
//!
//! Field names follow the backend's JSON (`product_name`, `category_id`, ...)
//! so responses decode without renames.

use axum::body::Bytes;
use serde::{Deserialize, Serialize};

use dine_mart_core::{CartItemId, CategoryId, ImageId, Price, ProductId, ProductSize};

// =============================================================================
// Catalog Types
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub product_id: ProductId,
    /// Display name.
    pub product_name: String,
    /// Plain text description.
    #[serde(default)]
    pub product_description: String,
    /// Unit price in whole currency units.
    pub product_price: i64,
    /// URL slug.
    #[serde(default)]
    pub product_slug: String,
    /// Stored image, if the product has one.
    #[serde(default)]
    pub image_id: Option<ImageId>,
}

impl Product {
    /// Unit price as a [`Price`].
    #[must_use]
    pub fn price(&self) -> Price {
        Price::from_whole(self.product_price)
    }
}

/// A product category (e.g., `female`, `male`, `kid`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category ID.
    pub category_id: CategoryId,
    /// Display name.
    pub category_name: String,
    /// Plain text description.
    #[serde(default)]
    pub category_description: String,
}

/// A product image fetched from the backend.
#[derive(Debug, Clone)]
pub struct ProductImage {
    /// MIME type reported by the backend.
    pub content_type: String,
    /// Raw image bytes.
    pub bytes: Bytes,
}

// =============================================================================
// Cart Types
// =============================================================================

/// A line in the shopper's cart: a product plus quantity and size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Cart row ID (one row per product and size).
    pub cart_id: CartItemId,
    /// Quantity of this product in the cart.
    pub total_cart_products: u32,
    /// Line total in whole currency units.
    pub product_total: i64,
    /// Selected size.
    pub product_size: ProductSize,
    /// The product on this line.
    #[serde(flatten)]
    pub product: Product,
}

impl CartLine {
    /// Line total as a [`Price`].
    #[must_use]
    pub fn total(&self) -> Price {
        Price::from_whole(self.product_total)
    }
}

/// Response shape of the cart endpoint.
///
/// Some backend deployments wrap the lines as `{"message": [...]}`, others
/// return the array directly; both decode to the same lines.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CartPayload {
    Wrapped { message: Vec<CartLine> },
    Bare(Vec<CartLine>),
}

impl CartPayload {
    /// Extract the cart lines regardless of shape.
    #[must_use]
    pub fn into_lines(self) -> Vec<CartLine> {
        match self {
            Self::Wrapped { message } => message,
            Self::Bare(lines) => lines,
        }
    }
}

/// The shopper's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    /// Lines in backend order.
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of items across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.total_cart_products).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines.iter().map(CartLine::total).sum()
    }
}

/// Direction of a quantity change on a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartAdjustment {
    Increment,
    Decrement,
}

impl CartAdjustment {
    /// Value sent as the backend's `type` query parameter.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Increment => "increment",
            Self::Decrement => "decrement",
        }
    }
}

/// Body of an add-to-cart request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCartLine {
    /// Quantity to add.
    pub total_cart_products: u32,
    /// Line total for the added quantity.
    pub product_total: i64,
    /// Selected size.
    pub product_size: ProductSize,
}

impl NewCartLine {
    /// Build a line for `quantity` units of `product`.
    #[must_use]
    pub fn for_product(product: &Product, quantity: u32, size: ProductSize) -> Self {
        Self {
            total_cart_products: quantity,
            product_total: product.product_price.saturating_mul(i64::from(quantity)),
            product_size: size,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn line_json(cart_id: i32, qty: u32, total: i64) -> serde_json::Value {
        json!({
            "cart_id": cart_id,
            "total_cart_products": qty,
            "product_total": total,
            "product_size": "large",
            "product_id": 9,
            "product_name": "Muscle Tank",
            "product_description": "Cotton tank",
            "product_price": 205,
            "product_slug": "muscle-tank",
            "image_id": 4
        })
    }

    #[test]
    fn test_product_decodes_without_optional_fields() {
        let product: Product = serde_json::from_value(json!({
            "product_id": 1,
            "product_name": "Brushed Bomber",
            "product_price": 215
        }))
        .unwrap();

        assert_eq!(product.product_description, "");
        assert_eq!(product.image_id, None);
        assert_eq!(product.price().to_string(), "$215.00");
    }

    #[test]
    fn test_cart_payload_bare_array() {
        let payload: CartPayload =
            serde_json::from_value(json!([line_json(1, 2, 410)])).unwrap();
        let lines = payload.into_lines();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product.product_name, "Muscle Tank");
        assert_eq!(lines[0].product_size, ProductSize::Large);
    }

    #[test]
    fn test_cart_payload_wrapped_in_message() {
        let payload: CartPayload = serde_json::from_value(json!({
            "message": [line_json(1, 1, 205), line_json(2, 3, 615)]
        }))
        .unwrap();

        assert_eq!(payload.into_lines().len(), 2);
    }

    #[test]
    fn test_cart_totals() {
        let payload: CartPayload =
            serde_json::from_value(json!([line_json(1, 1, 205), line_json(2, 3, 615)])).unwrap();
        let cart = Cart {
            lines: payload.into_lines(),
        };

        assert_eq!(cart.item_count(), 4);
        assert_eq!(cart.subtotal(), Price::from_whole(820));
        assert!(!cart.is_empty());
        assert!(Cart::default().is_empty());
    }

    #[test]
    fn test_new_cart_line_multiplies_price() {
        let product: Product = serde_json::from_value(json!({
            "product_id": 1,
            "product_name": "Flex Push Button Bomber",
            "product_price": 225
        }))
        .unwrap();

        let line = NewCartLine::for_product(&product, 2, ProductSize::Small);
        assert_eq!(line.product_total, 450);
        assert_eq!(
            serde_json::to_value(&line).unwrap(),
            json!({"total_cart_products": 2, "product_total": 450, "product_size": "small"})
        );
    }
}
