//! Backend product/cart API client.
//!
//! # Architecture
//!
//! - The backend is the source of truth: no local sync, direct API calls
//! - `reqwest` for HTTP, `serde_json` for decoding
//! - In-memory caching via `moka` for catalog reads (products, categories,
//!   images); cart calls are never cached
//!
//! # Actions
//!
//! | Method | Backend call |
//! |---|---|
//! | [`ApiClient::get_products`] | `GET /api/getproducts` |
//! | [`ApiClient::get_product`] | `GET /api/getproduct?product_id=` |
//! | [`ApiClient::get_product_image`] | `GET /api/image?image_id=` |
//! | [`ApiClient::get_category`] | `GET /api/getcategory?category_slug=` |
//! | [`ApiClient::get_products_from_category`] | `GET /api/getproductbycategory?category_id=` |
//! | [`ApiClient::get_product_from_cart`] | `GET /api/get-product-from-cart` |
//! | [`ApiClient::get_cart`] | lines from `get_product_from_cart` |
//! | [`ApiClient::update_cart_line`] | `PUT /api/update` |
//! | [`ApiClient::delete_cart_line`] | `DELETE /api/delete-cart` |
//! | [`ApiClient::add_to_cart`] | `POST /api/addtocart` |
//!
//! # Example
//!
//! ```rust,ignore
//! use dine_mart_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config.api)?;
//! let category = client.get_category(&Slug::parse("female")?).await?;
//! let products = client.get_products_from_category(category.category_id).await?;
//! ```

mod cache;
mod client;
pub mod types;

pub use client::ApiClient;
pub use types::*;

use thiserror::Error;

/// Maximum number of body characters kept in error values and logs.
const ERROR_BODY_LIMIT: usize = 200;

/// Errors that can occur when calling the backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with an unexpected status.
    #[error("Backend returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },

    /// Resource not found (404 or a `null` body).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend rejected the shopper's credentials.
    #[error("Unauthorized")]
    Unauthorized,

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// Whether the error means the resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Truncate a response body for error values and logs.
fn truncate_body(body: &str) -> String {
    body.chars().take(ERROR_BODY_LIMIT).collect()
}
