//! Backend API client implementation.
//!
//! Uses `reqwest` for HTTP with `serde_json` decoding.
//! Caches catalog reads using `moka` (TTL from configuration).

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{RequestBuilder, StatusCode, header::CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use dine_mart_core::{CartItemId, CategoryId, ImageId, ProductId, ProductSize, Slug};

use super::cache::{CacheKey, CacheValue};
use super::types::{
    Cart, CartAdjustment, CartLine, CartPayload, Category, NewCartLine, Product, ProductImage,
};
use super::{ApiError, truncate_body};
use crate::config::BackendApiConfig;

/// Maximum number of cached catalog entries.
const CACHE_CAPACITY: u64 = 1000;

/// Maximum total size of cached image bodies (64 MiB).
const IMAGE_CACHE_BYTES: u64 = 64 * 1024 * 1024;

/// Fallback MIME type for images served without one.
const DEFAULT_IMAGE_TYPE: &str = "application/octet-stream";

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the backend product/cart API.
///
/// Cheap to clone; clones share the connection pool and the catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    service_token: Option<SecretString>,
    cache: Cache<CacheKey, CacheValue>,
    images: Cache<ImageId, ProductImage>,
}

impl ApiClient {
    /// Create a new backend API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &BackendApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("dine-mart-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                service_token: config.service_token.clone(),
                cache,
                images: image_cache(IMAGE_CACHE_BYTES, config.catalog_cache_ttl),
            }),
        })
    }

    /// Build an endpoint URL relative to the backend base URL.
    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.join(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Attach the shopper's bearer token, falling back to the service token.
    fn authorized(&self, request: RequestBuilder, access_token: Option<&str>) -> RequestBuilder {
        let token = access_token.or_else(|| {
            self.inner
                .service_token
                .as_ref()
                .map(|t| t.expose_secret())
        });

        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and map non-success statuses to [`ApiError`].
    async fn send(
        &self,
        request: RequestBuilder,
        resource: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(resource.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Unauthorized),
            _ => {
                let body = response.text().await.unwrap_or_default();
                tracing::error!(
                    status = %status,
                    body = %truncate_body(&body),
                    resource,
                    "Backend API returned non-success status"
                );
                Err(ApiError::Status {
                    status: status.as_u16(),
                    body: truncate_body(&body),
                })
            }
        }
    }

    /// Send a request and decode the JSON body.
    async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        resource: &str,
    ) -> Result<T, ApiError> {
        let response = self.send(request, resource).await?;

        // Read as text first for better error diagnostics
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate_body(&body),
                resource,
                "Failed to parse backend API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Check that the backend is reachable (bypasses the cache).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend does not answer successfully.
    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<(), ApiError> {
        let url = self.endpoint("api/getproducts", &[])?;
        self.send(self.inner.client.get(url), "products").await?;
        Ok(())
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get every product in the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let url = self.endpoint("api/getproducts", &[])?;
        let products: Vec<Product> = self
            .fetch_json(self.inner.client.get(url), "products")
            .await?;

        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let cache_key = CacheKey::Product(id);

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let id_param = id.to_string();
        let url = self.endpoint("api/getproduct", &[("product_id", &id_param)])?;
        let resource = format!("product {id}");
        let product: Option<Product> = self
            .fetch_json(self.inner.client.get(url), &resource)
            .await?;
        let product = product.ok_or(ApiError::NotFound(resource))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get the stored image for a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the image is not found or the API request fails.
    #[instrument(skip(self), fields(image_id = %id))]
    pub async fn get_product_image(&self, id: ImageId) -> Result<ProductImage, ApiError> {
        if let Some(image) = self.inner.images.get(&id).await {
            debug!("Cache hit for image");
            return Ok(image);
        }

        let id_param = id.to_string();
        let url = self.endpoint("api/image", &[("image_id", &id_param)])?;
        let response = self
            .send(self.inner.client.get(url), &format!("image {id}"))
            .await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_IMAGE_TYPE)
            .to_string();
        let bytes = response.bytes().await?;

        let image = ProductImage {
            content_type,
            bytes,
        };

        self.inner.images.insert(id, image.clone()).await;

        Ok(image)
    }

    // =========================================================================
    // Category Methods
    // =========================================================================

    /// Get a category by its slug (e.g., `female`).
    ///
    /// # Errors
    ///
    /// Returns an error if the category is not found or the API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_category(&self, slug: &Slug) -> Result<Category, ApiError> {
        let cache_key = CacheKey::Category(slug.clone());

        if let Some(CacheValue::Category(category)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for category");
            return Ok(*category);
        }

        let url = self.endpoint("api/getcategory", &[("category_slug", slug.as_str())])?;
        let resource = format!("category {slug}");
        let category: Option<Category> = self
            .fetch_json(self.inner.client.get(url), &resource)
            .await?;
        let category = category.ok_or(ApiError::NotFound(resource))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Category(Box::new(category.clone())))
            .await;

        Ok(category)
    }

    /// Get the products assigned to a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn get_products_from_category(
        &self,
        id: CategoryId,
    ) -> Result<Vec<Product>, ApiError> {
        let cache_key = CacheKey::CategoryProducts(id);

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for category products");
            return Ok(products);
        }

        let id_param = id.to_string();
        let url = self.endpoint("api/getproductbycategory", &[("category_id", &id_param)])?;
        let products: Vec<Product> = self
            .fetch_json(self.inner.client.get(url), &format!("category {id} products"))
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Get the raw cart lines for the shopper identified by `access_token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the shopper is not authorized.
    #[instrument(skip(self, access_token))]
    pub async fn get_product_from_cart(
        &self,
        access_token: Option<&str>,
    ) -> Result<Vec<CartLine>, ApiError> {
        let url = self.endpoint("api/get-product-from-cart", &[])?;
        let request = self.authorized(self.inner.client.get(url), access_token);
        let payload: CartPayload = self.fetch_json(request, "cart").await?;
        Ok(payload.into_lines())
    }

    /// Get the shopper's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the shopper is not authorized.
    #[instrument(skip(self, access_token))]
    pub async fn get_cart(&self, access_token: Option<&str>) -> Result<Cart, ApiError> {
        let lines = self.get_product_from_cart(access_token).await?;
        Ok(Cart { lines })
    }

    /// Increment or decrement the quantity on a cart line.
    ///
    /// The unit price sent to the backend is read from the shopper's cart,
    /// never taken from the browser.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not in the cart, the API request fails,
    /// or the shopper is not authorized.
    #[instrument(skip(self, access_token), fields(cart_id = %cart_id))]
    pub async fn update_cart_line(
        &self,
        access_token: Option<&str>,
        cart_id: CartItemId,
        adjustment: CartAdjustment,
    ) -> Result<(), ApiError> {
        let resource = format!("cart line {cart_id}");
        let line = self
            .get_product_from_cart(access_token)
            .await?
            .into_iter()
            .find(|line| line.cart_id == cart_id)
            .ok_or_else(|| ApiError::NotFound(resource.clone()))?;

        let cart_param = cart_id.to_string();
        let price_param = line.product.product_price.to_string();
        let url = self.endpoint(
            "api/update",
            &[
                ("cart_id", &cart_param),
                ("type", adjustment.as_str()),
                ("product_price", &price_param),
            ],
        )?;

        let request = self.authorized(self.inner.client.put(url), access_token);
        self.send(request, &resource).await?;
        Ok(())
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the shopper is not authorized.
    #[instrument(skip(self, access_token), fields(cart_id = %cart_id))]
    pub async fn delete_cart_line(
        &self,
        access_token: Option<&str>,
        cart_id: CartItemId,
    ) -> Result<(), ApiError> {
        let cart_param = cart_id.to_string();
        let url = self.endpoint("api/delete-cart", &[("cart_id", &cart_param)])?;

        let request = self.authorized(self.inner.client.delete(url), access_token);
        self.send(request, &format!("cart line {cart_id}")).await?;
        Ok(())
    }

    /// Add `quantity` units of a product in the given size.
    ///
    /// The line total is computed from the product's current price.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found, the API request fails,
    /// or the shopper is not authorized.
    #[instrument(skip(self, access_token), fields(product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        access_token: Option<&str>,
        product_id: ProductId,
        quantity: u32,
        size: ProductSize,
    ) -> Result<(), ApiError> {
        let product = self.get_product(product_id).await?;
        let line = NewCartLine::for_product(&product, quantity, size);

        let id_param = product_id.to_string();
        let url = self.endpoint("api/addtocart", &[("product_id", &id_param)])?;

        let request = self.authorized(self.inner.client.post(url).json(&line), access_token);
        self.send(request, &format!("product {product_id}")).await?;
        Ok(())
    }
}

/// Image bodies cached by total byte size rather than entry count.
fn image_cache(max_bytes: u64, ttl: Duration) -> Cache<ImageId, ProductImage> {
    Cache::builder()
        .weigher(|_id: &ImageId, image: &ProductImage| {
            u32::try_from(image.bytes.len()).unwrap_or(u32::MAX)
        })
        .max_capacity(max_bytes)
        .time_to_live(ttl)
        .build()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Bytes;

    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&BackendApiConfig {
            base_url: Url::parse(base).unwrap(),
            service_token: None,
            timeout: Duration::from_secs(1),
            catalog_cache_ttl: Duration::from_secs(60),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = client("http://backend.local/v1/");
        let url = client
            .endpoint("api/getcategory", &[("category_slug", "female")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://backend.local/v1/api/getcategory?category_slug=female"
        );
    }

    #[test]
    fn test_endpoint_encodes_query_values() {
        let client = client("http://backend.local/");
        let url = client.endpoint("api/update", &[("type", "a b&c")]).unwrap();
        assert_eq!(url.query(), Some("type=a+b%26c"));
    }

    #[test]
    fn test_endpoint_without_query() {
        let client = client("http://backend.local/");
        let url = client.endpoint("api/getproducts", &[]).unwrap();
        assert_eq!(url.as_str(), "http://backend.local/api/getproducts");
    }

    #[tokio::test]
    async fn test_image_cache_is_bounded_by_bytes() {
        let cache = image_cache(4096, Duration::from_secs(60));
        for id in 0..10 {
            let image = ProductImage {
                content_type: "image/png".to_string(),
                bytes: Bytes::from(vec![0_u8; 1024]),
            };
            cache.insert(ImageId::new(id), image).await;
        }

        cache.run_pending_tasks().await;
        assert!(cache.weighted_size() <= 4096);
        assert!(cache.entry_count() <= 4);
    }
}
