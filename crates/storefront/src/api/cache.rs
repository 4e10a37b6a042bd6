//! Cache types for catalog API responses.

use dine_mart_core::{CategoryId, ProductId, Slug};

use crate::api::types::{Category, Product};

/// Cache key for catalog reads. Images have their own byte-bounded cache.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
    Product(ProductId),
    Category(Slug),
    CategoryProducts(CategoryId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Vec<Product>),
    Product(Box<Product>),
    Category(Box<Category>),
}
