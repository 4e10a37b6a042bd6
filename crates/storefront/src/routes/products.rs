//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use dine_mart_core::{ProductId, ProductSize};

use crate::api::Product;
use crate::error::Result;
use crate::filters;
use crate::models::{LayoutView, ProductView, ViewState};
use crate::routes::cart::MAX_ADD_QUANTITY;
use crate::state::AppState;

/// Longest search query honored; the rest is ignored.
const MAX_QUERY_CHARS: usize = 100;

/// Size choice on the add-to-cart form.
#[derive(Clone)]
pub struct SizeOption {
    pub value: &'static str,
    pub checked: bool,
}

impl SizeOption {
    fn all() -> Vec<Self> {
        ProductSize::ALL
            .iter()
            .map(|size| Self {
                value: size.as_str(),
                checked: *size == ProductSize::default(),
            })
            .collect()
    }
}

/// Search query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

impl SearchQuery {
    /// Trimmed, length-capped query; `None` when blank.
    fn normalized(&self) -> Option<String> {
        let q = self.q.as_deref()?.trim();
        (!q.is_empty()).then(|| q.chars().take(MAX_QUERY_CHARS).collect())
    }
}

/// Whether `product` matches a search `query` (case-insensitive, name or description).
fn matches_query(product: &Product, query: &str) -> bool {
    let query = query.to_lowercase();
    product.product_name.to_lowercase().contains(&query)
        || product.product_description.to_lowercase().contains(&query)
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: LayoutView,
    pub heading: String,
    pub products: ViewState<ProductView>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: LayoutView,
    pub product: ProductView,
    pub sizes: Vec<SizeOption>,
    pub max_quantity: u32,
}

/// Display all products, optionally filtered by `?q=`.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let search = query.normalized();

    let products = match state.api().get_products().await {
        Ok(products) => products
            .iter()
            .filter(|p| search.as_deref().is_none_or(|q| matches_query(p, q)))
            .map(ProductView::from)
            .collect(),
        Err(e) => {
            tracing::error!("Failed to fetch products: {e}");
            Vec::new()
        }
    };

    let heading = search
        .as_ref()
        .map_or_else(|| "ALL PRODUCTS".to_string(), |q| format!("RESULTS FOR \"{q}\""));

    let layout = super::page_layout(&session, "/products")
        .await
        .with_search(search.unwrap_or_default());

    ProductsIndexTemplate {
        layout,
        heading,
        products: ViewState::from_items(products),
    }
}

/// Display product detail page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = state.api().get_product(id).await?;

    Ok(ProductShowTemplate {
        layout: super::page_layout(&session, "").await,
        product: ProductView::from(&product),
        sizes: SizeOption::all(),
        max_quantity: MAX_ADD_QUANTITY,
    })
}
