//! Category page handler.
//!
//! Resolves the category by slug, then lists its products. A missing
//! category is a 404; any other category failure renders the page with an
//! empty heading and a 502. A failed product list keeps the heading and
//! shows the empty state.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use dine_mart_core::Slug;

use crate::error::AppError;
use crate::filters;
use crate::models::{CategoryView, LayoutView, ProductView, ViewState};
use crate::state::AppState;

/// Category page template.
#[derive(Template, WebTemplate)]
#[template(path = "category/show.html")]
pub struct CategoryShowTemplate {
    pub layout: LayoutView,
    pub category: CategoryView,
    pub products: ViewState<ProductView>,
}

/// Display a category and its products.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
) -> Response {
    let Ok(slug) = Slug::parse(&slug) else {
        return AppError::NotFound(format!("category {slug}")).into_response();
    };

    let category = match state.api().get_category(&slug).await {
        Ok(category) => category,
        Err(e) if e.is_not_found() => return AppError::Api(e).into_response(),
        Err(e) => {
            tracing::error!("Failed to fetch category {slug}: {e}");
            let template = CategoryShowTemplate {
                layout: super::page_layout(&session, "").await,
                category: CategoryView::default(),
                products: ViewState::Empty,
            };
            return (StatusCode::BAD_GATEWAY, template).into_response();
        }
    };

    let products = state
        .api()
        .get_products_from_category(category.category_id)
        .await
        .map_or_else(
            |e| {
                tracing::error!("Failed to fetch products for category {slug}: {e}");
                Vec::new()
            },
            |products| products.iter().map(ProductView::from).collect(),
        );

    let active_path = format!("/category/{slug}");

    CategoryShowTemplate {
        layout: super::page_layout(&session, &active_path).await,
        category: CategoryView::from(&category),
        products: ViewState::from_items(products),
    }
    .into_response()
}
