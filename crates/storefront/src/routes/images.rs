//! Product image proxy.
//!
//! Serves backend images from the storefront origin so pages stay within a
//! first-party `img-src` policy.

use axum::{
    extract::{Path, State},
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::IntoResponse,
};
use tracing::instrument;

use dine_mart_core::ImageId;

use crate::error::Result;
use crate::state::AppState;

/// Browser cache lifetime for product images.
const IMAGE_CACHE_CONTROL: &str = "public, max-age=3600";

/// Proxy a product image from the backend.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ImageId>,
) -> Result<impl IntoResponse> {
    let image = state.api().get_product_image(id).await?;

    Ok((
        [
            (CONTENT_TYPE, image.content_type),
            (CACHE_CONTROL, IMAGE_CACHE_CONTROL.to_string()),
        ],
        image.bytes,
    ))
}
