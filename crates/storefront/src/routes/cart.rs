//! Cart route handlers.
//!
//! Cart reads and mutations forward the shopper's `access_token` cookie to
//! the backend as a bearer token. Mutations queue a toast and answer
//! `303 See Other` to `/cart`, which re-fetches the cart.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use dine_mart_core::{CartItemId, ProductId, ProductSize, UserId};

use crate::api::CartAdjustment;
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::ShopperToken;
use crate::models::{CartView, LayoutView, Toast, push_toast};
use crate::state::AppState;

/// Largest quantity accepted in one add-to-cart request.
pub const MAX_ADD_QUANTITY: u32 = 99;

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
    #[serde(default)]
    pub size: ProductSize,
}

/// Update cart form data.
///
/// The unit price is looked up server-side from the cart line.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub cart_id: CartItemId,
    pub action: CartAdjustment,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub cart_id: CartItemId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: LayoutView,
    pub cart: CartView,
}

/// Display cart page.
#[instrument(skip(state, session, token))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    token: ShopperToken,
) -> impl IntoResponse {
    render_cart(&state, &session, &token).await
}

/// Display cart page addressed by user.
///
/// The backend identifies the shopper by token; the path id is only
/// recorded on the span.
#[instrument(skip(state, session, token))]
pub async fn show_for_user(
    State(state): State<AppState>,
    session: Session,
    token: ShopperToken,
    Path(user_id): Path<UserId>,
) -> impl IntoResponse {
    render_cart(&state, &session, &token).await
}

async fn render_cart(
    state: &AppState,
    session: &Session,
    token: &ShopperToken,
) -> CartShowTemplate {
    let tax_rate = state.config().display.tax_rate;

    let cart = match state.api().get_cart(token.as_deref()).await {
        Ok(cart) => CartView::new(&cart, tax_rate),
        Err(e) => {
            tracing::warn!("Failed to fetch cart: {e}");
            CartView::empty()
        }
    };

    CartShowTemplate {
        layout: super::page_layout(session, "/cart").await,
        cart,
    }
}

/// Add item to cart.
#[instrument(skip(state, session, token))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    token: ShopperToken,
    Form(form): Form<AddToCartForm>,
) -> Redirect {
    let quantity = form.quantity.unwrap_or(1);
    if quantity == 0 || quantity > MAX_ADD_QUANTITY {
        push_toast(
            &session,
            Toast::error(format!("Quantity must be between 1 and {MAX_ADD_QUANTITY}.")),
        )
        .await;
        return Redirect::to(&format!("/product/{}", form.product_id));
    }

    let product_param = form.product_id.to_string();
    add_breadcrumb(
        "cart",
        "Add to cart",
        Some(&[("product_id", product_param.as_str()), ("size", form.size.as_str())]),
    );

    let toast = match state
        .api()
        .add_to_cart(token.as_deref(), form.product_id, quantity, form.size)
        .await
    {
        Ok(()) => Toast::success("Added to cart."),
        Err(e) => {
            tracing::error!("Failed to add product {} to cart: {e}", form.product_id);
            Toast::error("Could not add the item to your cart.")
        }
    };

    push_toast(&session, toast).await;
    Redirect::to("/cart")
}

/// Increment or decrement a cart line.
#[instrument(skip(state, session, token))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    token: ShopperToken,
    Form(form): Form<UpdateCartForm>,
) -> Redirect {
    let cart_param = form.cart_id.to_string();
    add_breadcrumb(
        "cart",
        "Update cart line",
        Some(&[("cart_id", cart_param.as_str()), ("type", form.action.as_str())]),
    );

    let toast = match state
        .api()
        .update_cart_line(token.as_deref(), form.cart_id, form.action)
        .await
    {
        Ok(()) => Toast::success("Cart updated."),
        Err(e) => {
            tracing::error!("Failed to update cart line {}: {e}", form.cart_id);
            Toast::error("Could not update your cart.")
        }
    };

    push_toast(&session, toast).await;
    Redirect::to("/cart")
}

/// Remove a line from the cart.
#[instrument(skip(state, session, token))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    token: ShopperToken,
    Form(form): Form<RemoveFromCartForm>,
) -> Redirect {
    let cart_param = form.cart_id.to_string();
    add_breadcrumb("cart", "Remove cart line", Some(&[("cart_id", cart_param.as_str())]));

    let toast = match state
        .api()
        .delete_cart_line(token.as_deref(), form.cart_id)
        .await
    {
        Ok(()) => Toast::success("Item removed from cart."),
        Err(e) => {
            tracing::error!("Failed to remove cart line {}: {e}", form.cart_id);
            Toast::error("Could not remove the item from your cart.")
        }
    };

    push_toast(&session, toast).await;
    Redirect::to("/cart")
}
