//! View models and session data for storefront templates.
//!
//! - [`session`]: toast notifications queued in the session
//! - [`view`]: display data built from backend entities

pub mod session;
pub mod view;

pub use session::{Toast, ToastKind, keys as session_keys, push_toast, take_toasts};
pub use view::{
    CartLineView, CartSummaryView, CartTotals, CartView, CategoryView, LayoutView, NAV_LINKS,
    NavLink, ProductView, ViewState, image_url,
};
