//! Display data for templates.
//!
//! Backend entities are converted into these view models right after the
//! fetch. Prices are formatted here so templates only print strings.

use rust_decimal::Decimal;

use dine_mart_core::{CartItemId, ImageId, Price, ProductId};

use crate::api::{Cart, CartLine, Category, Product};
use crate::models::session::Toast;

// =============================================================================
// View State
// =============================================================================

/// Render state of a list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState<T> {
    /// Data is fetched by the browser after the shell renders.
    Loading,
    /// The fetch failed or returned nothing.
    Empty,
    /// At least one item to render.
    Ready(Vec<T>),
}

impl<T> ViewState<T> {
    /// `Ready` when `items` is non-empty, `Empty` otherwise.
    #[must_use]
    pub fn from_items(items: Vec<T>) -> Self {
        if items.is_empty() {
            Self::Empty
        } else {
            Self::Ready(items)
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Items to render; empty unless `Ready`.
    #[must_use]
    pub fn items(&self) -> &[T] {
        match self {
            Self::Ready(items) => items,
            Self::Loading | Self::Empty => &[],
        }
    }
}

// =============================================================================
// Layout
// =============================================================================

/// Header navigation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub href: &'static str,
}

/// Header and footer navigation, in display order.
pub const NAV_LINKS: [NavLink; 4] = [
    NavLink {
        label: "female",
        href: "/category/female",
    },
    NavLink {
        label: "male",
        href: "/category/male",
    },
    NavLink {
        label: "kid",
        href: "/category/kid",
    },
    NavLink {
        label: "all products",
        href: "/products",
    },
];

/// Data shared by every full page: header state and drained toasts.
#[derive(Debug, Clone, Default)]
pub struct LayoutView {
    /// Path of the active navigation link, if any.
    pub active_path: String,
    /// Current search text, echoed into the header search box.
    pub search_query: String,
    /// Toasts to show on this render.
    pub toasts: Vec<Toast>,
}

impl LayoutView {
    #[must_use]
    pub fn new(active_path: impl Into<String>, toasts: Vec<Toast>) -> Self {
        Self {
            active_path: active_path.into(),
            search_query: String::new(),
            toasts,
        }
    }

    #[must_use]
    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search_query = query.into();
        self
    }

    #[must_use]
    pub const fn nav_links(&self) -> &'static [NavLink] {
        &NAV_LINKS
    }
}

// =============================================================================
// Catalog Views
// =============================================================================

/// Image URL served by the storefront's image proxy.
#[must_use]
pub fn image_url(id: ImageId) -> String {
    format!("/images/{id}")
}

/// Product display data for cards, slides and the detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: String,
    /// Unit price in whole currency units, posted back by forms.
    pub price_amount: i64,
    pub url: String,
    pub image_url: Option<String>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.product_id,
            name: product.product_name.clone(),
            description: product.product_description.clone(),
            price: product.price().display(),
            price_amount: product.product_price,
            url: format!("/product/{}", product.product_id),
            image_url: product.image_id.map(image_url),
        }
    }
}

/// Category header data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryView {
    /// Category name, uppercased for the heading. Empty when unknown.
    pub heading: String,
    pub description: String,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            heading: category.category_name.to_uppercase(),
            description: category.category_description.clone(),
        }
    }
}

// =============================================================================
// Cart Views
// =============================================================================

/// Cart line display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineView {
    pub cart_id: CartItemId,
    pub name: String,
    pub url: String,
    pub size: &'static str,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
    pub image_url: Option<String>,
}

impl CartLineView {
    /// A line at quantity 1 can only be removed, not decremented.
    #[must_use]
    pub const fn can_decrement(&self) -> bool {
        self.quantity > 1
    }
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            cart_id: line.cart_id,
            name: line.product.product_name.clone(),
            url: format!("/product/{}", line.product.product_id),
            size: line.product_size.as_str(),
            quantity: line.total_cart_products,
            unit_price: line.product.price().display(),
            line_total: line.total().display(),
            image_url: line.product.image_id.map(image_url),
        }
    }
}

/// Order summary amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    pub subtotal: Price,
    pub taxes: Price,
    pub shipping: Price,
    pub total: Price,
}

impl CartTotals {
    /// Compute the summary for `cart` at `tax_rate`.
    ///
    /// Taxes are rounded to cents, half away from zero. Shipping is free.
    #[must_use]
    pub fn compute(cart: &Cart, tax_rate: Decimal) -> Self {
        let subtotal = cart.subtotal();
        let taxes = (subtotal * tax_rate).round_to_cents();
        let shipping = Price::zero();

        Self {
            subtotal,
            taxes,
            shipping,
            total: subtotal + taxes + shipping,
        }
    }
}

/// Order summary as display strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSummaryView {
    pub subtotal: String,
    pub taxes: String,
    pub shipping: String,
    pub total: String,
}

impl From<CartTotals> for CartSummaryView {
    fn from(totals: CartTotals) -> Self {
        Self {
            subtotal: totals.subtotal.display(),
            taxes: totals.taxes.display(),
            shipping: totals.shipping.display(),
            total: totals.total.display(),
        }
    }
}

/// Cart display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub summary: CartSummaryView,
    pub item_count: u32,
}

impl CartView {
    /// Build the view for `cart` at `tax_rate`.
    #[must_use]
    pub fn new(cart: &Cart, tax_rate: Decimal) -> Self {
        Self {
            lines: cart.lines.iter().map(CartLineView::from).collect(),
            summary: CartTotals::compute(cart, tax_rate).into(),
            item_count: cart.item_count(),
        }
    }

    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(&Cart::default(), Decimal::ZERO)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Unit count under the cart heading, e.g. "3 items".
    #[must_use]
    pub fn item_label(&self) -> String {
        match self.item_count {
            1 => "1 item".to_string(),
            n => format!("{n} items"),
        }
    }
}
