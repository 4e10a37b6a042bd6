//! Home page and product slider handlers.
//!
//! The home page renders a shell whose slider shows `Loading...`; the
//! browser then fetches `/products/slider` and swaps the fragment in.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::middleware::{ACCEPT_CH_VALUE, ViewportWidth, parse_width};
use crate::models::{LayoutView, ProductView, ViewState};
use crate::state::AppState;

/// `Vary` value for responses that depend on the viewport hint.
const VARY_VALUE: &str = "Sec-CH-Viewport-Width, Viewport-Width";

/// Slider message when the backend fails.
pub const SLIDER_ERROR_MESSAGE: &str = "Error: Products are unavailable right now.";

/// Slider message when the catalog is empty.
pub const SLIDER_EMPTY_MESSAGE: &str = "No products yet.";

// =============================================================================
// Slider Configuration
// =============================================================================

/// Carousel behavior passed to the slider script via data attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderSettings {
    pub slides_to_show: u8,
    pub slides_to_scroll: u8,
    pub arrows: bool,
    pub infinite: bool,
    pub speed_ms: u32,
}

/// Which slider variant to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderLayout {
    /// Phones and tablets: one slide, swipe only.
    Mobile,
    /// Wide screens: three slides with arrows.
    Desktop,
    /// Width unknown: desktop markup that CSS collapses below the breakpoint.
    Responsive,
}

impl SliderLayout {
    /// Pick a layout for a viewport `width` in CSS pixels.
    ///
    /// Widths at or below `breakpoint` are mobile.
    #[must_use]
    pub const fn for_viewport(width: Option<u32>, breakpoint: u32) -> Self {
        match width {
            Some(width) if width <= breakpoint => Self::Mobile,
            Some(_) => Self::Desktop,
            None => Self::Responsive,
        }
    }

    #[must_use]
    pub const fn settings(self) -> SliderSettings {
        match self {
            Self::Mobile => SliderSettings {
                slides_to_show: 1,
                slides_to_scroll: 1,
                arrows: false,
                infinite: true,
                speed_ms: 500,
            },
            Self::Desktop | Self::Responsive => SliderSettings {
                slides_to_show: 3,
                slides_to_scroll: 1,
                arrows: true,
                infinite: true,
                speed_ms: 500,
            },
        }
    }

    /// CSS modifier and `data-layout` value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Desktop => "desktop",
            Self::Responsive => "responsive",
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: LayoutView,
    /// Always `Loading`: products arrive with the slider fragment.
    pub slider: ViewState<ProductView>,
}

/// Slider fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/slider.html")]
pub struct SliderTemplate {
    pub layout: SliderLayout,
    pub settings: SliderSettings,
    pub breakpoint: u32,
    pub products: ViewState<ProductView>,
    /// Message shown instead of slides.
    pub message: Option<&'static str>,
}

/// Slider query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct SliderQuery {
    /// Viewport width reported by the page script.
    pub width: Option<String>,
}

impl SliderQuery {
    /// The reported width, read with the same rules as the client hint.
    fn viewport_width(&self) -> Option<u32> {
        self.width.as_deref().and_then(parse_width)
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the home page.
#[instrument(skip(session))]
pub async fn home(session: Session) -> impl IntoResponse {
    let layout = super::page_layout(&session, "/").await;

    (
        [("accept-ch", ACCEPT_CH_VALUE)],
        HomeTemplate {
            layout,
            slider: ViewState::Loading,
        },
    )
}

/// Render the product slider fragment.
///
/// Layout follows the viewport client hint, then `?width=`, then falls back
/// to the responsive variant.
#[instrument(skip(state))]
pub async fn slider(
    State(state): State<AppState>,
    viewport: ViewportWidth,
    Query(query): Query<SliderQuery>,
) -> impl IntoResponse {
    let breakpoint = state.config().display.slider_breakpoint;
    let layout = SliderLayout::for_viewport(viewport.or(query.viewport_width()), breakpoint);

    let (products, message) = match state.api().get_products().await {
        Ok(products) => {
            let products =
                ViewState::from_items(products.iter().map(ProductView::from).collect());
            let message = products.is_empty().then_some(SLIDER_EMPTY_MESSAGE);
            (products, message)
        }
        Err(e) => {
            tracing::error!("Failed to fetch products for slider: {e}");
            (ViewState::Empty, Some(SLIDER_ERROR_MESSAGE))
        }
    };

    (
        [("accept-ch", ACCEPT_CH_VALUE), ("vary", VARY_VALUE)],
        SliderTemplate {
            layout,
            settings: layout.settings(),
            breakpoint,
            products,
            message,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_for_viewport() {
        assert_eq!(SliderLayout::for_viewport(Some(390), 992), SliderLayout::Mobile);
        assert_eq!(SliderLayout::for_viewport(Some(992), 992), SliderLayout::Mobile);
        assert_eq!(SliderLayout::for_viewport(Some(993), 992), SliderLayout::Desktop);
        assert_eq!(SliderLayout::for_viewport(None, 992), SliderLayout::Responsive);
        assert_eq!(SliderLayout::for_viewport(Some(1100), 1200), SliderLayout::Mobile);
    }

    #[test]
    fn test_query_width_matches_hint_rules() {
        let query = |width: &str| SliderQuery {
            width: Some(width.to_string()),
        };
        assert_eq!(query("0").viewport_width(), None);
        assert_eq!(query("412.5").viewport_width(), Some(412));
        assert_eq!(query("wide").viewport_width(), None);
        assert_eq!(SliderQuery::default().viewport_width(), None);
    }

    #[test]
    fn test_settings() {
        let mobile = SliderLayout::Mobile.settings();
        assert_eq!(mobile.slides_to_show, 1);
        assert!(!mobile.arrows);

        let desktop = SliderLayout::Desktop.settings();
        assert_eq!(desktop.slides_to_show, 3);
        assert!(desktop.arrows);

        for layout in [SliderLayout::Mobile, SliderLayout::Desktop, SliderLayout::Responsive] {
            let settings = layout.settings();
            assert_eq!(settings.slides_to_scroll, 1);
            assert!(settings.infinite);
            assert_eq!(settings.speed_ms, 500);
        }

        assert_eq!(SliderLayout::Responsive.settings(), desktop);
    }
}
