//! Viewport width client hint.
//!
//! Chromium browsers send `Sec-CH-Viewport-Width` once a response has opted
//! in through `Accept-CH`. Older drafts used a bare `Viewport-Width` header.
//! Browsers that send neither get the responsive slider, laid out by CSS.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderName, request::Parts},
};

/// `Accept-CH` value sent on pages that adapt to the viewport.
pub const ACCEPT_CH_VALUE: &str = "Sec-CH-Viewport-Width, Viewport-Width";

/// Headers checked for the viewport width, most specific first.
const VIEWPORT_HEADERS: [HeaderName; 2] = [
    HeaderName::from_static("sec-ch-viewport-width"),
    HeaderName::from_static("viewport-width"),
];

/// Extractor for the client's layout viewport width in CSS pixels.
///
/// Never rejects. Unparseable and zero values count as absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewportWidth(pub Option<u32>);

impl ViewportWidth {
    /// Read the width from the request's client hint headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let width = VIEWPORT_HEADERS.iter().find_map(|name| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .and_then(parse_width)
        });

        Self(width)
    }

    /// Prefer the client hint, falling back to an explicit override.
    #[must_use]
    pub const fn or(self, fallback: Option<u32>) -> Option<u32> {
        match self.0 {
            Some(width) => Some(width),
            None => fallback,
        }
    }
}

/// Parse a viewport width. Browsers send integers, but some proxies forward
/// fractional device-independent pixels. Zero and garbage count as absent.
#[must_use]
pub fn parse_width(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let whole = raw.split_once('.').map_or(raw, |(whole, _)| whole);
    whole.parse::<u32>().ok().filter(|width| *width > 0)
}

impl<S> FromRequestParts<S> for ViewportWidth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
