//! Shopper credential extractor.
//!
//! The backend issues an `access_token` cookie at login. Cart calls forward
//! it as a bearer token; the storefront never inspects or refreshes it.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::COOKIE, request::Parts},
};
use tower_sessions::cookie::Cookie;

/// Name of the backend's access token cookie.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Extractor that optionally gets the shopper's backend access token.
///
/// Never rejects: a missing cookie yields `ShopperToken(None)` and the cart
/// client falls back to the configured service token, if any.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(token: ShopperToken) -> impl IntoResponse {
///     let cart = state.api().get_cart(token.as_deref()).await;
///     // ...
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShopperToken(pub Option<String>);

impl ShopperToken {
    /// Borrow the token, if present.
    #[must_use]
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Read the access token from the request's `Cookie` headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let token = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .find(|cookie| cookie.name() == ACCESS_TOKEN_COOKIE)
            .map(|cookie| cookie.value().trim_matches('"').to_string())
            .filter(|value| !value.is_empty());

        Self(token)
    }
}

impl<S> FromRequestParts<S> for ShopperToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(cookies: &[&'static str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for cookie in cookies {
            headers.append(COOKIE, HeaderValue::from_static(cookie));
        }
        headers
    }

    #[test]
    fn test_reads_access_token_cookie() {
        let token = ShopperToken::from_headers(&headers(&[
            "dm_session=abc; access_token=eyJhbGciOi.payload.sig; refresh_token=r",
        ]));
        assert_eq!(token.as_deref(), Some("eyJhbGciOi.payload.sig"));
    }

    #[test]
    fn test_reads_token_from_second_cookie_header() {
        let token = ShopperToken::from_headers(&headers(&["dm_session=abc", "access_token=t1"]));
        assert_eq!(token.as_deref(), Some("t1"));
    }

    #[test]
    fn test_missing_or_empty_token() {
        assert_eq!(ShopperToken::from_headers(&headers(&[])), ShopperToken(None));
        assert_eq!(
            ShopperToken::from_headers(&headers(&["access_token="])),
            ShopperToken(None)
        );
    }
}
