//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions over a bounded moka store, holds toasts)
//! 5. Security headers (CSP, frame denial, etc.)
//!
//! Extractors for per-request inputs live here too: the shopper's backend
//! token and the viewport width client hint.

pub mod client_hints;
pub mod request_id;
pub mod security_headers;
pub mod session;
pub mod shopper;

pub use client_hints::{ACCEPT_CH_VALUE, ViewportWidth, parse_width};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::{SessionCache, create_session_layer};
pub use shopper::ShopperToken;
