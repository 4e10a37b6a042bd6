//! Integration tests for Dine Mart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p dine-mart-integration-tests
//! ```
//!
//! No external services are needed. Each test starts:
//!
//! - a [`FakeBackend`]: an axum server on an ephemeral port that answers the
//!   backend's `/api/*` endpoints from in-memory JSON and records every
//!   request it receives,
//! - the real storefront router ([`dine_mart_storefront::app`]) pointed at
//!   that backend, also on an ephemeral port.
//!
//! Tests then drive the storefront with a cookie-keeping `reqwest` client
//! that does not follow redirects.

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use reqwest::{Client, cookie::Jar, redirect::Policy};
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;

use dine_mart_storefront::config::{BackendApiConfig, DisplayConfig, StorefrontConfig};
use dine_mart_storefront::state::AppState;

/// Bytes served for every product image (PNG signature).
pub const FAKE_IMAGE: &[u8] = b"\x89PNG\r\n\x1a\n";

// =============================================================================
// Fixtures
// =============================================================================

/// Product JSON as the backend returns it.
#[must_use]
pub fn product(id: i32, name: &str, price: i64) -> Value {
    json!({
        "product_id": id,
        "product_name": name,
        "product_description": format!("{name} description"),
        "product_price": price,
        "product_slug": name.to_lowercase().replace(' ', "-"),
        "image_id": id + 100,
    })
}

/// Category JSON as the backend returns it.
#[must_use]
pub fn category(id: i32, name: &str) -> Value {
    json!({
        "category_id": id,
        "category_name": name,
        "category_description": format!("Clothing for {name}"),
    })
}

/// Cart line JSON: product fields flattened alongside the line fields.
#[must_use]
pub fn cart_line(
    cart_id: i32,
    product_id: i32,
    name: &str,
    price: i64,
    quantity: u32,
    size: &str,
) -> Value {
    let mut line = product(product_id, name, price);
    if let Value::Object(fields) = &mut line {
        fields.insert("cart_id".to_string(), json!(cart_id));
        fields.insert("total_cart_products".to_string(), json!(quantity));
        fields.insert("product_total".to_string(), json!(price * i64::from(quantity)));
        fields.insert("product_size".to_string(), json!(size));
    }
    line
}

// =============================================================================
// Fake Backend
// =============================================================================

/// A request received by the fake backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

/// Canned backend data. Edit through [`FakeBackend::data`].
#[derive(Debug)]
pub struct BackendData {
    pub products: Vec<Value>,
    /// `(slug, category)` pairs.
    pub categories: Vec<(String, Value)>,
    /// Products keyed by category id.
    pub category_products: HashMap<i32, Vec<Value>>,
    /// Body of `get-product-from-cart` (bare array or `{"message": [...]}`).
    pub cart: Value,
    /// Answer catalog product reads with a 500.
    pub fail_products: bool,
    /// Answer category reads with a 500.
    pub fail_categories: bool,
    /// Answer category product lists with a 500.
    pub fail_category_products: bool,
    /// Every request received, in order.
    pub requests: Vec<RecordedRequest>,
}

impl Default for BackendData {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            categories: Vec::new(),
            category_products: HashMap::new(),
            cart: json!([]),
            fail_products: false,
            fail_categories: false,
            fail_category_products: false,
            requests: Vec::new(),
        }
    }
}

type SharedData = Arc<Mutex<BackendData>>;

/// In-process stand-in for the product/cart backend.
pub struct FakeBackend {
    addr: SocketAddr,
    data: SharedData,
}

impl FakeBackend {
    /// Start the backend on an ephemeral port.
    pub async fn start(data: BackendData) -> Self {
        let data = Arc::new(Mutex::new(data));
        let app = Router::new().fallback(handle).with_state(Arc::clone(&data));

        let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Failed to read backend address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Fake backend failed");
        });

        Self { addr, data }
    }

    /// Base URL of the backend.
    #[must_use]
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).expect("Invalid backend URL")
    }

    /// Lock the canned data for inspection or changes.
    pub fn data(&self) -> MutexGuard<'_, BackendData> {
        self.data.lock().expect("Backend data lock poisoned")
    }

    /// Requests received for `path`.
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.data()
            .requests
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }
}

async fn handle(
    State(data): State<SharedData>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let query: HashMap<String, String> =
        url::form_urlencoded::parse(uri.query().unwrap_or("").as_bytes())
            .into_owned()
            .collect();
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let mut data = data.lock().expect("Backend data lock poisoned");
    data.requests.push(RecordedRequest {
        method: method.clone(),
        path: uri.path().to_string(),
        query: query.clone(),
        authorization: authorization.clone(),
        body: serde_json::from_slice(&body).ok(),
    });

    let param = |name: &str| query.get(name).cloned().unwrap_or_default();
    let id_param = |name: &str| param(name).parse::<i64>().unwrap_or_default();

    match (method.as_str(), uri.path()) {
        ("GET", "/api/getproducts") => {
            if data.fail_products {
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
            Json(Value::Array(data.products.clone())).into_response()
        }
        ("GET", "/api/getproduct") => {
            let id = id_param("product_id");
            let found = data
                .products
                .iter()
                .find(|p| p["product_id"].as_i64() == Some(id))
                .cloned()
                .unwrap_or(Value::Null);
            Json(found).into_response()
        }
        ("GET", "/api/image") => {
            ([(header::CONTENT_TYPE, "image/png")], FAKE_IMAGE).into_response()
        }
        ("GET", "/api/getcategory") => {
            if data.fail_categories {
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
            let slug = param("category_slug");
            let found = data
                .categories
                .iter()
                .find(|(s, _)| *s == slug)
                .map_or(Value::Null, |(_, c)| c.clone());
            Json(found).into_response()
        }
        ("GET", "/api/getproductbycategory") => {
            if data.fail_category_products {
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
            let id = i32::try_from(id_param("category_id")).unwrap_or_default();
            let products = data.category_products.get(&id).cloned().unwrap_or_default();
            Json(Value::Array(products)).into_response()
        }
        ("GET", "/api/get-product-from-cart") => {
            if authorization.is_none() {
                return StatusCode::UNAUTHORIZED.into_response();
            }
            Json(data.cart.clone()).into_response()
        }
        ("PUT", "/api/update") | ("DELETE", "/api/delete-cart") | ("POST", "/api/addtocart") => {
            if authorization.is_none() {
                return StatusCode::UNAUTHORIZED.into_response();
            }
            Json(json!({"message": "ok"})).into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

// =============================================================================
// Storefront
// =============================================================================

/// Storefront configuration pointed at `api_url`.
#[must_use]
pub fn test_config(api_url: Url) -> StorefrontConfig {
    StorefrontConfig {
        host: Ipv4Addr::LOCALHOST.into(),
        port: 0,
        base_url: "http://127.0.0.1".to_string(),
        api: BackendApiConfig {
            base_url: api_url,
            service_token: None,
            timeout: Duration::from_secs(5),
            catalog_cache_ttl: Duration::from_secs(60),
        },
        display: DisplayConfig::default(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A running storefront plus the backend it talks to.
pub struct TestStorefront {
    pub backend: FakeBackend,
    base_url: Url,
    jar: Arc<Jar>,
    client: Client,
}

impl TestStorefront {
    /// Start a backend with `data` and a storefront using the default config.
    pub async fn start(data: BackendData) -> Self {
        Self::start_with(data, |_| {}).await
    }

    /// Start a backend with `data` and a storefront whose config is adjusted by `configure`.
    pub async fn start_with(
        data: BackendData,
        configure: impl FnOnce(&mut StorefrontConfig),
    ) -> Self {
        let backend = FakeBackend::start(data).await;

        let mut config = test_config(backend.url());
        configure(&mut config);

        let state = AppState::new(config).expect("Failed to build storefront state");
        let app = dine_mart_storefront::app(state);

        let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("Failed to bind storefront");
        let addr = listener.local_addr().expect("Failed to read storefront address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Storefront failed");
        });

        let base_url = Url::parse(&format!("http://{addr}/")).expect("Invalid storefront URL");
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .redirect(Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            backend,
            base_url,
            jar,
            client,
        }
    }

    /// Absolute storefront URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> Url {
        self.base_url.join(path.trim_start_matches('/')).expect("Invalid path")
    }

    /// Send the backend's `access_token` cookie on later requests.
    pub fn sign_in(&self, token: &str) {
        self.jar
            .add_cookie_str(&format!("access_token={token}; Path=/"), &self.base_url);
    }

    /// The cookie-keeping client (redirects are not followed).
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// GET `path`.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed")
    }

    /// GET `path` and return the status and body text.
    pub async fn get_text(&self, path: &str) -> (reqwest::StatusCode, String) {
        let response = self.get(path).await;
        let status = response.status();
        (status, response.text().await.expect("Failed to read body"))
    }

    /// POST a form to `path`.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("Request failed")
    }
}

/// Wrap a token for [`BackendApiConfig::service_token`].
#[must_use]
pub fn service_token(token: &str) -> Option<SecretString> {
    Some(SecretString::from(token.to_string()))
}
