//! Integration tests for catalog pages: home, slider, category, products,
//! images, health.
//!
//! Run with: cargo test -p dine-mart-integration-tests

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;

use reqwest::StatusCode;

use dine_mart_integration_tests::{BackendData, FAKE_IMAGE, TestStorefront, category, product};

fn catalog() -> BackendData {
    BackendData {
        products: vec![
            product(1, "Brushed Raglan Sweatshirt", 195),
            product(2, "Flex Push Button Bomber", 225),
            product(3, "Muscle Tank", 75),
        ],
        categories: vec![
            ("female".to_string(), category(1, "Female")),
            ("kid".to_string(), category(3, "Kid")),
        ],
        category_products: HashMap::from([
            (
                1,
                vec![
                    product(1, "Brushed Raglan Sweatshirt", 195),
                    product(2, "Flex Push Button Bomber", 225),
                ],
            ),
            (3, Vec::new()),
        ]),
        ..BackendData::default()
    }
}

// ============================================================================
// Home & Slider
// ============================================================================

#[tokio::test]
async fn test_home_renders_loading_shell() {
    let app = TestStorefront::start(catalog()).await;

    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("accept-ch"));

    let body = response.text().await.unwrap();
    assert!(body.contains("Check What We Have"));
    assert!(body.contains("Loading..."));
    assert!(body.contains("data-slider-src=\"/products/slider\""));
    assert!(body.contains("DINE MART"));
    assert!(body.contains("what are you looking for?"));
    assert!(body.contains("Dine Mart</p>"), "footer copyright missing");

    // The shell does not touch the backend.
    assert!(app.backend.requests_to("/api/getproducts").is_empty());
}

#[tokio::test]
async fn test_slider_mobile_from_client_hint() {
    let app = TestStorefront::start(catalog()).await;

    let response = app
        .client()
        .get(app.url("/products/slider"))
        .header("Sec-CH-Viewport-Width", "390")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let vary = response.headers()["vary"].to_str().unwrap().to_string();
    assert!(vary.contains("Sec-CH-Viewport-Width"));

    let body = response.text().await.unwrap();
    assert!(body.contains("data-layout=\"mobile\""));
    assert!(body.contains("data-slides-to-show=\"1\""));
    assert!(!body.contains("data-slider-prev"));
    assert_eq!(body.matches("class=\"slide\"").count(), 3);
    assert!(body.contains("href=\"/product/2\""));
    assert!(body.contains("$225.00"));
}

#[tokio::test]
async fn test_slider_desktop_from_width_param() {
    let app = TestStorefront::start(catalog()).await;

    let (status, body) = app.get_text("/products/slider?width=1440").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("data-layout=\"desktop\""));
    assert!(body.contains("data-slides-to-show=\"3\""));
    assert!(body.contains("data-slider-prev"));
    assert!(body.contains("data-slider-next"));
    assert!(body.contains("data-speed=\"500\""));
}

#[tokio::test]
async fn test_slider_breakpoint_is_inclusive_and_configurable() {
    let app = TestStorefront::start_with(catalog(), |config| {
        config.display.slider_breakpoint = 1200;
    })
    .await;

    let (_, body) = app.get_text("/products/slider?width=1200").await;
    assert!(body.contains("data-layout=\"mobile\""));

    let (_, body) = app.get_text("/products/slider?width=1201").await;
    assert!(body.contains("data-layout=\"desktop\""));
}

#[tokio::test]
async fn test_slider_responsive_without_hint() {
    let app = TestStorefront::start(catalog()).await;

    let (status, body) = app.get_text("/products/slider").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("data-layout=\"responsive\""));
    assert!(body.contains("data-breakpoint=\"992\""));
}

#[tokio::test]
async fn test_slider_ignores_unusable_width_param() {
    let app = TestStorefront::start(catalog()).await;

    for width in ["0", "wide", "-4"] {
        let (status, body) = app.get_text(&format!("/products/slider?width={width}")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("data-layout=\"responsive\""), "width={width}");
    }

    let (_, body) = app.get_text("/products/slider?width=412.5").await;
    assert!(body.contains("data-layout=\"mobile\""));
}

#[tokio::test]
async fn test_slider_refetch_follows_breakpoint_crossing() {
    let app = TestStorefront::start(catalog()).await;

    // Desktop first, as the page script reports on load.
    let (_, body) = app.get_text("/products/slider?width=1440").await;
    assert!(body.contains("data-layout=\"desktop\""));
    assert!(body.contains("data-breakpoint=\"992\""));

    // Shrinking across the breakpoint reloads the fragment at the new width.
    let (_, body) = app.get_text("/products/slider?width=600").await;
    assert!(body.contains("data-layout=\"mobile\""));
    assert!(!body.contains("data-slider-prev"));

    // Catalog stays cached across reloads.
    assert_eq!(app.backend.requests_to("/api/getproducts").len(), 1);
}

#[test]
fn test_slider_script_reloads_on_resize() {
    let script = include_str!("../../storefront/static/js/storefront.js");

    assert!(script.contains("sliderSrc"));
    assert!(script.contains("layoutFor"), "resize picks a layout from the breakpoint");
    assert!(script.contains("response.ok"), "failed fragments are not injected");
}

#[tokio::test]
async fn test_slider_error_message() {
    let app = TestStorefront::start(BackendData {
        fail_products: true,
        ..catalog()
    })
    .await;

    let (status, body) = app.get_text("/products/slider?width=500").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Error: Products are unavailable right now."));
    assert!(!body.contains("class=\"slide\""));
}

#[tokio::test]
async fn test_slider_empty_catalog() {
    let app = TestStorefront::start(BackendData::default()).await;

    let (_, body) = app.get_text("/products/slider").await;
    assert!(body.contains("No products yet."));
}

// ============================================================================
// Category
// ============================================================================

#[tokio::test]
async fn test_category_renders_one_card_per_product() {
    let app = TestStorefront::start(catalog()).await;

    let (status, body) = app.get_text("/category/female").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("FEMALE"));
    assert_eq!(body.matches("class=\"product-card\"").count(), 2);
    assert_eq!(body.matches("Buy Now").count(), 2);
    assert!(body.contains("src=\"/images/101\""));
    assert!(body.contains("$195.00"));
    assert!(body.contains("aria-current=\"page\""));

    let lookups = app.backend.requests_to("/api/getcategory");
    assert_eq!(lookups[0].query["category_slug"], "female");
    let listings = app.backend.requests_to("/api/getproductbycategory");
    assert_eq!(listings[0].query["category_id"], "1");
}

#[tokio::test]
async fn test_category_without_products_shows_empty_state() {
    let app = TestStorefront::start(catalog()).await;

    let (status, body) = app.get_text("/category/kid").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("KID"));
    assert!(body.contains("No products in this category yet."));
}

#[tokio::test]
async fn test_unknown_category_is_not_found() {
    let app = TestStorefront::start(catalog()).await;

    let (status, body) = app.get_text("/category/pets").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("404"));

    let (status, _) = app.get_text("/category/bad%20slug").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_category_backend_failure_renders_empty_heading() {
    let app = TestStorefront::start(BackendData {
        fail_categories: true,
        ..catalog()
    })
    .await;

    let (status, body) = app.get_text("/category/female").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(!body.contains("FEMALE"));
    assert!(body.contains("No products in this category yet."));
}

#[tokio::test]
async fn test_category_product_failure_keeps_heading() {
    let app = TestStorefront::start(BackendData {
        fail_category_products: true,
        ..catalog()
    })
    .await;

    let (status, body) = app.get_text("/category/female").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("FEMALE"));
    assert!(body.contains("No products in this category yet."));
}

#[tokio::test]
async fn test_catalog_reads_are_cached() {
    let app = TestStorefront::start(catalog()).await;

    for _ in 0..3 {
        let (status, _) = app.get_text("/category/female").await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(app.backend.requests_to("/api/getcategory").len(), 1);
    assert_eq!(app.backend.requests_to("/api/getproductbycategory").len(), 1);
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
async fn test_products_index_and_search() {
    let app = TestStorefront::start(catalog()).await;

    let (status, body) = app.get_text("/products").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("ALL PRODUCTS"));
    assert_eq!(body.matches("class=\"product-card\"").count(), 3);

    let (status, body) = app.get_text("/products?q=bomber").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.matches("class=\"product-card\"").count(), 1);
    assert!(body.contains("Flex Push Button Bomber"));
    assert!(body.contains("value=\"bomber\""), "search box keeps the query");

    let (_, body) = app.get_text("/products?q=socks").await;
    assert!(body.contains("No products found."));
}

#[tokio::test]
async fn test_product_detail_has_add_to_cart_form() {
    let app = TestStorefront::start(catalog()).await;

    let (status, body) = app.get_text("/product/2").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Flex Push Button Bomber"));
    assert!(body.contains("action=\"/cart/add\""));
    assert!(body.contains("name=\"product_id\" value=\"2\""));
    assert!(body.contains("value=\"medium\" checked"));
    assert_eq!(body.matches("name=\"size\"").count(), 3);
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let app = TestStorefront::start(catalog()).await;

    let (status, _) = app.get_text("/product/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Images & Health
// ============================================================================

#[tokio::test]
async fn test_image_proxy() {
    let app = TestStorefront::start(catalog()).await;

    let response = app.get("/images/101").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/png");
    assert_eq!(response.headers()["cache-control"], "public, max-age=3600");
    assert_eq!(response.bytes().await.unwrap().as_ref(), FAKE_IMAGE);

    let (status, _) = app.get_text("/images/101").await;
    assert_eq!(status, StatusCode::OK);

    let requests = app.backend.requests_to("/api/image");
    assert_eq!(requests.len(), 1, "image bodies are cached");
    assert_eq!(requests[0].query["image_id"], "101");
}

#[tokio::test]
async fn test_health_checks() {
    let app = TestStorefront::start(catalog()).await;

    let (status, body) = app.get_text("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");

    let (status, _) = app.get_text("/health/ready").await;
    assert_eq!(status, StatusCode::OK);

    app.backend.data().fail_products = true;
    let (status, _) = app.get_text("/health/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_security_headers_and_request_id() {
    let app = TestStorefront::start(catalog()).await;

    let response = app
        .client()
        .get(app.url("/"))
        .header("x-request-id", "edge-1234")
        .send()
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert!(headers["content-security-policy"]
        .to_str()
        .unwrap()
        .contains("frame-ancestors 'none'"));
    assert_eq!(headers["cache-control"], "no-store, max-age=0");
    assert_eq!(headers["x-request-id"], "edge-1234");
}
