//! End-to-end tests for the HTTP surface.
//!
//! The full router runs in-process against [`MockShopify`], so every request
//! goes through the real Admin client, sweep, and cache layers.

#![allow(clippy::unwrap_used)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use ncv_compare_core::FALLBACK_IMAGE;
use ncv_compare_integration_tests::{
    MockResponse, MockShopify, PRODUCT_OP, VENDOR_OP, bare_product_node, product_node,
    product_page, vendor_page,
};
use ncv_compare_web::routes::api::FRESHNESS_HEADER;
use ncv_compare_web::state::AppState;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app(mock: &MockShopify) -> Router {
    let state = AppState::new(mock.config()).expect("Failed to build state");
    ncv_compare_web::app(state)
}

async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

fn freshness(response: &Response) -> &str {
    response
        .headers()
        .get(FRESHNESS_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

async fn script_catalog(mock: &MockShopify) {
    mock.enqueue(
        PRODUCT_OP,
        [MockResponse::data(product_page(
            vec![
                product_node(1, "Pulse 15000", "Geek Bar", "19.99"),
                product_node(2, "BC5000", "Elf Bar", "14.50"),
                bare_product_node(3, "Meloso Max", "geek bar"),
            ],
            None,
        ))],
    )
    .await;
}

// ============================================================================
// /api/vendors
// ============================================================================

#[tokio::test]
async fn test_vendors_across_pages_then_cached() {
    let mock = MockShopify::start().await;
    mock.enqueue(
        VENDOR_OP,
        [
            MockResponse::data(vendor_page(
                &[
                    ("Zeta", "DISPOSABLES"),
                    ("  Acme ", "DISPOSABLES"),
                    ("Pods Co", "PODS"),
                ],
                Some("v1"),
            )),
            MockResponse::data(vendor_page(
                &[("acme", "DISPOSABLES"), ("Zeta", "DISPOSABLES"), ("", "DISPOSABLES")],
                None,
            )),
        ],
    )
    .await;
    let app = app(&mock);

    let response = get(&app, "/api/vendors").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(freshness(&response), "refreshed");
    assert_eq!(
        body_json(response).await,
        json!({ "vendors": ["Acme", "Zeta", "acme"] })
    );

    let requests = mock.requests(VENDOR_OP).await;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].variables["after"], Value::Null);
    assert_eq!(requests[1].variables["after"], "v1");

    let response = get(&app, "/api/vendors").await;
    assert_eq!(freshness(&response), "cached");
    assert_eq!(
        body_json(response).await,
        json!({ "vendors": ["Acme", "Zeta", "acme"] })
    );
    assert_eq!(mock.requests(VENDOR_OP).await.len(), 2);
}

#[tokio::test]
async fn test_vendors_upstream_down_is_unavailable() {
    // Nothing scripted: every request gets a 500 until retries run out
    let mock = MockShopify::start().await;
    let app = app(&mock);

    let response = get(&app, "/api/vendors").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(freshness(&response), "unavailable");
    assert_eq!(body_json(response).await, json!({ "vendors": [] }));
    assert_eq!(mock.requests(VENDOR_OP).await.len(), 5);
}

// ============================================================================
// /api/products
// ============================================================================

#[tokio::test]
async fn test_products_filtered_by_vendor() {
    let mock = MockShopify::start().await;
    script_catalog(&mock).await;
    let app = app(&mock);

    let response = get(&app, "/api/products?vendor=GEEK").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(freshness(&response), "refreshed");

    let body = body_json(response).await;
    let titles: Vec<&str> = body["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Pulse 15000", "Meloso Max"]);
}

#[tokio::test]
async fn test_products_without_filter_returns_all_with_defaults() {
    let mock = MockShopify::start().await;
    script_catalog(&mock).await;
    let app = app(&mock);

    let body = body_json(get(&app, "/api/products").await).await;
    let products = body["products"].as_array().unwrap();
    assert_eq!(products.len(), 3);

    assert_eq!(products[0]["id"], "gid://shopify/Product/1");
    assert_eq!(products[0]["price"], "19.99");
    assert_eq!(products[0]["ml"], "16ml");

    assert_eq!(products[2]["image"], FALLBACK_IMAGE);
    assert_eq!(products[2]["price"], "0.00");
    assert_eq!(products[2]["ml"], "N/A");
    assert_eq!(products[2]["battery"], "N/A");

    // Blank filter behaves like no filter, and the second call is cached
    let response = get(&app, "/api/products?vendor=%20%20").await;
    assert_eq!(freshness(&response), "cached");
    assert_eq!(body_json(response).await["products"].as_array().unwrap().len(), 3);
    assert_eq!(mock.requests(PRODUCT_OP).await.len(), 1);
}

#[tokio::test]
async fn test_products_rejects_oversized_filter() {
    let mock = MockShopify::start().await;
    let app = app(&mock);

    let uri = format!("/api/products?vendor={}", "a".repeat(201));
    let response = get(&app, &uri).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
    assert!(mock.requests(PRODUCT_OP).await.is_empty());
}

#[tokio::test]
async fn test_products_upstream_down_is_unavailable() {
    let mock = MockShopify::start().await;
    mock.enqueue(PRODUCT_OP, [MockResponse::status(StatusCode::FORBIDDEN)])
        .await;
    let app = app(&mock);

    let response = get(&app, "/api/products?vendor=acme").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(freshness(&response), "unavailable");
    assert_eq!(body_json(response).await, json!({ "products": [] }));
    assert_eq!(mock.requests(PRODUCT_OP).await.len(), 1);
}

// ============================================================================
// Page and ancillary routes
// ============================================================================

#[tokio::test]
async fn test_index_lists_vendors() {
    let mock = MockShopify::start().await;
    mock.enqueue(
        VENDOR_OP,
        [MockResponse::data(vendor_page(
            &[("Geek Bar", "DISPOSABLES"), ("Elf Bar", "DISPOSABLES")],
            None,
        ))],
    )
    .await;
    let app = app(&mock);

    let response = get(&app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Select Vendor (DISPOSABLES only):"));
    assert!(html.contains(r#"<option value="Elf Bar">Elf Bar</option>"#));
    assert!(html.contains(r#"<option value="Geek Bar">Geek Bar</option>"#));
    assert!(!html.contains("No vendors available"));
}

#[tokio::test]
async fn test_index_preselects_vendor_with_preview() {
    let mock = MockShopify::start().await;
    mock.enqueue(
        VENDOR_OP,
        [MockResponse::data(vendor_page(&[("Geek Bar", "DISPOSABLES")], None))],
    )
    .await;
    script_catalog(&mock).await;
    let app = app(&mock);

    let html = body_text(get(&app, "/?vendor=Geek%20Bar").await).await;
    assert!(html.contains(r#"<option value="Geek Bar" selected>Geek Bar</option>"#));
    assert!(html.contains("https://cdn.shopify.com/products/1.jpg"));
    assert!(html.contains("/api/products?vendor=Geek%20Bar"));
}

#[tokio::test]
async fn test_index_without_vendors() {
    let mock = MockShopify::start().await;
    mock.enqueue(VENDOR_OP, [MockResponse::data(vendor_page(&[], None))])
        .await;
    let app = app(&mock);

    let html = body_text(get(&app, "/").await).await;
    assert!(html.contains("No vendors available"));
    assert!(!html.contains("could not be fully refreshed"));
}

#[tokio::test]
async fn test_products_page_lists_catalog() {
    let mock = MockShopify::start().await;
    script_catalog(&mock).await;
    let app = app(&mock);

    let response = get(&app, "/products").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<h2>Pulse 15000</h2>"));
    assert!(html.contains("Price: $14.50"));
    assert!(html.contains("https://cdn.shopify.com/products/2.jpg"));
    assert!(html.contains(&format!(r#"src="{FALLBACK_IMAGE}""#)));
    assert!(html.contains("Price: $0.00"));

    // Cost-bounded page size, not the vendor sweep's
    let requests = mock.requests(PRODUCT_OP).await;
    assert_eq!(requests[0].variables["first"], 50);
    assert_eq!(requests[0].variables["variantCount"], 1);
}

#[tokio::test]
async fn test_products_page_degraded() {
    let mock = MockShopify::start().await;
    mock.enqueue(PRODUCT_OP, [MockResponse::status(StatusCode::FORBIDDEN)])
        .await;
    let app = app(&mock);

    let html = body_text(get(&app, "/products").await).await;
    assert!(html.contains("No products available."));
    assert!(html.contains("could not be fully refreshed"));
}

#[tokio::test]
async fn test_index_links_to_products() {
    let mock = MockShopify::start().await;
    mock.enqueue(VENDOR_OP, [MockResponse::data(vendor_page(&[], None))])
        .await;
    let app = app(&mock);

    let html = body_text(get(&app, "/").await).await;
    assert!(html.contains(r#"<a href="/products">Products</a>"#));
}

#[tokio::test]
async fn test_health_carries_request_id() {
    let mock = MockShopify::start().await;
    let app = app(&mock);

    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let mock = MockShopify::start().await;
    let app = app(&mock);

    let response = get(&app, "/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_fallback_image_is_svg() {
    let mock = MockShopify::start().await;
    let app = app(&mock);

    assert_eq!(FALLBACK_IMAGE, "/fallback.svg");
    let response = get(&app, FALLBACK_IMAGE).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/svg+xml"
    );
    assert!(body_text(response).await.starts_with("<svg"));
}
