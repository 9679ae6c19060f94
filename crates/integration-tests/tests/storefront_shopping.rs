//! Role-gated controls, cart, buy-now and orders, end to end.

#![allow(clippy::unwrap_used)]

use bazaar_integration_tests::{browser, location, log_in, spawn_storefront};
use reqwest::StatusCode;

async fn page(client: &reqwest::Client, url: String) -> String {
    let response = client.get(url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response.text().await.unwrap()
}

#[tokio::test]
async fn test_customer_sees_purchase_controls_only() {
    let storefront = spawn_storefront().await;
    let client = browser();
    log_in(&storefront, &client, "cy@example.com").await;

    let html = page(&client, storefront.url("/dashboard")).await;

    assert!(html.contains("action=\"/products/1/cart\""));
    assert!(html.contains("action=\"/products/1/buy\""));
    assert!(!html.contains("/products/1/edit"));
    assert!(!html.contains("/products/1/delete"));
}

#[tokio::test]
async fn test_seller_sees_manage_controls_only() {
    let storefront = spawn_storefront().await;
    let client = browser();
    log_in(&storefront, &client, "seller@example.com").await;

    let html = page(&client, storefront.url("/dashboard")).await;

    assert!(html.contains("/products/1/edit"));
    assert!(html.contains("action=\"/products/1/delete\""));
    assert!(!html.contains("/products/1/cart"));
    assert!(!html.contains("/products/1/buy"));
}

#[tokio::test]
async fn test_quantity_defaults_to_one_for_every_product() {
    let storefront = spawn_storefront().await;
    let client = browser();
    log_in(&storefront, &client, "cy@example.com").await;

    let html = page(&client, storefront.url("/dashboard")).await;

    // Add-to-cart and buy-now each carry the quantity, for all three products
    assert_eq!(html.matches("name=\"quantity\" value=\"1\"").count(), 6);

    let html = page(&client, storefront.url("/dashboard?product=2&qty=3")).await;
    assert_eq!(html.matches("name=\"quantity\" value=\"1\"").count(), 4);
    assert_eq!(html.matches("name=\"quantity\" value=\"3\"").count(), 2);
    assert!(html.contains("Total: ₹12.00"));
}

#[tokio::test]
async fn test_add_to_cart_notice() {
    let storefront = spawn_storefront().await;
    let client = browser();
    log_in(&storefront, &client, "cy@example.com").await;

    let response = client
        .post(storefront.url("/products/2/cart"))
        .form(&[("quantity", "3"), ("return_to", "/dashboard?product=2&qty=3")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/dashboard?product=2&qty=3&notice=3%20item%28s%29%20added%20to%20cart%21"
    );
    assert_eq!(storefront.api.order_creates(), 1);
}

#[tokio::test]
async fn test_rejected_add_to_cart_leaves_cart_unchanged() {
    let storefront = spawn_storefront().await;
    let client = browser();
    log_in(&storefront, &client, "cy@example.com").await;
    storefront.api.reject_orders("Out of stock");

    let before = page(&client, storefront.url("/cart")).await;

    let response = client
        .post(storefront.url("/products/1/cart"))
        .form(&[("quantity", "1"), ("return_to", "/dashboard")])
        .send()
        .await
        .unwrap();
    let target = location(&response);
    assert_eq!(target, "/dashboard?error=Out%20of%20stock");

    let html = page(&client, storefront.url(&target)).await;
    assert!(html.contains("alert--error"));
    assert!(html.contains("Out of stock"));

    let after = page(&client, storefront.url("/cart")).await;
    assert_eq!(before, after);
    assert!(after.contains("Kettle"));
}

#[tokio::test]
async fn test_two_rapid_buy_now_clicks_place_two_orders() {
    let storefront = spawn_storefront().await;
    let client = browser();
    log_in(&storefront, &client, "cy@example.com").await;

    let buy = || {
        client
            .post(storefront.url("/products/1/buy"))
            .form(&[("quantity", "2"), ("return_to", "/dashboard")])
            .send()
    };
    let (first, second) = tokio::join!(buy(), buy());

    for response in [first.unwrap(), second.unwrap()] {
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(location(&response).contains("Total%3A%20%E2%82%B925.00"));
    }
    assert_eq!(storefront.api.order_creates(), 2);
    assert_eq!(storefront.api.payment_creates(), 2);
}

#[tokio::test]
async fn test_orders_page_lists_items() {
    let storefront = spawn_storefront().await;
    let client = browser();
    log_in(&storefront, &client, "cy@example.com").await;

    let html = page(&client, storefront.url("/orders")).await;

    assert!(html.contains("Order #41"));
    assert!(html.contains("Kettle &times; 2 = ₹25.00"));
    assert!(html.contains("Unknown Product &times; 1 = ₹4.00"));
}

#[tokio::test]
async fn test_cart_remove() {
    let storefront = spawn_storefront().await;
    let client = browser();
    log_in(&storefront, &client, "cy@example.com").await;

    let html = page(&client, storefront.url("/cart")).await;
    assert!(html.contains("Grand total"));
    assert!(html.contains("₹12.50"));

    let response = client
        .post(storefront.url("/cart/1/remove"))
        .send()
        .await
        .unwrap();
    assert!(location(&response).starts_with("/cart?notice="));

    let html = page(&client, storefront.url("/cart")).await;
    assert!(html.contains("Your cart is empty."));
}

#[tokio::test]
async fn test_customer_cannot_open_seller_form() {
    let storefront = spawn_storefront().await;
    let client = browser();
    log_in(&storefront, &client, "cy@example.com").await;

    let response = client.get(storefront.url("/products/new")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/dashboard?error="));
}

#[tokio::test]
async fn test_security_headers_on_pages() {
    let storefront = spawn_storefront().await;

    let response = browser().get(storefront.url("/")).send().await.unwrap();

    assert_eq!(response.headers()["x-frame-options"], "DENY");
    assert!(response.headers().contains_key("x-request-id"));
    assert!(response.headers().contains_key("content-security-policy"));
}
