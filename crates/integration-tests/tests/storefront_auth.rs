//! Login, logout and route guard, end to end.
//!
//! Each test starts its own fake API and storefront on ephemeral ports.

#![allow(clippy::unwrap_used)]

use bazaar_integration_tests::{PASSWORD, browser, location, log_in, spawn_storefront};
use reqwest::StatusCode;

#[tokio::test]
async fn test_health() {
    let storefront = spawn_storefront().await;

    let response = browser().get(storefront.url("/health")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_guarded_page_redirects_when_signed_out() {
    let storefront = spawn_storefront().await;
    let client = browser();

    for path in ["/dashboard", "/orders", "/cart", "/categories", "/products/1"] {
        let response = client.get(storefront.url(path)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response), "/login", "{path}");
    }
}

#[tokio::test]
async fn test_login_then_guarded_page_renders() {
    let storefront = spawn_storefront().await;
    let client = browser();

    log_in(&storefront, &client, "cy@example.com").await;

    let response = client.get(storefront.url("/dashboard")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = response.text().await.unwrap();
    assert!(html.contains("Kettle"));
    assert!(html.contains("cy@example.com"));
    assert!(html.contains("Logout"));
}

#[tokio::test]
async fn test_login_then_logout_guards_again() {
    let storefront = spawn_storefront().await;
    let client = browser();

    log_in(&storefront, &client, "cy@example.com").await;

    let response = client.post(storefront.url("/logout")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    assert_eq!(storefront.api.logouts(), 1);

    let response = client.get(storefront.url("/dashboard")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_bad_credentials_show_server_message() {
    let storefront = spawn_storefront().await;
    let client = browser();

    let response = client
        .post(storefront.url("/login"))
        .form(&[("email", "cy@example.com"), ("password", "wrong")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let target = location(&response);
    assert_eq!(target, "/login?error=Invalid%20credentials");

    let html = client
        .get(storefront.url(&target))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Invalid credentials"));

    // Still signed out
    let response = client.get(storefront.url("/dashboard")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_bearer_header_only_with_session() {
    let storefront = spawn_storefront().await;
    let client = browser();

    client
        .post(storefront.url("/register"))
        .form(&[
            ("email", "new@example.com"),
            ("password", PASSWORD),
            ("confirm_password", PASSWORD),
            ("role", "customer"),
        ])
        .send()
        .await
        .unwrap();
    log_in(&storefront, &client, "cy@example.com").await;
    client.get(storefront.url("/dashboard")).send().await.unwrap();

    let seen = storefront.api.seen();
    let by_path = |path: &str| {
        seen.iter()
            .find(|r| r.path == path)
            .unwrap_or_else(|| panic!("{path} not called"))
            .clone()
    };

    assert_eq!(by_path("register/").authorization, None);
    assert_eq!(by_path("login/").authorization, None);
    assert_eq!(
        by_path("product/list/").authorization.as_deref(),
        Some("Bearer access-cy@example.com")
    );
}

#[tokio::test]
async fn test_register_success_and_mismatch() {
    let storefront = spawn_storefront().await;
    let client = browser();

    let response = client
        .post(storefront.url("/register"))
        .form(&[
            ("email", "new@example.com"),
            ("password", "abc12345"),
            ("confirm_password", "abc12345"),
            ("role", "seller"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(
        location(&response),
        "/login?notice=Registered%20successfully%21"
    );

    let response = client
        .post(storefront.url("/register"))
        .form(&[
            ("email", "new@example.com"),
            ("password", "abc12345"),
            ("confirm_password", "abc"),
            ("role", "seller"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(
        location(&response),
        "/register?error=Passwords%20do%20not%20match%21"
    );
}
