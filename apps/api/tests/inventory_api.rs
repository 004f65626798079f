//! Store-scoped inventory over HTTP.

mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_requires_bearer_token() {
    let app = TestApp::new().await;

    let missing = app.get("/api/inventory/devices", None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.body["code"], "UNAUTHORIZED");

    let forged = app.get("/api/inventory/devices", Some("not.a.jwt")).await;
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_device_crud() {
    let app = TestApp::new().await;
    let token = app.signed_in_store("ada@example.com", "Gadget Hub").await;

    let id = app.add_device(&token, "iPhone 15", 79_900, 5).await;

    let fetched = app
        .get(&format!("/api/inventory/devices/{id}"), Some(&token))
        .await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["modelName"], "iPhone 15");
    assert_eq!(fetched.body["priceCents"], 79_900);

    let updated = app
        .request(
            Method::PUT,
            &format!("/api/inventory/devices/{id}"),
            Some(&token),
            Some(json!({ "quantityAvailable": 0 })),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["device"]["quantityAvailable"], 0);
    assert_eq!(updated.body["device"]["priceCents"], 79_900);

    let listed = app.get("/api/inventory/devices", Some(&token)).await;
    assert_eq!(listed.body.as_array().unwrap().len(), 1);

    let deleted = app
        .request(
            Method::DELETE,
            &format!("/api/inventory/devices/{id}"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let gone = app
        .get(&format!("/api/inventory/devices/{id}"), Some(&token))
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stores_are_isolated() {
    let app = TestApp::new().await;
    let store_a = app.signed_in_store("a@example.com", "Store A").await;
    let store_b = app.signed_in_store("b@example.com", "Store B").await;

    let id = app.add_device(&store_a, "iPhone 15", 79_900, 5).await;

    let listed = app.get("/api/inventory/devices", Some(&store_b)).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert!(listed.body.as_array().unwrap().is_empty());

    let peek = app
        .get(&format!("/api/inventory/devices/{id}"), Some(&store_b))
        .await;
    assert_eq!(peek.status, StatusCode::NOT_FOUND);

    let tamper = app
        .request(
            Method::PUT,
            &format!("/api/inventory/devices/{id}"),
            Some(&store_b),
            Some(json!({ "priceCents": 1 })),
        )
        .await;
    assert_eq!(tamper.status, StatusCode::NOT_FOUND);

    let remove = app
        .request(
            Method::DELETE,
            &format!("/api/inventory/devices/{id}"),
            Some(&store_b),
            None,
        )
        .await;
    assert_eq!(remove.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_device_rejected() {
    let app = TestApp::new().await;
    let token = app.signed_in_store("ada@example.com", "Gadget Hub").await;

    let response = app
        .post(
            "/api/inventory/devices",
            Some(&token),
            json!({
                "deviceType": "Phone",
                "brand": "",
                "modelName": "iPhone 15",
                "priceCents": 79_900,
                "quantityAvailable": 5
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_price_above_cap_rejected() {
    let app = TestApp::new().await;
    let token = app.signed_in_store("ada@example.com", "Gadget Hub").await;

    let response = app
        .post(
            "/api/inventory/devices",
            Some(&token),
            json!({
                "deviceType": "Phone",
                "brand": "Acme",
                "modelName": "Gold Phone",
                "priceCents": i64::MAX / 2 + 1,
                "quantityAvailable": 5
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], "VALIDATION_ERROR");

    let id = app.add_device(&token, "iPhone 15", 79_900, 5).await;
    let update = app
        .request(
            Method::PUT,
            &format!("/api/inventory/devices/{id}"),
            Some(&token),
            Some(json!({ "priceCents": 1_000_000_001_i64 })),
        )
        .await;
    assert_eq!(update.status, StatusCode::BAD_REQUEST);
    assert_eq!(update.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_non_numeric_id_gets_json_error() {
    let app = TestApp::new().await;
    let token = app.signed_in_store("ada@example.com", "Gadget Hub").await;

    for method in [Method::GET, Method::DELETE] {
        let response = app
            .request(method, "/api/inventory/devices/abc", Some(&token), None)
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body["code"], "VALIDATION_ERROR");
    }
}
