//! Shared fixtures for HTTP integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use shopfront_api::email::RecordingMailer;
use shopfront_api::{app, ApiConfig, AppState};
use shopfront_db::{Database, DbConfig};
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub mailer: Arc<RecordingMailer>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_mailer(RecordingMailer::new()).await
    }

    pub async fn with_mailer(mailer: RecordingMailer) -> Self {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mailer = Arc::new(mailer);
        let state = Arc::new(AppState::new(
            db,
            Arc::clone(&mailer) as Arc<dyn shopfront_api::email::Mailer>,
            ApiConfig::for_tests(),
        ));

        TestApp {
            router: app(Arc::clone(&state)),
            state,
            mailer,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn register(&self, email: &str, store_name: &str) -> TestResponse {
        self.post(
            "/api/auth/register",
            None,
            json!({
                "ownerName": "Ada Lovelace",
                "storeName": store_name,
                "email": email,
                "password": "hunter2hunter2",
                "phone": "555-0100",
                "address": "1 Main St"
            }),
        )
        .await
    }

    /// Verification token from the most recent mail sent to `email`.
    pub fn verification_token(&self, email: &str) -> String {
        let sent = self.mailer.sent();
        let mail = sent
            .iter()
            .rev()
            .find(|mail| mail.to == email)
            .expect("verification mail");
        let marker = "/api/auth/verify-email/";
        let start = mail.body.find(marker).expect("link in body") + marker.len();
        mail.body[start..]
            .split_whitespace()
            .next()
            .expect("token")
            .to_string()
    }

    pub async fn login(&self, email: &str) -> TestResponse {
        self.post(
            "/api/auth/login",
            None,
            json!({ "email": email, "password": "hunter2hunter2" }),
        )
        .await
    }

    /// Registers, verifies and logs in a store. Returns the session token.
    pub async fn signed_in_store(&self, email: &str, store_name: &str) -> String {
        assert_eq!(self.register(email, store_name).await.status, StatusCode::OK);
        let token = self.verification_token(email);
        let verified = self
            .get(&format!("/api/auth/verify-email/{token}"), None)
            .await;
        assert_eq!(verified.status, StatusCode::SEE_OTHER);

        let login = self.login(email).await;
        assert_eq!(login.status, StatusCode::OK);
        login.body["token"].as_str().unwrap().to_string()
    }

    /// Adds a device and returns its id.
    pub async fn add_device(&self, token: &str, model: &str, price_cents: i64, quantity: i64) -> i64 {
        let response = self
            .post(
                "/api/inventory/devices",
                Some(token),
                json!({
                    "deviceType": "Phone",
                    "brand": "Generic",
                    "modelName": model,
                    "priceCents": price_cents,
                    "quantityAvailable": quantity
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.body["id"].as_i64().unwrap()
    }

    pub fn sale_body(&self, cart: Value) -> Value {
        json!({
            "customerName": "Grace Hopper",
            "customerEmail": "grace@example.com",
            "customerAddress": "2 Harbor Rd",
            "customerPhone": "555-0199",
            "saleAttendant": "Sam",
            "cart": cart
        })
    }
}
