//! Login, registration and logout through the browser-facing forms.

#![allow(clippy::unwrap_used)]

use chrono::{Duration, Utc};
use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use portal_integration_tests::{TestApp, jwt_expiring_at, location, user_json};
use portal_web::config::RateLimitConfig;

#[tokio::test]
async fn test_login_redirects_to_dashboard() {
    let app = TestApp::spawn().await;

    let response = app.login().await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/dashboard"));

    let dashboard = app.get("/dashboard").await;
    assert_eq!(dashboard.status(), StatusCode::OK);
    let body = dashboard.text().await.unwrap();
    assert!(body.contains("Hello, Jane Doe"));
    assert!(body.contains("JD"));
}

#[tokio::test]
async fn test_login_sends_credentials_as_json() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "jane@example.com", "password": "secret1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "tok-1", "user": user_json()})))
        .expect(1)
        .mount(&app.api)
        .await;

    let response = app
        .post_form(
            "/auth/login",
            &[("email", " jane@example.com "), ("password", "secret1")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_rejected_login_shows_server_message() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid email or password"})))
        .mount(&app.api)
        .await;

    let response = app
        .post_form(
            "/auth/login",
            &[("email", "jane@example.com"), ("password", "wrong-password")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Invalid email or password"));
    assert!(body.contains("jane@example.com"));
    assert!(!body.contains("wrong-password"));

    let dashboard = app.get("/dashboard").await;
    assert_eq!(dashboard.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&dashboard), Some("/auth/login"));
}

#[tokio::test]
async fn test_login_without_server_message_uses_fallback() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.api)
        .await;

    let response = app
        .post_form("/auth/login", &[("email", "jane@example.com"), ("password", "secret1")])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Login failed. Please check your credentials."));
}

#[tokio::test]
async fn test_login_page_redirects_when_signed_in() {
    let app = TestApp::spawn().await;

    let page = app.get("/auth/login").await;
    assert_eq!(page.status(), StatusCode::OK);

    app.login().await;

    let page = app.get("/auth/login").await;
    assert_eq!(page.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&page), Some("/dashboard"));
}

#[tokio::test]
async fn test_logout_clears_session() {
    let app = TestApp::spawn().await;
    app.login().await;

    let response = app.post_form("/auth/logout", &[]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/auth/login"));

    let dashboard = app.get("/dashboard").await;
    assert_eq!(dashboard.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&dashboard), Some("/auth/login"));
}

#[tokio::test]
async fn test_expired_token_counts_as_logged_out() {
    let app = TestApp::spawn().await;

    let token = jwt_expiring_at(Utc::now() - Duration::minutes(5));
    app.login_with_token(&token).await;

    let dashboard = app.get("/dashboard").await;
    assert_eq!(dashboard.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&dashboard), Some("/auth/login"));
}

#[tokio::test]
async fn test_unexpired_token_keeps_browser_signed_in() {
    let app = TestApp::spawn().await;

    let token = jwt_expiring_at(Utc::now() + Duration::hours(1));
    app.login_with_token(&token).await;

    let dashboard = app.get("/dashboard").await;
    assert_eq!(dashboard.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_validation_makes_no_api_call() {
    let app = TestApp::spawn().await;

    let response = app
        .post_form(
            "/auth/register",
            &[
                ("name", "Jane Doe"),
                ("email", "jane@example.com"),
                ("password", "secret1"),
                ("password_confirm", "secret2"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Passwords do not match."));
    assert!(body.contains("Jane Doe"));

    let received = app.api.received_requests().await.unwrap();
    assert!(received.is_empty());
}

#[tokio::test]
async fn test_register_short_password() {
    let app = TestApp::spawn().await;

    let response = app
        .post_form(
            "/auth/register",
            &[
                ("name", "Jane Doe"),
                ("email", "jane@example.com"),
                ("password", "abc"),
                ("password_confirm", "abc"),
            ],
        )
        .await;
    let body = response.text().await.unwrap();
    assert!(body.contains("Password must be at least 6 characters."));
}

#[tokio::test]
async fn test_register_signs_in() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_json(json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "password": "secret1"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"token": "tok-9", "user": user_json()})))
        .expect(1)
        .mount(&app.api)
        .await;

    let response = app
        .post_form(
            "/auth/register",
            &[
                ("name", "Jane Doe"),
                ("email", "jane@example.com"),
                ("password", "secret1"),
                ("password_confirm", "secret1"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/dashboard"));

    let dashboard = app.get("/dashboard").await;
    assert_eq!(dashboard.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_conflict_shows_server_message() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"message": "Email already registered"})))
        .mount(&app.api)
        .await;

    let response = app
        .post_form(
            "/auth/register",
            &[
                ("name", "Jane Doe"),
                ("email", "jane@example.com"),
                ("password", "secret1"),
                ("password_confirm", "secret1"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Email already registered"));
}

#[tokio::test]
async fn test_auth_submissions_are_rate_limited() {
    let app = TestApp::spawn_with(RateLimitConfig {
        per_second: 60,
        burst_size: 2,
    })
    .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid email or password"})))
        .mount(&app.api)
        .await;

    let form = [("email", "jane@example.com"), ("password", "wrong1")];
    for _ in 0..2 {
        let response = app.post_form("/auth/login", &form).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let limited = app.post_form("/auth/login", &form).await;
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);

    // Pages are not limited.
    let page = app.get("/auth/login").await;
    assert_eq!(page.status(), StatusCode::OK);
}
