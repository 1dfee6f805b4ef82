//! End-to-end tests for the Portal web application.
//!
//! Each test spawns the real router on an ephemeral port with an in-memory
//! session store, pointed at a `wiremock` server standing in for the REST
//! API. Requests are made with a cookie-keeping `reqwest` client that does not
//! follow redirects, so tests can assert on `Location` headers.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p portal-integration-tests
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, header::LOCATION, redirect};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower_sessions::MemoryStore;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use portal_web::app::build_router;
use portal_web::config::{ApiConfig, PortalConfig, RateLimitConfig};
use portal_web::state::AppState;

/// Rate limit generous enough that ordinary tests never hit it.
pub const RELAXED_RATE_LIMIT: RateLimitConfig = RateLimitConfig {
    per_second: 1,
    burst_size: 1000,
};

/// A running portal plus the mocked API behind it.
pub struct TestApp {
    pub address: SocketAddr,
    pub api: MockServer,
    pub client: Client,
}

impl TestApp {
    /// Spawn the portal with relaxed rate limits.
    pub async fn spawn() -> Self {
        Self::spawn_with(RELAXED_RATE_LIMIT).await
    }

    /// Spawn the portal with the given auth rate limits.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be started.
    pub async fn spawn_with(rate_limit: RateLimitConfig) -> Self {
        let api = MockServer::start().await;
        let config = test_config(&api.uri(), rate_limit);

        let state = AppState::new(config).expect("Failed to create API client");
        let app = build_router(state, MemoryStore::default()).expect("Failed to build router");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let address = listener.local_addr().expect("Listener has no address");

        tokio::spawn(async move {
            axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
                .await
                .expect("Test server error");
        });

        let client = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            address,
            api,
            client,
        }
    }

    /// Absolute URL for a portal path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.address)
    }

    /// GET a portal page.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET")
    }

    /// POST a form to the portal.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("Failed to send POST")
    }

    /// Mount a successful login answer for `token` and sign in through the
    /// login form.
    pub async fn login_with_token(&self, token: &str) -> Response {
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"token": token, "user": user_json()})),
            )
            .mount(&self.api)
            .await;

        self.post_form(
            "/auth/login",
            &[("email", "jane@example.com"), ("password", "secret1")],
        )
        .await
    }

    /// Sign in with an opaque token.
    pub async fn login(&self) -> Response {
        self.login_with_token("tok-123").await
    }
}

fn test_config(api_uri: &str, rate_limit: RateLimitConfig) -> PortalConfig {
    PortalConfig {
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: "http://127.0.0.1".to_string(),
        session_database_url: SecretString::from("sqlite::memory:"),
        static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../web/static"),
        api: ApiConfig::new(&format!("{api_uri}/api"), Duration::from_secs(5))
            .expect("Mock server URI is a valid API URL"),
        rate_limit,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// The `Location` header of a redirect, if any.
#[must_use]
pub fn location(response: &Response) -> Option<&str> {
    response.headers().get(LOCATION).and_then(|v| v.to_str().ok())
}

/// The user object the mocked API returns from login.
#[must_use]
pub fn user_json() -> Value {
    json!({"id": "u1", "name": "Jane Doe", "email": "jane@example.com"})
}

/// A full profile as the mocked API returns it.
#[must_use]
pub fn profile_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "email": "jane@example.com",
        "createdAt": "2024-03-01T10:00:00Z",
        "updatedAt": "2024-03-05T10:00:00Z"
    })
}

/// An unsigned JWT for user `u1` expiring at `exp`.
#[must_use]
pub fn jwt_expiring_at(exp: DateTime<Utc>) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = json!({"user_id": "u1", "exp": exp.timestamp(), "iat": Utc::now().timestamp()});
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.signature")
}
