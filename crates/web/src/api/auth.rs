//! Authentication endpoints.

use reqwest::Method;

use super::{AccessToken, ApiClient, ApiError, AuthResponse, BearerAuth, LoginRequest, RegisterRequest};

/// `auth/*` endpoints. Obtained from [`ApiClient::auth`].
///
/// Like every other call these go through the interceptor, so a browser that
/// already holds a token sends it along.
#[derive(Clone, Copy)]
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(super) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with the server's message when the
    /// credentials are rejected, or a transport/parse error.
    pub async fn login(
        &self,
        token: Option<&AccessToken>,
        credentials: &LoginRequest,
    ) -> Result<AuthResponse, ApiError> {
        let url = self.client.endpoint(&["auth", "login"])?;
        let request = self
            .client
            .request(Method::POST, url, BearerAuth::new(token))
            .json(credentials);
        self.client.send(request).await
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with the server's message when the
    /// registration is rejected (e.g. the email is taken), or a
    /// transport/parse error.
    pub async fn register(
        &self,
        token: Option<&AccessToken>,
        user: &RegisterRequest,
    ) -> Result<AuthResponse, ApiError> {
        let url = self.client.endpoint(&["auth", "register"])?;
        let request = self
            .client
            .request(Method::POST, url, BearerAuth::new(token))
            .json(user);
        self.client.send(request).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use reqwest::StatusCode;
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use portal_core::Email;

    use super::*;
    use crate::config::ApiConfig;

    async fn setup() -> (MockServer, ApiClient) {
        let server = MockServer::start().await;
        let config = ApiConfig::new(&format!("{}/api", server.uri()), Duration::from_secs(5)).unwrap();
        (server, ApiClient::new(&config).unwrap())
    }

    fn credentials(password: &str) -> LoginRequest {
        LoginRequest {
            email: Email::parse("jane@example.com").unwrap(),
            password: SecretString::from(password),
        }
    }

    #[tokio::test]
    async fn test_login_posts_credentials() {
        let (server, api) = setup().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({"email": "jane@example.com", "password": "secret1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "tok-123",
                "user": {"id": "u1", "name": "Jane Doe", "email": "jane@example.com"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = api.auth().login(None, &credentials("secret1")).await.unwrap();
        assert_eq!(response.token.unwrap().expose(), "tok-123");
        assert_eq!(response.user.unwrap().name, "Jane Doe");
    }

    #[tokio::test]
    async fn test_login_rejection_keeps_server_message() {
        let (server, api) = setup().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"error": "invalid email or password"})),
            )
            .mount(&server)
            .await;

        let err = api.auth().login(None, &credentials("wrong")).await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(err.server_message(), Some("invalid email or password"));
    }

    #[tokio::test]
    async fn test_register_posts_name() {
        let (server, api) = setup().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .and(body_json(json!({
                "name": "Jane Doe",
                "email": "jane@example.com",
                "password": "secret1"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "status": "success",
                "message": "User registered successfully"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = RegisterRequest {
            name: "Jane Doe".to_string(),
            email: Email::parse("jane@example.com").unwrap(),
            password: SecretString::from("secret1"),
        };
        let response = api.auth().register(None, &request).await.unwrap();
        assert!(response.token.is_none());
        assert_eq!(response.message.as_deref(), Some("User registered successfully"));
    }

    #[tokio::test]
    async fn test_auth_calls_carry_a_token_only_when_held() {
        let (server, api) = setup().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t"})))
            .mount(&server)
            .await;

        let held = AccessToken::new("tok-old");
        api.auth().login(None, &credentials("secret1")).await.unwrap();
        api.auth().login(Some(&held), &credentials("secret1")).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        assert!(!requests.first().unwrap().headers.contains_key("authorization"));
        assert_eq!(
            requests.get(1).unwrap().headers.get("authorization").unwrap(),
            "Bearer tok-old"
        );
    }
}
