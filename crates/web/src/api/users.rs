//! User profile endpoints.

use reqwest::Method;

use portal_core::{ListQuery, UserId, UserListResponse, UserProfile};

use super::{AccessToken, ApiClient, ApiError, BearerAuth, ProfileUpdate};

/// `users/*` endpoints. Obtained from [`ApiClient::users`].
///
/// Every call takes the caller's token; the interceptor attaches it when
/// present. Calls made without one are sent bare and the API decides.
#[derive(Clone, Copy)]
pub struct UsersApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UsersApi<'a> {
    pub(super) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Fetch the profile of the token's holder.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub async fn current_profile(&self, token: Option<&AccessToken>) -> Result<UserProfile, ApiError> {
        let url = self.client.endpoint(&["users", "profile"])?;
        let request = self.client.request(Method::GET, url, BearerAuth::new(token));
        self.client.send(request).await
    }

    /// Fetch a profile by user ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it
    /// (404 for an unknown ID).
    pub async fn profile(&self, token: Option<&AccessToken>, id: &UserId) -> Result<UserProfile, ApiError> {
        let url = self.client.endpoint(&["users", "profile", id.as_str()])?;
        let request = self.client.request(Method::GET, url, BearerAuth::new(token));
        self.client.send(request).await
    }

    /// Apply a partial update to the token holder's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects the update.
    pub async fn update_profile(
        &self,
        token: Option<&AccessToken>,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, ApiError> {
        let url = self.client.endpoint(&["users", "profile"])?;
        let request = self
            .client
            .request(Method::PATCH, url, BearerAuth::new(token))
            .json(update);
        self.client.send(request).await
    }

    /// Fetch one page of users.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub async fn list(&self, token: Option<&AccessToken>, query: ListQuery) -> Result<UserListResponse, ApiError> {
        let mut url = self.client.endpoint(&["users", "list"])?;
        url.query_pairs_mut()
            .append_pair("page", &query.page.to_string())
            .append_pair("limit", &query.limit.to_string());

        let request = self.client.request(Method::GET, url, BearerAuth::new(token));
        let list: UserListResponse = self.client.send(request).await?;
        Ok(list.with_query_defaults(query))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde_json::{Value, json};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use portal_core::Email;

    use super::*;
    use crate::config::ApiConfig;

    async fn setup() -> (MockServer, ApiClient) {
        let server = MockServer::start().await;
        let config = ApiConfig::new(&format!("{}/api", server.uri()), Duration::from_secs(5)).unwrap();
        (server, ApiClient::new(&config).unwrap())
    }

    fn profile_json(id: &str, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "email": "jane@example.com",
            "createdAt": "2024-03-01T10:00:00Z",
            "updatedAt": "2024-03-01T10:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_profile_request_carries_bearer_token() {
        let (server, api) = setup().await;
        Mock::given(method("GET"))
            .and(path("/api/users/profile/u1"))
            .and(header("authorization", "Bearer tok-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_json("u1", "Jane")))
            .expect(1)
            .mount(&server)
            .await;

        let token = AccessToken::new("tok-123");
        let profile = api.users().profile(Some(&token), &UserId::new("u1")).await.unwrap();
        assert_eq!(profile.name, "Jane");
    }

    #[tokio::test]
    async fn test_request_without_token_has_no_authorization_header() {
        let (server, api) = setup().await;
        Mock::given(method("GET"))
            .and(path("/api/users/profile"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "missing token"})))
            .mount(&server)
            .await;

        let err = api.users().current_profile(None).await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.user_message("Failed to load profile."), "missing token");

        let requests = server.received_requests().await.unwrap();
        assert!(!requests.first().unwrap().headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn test_update_profile_sends_patch() {
        let (server, api) = setup().await;
        Mock::given(method("PATCH"))
            .and(path("/api/users/profile"))
            .and(header("authorization", "Bearer tok-123"))
            .and(body_json(json!({"name": "Jane Smith"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_json("u1", "Jane Smith")))
            .expect(1)
            .mount(&server)
            .await;

        let token = AccessToken::new("tok-123");
        let update = ProfileUpdate {
            name: Some("Jane Smith".to_string()),
            email: None,
        };
        let profile = api.users().update_profile(Some(&token), &update).await.unwrap();
        assert_eq!(profile.name, "Jane Smith");
        assert_eq!(profile.email, Email::parse("jane@example.com").unwrap());
    }

    #[tokio::test]
    async fn test_list_sends_pagination_and_fills_defaults() {
        let (server, api) = setup().await;
        Mock::given(method("GET"))
            .and(path("/api/users/list"))
            .and(query_param("page", "2"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "users": [profile_json("u6", "Ada"), profile_json("u7", "Grace")],
                "total": 7
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = AccessToken::new("tok-123");
        let list = api.users().list(Some(&token), ListQuery::new(2, 5)).await.unwrap();
        assert_eq!(list.users.len(), 2);
        assert_eq!(list.page, 2);
        assert_eq!(list.limit, 5);
        assert!(!list.has_next());
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_parse_error() {
        let (server, api) = setup().await;
        Mock::given(method("GET"))
            .and(path("/api/users/profile"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = api.users().current_profile(None).await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
        assert_eq!(err.user_message("Failed to load profile."), "Failed to load profile.");
    }
}
