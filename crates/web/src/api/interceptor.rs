//! Outgoing request interceptor.
//!
//! Every request the [`ApiClient`](super::ApiClient) builds passes through
//! [`BearerAuth::apply`] before it is sent. When the caller holds a session
//! token the request gains an `Authorization: Bearer <token>` header; when it
//! does not, the request is sent exactly as built.

use reqwest::RequestBuilder;

use super::types::AccessToken;

/// Attaches the session token, if any, to an outgoing request.
#[derive(Debug, Clone, Copy, Default)]
pub struct BearerAuth<'a> {
    token: Option<&'a AccessToken>,
}

impl<'a> BearerAuth<'a> {
    /// Interceptor for a request made on behalf of `token`'s holder.
    #[must_use]
    pub const fn new(token: Option<&'a AccessToken>) -> Self {
        Self { token }
    }

    /// Attach `Authorization: Bearer <token>` when a usable token is present.
    ///
    /// The header is marked sensitive by `reqwest`, so it is not printed in
    /// debug output of the request.
    #[must_use]
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token {
            Some(token) if !token.is_blank() => {
                tracing::trace!("attaching bearer token to API request");
                request.bearer_auth(token.expose())
            }
            _ => request,
        }
    }
}
