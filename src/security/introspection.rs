use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, header};
use serde::Deserialize;
use thiserror::Error;

use super::context::Principal;

/// IntrospectionError
///
/// Everything that can go wrong while asking the authorization server about a token.
/// All variants end up as a 401 for the caller; they are kept apart for logging.
#[derive(Debug, Error)]
pub enum IntrospectionError {
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("authorization server unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),
    #[error("authorization server responded with {0}")]
    Upstream(StatusCode),
    #[error("malformed check-token response: {0}")]
    Malformed(#[source] reqwest::Error),
}

// 1. TokenIntrospector Contract
/// TokenIntrospector
///
/// Resolves a raw bearer token into the principal it was issued to. The gateway never
/// validates tokens itself; it only decides whether this collaborator gets asked.
///
/// Implementations must be shareable across request tasks (`Send + Sync`).
#[async_trait]
pub trait TokenIntrospector: Send + Sync {
    async fn introspect(&self, token: &str) -> Result<Principal, IntrospectionError>;
}

/// IntrospectorState
///
/// The concrete type used to share the introspector through the application state.
pub type IntrospectorState = Arc<dyn TokenIntrospector>;

// 2. The Real Implementation (remote check-token endpoint)
/// RemoteTokenIntrospector
///
/// Calls the authorization server's check-token endpoint: a form-encoded `POST` with
/// `token=<token>`, authenticated with the resource server's own client credentials
/// over HTTP Basic.
///
/// A token is rejected when the response carries an `error`, when `active` is `false`,
/// or when its audience is non-empty and does not include this resource id.
#[derive(Clone)]
pub struct RemoteTokenIntrospector {
    client: reqwest::Client,
    check_token_url: String,
    client_id: String,
    client_secret: String,
    resource_id: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct CheckTokenResponse {
    #[serde(default)]
    active: Option<bool>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(flatten)]
    principal: Principal,
}

impl RemoteTokenIntrospector {
    pub fn new(
        check_token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            check_token_url: check_token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            resource_id: resource_id.into(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Overrides the per-call timeout (10 seconds by default).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn check_token_url(&self) -> &str {
        &self.check_token_url
    }
}

#[async_trait]
impl TokenIntrospector for RemoteTokenIntrospector {
    async fn introspect(&self, token: &str) -> Result<Principal, IntrospectionError> {
        let response = self
            .client
            .post(&self.check_token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header(header::ACCEPT, "application/json")
            .form(&[("token", token)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(IntrospectionError::Unreachable)?;

        let status = response.status();
        // A 400 carries an OAuth2 error body ("invalid_token"); anything else non-2xx
        // means the authorization server itself is unhappy.
        if !status.is_success() && status != StatusCode::BAD_REQUEST {
            return Err(IntrospectionError::Upstream(status));
        }

        let body = response
            .json::<CheckTokenResponse>()
            .await
            .map_err(IntrospectionError::Malformed)?;

        if let Some(error) = body.error {
            return Err(IntrospectionError::InvalidToken(
                body.error_description.unwrap_or(error),
            ));
        }
        if body.active == Some(false) {
            return Err(IntrospectionError::InvalidToken("token is not active".into()));
        }

        check_audience(body.principal, &self.resource_id)
    }
}

/// check_audience
///
/// Rejects a principal whose token names resource ids that do not include ours.
/// Tokens without an audience are accepted for any resource.
pub fn check_audience(
    principal: Principal,
    resource_id: &str,
) -> Result<Principal, IntrospectionError> {
    if principal.aud.is_empty() || principal.aud.iter().any(|aud| aud == resource_id) {
        Ok(principal)
    } else {
        Err(IntrospectionError::InvalidToken(format!(
            "token is not valid for resource {resource_id}"
        )))
    }
}

// 3. The Mock Implementation (tests, local development)
/// MockTokenIntrospector
///
/// In-memory token table. Unknown tokens are invalid; with `should_fail` set every call
/// behaves like an unreachable authorization server.
#[derive(Clone, Default)]
pub struct MockTokenIntrospector {
    tokens: HashMap<String, Principal>,
    /// When true, all introspections return a simulated upstream failure.
    pub should_fail: bool,
}

impl MockTokenIntrospector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Registers `token` as active for `principal`.
    pub fn with_token(mut self, token: impl Into<String>, principal: Principal) -> Self {
        self.tokens.insert(token.into(), principal);
        self
    }
}

#[async_trait]
impl TokenIntrospector for MockTokenIntrospector {
    async fn introspect(&self, token: &str) -> Result<Principal, IntrospectionError> {
        if self.should_fail {
            return Err(IntrospectionError::Upstream(StatusCode::SERVICE_UNAVAILABLE));
        }

        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| IntrospectionError::InvalidToken("unknown token".into()))
    }
}
