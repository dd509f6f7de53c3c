use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::{Extensions, request::Parts};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Principal
///
/// The identity resolved from an introspected access token. Field names follow the
/// check-token response of the authorization server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Resource owner's login; absent for client-credentials tokens.
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    /// Reference-data user id attached by the authorization server to user tokens.
    #[serde(default, rename = "referenceDataUserId")]
    pub reference_data_user_id: Option<Uuid>,
    #[serde(default, deserialize_with = "space_delimited_or_list")]
    pub scope: Vec<String>,
    #[serde(default)]
    pub authorities: Vec<String>,
    /// Resource ids the token was issued for.
    #[serde(default, deserialize_with = "space_delimited_or_list")]
    pub aud: Vec<String>,
    /// Expiry as seconds since the epoch.
    #[serde(default)]
    pub exp: Option<u64>,
}

impl Principal {
    /// A principal for a client acting on its own behalf.
    pub fn client(client_id: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            ..Self::default()
        }
    }

    /// A principal for a resource owner authenticated through `client_id`.
    pub fn user(user_name: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            user_name: Some(user_name.into()),
            client_id: Some(client_id.into()),
            ..Self::default()
        }
    }

    /// Name used in logs: the user name when present, otherwise the client id.
    pub fn name(&self) -> &str {
        self.user_name
            .as_deref()
            .or(self.client_id.as_deref())
            .unwrap_or("unknown")
    }
}

// Authorization servers disagree on whether `scope`/`aud` are lists or space-delimited strings.
fn space_delimited_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => value.split_whitespace().map(str::to_string).collect(),
        OneOrMany::Many(values) => values,
    })
}

/// SecurityContext
///
/// Per-request authentication state. It lives in the request's extensions and is
/// threaded through the middleware chain explicitly, so concurrent requests never
/// observe each other's context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SecurityContext {
    #[default]
    Anonymous,
    Authenticated(Principal),
}

impl SecurityContext {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Authenticated(principal) => Some(principal),
            Self::Anonymous => None,
        }
    }

    /// Reads the context stored on a request, defaulting to anonymous.
    pub fn from_extensions(extensions: &Extensions) -> Self {
        extensions.get::<Self>().cloned().unwrap_or_default()
    }

    /// Drops whatever context an earlier layer stored on the request.
    /// Returns `true` when an authenticated context was discarded.
    pub fn clear(extensions: &mut Extensions) -> bool {
        matches!(
            extensions.insert(Self::Anonymous),
            Some(Self::Authenticated(_))
        )
    }
}

/// CurrentAuthentication
///
/// Extractor handing the request's `SecurityContext` to a handler. Never rejects:
/// requests without a stored context are anonymous.
#[derive(Debug, Clone)]
pub struct CurrentAuthentication(pub SecurityContext);

impl<S> FromRequestParts<S> for CurrentAuthentication
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(SecurityContext::from_extensions(&parts.extensions)))
    }
}
