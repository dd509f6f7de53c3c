use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::security::introspection::IntrospectionError;

/// ErrorResponse
///
/// OAuth2-style error body, the shape resource-server clients already parse.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub error_description: String,
}

/// AppError
///
/// Application-level failures and their HTTP mapping.
#[derive(Debug, Error)]
pub enum AppError {
    /// A bearer token was presented but could not be validated.
    #[error("invalid token: {description}")]
    InvalidToken { description: String },
    /// The access policy requires an authenticated principal and there is none.
    #[error("full authentication is required to access this resource")]
    AuthenticationRequired,
}

impl AppError {
    pub fn invalid_token(description: impl Into<String>) -> Self {
        Self::InvalidToken {
            description: description.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let description = self.to_string();
        let code = match self {
            AppError::InvalidToken { .. } => "invalid_token",
            AppError::AuthenticationRequired => "unauthorized",
        };

        let body = ErrorResponse {
            error: code,
            error_description: description,
        };

        let mut response = (StatusCode::UNAUTHORIZED, Json(body)).into_response();
        let challenge = format!("Bearer error=\"{code}\"");
        if let Ok(value) = HeaderValue::from_str(&challenge) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, value);
        }
        response
    }
}

impl From<IntrospectionError> for AppError {
    fn from(e: IntrospectionError) -> Self {
        match e {
            IntrospectionError::InvalidToken(reason) => AppError::invalid_token(reason),
            // The caller cannot tell an unreachable auth server from a bad token;
            // both mean the token could not be accepted.
            other => AppError::invalid_token(other.to_string()),
        }
    }
}
