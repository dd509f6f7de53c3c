//! CORS policy for browser clients.
//!
//! Origins and methods come from configuration and apply to every path. With no
//! allowed origins configured, no CORS layer is installed and browsers get no CORS
//! headers at all.

use axum::http::{HeaderValue, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::AppConfig;

/// cors_layer
///
/// Builds the CORS layer from configuration, or `None` when no origin is allowed.
/// Origins that are not valid header values are skipped.
pub fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(config.cors_allowed_methods.clone())
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]),
    )
}
