use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints in the default public path set. Their `Authorization` header is
/// stripped before authentication, so a presented token is never looked at.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /template
        // Service name and version.
        .route("/template", get(handlers::get_service_info))
        // GET /district-list
        // Fixed district name mapping.
        .route("/district-list", get(handlers::get_district_list))
}
