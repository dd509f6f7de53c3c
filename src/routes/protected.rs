use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Protected Router Module
///
/// Endpoints outside the public path set. A bearer token presented here is always
/// introspected; the router layer above decides whether one is mandatory.
pub fn protected_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /logisticians
        // Fixed one-element logistician list.
        .route("/logisticians", get(handlers::get_logisticians))
}
