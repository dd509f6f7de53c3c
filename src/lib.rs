use axum::{
    Router,
    extract::{Request, State},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod config;
pub mod cors;
pub mod error;
pub mod handlers;
pub mod models;
pub mod security;

// Routes grouped by how the gateway treats them.
pub mod routes;
use routes::{protected, public};

// --- Public Re-exports ---

pub use config::{AccessPolicy, AppConfig};
pub use error::AppError;
pub use security::{
    CurrentAuthentication, GatewayFilter, IntrospectorState, MockTokenIntrospector, PublicPaths,
    RemoteTokenIntrospector, SecurityContext,
};

/// ApiDoc
///
/// OpenAPI document for every handler, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_logisticians,
        handlers::get_district_list,
        handlers::get_service_info
    ),
    components(schemas(models::Logistician, models::DistrictList, models::ServiceInfo)),
    tags((name = "logistics", description = "Logistics resource API"))
)]
struct ApiDoc;

/// AppState
///
/// Shared, read-only state: configuration, the token introspector, and the gateway's
/// public path set.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub introspector: IntrospectorState,
    pub gateway: GatewayFilter,
}

impl AppState {
    /// new
    ///
    /// Builds the state, compiling the configured public paths once.
    pub fn new(config: AppConfig, introspector: IntrospectorState) -> Self {
        let gateway = GatewayFilter::new(PublicPaths::new(&config.public_paths));
        Self {
            config,
            introspector,
            gateway,
        }
    }
}

/// require_authentication
///
/// Route layer for the protected routes. Under `AccessPolicy::Authenticated` a request
/// that reaches it without an authenticated context is rejected with 401; under
/// `AccessPolicy::PermitAll` it lets everything through.
async fn require_authentication(
    State(config): State<AppConfig>,
    CurrentAuthentication(context): CurrentAuthentication,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if config.access_policy == AccessPolicy::Authenticated && !context.is_authenticated() {
        return Err(AppError::AuthenticationRequired);
    }
    Ok(next.run(request).await)
}

/// create_router
///
/// Assembles the routes, the bearer-token gateway, request tracing, and CORS.
pub fn create_router(state: AppState) -> Router {
    let x_request_id = HeaderName::from_static("x-request-id");

    // 1. Routes
    let base_router = Router::new()
        // GET /health
        // Liveness probe. Outside the public path set and the access policy, so it
        // answers without a token but a presented token is still introspected.
        .route("/health", get(|| async { "ok" }))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            protected::protected_routes().route_layer(middleware::from_fn_with_state(
                state.config.clone(),
                require_authentication,
            )),
        )
        .with_state(state.clone());

    // 2. Gateway: strip (public paths) -> authenticate -> clear (no token)
    let router =
        security::gateway::apply(base_router, state.gateway.clone(), state.introspector.clone());

    // 3. Observability and correlation, outside the gateway so rejected requests are
    //    traced too.
    let router = router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace_span_logger)
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(tower_http::LatencyUnit::Millis),
                    ),
            )
            .layer(PropagateRequestIdLayer::new(x_request_id)),
    );

    // 4. CORS, outermost so preflight requests never reach the gateway.
    match cors::cors_layer(&state.config) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

/// trace_span_logger
///
/// Span for each request carrying method, URI, and the `x-request-id` set above.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
