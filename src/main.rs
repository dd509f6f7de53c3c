use logistics_resource::{
    AppState, RemoteTokenIntrospector,
    config::{AppConfig, Env},
    create_router,
    security::IntrospectorState,
};
use std::{error::Error, net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, sets up logging, wires the remote token introspector, and
/// serves the API.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // 1. Configuration (fail fast on anything unusable)
    dotenv::dotenv().ok();
    let config = AppConfig::load()?;

    // 2. Logging: RUST_LOG wins, otherwise sensible local defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "logistics_resource=debug,tower_http=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Token introspection against the authorization server
    let remote = RemoteTokenIntrospector::new(
        &config.auth_server_url,
        &config.auth_client_id,
        &config.auth_client_secret,
        &config.resource_id,
    );

    tracing::info!(
        check_token_url = %remote.check_token_url(),
        resource_id = %config.resource_id,
        policy = ?config.access_policy,
        "token introspection configured"
    );
    let introspector = Arc::new(remote) as IntrospectorState;

    // 4. State, router, server
    let state = AppState::new(config, introspector);
    for pattern in state.gateway.public_paths().patterns() {
        tracing::info!(pattern = %pattern, "public path");
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let app = create_router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);
    tracing::info!(
        "API Documentation (Swagger UI) available at: http://localhost:{}/swagger-ui",
        addr.port()
    );

    axum::serve(listener, app).await?;
    Ok(())
}
