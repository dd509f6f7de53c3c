use logistics_resource::{
    AccessPolicy, AppConfig, AppState, MockTokenIntrospector, RemoteTokenIntrospector,
    create_router,
    models::{DistrictList, Logistician, ServiceInfo},
    security::{IntrospectorState, Principal},
};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
}

const VALID_TOKEN: &str = "valid-token";

fn mock_introspector() -> IntrospectorState {
    Arc::new(
        MockTokenIntrospector::new()
            .with_token(VALID_TOKEN, Principal::user("administrator", "user-client")),
    )
}

async fn spawn_app_with(config: AppConfig, introspector: IntrospectorState) -> TestApp {
    let state = AppState::new(config, introspector);
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address }
}

async fn spawn_app() -> TestApp {
    spawn_app_with(AppConfig::default(), mock_introspector()).await
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let response = client
        .get(&format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_health_check_introspects_presented_token() {
    let config = AppConfig {
        access_policy: AccessPolicy::Authenticated,
        ..AppConfig::default()
    };
    let failing: IntrospectorState = Arc::new(MockTokenIntrospector::new_failing());
    let app = spawn_app_with(config, failing).await;
    let client = reqwest::Client::new();

    let anonymous = client
        .get(&format!("{}/health", app.address))
        .send()
        .await
        .unwrap();
    let with_token = client
        .get(&format!("{}/health", app.address))
        .bearer_auth("x")
        .send()
        .await
        .unwrap();

    // Not gated by the access policy, but not a public path either.
    assert_eq!(anonymous.status(), 200);
    assert_eq!(with_token.status(), 401);
}

#[tokio::test]
async fn test_district_list_payload() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/district-list", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({ "name": "District 1", "name2": "District 2" })
    );
    assert_eq!(
        serde_json::from_value::<DistrictList>(body).unwrap(),
        DistrictList::sample()
    );
}

#[tokio::test]
async fn test_district_list_ignores_bad_token() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/district-list", app.address))
        .bearer_auth("garbage")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_service_info_is_public() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/template", app.address))
        .bearer_auth("garbage")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let info: ServiceInfo = response.json().await.unwrap();
    assert_eq!(info, ServiceInfo::current());
}

#[tokio::test]
async fn test_logisticians_payload() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/logisticians", app.address))
        .bearer_auth(VALID_TOKEN)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    let first = &body[0];
    assert_eq!(first["fullName"], "John Doe");
    assert_eq!(first["phoneNumber"], "0712121212");
    assert_eq!(first["gender"], "Name");
    assert_eq!(first["address"], "Kabwe");

    let logisticians: Vec<Logistician> = serde_json::from_value(body).unwrap();
    assert_eq!(logisticians.len(), 1);
}

#[tokio::test]
async fn test_logisticians_permit_all_without_token() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/logisticians", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_logisticians_rejects_invalid_token() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/logisticians", app.address))
        .bearer_auth("garbage")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn test_authenticated_policy_requires_token() {
    let config = AppConfig {
        access_policy: AccessPolicy::Authenticated,
        ..AppConfig::default()
    };
    let app = spawn_app_with(config, mock_introspector()).await;
    let client = reqwest::Client::new();

    let anonymous = client
        .get(&format!("{}/logisticians", app.address))
        .send()
        .await
        .unwrap();
    let authenticated = client
        .get(&format!("{}/logisticians", app.address))
        .bearer_auth(VALID_TOKEN)
        .send()
        .await
        .unwrap();
    let public = client
        .get(&format!("{}/district-list", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(anonymous.status(), 401);
    let body: serde_json::Value = anonymous.json().await.unwrap();
    assert_eq!(body["error"], "unauthorized");
    assert_eq!(authenticated.status(), 200);
    assert_eq!(public.status(), 200);
}

#[tokio::test]
async fn test_public_paths_survive_unreachable_auth_server() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let introspector = Arc::new(RemoteTokenIntrospector::new(
        format!("http://127.0.0.1:{}/api/oauth/check_token", port),
        "client",
        "secret",
        "template",
    )) as IntrospectorState;
    let app = spawn_app_with(AppConfig::default(), introspector).await;
    let client = reqwest::Client::new();

    let public = client
        .get(&format!("{}/district-list", app.address))
        .bearer_auth("some-token")
        .send()
        .await
        .unwrap();
    let protected = client
        .get(&format!("{}/logisticians", app.address))
        .bearer_auth("some-token")
        .send()
        .await
        .unwrap();

    assert_eq!(public.status(), 200);
    assert_eq!(protected.status(), 401);
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let config = AppConfig {
        cors_allowed_origins: vec!["https://ui.example.org".to_string()],
        ..AppConfig::default()
    };
    let app = spawn_app_with(config, mock_introspector()).await;
    let client = reqwest::Client::new();

    let allowed = client
        .get(&format!("{}/district-list", app.address))
        .header("origin", "https://ui.example.org")
        .send()
        .await
        .unwrap();
    let denied = client
        .get(&format!("{}/district-list", app.address))
        .header("origin", "https://evil.example.org")
        .send()
        .await
        .unwrap();

    assert_eq!(
        allowed.headers()["access-control-allow-origin"],
        "https://ui.example.org"
    );
    assert!(!denied.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_cors_disabled_without_origins() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/district-list", app.address))
        .header("origin", "https://ui.example.org")
        .send()
        .await
        .unwrap();

    assert!(!response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_openapi_document_lists_endpoints() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/api-docs/openapi.json", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let doc: serde_json::Value = response.json().await.unwrap();
    for path in ["/logisticians", "/district-list", "/template"] {
        assert!(doc["paths"].get(path).is_some(), "{path}");
    }
}
