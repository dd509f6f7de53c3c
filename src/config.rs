use std::env;

use axum::http::Method;
use thiserror::Error;

use crate::security::path_matcher::DEFAULT_PUBLIC_PATHS;

const LOCAL_AUTH_SERVER_URL: &str = "http://localhost/api/oauth/check_token";
const LOCAL_CLIENT_ID: &str = "trusted-client";
const LOCAL_CLIENT_SECRET: &str = "secret";
const DEFAULT_RESOURCE_ID: &str = "template";
const DEFAULT_CORS_METHODS: &str = "GET,POST,PUT,DELETE,OPTIONS";
const DEFAULT_PORT: u16 = 8080;

/// ConfigError
///
/// Raised at startup when the environment cannot produce a usable configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Env
///
/// Runtime context. Local runs get development fallbacks for the authorization server
/// settings and human-readable logs; production demands every secret explicitly and
/// logs JSON.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// AccessPolicy
///
/// What happens to requests on protected (non-public) paths that end up without an
/// authenticated principal.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum AccessPolicy {
    /// Tokens are validated when present but never required.
    #[default]
    PermitAll,
    /// Protected routes answer 401 unless a valid token was presented.
    Authenticated,
}

impl AccessPolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "permit_all" | "permitall" => Some(Self::PermitAll),
            "authenticated" => Some(Self::Authenticated),
            _ => None,
        }
    }
}

/// AppConfig
///
/// Immutable configuration, loaded once at startup and shared through `AppState`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub env: Env,
    pub port: u16,
    // Check-token endpoint of the authorization server.
    pub auth_server_url: String,
    // Credentials this resource server presents to the check-token endpoint.
    pub auth_client_id: String,
    pub auth_client_secret: String,
    // Audience a token must name (when it names any) to be accepted here.
    pub resource_id: String,
    // An empty list disables CORS entirely.
    pub cors_allowed_origins: Vec<String>,
    pub cors_allowed_methods: Vec<Method>,
    pub public_paths: Vec<String>,
    pub access_policy: AccessPolicy,
}

impl Default for AppConfig {
    /// default
    ///
    /// Non-panicking local configuration for tests.
    fn default() -> Self {
        Self {
            env: Env::Local,
            port: DEFAULT_PORT,
            auth_server_url: LOCAL_AUTH_SERVER_URL.to_string(),
            auth_client_id: LOCAL_CLIENT_ID.to_string(),
            auth_client_secret: LOCAL_CLIENT_SECRET.to_string(),
            resource_id: DEFAULT_RESOURCE_ID.to_string(),
            cors_allowed_origins: Vec::new(),
            cors_allowed_methods: parse_methods(DEFAULT_CORS_METHODS).unwrap_or_default(),
            public_paths: DEFAULT_PUBLIC_PATHS.iter().map(|p| p.to_string()).collect(),
            access_policy: AccessPolicy::PermitAll,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Errors
    /// `ConfigError::Missing` when production lacks one of the authorization server
    /// settings, `ConfigError::Invalid` for unparseable values.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let port = match env::var("PORT") {
            Ok(value) => value.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            Err(_) => DEFAULT_PORT,
        };

        let auth_server_url = required(&env, "AUTH_SERVER_URL", LOCAL_AUTH_SERVER_URL)?;
        let auth_client_id = required(&env, "AUTH_SERVER_CLIENT_ID", LOCAL_CLIENT_ID)?;
        let auth_client_secret =
            required(&env, "AUTH_SERVER_CLIENT_SECRET", LOCAL_CLIENT_SECRET)?;

        let resource_id =
            env::var("AUTH_RESOURCE_ID").unwrap_or_else(|_| DEFAULT_RESOURCE_ID.to_string());

        let cors_allowed_origins = comma_list(&env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default());

        let cors_allowed_methods = parse_methods(
            &env::var("CORS_ALLOWED_METHODS").unwrap_or_else(|_| DEFAULT_CORS_METHODS.to_string()),
        )
        .ok_or(ConfigError::Invalid("CORS_ALLOWED_METHODS"))?;

        let public_paths = match env::var("PUBLIC_PATHS") {
            Ok(value) => comma_list(&value),
            Err(_) => DEFAULT_PUBLIC_PATHS.iter().map(|p| p.to_string()).collect(),
        };

        let access_policy = match env::var("ACCESS_POLICY") {
            Ok(value) => {
                AccessPolicy::parse(&value).ok_or(ConfigError::Invalid("ACCESS_POLICY"))?
            }
            Err(_) => AccessPolicy::default(),
        };

        Ok(Self {
            env,
            port,
            auth_server_url,
            auth_client_id,
            auth_client_secret,
            resource_id,
            cors_allowed_origins,
            cors_allowed_methods,
            public_paths,
            access_policy,
        })
    }
}

// Production must set the variable; local runs fall back to the development value.
fn required(env: &Env, key: &'static str, local_default: &str) -> Result<String, ConfigError> {
    match (env::var(key), env) {
        (Ok(value), _) if !value.trim().is_empty() => Ok(value),
        (_, Env::Production) => Err(ConfigError::Missing(key)),
        (_, Env::Local) => Ok(local_default.to_string()),
    }
}

fn comma_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_methods(value: &str) -> Option<Vec<Method>> {
    comma_list(value)
        .iter()
        .map(|m| Method::from_bytes(m.to_ascii_uppercase().as_bytes()).ok())
        .collect()
}
