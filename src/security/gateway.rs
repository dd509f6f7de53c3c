//! Bearer-token gateway.
//!
//! Three middleware stages sit in front of every route, outermost first:
//!
//! 1. `strip_public_authorization`: requests on a public path lose their
//!    `Authorization` header, so nothing downstream ever tries to validate a token for
//!    them (public paths keep working while the authorization server is unreachable).
//! 2. `authenticate`: a bearer token, if one is left, is introspected and the resulting
//!    principal is stored as the request's `SecurityContext`.
//! 3. `clear_context_without_token`: a protected request that carries no bearer token
//!    has any previously established context cleared before it reaches a handler.
//!
//! `apply` wires the stages in this order; the pure decision logic is also available
//! as `GatewayFilter::filter_request`.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    http::{self, header},
    middleware::{self, Next},
    response::Response,
};

use super::{
    bearer::extract_bearer_token,
    context::SecurityContext,
    introspection::IntrospectorState,
    path_matcher::{PathClass, PublicPaths},
};
use crate::error::AppError;

/// FilterDecision
///
/// Whether token authentication applies to a request. Stored in the request's
/// extensions by the strip stage so later stages see the same decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    /// Public path: the request proceeds anonymously.
    Bypass,
    /// Protected path: tokens are extracted and validated.
    Enforce,
}

/// ContextAction
///
/// What the gateway does to the request's security context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextAction {
    None,
    ClearSecurityContext,
}

/// FilterOutcome
///
/// The effective request together with the gateway's verdict on it.
#[derive(Debug)]
pub struct FilterOutcome<B> {
    pub decision: FilterDecision,
    pub request: http::Request<B>,
    pub context_action: ContextAction,
}

/// GatewayFilter
///
/// Holds the public path set. Cloning is cheap; the set itself is immutable and shared.
#[derive(Debug, Clone, Default)]
pub struct GatewayFilter {
    public_paths: Arc<PublicPaths>,
}

impl GatewayFilter {
    pub fn new(public_paths: PublicPaths) -> Self {
        Self {
            public_paths: Arc::new(public_paths),
        }
    }

    pub fn public_paths(&self) -> &PublicPaths {
        &self.public_paths
    }

    pub fn classify(&self, path: &str) -> PathClass {
        self.public_paths.classify(path)
    }

    /// strip_stage
    ///
    /// First half of the gateway: hides the `Authorization` header on public paths.
    /// `HeaderMap` names are case-insensitive, and `remove` drops every value, so both
    /// `get` and `get_all` report absence afterwards.
    pub fn strip_stage<B>(
        &self,
        mut request: http::Request<B>,
    ) -> (http::Request<B>, FilterDecision) {
        match self.classify(request.uri().path()) {
            PathClass::Public => {
                if request.headers_mut().remove(header::AUTHORIZATION).is_some() {
                    tracing::debug!(
                        path = %request.uri().path(),
                        "public path, authorization header stripped"
                    );
                }
                (request, FilterDecision::Bypass)
            }
            PathClass::Protected => (request, FilterDecision::Enforce),
        }
    }

    /// filter_request
    ///
    /// The gateway's full decision for a request, without running any downstream
    /// authentication. Public paths come back without an `Authorization` header and
    /// with no context action; protected paths come back unchanged, with the context
    /// to be cleared when no bearer token can be extracted.
    pub fn filter_request<B>(&self, request: http::Request<B>) -> FilterOutcome<B> {
        let (request, decision) = self.strip_stage(request);
        let context_action = context_action_for(decision, request.headers());

        FilterOutcome {
            decision,
            request,
            context_action,
        }
    }
}

/// context_action_for
///
/// Second half of the gateway: only protected requests without a bearer token get
/// their context cleared.
pub fn context_action_for(decision: FilterDecision, headers: &http::HeaderMap) -> ContextAction {
    match decision {
        FilterDecision::Bypass => ContextAction::None,
        FilterDecision::Enforce if extract_bearer_token(headers).is_none() => {
            ContextAction::ClearSecurityContext
        }
        FilterDecision::Enforce => ContextAction::None,
    }
}

/// apply
///
/// Wraps `router` in the three gateway stages. Layers added later run earlier, so the
/// stages are added innermost first.
pub fn apply<S>(
    router: Router<S>,
    filter: GatewayFilter,
    introspector: IntrospectorState,
) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(middleware::from_fn(clear_context_without_token))
        .layer(middleware::from_fn_with_state(introspector, authenticate))
        .layer(middleware::from_fn_with_state(filter, strip_public_authorization))
}

/// strip_public_authorization
///
/// Strip stage. Records its decision on the request for the later stages.
pub async fn strip_public_authorization(
    State(filter): State<GatewayFilter>,
    request: Request,
    next: Next,
) -> Response {
    let (mut request, decision) = filter.strip_stage(request);
    request.extensions_mut().insert(decision);
    next.run(request).await
}

/// authenticate
///
/// Token authentication between the two gateway stages. A request without a bearer
/// token passes untouched; a token the introspector rejects ends the request with 401.
pub async fn authenticate(
    State(introspector): State<IntrospectorState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = extract_bearer_token(request.headers()) else {
        return Ok(next.run(request).await);
    };

    let principal = match introspector.introspect(&token).await {
        Ok(principal) => principal,
        Err(err) => {
            tracing::warn!(
                error = %err,
                path = %request.uri().path(),
                "access token rejected"
            );
            return Err(err.into());
        }
    };

    tracing::debug!(principal = %principal.name(), "access token accepted");
    request
        .extensions_mut()
        .insert(SecurityContext::Authenticated(principal));

    Ok(next.run(request).await)
}

/// clear_context_without_token
///
/// Clear stage. Protected requests that reached this point without a bearer token must
/// not carry an authenticated context from an earlier layer.
pub async fn clear_context_without_token(mut request: Request, next: Next) -> Response {
    let decision = request
        .extensions()
        .get::<FilterDecision>()
        .copied()
        .unwrap_or(FilterDecision::Enforce);

    if context_action_for(decision, request.headers()) == ContextAction::ClearSecurityContext
        && SecurityContext::clear(request.extensions_mut())
    {
        tracing::debug!(
            path = %request.uri().path(),
            "no bearer token, security context cleared"
        );
    }

    next.run(request).await
}
