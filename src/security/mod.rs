//! Request security: public path matching, bearer-token extraction, token
//! introspection, and the gateway middleware that ties them together.

pub mod bearer;
pub mod context;
pub mod gateway;
pub mod introspection;
pub mod path_matcher;

pub use bearer::extract_bearer_token;
pub use context::{CurrentAuthentication, Principal, SecurityContext};
pub use gateway::{ContextAction, FilterDecision, FilterOutcome, GatewayFilter};
pub use introspection::{
    IntrospectionError, IntrospectorState, MockTokenIntrospector, RemoteTokenIntrospector,
    TokenIntrospector,
};
pub use path_matcher::{PathClass, PathPattern, PublicPaths};
