pub mod auth;
pub mod metrics;

pub use auth::{auth_middleware, AuthScheme, AuthSession, AuthUser};
pub use metrics::metrics_middleware;
