// ABOUTME: HTTP middleware for cross-origin access control and authorization
// ABOUTME: CORS headers on every response; API-key gate binding request credentials

pub mod auth;
pub mod cors;

// Authorization gate and the credential it binds
pub use auth::{auth_middleware, AuthGate, Credential, PostAuthCheck};

// CORS policy and its outermost layer
pub use cors::{cors_middleware, CorsPolicy};
