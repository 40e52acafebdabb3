//! Middleware for Web API.

pub mod auth;
pub mod cors;

pub use auth::{jwt_auth, AuthUser, JwtClaims, JwtState, AUTH_TOKEN_HEADER};
pub use cors::create_cors_layer;
