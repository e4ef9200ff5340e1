//! # Actix Middleware Library
//!
//! Shared middleware components for Nova Actix services
//!
//! ## Modules
//! - `jwt_auth`: bearer token resolution and the `UserId` extractor
//! - `correlation_id`: request correlation IDs

pub mod correlation_id;
pub mod jwt_auth;

pub use correlation_id::{CorrelationId, CorrelationIdMiddleware, CORRELATION_ID_HEADER};
pub use jwt_auth::{AuthError, Claims, JwtAuthMiddleware, JwtVerifier, TokenVerifier, UserId};
