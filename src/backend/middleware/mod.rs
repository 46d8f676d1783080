//! Middleware Module
//!
//! HTTP middleware for the gateway.
//!
//! - **`auth`** - Session-level authentication for protected routes

pub mod auth;

pub use auth::{AuthenticatedUser, AuthUser, auth_middleware};
