//! Route Configuration Module
//!
//! # Routes
//!
//! - `GET /healthcheck` - liveness check, public
//! - `GET /doc/{doc_id}/open` - stream a document rendition
//! - `POST /doc/{doc_id}/session` - mint an editing session
//! - `POST /doc/{doc_id}/session/{session_id}` - command entry point
//!
//! Every route except the health check sits behind the auth middleware.

/// Main router creation
pub mod router;

pub use router::create_router;
