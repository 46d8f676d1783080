//! Backend Module
//!
//! The axum server that sits between the document editing server and file
//! storage. Only compiled with the `ssr` feature.
//!
//! # Architecture
//!
//! - **`server`** - Configuration loading, application state, app creation
//! - **`routes`** - Route configuration and router assembly
//! - **`session`** - Editing sessions and the command entry point
//! - **`command`** - Editor command handlers and their registry
//! - **`document`** - Share tokens, renditions and per-document state
//! - **`auth`** - JWT creation and verification
//! - **`middleware`** - Request authentication
//! - **`error`** - Backend error types and their HTTP rendering
//!
//! # Request Flow
//!
//! ```text
//! client -> auth middleware -> session controller -> { bootstrap | command registry }
//!                           -> document resolver -> storage -> byte stream
//! ```

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Editing sessions
pub mod session;

/// Editor command handlers
pub mod command;

/// Documents and storage collaborators
pub mod document;

/// JWT handling
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// Backend error types
pub mod error;

pub use error::BackendError;
pub use server::create_app;
