//! XFDocs - Document Editing Gateway
//!
//! XFDocs sits between an office-document editing server and a file-storage
//! backend. It authenticates editing sessions, answers the editor's license
//! query at session start, streams source documents to the editor and
//! dispatches the XHR commands the editor sends back (auth confirmation,
//! save-lock status, change persistence).
//!
//! # Module Structure
//!
//! - **`shared`** - Platform-agnostic types
//!   - Command request/response messages
//!   - The license (capability) payload
//!   - Gateway configuration and shared error types
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP server, routing and auth middleware
//!   - Command registry and the editor command handlers
//!   - Session state machine and bootstrap
//!   - Document resolution, rendition caching and streaming
//!
//! # Feature Flags
//!
//! - **`ssr`** - Server build (enabled by default)
//!
//! # Usage
//!
//! ```rust,no_run
//! use xfdocs::backend::server::init::create_app;
//! use xfdocs::shared::GatewayConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GatewayConfig::builder()
//!     .storage_root("/srv/files".into())
//!     .cache_dir("/var/cache/xfdocs".into())
//!     .jwt_secret("change-me".to_string())
//!     .build()?;
//! let app = create_app(config).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! - The command registry is immutable after startup and shared by `Arc`
//! - Each session is guarded by its own `tokio::sync::Mutex`
//! - Save locks and change logs guard their own state
//!
//! # Error Handling
//!
//! - `shared::error::SharedError` for payload validation
//! - `backend::error::BackendError` for everything that reaches HTTP

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
