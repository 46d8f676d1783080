//! Authentication Module
//!
//! Token issuing and verification shared by the session-level auth
//! middleware and the editor `auth` command.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! └── sessions.rs     - JWT token management
//! ```
//!
//! # Security
//!
//! - Tokens are HS256 JWTs signed with the configured `jwt_secret`
//! - Tokens expire after 12 hours
//! - Every verification failure is reported as 401 without detail

/// JWT token generation and validation
pub mod sessions;

pub use sessions::{create_token, verify_token, Claims};
