//! Editing sessions
//!
//! - `state` - session phases, per-session context and the registry
//! - `bootstrap` - the license payload sent on first contact
//! - `controller` - the command entry point state machine
//! - `handlers` - axum handlers for the session routes

pub mod bootstrap;
pub mod controller;
pub mod handlers;
pub mod state;

pub use bootstrap::initial_session_payload;
pub use controller::{SessionController, SessionReply};
pub use state::{
    EditorIdentity, Session, SessionContext, SessionPhase, SessionRegistry, SharedSession,
};
