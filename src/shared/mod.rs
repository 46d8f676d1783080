//! Shared Module
//!
//! This module contains types and data structures that do not depend on the
//! server runtime. They describe the messages exchanged with the editing
//! server and the configuration the gateway runs with.
//!
//! # Overview
//!
//! - `command` - editor command requests and responses
//! - `license` - the license payload sent when a session starts
//! - `error` - validation errors raised while reading payloads
//! - `config` - gateway configuration and its builder

/// Editor command messages
pub mod command;

/// License payload returned at session bootstrap
pub mod license;

/// Shared error types
pub mod error;

/// Gateway configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use command::{CommandRequest, CommandResponse};
pub use license::{CapabilityPayload, License, INITIAL_RESPONSE};
pub use error::SharedError;
pub use config::{GatewayConfig, GatewayConfigBuilder, ConfigError};
