/**
 * Session Controller
 *
 * Drives the generic command entry point. What a call means depends on the
 * phase of the session it targets:
 *
 * - `Uninitialized`: the body is ignored and the license payload is returned
 * - `Bootstrapped` / `Active`: the body is a command and goes through the
 *   command registry
 *
 * A session only answers the caller that minted it, and only under the
 * document it was minted for.
 */

use axum::http::StatusCode;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::bootstrap::initial_session_payload;
use super::state::{SessionPhase, SessionRegistry};
use crate::backend::command::CommandRegistry;
use crate::backend::error::BackendError;
use crate::shared::{CapabilityPayload, CommandRequest, CommandResponse, SharedError};

/// Body returned by the command entry point
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SessionReply {
    /// First contact on a session
    Bootstrap(&'static CapabilityPayload),
    /// Answer of the handler that claimed the command
    Command(CommandResponse),
}

/// Owns the sessions and the command chain they dispatch through
#[derive(Clone)]
pub struct SessionController {
    sessions: SessionRegistry,
    commands: Arc<CommandRegistry>,
}

impl SessionController {
    pub fn new(sessions: SessionRegistry, commands: Arc<CommandRegistry>) -> Self {
        Self { sessions, commands }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Mint a session for `caller` on `doc_id`
    pub async fn open_session(&self, doc_id: i64, caller: &str) -> Uuid {
        let session_id = self.sessions.open(doc_id, caller).await;
        tracing::info!("[Session] {} opened session {} on document {}", caller, session_id, doc_id);
        session_id
    }

    /// Handle one call on the command entry point
    ///
    /// # Errors
    ///
    /// - 404 if the session is unknown or belongs to another document
    /// - `Unauthorized` if the session belongs to another caller
    /// - `SharedError` if a command body is not a JSON command
    /// - whatever the command registry returns
    pub async fn handle(
        &self,
        doc_id: i64,
        session_id: Uuid,
        caller: &str,
        body: &[u8],
    ) -> Result<SessionReply, BackendError> {
        let unknown = || BackendError::handler(StatusCode::NOT_FOUND, "Unknown session");

        let shared = self.sessions.get(&session_id).await.ok_or_else(unknown)?;
        let mut session = shared.lock().await;

        if session.context.owner() != caller {
            tracing::warn!(
                "[Session] {} used session {} owned by another caller",
                caller,
                session_id
            );
            return Err(BackendError::unauthorized("Session belongs to another caller"));
        }
        if session.context.doc_id != doc_id {
            return Err(unknown());
        }

        if session.phase() == SessionPhase::Uninitialized {
            session.mark_bootstrapped();
            tracing::info!("[Session] Sent license payload on session {}", session_id);
            return Ok(SessionReply::Bootstrap(initial_session_payload()));
        }

        let request: CommandRequest = serde_json::from_slice(body).map_err(SharedError::from)?;
        let response = self.commands.dispatch(&request, &mut session.context)?;
        session.mark_active();

        Ok(SessionReply::Command(response))
    }
}
