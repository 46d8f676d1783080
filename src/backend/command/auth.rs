/**
 * Auth Command
 *
 * The editor's first real command on a session. It carries a JWT for the
 * editing user; once verified, the session may run state-changing
 * commands.
 *
 * # Request
 *
 * ```json
 * {"type": "auth", "docid": "42", "token": "<jwt>"}
 * ```
 *
 * # Response
 *
 * ```json
 * {
 *   "type": "auth",
 *   "result": 1,
 *   "sessionId": "...",
 *   "participants": [{"id": "alice", "username": "Alice", "indexUser": 1, "connectionId": "..."}],
 *   "locks": [],
 *   "changes": [],
 *   "changesIndex": 0,
 *   "indexUser": 1,
 *   "buildVersion": "5.3.2",
 *   "buildNumber": 20,
 *   "licenseType": 3
 * }
 * ```
 */

use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::handler::CommandHandler;
use crate::backend::auth::verify_token;
use crate::backend::document::ChangeStore;
use crate::backend::error::BackendError;
use crate::backend::session::{EditorIdentity, SessionContext};
use crate::shared::license::{BUILD_NUMBER, BUILD_VERSION, LICENSE_TYPE};
use crate::shared::{CommandRequest, CommandResponse, SharedError};

/// An authenticated editor on a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    pub username: String,
    pub index_user: usize,
    pub connection_id: Uuid,
}

/// Editors that have authenticated, per document
///
/// One entry per user. A user's index is assigned on first auth and kept
/// when they come back on a new session, which replaces their connection.
#[derive(Debug, Clone, Default)]
pub struct Participants {
    documents: Arc<Mutex<HashMap<i64, Vec<Participant>>>>,
}

impl Participants {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `session_id` for the document and return the user's index
    pub fn join(&self, doc_id: i64, session_id: Uuid, user_id: &str, username: &str) -> usize {
        let mut documents = self.documents.lock().unwrap_or_else(|e| e.into_inner());
        let list = documents.entry(doc_id).or_default();

        if let Some(existing) = list.iter_mut().find(|p| p.id == user_id) {
            if existing.connection_id != session_id {
                tracing::debug!(
                    "[Auth] Editor {} on document {} moved to session {}",
                    existing.index_user,
                    doc_id,
                    session_id
                );
            }
            existing.connection_id = session_id;
            existing.username = username.to_string();
            return existing.index_user;
        }

        let index_user = list.iter().map(|p| p.index_user).max().unwrap_or(0) + 1;
        list.push(Participant {
            id: user_id.to_string(),
            username: username.to_string(),
            index_user,
            connection_id: session_id,
        });
        index_user
    }

    pub fn list(&self, doc_id: i64) -> Vec<Participant> {
        self.documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&doc_id)
            .cloned()
            .unwrap_or_default()
    }
}

/// Handles `auth`
pub struct AuthCommand {
    jwt_secret: String,
    changes: ChangeStore,
    participants: Participants,
}

impl AuthCommand {
    pub fn new(
        jwt_secret: impl Into<String>,
        changes: ChangeStore,
        participants: Participants,
    ) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            changes,
            participants,
        }
    }
}

impl CommandHandler for AuthCommand {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn handles(&self, request: &CommandRequest) -> bool {
        request.command_type() == "auth"
    }

    fn handle(
        &self,
        request: &CommandRequest,
        context: &mut SessionContext,
    ) -> Result<CommandResponse, BackendError> {
        let token = request
            .get_str("token")?
            .ok_or_else(|| BackendError::unauthorized("Missing editor token"))?;

        let claims = verify_token(&self.jwt_secret, &token).map_err(|e| {
            tracing::warn!(
                "[Auth] Editor token rejected on session {}: {:?}",
                context.session_id,
                e
            );
            BackendError::unauthorized("Invalid editor token")
        })?;

        if let Some(docid) = request.get_str("docid")? {
            if docid != context.doc_id.to_string() {
                return Err(SharedError::DocumentMismatch {
                    requested: docid,
                    session: context.doc_id,
                }
                .into());
            }
        }

        let username = claims.name.clone().unwrap_or_else(|| claims.sub.clone());
        let index = self
            .participants
            .join(context.doc_id, context.session_id, &claims.sub, &username);
        context.authenticate(EditorIdentity {
            user_id: claims.sub,
            name: claims.name,
            index,
        });

        let changes: Vec<Value> = self
            .changes
            .changes(context.doc_id)
            .into_iter()
            .map(|saved| {
                json!({
                    "docid": context.doc_id.to_string(),
                    "change": saved.change,
                    "user": saved.user_id,
                    "time": saved.saved_at.timestamp_millis(),
                })
            })
            .collect();

        tracing::info!(
            "[Auth] Session {} authenticated as editor {} on document {}",
            context.session_id,
            index,
            context.doc_id
        );

        Ok(CommandResponse::of_type("auth")
            .with("result", 1)
            .with("sessionId", context.session_id.to_string())
            .with("participants", serde_json::to_value(self.participants.list(context.doc_id))?)
            .with("locks", Value::Array(Vec::new()))
            .with("changesIndex", changes.len())
            .with("changes", changes)
            .with("indexUser", index)
            .with("buildVersion", BUILD_VERSION)
            .with("buildNumber", BUILD_NUMBER)
            .with("licenseType", LICENSE_TYPE))
    }
}
