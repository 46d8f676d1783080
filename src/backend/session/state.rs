/**
 * Session State
 *
 * One editing session per identifier, minted by the gateway when an editor
 * connects to a document. Each session walks a fixed sequence of phases:
 *
 * ```text
 * Uninitialized --(license payload sent)--> Bootstrapped --(command handled)--> Active
 * ```
 *
 * There is no terminal phase. Sessions live as long as the process.
 *
 * # Thread Safety
 *
 * The registry map sits behind a `tokio::sync::RwLock`; each session has its
 * own `Mutex`, so commands on one session are serialised while different
 * sessions proceed in parallel.
 */

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Minted, nothing sent yet
    Uninitialized,
    /// License payload sent, waiting for the first command
    Bootstrapped,
    /// At least one command handled
    Active,
}

/// The editing user a session authenticated as through the `auth` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorIdentity {
    pub user_id: String,
    pub name: Option<String>,
    /// Position of the user among the document's editors, from 1
    pub index: usize,
}

/// Per-session values handed to every command handler
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: Uuid,
    pub doc_id: i64,
    owner: String,
    editor: Option<EditorIdentity>,
}

impl SessionContext {
    pub fn new(session_id: Uuid, doc_id: i64, owner: impl Into<String>) -> Self {
        Self {
            session_id,
            doc_id,
            owner: owner.into(),
            editor: None,
        }
    }

    /// Caller that minted the session
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn is_authenticated(&self) -> bool {
        self.editor.is_some()
    }

    /// Record the editor verified by the `auth` command
    pub fn authenticate(&mut self, editor: EditorIdentity) {
        self.editor = Some(editor);
    }

    pub fn editor(&self) -> Option<&EditorIdentity> {
        self.editor.as_ref()
    }
}

/// A session and its phase
#[derive(Debug)]
pub struct Session {
    phase: SessionPhase,
    pub context: SessionContext,
}

impl Session {
    pub fn new(context: SessionContext) -> Self {
        Self {
            phase: SessionPhase::Uninitialized,
            context,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Mark the license payload as sent
    pub fn mark_bootstrapped(&mut self) {
        if self.phase == SessionPhase::Uninitialized {
            self.phase = SessionPhase::Bootstrapped;
        }
    }

    /// Mark a command as handled
    pub fn mark_active(&mut self) {
        if self.phase == SessionPhase::Bootstrapped {
            self.phase = SessionPhase::Active;
        }
    }
}

/// Shared handle to one session
pub type SharedSession = Arc<Mutex<Session>>;

/// All sessions known to the process
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a new session for `doc_id` owned by `owner`
    pub async fn open(&self, doc_id: i64, owner: &str) -> Uuid {
        let session_id = Uuid::new_v4();
        let session = Session::new(SessionContext::new(session_id, doc_id, owner));
        self.sessions
            .write()
            .await
            .insert(session_id, Arc::new(Mutex::new(session)));
        session_id
    }

    pub async fn get(&self, session_id: &Uuid) -> Option<SharedSession> {
        self.sessions.read().await.get(session_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
