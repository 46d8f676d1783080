/**
 * Application State Management
 *
 * `AppState` is the single state value the router carries. Handlers
 * extract the whole state or, through the `FromRef` implementations, only
 * the part they need.
 *
 * # Thread Safety
 *
 * Everything in here is cheap to clone and safe to share:
 * - the configuration is immutable behind an `Arc`
 * - the session controller keeps its sessions behind `tokio::sync` locks
 * - the document resolver holds `Arc<dyn ...>` collaborators
 *
 * # Example
 *
 * ```rust,ignore
 * use axum::extract::State;
 * use xfdocs::backend::session::SessionController;
 *
 * async fn handler(State(controller): State<SessionController>) {
 *     let sessions = controller.sessions();
 *     // ...
 * }
 * ```
 */

use axum::extract::FromRef;
use std::sync::Arc;

use crate::backend::command::{CommandRegistry, Participants};
use crate::backend::document::{
    ChangeStore, DocumentResolver, DocumentStore, FileResolver, SaveLocks,
};
use crate::backend::session::{SessionController, SessionRegistry};
use crate::shared::GatewayConfig;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Validated gateway configuration
    pub config: Arc<GatewayConfig>,

    /// Editing sessions and the command chain they dispatch through
    pub sessions: SessionController,

    /// Share token → rendition pipeline
    pub documents: DocumentResolver,
}

impl AppState {
    /// Assemble the state around the given storage collaborators
    ///
    /// The command chain and the per-document change log and save locks
    /// are created here and shared by every session.
    pub fn new(
        config: GatewayConfig,
        files: Arc<dyn FileResolver>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        let commands = CommandRegistry::standard(
            config.jwt_secret.clone(),
            ChangeStore::new(),
            SaveLocks::with_ttl(config.save_lock_ttl),
            Participants::new(),
        );
        tracing::debug!("Command chain: {:?}", commands.handler_names());

        Self {
            config: Arc::new(config),
            sessions: SessionController::new(SessionRegistry::new(), Arc::new(commands)),
            documents: DocumentResolver::new(files, store),
        }
    }
}

impl FromRef<AppState> for SessionController {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for DocumentResolver {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.documents.clone()
    }
}

impl FromRef<AppState> for Arc<GatewayConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}
