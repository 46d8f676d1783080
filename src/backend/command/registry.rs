//! Ordered command dispatch.
//!
//! Handlers are tried in registration order and the first one that claims
//! a request answers it. Registration order is part of the protocol: the
//! standard chain puts `auth` first so an editor can always authenticate
//! before anything else is considered.

use tracing::debug;

use super::auth::{AuthCommand, Participants};
use super::handler::CommandHandler;
use super::save_changes::SaveChangesCommand;
use super::save_lock::IsSaveLock;
use crate::backend::document::{ChangeStore, SaveLocks};
use crate::backend::error::BackendError;
use crate::backend::session::SessionContext;
use crate::shared::{CommandRequest, CommandResponse};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Fixed, ordered list of command handlers.
///
/// Immutable after construction, so it is shared between requests without
/// locking.
pub struct CommandRegistry {
    handlers: Vec<Box<dyn CommandHandler>>,
}

impl CommandRegistry {
    /// Creates a registry probing `handlers` in the given order.
    pub fn new(handlers: Vec<Box<dyn CommandHandler>>) -> Self {
        Self { handlers }
    }

    /// The gateway's handler chain: `auth`, `isSaveLock`, `saveChanges`.
    pub fn standard(
        jwt_secret: impl Into<String>,
        changes: ChangeStore,
        locks: SaveLocks,
        participants: Participants,
    ) -> Self {
        Self::new(vec![
            Box::new(AuthCommand::new(jwt_secret, changes.clone(), participants)),
            Box::new(IsSaveLock::new(locks.clone())),
            Box::new(SaveChangesCommand::new(changes, locks)),
        ])
    }

    /// Handler names in dispatch order.
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Resolves `request` to exactly one handler and returns its answer.
    ///
    /// # Errors
    ///
    /// - `UnrecognizedCommand` if no handler claims the request
    /// - `Unauthorized` if the claiming handler mutates state and the
    ///   session's editor has not authenticated
    /// - whatever the selected handler returns
    pub fn dispatch(
        &self,
        request: &CommandRequest,
        context: &mut SessionContext,
    ) -> Result<CommandResponse, BackendError> {
        let handler = self
            .handlers
            .iter()
            .find(|handler| handler.handles(request))
            .ok_or_else(|| {
                debug!(
                    target: DISPATCH_TARGET,
                    command = request.command_type(),
                    "no handler claimed command"
                );
                BackendError::unrecognized_command(request.command_type())
            })?;

        if handler.mutates() && !context.is_authenticated() {
            tracing::warn!(
                target: DISPATCH_TARGET,
                command = request.command_type(),
                session = %context.session_id,
                "mutating command before editor auth"
            );
            return Err(BackendError::unauthorized("Editor is not authenticated"));
        }

        debug!(
            target: DISPATCH_TARGET,
            command = request.command_type(),
            handler = handler.name(),
            session = %context.session_id,
            "dispatching command"
        );
        handler.handle(request, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::session::EditorIdentity;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use uuid::Uuid;

    /// Claims one command type and reports its own name
    struct StubHandler {
        name: &'static str,
        claims: &'static str,
        mutates: bool,
        calls: Arc<AtomicUsize>,
    }

    impl StubHandler {
        fn boxed(
            name: &'static str,
            claims: &'static str,
            calls: &Arc<AtomicUsize>,
        ) -> Box<dyn CommandHandler> {
            Box::new(Self {
                name,
                claims,
                mutates: false,
                calls: calls.clone(),
            })
        }
    }

    impl CommandHandler for StubHandler {
        fn name(&self) -> &'static str {
            self.name
        }

        fn handles(&self, request: &CommandRequest) -> bool {
            request.command_type() == self.claims
        }

        fn mutates(&self) -> bool {
            self.mutates
        }

        fn handle(
            &self,
            _request: &CommandRequest,
            _context: &mut SessionContext,
        ) -> Result<CommandResponse, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(CommandResponse::of_type("stub").with("handledBy", self.name))
        }
    }

    fn context() -> SessionContext {
        SessionContext::new(Uuid::new_v4(), 42, "alice")
    }

    #[test]
    fn first_match_wins() {
        let calls = Arc::new(AtomicUsize::new(0));
        let request = CommandRequest::new("shared");

        let forward = CommandRegistry::new(vec![
            StubHandler::boxed("first", "shared", &calls),
            StubHandler::boxed("second", "shared", &calls),
        ]);
        let response = forward.dispatch(&request, &mut context()).unwrap();
        assert_eq!(response.get("handledBy").unwrap(), "first");

        let reversed = CommandRegistry::new(vec![
            StubHandler::boxed("second", "shared", &calls),
            StubHandler::boxed("first", "shared", &calls),
        ]);
        let response = reversed.dispatch(&request, &mut context()).unwrap();
        assert_eq!(response.get("handledBy").unwrap(), "second");

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn later_handler_answers_its_own_type() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = CommandRegistry::new(vec![
            StubHandler::boxed("alpha", "a", &calls),
            StubHandler::boxed("beta", "b", &calls),
        ]);

        let response = registry
            .dispatch(&CommandRequest::new("b"), &mut context())
            .unwrap();
        assert_eq!(response.get("handledBy").unwrap(), "beta");
    }

    #[test]
    fn unmatched_command_fails_without_side_effects() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = CommandRegistry::new(vec![
            StubHandler::boxed("alpha", "a", &calls),
            StubHandler::boxed("beta", "b", &calls),
        ]);

        let result = registry.dispatch(&CommandRequest::new("cursor"), &mut context());
        match result {
            Err(BackendError::UnrecognizedCommand { command_type }) => {
                assert_eq!(command_type, "cursor");
            }
            other => panic!("Expected UnrecognizedCommand, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_registry_recognizes_nothing() {
        let registry = CommandRegistry::new(Vec::new());
        let result = registry.dispatch(&CommandRequest::new("auth"), &mut context());
        assert!(matches!(result, Err(BackendError::UnrecognizedCommand { .. })));
    }

    #[test]
    fn mutating_handler_requires_authenticated_editor() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = CommandRegistry::new(vec![Box::new(StubHandler {
            name: "writer",
            claims: "write",
            mutates: true,
            calls: calls.clone(),
        })]);
        let request = CommandRequest::new("write");
        let mut context = context();

        let result = registry.dispatch(&request, &mut context);
        assert!(matches!(result, Err(BackendError::Unauthorized { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        context.authenticate(EditorIdentity {
            user_id: "alice".to_string(),
            name: None,
            index: 1,
        });
        assert!(registry.dispatch(&request, &mut context).is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn standard_chain_order() {
        let registry = CommandRegistry::standard(
            "secret",
            ChangeStore::new(),
            SaveLocks::new(),
            Participants::new(),
        );
        assert_eq!(
            registry.handler_names(),
            vec!["auth", "isSaveLock", "saveChanges"]
        );
    }
}
