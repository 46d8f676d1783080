//! The contract every editor command handler implements.

use crate::backend::error::BackendError;
use crate::backend::session::SessionContext;
use crate::shared::{CommandRequest, CommandResponse};

/// A unit of protocol logic that claims and answers one kind of command.
///
/// Handlers are built once at startup and shared by every session; any
/// mutable state they touch belongs to a collaborator that guards it.
pub trait CommandHandler: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Whether this handler answers `request`.
    ///
    /// Must be a pure function of the request.
    fn handles(&self, request: &CommandRequest) -> bool;

    /// Whether the handler changes document state.
    ///
    /// Mutating handlers only run for sessions whose editor has passed the
    /// `auth` command.
    fn mutates(&self) -> bool {
        false
    }

    /// Answer the request
    fn handle(
        &self,
        request: &CommandRequest,
        context: &mut SessionContext,
    ) -> Result<CommandResponse, BackendError>;
}
