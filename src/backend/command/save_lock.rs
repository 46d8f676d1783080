//! `isSaveLock`: tells the editor whether someone else is saving.

use super::handler::CommandHandler;
use crate::backend::document::SaveLocks;
use crate::backend::error::BackendError;
use crate::backend::session::SessionContext;
use crate::shared::{CommandRequest, CommandResponse};

/// Handles `isSaveLock`. Read-only.
pub struct IsSaveLock {
    locks: SaveLocks,
}

impl IsSaveLock {
    pub fn new(locks: SaveLocks) -> Self {
        Self { locks }
    }
}

impl CommandHandler for IsSaveLock {
    fn name(&self) -> &'static str {
        "isSaveLock"
    }

    fn handles(&self, request: &CommandRequest) -> bool {
        request.command_type() == "isSaveLock"
    }

    fn handle(
        &self,
        _request: &CommandRequest,
        context: &mut SessionContext,
    ) -> Result<CommandResponse, BackendError> {
        let locked = self
            .locks
            .is_locked_by_other(context.doc_id, context.session_id);
        Ok(CommandResponse::of_type("saveLock").with("saveLock", locked))
    }
}
