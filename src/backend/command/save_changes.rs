/**
 * Save Changes Command
 *
 * Persists the change batches the editor submits. A save may span several
 * messages; the first carries `startSaveChanges`, the last
 * `endSaveChanges`. The document save lock is held from the first part to
 * the last so two sessions never interleave their batches.
 *
 * # Request
 *
 * ```json
 * {
 *   "type": "saveChanges",
 *   "changes": "[\"...\", \"...\"]",
 *   "startSaveChanges": true,
 *   "endSaveChanges": true,
 *   "deleteIndex": null
 * }
 * ```
 *
 * `changes` may be a JSON array or a string holding one.
 */

use chrono::Utc;
use serde_json::Value;

use super::handler::CommandHandler;
use crate::backend::document::{ChangeStore, SaveLocks};
use crate::backend::error::BackendError;
use crate::backend::session::SessionContext;
use crate::shared::{CommandRequest, CommandResponse, SharedError};

/// Handles `saveChanges`
pub struct SaveChangesCommand {
    changes: ChangeStore,
    locks: SaveLocks,
}

impl SaveChangesCommand {
    pub fn new(changes: ChangeStore, locks: SaveLocks) -> Self {
        Self { changes, locks }
    }
}

fn parse_changes(request: &CommandRequest) -> Result<Vec<Value>, SharedError> {
    let not_array = || SharedError::invalid_field("changes", "expected a JSON array");
    match request.get("changes") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw)? {
            Value::Array(items) => Ok(items),
            _ => Err(not_array()),
        },
        Some(_) => Err(not_array()),
    }
}

impl CommandHandler for SaveChangesCommand {
    fn name(&self) -> &'static str {
        "saveChanges"
    }

    fn handles(&self, request: &CommandRequest) -> bool {
        request.command_type() == "saveChanges"
    }

    fn mutates(&self) -> bool {
        true
    }

    fn handle(
        &self,
        request: &CommandRequest,
        context: &mut SessionContext,
    ) -> Result<CommandResponse, BackendError> {
        let start = request.flag("startSaveChanges")?;
        let end = request.flag("endSaveChanges")?;
        let delete_index = request.get_index("deleteIndex")?;
        let batch = parse_changes(request)?;

        let editor = context
            .editor()
            .ok_or_else(|| BackendError::unauthorized("Editor is not authenticated"))?;
        let (doc_id, session_id) = (context.doc_id, context.session_id);

        if !self.locks.try_acquire(doc_id, session_id) {
            tracing::info!("[Save] Document {} is being saved by another session", doc_id);
            return Err(BackendError::SaveLocked { doc_id });
        }
        if start {
            tracing::debug!("[Save] Session {} starts saving document {}", session_id, doc_id);
        }

        if let Some(index) = delete_index {
            self.changes.truncate(doc_id, index);
        }
        let submitted = batch.len();
        let index = self.changes.append(doc_id, &editor.user_id, batch);

        tracing::info!(
            "[Save] Stored {} changes for document {} (log length {})",
            submitted,
            doc_id,
            index
        );

        if end {
            self.locks.release(doc_id, session_id);
            Ok(CommandResponse::of_type("unSaveLock")
                .with("index", index)
                .with("syncChangesIndex", index)
                .with("time", Utc::now().timestamp_millis()))
        } else {
            Ok(CommandResponse::of_type("savePartChanges").with("changesIndex", index))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::session::EditorIdentity;
    use assert_matches::assert_matches;
    use serde_json::json;
    use std::time::Duration;
    use uuid::Uuid;

    fn authenticated(user: &str) -> SessionContext {
        let mut context = SessionContext::new(Uuid::new_v4(), 42, user);
        context.authenticate(EditorIdentity {
            user_id: user.to_string(),
            name: None,
            index: 1,
        });
        context
    }

    fn save(changes: Value, start: bool, end: bool) -> CommandRequest {
        CommandRequest::new("saveChanges")
            .with("changes", changes)
            .with("startSaveChanges", start)
            .with("endSaveChanges", end)
    }

    #[test]
    fn test_single_part_save() {
        let (changes, locks) = (ChangeStore::new(), SaveLocks::new());
        let handler = SaveChangesCommand::new(changes.clone(), locks.clone());
        let mut context = authenticated("alice");

        let response = handler
            .handle(&save(json!("[\"a\",\"b\"]"), true, true), &mut context)
            .unwrap();

        assert_eq!(response.response_type(), Some("unSaveLock"));
        assert_eq!(response.get("index"), Some(&json!(2)));
        assert_eq!(response.get("syncChangesIndex"), Some(&json!(2)));
        assert!(response.get("time").is_some());
        assert_eq!(changes.changes(42)[0].user_id, "alice");
        assert_eq!(locks.owner(42), None);
    }

    #[test]
    fn test_multi_part_save_holds_lock() {
        let (changes, locks) = (ChangeStore::new(), SaveLocks::new());
        let handler = SaveChangesCommand::new(changes.clone(), locks.clone());
        let mut alice = authenticated("alice");
        let mut bob = authenticated("bob");

        let part = handler.handle(&save(json!(["a"]), true, false), &mut alice).unwrap();
        assert_eq!(part.into_value(), json!({"type": "savePartChanges", "changesIndex": 1}));
        assert_eq!(locks.owner(42), Some(alice.session_id));

        let blocked = handler.handle(&save(json!(["x"]), true, true), &mut bob);
        assert_matches!(blocked, Err(BackendError::SaveLocked { doc_id: 42 }));

        let done = handler.handle(&save(json!(["b"]), false, true), &mut alice).unwrap();
        assert_eq!(done.get("index"), Some(&json!(2)));
        assert_eq!(changes.len(42), 2);

        assert!(handler.handle(&save(json!(["x"]), true, true), &mut bob).is_ok());
        assert_eq!(changes.len(42), 3);
    }

    #[test]
    fn test_delete_index_truncates_before_append() {
        let (changes, locks) = (ChangeStore::new(), SaveLocks::new());
        changes.append(42, "alice", vec![json!(1), json!(2), json!(3)]);
        let handler = SaveChangesCommand::new(changes.clone(), locks);
        let mut context = authenticated("alice");

        let request = save(json!([4]), true, true).with("deleteIndex", 1);
        let response = handler.handle(&request, &mut context).unwrap();

        assert_eq!(response.get("index"), Some(&json!(2)));
        let stored: Vec<Value> = changes.changes(42).into_iter().map(|c| c.change).collect();
        assert_eq!(stored, vec![json!(1), json!(4)]);
    }

    #[test]
    fn test_malformed_changes_leave_no_lock() {
        let (changes, locks) = (ChangeStore::new(), SaveLocks::new());
        let handler = SaveChangesCommand::new(changes.clone(), locks.clone());
        let mut context = authenticated("alice");

        for bad in [json!("not json"), json!("{\"a\":1}"), json!(5)] {
            let result = handler.handle(&save(bad, true, false), &mut context);
            assert_matches!(result, Err(BackendError::SharedError(_)));
        }
        assert_eq!(locks.owner(42), None);
        assert_eq!(changes.len(42), 0);
    }

    #[test]
    fn test_abandoned_save_does_not_block_forever() {
        let (changes, locks) = (ChangeStore::new(), SaveLocks::with_ttl(Duration::from_millis(50)));
        let handler = SaveChangesCommand::new(changes.clone(), locks.clone());
        let mut alice = authenticated("alice");
        let mut bob = authenticated("bob");

        // alice starts a save and disconnects without the closing part
        handler.handle(&save(json!(["a"]), true, false), &mut alice).unwrap();
        let blocked = handler.handle(&save(json!(["x"]), true, true), &mut bob);
        assert_matches!(blocked, Err(BackendError::SaveLocked { doc_id: 42 }));

        std::thread::sleep(Duration::from_millis(80));

        let done = handler.handle(&save(json!(["x"]), true, true), &mut bob).unwrap();
        assert_eq!(done.response_type(), Some("unSaveLock"));
        assert_eq!(changes.len(42), 2);

        let mut alice_again = authenticated("alice");
        assert!(handler.handle(&save(json!(["b"]), true, true), &mut alice_again).is_ok());
        assert_eq!(locks.owner(42), None);
    }
}
