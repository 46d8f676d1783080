/**
 * Document Change Log
 *
 * Keeps the change batches editors submit through `saveChanges`, in order,
 * per document. New participants receive the log when they authenticate so
 * they start from the same state as everyone else.
 */

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// One saved change
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredChange {
    /// Opaque change record produced by the editor
    pub change: Value,
    /// Editor that submitted it
    pub user_id: String,
    /// When it was saved
    pub saved_at: DateTime<Utc>,
}

/// Per-document ordered change log
#[derive(Debug, Clone, Default)]
pub struct ChangeStore {
    documents: Arc<Mutex<HashMap<i64, Vec<StoredChange>>>>,
}

impl ChangeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<i64, Vec<StoredChange>>> {
        self.documents.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append changes and return the new length of the log
    pub fn append(&self, doc_id: i64, user_id: &str, changes: Vec<Value>) -> usize {
        let saved_at = Utc::now();
        let mut documents = self.lock();
        let log = documents.entry(doc_id).or_default();
        log.extend(changes.into_iter().map(|change| StoredChange {
            change,
            user_id: user_id.to_string(),
            saved_at,
        }));
        log.len()
    }

    /// Drop every change at or after `index`
    pub fn truncate(&self, doc_id: i64, index: usize) {
        if let Some(log) = self.lock().get_mut(&doc_id) {
            log.truncate(index);
        }
    }

    /// Snapshot of the log for a document
    pub fn changes(&self, doc_id: i64) -> Vec<StoredChange> {
        self.lock().get(&doc_id).cloned().unwrap_or_default()
    }

    pub fn len(&self, doc_id: i64) -> usize {
        self.lock().get(&doc_id).map_or(0, Vec::len)
    }
}
