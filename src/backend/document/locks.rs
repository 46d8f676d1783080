/**
 * Save Locks
 *
 * At most one session at a time may be saving a document. The lock is
 * taken when a session starts a save and released when it finishes.
 *
 * An editor that disconnects mid-save never sends the closing part, so a
 * lock also lapses once it has gone `ttl` without being renewed. Every save
 * part from the owner renews it.
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::shared::config::DEFAULT_SAVE_LOCK_TTL_SECS;

/// Default time a save lock survives without a new save part
pub const DEFAULT_SAVE_LOCK_TTL: Duration = Duration::from_secs(DEFAULT_SAVE_LOCK_TTL_SECS);

#[derive(Debug, Clone, Copy)]
struct Holder {
    session_id: Uuid,
    renewed_at: Instant,
}

/// Per-document save lock owners
#[derive(Debug, Clone)]
pub struct SaveLocks {
    owners: Arc<Mutex<HashMap<i64, Holder>>>,
    ttl: Duration,
}

impl Default for SaveLocks {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SAVE_LOCK_TTL)
    }
}

impl SaveLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            owners: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<i64, Holder>> {
        self.owners.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Live holder of the document lock
    fn holder(&self, owners: &HashMap<i64, Holder>, doc_id: i64) -> Option<Uuid> {
        owners
            .get(&doc_id)
            .filter(|holder| holder.renewed_at.elapsed() < self.ttl)
            .map(|holder| holder.session_id)
    }

    /// Whether a session other than `session_id` holds the document lock
    pub fn is_locked_by_other(&self, doc_id: i64, session_id: Uuid) -> bool {
        let owners = self.lock();
        self.holder(&owners, doc_id)
            .is_some_and(|owner| owner != session_id)
    }

    /// Take or renew the lock, succeeding if it is free, lapsed or already ours
    pub fn try_acquire(&self, doc_id: i64, session_id: Uuid) -> bool {
        let mut owners = self.lock();
        match self.holder(&owners, doc_id) {
            Some(owner) if owner != session_id => false,
            current => {
                if current.is_none() {
                    if let Some(lapsed) = owners.get(&doc_id) {
                        tracing::info!(
                            "[Save] Lock on document {} held by session {} lapsed",
                            doc_id,
                            lapsed.session_id
                        );
                    }
                }
                owners.insert(
                    doc_id,
                    Holder {
                        session_id,
                        renewed_at: Instant::now(),
                    },
                );
                true
            }
        }
    }

    /// Release the lock if `session_id` holds it
    pub fn release(&self, doc_id: i64, session_id: Uuid) -> bool {
        let mut owners = self.lock();
        if owners.get(&doc_id).map(|holder| holder.session_id) == Some(session_id) {
            owners.remove(&doc_id);
            true
        } else {
            false
        }
    }

    pub fn owner(&self, doc_id: i64) -> Option<Uuid> {
        let owners = self.lock();
        self.holder(&owners, doc_id)
    }
}
