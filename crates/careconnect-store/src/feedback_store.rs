//! Persisted like/dislike log.

use std::sync::Arc;

use careconnect_core::{Category, Clock, FeedbackEntry, FeedbackKind, FeedbackLog};
use tracing::{info, warn};

use crate::{FEEDBACK_KEY, KvStore, StoreError};

pub struct FeedbackStore {
    kv: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
}

impl FeedbackStore {
    pub fn new(kv: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
        Self { kv, clock }
    }

    /// Append one entry, stamped with the current time.
    ///
    /// Fails without writing when the existing log cannot be read, so a
    /// storage hiccup never replaces the history. A log that reads but does
    /// not parse is unrecoverable and is started over.
    pub fn record(
        &self,
        kind: FeedbackKind,
        item: &str,
        category: Category,
    ) -> Result<FeedbackEntry, StoreError> {
        let entry = FeedbackEntry {
            kind,
            item: item.trim().to_string(),
            category,
            timestamp: self.clock.now().to_rfc3339(),
        };
        let mut log = self.read()?;
        log.record(entry.clone());
        self.kv.put(FEEDBACK_KEY, &serde_json::to_string(&log)?)?;
        info!(kind = ?kind, category = %category, item = %entry.item, "feedback recorded");
        Ok(entry)
    }

    /// The stored log. Missing, unreadable or corrupt data yields an empty log.
    pub fn load(&self) -> FeedbackLog {
        self.read().unwrap_or_else(|e| {
            warn!(error = %e, "feedback log unreadable");
            FeedbackLog::default()
        })
    }

    fn read(&self) -> Result<FeedbackLog, StoreError> {
        let Some(raw) = self.kv.get(FEEDBACK_KEY)? else {
            return Ok(FeedbackLog::default());
        };
        Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "feedback log corrupt, starting empty");
            FeedbackLog::default()
        }))
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.kv.remove(FEEDBACK_KEY)?;
        info!("feedback log cleared");
        Ok(())
    }
}
