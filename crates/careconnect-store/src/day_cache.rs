//! Single-slot cache of the last resolved bundle, valid for one calendar day.
//!
//! The day is read from the clock on every lookup, not pinned at write time.
//! An entry written yesterday is a miss today and is removed on that lookup.
//! Anything unreadable in the slot is treated the same way, and so is a
//! bundle with any field the reference dataset would have to fill.

use std::sync::Arc;

use careconnect_core::{Clock, ContentBundle, Profile, reference_dataset};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{BundleSource, CACHE_KEY, KvStore, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Calendar day the entry was written, `YYYY-MM-DD`.
    pub date: String,
    pub bundle: ContentBundle,
    pub profile_snapshot: Profile,
    /// How the bundle was produced: [`BundleSource::Live`] or
    /// [`BundleSource::Fallback`].
    #[serde(default = "live")]
    pub source: BundleSource,
    /// ISO 8601 timestamp string.
    pub written_at: String,
}

fn live() -> BundleSource {
    BundleSource::Live
}

impl CacheEntry {
    /// Source to report when this entry is served: a cached fallback is
    /// still demo content.
    pub fn served_as(&self) -> BundleSource {
        match self.source {
            BundleSource::Fallback => BundleSource::Fallback,
            _ => BundleSource::Cache,
        }
    }
}

pub struct DayCache {
    kv: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
}

impl DayCache {
    pub fn new(kv: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
        Self { kv, clock }
    }

    /// Store a live `bundle` for today, replacing whatever was there.
    pub fn set(&self, bundle: &ContentBundle, profile: &Profile) -> Result<(), StoreError> {
        self.set_with_source(bundle, profile, BundleSource::Live)
    }

    /// Store `bundle` for today, recording how it was produced.
    pub fn set_with_source(
        &self,
        bundle: &ContentBundle,
        profile: &Profile,
        source: BundleSource,
    ) -> Result<(), StoreError> {
        let entry = CacheEntry {
            date: self.clock.today_string(),
            bundle: bundle.clone(),
            profile_snapshot: profile.clone(),
            source,
            written_at: self.clock.now().to_rfc3339(),
        };
        let json = serde_json::to_string(&entry)?;
        self.kv.put(CACHE_KEY, &json)?;
        info!(date = %entry.date, source = ?source, "cached bundle for today");
        Ok(())
    }

    /// Today's bundle, or `None` on a miss.
    ///
    /// Never fails: storage errors, corrupt or incomplete entries and entries
    /// from another day are all misses, and all but the first are dropped.
    pub fn get(&self) -> Option<ContentBundle> {
        self.entry().map(|entry| entry.bundle)
    }

    /// Today's full entry, with the same miss semantics as [`get`](Self::get).
    pub fn entry(&self) -> Option<CacheEntry> {
        let raw = match self.kv.get(CACHE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("day cache empty");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "day cache unreadable, treating as miss");
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "day cache entry corrupt, dropping");
                self.discard();
                return None;
            }
        };

        let today = self.clock.today_string();
        if entry.date != today {
            info!(cached = %entry.date, today = %today, "day cache entry stale, dropping");
            self.discard();
            return None;
        }

        let missing = entry.bundle.missing_fields(reference_dataset());
        if !missing.is_empty() {
            warn!(count = missing.len(), fields = ?missing, "day cache entry incomplete, dropping");
            self.discard();
            return None;
        }

        debug!(date = %entry.date, written_at = %entry.written_at, "day cache hit");
        Some(entry)
    }

    /// Remove the cached entry. Other keys in the same store are untouched.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.kv.remove(CACHE_KEY)?;
        info!("day cache cleared");
        Ok(())
    }

    fn discard(&self) {
        if let Err(e) = self.kv.remove(CACHE_KEY) {
            warn!(error = %e, "failed to drop day cache entry");
        }
    }
}
