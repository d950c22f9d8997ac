//! The dashboard load flow: day cache first, then one fetch, then
//! resolution against the reference dataset.
//!
//! A load always publishes a complete bundle. Fetch failures are logged and
//! reported in the [`LoadOutcome`], never returned as errors.

use std::sync::Arc;

use careconnect_core::{Backfill, Clock, ContentBundle, anonymize, reference_dataset, resolve_bundle};
use careconnect_store::{
    BundleSource, ContentStore, DayCache, FeedbackStore, KvStore, ProfileStore,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::fetcher::{Connectivity, ContentFetcher, FetchFailure};
use crate::session::new_session_id;
use crate::transport::Transport;

/// What one load did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadOutcome {
    pub bundle: ContentBundle,
    pub source: BundleSource,
    /// Set when the fetch was attempted and failed.
    pub failure: Option<FetchFailure>,
    /// Sections of a live response that were filled from the reference.
    pub backfilled: Vec<Backfill>,
    /// Session id sent with the fetch; `None` on a cache hit. A cached
    /// fallback is reported as [`BundleSource::Fallback`] with no session id.
    pub session_id: Option<String>,
}

pub struct DashboardLoader<T> {
    fetcher: ContentFetcher<T>,
    cache: DayCache,
    profiles: ProfileStore,
    feedback: FeedbackStore,
    store: ContentStore,
    clock: Arc<dyn Clock>,
}

impl<T: Transport> DashboardLoader<T> {
    pub fn new(
        fetcher: ContentFetcher<T>,
        kv: Arc<dyn KvStore>,
        store: ContentStore,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            fetcher,
            cache: DayCache::new(kv.clone(), clock.clone()),
            profiles: ProfileStore::new(kv.clone()),
            feedback: FeedbackStore::new(kv, clock.clone()),
            store,
            clock,
        }
    }

    pub fn fetcher(&self) -> &ContentFetcher<T> {
        &self.fetcher
    }

    pub fn cache(&self) -> &DayCache {
        &self.cache
    }

    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    pub fn feedback(&self) -> &FeedbackStore {
        &self.feedback
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Publish today's bundle, fetching only when the day cache misses.
    pub async fn load(&self) -> LoadOutcome {
        if let Some(entry) = self.cache.entry() {
            let source = entry.served_as();
            info!(source = ?source, "serving dashboard from day cache");
            self.store.publish(entry.bundle.clone(), source);
            return LoadOutcome {
                bundle: entry.bundle,
                source,
                failure: None,
                backfilled: Vec::new(),
                session_id: None,
            };
        }

        let profile = self.profiles.load_or_default();
        let anonymized = anonymize(&profile, self.clock.current_year());
        let feedback = self.feedback.load().summary();
        let session_id = new_session_id(self.clock.now());

        let (resolution, source, failure) =
            match self.fetcher.fetch(&anonymized, &feedback, &session_id).await {
                Ok(live) => (
                    resolve_bundle(Some(&live), reference_dataset()),
                    BundleSource::Live,
                    None,
                ),
                Err(e) => {
                    warn!(reason = e.reason(), error = %e, "fetch failed, using reference content");
                    (
                        resolve_bundle(None, reference_dataset()),
                        BundleSource::Fallback,
                        Some(e),
                    )
                }
            };

        for backfill in &resolution.backfilled {
            debug!(section = %backfill.section, fields = ?backfill.fields, "filled from reference");
        }

        // A failed write only costs a refetch on the next load.
        if let Err(e) = self.cache.set_with_source(&resolution.bundle, &profile, source) {
            warn!(error = %e, "could not write day cache");
        }

        self.store.publish(resolution.bundle.clone(), source);
        info!(source = ?source, session_id = %session_id, "dashboard loaded");

        LoadOutcome {
            bundle: resolution.bundle,
            source,
            failure,
            backfilled: resolution.backfilled,
            session_id: Some(session_id),
        }
    }

    /// Drop today's cached bundle and load again. Profile and feedback are kept.
    pub async fn refresh(&self) -> LoadOutcome {
        if let Err(e) = self.cache.clear() {
            warn!(error = %e, "could not clear day cache before refresh");
        }
        self.load().await
    }

    pub async fn health(&self) -> Connectivity {
        self.fetcher.health().await
    }
}
