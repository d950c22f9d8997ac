//! In-process holder of the current bundle, with synchronous subscribers.
//!
//! Construct one store at startup and hand clones of it to every consumer;
//! clones share the same state. Reads never come back empty: without a
//! current bundle the reference dataset is returned.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use careconnect_core::{ContentBundle, Domain, Fields, reference_dataset, resolve};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Where the current bundle came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BundleSource {
    /// Nothing published yet; readers see the reference dataset.
    Reference,
    /// Today's cached bundle.
    Cache,
    /// A live response merged over the reference.
    Live,
    /// The fetch failed and the reference was used whole.
    Fallback,
}

impl BundleSource {
    /// Non-blocking notice for the UI when the content is not freshly personalized.
    pub fn indicator(&self) -> Option<&'static str> {
        match self {
            Self::Live => None,
            Self::Cache => Some("Using saved content from earlier today"),
            Self::Reference | Self::Fallback => Some("Using demo content"),
        }
    }
}

type Callback = dyn Fn(Option<&ContentBundle>) + Send + Sync;

struct Inner {
    current: Option<Arc<ContentBundle>>,
    source: BundleSource,
    subscribers: Vec<(u64, Arc<Callback>)>,
    next_id: u64,
    /// Bumped on every publish and clear.
    version: u64,
    /// Last version handed to subscribers.
    delivered: u64,
    /// Set while some thread is running the broadcast loop.
    broadcasting: bool,
}

#[derive(Clone)]
pub struct ContentStore {
    inner: Arc<Mutex<Inner>>,
}

impl Default for ContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                current: None,
                source: BundleSource::Reference,
                subscribers: Vec::new(),
                next_id: 0,
                version: 0,
                delivered: 0,
                broadcasting: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the current bundle and notify subscribers.
    pub fn set_data(&self, bundle: ContentBundle) {
        self.publish(bundle, BundleSource::Live);
    }

    /// Replace the current bundle, recording where it came from.
    ///
    /// Subscribers run in subscription order, after the new bundle is visible
    /// to readers. Broadcasts never overlap: a publish that lands while
    /// another thread is notifying is delivered by that thread once its
    /// current round ends, and intermediate bundles may be skipped so the
    /// last notification always matches [`get_data`](Self::get_data). A
    /// panicking subscriber is logged and skipped; the rest are still
    /// notified.
    pub fn publish(&self, bundle: ContentBundle, source: BundleSource) {
        self.replace(Some(Arc::new(bundle)), source);
    }

    fn replace(&self, bundle: Option<Arc<ContentBundle>>, source: BundleSource) {
        {
            let mut inner = self.lock();
            inner.current = bundle;
            inner.source = source;
            inner.version += 1;
            if inner.broadcasting {
                debug!(version = inner.version, "broadcast in progress, deferring");
                return;
            }
            inner.broadcasting = true;
        }
        self.broadcast();
    }

    /// Deliver the latest state until no newer version is pending.
    fn broadcast(&self) {
        loop {
            let (bundle, subscribers, version) = {
                let mut inner = self.lock();
                if inner.delivered == inner.version {
                    inner.broadcasting = false;
                    return;
                }
                inner.delivered = inner.version;
                (inner.current.clone(), inner.subscribers.clone(), inner.version)
            };
            debug!(version, present = bundle.is_some(), subscribers = subscribers.len(), "broadcasting");
            notify(&subscribers, bundle.as_deref());
        }
    }

    /// The current bundle, or the reference dataset if none is set.
    pub fn get_data(&self) -> ContentBundle {
        match &self.lock().current {
            Some(bundle) => bundle.as_ref().clone(),
            None => reference_dataset().clone(),
        }
    }

    /// One domain of the current bundle, with any gaps filled from the reference.
    pub fn get_domain(&self, domain: Domain) -> Fields {
        let current = self.lock().current.clone();
        let reference = reference_dataset().domain(domain);
        let (fields, backfilled) = resolve(
            domain.key(),
            current.as_deref().map(|b| b.domain(domain)),
            reference,
        );
        if current.is_some() && !backfilled.is_empty() {
            debug!(domain = %domain, fields = ?backfilled, "repaired domain at read time");
        }
        fields
    }

    pub fn source(&self) -> BundleSource {
        self.lock().source
    }

    pub fn has_data(&self) -> bool {
        self.lock().current.is_some()
    }

    /// Register `callback`; it runs on every publish and clear.
    ///
    /// Dropping the returned handle leaves the subscription in place; call
    /// [`Subscription::unsubscribe`] to remove it.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Option<&ContentBundle>) + Send + Sync + 'static,
    {
        let callback: Arc<Callback> = Arc::new(callback);
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, callback));
        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Drop the current bundle and notify subscribers with `None`.
    pub fn clear_data(&self) {
        self.replace(None, BundleSource::Reference);
    }
}

fn notify(subscribers: &[(u64, Arc<Callback>)], bundle: Option<&ContentBundle>) {
    for (id, callback) in subscribers {
        if catch_unwind(AssertUnwindSafe(|| callback(bundle))).is_err() {
            warn!(subscriber = id, "subscriber panicked during notification");
        }
    }
}

/// Handle returned by [`ContentStore::subscribe`].
pub struct Subscription {
    id: u64,
    store: Weak<Mutex<Inner>>,
}

impl Subscription {
    /// Remove the subscription. Calling this more than once is a no-op.
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.store.upgrade() {
            let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
            inner.subscribers.retain(|(id, _)| *id != self.id);
        }
    }
}
