//! Local state: key-value persistence, the day cache, saved profile and
//! feedback log, and the in-process content store.

mod error;
pub use error::StoreError;

pub mod content_store;
pub mod day_cache;
pub mod feedback_store;
pub mod kv;
pub mod profile_store;

pub use content_store::{BundleSource, ContentStore, Subscription};
pub use day_cache::{CacheEntry, DayCache};
pub use feedback_store::FeedbackStore;
pub use kv::{FileKv, KvStore, MemoryKv};
pub use profile_store::ProfileStore;

/// Key holding the day cache entry.
pub const CACHE_KEY: &str = "careconnect.daily_cache";
/// Key holding the saved profile.
pub const PROFILE_KEY: &str = "careconnect.profile";
/// Key holding the feedback log.
pub const FEEDBACK_KEY: &str = "careconnect.feedback";
