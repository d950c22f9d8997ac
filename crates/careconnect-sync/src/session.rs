//! Per-request session tokens. Unique enough to tell requests apart in
//! pipeline logs; not suitable for anything security-related.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;

const SUFFIX_LEN: usize = 9;

/// `session_<unix millis>_<9 random lowercase alphanumerics>`.
pub fn new_session_id(now: DateTime<Utc>) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("session_{}_{suffix}", now.timestamp_millis())
}
