//! The saved profile, kept on the device for display and anonymization.

use std::sync::Arc;

use careconnect_core::Profile;
use tracing::{info, warn};

use crate::{KvStore, PROFILE_KEY, StoreError};

pub struct ProfileStore {
    kv: Arc<dyn KvStore>,
}

impl ProfileStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    pub fn save(&self, profile: &Profile) -> Result<(), StoreError> {
        let json = serde_json::to_string(profile)?;
        self.kv.put(PROFILE_KEY, &json)?;
        info!("profile saved");
        Ok(())
    }

    /// The saved profile, or `None` if nothing readable is stored.
    pub fn load(&self) -> Option<Profile> {
        let raw = match self.kv.get(PROFILE_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "profile unreadable");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(error = %e, "saved profile corrupt, ignoring");
                None
            }
        }
    }

    /// The saved profile, falling back to [`Profile::demo`].
    pub fn load_or_default(&self) -> Profile {
        self.load().unwrap_or_else(Profile::demo)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.kv.remove(PROFILE_KEY)
    }
}
