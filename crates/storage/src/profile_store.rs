//! Singleton user profile persistence.

use actionlog_core::UserProfile;
use actionlog_core::constants::PROFILE_KEY;

use crate::error::Result;
use crate::kv::KeyValueStore;

#[derive(Debug, Clone)]
pub struct ProfileStore<K> {
    kv: K,
}

impl<K: KeyValueStore> ProfileStore<K> {
    pub const fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Loads the profile; a missing or unreadable entry yields the empty profile.
    pub fn load(&self) -> UserProfile {
        match self.kv.get(PROFILE_KEY) {
            Ok(Some(raw)) => UserProfile::from_json_lenient(&raw),
            Ok(None) => UserProfile::default(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read profile, using empty profile");
                UserProfile::default()
            },
        }
    }

    /// Saves the profile wholesale.
    pub fn save(&self, profile: &UserProfile) -> Result<()> {
        let json = serde_json::to_string(profile)?;
        self.kv.set(PROFILE_KEY, &json)
    }
}
