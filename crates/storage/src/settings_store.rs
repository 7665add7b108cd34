//! Completion API key and model preference.

use actionlog_core::constants::{DEFAULT_BASE_URL, DEFAULT_MODEL, SETTINGS_KEY};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::kv::KeyValueStore;

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self { api_key: None, model: DEFAULT_MODEL.to_owned(), base_url: DEFAULT_BASE_URL.to_owned() }
    }
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SettingsStore<K> {
    kv: K,
}

impl<K: KeyValueStore> SettingsStore<K> {
    pub const fn new(kv: K) -> Self {
        Self { kv }
    }

    pub fn load(&self) -> LlmSettings {
        match self.kv.get(SETTINGS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "stored settings are corrupt, using defaults");
                LlmSettings::default()
            }),
            Ok(None) => LlmSettings::default(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read settings, using defaults");
                LlmSettings::default()
            },
        }
    }

    pub fn save(&self, settings: &LlmSettings) -> Result<()> {
        let json = serde_json::to_string(settings)?;
        self.kv.set(SETTINGS_KEY, &json)
    }

    /// Stores a new key, or forgets it when `api_key` is `None` or blank.
    pub fn set_api_key(&self, api_key: Option<&str>) -> Result<()> {
        let mut settings = self.load();
        settings.api_key = api_key.map(str::trim).filter(|k| !k.is_empty()).map(str::to_owned);
        self.save(&settings)
    }

    pub fn set_model(&self, model: &str) -> Result<()> {
        let mut settings = self.load();
        model.trim().clone_into(&mut settings.model);
        self.save(&settings)
    }
}
