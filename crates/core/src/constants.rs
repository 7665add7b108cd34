//! Shared constants for actionlog.
//!
//! Persistence keys are fixed strings; changing one orphans existing data.

/// Key holding the session collection (`{ "sessions": [...] }`).
pub const SESSIONS_KEY: &str = "personal_action_manager_v1";

/// Key holding the singleton user profile.
pub const PROFILE_KEY: &str = "user_profile_v1";

/// Key holding the completion API key and model preference.
pub const SETTINGS_KEY: &str = "llm_settings_v1";

/// Key holding the scheduled reminder list.
pub const SCHEDULE_KEY: &str = "scheduled_notifications_v1";

/// Model used when none has been configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// OpenAI-compatible endpoint of the default completion provider.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Size of the "recent entries" view for weight tracking.
pub const RECENT_WEIGHT_LIMIT: usize = 10;

/// Minimum number of reframes a captured `action-3` record must carry.
pub const MIN_REFRAMES: usize = 3;
