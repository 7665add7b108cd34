//! User profile used to parameterize prompts.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Singleton user profile. Saved wholesale, never patched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expertise: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals: Option<String>,
    #[serde(default)]
    pub use_in_prompts: bool,
}

impl UserProfile {
    /// Decodes a stored profile, coercing loosely-typed fields.
    ///
    /// Anything that is not a JSON object yields the empty profile. Scalars are
    /// stringified, empty strings become `None`, and `useInPrompts` follows
    /// JavaScript-style truthiness.
    #[must_use]
    pub fn from_json_lenient(raw: &str) -> Self {
        let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(raw) else {
            return Self::default();
        };
        let text = |key: &str| obj.get(key).and_then(coerce_text).filter(|s| !s.is_empty());
        let expertise = match obj.get("expertise") {
            Some(Value::Array(items)) => items.iter().filter_map(coerce_text).collect(),
            _ => Vec::new(),
        };
        Self {
            name: text("name").unwrap_or_default(),
            title: text("title"),
            email: text("email"),
            website: text("website"),
            bio: text("bio"),
            expertise,
            persona: text("persona"),
            goals: text("goals"),
            use_in_prompts: obj.get("useInPrompts").is_some_and(is_truthy),
        }
    }

    /// Whether a preamble built from this profile should prefix prompts.
    #[must_use]
    pub fn prompts_enabled(&self) -> bool {
        self.use_in_prompts && !self.name.trim().is_empty()
    }
}

fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_decode_coerces_fields() {
        let raw = r#"{"name":"Mina","title":"","expertise":["ops",3],"useInPrompts":1}"#;
        let profile = UserProfile::from_json_lenient(raw);
        assert_eq!(profile.name, "Mina");
        assert_eq!(profile.title, None);
        assert_eq!(profile.expertise, vec!["ops".to_owned(), "3".to_owned()]);
        assert!(profile.use_in_prompts);
    }

    #[test]
    fn test_garbage_yields_empty_profile() {
        assert_eq!(UserProfile::from_json_lenient("not json"), UserProfile::default());
        assert_eq!(UserProfile::from_json_lenient("[1,2]"), UserProfile::default());
    }

    #[test]
    fn test_prompts_enabled_needs_name() {
        let profile = UserProfile { use_in_prompts: true, ..UserProfile::default() };
        assert!(!profile.prompts_enabled());
        let named = UserProfile { name: "Mina".to_owned(), ..profile };
        assert!(named.prompts_enabled());
    }
}
