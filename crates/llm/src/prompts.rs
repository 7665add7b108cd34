//! Prompt composition.
//!
//! Every function here is pure: the same inputs always produce the same prompt.

use std::fmt::Write as _;

use actionlog_core::{ActionId, Session, UserProfile};
use serde::{Deserialize, Serialize};

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// One turn of a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into() }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self { role: Role::Model, text: text.into() }
    }
}

/// Coach persona and JSON keys for a capture flow.
#[must_use]
pub fn system_role(action: ActionId) -> &'static str {
    match action {
        ActionId::Knowledge => {
            "You are a knowledge-archive coach. Help the user pin down today's topic and core \
             question and leave a short note, using 1-3 questions. At the end, fill in the JSON \
             schema below.\nJSON keys: topic, coreQuestion, notes"
        },
        ActionId::Household => {
            "You are a household-operations coach. Help the user record a fact-based observation \
             and a pattern analysis, using 1-3 questions. At the end, fill in the JSON schema \
             below.\nJSON keys: observation, analysis"
        },
        ActionId::Reframe => {
            "You are a social-venture coach. Help the user state one problem and at least three \
             reframings of it, using 1-3 questions. At the end, fill in the JSON schema below.\n\
             JSON keys: problem, reframes[]"
        },
        ActionId::Weight => {
            "You are a health-tracking assistant. Help the user log today's weight.\n\
             JSON keys: date, weightKg, note"
        },
    }
}

/// Short statement of an action's required fields.
#[must_use]
pub fn constraint_summary(action: ActionId) -> &'static str {
    match action {
        ActionId::Knowledge => "Required: topic, coreQuestion. notes is optional. Strings only.",
        ActionId::Household => "Required: observation, analysis. Strings only.",
        ActionId::Reframe => "Required: problem, and reframes as an array of at least 3 strings.",
        ActionId::Weight => {
            "Required: date (YYYY-MM-DD), weightKg (positive number). note is optional."
        },
    }
}

fn guardrails(action: ActionId) -> String {
    format!(
        "Rules:\n\
         1) This conversation exists to record a {action} entry. If the user drifts off topic, \
         gently steer back to that goal.\n\
         2) Ask only one question at a time, and keep it short.\n\
         3) Once you have gathered enough, output only the JSON on your final turn."
    )
}

/// Serializes turns as `role: text` lines.
#[must_use]
pub fn format_history(history: &[Turn]) -> String {
    history.iter().map(|t| format!("{}: {}", t.role.as_str(), t.text)).collect::<Vec<_>>().join("\n")
}

/// Profile lines that prefix prompts, empty unless the profile opts in.
#[must_use]
pub fn profile_preamble(profile: Option<&UserProfile>) -> String {
    let Some(p) = profile.filter(|p| p.prompts_enabled()) else {
        return String::new();
    };
    format!(
        "The following is the user's profile. Reflect its tone and expertise in your answers.\n\
         Name: {}\nTitle: {}\nExpertise: {}\nPersona: {}\nGoals: {}\n\n",
        p.name,
        p.title.as_deref().unwrap_or(""),
        p.expertise.join(", "),
        p.persona.as_deref().unwrap_or(""),
        p.goals.as_deref().unwrap_or(""),
    )
}

/// Builds one capture turn's prompt.
///
/// The initial turn omits history and forbids JSON. Later turns carry the
/// whole history followed by the new utterance when there is one.
#[must_use]
pub fn build_capture_prompt(
    action: ActionId,
    history: &[Turn],
    user_text: Option<&str>,
    initial: bool,
    profile: Option<&UserProfile>,
) -> String {
    let mut prompt = profile_preamble(profile);
    prompt.push_str(system_role(action));
    prompt.push_str("\n\n");
    prompt.push_str(&guardrails(action));
    prompt.push_str("\n\n");
    if initial {
        prompt.push_str("model: Ask your first question in a single sentence. Do not output JSON yet.");
        return prompt;
    }
    prompt.push_str("Conversation so far:\n");
    prompt.push_str(&format_history(history));
    prompt.push_str("\n\n");
    if let Some(text) = user_text.filter(|t| !t.trim().is_empty()) {
        let _ = writeln!(prompt, "user: {text}");
    }
    prompt.push_str("model: Give your next response.");
    prompt
}

/// What the auto-fix prompt knows about the current candidate.
#[derive(Debug, Clone, Copy)]
pub enum FixHint<'a> {
    /// The candidate did not parse; carries the parser message.
    ParseError(&'a str),
    /// The candidate parsed; carries its compact serialization.
    Current(&'a str),
}

/// Asks for a corrected, JSON-only object for `action`.
#[must_use]
pub fn build_autofix_prompt(action: ActionId, hint: FixHint<'_>) -> String {
    let hint = match hint {
        FixHint::ParseError(e) => format!("Current JSON parse error: {e}"),
        FixHint::Current(json) => format!("Current JSON: {json}"),
    };
    format!(
        "Output only a pure JSON object for action {action}, correcting missing or malformed \
         fields to fit its schema. No explanations, no markdown, JSON only.\n\
         Constraints: {}\n{hint}",
        constraint_summary(action)
    )
}

/// Free-chat prompt: the profile preamble followed by the user's text.
#[must_use]
pub fn build_chat_prompt(profile: Option<&UserProfile>, text: &str) -> String {
    format!("{}{text}", profile_preamble(profile))
}

/// Multi-line description of a stored record, used as model context.
#[must_use]
pub fn record_context(session: &Session) -> String {
    match session {
        Session::Knowledge(r) => format!(
            "Knowledge archive record\nTopic: {}\nCore question: {}\nNotes: {}",
            r.topic, r.core_question, r.notes
        ),
        Session::Household(r) => format!(
            "Household log record\nObservation: {}\nAnalysis: {}",
            r.observation, r.analysis
        ),
        Session::Reframe(r) => format!(
            "Problem reframing record\nProblem: {}\nReframes: {}",
            r.problem,
            r.reframes.join("; ")
        ),
        Session::Weight(r) => format!(
            "Weight log record\nDate: {}\nWeight: {}kg\nNote: {}",
            r.date,
            r.weight_kg,
            r.note.as_deref().unwrap_or("")
        ),
    }
}

/// Asks the model to polish an existing record according to `request`.
#[must_use]
pub fn build_refine_prompt(session: &Session, request: &str) -> String {
    format!(
        "Polish the user's existing record so it is clearer and more concise. Propose a \
         structure if it helps.\n\n[Current record]\n{}\n\n[User request]\n{request}",
        record_context(session)
    )
}
