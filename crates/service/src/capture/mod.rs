//! Conversational capture of one structured record.
//!
//! The engine drives a short interview with the model. Once a reply ends in a
//! JSON object the engine switches to review, where the candidate can be
//! edited, auto-fixed, and finally saved through the caller's callback.

mod validation;

use std::fmt;

use actionlog_core::{ActionId, UserProfile, extract_first_json, extract_trailing_json};
use actionlog_llm::CompletionService;
use actionlog_llm::prompts::{FixHint, Turn, build_autofix_prompt, build_capture_prompt};
use serde_json::Value;

use crate::error::CaptureError;

pub use validation::validate;
pub(crate) use validation::{has_text, text_of};

/// Receives the parsed payload when a capture is saved.
pub type SaveCallback = Box<dyn FnMut(Value) + Send>;

/// Lifecycle of a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Created, first question not yet requested.
    NotStarted,
    /// Interviewing: the user answers model questions.
    Ask,
    /// A candidate JSON object is under review.
    Review,
    /// The candidate was saved; the engine accepts no further input.
    Saved,
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotStarted => "not started",
            Self::Ask => "asking",
            Self::Review => "reviewing",
            Self::Saved => "saved",
        })
    }
}

/// What a user turn produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank input, nothing happened.
    Ignored,
    /// The model asked another question.
    Asked,
    /// The completion failed; its message was recorded as a model turn.
    Failed,
    /// The reply carried a candidate and the engine entered review.
    Review,
    /// As `Review`, and the valid candidate was auto-saved.
    AutoSaved,
}

pub struct CaptureEngine<C> {
    action: ActionId,
    completion: C,
    profile: Option<UserProfile>,
    on_save: SaveCallback,
    state: CaptureState,
    turns: Vec<Turn>,
    candidate: String,
    issues: Vec<String>,
    auto_save: bool,
    auto_saved: bool,
}

impl<C: CompletionService> CaptureEngine<C> {
    /// Creates an engine for `action`.
    ///
    /// # Errors
    /// Returns [`CaptureError::NotCapturable`] for actions without a
    /// conversational flow.
    pub fn new(
        action: ActionId,
        completion: C,
        profile: Option<UserProfile>,
        on_save: SaveCallback,
    ) -> Result<Self, CaptureError> {
        if !action.supports_capture() {
            return Err(CaptureError::NotCapturable(action));
        }
        Ok(Self {
            action,
            completion,
            profile,
            on_save,
            state: CaptureState::NotStarted,
            turns: Vec::new(),
            candidate: String::new(),
            issues: Vec::new(),
            auto_save: false,
            auto_saved: false,
        })
    }

    pub const fn action(&self) -> ActionId {
        self.action
    }

    pub const fn state(&self) -> CaptureState {
        self.state
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Candidate JSON text, empty outside review.
    pub fn candidate(&self) -> &str {
        &self.candidate
    }

    pub fn issues(&self) -> &[String] {
        &self.issues
    }

    pub const fn auto_save(&self) -> bool {
        self.auto_save
    }

    /// Requests the opening question.
    pub async fn start(&mut self) -> Result<TurnOutcome, CaptureError> {
        self.expect_state(CaptureState::NotStarted, "start")?;
        self.state = CaptureState::Ask;
        let prompt =
            build_capture_prompt(self.action, &[], None, true, self.profile.as_ref());
        Ok(self.ask_model(&prompt).await.map_or(TurnOutcome::Failed, |_| TurnOutcome::Asked))
    }

    /// Submits one user answer.
    ///
    /// Blank text is ignored. A reply ending in a JSON object moves the engine
    /// to review; anything else stays in the interview.
    pub async fn send(&mut self, text: &str) -> Result<TurnOutcome, CaptureError> {
        self.expect_state(CaptureState::Ask, "send")?;
        let text = text.trim();
        if text.is_empty() {
            return Ok(TurnOutcome::Ignored);
        }
        let prompt = build_capture_prompt(
            self.action,
            &self.turns,
            Some(text),
            false,
            self.profile.as_ref(),
        );
        self.turns.push(Turn::user(text));
        let Some(reply) = self.ask_model(&prompt).await else {
            return Ok(TurnOutcome::Failed);
        };
        let Some(json) = extract_trailing_json(&reply) else {
            return Ok(TurnOutcome::Asked);
        };
        tracing::debug!(action = %self.action, "candidate captured, entering review");
        self.enter_review(json.to_owned());
        if self.maybe_auto_save() {
            return Ok(TurnOutcome::AutoSaved);
        }
        Ok(TurnOutcome::Review)
    }

    /// Replaces the candidate text and revalidates. Returns whether the
    /// edit triggered an auto-save.
    pub fn edit_candidate(&mut self, text: &str) -> Result<bool, CaptureError> {
        self.expect_state(CaptureState::Review, "edit")?;
        text.clone_into(&mut self.candidate);
        self.revalidate();
        Ok(self.maybe_auto_save())
    }

    /// Toggles auto-save. Enabling it while a valid candidate is under
    /// review saves immediately; the return value says whether it did.
    pub fn set_auto_save(&mut self, enabled: bool) -> bool {
        self.auto_save = enabled;
        if !enabled {
            self.auto_saved = false;
            return false;
        }
        self.maybe_auto_save()
    }

    /// Asks the model to repair the candidate and replaces it with the
    /// first JSON object of the reply. Stays in review.
    pub async fn auto_fix(&mut self) -> Result<bool, CaptureError> {
        self.expect_state(CaptureState::Review, "auto-fix")?;
        let prompt = match serde_json::from_str::<Value>(&self.candidate) {
            Ok(value) => {
                build_autofix_prompt(self.action, FixHint::Current(&value.to_string()))
            },
            Err(e) => build_autofix_prompt(self.action, FixHint::ParseError(&e.to_string())),
        };
        let reply = self.completion.complete_json(&prompt).await?;
        let json = extract_first_json(&reply).ok_or(CaptureError::NoJsonInReply)?;
        tracing::debug!(action = %self.action, "candidate replaced by auto-fix");
        json.clone_into(&mut self.candidate);
        self.revalidate();
        Ok(self.maybe_auto_save())
    }

    /// Leaves review and continues the interview. The candidate is discarded.
    pub fn resume_conversation(&mut self) -> Result<(), CaptureError> {
        self.expect_state(CaptureState::Review, "resume")?;
        self.state = CaptureState::Ask;
        self.candidate.clear();
        self.issues.clear();
        self.auto_saved = false;
        Ok(())
    }

    /// Parses the candidate and hands it to the save callback.
    ///
    /// # Errors
    /// [`CaptureError::Parse`] when the candidate is not JSON and
    /// [`CaptureError::Invalid`] when it has outstanding issues. Either way
    /// the engine stays in review.
    pub fn save(&mut self) -> Result<Value, CaptureError> {
        self.expect_state(CaptureState::Review, "save")?;
        let value: Value = serde_json::from_str(&self.candidate)
            .map_err(|e| CaptureError::Parse(e.to_string()))?;
        if !self.issues.is_empty() {
            return Err(CaptureError::Invalid(self.issues.clone()));
        }
        (self.on_save)(value.clone());
        self.state = CaptureState::Saved;
        tracing::info!(action = %self.action, "capture saved");
        Ok(value)
    }

    async fn ask_model(&mut self, prompt: &str) -> Option<String> {
        match self.completion.complete(prompt).await {
            Ok(reply) => {
                self.turns.push(Turn::model(reply.clone()));
                Some(reply)
            },
            Err(e) => {
                tracing::warn!(action = %self.action, error = %e, "capture completion failed");
                self.turns.push(Turn::model(format!("Error: {e}")));
                None
            },
        }
    }

    fn enter_review(&mut self, candidate: String) {
        self.state = CaptureState::Review;
        self.candidate = candidate;
        self.auto_saved = false;
        self.revalidate();
    }

    fn revalidate(&mut self) {
        self.issues = match serde_json::from_str::<Value>(&self.candidate) {
            Ok(value) => validate(self.action, &value),
            Err(e) => vec![format!("JSON parse error: {e}")],
        };
    }

    /// Saves at most once per review session, and only a valid candidate.
    fn maybe_auto_save(&mut self) -> bool {
        if self.state != CaptureState::Review
            || !self.auto_save
            || self.auto_saved
            || !self.issues.is_empty()
        {
            return false;
        }
        self.auto_saved = true;
        match self.save() {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "auto-save failed");
                false
            },
        }
    }

    fn expect_state(&self, want: CaptureState, op: &'static str) -> Result<(), CaptureError> {
        if self.state == want {
            Ok(())
        } else {
            Err(CaptureError::WrongState { op, state: self.state })
        }
    }
}
