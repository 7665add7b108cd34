//! Free chat and record refinement conversations.

use actionlog_core::{Session, UserProfile};
use actionlog_llm::CompletionService;
use actionlog_llm::prompts::{Role, Turn, build_chat_prompt, build_refine_prompt};
use actionlog_storage::{KeyValueStore, RecordStore};

use crate::error::ServiceError;
use crate::records::refinement_patch;

pub struct ChatService<C, K> {
    completion: C,
    store: RecordStore<K>,
    profile: Option<UserProfile>,
    turns: Vec<Turn>,
    /// Record the refinement turns are about.
    focus: Option<String>,
}

impl<C: CompletionService, K: KeyValueStore> ChatService<C, K> {
    pub const fn new(completion: C, store: RecordStore<K>, profile: Option<UserProfile>) -> Self {
        Self { completion, store, profile, turns: Vec::new(), focus: None }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// One free-chat exchange. Each prompt carries only the profile
    /// preamble and the new text.
    pub async fn chat(&mut self, text: &str) -> Result<String, ServiceError> {
        let text = non_blank(text)?;
        self.refocus(None);
        let prompt = build_chat_prompt(self.profile.as_ref(), text);
        self.exchange(text, &prompt).await
    }

    /// Asks the model to polish record `id` according to `request`.
    pub async fn refine(&mut self, id: &str, request: &str) -> Result<String, ServiceError> {
        let request = non_blank(request)?;
        let session = self.load(id)?;
        self.refocus(Some(id));
        let prompt = build_refine_prompt(&session, request);
        self.exchange(request, &prompt).await
    }

    /// Writes the latest refinement reply for `id` into the record.
    pub fn apply_refinement(&self, id: &str) -> Result<Session, ServiceError> {
        if self.focus.as_deref() != Some(id) {
            return Err(ServiceError::InvalidInput(format!("no refinement in progress for {id}")));
        }
        let reply = self
            .turns
            .iter()
            .rev()
            .find(|t| t.role == Role::Model)
            .ok_or_else(|| ServiceError::InvalidInput("no model reply to apply".to_owned()))?;
        let session = self.load(id)?;
        let patch = refinement_patch(&session, &reply.text);
        if !self.store.update_by_id(id, &patch)? {
            return Err(ServiceError::NotFound(id.to_owned()));
        }
        tracing::info!(id, action = %session.action_id(), "refinement applied");
        self.load(id)
    }

    async fn exchange(&mut self, text: &str, prompt: &str) -> Result<String, ServiceError> {
        tracing::debug!(chars = prompt.len(), "chat prompt");
        let reply = self.completion.complete(prompt).await?;
        self.turns.push(Turn::user(text));
        self.turns.push(Turn::model(reply.clone()));
        Ok(reply)
    }

    fn refocus(&mut self, id: Option<&str>) {
        if self.focus.as_deref() != id {
            self.turns.clear();
            self.focus = id.map(str::to_owned);
        }
    }

    fn load(&self, id: &str) -> Result<Session, ServiceError> {
        self.store.get_by_id(id)?.ok_or_else(|| ServiceError::NotFound(id.to_owned()))
    }
}

fn non_blank(text: &str) -> Result<&str, ServiceError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ServiceError::InvalidInput("message is empty".to_owned()));
    }
    Ok(text)
}
