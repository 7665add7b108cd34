//! Shared fakes for service tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use actionlog_llm::{CompletionService, LlmError};
use async_trait::async_trait;
use serde_json::Value;

use crate::capture::SaveCallback;

/// Replays canned replies in order and records every prompt it receives.
#[derive(Default)]
pub(crate) struct ScriptedCompletion {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    pub(crate) prompts: Mutex<Vec<String>>,
    pub(crate) json_prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub(crate) fn new<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let script = Self::default();
        script.replies.lock().unwrap().extend(replies.into_iter().map(|r| Ok(r.into())));
        Arc::new(script)
    }

    pub(crate) fn push_error(&self, err: LlmError) {
        self.replies.lock().unwrap().push_back(Err(err));
    }

    pub(crate) fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len() + self.json_prompts.lock().unwrap().len()
    }

    fn next(&self) -> Result<String, LlmError> {
        self.replies.lock().unwrap().pop_front().unwrap_or(Err(LlmError::EmptyResponse))
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_owned());
        self.next()
    }

    async fn complete_json(&self, prompt: &str) -> Result<String, LlmError> {
        self.json_prompts.lock().unwrap().push(prompt.to_owned());
        self.next()
    }
}

/// A save callback that collects every payload it receives.
pub(crate) fn collecting_callback() -> (SaveCallback, Arc<Mutex<Vec<Value>>>) {
    let saved = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&saved);
    (Box::new(move |value| sink.lock().unwrap().push(value)), saved)
}
