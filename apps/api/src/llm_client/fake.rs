//! Scripted backend for tests: replays queued responses and records every prompt.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{LlmBackend, LlmError, RetryPolicy};

#[derive(Default)]
pub struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub system: String,
    pub policy: RetryPolicy,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push_back(Ok(text.into()));
        self
    }

    pub fn with_error(self, status: u16) -> Self {
        self.responses.lock().unwrap().push_back(Err(LlmError::Api {
            status,
            message: "scripted failure".to_string(),
        }));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn complete(
        &self,
        prompt: &str,
        system: &str,
        policy: RetryPolicy,
    ) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: prompt.to_string(),
            system: system.to_string(),
            policy,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyContent))
    }
}
