// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Mock LLM provider for testing
//!
//! Provides a scripted implementation of the LlmProvider trait so the
//! gateway and the chat engine can be exercised without real API calls.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::error::{ApiError, CopilotError, Result};
use crate::llm::provider::{CompletionRequest, CompletionResponse, LlmProvider, Usage};

/// A mock LLM provider for testing
#[derive(Clone)]
pub struct MockProvider {
    /// Provider name
    name: String,
    /// Scripted outcomes, consumed in order (the last one repeats)
    script: Arc<Mutex<Vec<MockOutcome>>>,
    /// Call counter
    call_count: Arc<AtomicUsize>,
    /// Recorded requests
    recorded_requests: Arc<Mutex<Vec<CompletionRequest>>>,
    /// Artificial latency applied before answering
    delay: Option<Duration>,
}

/// One scripted outcome of a `complete()` call
#[derive(Clone, Debug)]
pub enum MockOutcome {
    /// Successful completion
    Reply {
        text: String,
        usage: Option<Usage>,
    },
    /// Provider answered with this HTTP status
    Status(u16),
    /// Request timed out
    Timeout,
    /// Connection-level failure
    Network(String),
}

impl MockOutcome {
    /// Successful reply with default usage
    pub fn reply(text: impl Into<String>) -> Self {
        MockOutcome::Reply {
            text: text.into(),
            usage: Some(Usage {
                input_tokens: 10,
                output_tokens: 20,
            }),
        }
    }

    fn into_result(self, model: String) -> Result<CompletionResponse> {
        match self {
            MockOutcome::Reply { text, usage } => Ok(CompletionResponse {
                model,
                content: text,
                usage,
            }),
            MockOutcome::Status(status) => Err(CopilotError::Api(ApiError::from_status(
                status,
                format!("mock status {}", status),
            ))),
            MockOutcome::Timeout => Err(CopilotError::Api(ApiError::Timeout)),
            MockOutcome::Network(message) => Err(CopilotError::Api(ApiError::Network(message))),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// Create a new mock provider that always answers "Mock response"
    pub fn new() -> Self {
        Self {
            name: "mock".to_string(),
            script: Arc::new(Mutex::new(vec![MockOutcome::reply("Mock response")])),
            call_count: Arc::new(AtomicUsize::new(0)),
            recorded_requests: Arc::new(Mutex::new(vec![])),
            delay: None,
        }
    }

    /// Set a single text response
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.with_outcomes(vec![MockOutcome::reply(text)])
    }

    /// Queue outcomes (returned in order, the last one repeats)
    pub fn with_outcomes(self, outcomes: Vec<MockOutcome>) -> Self {
        {
            let mut script = lock_or_recover(&self.script);
            script.clear();
            script.extend(outcomes);
        }
        self
    }

    /// Fail every call with the given HTTP status
    pub fn failing_with_status(status: u16) -> Self {
        Self::new().with_outcomes(vec![MockOutcome::Status(status)])
    }

    /// Sleep before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get the number of times complete() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Get all recorded requests
    pub fn recorded_requests(&self) -> Vec<CompletionRequest> {
        lock_or_recover(&self.recorded_requests).clone()
    }

    /// Get the last request made
    pub fn last_request(&self) -> Option<CompletionRequest> {
        lock_or_recover(&self.recorded_requests).last().cloned()
    }

    fn next_outcome(&self) -> MockOutcome {
        let count = self.call_count.fetch_add(1, Ordering::SeqCst);
        let script = lock_or_recover(&self.script);
        if script.is_empty() {
            MockOutcome::reply("Mock response")
        } else {
            script[count.min(script.len() - 1)].clone()
        }
    }
}

fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("Mock provider lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        lock_or_recover(&self.recorded_requests).push(request.clone());
        let outcome = self.next_outcome();

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        outcome.into_result(request.model)
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(vec!["mock-model".to_string()])
    }
}
