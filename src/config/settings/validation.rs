// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use crate::error::{CopilotError, Result};

use super::Settings;

/// Environment variable that overrides the configured model
pub const MODEL_ENV: &str = "MODEL_NAME";

impl Settings {
    /// Get the provider API key, checking env var first.
    pub fn get_api_key(&self) -> Option<String> {
        self.api_key_with(|name| std::env::var(name).ok())
    }

    /// Get the model identifier, checking `MODEL_NAME` first.
    pub fn get_model(&self) -> String {
        self.model_with(|name| std::env::var(name).ok())
    }

    /// Resolve the API key through an arbitrary variable lookup.
    pub fn api_key_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        // Priority: env var > config file.
        lookup(&self.provider.api_key_env)
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.provider.api_key.clone())
    }

    /// Resolve the model through an arbitrary variable lookup.
    pub fn model_with(&self, lookup: impl Fn(&str) -> Option<String>) -> String {
        lookup(MODEL_ENV)
            .filter(|model| !model.trim().is_empty())
            .unwrap_or_else(|| self.provider.default_model.clone())
    }

    /// Reject values the runtime cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.conversation.max_turns == 0 {
            return Err(CopilotError::Config(
                "conversation.max_turns must be at least 1".to_string(),
            ));
        }
        if self.conversation.context_window == 0 {
            return Err(CopilotError::Config(
                "conversation.context_window must be at least 1".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(CopilotError::Config(format!(
                "generation.temperature {} is outside 0.0..=2.0",
                self.generation.temperature
            )));
        }
        if !(0.0..=1.0).contains(&self.generation.top_p) {
            return Err(CopilotError::Config(format!(
                "generation.top_p {} is outside 0.0..=1.0",
                self.generation.top_p
            )));
        }
        if !(0.0..=1.0).contains(&self.resilience.jitter) {
            return Err(CopilotError::Config(format!(
                "resilience.jitter {} is outside 0.0..=1.0",
                self.resilience.jitter
            )));
        }
        if self.provider.timeout_secs == 0 {
            return Err(CopilotError::Config(
                "provider.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
