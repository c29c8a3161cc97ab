// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Provider factory for creating LLM providers

use std::sync::Arc;
use std::time::Duration;

use crate::config::Settings;
use crate::error::{CopilotError, Result};
use crate::llm::provider::LlmProvider;
use crate::llm::providers::GroqProvider;

/// Factory for creating LLM providers
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create the Groq provider from settings.
    ///
    /// A missing API key is a configuration error.
    pub fn create_groq(settings: &Settings) -> Result<Arc<dyn LlmProvider>> {
        let api_key = settings.get_api_key().ok_or_else(|| {
            CopilotError::Config(format!(
                "{} not found in environment variables.",
                settings.provider.api_key_env
            ))
        })?;

        let provider = GroqProvider::with_base_url(
            api_key,
            &settings.provider.base_url,
            Duration::from_secs(settings.provider.timeout_secs),
        )?;

        Ok(Arc::new(provider))
    }
}
