// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Conversation handling
//!
//! This module provides the per-turn pipeline (safety, limits, intent
//! resolution, reminder dates), session state, prompt assembly and the
//! engine that ties them to the generation gateway.

pub mod engine;
pub mod intent;
pub mod pipeline;
pub mod prompts;
pub mod reminder;
pub mod safety;
pub mod session;

pub use engine::ChatEngine;
pub use intent::{classify, suggest, Intent, ParsedCommand};
pub use pipeline::{ConversationPipeline, PipelineOutcome};
pub use prompts::{DefaultPromptAssembler, PromptAssembler, PromptKey};
pub use session::{Session, Turn};
