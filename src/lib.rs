// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! AI Copilot - conversational assistant for notes, reminders and searches.
//!
//! This crate exposes the runtime used by the `copilot` CLI (`src/main.rs`).
//!
//! Architecture highlights:
//! - `chat`: safety filter, intent resolution, reminder dates, session state,
//!   the per-turn pipeline and the engine that runs a turn end to end
//! - `llm`: provider abstraction, the Groq client and the resilient
//!   generation gateway (retries, fallbacks, metrics)
//! - `config`: JSON settings with environment overrides

pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;

pub use error::{CopilotError, Result};
