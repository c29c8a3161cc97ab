// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! LLM module for the copilot
//!
//! Provider abstraction, the Groq implementation and the resilient
//! generation gateway built on top of them.

pub mod factory;
pub mod gateway;
pub mod message;
pub mod metrics;
pub mod mock_provider;
pub mod provider;
pub mod providers;
pub mod retry;

pub use gateway::{Fallback, Generation, GenerationGateway};
pub use message::*;
pub use metrics::MetricsSummary;
pub use provider::*;
