// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Turn runner shared by the REPL and one-shot mode.
//!
//! Runs the pipeline, calls the gateway for resolved turns, records the
//! turn in the session and decorates the reply with the turn counter.
//!
//! The final user message is the enriched payload, not the raw input: notes
//! carry their date stamp and commands arrive without the slash prefix. A
//! bare command with no payload falls back to the trimmed raw input.

use std::sync::Arc;

use crate::chat::pipeline::{ConversationPipeline, PipelineOutcome};
use crate::chat::prompts::{DefaultPromptAssembler, PromptAssembler};
use crate::chat::session::Session;
use crate::llm::gateway::{Generation, GenerationGateway};
use crate::llm::metrics::MetricsSummary;

const FALLBACK_BANNER: &str = "⚠️ *Modo fallback activado*.";
const LOW_TURNS_THRESHOLD: u32 = 3;

pub struct ChatEngine {
    pipeline: ConversationPipeline,
    assembler: Box<dyn PromptAssembler>,
    gateway: Arc<GenerationGateway>,
}

impl ChatEngine {
    pub fn new(gateway: Arc<GenerationGateway>) -> Self {
        Self {
            pipeline: ConversationPipeline::default(),
            assembler: Box::new(DefaultPromptAssembler::default()),
            gateway,
        }
    }

    pub fn with_pipeline(mut self, pipeline: ConversationPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_assembler(mut self, assembler: Box<dyn PromptAssembler>) -> Self {
        self.assembler = assembler;
        self
    }

    pub fn metrics(&self) -> MetricsSummary {
        self.gateway.metrics()
    }

    /// Handle one user turn and return the text to display
    pub async fn handle_turn(&self, session: &mut Session, raw: &str) -> String {
        let (reply, record) = match self.pipeline.run(session, raw) {
            PipelineOutcome::Blocked { message } => (message, true),
            PipelineOutcome::Suggestion { message, .. } => (message, true),
            PipelineOutcome::LimitReached { message } => (message, false),
            PipelineOutcome::Resolved {
                prompt_key,
                history,
                payload,
                ..
            } => {
                let input = if payload.is_empty() {
                    raw.trim()
                } else {
                    payload.as_str()
                };
                let messages = self.assembler.assemble(prompt_key, history, input);
                let generation = self.gateway.generate_detailed(messages).await;
                (with_fallback_banner(generation), true)
            }
        };

        if record {
            session.update_state(raw.trim(), reply.clone());
        }

        decorate(session, &reply)
    }
}

fn with_fallback_banner(generation: Generation) -> String {
    match generation.fallback {
        Some(_) => format!("{}\n\n{}", FALLBACK_BANNER, generation.text),
        None => generation.text,
    }
}

/// Prefix the turn counter and, near the limit, a remaining-turns warning
fn decorate(session: &Session, reply: &str) -> String {
    let mut output = format!("[Turno {}/{}]\n\n", session.turn_count(), session.max_turns());

    let remaining = session.remaining_turns();
    if remaining <= LOW_TURNS_THRESHOLD {
        output.push_str(&format!(
            "Quedan {} turnos antes de reiniciar la sesión.\n\n",
            remaining
        ));
    }

    output.push_str(reply);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::message::Role;
    use crate::llm::mock_provider::{MockOutcome, MockProvider};
    use crate::llm::retry::RetryConfig;
    use chrono::NaiveDate;

    fn engine(provider: &MockProvider) -> ChatEngine {
        let gateway = GenerationGateway::new(Arc::new(provider.clone()), "mock-model")
            .with_retry_config(RetryConfig {
                max_retries: 1,
                base_delay_ms: 1,
                max_delay_ms: 2,
                jitter: 0.0,
            });
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        ChatEngine::new(Arc::new(gateway))
            .with_pipeline(ConversationPipeline::new().with_fixed_date(today))
    }

    #[tokio::test]
    async fn test_resolved_turn_calls_gateway() {
        let provider = MockProvider::new().with_response("París");
        let engine = engine(&provider);
        let mut session = Session::default();

        let output = engine.handle_turn(&mut session, "¿Capital de Francia?").await;

        assert_eq!(output, "[Turno 1/20]\n\nParís");
        assert_eq!(session.turn_count(), 1);
        assert_eq!(session.history()[1].content, "París");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_payload_sent_as_final_user_message() {
        let provider = MockProvider::new();
        let engine = engine(&provider);
        let mut session = Session::default();

        engine.handle_turn(&mut session, "/nota estudio biología").await;

        let request = provider.last_request().unwrap();
        assert_eq!(request.messages[0].role, Role::System);
        let last = request.messages.last().unwrap();
        assert_eq!(last.role, Role::User);
        assert_eq!(last.content, "estudio biología (15/06/2025)");
    }

    #[tokio::test]
    async fn test_history_included_in_next_request() {
        let provider = MockProvider::new().with_response("ok");
        let engine = engine(&provider);
        let mut session = Session::default();

        engine.handle_turn(&mut session, "hola").await;
        engine.handle_turn(&mut session, "¿sigues ahí?").await;

        let request = provider.last_request().unwrap();
        assert_eq!(request.messages.len(), 4);
        assert_eq!(request.messages[1].content, "hola");
        assert_eq!(request.messages[2].content, "ok");
    }

    #[tokio::test]
    async fn test_blocked_turn_skips_gateway_but_is_recorded() {
        let provider = MockProvider::new();
        let engine = engine(&provider);
        let mut session = Session::default();

        let output = engine
            .handle_turn(&mut session, "Quiero fabricar un explosivo casero")
            .await;

        assert!(output.contains("Lo siento"));
        assert_eq!(provider.call_count(), 0);
        assert_eq!(session.turn_count(), 1);
    }

    #[tokio::test]
    async fn test_fallback_banner() {
        let provider = MockProvider::new().with_outcomes(vec![MockOutcome::Status(400)]);
        let engine = engine(&provider);
        let mut session = Session::default();

        let output = engine.handle_turn(&mut session, "hola").await;

        assert!(output.contains("⚠️ *Modo fallback activado*."));
        assert!(output.contains("no es válida"));
    }

    #[tokio::test]
    async fn test_low_turns_warning_and_limit_reset() {
        let provider = MockProvider::new().with_response("ok");
        let engine = engine(&provider);
        let mut session = Session::new(3, 5);

        let first = engine.handle_turn(&mut session, "uno").await;
        assert!(first.starts_with("[Turno 1/3]"));
        assert!(first.contains("Quedan 2 turnos antes de reiniciar la sesión."));

        engine.handle_turn(&mut session, "dos").await;
        engine.handle_turn(&mut session, "tres").await;
        assert_eq!(session.turn_count(), 3);

        let reset = engine.handle_turn(&mut session, "cuatro").await;
        assert!(reset.contains("reiniciado"));
        assert_eq!(session.turn_count(), 0);
        assert!(session.history().is_empty());
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_no_warning_with_many_turns_left() {
        let provider = MockProvider::new().with_response("ok");
        let engine = engine(&provider);
        let mut session = Session::default();

        let output = engine.handle_turn(&mut session, "hola").await;
        assert!(!output.contains("Quedan"));
    }
}
