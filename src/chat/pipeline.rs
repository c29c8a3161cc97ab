// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Conversation pipeline
//!
//! One call walks a fixed sequence of guardrails and produces exactly one
//! [`PipelineOutcome`]:
//!
//! 1. safety filter (refusal -> `Blocked`, session untouched)
//! 2. turn limit (reset session -> `LimitReached`)
//! 3. routing: slash commands are classified directly; free text gets a
//!    suggestion first, which preempts classification when it fires
//! 4. enrichment: date stamp for notes, date validation for reminders
//! 5. `Resolved` with the prompt key and a borrowed view of history

use chrono::{Local, NaiveDate};

use crate::chat::intent::{classify, suggest, Intent, COMMAND_PREFIX};
use crate::chat::prompts::PromptKey;
use crate::chat::reminder::ReminderValidator;
use crate::chat::safety::{is_refusal, KeywordSafetyFilter, SafetyFilter};
use crate::chat::session::{Session, Turn};

/// Text returned when the session hits its turn limit
pub const LIMIT_RESET_MESSAGE: &str = "Has alcanzado el número máximo de turnos. \
He reiniciado la conversación. Puedes continuar cuando quieras.";

/// Result of one pipeline call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome<'a> {
    /// Refused by a guardrail; never reaches generation
    Blocked { message: String },
    /// Command suggestion for free text, with a copy of the history
    Suggestion { message: String, history: Vec<Turn> },
    /// Session was reset
    LimitReached { message: String },
    /// Ready for generation
    Resolved {
        intent: Intent,
        prompt_key: PromptKey,
        history: &'a [Turn],
        payload: String,
    },
}

impl PipelineOutcome<'_> {
    pub fn label(&self) -> &'static str {
        match self {
            PipelineOutcome::Blocked { .. } => "BLOCKED",
            PipelineOutcome::Suggestion { .. } => "SUGGESTION",
            PipelineOutcome::LimitReached { .. } => "LIMIT_REACHED",
            PipelineOutcome::Resolved { intent, .. } => intent.label(),
        }
    }

    pub fn prompt_key(&self) -> PromptKey {
        match self {
            PipelineOutcome::Blocked { .. } | PipelineOutcome::Suggestion { .. } => {
                PromptKey::Default
            }
            PipelineOutcome::LimitReached { .. } => PromptKey::Limit,
            PipelineOutcome::Resolved { prompt_key, .. } => *prompt_key,
        }
    }

    /// History that goes with the outcome; empty after a limit reset
    pub fn history(&self) -> &[Turn] {
        match self {
            PipelineOutcome::Suggestion { history, .. } => history,
            PipelineOutcome::Resolved { history, .. } => history,
            PipelineOutcome::LimitReached { .. } => &[],
            PipelineOutcome::Blocked { .. } => &[],
        }
    }

    /// Text for short-circuit outcomes
    pub fn message(&self) -> Option<&str> {
        match self {
            PipelineOutcome::Blocked { message }
            | PipelineOutcome::Suggestion { message, .. }
            | PipelineOutcome::LimitReached { message } => Some(message),
            PipelineOutcome::Resolved { .. } => None,
        }
    }
}

/// Routes user turns through guardrails, intent resolution and enrichment
pub struct ConversationPipeline {
    safety: Box<dyn SafetyFilter>,
    reminders: ReminderValidator,
    fixed_date: Option<NaiveDate>,
}

impl Default for ConversationPipeline {
    fn default() -> Self {
        Self {
            safety: Box::new(KeywordSafetyFilter::default()),
            reminders: ReminderValidator::default(),
            fixed_date: None,
        }
    }
}

impl ConversationPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_safety_filter(mut self, safety: Box<dyn SafetyFilter>) -> Self {
        self.safety = safety;
        self
    }

    pub fn with_reminder_validator(mut self, reminders: ReminderValidator) -> Self {
        self.reminders = reminders;
        self
    }

    /// Use `date` as "today" instead of the local clock
    pub fn with_fixed_date(mut self, date: NaiveDate) -> Self {
        self.fixed_date = Some(date);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.fixed_date.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Process one raw user turn
    pub fn run<'a>(&self, session: &'a mut Session, raw: &str) -> PipelineOutcome<'a> {
        let sanitized = self.safety.filter(raw);
        if is_refusal(&sanitized) {
            tracing::debug!("turn blocked by safety filter");
            return PipelineOutcome::Blocked { message: sanitized };
        }

        if session.limit_reached() {
            tracing::debug!(
                turns = session.turn_count(),
                "turn limit reached, resetting session"
            );
            session.reset();
            return PipelineOutcome::LimitReached {
                message: LIMIT_RESET_MESSAGE.to_string(),
            };
        }

        if !sanitized.starts_with(COMMAND_PREFIX) {
            if let Some(message) = suggest(&sanitized) {
                tracing::debug!("suggesting a command for free text");
                return PipelineOutcome::Suggestion {
                    message,
                    history: session.history().to_vec(),
                };
            }
        }

        let parsed = classify(&sanitized);
        let today = self.today();

        let payload = match parsed.intent {
            Intent::Note => stamp_note(&parsed.payload, today),
            Intent::Reminder => match self.reminders.validate(&parsed.payload, today) {
                Ok(_) => parsed.payload,
                Err(error) => {
                    tracing::debug!(%error, "reminder rejected");
                    return PipelineOutcome::Blocked {
                        message: error.to_string(),
                    };
                }
            },
            _ => parsed.payload,
        };

        let prompt_key = PromptKey::for_intent(parsed.intent);
        tracing::debug!(intent = %parsed.intent, prompt_key = %prompt_key, "turn resolved");

        PipelineOutcome::Resolved {
            intent: parsed.intent,
            prompt_key,
            history: session.history(),
            payload,
        }
    }
}

fn stamp_note(payload: &str, today: NaiveDate) -> String {
    let stamp = today.format("%d/%m/%Y");
    if payload.is_empty() {
        format!("({})", stamp)
    } else {
        format!("{} ({})", payload, stamp)
    }
}
