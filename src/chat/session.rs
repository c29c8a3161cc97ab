// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Conversation session state
//!
//! A session holds the turn counter and a rolling window of the most
//! recent user/assistant pairs. It is owned by one conversation and
//! borrowed mutably by the pipeline for the duration of a call.

use serde::{Deserialize, Serialize};

use crate::config::ConversationConfig;
use crate::llm::message::{Message, Role};

/// Author of a [`Turn`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

/// One recorded message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Speaker,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Speaker::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Speaker::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Turn> for Message {
    fn from(turn: &Turn) -> Self {
        let role = match turn.role {
            Speaker::User => Role::User,
            Speaker::Assistant => Role::Assistant,
        };
        Message {
            role,
            content: turn.content.clone(),
        }
    }
}

/// Per-conversation state
#[derive(Debug, Clone)]
pub struct Session {
    history: Vec<Turn>,
    turn_count: u32,
    max_turns: u32,
    context_window: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self::from_config(&ConversationConfig::default())
    }
}

impl Session {
    pub fn new(max_turns: u32, context_window: usize) -> Self {
        Self {
            history: Vec::new(),
            turn_count: 0,
            max_turns,
            context_window,
        }
    }

    pub fn from_config(config: &ConversationConfig) -> Self {
        Self::new(config.max_turns, config.context_window)
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    pub fn context_window(&self) -> usize {
        self.context_window
    }

    /// Turns left before the limit reset
    pub fn remaining_turns(&self) -> u32 {
        self.max_turns.saturating_sub(self.turn_count)
    }

    pub fn limit_reached(&self) -> bool {
        self.turn_count >= self.max_turns
    }

    /// Record a completed turn and trim history to the context window
    pub fn update_state(&mut self, user_text: impl Into<String>, assistant_text: impl Into<String>) {
        self.history.push(Turn::user(user_text));
        self.history.push(Turn::assistant(assistant_text));
        self.turn_count += 1;

        let keep = self.context_window * 2;
        if self.history.len() > keep {
            let excess = self.history.len() - keep;
            self.history.drain(..excess);
        }
    }

    /// Clear history and the turn counter together
    pub fn reset(&mut self) {
        self.history.clear();
        self.turn_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::default();
        assert!(session.history().is_empty());
        assert_eq!(session.turn_count(), 0);
        assert_eq!(session.max_turns(), 20);
        assert_eq!(session.context_window(), 5);
        assert_eq!(session.remaining_turns(), 20);
    }

    #[test]
    fn test_update_state_appends_pair() {
        let mut session = Session::new(10, 2);
        session.update_state("hola", "¡hola!");

        assert_eq!(session.turn_count(), 1);
        assert_eq!(
            session.history(),
            &[Turn::user("hola"), Turn::assistant("¡hola!")]
        );
    }

    #[test]
    fn test_window_drops_oldest_pairs() {
        let mut session = Session::new(10, 2);
        for i in 0..4 {
            session.update_state(format!("u{}", i), format!("a{}", i));
        }

        let contents: Vec<&str> = session.history().iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["u2", "a2", "u3", "a3"]);
        assert_eq!(session.turn_count(), 4);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = Session::new(3, 2);
        session.update_state("a", "b");
        session.update_state("c", "d");
        session.reset();

        assert!(session.history().is_empty());
        assert_eq!(session.turn_count(), 0);
        assert!(!session.limit_reached());
    }

    #[test]
    fn test_limit_reached() {
        let mut session = Session::new(2, 5);
        session.update_state("a", "b");
        assert!(!session.limit_reached());
        session.update_state("c", "d");
        assert!(session.limit_reached());
        assert_eq!(session.remaining_turns(), 0);
    }

    #[test]
    fn test_turn_converts_to_message() {
        let message = Message::from(&Turn::assistant("ok"));
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, "ok");
    }

    proptest! {
        #[test]
        fn prop_history_bounded_and_pairs_intact(window in 1usize..8, updates in 0usize..40) {
            let mut session = Session::new(1000, window);
            for i in 0..updates {
                session.update_state(format!("u{}", i), format!("a{}", i));
            }

            let history = session.history();
            prop_assert_eq!(history.len(), (2 * updates).min(2 * window));
            prop_assert_eq!(session.turn_count() as usize, updates);
            if let Some(first) = history.first() {
                prop_assert_eq!(first.role, Speaker::User);
            }
            for pair in history.chunks(2) {
                prop_assert_eq!(pair[0].role, Speaker::User);
                prop_assert_eq!(pair[1].role, Speaker::Assistant);
                prop_assert_eq!(&pair[0].content[1..], &pair[1].content[1..]);
            }
        }
    }
}
