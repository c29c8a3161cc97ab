// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Intent resolution for user turns
//!
//! Two entry points:
//! - [`classify`] maps explicit slash commands to an [`Intent`]
//! - [`suggest`] proposes a command for free text that looks like one
//!
//! Neither does any language understanding. `suggest` is a substring
//! heuristic over fixed keyword sets.

use std::fmt;

/// Character that starts an explicit command
pub const COMMAND_PREFIX: char = '/';

const SUGGESTION_PREAMBLE: &str = "Puedo ayudarte con estas acciones:\n";

/// Resolved user intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Note,
    Reminder,
    Agenda,
    Search,
    ViewNote,
    Default,
}

impl Intent {
    /// Uppercase label used in logs and the CLI
    pub fn label(&self) -> &'static str {
        match self {
            Intent::Note => "NOTE",
            Intent::Reminder => "REMINDER",
            Intent::Agenda => "AGENDA",
            Intent::Search => "SEARCH",
            Intent::ViewNote => "VIEWNOTE",
            Intent::Default => "DEFAULT",
        }
    }

    /// Intent for an exact command token such as `/nota`
    pub fn from_command(token: &str) -> Option<Self> {
        match token {
            "/nota" => Some(Intent::Note),
            "/recordatorio" => Some(Intent::Reminder),
            "/busqueda" => Some(Intent::Search),
            "/agenda" => Some(Intent::Agenda),
            "/vernota" => Some(Intent::ViewNote),
            _ => None,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Intent plus payload, before any enrichment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub intent: Intent,
    pub payload: String,
}

/// Classify a raw turn by its leading token.
///
/// Command payloads are lower-cased; `Default` keeps the trimmed input in
/// its original case.
pub fn classify(raw: &str) -> ParsedCommand {
    let trimmed = raw.trim();
    let lowered = trimmed.to_lowercase();

    let (token, rest) = match lowered.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest),
        None => (lowered.as_str(), ""),
    };

    match Intent::from_command(token) {
        Some(intent) => ParsedCommand {
            intent,
            payload: rest.trim().to_string(),
        },
        None => ParsedCommand {
            intent: Intent::Default,
            payload: trimmed.to_string(),
        },
    }
}

struct SuggestionRule {
    line: &'static str,
    matches: fn(&str) -> bool,
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| text.contains(kw))
}

fn note_like(t: &str) -> bool {
    contains_any(
        t,
        &["nota", "apuntar", "escribe", "escribir", "apúntame", "anotar"],
    )
}

fn reminder_like(t: &str) -> bool {
    contains_any(
        t,
        &["recordatorio", "recordar", "recuérdame", "avísame", "no olvidar"],
    )
}

fn search_like(t: &str) -> bool {
    contains_any(
        t,
        &[
            "buscar",
            "investigar",
            "averiguar",
            "información sobre",
            "dime sobre",
        ],
    )
}

// "nota" has to co-occur with a viewing verb
fn view_note_like(t: &str) -> bool {
    t.contains("nota") && contains_any(t, &["ver", "mostrar", "muéstrame"])
}

fn agenda_like(t: &str) -> bool {
    contains_any(
        t,
        &["ver agenda", "mostrar agenda", "agenda", "qué tengo pendiente"],
    )
}

const RULES: &[SuggestionRule] = &[
    SuggestionRule {
        line: "Parece que quieres crear una nota.  Usa: /nota <texto>",
        matches: note_like,
    },
    SuggestionRule {
        line: "Parece que quieres crear un recordatorio. Usa: /recordatorio <texto>",
        matches: reminder_like,
    },
    SuggestionRule {
        line: "Parece que quieres hacer una búsqueda. Usa: /busqueda <texto>",
        matches: search_like,
    },
    SuggestionRule {
        line: "Parece que quieres ver una nota. Usa: /vernota <texto>",
        matches: view_note_like,
    },
    SuggestionRule {
        line: "Parece que quieres ver tu agenda. Usa: /agenda",
        matches: agenda_like,
    },
];

/// Suggest slash commands for free text that resembles one.
///
/// Every matching keyword set contributes one line under a shared preamble.
pub fn suggest(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    let lines: Vec<&str> = RULES
        .iter()
        .filter(|rule| (rule.matches)(&lowered))
        .map(|rule| rule.line)
        .collect();

    if lines.is_empty() {
        return None;
    }

    Some(format!("{}{}", SUGGESTION_PREAMBLE, lines.join("\n")))
}
