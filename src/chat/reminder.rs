// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Date extraction and validation for reminders
//!
//! Accepts `D[D]/M[M]/YYYY` or `D[D] de <mes> [de YYYY]`. Month names go
//! through a [`MonthResolver`]; the default one tolerates small typos.

use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use regex::{Captures, Match, Regex};
use thiserror::Error;

/// Spanish month names, including the `setiembre` variant
const MONTHS: &[(&str, u32)] = &[
    ("enero", 1),
    ("febrero", 2),
    ("marzo", 3),
    ("abril", 4),
    ("mayo", 5),
    ("junio", 6),
    ("julio", 7),
    ("agosto", 8),
    ("septiembre", 9),
    ("setiembre", 9),
    ("octubre", 10),
    ("noviembre", 11),
    ("diciembre", 12),
];

/// Default minimum similarity for a fuzzy month match
pub const DEFAULT_MONTH_THRESHOLD: f64 = 0.75;

/// Why a reminder payload was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReminderError {
    #[error(
        "Para crear un recordatorio necesito una fecha. \
         Escríbela como DD/MM/AAAA o como '5 de diciembre'."
    )]
    MissingDate,

    #[error(
        "No pude interpretar la fecha del recordatorio. \
         Usa el formato DD/MM/AAAA o '5 de diciembre de 2025'."
    )]
    UnreadableDate,

    #[error(
        "La fecha del recordatorio ({}) ya pasó. Indica una fecha futura.",
        .0.format("%d/%m/%Y")
    )]
    PastDate(NaiveDate),
}

/// Maps a (possibly misspelled) month name to its number
pub trait MonthResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Option<u32>;
}

/// Exact lookup, then closest name by normalized Levenshtein similarity.
///
/// Heuristic: a name is accepted only when the best similarity reaches
/// `threshold`.
#[derive(Debug, Clone)]
pub struct FuzzyMonthResolver {
    threshold: f64,
}

impl Default for FuzzyMonthResolver {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MONTH_THRESHOLD,
        }
    }
}

impl FuzzyMonthResolver {
    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl MonthResolver for FuzzyMonthResolver {
    fn resolve(&self, name: &str) -> Option<u32> {
        let name = name.to_lowercase();
        if let Some((_, month)) = MONTHS.iter().find(|(candidate, _)| *candidate == name) {
            return Some(*month);
        }

        let (candidate, month, score) = MONTHS
            .iter()
            .map(|(candidate, month)| (*candidate, *month, similarity(&name, candidate)))
            .max_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal))?;

        if score >= self.threshold {
            tracing::debug!(input = %name, matched = candidate, score, "fuzzy month match");
            Some(month)
        } else {
            None
        }
    }
}

/// Exact month-name lookup only
#[derive(Debug, Clone, Default)]
pub struct ExactMonthResolver;

impl MonthResolver for ExactMonthResolver {
    fn resolve(&self, name: &str) -> Option<u32> {
        let name = name.to_lowercase();
        MONTHS
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, month)| *month)
    }
}

/// `1 - distance / max_len`, computed over chars
fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(&a, &b) as f64 / longest as f64
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Both date forms as alternatives, so matches come back in text order
fn date_regex() -> &'static Regex {
    static DATE: OnceLock<Regex> = OnceLock::new();
    DATE.get_or_init(|| {
        Regex::new(concat!(
            r"\b(?P<sd>\d{1,2})/(?P<sm>\d{1,2})/(?P<sy>\d{4})\b",
            r"|\b(?P<wd>\d{1,2})\s+de\s+(?P<wm>\p{L}+)(?:\s+de\s+(?P<wy>\d{4})\b)?",
        ))
        .unwrap()
    })
}

/// Extracts the reminder date and checks it is not in the past
pub struct ReminderValidator {
    resolver: Box<dyn MonthResolver>,
}

impl Default for ReminderValidator {
    fn default() -> Self {
        Self::new(Box::new(FuzzyMonthResolver::default()))
    }
}

impl ReminderValidator {
    pub fn new(resolver: Box<dyn MonthResolver>) -> Self {
        Self { resolver }
    }

    /// Parse the first date expression in `payload` and compare it with `today`
    pub fn validate(&self, payload: &str, today: NaiveDate) -> Result<NaiveDate, ReminderError> {
        let date = self.extract(&payload.to_lowercase(), today)?;

        if date < today {
            return Err(ReminderError::PastDate(date));
        }

        Ok(date)
    }

    /// First candidate in text order that forms a real date wins. Candidates
    /// that don't (e.g. "5 de la tarde") are skipped.
    fn extract(&self, text: &str, today: NaiveDate) -> Result<NaiveDate, ReminderError> {
        let mut candidates = 0;

        for caps in date_regex().captures_iter(text) {
            candidates += 1;
            if let Some(date) = self.candidate_date(&caps, today) {
                return Ok(date);
            }
            tracing::debug!(candidate = &caps[0], "skipping unreadable date candidate");
        }

        if candidates == 0 {
            Err(ReminderError::MissingDate)
        } else {
            Err(ReminderError::UnreadableDate)
        }
    }

    fn candidate_date(&self, caps: &Captures<'_>, today: NaiveDate) -> Option<NaiveDate> {
        if let Some(day) = caps.name("sd") {
            let month = parse_number(caps.name("sm"))?;
            let year = parse_number(caps.name("sy"))?;
            return NaiveDate::from_ymd_opt(year as i32, month, parse_number(Some(day))?);
        }

        let day = parse_number(caps.name("wd"))?;
        let month = self.resolver.resolve(caps.name("wm")?.as_str())?;
        let year = match caps.name("wy") {
            Some(year) => parse_number(Some(year))? as i32,
            None => today.year(),
        };
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

fn parse_number(token: Option<Match<'_>>) -> Option<u32> {
    token.and_then(|t| t.as_str().parse().ok())
}
