//! English-language heuristic used to gate submissions
//!
//! The gate is deliberately crude: text with any non-ASCII character is
//! rejected outright, otherwise the share of whitespace-separated tokens found
//! in a small reference word set decides the verdict.

use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::debug;

use crate::core::config::ClassifierConfig;
use crate::core::models::LanguageVerdict;

/// Minimum share of reference words for text to count as English
pub const DEFAULT_ENGLISH_RATIO: f64 = 0.3;

/// Common English function words and issue-tracker terms
pub const DEFAULT_REFERENCE_WORDS: &[&str] = &[
    "the", "be", "to", "of", "and", "a", "in", "that", "have", "i", "it",
    "for", "not", "on", "with", "he", "as", "you", "do", "at", "this",
    "but", "his", "by", "from", "they", "we", "say", "her", "she", "or",
    "will", "my", "all", "would", "there", "their", "is", "bug", "issue",
    "error", "problem", "feature", "request", "can", "please", "when", "what",
    "why", "how", "does", "work", "need", "want", "should", "could",
];

fn whitespace() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"))
}

/// Breakdown of how a verdict was reached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageReport {
    pub verdict: LanguageVerdict,
    pub matched_tokens: usize,
    pub total_tokens: usize,
    /// Absent when the ratio was never computed (empty or non-ASCII text)
    pub ratio: Option<f64>,
}

impl LanguageReport {
    fn rejected() -> Self {
        Self {
            verdict: LanguageVerdict::NonEnglish,
            matched_tokens: 0,
            total_tokens: 0,
            ratio: None,
        }
    }
}

/// Heuristic English detector
#[derive(Debug, Clone)]
pub struct LanguageGate {
    reference_words: HashSet<String>,
    threshold: f64,
}

impl Default for LanguageGate {
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE_WORDS.iter().copied(), DEFAULT_ENGLISH_RATIO)
    }
}

impl LanguageGate {
    /// Create a gate from a word list and a ratio threshold
    pub fn new<I, S>(reference_words: I, threshold: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let reference_words = reference_words
            .into_iter()
            .map(|w| w.as_ref().to_lowercase())
            .collect();

        Self {
            reference_words,
            threshold,
        }
    }

    /// Create from configuration
    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(&config.reference_words, config.english_ratio)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Classify text, keeping the token counts behind the verdict
    pub fn assess(&self, text: &str) -> LanguageReport {
        if text.is_empty() || !text.is_ascii() {
            return LanguageReport::rejected();
        }

        let lowered = text.to_ascii_lowercase();
        let mut total_tokens = 0;
        let mut matched_tokens = 0;
        for token in whitespace().split(&lowered) {
            total_tokens += 1;
            if self.reference_words.contains(token) {
                matched_tokens += 1;
            }
        }

        let ratio = matched_tokens as f64 / total_tokens as f64;
        let verdict = if ratio >= self.threshold {
            LanguageVerdict::English
        } else {
            LanguageVerdict::NonEnglish
        };

        debug!(
            "Language gate: {}/{} reference tokens (ratio {:.2}) -> {}",
            matched_tokens, total_tokens, ratio, verdict
        );

        LanguageReport {
            verdict,
            matched_tokens,
            total_tokens,
            ratio: Some(ratio),
        }
    }

    /// Classify text as English or not
    pub fn classify(&self, text: &str) -> LanguageVerdict {
        self.assess(text).verdict
    }

    pub fn is_english(&self, text: &str) -> bool {
        self.classify(text) == LanguageVerdict::English
    }
}
