//! Issue Classifier - client for a remote issue classification service
//!
//! This library gates issue text with a crude English-language heuristic and
//! submits it to a classification endpoint, returning a predicted label and a
//! confidence score.

#![forbid(unsafe_code)]

pub mod cli;
pub mod core;

// Re-export key types for convenience
pub use crate::core::{
    client::PredictionClient,
    config::ClassifierConfig,
    errors::{ClassifierError, Result},
    form::{FormState, RequestState, Submission, Submitter},
    language::{LanguageGate, LanguageReport},
    models::{
        ConfidenceBand, CorrectionResult, IssueLabel, IssueText, LanguageVerdict,
        PredictionResult,
    },
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
