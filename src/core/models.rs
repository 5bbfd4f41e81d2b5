//! Core data models for classification

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::errors::{ClassifierError, Result};

/// Label predicted for an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueLabel {
    Enhancement,
    Bug,
    Question,
}

impl IssueLabel {
    /// All labels in display order
    pub const ALL: [IssueLabel; 3] = [IssueLabel::Enhancement, IssueLabel::Bug, IssueLabel::Question];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueLabel::Enhancement => "enhancement",
            IssueLabel::Bug => "bug",
            IssueLabel::Question => "question",
        }
    }
}

impl fmt::Display for IssueLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueLabel {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        IssueLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == normalized)
            .ok_or_else(|| ClassifierError::UnknownLabel {
                label: s.to_string(),
            })
    }
}

/// Title and body of one submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueText {
    pub title: String,
    pub body: String,
}

impl IssueText {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Text sent to the service: title and body joined by a newline
    pub fn combined(&self) -> String {
        format!("{}\n{}", self.title, self.body)
    }

    /// Both fields are required before submitting
    pub fn is_complete(&self) -> bool {
        !self.title.is_empty() && !self.body.is_empty()
    }
}

/// Outcome of the language gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LanguageVerdict {
    English,
    NonEnglish,
}

impl fmt::Display for LanguageVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageVerdict::English => write!(f, "en"),
            LanguageVerdict::NonEnglish => write!(f, "non-en"),
        }
    }
}

/// Display band for a confidence score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            ConfidenceBand::High
        } else if score >= 0.5 {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }
}

impl fmt::Display for ConfidenceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceBand::High => write!(f, "high"),
            ConfidenceBand::Medium => write!(f, "medium"),
            ConfidenceBand::Low => write!(f, "low"),
        }
    }
}

/// Prediction request payload
#[derive(Debug, Clone, Serialize)]
pub struct PredictionRequest<'a> {
    pub issue_body: &'a str,
}

/// Prediction returned by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Id of the stored prediction, used for corrections
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub predicted_label: IssueLabel,
    pub confidence_score: f64,
}

impl PredictionResult {
    /// Reject scores the service could not legitimately have produced
    pub fn validate(&self) -> Result<()> {
        if !self.confidence_score.is_finite() || !(0.0..=1.0).contains(&self.confidence_score) {
            return Err(ClassifierError::MalformedResponse {
                message: format!("confidence_score out of range: {}", self.confidence_score),
            });
        }
        Ok(())
    }

    pub fn confidence_band(&self) -> ConfidenceBand {
        ConfidenceBand::from_score(self.confidence_score)
    }

    /// Confidence as a percentage with one decimal, e.g. `92.0%`
    pub fn confidence_percent(&self) -> String {
        format!("{:.1}%", self.confidence_score * 100.0)
    }
}

/// Correction request payload
#[derive(Debug, Clone, Serialize)]
pub struct CorrectionRequest<'a> {
    pub id: &'a str,
    pub corrected_label: IssueLabel,
}

/// Correction acknowledged by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionResult {
    pub id: String,
    pub original_label: IssueLabel,
    pub corrected_label: IssueLabel,
}

impl CorrectionResult {
    pub fn was_correct(&self) -> bool {
        self.original_label == self.corrected_label
    }
}
