//! Form state and submission driver
//!
//! [`FormState`] is a plain value moved through pure transitions. The async
//! side lives in [`Submitter`], which gates the text, talks to the service and
//! folds the outcome back into the state.

use std::fmt;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::client::PredictionClient;
use crate::core::config::ClassifierConfig;
use crate::core::errors::{ClassifierError, Result};
use crate::core::language::LanguageGate;
use crate::core::models::{IssueText, LanguageVerdict, PredictionResult};

/// Lifecycle of one submission
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestState {
    #[default]
    Idle,
    InFlight,
    Succeeded(PredictionResult),
    Failed(String),
}

impl RequestState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, RequestState::InFlight)
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestState::Idle => write!(f, "idle"),
            RequestState::InFlight => write!(f, "in flight"),
            RequestState::Succeeded(_) => write!(f, "succeeded"),
            RequestState::Failed(_) => write!(f, "failed"),
        }
    }
}

/// Ticket handed out by [`FormState::submit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub revision: u64,
    pub text: IssueText,
}

/// Title, body and request status of the issue form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    text: IssueText,
    request: RequestState,
    revision: u64,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.text.title
    }

    pub fn body(&self) -> &str {
        &self.text.body
    }

    pub fn request(&self) -> &RequestState {
        &self.request
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the title; any previous outcome is discarded
    pub fn edit_title(self, title: impl Into<String>) -> Self {
        let text = IssueText {
            title: title.into(),
            ..self.text
        };
        Self::edited(text, self.revision)
    }

    /// Replace the body; any previous outcome is discarded
    pub fn edit_body(self, body: impl Into<String>) -> Self {
        let text = IssueText {
            body: body.into(),
            ..self.text
        };
        Self::edited(text, self.revision)
    }

    fn edited(text: IssueText, revision: u64) -> Self {
        Self {
            text,
            request: RequestState::Idle,
            revision: revision + 1,
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.request.is_in_flight() && self.text.is_complete()
    }

    /// Move to `InFlight` and hand out a ticket, if submitting is allowed
    pub fn submit(self) -> (Self, Option<Submission>) {
        if !self.can_submit() {
            return (self, None);
        }

        let revision = self.revision + 1;
        let submission = Submission {
            revision,
            text: self.text.clone(),
        };
        let state = Self {
            text: self.text,
            request: RequestState::InFlight,
            revision,
        };
        (state, Some(submission))
    }

    /// Record the outcome of a submission; stale outcomes are ignored
    pub fn resolve(self, revision: u64, outcome: Result<PredictionResult>) -> Self {
        if !self.request.is_in_flight() || self.revision != revision {
            debug!(
                "Ignoring outcome for revision {} (current {}, {})",
                revision, self.revision, self.request
            );
            return self;
        }

        let request = match outcome {
            Ok(result) => RequestState::Succeeded(result),
            Err(e) => RequestState::Failed(e.to_string()),
        };

        Self { request, ..self }
    }
}

/// Drives submissions: language gate, prediction call, cancellation
#[derive(Debug)]
pub struct Submitter {
    gate: LanguageGate,
    client: PredictionClient,
    shutdown: CancellationToken,
    current: Mutex<Option<CancellationToken>>,
}

impl Submitter {
    pub fn new(gate: LanguageGate, client: PredictionClient) -> Self {
        Self {
            gate,
            client,
            shutdown: CancellationToken::new(),
            current: Mutex::new(None),
        }
    }

    /// Build gate and client from one configuration
    pub fn from_config(config: ClassifierConfig) -> Result<Self> {
        let gate = LanguageGate::from_config(&config);
        let client = PredictionClient::new(config)?;
        Ok(Self::new(gate, client))
    }

    pub fn gate(&self) -> &LanguageGate {
        &self.gate
    }

    pub fn client(&self) -> &PredictionClient {
        &self.client
    }

    /// Gate the text and, if it passes, request a prediction.
    ///
    /// A newer call cancels the one still in flight, whether or not it
    /// passes the gate itself.
    pub async fn submit(&self, text: &IssueText) -> Result<PredictionResult> {
        if !text.is_complete() {
            return Err(ClassifierError::IncompleteIssue);
        }

        // even a rejected submission replaces the one in flight
        let token = self.supersede().await;

        let combined = text.combined();
        let report = self.gate.assess(&combined);
        if report.verdict != LanguageVerdict::English {
            warn!(
                "Rejected submission: {}/{} reference tokens",
                report.matched_tokens, report.total_tokens
            );
            return Err(ClassifierError::LanguageRejection);
        }

        self.client.predict_with_cancel(&combined, &token).await
    }

    /// Run one full submit cycle over the form state
    pub async fn run(&self, state: FormState) -> FormState {
        let (state, submission) = state.submit();
        let Some(submission) = submission else {
            debug!("Form not ready for submission ({})", state.request());
            return state;
        };

        let outcome = self.submit(&submission.text).await;
        if let Err(e) = &outcome {
            info!("Submission {} failed: {}", submission.revision, e);
        }
        state.resolve(submission.revision, outcome)
    }

    /// Cancel whatever is in flight; used on teardown
    pub fn cancel(&self) {
        self.shutdown.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Token for the teardown of this submitter
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    async fn supersede(&self) -> CancellationToken {
        let token = self.shutdown.child_token();
        let mut current = self.current.lock().await;
        if let Some(previous) = current.replace(token.clone()) {
            if !previous.is_cancelled() {
                debug!("Superseding in-flight submission");
            }
            previous.cancel();
        }
        token
    }
}

impl Drop for Submitter {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::IssueLabel;

    fn prediction() -> PredictionResult {
        PredictionResult {
            id: None,
            predicted_label: IssueLabel::Bug,
            confidence_score: 0.92,
        }
    }

    fn filled() -> FormState {
        FormState::new()
            .edit_title("Crash on login")
            .edit_body("the app crashes when I click the button")
    }

    #[test]
    fn test_cannot_submit_incomplete_form() {
        let state = FormState::new().edit_title("only a title");
        let (state, submission) = state.submit();
        assert!(submission.is_none());
        assert_eq!(state.request(), &RequestState::Idle);
    }

    #[test]
    fn test_submit_moves_to_in_flight() {
        let (state, submission) = filled().submit();
        let submission = submission.unwrap();
        assert!(state.request().is_in_flight());
        assert_eq!(submission.revision, state.revision());
        assert_eq!(
            submission.text.combined(),
            "Crash on login\nthe app crashes when I click the button"
        );

        // second submit while in flight is refused
        let (state, again) = state.submit();
        assert!(again.is_none());
        assert!(state.request().is_in_flight());
    }

    #[test]
    fn test_resolve_success_and_failure() {
        let (state, submission) = filled().submit();
        let state = state.resolve(submission.unwrap().revision, Ok(prediction()));
        assert_eq!(state.request(), &RequestState::Succeeded(prediction()));

        let (state, submission) = state.edit_body("the bug is back").submit();
        let state = state.resolve(
            submission.unwrap().revision,
            Err(ClassifierError::TransportFailure {
                status: Some(500),
                detail: String::new(),
            }),
        );
        assert_eq!(state.request(), &RequestState::Failed("request failed".to_string()));
    }

    #[test]
    fn test_edit_resets_to_idle() {
        let (state, submission) = filled().submit();
        let state = state.resolve(submission.unwrap().revision, Ok(prediction()));
        let state = state.edit_title("Crash on logout");
        assert_eq!(state.request(), &RequestState::Idle);

        let (state, submission) = state.submit();
        let state = state.resolve(submission.unwrap().revision, Err(ClassifierError::Cancelled));
        assert!(matches!(state.request(), RequestState::Failed(_)));
        let state = state.edit_body("new body");
        assert_eq!(state.request(), &RequestState::Idle);
    }

    #[test]
    fn test_stale_outcome_ignored() {
        let (state, submission) = filled().submit();
        let revision = submission.unwrap().revision;

        // edit while the request is out
        let state = state.edit_body("the error is different now");
        let state = state.resolve(revision, Ok(prediction()));
        assert_eq!(state.request(), &RequestState::Idle);
    }

    #[tokio::test]
    async fn test_language_rejection_skips_network() {
        // nothing listens on this port; a network call would fail differently
        let config = ClassifierConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let submitter = Submitter::from_config(config).unwrap();
        let text = IssueText::new("Titre", "ceci n'est pas anglais");

        let result = submitter.submit(&text).await;
        assert!(matches!(result, Err(ClassifierError::LanguageRejection)));
    }

    #[tokio::test]
    async fn test_run_language_rejection_fails_form() {
        let submitter = Submitter::from_config(ClassifierConfig::default()).unwrap();
        let state = FormState::new().edit_title("Fehler").edit_body("Die Anmeldung schlägt fehl");

        let state = submitter.run(state).await;
        assert_eq!(
            state.request(),
            &RequestState::Failed(crate::core::errors::LANGUAGE_REJECTION_MESSAGE.to_string())
        );
    }

    #[tokio::test]
    async fn test_run_incomplete_form_stays_idle() {
        let submitter = Submitter::from_config(ClassifierConfig::default()).unwrap();
        let state = submitter.run(FormState::new().edit_title("the bug")).await;
        assert_eq!(state.request(), &RequestState::Idle);
    }
}
