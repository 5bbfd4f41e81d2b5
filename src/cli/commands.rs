//! CLI command definitions and handlers

use clap::Subcommand;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::config::ClassifierConfig;
use crate::core::form::{FormState, RequestState, Submitter};
use crate::core::language::LanguageGate;
use crate::core::models::{IssueLabel, PredictionResult};

/// Commands for Issue Classifier
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify an issue
    Predict {
        /// Issue title (required)
        #[arg(short, long)]
        title: String,

        /// Issue body
        #[arg(short, long, conflicts_with = "body_file", required_unless_present = "body_file")]
        body: Option<String>,

        /// Read the issue body from a file
        #[arg(long)]
        body_file: Option<PathBuf>,
    },

    /// Run the English-language check only
    Detect {
        /// Text to check
        #[arg(short, long)]
        text: String,
    },

    /// Send the correct label for an earlier prediction
    Correct {
        /// Prediction id returned by `predict`
        #[arg(long)]
        id: String,

        /// Correct label: enhancement, bug or question
        #[arg(short, long)]
        label: IssueLabel,
    },
}

/// Handle predict command
pub async fn handle_predict(
    config: ClassifierConfig,
    title: String,
    body: Option<String>,
    body_file: Option<PathBuf>,
) -> anyhow::Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};
    use tracing::info;

    let body = match (body, body_file) {
        (Some(body), _) => body,
        (None, Some(path)) => tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?,
        (None, None) => anyhow::bail!("an issue body is required"),
    };

    info!("Submitting issue to {}", config.predict_url());

    let submitter = Submitter::from_config(config)?;
    let state = FormState::new().edit_title(title).edit_body(body);

    let shutdown = submitter.shutdown_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.cancel();
        }
    });

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Predicting...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let state = submitter.run(state).await;
    pb.finish_and_clear();

    match state.request() {
        RequestState::Succeeded(result) => {
            print_prediction(result);
            Ok(())
        }
        RequestState::Failed(message) => anyhow::bail!("{}", message),
        RequestState::Idle => anyhow::bail!("Both title and body are required"),
        RequestState::InFlight => anyhow::bail!("request did not complete"),
    }
}

/// Handle detect command
pub async fn handle_detect(config: ClassifierConfig, text: String) -> anyhow::Result<()> {
    let gate = LanguageGate::from_config(&config);
    let report = gate.assess(&text);

    println!("Verdict: {}", report.verdict);
    println!("   Reference tokens: {}/{}", report.matched_tokens, report.total_tokens);
    match report.ratio {
        Some(ratio) => println!("   Ratio: {:.2} (threshold {:.2})", ratio, gate.threshold()),
        None => println!("   Ratio: n/a (empty or non-ASCII text)"),
    }

    Ok(())
}

/// Handle correct command
pub async fn handle_correct(
    config: ClassifierConfig,
    id: String,
    label: IssueLabel,
) -> anyhow::Result<()> {
    use crate::core::client::PredictionClient;
    use tracing::info;

    info!("Correcting prediction {} to {}", id, label);

    let client = PredictionClient::new(config)?;
    let result = client.correct(&id, label).await?;

    println!("✅ Correction recorded for {}", result.id);
    println!("   Original: {}", result.original_label);
    println!("   Corrected: {}", result.corrected_label);

    Ok(())
}

fn print_prediction(result: &PredictionResult) {
    println!("Predicted label:");
    for label in IssueLabel::ALL {
        let mark = if label == result.predicted_label { "(x)" } else { "( )" };
        println!("   {} {}", mark, label);
    }
    println!(
        "Model confidence: {} ({})",
        result.confidence_percent(),
        result.confidence_band()
    );
    if let Some(id) = &result.id {
        println!("Prediction id: {}", id);
    }
}
