//! CLI command implementations

pub mod code;
pub mod config;
pub mod qr;
pub mod scan;
pub mod start;
pub mod validate;

use crate::simulator::{Ending, SimulatedEngine, TerminalHost};
use crate::ui;
use anyhow::{Context, Result};
use mivip_bridge::{
    BridgeConfig, RequestState, RequestStatus, VerificationBridge, VerificationOutcome,
    VerificationResult,
};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

/// Simulated engine behaviour, shared by the commands that run a verification.
#[derive(Clone, Debug, clap::Args)]
pub struct SimulationArgs {
    /// Milliseconds the simulated engine takes to decide
    #[arg(long, default_value = "1500")]
    pub delay_ms: u64,

    /// Result the simulated engine reports
    #[arg(long, default_value = "PASSED")]
    pub result: String,

    /// Report this engine error instead of a result
    #[arg(long, conflicts_with = "hang")]
    pub fail: Option<String>,

    /// Never answer, to demonstrate the request timeout
    #[arg(long)]
    pub hang: bool,
}

impl SimulationArgs {
    pub fn ending(&self) -> Ending {
        match (&self.fail, self.hang) {
            (Some(message), _) => Ending::Error(message.clone()),
            (None, true) => Ending::Hang,
            (None, false) => Ending::Result(self.result.clone()),
        }
    }

    pub fn engine(&self) -> SimulatedEngine {
        SimulatedEngine::new(Duration::from_millis(self.delay_ms), self.ending())
    }
}

/// Effective configuration: file (or defaults), then environment, then flags.
pub fn load_config(path: Option<&Path>, timeout_secs: Option<u64>) -> Result<BridgeConfig> {
    let config = match path {
        Some(path) => BridgeConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => BridgeConfig::default(),
    };
    let mut config = config
        .apply_env_overrides()
        .context("Invalid environment override")?;

    if let Some(secs) = timeout_secs {
        config = config.with_timeout(secs);
        config.validate()?;
    }
    Ok(config)
}

/// Build a bridge around `engine` with the terminal as presentation host.
pub fn build_bridge(config: BridgeConfig, engine: SimulatedEngine) -> Result<VerificationBridge> {
    let bridge = VerificationBridge::new(Arc::new(engine), Arc::new(TerminalHost), config)?;
    Ok(bridge)
}

/// Run a bridge operation with a spinner that follows the request's progress.
///
/// Prints the error in host-app form and returns it if the operation fails.
/// With `verbose`, every state change is also printed above the spinner.
pub async fn drive<F>(
    bridge: &VerificationBridge,
    label: &str,
    operation: F,
    verbose: bool,
) -> Result<VerificationOutcome>
where
    F: Future<Output = VerificationResult>,
{
    let mut updates = bridge.subscribe();
    let spinner = ui::spinner(label);
    tokio::pin!(operation);

    let result = loop {
        tokio::select! {
            result = &mut operation => break result,
            update = updates.recv() => match update {
                Ok(update) => {
                    if verbose {
                        spinner.println(format!("  {} {:?}", update.request_id, update.state));
                    }
                    if let RequestState::Loading { status: Some(status) } = &update.state {
                        spinner.set_message(format!("{} ({})", label, describe_status(status)));
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "status updates lagged");
                }
                Err(RecvError::Closed) => break (&mut operation).await,
            },
        }
    };
    spinner.finish_and_clear();

    match result {
        Ok(outcome) => Ok(outcome),
        Err(err) => {
            ui::bridge_error(&err, verbose);
            Err(err.into())
        }
    }
}

/// Human-readable progress status.
pub fn describe_status(status: &RequestStatus) -> String {
    match status {
        RequestStatus::Pending => "waiting for the user".to_string(),
        RequestStatus::InProgress => "in progress".to_string(),
        RequestStatus::Submitted => "submitted, awaiting decision".to_string(),
        RequestStatus::Other(other) => other.to_lowercase(),
    }
}

/// Print a successful verification.
pub fn print_outcome(outcome: &VerificationOutcome, verbose: bool) {
    ui::success("Verification complete");
    ui::key_value("Request", outcome.request_id.as_str());
    ui::key_value("Result", &outcome.result);
    if verbose {
        ui::key_value("Completed at", &outcome.completed_at.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(fail: Option<&str>, hang: bool) -> SimulationArgs {
        SimulationArgs {
            delay_ms: 10,
            result: "PASSED".to_string(),
            fail: fail.map(str::to_string),
            hang,
        }
    }

    #[test]
    fn test_ending_selection() {
        assert_eq!(args(None, false).ending(), Ending::Result("PASSED".into()));
        assert_eq!(args(None, true).ending(), Ending::Hang);
        assert_eq!(args(Some("boom"), false).ending(), Ending::Error("boom".into()));
    }

    #[test]
    fn test_describe_status() {
        assert_eq!(describe_status(&RequestStatus::InProgress), "in progress");
        assert_eq!(
            describe_status(&RequestStatus::Other("AWAITING_REVIEW".into())),
            "awaiting_review"
        );
    }

    #[test]
    fn test_timeout_flag_overrides_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"request_timeout_secs": 30}}"#).unwrap();

        let config = load_config(Some(file.path()), None).unwrap();
        assert_eq!(config.request_timeout_secs, 30);

        let config = load_config(Some(file.path()), Some(5)).unwrap();
        assert_eq!(config.request_timeout_secs, 5);

        assert!(load_config(None, Some(0)).is_err());
    }
}
