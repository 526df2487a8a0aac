//! Simulated verification engine and terminal presentation host.
//!
//! Stands in for the vendor SDK so the bridge can be exercised from a
//! terminal. A presented request walks through the engine's progress
//! statuses and then reports a result, an error, or nothing at all.

use async_trait::async_trait;
use mivip_bridge::{
    BridgeError, HubSettings, PresentationHost, RequestId, RequestStatus, ScanOutcome,
    ScreenContext, StatusDispatcher, VerificationEngine,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// How a presented request ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ending {
    /// Report this result.
    Result(String),
    /// Report an engine error.
    Error(String),
    /// Never answer.
    Hang,
}

/// What the simulated scanner returns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanScript {
    /// Scan this text.
    Payload(String),
    /// The user closes the scanner.
    Cancel,
    /// Camera access is denied.
    DenyCamera,
    /// Ask on the terminal; empty input cancels.
    Prompt,
}

/// Scripted stand-in for the verification engine.
pub struct SimulatedEngine {
    delay: Duration,
    ending: Ending,
    scan: ScanScript,
    codes: HashMap<String, String>,
    settings: Mutex<Option<HubSettings>>,
}

impl SimulatedEngine {
    pub fn new(delay: Duration, ending: Ending) -> Self {
        Self {
            delay,
            ending,
            scan: ScanScript::Cancel,
            codes: HashMap::new(),
            settings: Mutex::new(None),
        }
    }

    pub fn with_scan(mut self, scan: ScanScript) -> Self {
        self.scan = scan;
        self
    }

    /// Register a short code the engine can resolve.
    pub fn with_code(mut self, code: impl Into<String>, request_id: impl Into<String>) -> Self {
        self.codes.insert(code.into(), request_id.into());
        self
    }

    /// Settings applied at bridge construction, if any.
    pub fn applied_settings(&self) -> Option<HubSettings> {
        self.settings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl VerificationEngine for SimulatedEngine {
    fn configure(&self, settings: &HubSettings) -> Result<(), BridgeError> {
        tracing::debug!(?settings, "simulated engine configured");
        *self.settings.lock().unwrap_or_else(|e| e.into_inner()) = Some(settings.clone());
        Ok(())
    }

    fn present_request(
        &self,
        screen: &ScreenContext,
        request_id: &RequestId,
        events: StatusDispatcher,
    ) -> Result<(), BridgeError> {
        tracing::debug!(screen = %screen.token(), request_id = %request_id, "simulated presentation");

        // The real engine reports identifiers uppercase.
        let raw_id = request_id.as_str().to_uppercase();
        let step = self.delay / 3;
        let ending = self.ending.clone();

        tokio::spawn(async move {
            for status in [RequestStatus::Pending, RequestStatus::InProgress, RequestStatus::Submitted] {
                tokio::time::sleep(step).await;
                events.status(Some(&raw_id), Some(status), None);
            }
            match ending {
                Ending::Result(result) => {
                    events.status(Some(&raw_id), None, Some(result));
                }
                Ending::Error(message) => {
                    events.error(message);
                }
                Ending::Hang => {}
            }
        });
        Ok(())
    }

    async fn present_scanner(&self, _screen: &ScreenContext) -> ScanOutcome {
        match &self.scan {
            ScanScript::Payload(payload) => ScanOutcome::Scanned(payload.clone()),
            ScanScript::Cancel => ScanOutcome::Cancelled,
            ScanScript::DenyCamera => ScanOutcome::PermissionDenied,
            ScanScript::Prompt => prompt_for_scan().await,
        }
    }

    async fn request_id_from_code(&self, code: &str) -> Result<Option<String>, BridgeError> {
        tokio::time::sleep(self.delay / 4).await;
        Ok(self.codes.get(code).cloned())
    }
}

async fn prompt_for_scan() -> ScanOutcome {
    if !crate::ui::is_interactive() {
        return ScanOutcome::Cancelled;
    }
    let answer = tokio::task::spawn_blocking(|| crate::ui::input("Scanned QR text (empty to cancel)"))
        .await;
    match answer {
        Ok(Ok(text)) if !text.trim().is_empty() => ScanOutcome::Scanned(text),
        _ => ScanOutcome::Cancelled,
    }
}

/// Presentation host backed by the terminal; always has a screen.
#[derive(Debug, Default)]
pub struct TerminalHost;

impl PresentationHost for TerminalHost {
    fn top_screen(&self) -> Option<ScreenContext> {
        Some(ScreenContext::new("terminal"))
    }
}
