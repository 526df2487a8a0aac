//! Routing of asynchronous engine events to pending requests.
//!
//! The engine reports two kinds of events:
//!
//! - status events, which may name a request and may carry a result;
//! - bare error strings, which name no request.
//!
//! A status event with both an identifier and a non-empty result is terminal
//! for that request. A status event without a result is progress only.
//! Error events cannot be attributed to a request, so they fail every request
//! pending at the time. The engine only shows one verification flow at a time,
//! so in practice that is the request the error belongs to.

use crate::errors::BridgeError;
use crate::registry::PendingRequestRegistry;
use crate::request_id::RequestId;
use crate::state::{RequestStatus, VerificationOutcome};
use serde::{Deserialize, Serialize};

/// Event delivered by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// Status or result for a request.
    Status {
        /// Request the event belongs to, as the engine formats it.
        request_id: Option<String>,
        /// Progress status, if reported.
        status: Option<RequestStatus>,
        /// Result description, present once the request is decided.
        result: Option<String>,
    },
    /// Error without request context.
    Error { message: String },
    /// The user closed the verification screen.
    Dismissed { request_id: String },
}

/// What the dispatcher did with an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// A pending request was resolved.
    Resolved,
    /// Every pending request was failed; carries how many.
    Broadcast(usize),
    /// Recorded as progress; no resolution.
    Progress,
    /// Nothing pending matched; dropped.
    Dropped,
}

/// Routes engine events into a [`PendingRequestRegistry`].
///
/// Cloned into the engine when a request is presented; it is the engine's
/// only way back into the bridge.
#[derive(Clone, Debug)]
pub struct StatusDispatcher {
    registry: PendingRequestRegistry,
}

impl StatusDispatcher {
    pub fn new(registry: PendingRequestRegistry) -> Self {
        Self { registry }
    }

    /// Handle any engine event.
    pub fn dispatch(&self, event: EngineEvent) -> Dispatch {
        match event {
            EngineEvent::Status {
                request_id,
                status,
                result,
            } => self.status(request_id.as_deref(), status, result),
            EngineEvent::Error { message } => self.error(message),
            EngineEvent::Dismissed { request_id } => self.dismissed(&request_id),
        }
    }

    /// Handle a status event.
    pub fn status(
        &self,
        request_id: Option<&str>,
        status: Option<RequestStatus>,
        result: Option<String>,
    ) -> Dispatch {
        let Some(id) = request_id.and_then(|raw| self.identify(raw)) else {
            tracing::debug!("status event without a usable request ID");
            return Dispatch::Dropped;
        };

        match result.filter(|r| !r.trim().is_empty()) {
            Some(result) => {
                tracing::info!(request_id = %id, result = %result, "engine reported result");
                let outcome = VerificationOutcome::new(id.clone(), result);
                if self.registry.resolve_success(&id, outcome) {
                    Dispatch::Resolved
                } else {
                    Dispatch::Dropped
                }
            }
            None => {
                if self.registry.report_progress(&id, status) {
                    Dispatch::Progress
                } else {
                    Dispatch::Dropped
                }
            }
        }
    }

    /// Handle an error event that names no request.
    pub fn error(&self, message: impl Into<String>) -> Dispatch {
        let message = message.into();
        tracing::warn!(error = %message, "engine error, failing all pending requests");
        let failed = self
            .registry
            .resolve_all_failure(BridgeError::EngineError(message));
        Dispatch::Broadcast(failed)
    }

    /// Handle the user closing the verification screen.
    pub fn dismissed(&self, request_id: &str) -> Dispatch {
        match self.identify(request_id) {
            Some(id) if self.registry.resolve_failure(&id, BridgeError::Cancelled) => {
                tracing::info!(request_id = %id, "verification dismissed by user");
                Dispatch::Resolved
            }
            _ => Dispatch::Dropped,
        }
    }

    /// The engine may format identifiers differently (e.g. uppercase).
    fn identify(&self, raw: &str) -> Option<RequestId> {
        RequestId::parse(raw)
            .map_err(|_| tracing::debug!(raw = %raw, "engine event carries malformed request ID"))
            .ok()
    }

    /// Registry the dispatcher resolves into.
    pub fn registry(&self) -> &PendingRequestRegistry {
        &self.registry
    }
}
