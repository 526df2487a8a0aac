//! Request outcomes and observable request state.

use crate::errors::BridgeError;
use crate::request_id::RequestId;
use serde::{Deserialize, Serialize};

/// Successful result of a verification request.
///
/// The engine's result is opaque to the bridge; it is carried as the
/// description the engine produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    /// Identifier of the request this outcome belongs to.
    pub request_id: RequestId,
    /// Engine-provided result description.
    pub result: String,
    /// Unix timestamp (seconds) at which the outcome was recorded.
    pub completed_at: i64,
}

impl VerificationOutcome {
    pub fn new(request_id: RequestId, result: impl Into<String>) -> Self {
        Self {
            request_id,
            result: result.into(),
            completed_at: current_timestamp(),
        }
    }
}

/// Progress status reported by the engine for a request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Request has been opened but the user has not started.
    Pending,
    /// The user is working through the verification steps.
    InProgress,
    /// Submitted, awaiting a decision.
    Submitted,
    /// Any other engine status, verbatim.
    Other(String),
}

impl RequestStatus {
    /// Map a status string as engines spell it.
    pub fn from_engine(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "pending" => Self::Pending,
            "in_progress" | "inprogress" => Self::InProgress,
            "submitted" => Self::Submitted,
            _ => Self::Other(raw.trim().to_string()),
        }
    }
}

/// Lifecycle state of a request as seen by an observer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestState {
    /// Nothing in flight for the identifier. Reported by
    /// [`PendingRequestRegistry::state_of`](crate::PendingRequestRegistry::state_of),
    /// never sent on the update stream.
    Idle,
    /// Registered and waiting on the engine.
    Loading {
        /// Last status the engine reported, if any.
        status: Option<RequestStatus>,
    },
    /// Terminal success.
    Success(VerificationOutcome),
    /// Terminal failure.
    Failure(BridgeError),
}

impl RequestState {
    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Failure(_))
    }
}

/// A state change for a single request, broadcast to subscribers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusUpdate {
    pub request_id: RequestId,
    pub state: RequestState,
}

pub(crate) fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
