//! Error types for bridge operations.
//!
//! Every failure a caller can observe maps to exactly one [`BridgeError`]
//! variant. Each variant carries a stable wire code (the strings the host
//! layer already switches on) and a user-facing message, so the host UI can
//! decide whether to offer a retry without parsing free-form text.

use crate::request_id::RequestId;

/// Stable error codes shared with host layers (JS, Swift, Kotlin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Identifier failed UUID validation.
    InvalidIdentifier,
    /// Scanned payload did not contain a request identifier.
    InvalidQrPayload,
    /// A request with the same identifier is already pending.
    DuplicateInProgress,
    /// No terminal event arrived within the configured interval.
    Timeout,
    /// No screen was available to present the engine UI.
    PresentationUnavailable,
    /// The engine reported an error.
    EngineError,
    /// The user dismissed the scanner or the verification screen.
    Cancelled,
    /// The engine could not be initialised.
    InitFailed,
    /// Camera access was denied to the scanner.
    CameraPermission,
    /// Anything else.
    Unknown,
}

impl ErrorCode {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier => "E_INVALID_UUID",
            Self::InvalidQrPayload => "E_INVALID_QR",
            Self::DuplicateInProgress => "E_REQUEST_IN_PROGRESS",
            Self::Timeout => "E_TIMEOUT",
            Self::PresentationUnavailable => "E_VC_FAILED",
            Self::EngineError => "E_SDK_ERROR",
            Self::Cancelled => "E_CANCELLED",
            Self::InitFailed => "E_INIT_FAILED",
            Self::CameraPermission => "E_CAMERA_PERMISSION",
            Self::Unknown => "E_UNKNOWN",
        }
    }

    /// Parse a wire code. Unrecognised codes map to [`ErrorCode::Unknown`].
    pub fn parse(code: &str) -> Self {
        match code {
            "E_INVALID_UUID" => Self::InvalidIdentifier,
            "E_INVALID_QR" => Self::InvalidQrPayload,
            "E_REQUEST_IN_PROGRESS" => Self::DuplicateInProgress,
            "E_TIMEOUT" => Self::Timeout,
            "E_VC_FAILED" => Self::PresentationUnavailable,
            "E_SDK_ERROR" => Self::EngineError,
            "E_CANCELLED" => Self::Cancelled,
            "E_INIT_FAILED" => Self::InitFailed,
            "E_CAMERA_PERMISSION" => Self::CameraPermission,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a bridge operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// The supplied identifier is not a UUID.
    #[error("invalid request ID format: {0}")]
    InvalidIdentifier(String),

    /// The scanned payload carries no request identifier.
    #[error("invalid QR: no request ID found")]
    InvalidQrPayload,

    /// A request for this identifier is already in flight.
    #[error("request {request_id} is already in progress")]
    DuplicateInProgress {
        /// Canonical identifier of the in-flight request.
        request_id: String,
    },

    /// The request did not reach a terminal state in time.
    #[error("request timed out after {timeout_secs} seconds")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u64,
    },

    /// No screen could be obtained to present the engine UI.
    #[error("could not find a valid screen to present {0}")]
    PresentationUnavailable(String),

    /// The engine reported a failure.
    #[error("engine error: {0}")]
    EngineError(String),

    /// The user dismissed the presented screen.
    #[error("cancelled by user")]
    Cancelled,

    /// The engine could not be initialised.
    #[error("engine initialisation failed: {0}")]
    InitFailed(String),

    /// Camera access was denied.
    #[error("camera permission denied")]
    CameraPermission,

    /// Unexpected failure.
    #[error("unknown error: {0}")]
    Unknown(String),
}

impl BridgeError {
    /// Stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidIdentifier(_) => ErrorCode::InvalidIdentifier,
            Self::InvalidQrPayload => ErrorCode::InvalidQrPayload,
            Self::DuplicateInProgress { .. } => ErrorCode::DuplicateInProgress,
            Self::Timeout { .. } => ErrorCode::Timeout,
            Self::PresentationUnavailable(_) => ErrorCode::PresentationUnavailable,
            Self::EngineError(_) => ErrorCode::EngineError,
            Self::Cancelled => ErrorCode::Cancelled,
            Self::InitFailed(_) => ErrorCode::InitFailed,
            Self::CameraPermission => ErrorCode::CameraPermission,
            Self::Unknown(_) => ErrorCode::Unknown,
        }
    }

    /// Technical message (useful for FFI).
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Message suitable for showing to an end user.
    pub fn user_message(&self) -> &'static str {
        match self.code() {
            ErrorCode::InvalidIdentifier => {
                "Invalid verification request ID format. Please check the ID and try again."
            }
            ErrorCode::InvalidQrPayload => {
                "The QR code is invalid or doesn't contain a verification request. \
                 Please scan the code from your verification email."
            }
            ErrorCode::DuplicateInProgress => {
                "A verification request is already in progress. Please wait for it to complete."
            }
            ErrorCode::Timeout => {
                "The verification request timed out. \
                 Please check your network connection and try again."
            }
            ErrorCode::PresentationUnavailable => {
                "Unable to display verification screen. Please try again."
            }
            ErrorCode::EngineError => "An error occurred during verification.",
            ErrorCode::Cancelled => "Verification was cancelled.",
            ErrorCode::InitFailed => {
                "Unable to initialize identity verification. \
                 Please check your license key configuration."
            }
            ErrorCode::CameraPermission => {
                "Camera access is required for QR code scanning. \
                 Please enable camera access in Settings."
            }
            ErrorCode::Unknown => "An unexpected error occurred. Please try again.",
        }
    }

    /// Returns true if the user can reasonably retry the same operation.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.code(),
            ErrorCode::InvalidIdentifier
                | ErrorCode::InvalidQrPayload
                | ErrorCode::DuplicateInProgress
                | ErrorCode::Timeout
                | ErrorCode::Cancelled
        )
    }

    /// Rebuild an error from a wire code and message.
    ///
    /// Used when an error crosses a host boundary as a `(code, message)` pair.
    /// Structured fields are recovered from the message where it carries them:
    /// the first number for a timeout, the embedded identifier for a duplicate.
    pub fn from_code(code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match ErrorCode::parse(code) {
            ErrorCode::InvalidIdentifier => Self::InvalidIdentifier(message),
            ErrorCode::InvalidQrPayload => Self::InvalidQrPayload,
            ErrorCode::DuplicateInProgress => Self::DuplicateInProgress {
                request_id: RequestId::extract(&message)
                    .map(RequestId::into_string)
                    .unwrap_or(message),
            },
            ErrorCode::Timeout => Self::Timeout {
                timeout_secs: first_number(&message).unwrap_or(0),
            },
            ErrorCode::PresentationUnavailable => Self::PresentationUnavailable(message),
            ErrorCode::EngineError => Self::EngineError(message),
            ErrorCode::Cancelled => Self::Cancelled,
            ErrorCode::InitFailed => Self::InitFailed(message),
            ErrorCode::CameraPermission => Self::CameraPermission,
            ErrorCode::Unknown => Self::Unknown(message),
        }
    }
}

/// First run of ASCII digits in `text`, if it fits a `u64`.
fn first_number(text: &str) -> Option<u64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits = &text[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Unknown(format!("serialization error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(
            BridgeError::InvalidIdentifier("x".into()).code().as_str(),
            "E_INVALID_UUID"
        );
        assert_eq!(BridgeError::InvalidQrPayload.code().as_str(), "E_INVALID_QR");
        assert_eq!(
            BridgeError::Timeout { timeout_secs: 60 }.code().as_str(),
            "E_TIMEOUT"
        );
        assert_eq!(BridgeError::Cancelled.code().as_str(), "E_CANCELLED");
    }

    #[test]
    fn test_recoverability() {
        assert!(BridgeError::Timeout { timeout_secs: 60 }.is_recoverable());
        assert!(BridgeError::DuplicateInProgress {
            request_id: "a".into()
        }
        .is_recoverable());
        assert!(BridgeError::InvalidIdentifier("a".into()).is_recoverable());
        assert!(!BridgeError::EngineError("boom".into()).is_recoverable());
        assert!(!BridgeError::Unknown("?".into()).is_recoverable());
        assert!(!BridgeError::PresentationUnavailable("sdk".into()).is_recoverable());
    }

    #[test]
    fn test_from_code_round_trips_kind() {
        let err = BridgeError::from_code("E_SDK_ERROR", "document rejected");
        assert_eq!(err, BridgeError::EngineError("document rejected".into()));

        let err = BridgeError::from_code("E_SOMETHING_NEW", "??");
        assert_eq!(err.code(), ErrorCode::Unknown);
    }

    #[test]
    fn test_from_code_recovers_structured_fields() {
        let timeout = BridgeError::Timeout { timeout_secs: 45 };
        assert_eq!(
            BridgeError::from_code("E_TIMEOUT", timeout.to_string()),
            timeout
        );
        assert_eq!(
            BridgeError::from_code("E_TIMEOUT", "60"),
            BridgeError::Timeout { timeout_secs: 60 }
        );
        assert_eq!(
            BridgeError::from_code("E_TIMEOUT", "took too long"),
            BridgeError::Timeout { timeout_secs: 0 }
        );

        let duplicate = BridgeError::DuplicateInProgress {
            request_id: "3f2b8c1e-9a4d-4e6f-8b7a-1c2d3e4f5a6b".into(),
        };
        assert_eq!(
            BridgeError::from_code("E_REQUEST_IN_PROGRESS", duplicate.to_string()),
            duplicate
        );
        assert_eq!(
            BridgeError::from_code("E_REQUEST_IN_PROGRESS", "busy"),
            BridgeError::DuplicateInProgress {
                request_id: "busy".into()
            }
        );
    }

    #[test]
    fn test_user_messages_are_distinct() {
        let codes = [
            BridgeError::InvalidIdentifier(String::new()),
            BridgeError::InvalidQrPayload,
            BridgeError::DuplicateInProgress {
                request_id: String::new(),
            },
            BridgeError::Timeout { timeout_secs: 1 },
            BridgeError::PresentationUnavailable(String::new()),
            BridgeError::EngineError(String::new()),
            BridgeError::Cancelled,
            BridgeError::Unknown(String::new()),
        ];
        let messages: std::collections::HashSet<_> =
            codes.iter().map(|e| e.user_message()).collect();
        assert_eq!(messages.len(), codes.len());
    }

    #[test]
    fn test_display_includes_identifier() {
        let err = BridgeError::DuplicateInProgress {
            request_id: "abc".into(),
        };
        assert!(err.to_string().contains("abc"));
    }
}
