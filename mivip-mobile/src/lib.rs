//! MiVIP Mobile FFI Bindings
//!
//! UniFFI bindings that let iOS (Swift) and Android (Kotlin) hosts drive the
//! verification bridge.
//!
//! # Architecture
//!
//! The host implements two callback interfaces:
//! - [`VerificationEngineFFI`] wraps the vendor SDK (present a request,
//!   present the scanner, resolve short codes);
//! - [`PresentationHostFFI`] reports the screen currently on top.
//!
//! Engine events flow back through the `deliver_*` methods of
//! [`MiVipBridgeFFI`]. Verification results are delivered to a
//! [`VerificationResultCallback`] on the bridge's own Tokio runtime.
//!
//! # Thread Safety
//!
//! All exposed types are thread-safe and can be used from any thread.

pub mod async_bridge;
pub mod bridge_ffi;
pub mod scanner;

pub use bridge_ffi::{
    DeliveryOutcome, FontSettingsFFI, HubSettingsFFI, MiVipBridgeFFI, PresentationHostFFI,
    ScanResultFFI, VerificationEngineFFI, VerificationOutcomeFFI, VerificationResultCallback,
};
pub use scanner::ScannedRequest;

use mivip_bridge::{BridgeError, ErrorCode};

// UniFFI scaffolding
uniffi::setup_scaffolding!();

// ============================================================================
// Error Types
// ============================================================================

/// Mobile-friendly error type.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error, uniffi::Error)]
pub enum MiVipMobileError {
    /// Request identifier is not a well-formed UUID.
    #[error("Invalid request ID: {msg}")]
    InvalidIdentifier { msg: String },

    /// Scanned payload contains no request identifier.
    #[error("Invalid QR payload: {msg}")]
    InvalidQrPayload { msg: String },

    /// The identifier is already being verified.
    #[error("Request in progress: {msg}")]
    RequestInProgress { msg: String },

    /// No terminal result before the deadline.
    #[error("Timeout: {msg}")]
    Timeout { msg: String },

    /// Nothing to present the engine UI on.
    #[error("Presentation unavailable: {msg}")]
    PresentationUnavailable { msg: String },

    /// The engine reported a failure.
    #[error("Engine error: {msg}")]
    Engine { msg: String },

    /// The user backed out.
    #[error("Cancelled: {msg}")]
    Cancelled { msg: String },

    /// The bridge or engine could not be set up.
    #[error("Initialization failed: {msg}")]
    InitFailed { msg: String },

    /// Camera access was denied.
    #[error("Camera permission denied: {msg}")]
    CameraPermission { msg: String },

    /// Anything else.
    #[error("Unknown error: {msg}")]
    Unknown { msg: String },
}

impl MiVipMobileError {
    /// Wire code shared with every other host layer.
    pub fn code(&self) -> &'static str {
        self.error_code().as_str()
    }

    fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidIdentifier { .. } => ErrorCode::InvalidIdentifier,
            Self::InvalidQrPayload { .. } => ErrorCode::InvalidQrPayload,
            Self::RequestInProgress { .. } => ErrorCode::DuplicateInProgress,
            Self::Timeout { .. } => ErrorCode::Timeout,
            Self::PresentationUnavailable { .. } => ErrorCode::PresentationUnavailable,
            Self::Engine { .. } => ErrorCode::EngineError,
            Self::Cancelled { .. } => ErrorCode::Cancelled,
            Self::InitFailed { .. } => ErrorCode::InitFailed,
            Self::CameraPermission { .. } => ErrorCode::CameraPermission,
            Self::Unknown { .. } => ErrorCode::Unknown,
        }
    }

    fn msg(&self) -> &str {
        match self {
            Self::InvalidIdentifier { msg }
            | Self::InvalidQrPayload { msg }
            | Self::RequestInProgress { msg }
            | Self::Timeout { msg }
            | Self::PresentationUnavailable { msg }
            | Self::Engine { msg }
            | Self::Cancelled { msg }
            | Self::InitFailed { msg }
            | Self::CameraPermission { msg }
            | Self::Unknown { msg } => msg,
        }
    }
}

impl From<BridgeError> for MiVipMobileError {
    fn from(e: BridgeError) -> Self {
        let msg = e.to_string();
        match e {
            BridgeError::InvalidIdentifier(_) => Self::InvalidIdentifier { msg },
            BridgeError::InvalidQrPayload => Self::InvalidQrPayload { msg },
            BridgeError::DuplicateInProgress { .. } => Self::RequestInProgress { msg },
            BridgeError::Timeout { .. } => Self::Timeout { msg },
            BridgeError::PresentationUnavailable(_) => Self::PresentationUnavailable { msg },
            BridgeError::EngineError(_) => Self::Engine { msg },
            BridgeError::Cancelled => Self::Cancelled { msg },
            BridgeError::InitFailed(_) => Self::InitFailed { msg },
            BridgeError::CameraPermission => Self::CameraPermission { msg },
            BridgeError::Unknown(_) => Self::Unknown { msg },
        }
    }
}

/// A host callback threw something other than a `MiVipMobileError`.
impl From<uniffi::UnexpectedUniFFICallbackError> for MiVipMobileError {
    fn from(e: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::Unknown { msg: e.reason }
    }
}

/// Errors returned by host callbacks re-enter the bridge by wire code.
impl From<MiVipMobileError> for BridgeError {
    fn from(e: MiVipMobileError) -> Self {
        BridgeError::from_code(e.code(), e.msg())
    }
}

// ============================================================================
// Free functions
// ============================================================================

/// Normalize a raw request identifier to canonical lowercase form.
#[uniffi::export]
pub fn normalize_request_id(raw: String) -> Result<String, MiVipMobileError> {
    Ok(mivip_bridge::RequestId::parse(&raw)?.into_string())
}

/// User-facing message for a wire error code.
///
/// Unknown codes get the generic message.
#[uniffi::export]
pub fn user_message_for_code(code: String) -> String {
    BridgeError::from_code(&code, "").user_message().to_string()
}

/// Whether an error with this wire code is worth retrying.
#[uniffi::export]
pub fn is_recoverable_code(code: String) -> bool {
    BridgeError::from_code(&code, "").is_recoverable()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_error_conversion_keeps_code() {
        let cases = [
            BridgeError::InvalidIdentifier("x".into()),
            BridgeError::InvalidQrPayload,
            BridgeError::DuplicateInProgress {
                request_id: "x".into(),
            },
            BridgeError::Timeout { timeout_secs: 60 },
            BridgeError::PresentationUnavailable("scanner".into()),
            BridgeError::EngineError("boom".into()),
            BridgeError::Cancelled,
            BridgeError::InitFailed("no licence".into()),
            BridgeError::CameraPermission,
            BridgeError::Unknown("?".into()),
        ];
        for err in cases {
            let code = err.code().as_str();
            let mobile = MiVipMobileError::from(err);
            assert_eq!(mobile.code(), code);
        }
    }

    #[test]
    fn test_host_error_maps_back() {
        let err = BridgeError::from(MiVipMobileError::Engine {
            msg: "request expired".into(),
        });
        assert_eq!(err, BridgeError::EngineError("request expired".into()));

        let err = BridgeError::from(MiVipMobileError::CameraPermission { msg: String::new() });
        assert_eq!(err, BridgeError::CameraPermission);
    }

    #[test]
    fn test_structured_errors_survive_the_host_boundary() {
        let timeout = BridgeError::Timeout { timeout_secs: 45 };
        assert_eq!(BridgeError::from(MiVipMobileError::from(timeout.clone())), timeout);

        let duplicate = BridgeError::DuplicateInProgress {
            request_id: "3f2b8c1e-9a4d-4e6f-8b7a-1c2d3e4f5a6b".into(),
        };
        assert_eq!(
            BridgeError::from(MiVipMobileError::from(duplicate.clone())),
            duplicate
        );
    }

    #[test]
    fn test_normalize_request_id() {
        assert_eq!(
            normalize_request_id(" 3F2B8C1E-9A4D-4E6F-8B7A-1C2D3E4F5A6B ".into()).unwrap(),
            "3f2b8c1e-9a4d-4e6f-8b7a-1c2d3e4f5a6b"
        );
        assert!(matches!(
            normalize_request_id("nope".into()),
            Err(MiVipMobileError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn test_code_helpers() {
        assert!(is_recoverable_code("E_TIMEOUT".into()));
        assert!(!is_recoverable_code("E_SDK_ERROR".into()));
        assert!(!is_recoverable_code("E_SOMETHING_NEW".into()));
        assert_eq!(
            user_message_for_code("E_CANCELLED".into()),
            "Verification was cancelled."
        );
    }
}
