//! Capabilities the bridge needs from the outside world.
//!
//! The verification engine is a binary-only SDK and the presentation host is
//! the app's UI layer. Both are injected into [`crate::VerificationBridge`]
//! as trait objects so tests and demos can substitute fakes.

use crate::config::HubSettings;
use crate::dispatcher::StatusDispatcher;
use crate::errors::BridgeError;
use crate::request_id::RequestId;
use async_trait::async_trait;

/// Handle to the screen the engine UI should be presented on.
///
/// Opaque to the bridge; the host decides what the token means.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ScreenContext {
    token: String,
}

impl ScreenContext {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Result of presenting the QR scanner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Raw scanned text.
    Scanned(String),
    /// The user closed the scanner.
    Cancelled,
    /// The scanner could not access the camera.
    PermissionDenied,
}

/// Supplies the screen currently on top of the host's UI stack.
pub trait PresentationHost: Send + Sync {
    /// The topmost screen, or `None` if nothing can present right now.
    fn top_screen(&self) -> Option<ScreenContext>;
}

/// The external verification engine.
///
/// Implementations wrap the vendor SDK. `present_request` returns as soon as
/// the UI is up; the engine then reports progress and the final result
/// through the [`StatusDispatcher`] it was handed.
#[async_trait]
pub trait VerificationEngine: Send + Sync {
    /// Apply presentation settings. Called once when the bridge is built.
    fn configure(&self, _settings: &HubSettings) -> Result<(), BridgeError> {
        Ok(())
    }

    /// Present the verification flow for `request_id` on `screen`.
    fn present_request(
        &self,
        screen: &ScreenContext,
        request_id: &RequestId,
        events: StatusDispatcher,
    ) -> Result<(), BridgeError>;

    /// Present the QR scanner and wait for the user.
    async fn present_scanner(&self, screen: &ScreenContext) -> ScanOutcome;

    /// Resolve a short code (as printed in an invitation) to a request ID.
    ///
    /// `Ok(None)` means the code is unknown.
    async fn request_id_from_code(&self, code: &str) -> Result<Option<String>, BridgeError>;
}
