//! The public verification facade.
//!
//! Two operations are exposed to host layers:
//!
//! - [`VerificationBridge::start_verification`]: validate an identifier,
//!   register it, present the engine, wait for the terminal result.
//! - [`VerificationBridge::scan_and_start`]: present the QR scanner, pull
//!   an identifier out of the scanned payload, then start verification.
//!
//! Both return only once the request is resolved (success, failure, timeout
//! or cancellation). Nothing is retried; retrying is up to the caller.

use crate::config::BridgeConfig;
use crate::dispatcher::StatusDispatcher;
use crate::engine::{PresentationHost, ScanOutcome, VerificationEngine};
use crate::errors::BridgeError;
use crate::registry::{PendingRequestRegistry, VerificationResult};
use crate::request_id::RequestId;
use crate::state::{RequestState, StatusUpdate};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::broadcast;

/// Verification facade over an injected engine and presentation host.
pub struct VerificationBridge {
    engine: Arc<dyn VerificationEngine>,
    host: Arc<dyn PresentationHost>,
    registry: PendingRequestRegistry,
    dispatcher: StatusDispatcher,
    config: BridgeConfig,
}

impl VerificationBridge {
    /// Build a bridge whose timers run on the current Tokio runtime.
    pub fn new(
        engine: Arc<dyn VerificationEngine>,
        host: Arc<dyn PresentationHost>,
        config: BridgeConfig,
    ) -> Result<Self, BridgeError> {
        let runtime = Handle::try_current()
            .map_err(|e| BridgeError::InitFailed(format!("no Tokio runtime: {}", e)))?;
        Self::with_runtime(engine, host, config, runtime)
    }

    /// Build a bridge whose timers run on `runtime`.
    ///
    /// Applies the configured [`crate::HubSettings`] to the engine; a
    /// failure there is reported as [`BridgeError::InitFailed`].
    pub fn with_runtime(
        engine: Arc<dyn VerificationEngine>,
        host: Arc<dyn PresentationHost>,
        config: BridgeConfig,
        runtime: Handle,
    ) -> Result<Self, BridgeError> {
        config.validate()?;
        engine.configure(&config.hub).map_err(|e| match e {
            BridgeError::InitFailed(_) => e,
            other => BridgeError::InitFailed(other.to_string()),
        })?;

        let registry = PendingRequestRegistry::with_runtime(config.request_timeout(), runtime);
        let dispatcher = StatusDispatcher::new(registry.clone());
        Ok(Self {
            engine,
            host,
            registry,
            dispatcher,
            config,
        })
    }

    /// Start verification of the request named by `raw_id`.
    ///
    /// Invalid identifiers are rejected before the registry is touched. A
    /// second call for an identifier that is still pending is rejected with
    /// [`BridgeError::DuplicateInProgress`].
    #[tracing::instrument(skip(self))]
    pub async fn start_verification(&self, raw_id: &str) -> VerificationResult {
        let id = RequestId::parse(raw_id)?;
        let pending = self.registry.register_pending(id.clone())?;

        match self.host.top_screen() {
            Some(screen) => {
                tracing::info!(request_id = %id, screen = %screen.token(), "presenting request");
                if let Err(err) = self
                    .engine
                    .present_request(&screen, &id, self.dispatcher.clone())
                {
                    self.registry.resolve_failure(&id, err);
                }
            }
            None => {
                self.registry.resolve_failure(
                    &id,
                    BridgeError::PresentationUnavailable("verification".to_string()),
                );
            }
        }

        pending.wait().await
    }

    /// Scan a QR code and start verification of the request it names.
    #[tracing::instrument(skip(self))]
    pub async fn scan_and_start(&self) -> VerificationResult {
        let screen = self
            .host
            .top_screen()
            .ok_or_else(|| BridgeError::PresentationUnavailable("scanner".to_string()))?;

        let payload = match self.engine.present_scanner(&screen).await {
            ScanOutcome::Scanned(payload) => payload,
            ScanOutcome::Cancelled => return Err(BridgeError::Cancelled),
            ScanOutcome::PermissionDenied => return Err(BridgeError::CameraPermission),
        };

        let id = RequestId::extract(&payload).map_err(|_| BridgeError::InvalidQrPayload)?;
        tracing::info!(request_id = %id, "extracted request ID from QR");
        self.start_verification(id.as_str()).await
    }

    /// Resolve a short invitation code to a request and start verification.
    #[tracing::instrument(skip(self))]
    pub async fn start_verification_by_code(&self, code: &str) -> VerificationResult {
        let code = code.trim();
        if code.is_empty() {
            return Err(BridgeError::InvalidIdentifier(code.to_string()));
        }

        match self.engine.request_id_from_code(code).await? {
            Some(raw_id) => self.start_verification(&raw_id).await,
            None => Err(BridgeError::InvalidIdentifier(code.to_string())),
        }
    }

    /// Handle to route engine events into this bridge.
    pub fn dispatcher(&self) -> StatusDispatcher {
        self.dispatcher.clone()
    }

    pub fn registry(&self) -> &PendingRequestRegistry {
        &self.registry
    }

    /// Current state of the request named by `raw_id`.
    pub fn state_of(&self, raw_id: &str) -> Result<RequestState, BridgeError> {
        let id = RequestId::parse(raw_id)?;
        Ok(self.registry.state_of(&id))
    }

    /// Subscribe to request state changes.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusUpdate> {
        self.registry.subscribe()
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }
}

impl std::fmt::Debug for VerificationBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationBridge")
            .field("engine", &"<VerificationEngine>")
            .field("host", &"<PresentationHost>")
            .field("registry", &self.registry)
            .finish()
    }
}
