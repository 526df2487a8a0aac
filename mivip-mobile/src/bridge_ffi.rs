//! FFI surface of the verification bridge.
//!
//! The host implements [`VerificationEngineFFI`] around the vendor SDK and
//! [`PresentationHostFFI`] around its view hierarchy. Everything the SDK
//! reports afterwards (status, results, errors, dismissals, scanned codes)
//! is pushed back in through the `deliver_*` methods of [`MiVipBridgeFFI`].

use crate::async_bridge::{AsyncRuntime, ResultCallback};
use crate::MiVipMobileError;
use async_trait::async_trait;
use mivip_bridge::{
    BridgeConfig, BridgeError, Dispatch, EngineEvent, FontSettings, HubSettings, PresentationHost,
    RequestId, RequestStatus, ScanOutcome, ScreenContext, StatusDispatcher, VerificationBridge,
    VerificationEngine, VerificationOutcome,
};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;

// ============================================================================
// Records
// ============================================================================

/// Font overrides for the engine UI.
#[derive(Clone, Debug, PartialEq, Eq, uniffi::Record)]
pub struct FontSettingsFFI {
    pub regular: Option<String>,
    pub light: Option<String>,
    pub medium: Option<String>,
    pub semi_bold: Option<String>,
    pub bold: Option<String>,
    pub heavy: Option<String>,
}

impl From<&FontSettings> for FontSettingsFFI {
    fn from(fonts: &FontSettings) -> Self {
        Self {
            regular: fonts.regular.clone(),
            light: fonts.light.clone(),
            medium: fonts.medium.clone(),
            semi_bold: fonts.semi_bold.clone(),
            bold: fonts.bold.clone(),
            heavy: fonts.heavy.clone(),
        }
    }
}

/// Presentation settings handed to the engine once, at construction.
#[derive(Clone, Debug, PartialEq, Eq, uniffi::Record)]
pub struct HubSettingsFFI {
    pub sounds_disabled: bool,
    pub reusable_enabled: bool,
    pub log_disabled: bool,
    pub fonts: FontSettingsFFI,
    pub document_callback_url: Option<String>,
}

impl From<&HubSettings> for HubSettingsFFI {
    fn from(hub: &HubSettings) -> Self {
        Self {
            sounds_disabled: hub.sounds_disabled,
            reusable_enabled: hub.reusable_enabled,
            log_disabled: hub.log_disabled,
            fonts: FontSettingsFFI::from(&hub.fonts),
            document_callback_url: hub.document_callback_url.clone(),
        }
    }
}

/// Successful verification.
#[derive(Clone, Debug, PartialEq, Eq, uniffi::Record)]
pub struct VerificationOutcomeFFI {
    pub request_id: String,
    pub result: String,
    /// Unix timestamp (seconds).
    pub completed_at: i64,
}

impl From<VerificationOutcome> for VerificationOutcomeFFI {
    fn from(outcome: VerificationOutcome) -> Self {
        Self {
            request_id: outcome.request_id.into_string(),
            result: outcome.result,
            completed_at: outcome.completed_at,
        }
    }
}

/// What the host's scanner produced.
#[derive(Clone, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum ScanResultFFI {
    Scanned { payload: String },
    Cancelled,
    PermissionDenied,
}

impl From<ScanResultFFI> for ScanOutcome {
    fn from(result: ScanResultFFI) -> Self {
        match result {
            ScanResultFFI::Scanned { payload } => ScanOutcome::Scanned(payload),
            ScanResultFFI::Cancelled => ScanOutcome::Cancelled,
            ScanResultFFI::PermissionDenied => ScanOutcome::PermissionDenied,
        }
    }
}

/// What happened to a delivered engine event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum DeliveryOutcome {
    /// A pending request was resolved.
    Resolved,
    /// Every pending request was failed.
    Broadcast { failed: u32 },
    /// Recorded as progress.
    Progress,
    /// No pending request matched.
    Dropped,
}

impl From<Dispatch> for DeliveryOutcome {
    fn from(dispatch: Dispatch) -> Self {
        match dispatch {
            Dispatch::Resolved => Self::Resolved,
            Dispatch::Broadcast(failed) => Self::Broadcast {
                failed: u32::try_from(failed).unwrap_or(u32::MAX),
            },
            Dispatch::Progress => Self::Progress,
            Dispatch::Dropped => Self::Dropped,
        }
    }
}

// ============================================================================
// Callback interfaces
// ============================================================================

/// Vendor SDK wrapper implemented by the host.
///
/// Methods may be called from any thread. `present_request` and
/// `present_scanner` must return as soon as the UI is shown; results come
/// back through [`MiVipBridgeFFI`].
#[uniffi::export(callback_interface)]
pub trait VerificationEngineFFI: Send + Sync {
    /// Apply presentation settings.
    fn configure(&self, settings: HubSettingsFFI) -> Result<(), MiVipMobileError>;

    /// Show the verification flow for `request_id` on the screen `screen_token`.
    fn present_request(
        &self,
        screen_token: String,
        request_id: String,
    ) -> Result<(), MiVipMobileError>;

    /// Show the QR scanner. Answer with [`MiVipBridgeFFI::deliver_scan_result`].
    fn present_scanner(&self, screen_token: String);

    /// Resolve a short invitation code. `None` if unknown.
    fn request_id_from_code(&self, code: String) -> Result<Option<String>, MiVipMobileError>;
}

/// Supplies the screen currently on top of the host UI.
#[uniffi::export(callback_interface)]
pub trait PresentationHostFFI: Send + Sync {
    fn top_screen(&self) -> Option<String>;
}

/// Receives the terminal result of a verification.
#[uniffi::export(callback_interface)]
pub trait VerificationResultCallback: Send + Sync {
    fn on_success(&self, outcome: VerificationOutcomeFFI);
    /// `code` is the wire error code (e.g. `E_TIMEOUT`).
    fn on_error(&self, code: String, message: String);
}

// ============================================================================
// Adapters
// ============================================================================

/// Bridge from FFI callback to the Rust [`VerificationEngine`] trait.
struct EngineAdapter {
    ffi: Arc<dyn VerificationEngineFFI>,
    scan_waiter: Mutex<Option<oneshot::Sender<ScanOutcome>>>,
}

impl EngineAdapter {
    fn new(ffi: Arc<dyn VerificationEngineFFI>) -> Self {
        Self {
            ffi,
            scan_waiter: Mutex::new(None),
        }
    }

    /// Hand a scanner result to the waiting scan, if any.
    fn deliver_scan(&self, outcome: ScanOutcome) -> bool {
        let waiter = self
            .scan_waiter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match waiter {
            Some(tx) => tx.send(outcome).is_ok(),
            None => {
                tracing::debug!("scan result delivered with no scanner open");
                false
            }
        }
    }
}

#[async_trait]
impl VerificationEngine for EngineAdapter {
    fn configure(&self, settings: &HubSettings) -> Result<(), BridgeError> {
        self.ffi
            .configure(HubSettingsFFI::from(settings))
            .map_err(BridgeError::from)
    }

    fn present_request(
        &self,
        screen: &ScreenContext,
        request_id: &RequestId,
        // Events come back through MiVipBridgeFFI::deliver_*.
        _events: StatusDispatcher,
    ) -> Result<(), BridgeError> {
        self.ffi
            .present_request(screen.token().to_string(), request_id.as_str().to_string())
            .map_err(BridgeError::from)
    }

    async fn present_scanner(&self, screen: &ScreenContext) -> ScanOutcome {
        let (tx, rx) = oneshot::channel();
        let previous = self
            .scan_waiter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(tx);
        if previous.is_some() {
            tracing::debug!("previous scanner never answered, treating it as cancelled");
        }

        self.ffi.present_scanner(screen.token().to_string());
        rx.await.unwrap_or(ScanOutcome::Cancelled)
    }

    async fn request_id_from_code(&self, code: &str) -> Result<Option<String>, BridgeError> {
        self.ffi
            .request_id_from_code(code.to_string())
            .map_err(BridgeError::from)
    }
}

struct HostAdapter {
    ffi: Arc<dyn PresentationHostFFI>,
}

impl PresentationHost for HostAdapter {
    fn top_screen(&self) -> Option<ScreenContext> {
        self.ffi.top_screen().map(ScreenContext::new)
    }
}

/// Forwards bridge results to a host [`VerificationResultCallback`].
struct ResultForwarder {
    callback: Arc<dyn VerificationResultCallback>,
}

impl ResultCallback<VerificationOutcome> for ResultForwarder {
    fn on_success(&self, value: VerificationOutcome) {
        self.callback.on_success(value.into());
    }

    fn on_error(&self, error: BridgeError) {
        self.callback
            .on_error(error.code().as_str().to_string(), error.message());
    }
}

// ============================================================================
// Bridge object
// ============================================================================

/// Verification bridge exposed to Swift/Kotlin.
#[derive(uniffi::Object)]
pub struct MiVipBridgeFFI {
    runtime: AsyncRuntime,
    bridge: Arc<VerificationBridge>,
    engine: Arc<EngineAdapter>,
}

#[uniffi::export]
impl MiVipBridgeFFI {
    /// Create a bridge.
    ///
    /// `config_json` is a JSON bridge configuration; `None` uses defaults.
    /// The engine's `configure` is called before this returns.
    #[uniffi::constructor]
    pub fn new(
        engine: Box<dyn VerificationEngineFFI>,
        host: Box<dyn PresentationHostFFI>,
        config_json: Option<String>,
    ) -> Result<Arc<Self>, MiVipMobileError> {
        let config = match config_json {
            Some(json) => BridgeConfig::from_json_str(&json)?,
            None => BridgeConfig::default(),
        };
        let runtime = AsyncRuntime::new()?;
        let engine = Arc::new(EngineAdapter::new(Arc::from(engine)));
        let host = Arc::new(HostAdapter {
            ffi: Arc::from(host),
        });

        let bridge =
            VerificationBridge::with_runtime(engine.clone(), host, config, runtime.handle())?;
        tracing::info!(
            timeout_secs = bridge.config().request_timeout_secs,
            "verification bridge ready"
        );

        Ok(Arc::new(Self {
            runtime,
            bridge: Arc::new(bridge),
            engine,
        }))
    }

    /// Start verification of `request_id`; the result goes to `callback`.
    pub fn start_request(&self, request_id: String, callback: Box<dyn VerificationResultCallback>) {
        let bridge = self.bridge.clone();
        self.runtime.spawn_with_callback(
            async move { bridge.start_verification(&request_id).await },
            forwarder(callback),
        );
    }

    /// Open the scanner and verify the request in the scanned code.
    pub fn scan_qr_code(&self, callback: Box<dyn VerificationResultCallback>) {
        let bridge = self.bridge.clone();
        self.runtime.spawn_with_callback(
            async move { bridge.scan_and_start().await },
            forwarder(callback),
        );
    }

    /// Resolve a short invitation code and verify that request.
    pub fn start_request_by_code(&self, code: String, callback: Box<dyn VerificationResultCallback>) {
        let bridge = self.bridge.clone();
        self.runtime.spawn_with_callback(
            async move { bridge.start_verification_by_code(&code).await },
            forwarder(callback),
        );
    }

    /// Report a status event from the engine.
    ///
    /// A non-empty `result` completes the request; otherwise `status` is
    /// recorded as progress.
    pub fn deliver_status(
        &self,
        request_id: Option<String>,
        status: Option<String>,
        result: Option<String>,
    ) -> DeliveryOutcome {
        let status = status.as_deref().map(RequestStatus::from_engine);
        self.dispatcher()
            .status(request_id.as_deref(), status, result)
            .into()
    }

    /// Report an engine error that names no request.
    pub fn deliver_error(&self, message: String) -> DeliveryOutcome {
        self.dispatcher().error(message).into()
    }

    /// Report that the user closed the verification screen.
    pub fn deliver_dismissed(&self, request_id: String) -> DeliveryOutcome {
        self.dispatcher().dismissed(&request_id).into()
    }

    /// Report an engine event encoded as JSON.
    pub fn deliver_event_json(&self, json: String) -> Result<DeliveryOutcome, MiVipMobileError> {
        let event: EngineEvent = serde_json::from_str(&json).map_err(BridgeError::from)?;
        Ok(self.dispatcher().dispatch(event).into())
    }

    /// Answer a `present_scanner` call. Returns false if no scan was waiting.
    pub fn deliver_scan_result(&self, result: ScanResultFFI) -> bool {
        self.engine.deliver_scan(result.into())
    }

    /// Number of requests currently awaiting a result.
    pub fn pending_count(&self) -> u32 {
        u32::try_from(self.bridge.registry().pending_count()).unwrap_or(u32::MAX)
    }

    /// Whether `request_id` is awaiting a result. Malformed IDs are never pending.
    pub fn is_pending(&self, request_id: String) -> bool {
        RequestId::parse(&request_id)
            .map(|id| self.bridge.registry().is_pending(&id))
            .unwrap_or(false)
    }

    /// Configured request timeout in seconds.
    pub fn request_timeout_secs(&self) -> u64 {
        self.bridge.config().request_timeout_secs
    }
}

impl MiVipBridgeFFI {
    fn dispatcher(&self) -> StatusDispatcher {
        self.bridge.dispatcher()
    }
}

fn forwarder(callback: Box<dyn VerificationResultCallback>) -> Arc<ResultForwarder> {
    Arc::new(ResultForwarder {
        callback: Arc::from(callback),
    })
}
