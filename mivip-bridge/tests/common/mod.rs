//! Scriptable engine and host shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use mivip_bridge::{
    BridgeConfig, BridgeError, HubSettings, PresentationHost, RequestId, ScanOutcome,
    ScreenContext, StatusDispatcher, VerificationBridge, VerificationEngine,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const ID: &str = "3f2b8c1e-9a4d-4e6f-8b7a-1c2d3e4f5a6b";
pub const OTHER_ID: &str = "00000000-0000-4000-8000-000000000001";

/// How the fake engine reacts to `present_request`.
#[derive(Clone, Debug)]
pub enum Presentation {
    /// Report this result immediately.
    Respond(String),
    /// Show the UI and wait for the test to deliver events.
    Hang,
    /// Refuse to present.
    Fail(BridgeError),
}

pub struct FakeEngine {
    presentation: Mutex<Presentation>,
    scan: Mutex<ScanOutcome>,
    codes: Mutex<HashMap<String, String>>,
    configure_error: Mutex<Option<BridgeError>>,
    presented: Mutex<Vec<RequestId>>,
    scans: Mutex<usize>,
    events: Mutex<Option<StatusDispatcher>>,
}

impl FakeEngine {
    pub fn new(presentation: Presentation) -> Arc<Self> {
        Arc::new(Self {
            presentation: Mutex::new(presentation),
            scan: Mutex::new(ScanOutcome::Cancelled),
            codes: Mutex::new(HashMap::new()),
            configure_error: Mutex::new(None),
            presented: Mutex::new(Vec::new()),
            scans: Mutex::new(0),
            events: Mutex::new(None),
        })
    }

    pub fn set_presentation(&self, presentation: Presentation) {
        *self.presentation.lock().unwrap() = presentation;
    }

    pub fn set_scan(&self, outcome: ScanOutcome) {
        *self.scan.lock().unwrap() = outcome;
    }

    pub fn add_code(&self, code: &str, request_id: &str) {
        self.codes
            .lock()
            .unwrap()
            .insert(code.to_string(), request_id.to_string());
    }

    pub fn fail_configure(&self, err: BridgeError) {
        *self.configure_error.lock().unwrap() = Some(err);
    }

    pub fn presented(&self) -> Vec<RequestId> {
        self.presented.lock().unwrap().clone()
    }

    pub fn scan_count(&self) -> usize {
        *self.scans.lock().unwrap()
    }

    /// Dispatcher handed over by the last presentation.
    pub fn events(&self) -> StatusDispatcher {
        self.events
            .lock()
            .unwrap()
            .clone()
            .expect("no request presented yet")
    }
}

#[async_trait]
impl VerificationEngine for FakeEngine {
    fn configure(&self, _settings: &HubSettings) -> Result<(), BridgeError> {
        match self.configure_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn present_request(
        &self,
        _screen: &ScreenContext,
        request_id: &RequestId,
        events: StatusDispatcher,
    ) -> Result<(), BridgeError> {
        self.presented.lock().unwrap().push(request_id.clone());
        *self.events.lock().unwrap() = Some(events.clone());

        let presentation = self.presentation.lock().unwrap().clone();
        match presentation {
            Presentation::Respond(result) => {
                // Engines report ids in their own format.
                let raw = request_id.as_str().to_uppercase();
                events.status(Some(&raw), None, Some(result));
                Ok(())
            }
            Presentation::Hang => Ok(()),
            Presentation::Fail(err) => Err(err),
        }
    }

    async fn present_scanner(&self, _screen: &ScreenContext) -> ScanOutcome {
        *self.scans.lock().unwrap() += 1;
        self.scan.lock().unwrap().clone()
    }

    async fn request_id_from_code(&self, code: &str) -> Result<Option<String>, BridgeError> {
        Ok(self.codes.lock().unwrap().get(code).cloned())
    }
}

/// Host whose top screen can be switched off.
pub struct FakeHost {
    available: Mutex<bool>,
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            available: Mutex::new(true),
        })
    }

    pub fn set_available(&self, available: bool) {
        *self.available.lock().unwrap() = available;
    }
}

impl PresentationHost for FakeHost {
    fn top_screen(&self) -> Option<ScreenContext> {
        let available = *self.available.lock().unwrap();
        available.then(|| ScreenContext::new("RootViewController"))
    }
}

pub fn bridge_with(
    engine: Arc<FakeEngine>,
    host: Arc<FakeHost>,
    config: BridgeConfig,
) -> Arc<VerificationBridge> {
    Arc::new(VerificationBridge::new(engine, host, config).expect("bridge construction"))
}

/// Yield until `id` shows up as pending.
pub async fn wait_until_pending(bridge: &VerificationBridge, id: &str) {
    let id = RequestId::parse(id).unwrap();
    while !bridge.registry().is_pending(&id) {
        tokio::task::yield_now().await;
    }
}
