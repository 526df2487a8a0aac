//! Pending-request registry.
//!
//! Tracks every verification request between the moment it is accepted and
//! the moment it reaches a terminal state, and guarantees that each request
//! is resolved exactly once.
//!
//! # Thread Safety
//!
//! All mutations (insert, remove, timer arm/disarm) happen under a single
//! `Mutex`. The presence check and the insert in [`PendingRequestRegistry::register`]
//! are one critical section, so two concurrent registrations for the same
//! identifier cannot both succeed. State updates are published while the lock
//! is held, so the stream for one identifier is always ordered. Completion
//! callbacks always run after the lock is released, so a callback may call
//! back into the registry.
//!
//! # Timeouts
//!
//! Every entry owns a timer task. Resolving the entry by any path aborts the
//! task while the lock is held. Each entry also carries a ticket number, and a
//! timer only expires the entry whose ticket it was armed for. A timer that
//! has already woken up when its entry is resolved, or whose identifier has
//! since been registered again, therefore does nothing.

use crate::errors::BridgeError;
use crate::request_id::RequestId;
use crate::state::{RequestState, RequestStatus, StatusUpdate, VerificationOutcome};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;

/// Default time a request may stay pending before it is failed.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Capacity of the status update channel.
const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// Terminal result delivered to a pending request.
pub type VerificationResult = Result<VerificationOutcome, BridgeError>;

/// Completion invoked exactly once with the terminal result.
type Completion = Box<dyn FnOnce(VerificationResult) + Send + 'static>;

struct PendingRequest {
    completion: Completion,
    created_at: Instant,
    status: Option<RequestStatus>,
    ticket: u64,
    timer: Option<JoinHandle<()>>,
}

struct RegistryInner {
    entries: Mutex<HashMap<RequestId, PendingRequest>>,
    next_ticket: AtomicU64,
    timeout: Duration,
    updates: broadcast::Sender<StatusUpdate>,
}

impl RegistryInner {
    fn entries(&self) -> MutexGuard<'_, HashMap<RequestId, PendingRequest>> {
        // Callbacks never run under this lock, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Remove the entry for `id`, disarm its timer and publish its terminal
    /// state.
    ///
    /// With `ticket` set, only the entry armed under that ticket is taken. The
    /// terminal update is sent before the lock is released, so it always
    /// precedes the `Loading` of any later registration for the same `id`.
    fn take(
        &self,
        id: &RequestId,
        ticket: Option<u64>,
        result: &VerificationResult,
    ) -> Option<PendingRequest> {
        let mut entries = self.entries();
        if let Some(ticket) = ticket {
            if entries.get(id).map(|entry| entry.ticket) != Some(ticket) {
                return None;
            }
        }
        let mut entry = entries.remove(id)?;
        if let Some(timer) = entry.timer.take() {
            timer.abort();
        }
        let state = match result {
            Ok(outcome) => RequestState::Success(outcome.clone()),
            Err(err) => RequestState::Failure(err.clone()),
        };
        self.publish(id, state);
        Some(entry)
    }

    fn complete(&self, id: &RequestId, entry: PendingRequest, result: VerificationResult) {
        tracing::debug!(
            request_id = %id,
            elapsed_ms = entry.created_at.elapsed().as_millis() as u64,
            success = result.is_ok(),
            "resolving pending request"
        );
        (entry.completion)(result);
    }

    fn resolve(&self, id: &RequestId, result: VerificationResult) -> bool {
        match self.take(id, None, &result) {
            Some(entry) => {
                self.complete(id, entry, result);
                true
            }
            None => {
                tracing::debug!(request_id = %id, "no pending request, dropping event");
                false
            }
        }
    }

    fn expire(&self, id: &RequestId, ticket: u64) {
        let result = Err(BridgeError::Timeout {
            timeout_secs: self.timeout.as_secs(),
        });
        if let Some(entry) = self.take(id, Some(ticket), &result) {
            tracing::warn!(
                request_id = %id,
                timeout_secs = self.timeout.as_secs(),
                "request timed out"
            );
            self.complete(id, entry, result);
        }
    }

    fn publish(&self, id: &RequestId, state: RequestState) {
        // No subscribers is not an error.
        let _ = self.updates.send(StatusUpdate {
            request_id: id.clone(),
            state,
        });
    }
}

/// Concurrent map of in-flight verification requests.
///
/// Cheap to clone; clones share the same map.
///
/// # Example
///
/// ```rust
/// use mivip_bridge::{PendingRequestRegistry, RequestId, VerificationOutcome};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), mivip_bridge::BridgeError> {
/// let registry = PendingRequestRegistry::new(Duration::from_secs(60))?;
/// let id = RequestId::parse("3f2b8c1e-9a4d-4e6f-8b7a-1c2d3e4f5a6b")?;
///
/// let pending = registry.register_pending(id.clone())?;
/// registry.resolve_success(&id, VerificationOutcome::new(id.clone(), "PASSED"));
///
/// let outcome = pending.wait().await?;
/// assert_eq!(outcome.result, "PASSED");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PendingRequestRegistry {
    inner: Arc<RegistryInner>,
    runtime: Handle,
}

impl PendingRequestRegistry {
    /// Create a registry whose timers run on the current Tokio runtime.
    ///
    /// Fails with [`BridgeError::InitFailed`] outside a runtime context.
    pub fn new(timeout: Duration) -> Result<Self, BridgeError> {
        let runtime = Handle::try_current()
            .map_err(|e| BridgeError::InitFailed(format!("no Tokio runtime: {}", e)))?;
        Ok(Self::with_runtime(timeout, runtime))
    }

    /// Create a registry whose timers run on `runtime`.
    pub fn with_runtime(timeout: Duration, runtime: Handle) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(RegistryInner {
                entries: Mutex::new(HashMap::new()),
                next_ticket: AtomicU64::new(1),
                timeout,
                updates,
            }),
            runtime,
        }
    }

    /// Register a request with a success/failure callback pair.
    ///
    /// Rejects with [`BridgeError::DuplicateInProgress`] if `id` is already
    /// pending; the existing entry is left untouched. Otherwise the entry is
    /// inserted and its timeout armed.
    pub fn register<S, F>(&self, id: RequestId, on_success: S, on_failure: F) -> Result<(), BridgeError>
    where
        S: FnOnce(VerificationOutcome) + Send + 'static,
        F: FnOnce(BridgeError) + Send + 'static,
    {
        self.insert(
            id,
            Box::new(move |result: VerificationResult| match result {
                Ok(outcome) => on_success(outcome),
                Err(err) => on_failure(err),
            }),
        )
    }

    /// Register a request and get a handle that completes on resolution.
    pub fn register_pending(&self, id: RequestId) -> Result<PendingVerification, BridgeError> {
        let (tx, rx) = oneshot::channel();
        self.insert(
            id.clone(),
            Box::new(move |result: VerificationResult| {
                // The waiter may have gone away; nothing to deliver to then.
                let _ = tx.send(result);
            }),
        )?;
        Ok(PendingVerification { request_id: id, rx })
    }

    fn insert(&self, id: RequestId, completion: Completion) -> Result<(), BridgeError> {
        let inner = &self.inner;
        {
            let mut entries = inner.entries();
            if entries.contains_key(&id) {
                tracing::debug!(request_id = %id, "rejecting duplicate registration");
                return Err(BridgeError::DuplicateInProgress {
                    request_id: id.into_string(),
                });
            }

            let ticket = inner.next_ticket.fetch_add(1, Ordering::Relaxed);
            let timer = self.arm_timer(id.clone(), ticket);
            entries.insert(
                id.clone(),
                PendingRequest {
                    completion,
                    created_at: Instant::now(),
                    status: None,
                    ticket,
                    timer: Some(timer),
                },
            );
            // Published under the lock so Loading precedes any terminal update.
            inner.publish(&id, RequestState::Loading { status: None });
        }

        tracing::debug!(request_id = %id, "registered pending request");
        Ok(())
    }

    fn arm_timer(&self, id: RequestId, ticket: u64) -> JoinHandle<()> {
        let weak: Weak<RegistryInner> = Arc::downgrade(&self.inner);
        let timeout = self.inner.timeout;
        self.runtime.spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(inner) = weak.upgrade() {
                inner.expire(&id, ticket);
            }
        })
    }

    /// Resolve `id` successfully.
    ///
    /// Returns `false` (and does nothing else) if no request is pending,
    /// e.g. because it already timed out.
    pub fn resolve_success(&self, id: &RequestId, outcome: VerificationOutcome) -> bool {
        self.inner.resolve(id, Ok(outcome))
    }

    /// Resolve `id` with a failure. No-op if nothing is pending for `id`.
    pub fn resolve_failure(&self, id: &RequestId, error: BridgeError) -> bool {
        self.inner.resolve(id, Err(error))
    }

    /// Fail every request pending at the time of the call.
    ///
    /// Works on a snapshot of identifiers, so requests registered while this
    /// runs are not affected. A request resolved concurrently by another path
    /// is skipped. Returns the number of requests this call resolved.
    pub fn resolve_all_failure(&self, error: BridgeError) -> usize {
        self.pending_ids()
            .iter()
            .filter(|id| self.resolve_failure(id, error.clone()))
            .count()
    }

    /// Record a non-terminal progress status for a pending request.
    pub fn report_progress(&self, id: &RequestId, status: Option<RequestStatus>) -> bool {
        let mut entries = self.inner.entries();
        let Some(entry) = entries.get_mut(id) else {
            return false;
        };
        if status.is_some() {
            entry.status = status.clone();
        }
        self.inner.publish(id, RequestState::Loading { status });
        true
    }

    /// Current state of `id`: `Loading` with the last reported status while
    /// pending, `Idle` otherwise. Terminal states are only seen on the
    /// update stream.
    pub fn state_of(&self, id: &RequestId) -> RequestState {
        match self.inner.entries().get(id) {
            Some(entry) => RequestState::Loading {
                status: entry.status.clone(),
            },
            None => RequestState::Idle,
        }
    }

    /// Subscribe to state changes of all requests.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusUpdate> {
        self.inner.updates.subscribe()
    }

    /// Check whether `id` is pending.
    pub fn is_pending(&self, id: &RequestId) -> bool {
        self.inner.entries().contains_key(id)
    }

    /// Number of pending requests.
    pub fn pending_count(&self) -> usize {
        self.inner.entries().len()
    }

    /// Snapshot of pending identifiers.
    pub fn pending_ids(&self) -> Vec<RequestId> {
        self.inner.entries().keys().cloned().collect()
    }

    /// How long `id` has been pending.
    pub fn age_of(&self, id: &RequestId) -> Option<Duration> {
        self.inner
            .entries()
            .get(id)
            .map(|entry| entry.created_at.elapsed())
    }

    /// Configured timeout.
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }
}

impl std::fmt::Debug for PendingRequestRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRequestRegistry")
            .field("timeout", &self.inner.timeout)
            .field("pending", &self.pending_count())
            .finish()
    }
}

/// Handle to a registered request, completed when the registry resolves it.
#[derive(Debug)]
pub struct PendingVerification {
    request_id: RequestId,
    rx: oneshot::Receiver<VerificationResult>,
}

impl PendingVerification {
    /// Identifier this handle waits on.
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Wait for the terminal result.
    pub async fn wait(self) -> VerificationResult {
        self.rx.await.unwrap_or_else(|_| {
            Err(BridgeError::Unknown(format!(
                "request {} was dropped without a result",
                self.request_id
            )))
        })
    }
}
