//! Async Bridge for Mobile Platforms
//!
//! Mobile hosts call into the bridge from threads Tokio does not manage and
//! expect completion handlers rather than futures. This module owns the
//! runtime and turns bridge futures into callback invocations.
//!
//! # Example (Callback Style)
//!
//! ```ignore
//! // From Swift
//! bridge.startRequest(requestId: id, callback: handler)
//! // handler.onSuccess(outcome:) or handler.onError(code:message:)
//! // runs later on a runtime worker thread.
//! ```

use mivip_bridge::BridgeError;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;

/// Result callback interface.
///
/// Implemented on the Rust side of the FFI to receive async results.
pub trait ResultCallback<T>: Send + Sync {
    fn on_success(&self, value: T);
    fn on_error(&self, error: BridgeError);
}

/// Tokio runtime owned by the mobile bindings.
pub struct AsyncRuntime {
    runtime: Runtime,
}

impl AsyncRuntime {
    /// Create a multi-threaded runtime with timers enabled.
    pub fn new() -> Result<Self, BridgeError> {
        Runtime::new()
            .map(|runtime| Self { runtime })
            .map_err(|e| BridgeError::InitFailed(format!("Failed to create runtime: {}", e)))
    }

    /// Handle for spawning onto this runtime from elsewhere.
    pub fn handle(&self) -> Handle {
        self.runtime.handle().clone()
    }

    /// Spawn `future` and report its result to `callback`.
    ///
    /// Nothing is cancellable mid-flight: once started, a verification runs
    /// until the bridge resolves it.
    pub fn spawn_with_callback<F, T, C>(&self, future: F, callback: Arc<C>) -> JoinHandle<()>
    where
        F: Future<Output = Result<T, BridgeError>> + Send + 'static,
        T: Send + 'static,
        C: ResultCallback<T> + ?Sized + 'static,
    {
        self.runtime.spawn(async move {
            match future.await {
                Ok(value) => callback.on_success(value),
                Err(error) => callback.on_error(error),
            }
        })
    }
}

impl std::fmt::Debug for AsyncRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncRuntime")
            .field("flavor", &self.runtime.handle().runtime_flavor())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        successes: Mutex<Vec<u32>>,
        errors: Mutex<Vec<BridgeError>>,
    }

    impl ResultCallback<u32> for Recorder {
        fn on_success(&self, value: u32) {
            self.successes.lock().unwrap().push(value);
        }

        fn on_error(&self, error: BridgeError) {
            self.errors.lock().unwrap().push(error);
        }
    }

    #[test]
    fn test_async_runtime_creation() {
        let runtime = AsyncRuntime::new().unwrap();
        assert!(format!("{:?}", runtime).contains("AsyncRuntime"));
    }

    #[test]
    fn test_spawn_with_callback_reports_success() {
        let runtime = AsyncRuntime::new().unwrap();
        let recorder = Arc::new(Recorder::default());

        let handle = runtime.spawn_with_callback(async { Ok(42) }, recorder.clone());
        runtime.handle().block_on(handle).unwrap();

        assert_eq!(*recorder.successes.lock().unwrap(), vec![42]);
        assert!(recorder.errors.lock().unwrap().is_empty());
    }

    #[test]
    fn test_spawn_with_callback_reports_error() {
        let runtime = AsyncRuntime::new().unwrap();
        let recorder = Arc::new(Recorder::default());

        let handle = runtime
            .spawn_with_callback(async { Err::<u32, _>(BridgeError::Cancelled) }, recorder.clone());
        runtime.handle().block_on(handle).unwrap();

        assert!(recorder.successes.lock().unwrap().is_empty());
        assert_eq!(*recorder.errors.lock().unwrap(), vec![BridgeError::Cancelled]);
    }

    #[test]
    fn test_spawn_with_callback_accepts_trait_objects() {
        let runtime = AsyncRuntime::new().unwrap();
        let recorder = Arc::new(Recorder::default());
        let callback: Arc<dyn ResultCallback<u32>> = recorder.clone();

        let handle = runtime.spawn_with_callback(async { Ok(7) }, callback);
        runtime.handle().block_on(handle).unwrap();

        assert_eq!(*recorder.successes.lock().unwrap(), vec![7]);
    }
}
