//! MiVIP Verification Bridge
//!
//! Request-lifecycle bookkeeping around the MiVIP identity verification
//! engine. The engine itself (capture, liveness, scoring) is a binary SDK;
//! this crate owns what happens around each call into it:
//!
//! - identifier normalisation ([`RequestId`]);
//! - at-most-one in-flight request per identifier, with a timeout per request
//!   and exactly-once resolution ([`PendingRequestRegistry`]);
//! - routing of asynchronous engine events ([`StatusDispatcher`]);
//! - the two-operation facade host layers call ([`VerificationBridge`]).
//!
//! # Example
//!
//! ```rust,ignore
//! let bridge = VerificationBridge::new(engine, host, BridgeConfig::default())?;
//! match bridge.start_verification("  3F2B8C1E-9A4D-4E6F-8B7A-1C2D3E4F5A6B ").await {
//!     Ok(outcome) => println!("verified: {}", outcome.result),
//!     Err(err) if err.is_recoverable() => println!("{}", err.user_message()),
//!     Err(err) => return Err(err),
//! }
//! ```

pub mod bridge;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod errors;
pub mod registry;
pub mod request_id;
pub mod state;

pub use bridge::VerificationBridge;
pub use config::{BridgeConfig, FontSettings, HubSettings};
pub use dispatcher::{Dispatch, EngineEvent, StatusDispatcher};
pub use engine::{PresentationHost, ScanOutcome, ScreenContext, VerificationEngine};
pub use errors::{BridgeError, ErrorCode};
pub use registry::{
    PendingRequestRegistry, PendingVerification, VerificationResult, DEFAULT_REQUEST_TIMEOUT,
};
pub use request_id::{looks_like_request_payload, RequestId};
pub use state::{RequestState, RequestStatus, StatusUpdate, VerificationOutcome};

/// Result type for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
