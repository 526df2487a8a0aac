//! QR Code Scanner Integration
//!
//! For hosts that run their own camera scanner instead of the engine's.
//! The host passes the raw scanned string here and gets back the request
//! identifier it carries, if any.
//!
//! Accepted payloads are either a bare request ID or any text embedding one,
//! typically a deep link:
//!
//! ```text
//! 3F2B8C1E-9A4D-4E6F-8B7A-1C2D3E4F5A6B
//! https://verify.mivip.com/request/3f2b8c1e-9a4d-4e6f-8b7a-1c2d3e4f5a6b?source=email
//! ```

use crate::MiVipMobileError;
use mivip_bridge::{BridgeError, RequestId};

/// Result of scanning a QR code.
#[derive(Clone, Debug, PartialEq, Eq, uniffi::Record)]
pub struct ScannedRequest {
    /// Canonical (lowercase) request identifier.
    pub request_id: String,
    /// True if the payload was the identifier alone.
    pub is_bare_id: bool,
}

/// Parse scanned QR code data.
///
/// # Errors
///
/// Returns `InvalidQrPayload` if the payload contains no request ID.
#[uniffi::export]
pub fn parse_scanned_payload(scanned_data: String) -> Result<ScannedRequest, MiVipMobileError> {
    let is_bare_id = RequestId::parse(&scanned_data).is_ok();
    let id = RequestId::extract(&scanned_data).map_err(|_| BridgeError::InvalidQrPayload)?;
    Ok(ScannedRequest {
        request_id: id.into_string(),
        is_bare_id,
    })
}

/// Quick check whether scanned data carries a request ID.
///
/// Useful for filtering QR codes before starting a verification.
#[uniffi::export]
pub fn looks_like_request_payload(scanned_data: String) -> bool {
    mivip_bridge::looks_like_request_payload(&scanned_data)
}

/// Extract the canonical request ID from scanned data, if present.
#[uniffi::export]
pub fn extract_request_id(scanned_data: String) -> Option<String> {
    RequestId::extract(&scanned_data)
        .ok()
        .map(RequestId::into_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "3f2b8c1e-9a4d-4e6f-8b7a-1c2d3e4f5a6b";

    #[test]
    fn test_parse_bare_id() {
        let result = parse_scanned_payload(format!(" {} ", ID.to_uppercase())).unwrap();
        assert_eq!(result.request_id, ID);
        assert!(result.is_bare_id);
    }

    #[test]
    fn test_parse_deep_link() {
        let link = format!("https://verify.mivip.com/request/{}?source=email", ID);
        let result = parse_scanned_payload(link).unwrap();
        assert_eq!(result.request_id, ID);
        assert!(!result.is_bare_id);
    }

    #[test]
    fn test_parse_rejects_other_codes() {
        let err = parse_scanned_payload("lightning:lnbc1u1p3abc123".to_string()).unwrap_err();
        assert!(matches!(err, MiVipMobileError::InvalidQrPayload { .. }));
        assert_eq!(err.code(), "E_INVALID_QR");
    }

    #[test]
    fn test_quick_checks() {
        assert!(looks_like_request_payload(format!("id={}", ID)));
        assert!(!looks_like_request_payload("https://example.com".to_string()));

        assert_eq!(extract_request_id(format!("id={}", ID)), Some(ID.to_string()));
        assert_eq!(extract_request_id(String::new()), None);
    }
}
