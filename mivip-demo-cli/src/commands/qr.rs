//! Render a request as a scannable QR code

use anyhow::Result;
use mivip_bridge::RequestId;

use crate::ui;

/// Text to encode for `request_id`: the bare ID, or a link under `link_base`.
pub fn payload(request_id: &RequestId, link_base: Option<&str>) -> String {
    match link_base {
        Some(base) => format!("{}/request/{}", base.trim_end_matches('/'), request_id),
        None => request_id.to_string(),
    }
}

pub fn run(request_id: &str, link_base: Option<&str>, verbose: bool) -> Result<()> {
    ui::header("Request QR Code");

    let id = RequestId::parse(request_id)?;
    let data = payload(&id, link_base);

    ui::key_value("Payload", &data);
    if verbose {
        ui::key_value("Canonical ID", id.as_str());
        ui::key_value("Encoding", if link_base.is_some() { "link" } else { "bare ID" });
    }
    ui::qr_code(&data)?;
    ui::separator();
    ui::info("Scan this with `mivip-demo scan` or a host app");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_round_trips_through_extraction() {
        let id = RequestId::parse("3f2b8c1e-9a4d-4e6f-8b7a-1c2d3e4f5a6b").unwrap();

        assert_eq!(payload(&id, None), id.as_str());

        let link = payload(&id, Some("https://api.mivip.com/"));
        assert_eq!(
            link,
            "https://api.mivip.com/request/3f2b8c1e-9a4d-4e6f-8b7a-1c2d3e4f5a6b"
        );
        assert_eq!(RequestId::extract(&link).unwrap(), id);
    }
}
