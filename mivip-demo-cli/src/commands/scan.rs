//! Scan a QR code and verify the request it names

use anyhow::Result;
use mivip_bridge::VerificationBridge;

use crate::simulator::ScanScript;
use crate::ui;

/// Pick the simulated scanner's behaviour from the command flags.
pub fn script(payload: Option<String>, cancel: bool, deny_camera: bool) -> ScanScript {
    match payload {
        Some(payload) => ScanScript::Payload(payload),
        None if deny_camera => ScanScript::DenyCamera,
        None if cancel => ScanScript::Cancel,
        None => ScanScript::Prompt,
    }
}

pub async fn run(bridge: &VerificationBridge, verbose: bool) -> Result<()> {
    ui::header("Scan and Verify");

    let outcome = super::drive(bridge, "Scanning", bridge.scan_and_start(), verbose).await?;
    super::print_outcome(&outcome, verbose);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_from_flags() {
        assert_eq!(
            script(Some("abc".into()), false, false),
            ScanScript::Payload("abc".into())
        );
        assert_eq!(script(None, true, false), ScanScript::Cancel);
        assert_eq!(script(None, false, true), ScanScript::DenyCamera);
        assert_eq!(script(None, false, false), ScanScript::Prompt);
    }
}
