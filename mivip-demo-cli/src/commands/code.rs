//! Start verification from a short invitation code

use anyhow::{anyhow, Result};
use mivip_bridge::VerificationBridge;

use crate::ui;

/// Parse a `CODE=REQUEST_ID` entry for the simulated code table.
pub fn parse_known(entry: &str) -> Result<(String, String)> {
    let (code, request_id) = entry
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected CODE=REQUEST_ID, got '{}'", entry))?;
    let (code, request_id) = (code.trim(), request_id.trim());
    if code.is_empty() || request_id.is_empty() {
        return Err(anyhow!("Expected CODE=REQUEST_ID, got '{}'", entry));
    }
    Ok((code.to_string(), request_id.to_string()))
}

pub async fn run(bridge: &VerificationBridge, code: &str, verbose: bool) -> Result<()> {
    ui::header("Verify by Code");
    ui::key_value("Code", code);
    println!();

    let outcome = super::drive(
        bridge,
        "Resolving code",
        bridge.start_verification_by_code(code),
        verbose,
    )
    .await?;
    super::print_outcome(&outcome, verbose);
    Ok(())
}
