//! Start verification of a known request ID

use anyhow::Result;
use mivip_bridge::VerificationBridge;

use crate::ui;

pub async fn run(bridge: &VerificationBridge, request_id: &str, verbose: bool) -> Result<()> {
    ui::header("Start Verification");
    ui::key_value("Request", request_id);
    if verbose {
        ui::key_value(
            "Timeout",
            &format!("{}s", bridge.config().request_timeout_secs),
        );
    }
    println!();

    let outcome = super::drive(
        bridge,
        "Waiting for verification",
        bridge.start_verification(request_id),
        verbose,
    )
    .await?;
    super::print_outcome(&outcome, verbose);
    Ok(())
}
