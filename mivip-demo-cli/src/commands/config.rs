//! Show the effective configuration

use anyhow::Result;
use mivip_bridge::BridgeConfig;

use crate::ui;

/// Hide all but the last four characters of a secret.
pub fn mask(secret: &str) -> String {
    let visible: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("****{}", visible)
    }
}

pub fn run(config: &BridgeConfig, verbose: bool) -> Result<()> {
    ui::header("Effective Configuration");

    let mut shown = config.clone();
    shown.license_key = shown.license_key.as_deref().map(mask);
    ui::json(&serde_json::to_value(&shown)?);

    if verbose {
        ui::separator();
        ui::info("Environment overrides:");
        for var in ["MISNAP_LICENSE_KEY", "HOOYU_API_URL", "MIVIP_REQUEST_TIMEOUT_SECS"] {
            let state = if std::env::var_os(var).is_some() { "set" } else { "unset" };
            ui::key_value(var, state);
        }
    }

    if config.license_key.is_none() {
        ui::warning("No licence key configured (set MISNAP_LICENSE_KEY)");
    }
    Ok(())
}
