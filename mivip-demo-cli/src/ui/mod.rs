//! Terminal UI utilities

use colored::Colorize;
use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use mivip_bridge::BridgeError;
use std::time::Duration;

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print a section header
pub fn header(text: &str) {
    println!("\n{}", text.bold().underline());
}

/// Print a key-value pair
pub fn key_value(key: &str, value: &str) {
    println!("  {}: {}", key.cyan(), value);
}

/// Print a bridge error the way a host app would surface it.
///
/// The technical detail is only shown when `verbose` is set.
pub fn bridge_error(err: &BridgeError, verbose: bool) {
    error(err.user_message());
    for (key, value) in error_details(err, verbose) {
        if key == "Retry" && value == "no" {
            key_value(key, &value.red().to_string());
        } else {
            key_value(key, &value);
        }
    }
}

/// Key/value lines printed under a bridge error.
pub fn error_details(err: &BridgeError, verbose: bool) -> Vec<(&'static str, String)> {
    let mut lines = vec![("Code", err.code().as_str().to_string())];
    if verbose {
        lines.push(("Detail", err.to_string()));
    }
    let retry = if err.is_recoverable() { "yes" } else { "no" };
    lines.push(("Retry", retry.to_string()));
    lines
}

/// Create a spinner progress indicator
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    // The template is a literal; fall back to the default style if it ever fails to parse.
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Prompt for text input. Empty input is allowed.
pub fn input(prompt: &str) -> anyhow::Result<String> {
    use dialoguer::Input;
    Ok(Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?)
}

/// Whether stdin/stdout are attached to a terminal we can prompt on.
pub fn is_interactive() -> bool {
    Term::stdout().is_term()
}

/// Display a QR code in the terminal
pub fn qr_code(data: &str) -> anyhow::Result<()> {
    use qrcode::QrCode;

    let code = QrCode::new(data)?;
    let string = code
        .render::<char>()
        .quiet_zone(false)
        .module_dimensions(2, 1)
        .build();

    println!("\n{}\n", string);
    Ok(())
}

/// Print a separator line
pub fn separator() {
    println!("{}", "─".repeat(60).dimmed());
}

/// Print JSON prettily
pub fn json(value: &serde_json::Value) {
    if let Ok(pretty) = serde_json::to_string_pretty(value) {
        println!("{}", pretty);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_details_hide_detail_unless_verbose() {
        let err = BridgeError::Timeout { timeout_secs: 60 };

        let quiet = error_details(&err, false);
        assert_eq!(
            quiet,
            vec![("Code", "E_TIMEOUT".to_string()), ("Retry", "yes".to_string())]
        );

        let verbose = error_details(&err, true);
        assert_eq!(verbose.len(), 3);
        assert_eq!(verbose[1], ("Detail", err.to_string()));
    }

    #[test]
    fn test_error_details_mark_unrecoverable() {
        let details = error_details(&BridgeError::EngineError("boom".into()), false);
        assert_eq!(details.last(), Some(&("Retry", "no".to_string())));
    }
}
