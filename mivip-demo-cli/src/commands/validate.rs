//! Check a request ID or QR payload without starting anything

use anyhow::Result;
use mivip_bridge::{BridgeError, RequestId};

use crate::ui;

/// How an input was recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// The input is a request ID on its own.
    Identifier(RequestId),
    /// The input embeds a request ID.
    Payload(RequestId),
}

pub fn classify(input: &str) -> Result<Validation, BridgeError> {
    if let Ok(id) = RequestId::parse(input) {
        return Ok(Validation::Identifier(id));
    }
    RequestId::extract(input).map(Validation::Payload)
}

pub fn run(input: &str, verbose: bool) -> Result<()> {
    ui::header("Validate");

    match classify(input) {
        Ok(Validation::Identifier(id)) => {
            ui::success("Valid request ID");
            ui::key_value("Canonical", id.as_str());
            Ok(())
        }
        Ok(Validation::Payload(id)) => {
            ui::success("Payload contains a request ID");
            ui::key_value("Request", id.as_str());
            if verbose {
                ui::key_value("Payload", input);
            }
            Ok(())
        }
        Err(err) => {
            ui::bridge_error(&err, verbose);
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "3f2b8c1e-9a4d-4e6f-8b7a-1c2d3e4f5a6b";

    #[test]
    fn test_classify() {
        assert!(matches!(
            classify(&ID.to_uppercase()),
            Ok(Validation::Identifier(id)) if id.as_str() == ID
        ));
        assert!(matches!(
            classify(&format!("mivip://request/{}", ID)),
            Ok(Validation::Payload(id)) if id.as_str() == ID
        ));
        assert!(matches!(
            classify("hello"),
            Err(BridgeError::InvalidIdentifier(_))
        ));
    }
}
