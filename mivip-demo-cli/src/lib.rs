//! MiVIP Demo CLI
//!
//! Terminal host for the verification bridge, driven by a simulated engine.

pub mod commands;
pub mod simulator;
pub mod ui;
