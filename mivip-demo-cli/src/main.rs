//! MiVIP Demo CLI
//!
//! Drives the verification bridge from a terminal against a simulated engine.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use mivip_demo_cli::commands::{self, SimulationArgs};

#[derive(Parser)]
#[command(name = "mivip-demo")]
#[command(about = "MiVIP Demo CLI - exercise the identity verification bridge", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Request timeout in seconds (overrides config and environment)
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a request ID or QR payload
    Validate {
        /// Request ID or scanned text
        input: String,
    },

    /// Verify a request by ID
    Start {
        /// Request ID (any case, surrounding whitespace allowed)
        request_id: String,

        #[command(flatten)]
        simulation: SimulationArgs,
    },

    /// Scan a QR code and verify the request it names
    Scan {
        /// Text the simulated scanner reads (prompts if omitted)
        #[arg(long, conflicts_with_all = ["cancel", "deny_camera"])]
        payload: Option<String>,

        /// Simulate the user closing the scanner
        #[arg(long)]
        cancel: bool,

        /// Simulate camera permission being denied
        #[arg(long, conflicts_with = "cancel")]
        deny_camera: bool,

        #[command(flatten)]
        simulation: SimulationArgs,
    },

    /// Verify a request from a short invitation code
    Code {
        /// Short code
        code: String,

        /// Code the simulated engine knows about (repeatable)
        #[arg(long = "known", value_name = "CODE=REQUEST_ID")]
        known: Vec<String>,

        #[command(flatten)]
        simulation: SimulationArgs,
    },

    /// Render a request ID as a QR code
    Qr {
        /// Request ID
        request_id: String,

        /// Encode a link under the configured API base URL instead of the bare ID
        #[arg(long)]
        link: bool,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("mivip_demo_cli=debug,mivip_bridge=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("mivip_demo_cli=info,mivip_bridge=warn")
            .init();
    }

    let config = commands::load_config(cli.config.as_deref(), cli.timeout)?;

    // Dispatch commands
    match cli.command {
        Commands::Validate { input } => {
            commands::validate::run(&input, cli.verbose)?;
        }
        Commands::Start {
            request_id,
            simulation,
        } => {
            let bridge = commands::build_bridge(config, simulation.engine())?;
            commands::start::run(&bridge, &request_id, cli.verbose).await?;
        }
        Commands::Scan {
            payload,
            cancel,
            deny_camera,
            simulation,
        } => {
            let engine = simulation
                .engine()
                .with_scan(commands::scan::script(payload, cancel, deny_camera));
            let bridge = commands::build_bridge(config, engine)?;
            commands::scan::run(&bridge, cli.verbose).await?;
        }
        Commands::Code {
            code,
            known,
            simulation,
        } => {
            let mut engine = simulation.engine();
            for entry in &known {
                let (code, request_id) = commands::code::parse_known(entry)?;
                engine = engine.with_code(code, request_id);
            }
            let bridge = commands::build_bridge(config, engine)?;
            commands::code::run(&bridge, &code, cli.verbose).await?;
        }
        Commands::Qr { request_id, link } => {
            let base = link.then_some(config.api_base_url.as_str());
            commands::qr::run(&request_id, base, cli.verbose)?;
        }
        Commands::Config => {
            commands::config::run(&config, cli.verbose)?;
        }
    }

    Ok(())
}
