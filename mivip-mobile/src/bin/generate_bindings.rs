//! Generates Swift/Kotlin bindings for mivip-mobile from the compiled library.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use uniffi_bindgen::bindings::{KotlinBindingGenerator, SwiftBindingGenerator};
use uniffi_bindgen::library_mode::generate_bindings;
use uniffi_bindgen::EmptyCrateConfigSupplier;

#[derive(Parser)]
#[command(name = "generate-bindings")]
#[command(about = "Generate UniFFI bindings for mivip-mobile")]
struct Cli {
    /// Path to the compiled library (.dylib, .so, or .a file)
    #[arg(long, default_value = "../target/release/libmivip_mobile.dylib")]
    library: Utf8PathBuf,

    /// Output language
    #[arg(short = 'l', long = "language", default_value = "swift")]
    language: Language,

    /// Output directory (defaults to bindings/<language>)
    #[arg(short = 'o', long = "out-dir")]
    out_dir: Option<Utf8PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Language {
    Swift,
    Kotlin,
}

impl Language {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Swift => "swift",
            Self::Kotlin => "kotlin",
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if !cli.library.exists() {
        anyhow::bail!("Library not found: {}", cli.library);
    }

    let out_dir = cli
        .out_dir
        .unwrap_or_else(|| Utf8PathBuf::from("bindings").join(cli.language.dir_name()));
    std::fs::create_dir_all(&out_dir)?;

    println!(
        "Generating {} bindings from {} into {}",
        cli.language.dir_name(),
        cli.library,
        out_dir
    );

    match cli.language {
        Language::Swift => {
            generate_bindings(
                &cli.library,
                None,
                &SwiftBindingGenerator,
                &EmptyCrateConfigSupplier,
                None,
                &out_dir,
                false,
            )?;
        }
        Language::Kotlin => {
            generate_bindings(
                &cli.library,
                None,
                &KotlinBindingGenerator,
                &EmptyCrateConfigSupplier,
                None,
                &out_dir,
                false,
            )?;
        }
    }

    println!("Bindings written to {}", out_dir);
    Ok(())
}
