//! enumstr CLI - generate `String()` methods for the constant types of a Go
//! package.
//!
//! Features:
//! - Exported types by default, or an explicit `-t` list
//! - `go build` file selection with extra `--tags`
//! - Optional `enumstr.toml` in the package directory
//! - JSON report of the selected constants

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use enumstr_core::{
    init_structured_logging, load_config, selection_json, split_list, Enumstr, EnumstrConfig,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate String() methods for Go constant types")]
pub struct Cli {
    /// Directory of the Go package
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Comma-separated list of type names; defaults to every exported type
    #[arg(short, long)]
    types: Option<String>,

    /// Output file, relative to the package directory; `-` for stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Comma-separated list of extra build tags
    #[arg(long)]
    tags: Option<String>,

    /// Print the selected types and constants as JSON instead of generating
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// Flags as a configuration layer; unset flags stay `None`.
    fn as_config(&self) -> EnumstrConfig {
        EnumstrConfig {
            types: self.types.as_deref().map(split_list),
            output: self.output.clone(),
            tags: self.tags.as_deref().map(split_list),
        }
    }
}

/// Layers command-line flags over enumstr.toml.
fn resolve_config(cli: &Cli) -> Result<EnumstrConfig> {
    let file = load_config(&cli.dir)
        .with_context(|| format!("failed to load configuration from {}", cli.dir.display()))?
        .unwrap_or_default();
    Ok(file.merged(cli.as_config()))
}

fn run(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;
    let mut builder = Enumstr::new(&cli.dir).with_config(&config);

    if cli.json {
        let selected = builder.select()?;
        for diagnostic in selected.selection.diagnostics() {
            eprintln!("enumstr: {}", diagnostic);
        }
        let report = selection_json(&selected.package, &selected.selection);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let generation = builder.run()?;
    for diagnostic in generation.diagnostics() {
        eprintln!("enumstr: {}", diagnostic);
    }
    Ok(())
}

fn main() -> ExitCode {
    // Structured logging (JSON to stderr, respects RUST_LOG)
    init_structured_logging();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("enumstr: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
