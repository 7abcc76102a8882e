//! Habr CLI - Markdown to Habrahabr HTML converter.
//!
//! Reads a Markdown post from stdin and writes the converted HTML to stdout.
//! Errors are printed to stderr and exit with status 1.

mod error;
mod output;

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use habr_config::{CliSettings, Config};
use habr_renderer::Pipeline;
use tracing_subscriber::EnvFilter;

use error::CliError;
use output::Output;

/// Convert a Markdown post on stdin to Habrahabr HTML on stdout.
#[derive(Parser)]
#[command(name = "habr", version, about)]
struct Cli {
    /// Path to configuration file (default: auto-discover habr.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Highlighting theme (overrides config).
    #[arg(long, env = "HABR_THEME")]
    theme: Option<String>,

    /// Enable verbose output (log conversion steps to stderr).
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Load configuration, convert stdin and write the result to stdout.
    fn execute(self) -> Result<(), CliError> {
        let cli_settings = CliSettings { theme: self.theme };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }

        let mut pipeline = Pipeline::new(&config.pipeline_options())?;

        let mut input = Vec::new();
        std::io::stdin().lock().read_to_end(&mut input)?;
        let html = pipeline.convert_bytes(&input)?;

        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{html}")?;
        stdout.flush()?;
        Ok(())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}
