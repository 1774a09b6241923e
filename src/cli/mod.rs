pub mod commands;
pub mod output;
pub mod progress;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::core::config::Config;

#[derive(Parser, Debug)]
#[command(name = "diagram-doctor", version, about = "Validate and repair mermaid diagrams in markdown")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to ./.diagramdoctor.yml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check diagram blocks in a markdown file or directory
    Check(commands::check::CheckArgs),
    /// Repair invalid diagrams through the configured model CLI
    Repair(commands::repair::RepairArgs),
    /// Repair invalid diagrams with the built-in fixers
    Fix(commands::fix::FixArgs),
    /// Create a .diagramdoctor.yml config file
    Init(commands::init::InitArgs),
}

impl Cli {
    pub fn load_config(&self) -> Config {
        match &self.config {
            Some(path) => Config::load_file(path),
            None => Config::load(std::path::Path::new(".")),
        }
    }
}

/// RUST_LOG, when set and valid, wins; otherwise --verbose selects DEBUG and the default is WARN.
pub fn init_tracing(verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(log_filter(verbose, rust_log.as_deref()))
        .try_init();
}

fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(level.to_string()))
}
