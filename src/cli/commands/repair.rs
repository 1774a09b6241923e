use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::output::OutputFormatter;
use crate::cli::progress::RepairProgress;
use crate::core::config::Config;
use crate::core::validator::default_validator;
use crate::repair::{CommandRewriter, RepairOrchestrator, RepairReport, Rewriter};

#[derive(Args, Debug)]
pub struct RepairArgs {
    /// Markdown file to repair
    pub file: PathBuf,

    /// Write the result here instead of overwriting the input
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Print the repair prompt without calling the model
    #[arg(long)]
    pub dry_run: bool,

    /// Model call timeout in seconds (overrides the config file)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(long, default_value = "table", value_parser = ["table", "json"])]
    pub format: String,
}

/// Writes the repaired document when the repair produced a new one.
pub fn persist(report: &RepairReport, input: &Path, output: Option<&Path>) -> Result<Option<PathBuf>> {
    if !report.changed() {
        return Ok(None);
    }
    let target = output.unwrap_or(input).to_path_buf();
    std::fs::write(&target, &report.document)
        .with_context(|| format!("failed to write {}", target.display()))?;
    Ok(Some(target))
}

async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Returns `false` when diagrams are still invalid afterwards.
pub async fn execute(args: &RepairArgs, config: &Config) -> Result<bool> {
    let document = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let timeout = args
        .timeout
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.model.timeout());
    let validator = default_validator().without_rules(&config.ignored_rules());
    let orchestrator = RepairOrchestrator::new(validator).with_timeout(timeout);

    if args.dry_run {
        match orchestrator.repair_prompt(&document) {
            Some(prompt) => println!("{}", prompt),
            None => println!("{}", "All diagrams valid; no repair needed.".green()),
        }
        return Ok(true);
    }

    let rewriter = CommandRewriter::from_config(&config.model);
    let progress = RepairProgress::new(format!("Repairing diagrams with {}...", rewriter.name()));
    let report = orchestrator.repair_until(&document, &rewriter, ctrl_c()).await;
    progress.finish();

    if let Some(target) = persist(&report, &args.file, args.output.as_deref())? {
        tracing::info!(path = %target.display(), "wrote repaired document");
    }
    OutputFormatter::new(&args.format).display_repair(&args.file, &report);

    Ok(report.after.is_valid())
}
