use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::cli::output::{FileReport, OutputFormatter};
use crate::core::config::Config;
use crate::core::document::Document;
use crate::core::validator::{default_validator, Validator};
use crate::utils::fs::find_markdown_files;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Markdown file or directory to check (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output format
    #[arg(long, default_value = "table", value_parser = ["table", "json"])]
    pub format: String,
}

pub fn check_files(paths: &[PathBuf], validator: &Validator) -> Result<Vec<FileReport>> {
    paths
        .iter()
        .map(|path| {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let report = validator.validate_document(&Document::parse(&text));
            tracing::debug!(path = %path.display(), blocks = report.blocks.len(), "checked file");
            Ok(FileReport {
                path: path.clone(),
                report,
            })
        })
        .collect()
}

/// Returns `false` when any diagram block is invalid.
pub async fn execute(args: &CheckArgs, config: &Config) -> Result<bool> {
    let files = find_markdown_files(&args.path);
    let validator = default_validator().without_rules(&config.ignored_rules());
    let reports = check_files(&files, &validator)?;

    OutputFormatter::new(&args.format).display_check(&reports);

    Ok(reports.iter().all(|r| r.report.is_valid()))
}
