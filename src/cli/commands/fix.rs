use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::cli::commands::repair::persist;
use crate::cli::output::OutputFormatter;
use crate::core::config::Config;
use crate::core::validator::default_validator;
use crate::repair::RepairOrchestrator;

#[derive(Args, Debug)]
pub struct FixArgs {
    /// Markdown file to fix
    pub file: PathBuf,

    /// Write the result here instead of overwriting the input
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Print what would be fixed without modifying files
    #[arg(long)]
    pub dry_run: bool,

    /// Output format
    #[arg(long, default_value = "table", value_parser = ["table", "json"])]
    pub format: String,
}

/// Returns `false` when diagrams are still invalid afterwards.
pub async fn execute(args: &FixArgs, config: &Config) -> Result<bool> {
    let document = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let validator = default_validator().without_rules(&config.ignored_rules());
    let orchestrator = RepairOrchestrator::new(validator);
    let formatter = OutputFormatter::new(&args.format);

    if args.dry_run {
        let fixes = orchestrator.preview_local_fixes(&document);
        formatter.display_preview(&args.file, &fixes);
        return Ok(true);
    }

    let report = orchestrator.repair_locally(&document);
    persist(&report, &args.file, args.output.as_deref())?;
    formatter.display_repair(&args.file, &report);

    Ok(report.after.is_valid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args(file: PathBuf, dry_run: bool) -> FixArgs {
        FixArgs {
            file,
            output: None,
            dry_run,
            format: "json".to_string(),
        }
    }

    #[tokio::test]
    async fn test_fix_rewrites_file_in_place() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("doc.md");
        fs::write(&file, "# Doc\n\n```mermaid\nflowchart TD\n  x([Label]) --> y\n```\n").unwrap();
        assert!(execute(&args(file.clone(), false), &Config::default()).await.unwrap());
        let content = fs::read_to_string(&file).unwrap();
        assert_eq!(content, "# Doc\n\n```mermaid\nflowchart TD\n  x[Label] --> y\n```\n");
    }

    #[tokio::test]
    async fn test_dry_run_does_not_modify_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("doc.md");
        let original = "```mermaid\ngraph LR\n  A-->-B\n```\n";
        fs::write(&file, original).unwrap();
        execute(&args(file.clone(), true), &Config::default()).await.unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), original);
    }

    #[tokio::test]
    async fn test_unfixable_defects_report_failure() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("doc.md");
        fs::write(&file, "```mermaid\ngraph LR\n  A[x --> B\n```\n").unwrap();
        assert!(!execute(&args(file.clone(), false), &Config::default()).await.unwrap());
    }
}
