use colored::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::checks::traits::{Defect, Severity};
use crate::core::validator::DocumentReport;
use crate::fixers::registry::{AppliedFix, FixOutcome};
use crate::repair::{RepairOutcome, RepairReport};

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub report: DocumentReport,
}

pub struct OutputFormatter {
    format: String,
}

impl OutputFormatter {
    pub fn new(format: &str) -> Self {
        Self {
            format: format.to_string(),
        }
    }

    fn is_json(&self) -> bool {
        self.format == "json"
    }

    pub fn display_check(&self, files: &[FileReport]) {
        if self.is_json() {
            print_json(&check_json(files));
            return;
        }

        println!();
        println!("{}", format!("diagram-doctor v{}", env!("CARGO_PKG_VERSION")).bold());
        println!("{}", "─".repeat(64));

        for file in files {
            println!();
            println!("  {}", file.path.to_string_lossy().cyan());
            if file.report.blocks.is_empty() {
                println!("    {}", "no diagram blocks".dimmed());
                continue;
            }
            for block in &file.report.blocks {
                let status = if block.result.is_valid {
                    "OK".green()
                } else {
                    "INVALID".red()
                };
                println!(
                    "    {:<10} diagram {} ({})",
                    status.bold(),
                    block.index,
                    block.kind
                );
                for defect in &block.result.defects {
                    print_defect(defect);
                }
            }
        }

        let blocks: usize = files.iter().map(|f| f.report.blocks.len()).sum();
        let invalid: usize = files.iter().map(|f| f.report.invalid_blocks().count()).sum();
        let defects: usize = files.iter().map(|f| f.report.defect_count()).sum();

        println!();
        println!("{}", "─".repeat(64));
        println!("  SUMMARY");
        println!(
            "    {} file(s), {} diagram(s), {} invalid, {} defect(s)",
            files.len(),
            blocks,
            invalid,
            defects
        );
        println!();
    }

    pub fn display_repair(&self, path: &Path, report: &RepairReport) {
        if self.is_json() {
            print_json(&repair_json(path, report));
            return;
        }

        println!();
        let headline = match &report.outcome {
            RepairOutcome::AlreadyValid => "All diagrams already valid; nothing to repair.".green(),
            RepairOutcome::Repaired => "All diagrams repaired.".green(),
            RepairOutcome::StillInvalid => "Repair finished with remaining defects.".yellow(),
            RepairOutcome::Unavailable(e) => format!("Repair unavailable: {}", e).red(),
            RepairOutcome::Rejected { before, after } => format!(
                "Repair rejected: rewrite returned {} diagram(s) instead of {}.",
                after, before
            )
            .red(),
        };
        println!("  {} {}", path.to_string_lossy().cyan(), headline.bold());

        for fix in &report.fixes {
            print_fix(fix);
        }

        let residual = report.residual_defects();
        if !residual.is_empty() {
            println!();
            println!("  Remaining defects:");
            for (index, defect) in residual {
                println!("    diagram {}", index);
                print_defect(defect);
            }
        }
        println!();
    }

    pub fn display_preview(&self, path: &Path, fixes: &[AppliedFix]) {
        if self.is_json() {
            print_json(&serde_json::json!({
                "file": path.to_string_lossy(),
                "fixes": fixes.iter().map(fix_json).collect::<Vec<_>>(),
            }));
            return;
        }
        println!();
        println!("  {}", path.to_string_lossy().cyan());
        if fixes.is_empty() {
            println!("    {}", "No invalid diagrams.".green());
        }
        for fix in fixes {
            print_fix(fix);
        }
        println!();
    }
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

fn print_defect(defect: &Defect) {
    let code = match defect.severity() {
        Severity::Error => defect.kind.code().red().bold(),
        Severity::Warning => defect.kind.code().yellow().bold(),
    };
    let location = defect
        .line
        .map(|l| format!("line {}", l))
        .unwrap_or_else(|| "block".to_string());
    println!("      {}  {:<8} {}", code, location, defect.message);
}

fn print_fix(fix: &AppliedFix) {
    let (label, detail) = match &fix.outcome {
        FixOutcome::Applied(d) => ("FIXED".green(), d),
        FixOutcome::Skipped(d) => ("SKIP".yellow(), d),
        FixOutcome::DryRun(d) => ("DRY-RUN".cyan(), d),
        FixOutcome::Error(d) => ("ERROR".red(), d),
    };
    let line = fix.line.map(|l| format!(":{}", l)).unwrap_or_default();
    println!(
        "    {} [diagram {}{} {}] {}",
        label,
        fix.block,
        line,
        fix.kind.code(),
        detail
    );
}

fn fix_json(fix: &AppliedFix) -> serde_json::Value {
    let (outcome, detail) = match &fix.outcome {
        FixOutcome::Applied(d) => ("applied", d),
        FixOutcome::Skipped(d) => ("skipped", d),
        FixOutcome::DryRun(d) => ("dry-run", d),
        FixOutcome::Error(d) => ("error", d),
    };
    serde_json::json!({
        "block": fix.block,
        "line": fix.line,
        "kind": fix.kind,
        "outcome": outcome,
        "detail": detail,
    })
}

pub fn check_json(files: &[FileReport]) -> serde_json::Value {
    serde_json::json!({
        "files": files,
        "summary": {
            "files": files.len(),
            "blocks": files.iter().map(|f| f.report.blocks.len()).sum::<usize>(),
            "invalid_blocks": files.iter().map(|f| f.report.invalid_blocks().count()).sum::<usize>(),
            "defects": files.iter().map(|f| f.report.defect_count()).sum::<usize>(),
        },
    })
}

pub fn repair_json(path: &Path, report: &RepairReport) -> serde_json::Value {
    let error = match &report.outcome {
        RepairOutcome::Unavailable(e) => Some(e.to_string()),
        RepairOutcome::Rejected { before, after } => Some(format!(
            "rewrite returned {} diagram block(s) instead of {}",
            after, before
        )),
        _ => None,
    };
    let residual: Vec<_> = report
        .residual_defects()
        .into_iter()
        .map(|(block, defect)| {
            serde_json::json!({
                "block": block,
                "line": defect.line,
                "kind": defect.kind,
                "message": defect.message,
            })
        })
        .collect();
    serde_json::json!({
        "file": path.to_string_lossy(),
        "outcome": report.outcome.label(),
        "error": error,
        "per_block_validity": report.per_block_validity(),
        "residual_defects": residual,
        "fixes": report.fixes.iter().map(fix_json).collect::<Vec<_>>(),
    })
}
