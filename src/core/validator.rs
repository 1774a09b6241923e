use serde::Serialize;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::checks::traits::{Defect, DefectKind, LineCheck, LineContext, ValidationResult};
use crate::core::classify::{classify, is_skippable, DiagramKind};
use crate::core::document::{DiagramBlock, Document};

#[derive(Debug, Clone, Serialize)]
pub struct BlockReport {
    pub index: usize,
    pub kind: DiagramKind,
    pub result: ValidationResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub blocks: Vec<BlockReport>,
}

impl DocumentReport {
    pub fn is_valid(&self) -> bool {
        self.blocks.iter().all(|b| b.result.is_valid)
    }

    pub fn invalid_blocks(&self) -> impl Iterator<Item = &BlockReport> {
        self.blocks.iter().filter(|b| !b.result.is_valid)
    }

    pub fn per_block_validity(&self) -> Vec<bool> {
        self.blocks.iter().map(|b| b.result.is_valid).collect()
    }

    pub fn defect_count(&self) -> usize {
        self.blocks.iter().map(|b| b.result.defects.len()).sum()
    }
}

pub struct Validator {
    checks: Vec<Box<dyn LineCheck>>,
    flag_unknown_kind: bool,
}

impl Validator {
    pub fn new(checks: Vec<Box<dyn LineCheck>>) -> Self {
        Self {
            checks,
            flag_unknown_kind: true,
        }
    }

    /// Drops every check whose rule code (e.g. `MMD-005`) is listed.
    pub fn without_rules(mut self, rules: &[String]) -> Self {
        let ignored = |kind: DefectKind| rules.iter().any(|r| r.eq_ignore_ascii_case(kind.code()));
        self.checks.retain(|check| !ignored(check.kind()));
        if ignored(DefectKind::MissingType) {
            self.flag_unknown_kind = false;
        }
        self
    }

    pub fn validate(&self, raw_content: &str) -> ValidationResult {
        self.validate_as(raw_content, classify(raw_content))
    }

    pub fn validate_block(&self, block: &DiagramBlock) -> ValidationResult {
        self.validate_as(&block.raw_content, block.kind)
    }

    fn validate_as(&self, raw_content: &str, kind: DiagramKind) -> ValidationResult {
        let mut defects = Vec::new();

        if kind == DiagramKind::Unknown && self.flag_unknown_kind {
            defects.push(Defect::block_level(
                DefectKind::MissingType,
                "Diagram type could not be determined from the first line",
            ));
        }

        for (idx, text) in raw_content.lines().enumerate() {
            if is_skippable(text) {
                continue;
            }
            let line = LineContext {
                number: idx + 1,
                text,
                kind,
            };
            for check in &self.checks {
                if let Some(defect) = run_check(check.as_ref(), &line) {
                    defects.push(defect);
                }
            }
        }

        ValidationResult::from_defects(defects)
    }

    pub fn validate_document(&self, document: &Document<'_>) -> DocumentReport {
        let blocks = document
            .blocks()
            .iter()
            .map(|block| BlockReport {
                index: block.index,
                kind: block.kind,
                result: self.validate_block(block),
            })
            .collect();
        DocumentReport { blocks }
    }
}

/// Runs one check, turning an error or a panic into an internal-error defect.
fn run_check(check: &dyn LineCheck, line: &LineContext<'_>) -> Option<Defect> {
    let outcome = catch_unwind(AssertUnwindSafe(|| check.inspect(line)));
    let failure = match outcome {
        Ok(Ok(None)) => return None,
        Ok(Ok(Some(message))) => return Some(Defect::at_line(line.number, check.kind(), message)),
        Ok(Err(e)) => e.to_string(),
        Err(_) => "check panicked".to_string(),
    };
    tracing::warn!(check = check.name(), line = line.number, error = %failure, "diagram check failed");
    Some(Defect::at_line(
        line.number,
        DefectKind::ValidatorInternalError,
        format!("Check '{}' failed: {}", check.name(), failure),
    ))
}

pub fn default_validator() -> Validator {
    let checks: Vec<Box<dyn LineCheck>> = vec![
        Box::new(crate::checks::UnmatchedBracketsCheck),
        Box::new(crate::checks::MixedShapeCheck),
        Box::new(crate::checks::NestedParenTextCheck),
        Box::new(crate::checks::BracketBraceCheck),
        Box::new(crate::checks::InvalidArrowCheck),
    ];
    Validator::new(checks)
}

pub fn validate_block(raw_content: &str) -> ValidationResult {
    default_validator().validate(raw_content)
}
