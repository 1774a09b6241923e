use anyhow::Result;

use crate::checks::traits::DefectKind;
use crate::core::classify::DiagramKind;

pub enum FixResult {
    Applied { line: String, description: String },
    Skipped { reason: String },
}

pub trait Fixer: Send + Sync {
    /// Defect kinds this fixer handles
    fn handles(&self) -> &[DefectKind];

    /// Describe what would be done (for dry-run)
    fn describe(&self, line: &str) -> String;

    /// Rewrite one line of diagram source
    fn apply(&self, line: &str, kind: DiagramKind) -> Result<FixResult>;
}
