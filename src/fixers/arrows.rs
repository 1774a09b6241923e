use anyhow::Result;

use crate::checks::arrows::arrow_pattern;
use crate::checks::traits::DefectKind;
use crate::core::classify::DiagramKind;

use super::traits::{FixResult, Fixer};

pub struct ArrowFixer;

fn canonical_arrow(kind: DiagramKind) -> &'static str {
    match kind {
        DiagramKind::Sequence => "-->>",
        _ => "-->",
    }
}

impl Fixer for ArrowFixer {
    fn handles(&self) -> &[DefectKind] {
        &[DefectKind::InvalidArrowSyntax]
    }

    fn describe(&self, line: &str) -> String {
        format!("Normalize corrupted arrows in: {}", line.trim())
    }

    fn apply(&self, line: &str, kind: DiagramKind) -> Result<FixResult> {
        let re = arrow_pattern(kind)?;
        let fixed = re.replace_all(line, canonical_arrow(kind));
        if fixed == line {
            return Ok(FixResult::Skipped {
                reason: "No corrupted arrow found".to_string(),
            });
        }
        Ok(FixResult::Applied {
            line: fixed.into_owned(),
            description: format!("Normalized arrows to '{}'", canonical_arrow(kind)),
        })
    }
}
