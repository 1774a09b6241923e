use crate::checks::traits::{Defect, DefectKind};
use crate::core::document::DiagramBlock;

use super::traits::{FixResult, Fixer};

pub struct FixerRegistry {
    fixers: Vec<Box<dyn Fixer>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixOutcome {
    Applied(String),
    Skipped(String),
    DryRun(String),
    Error(String),
}

#[derive(Debug, Clone)]
pub struct AppliedFix {
    pub block: usize,
    pub line: Option<usize>,
    pub kind: DefectKind,
    pub outcome: FixOutcome,
}

/// The rewritten content of one block plus what happened to each defect.
#[derive(Debug, Clone)]
pub struct BlockFix {
    pub content: String,
    pub fixes: Vec<AppliedFix>,
}

impl BlockFix {
    pub fn changed(&self) -> bool {
        self.fixes
            .iter()
            .any(|f| matches!(f.outcome, FixOutcome::Applied(_)))
    }
}

/// Splits a line into its text and its line terminator.
fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(text) = line.strip_suffix("\r\n") {
        (text, "\r\n")
    } else if let Some(text) = line.strip_suffix('\n') {
        (text, "\n")
    } else {
        (line, "")
    }
}

impl FixerRegistry {
    pub fn new(fixers: Vec<Box<dyn Fixer>>) -> Self {
        Self { fixers }
    }

    pub fn find_fixer(&self, kind: DefectKind) -> Option<&dyn Fixer> {
        self.fixers
            .iter()
            .find(|f| f.handles().contains(&kind))
            .map(|f| f.as_ref())
    }

    /// Applies fixers for `defects` to the block, line by line. Defects on the
    /// same line are applied in order, each to the output of the previous one.
    pub fn fix_block(&self, block: &DiagramBlock, defects: &[Defect], dry_run: bool) -> BlockFix {
        let mut lines: Vec<(String, &str)> = block
            .raw_content
            .split_inclusive('\n')
            .map(|l| {
                let (text, end) = split_terminator(l);
                (text.to_string(), end)
            })
            .collect();
        let mut fixes = Vec::new();

        for defect in defects {
            let outcome = match (self.find_fixer(defect.kind), defect.line) {
                (None, _) => FixOutcome::Skipped("No fixer available".to_string()),
                (Some(_), None) => FixOutcome::Skipped("Defect has no line to fix".to_string()),
                (Some(fixer), Some(number)) => match lines.get_mut(number - 1) {
                    None => FixOutcome::Error(format!("Line {} is out of range", number)),
                    Some((text, _)) if dry_run => FixOutcome::DryRun(fixer.describe(text.as_str())),
                    Some((text, _)) => match fixer.apply(text.as_str(), block.kind) {
                        Ok(FixResult::Applied { line, description }) => {
                            *text = line;
                            FixOutcome::Applied(description)
                        }
                        Ok(FixResult::Skipped { reason }) => FixOutcome::Skipped(reason),
                        Err(e) => FixOutcome::Error(e.to_string()),
                    },
                },
            };
            fixes.push(AppliedFix {
                block: block.index,
                line: defect.line,
                kind: defect.kind,
                outcome,
            });
        }

        let content = lines
            .iter()
            .map(|(text, end)| format!("{}{}", text, end))
            .collect();
        BlockFix { content, fixes }
    }
}

pub fn default_registry() -> FixerRegistry {
    let fixers: Vec<Box<dyn Fixer>> = vec![
        Box::new(super::shapes::MixedShapeFixer),
        Box::new(super::shapes::NestedParenFixer),
        Box::new(super::arrows::ArrowFixer),
    ];
    FixerRegistry::new(fixers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::extract_blocks;
    use crate::core::validator::validate_block;

    fn block(raw: &str) -> DiagramBlock {
        let doc = format!("```mermaid\n{}```\n", raw);
        extract_blocks(&doc).remove(0)
    }

    #[test]
    fn test_registry_finds_correct_fixer() {
        let registry = default_registry();
        assert!(registry.find_fixer(DefectKind::MixedShapeDelimiters).is_some());
        assert!(registry.find_fixer(DefectKind::ParenthesizedNodeText).is_some());
        assert!(registry.find_fixer(DefectKind::InvalidArrowSyntax).is_some());
        assert!(registry.find_fixer(DefectKind::UnmatchedBrackets).is_none());
        assert!(registry.find_fixer(DefectKind::MissingType).is_none());
    }

    #[test]
    fn test_fix_block_rewrites_defective_lines() {
        let block = block("flowchart TD\n  x([Start]) -->- y(\"Load (cached)\")\n  y --> z\n");
        let defects = validate_block(&block.raw_content).defects;
        let fixed = default_registry().fix_block(&block, &defects, false);
        assert!(fixed.changed());
        assert_eq!(
            fixed.content,
            "flowchart TD\n  x[Start] --> y[\"Load (cached)\"]\n  y --> z\n"
        );
        assert!(validate_block(&fixed.content).is_valid);
    }

    #[test]
    fn test_dry_run_leaves_content_untouched() {
        let block = block("flowchart TD\n  A-->-B\n");
        let defects = validate_block(&block.raw_content).defects;
        let fixed = default_registry().fix_block(&block, &defects, true);
        assert_eq!(fixed.content, block.raw_content);
        assert!(matches!(fixed.fixes[0].outcome, FixOutcome::DryRun(_)));
        assert!(!fixed.changed());
    }

    #[test]
    fn test_unfixable_defects_are_skipped() {
        let block = block("flowchart TD\n  A[Start --> B\n");
        let defects = validate_block(&block.raw_content).defects;
        let fixed = default_registry().fix_block(&block, &defects, false);
        assert_eq!(fixed.fixes.len(), 1);
        assert_eq!(
            fixed.fixes[0].outcome,
            FixOutcome::Skipped("No fixer available".to_string())
        );
        assert_eq!(fixed.content, block.raw_content);
    }

    #[test]
    fn test_crlf_line_endings_are_preserved() {
        let block = block("graph LR\r\nA-->-B\r\n");
        let defects = validate_block(&block.raw_content).defects;
        let fixed = default_registry().fix_block(&block, &defects, false);
        assert_eq!(fixed.content, "graph LR\r\nA-->B\r\n");
    }
}
