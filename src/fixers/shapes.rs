use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::checks::shapes::NESTED_PAREN_NODE;
use crate::checks::traits::DefectKind;
use crate::core::classify::DiagramKind;

use super::traits::{FixResult, Fixer};

static STADIUM_NODE: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"(?P<id>[A-Za-z0-9_]*)\(\[(?P<text>[^\[\]()]*)\]\)"));

/// `id([Text])` becomes `id[Text]`.
pub struct MixedShapeFixer;

impl Fixer for MixedShapeFixer {
    fn handles(&self) -> &[DefectKind] {
        &[DefectKind::MixedShapeDelimiters]
    }

    fn describe(&self, line: &str) -> String {
        format!("Collapse `([...])` node shapes to `[...]` in: {}", line.trim())
    }

    fn apply(&self, line: &str, _kind: DiagramKind) -> Result<FixResult> {
        let re = STADIUM_NODE
            .as_ref()
            .map_err(|e| anyhow!("stadium pattern failed to compile: {}", e))?;
        let fixed = re.replace_all(line, "${id}[${text}]");
        if fixed == line {
            return Ok(FixResult::Skipped {
                reason: "No simple `([...])` node found".to_string(),
            });
        }
        Ok(FixResult::Applied {
            line: fixed.into_owned(),
            description: "Replaced mixed `([...])` shape with square brackets".to_string(),
        })
    }
}

/// `id("a (b)")` and `id(a (b))` become `id["a (b)"]`.
pub struct NestedParenFixer;

impl Fixer for NestedParenFixer {
    fn handles(&self) -> &[DefectKind] {
        &[DefectKind::ParenthesizedNodeText]
    }

    fn describe(&self, line: &str) -> String {
        format!("Switch rounded nodes with parenthesized text to square shape in: {}", line.trim())
    }

    fn apply(&self, line: &str, _kind: DiagramKind) -> Result<FixResult> {
        let re = NESTED_PAREN_NODE
            .as_ref()
            .map_err(|e| anyhow!("nested paren pattern failed to compile: {}", e))?;
        let fixed = re.replace_all(line, |caps: &Captures| {
            format!("{}[\"{}\"]", &caps["id"], caps["text"].trim())
        });
        if fixed == line {
            return Ok(FixResult::Skipped {
                reason: "No rounded node with nested parentheses found".to_string(),
            });
        }
        Ok(FixResult::Applied {
            line: fixed.into_owned(),
            description: "Moved parenthesized node text into a quoted square shape".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn applied(result: FixResult) -> String {
        match result {
            FixResult::Applied { line, .. } => line,
            FixResult::Skipped { reason } => panic!("expected fix, skipped: {reason}"),
        }
    }

    #[test]
    fn test_mixed_shape_collapses_to_square() {
        let line = applied(MixedShapeFixer.apply("  x([Label]) --> y([Other])", DiagramKind::Flowchart).unwrap());
        assert_eq!(line, "  x[Label] --> y[Other]");
    }

    #[test]
    fn test_mixed_shape_skips_when_nothing_matches() {
        let result = MixedShapeFixer.apply("A[Label]", DiagramKind::Flowchart).unwrap();
        assert!(matches!(result, FixResult::Skipped { .. }));
    }

    #[test]
    fn test_nested_paren_quoted_text() {
        let line = applied(
            NestedParenFixer
                .apply(r#"A("text (with parens)") --> B"#, DiagramKind::Flowchart)
                .unwrap(),
        );
        assert_eq!(line, r#"A["text (with parens)"] --> B"#);
    }

    #[test]
    fn test_nested_paren_bare_text() {
        let line = applied(NestedParenFixer.apply("A(Load (cached))", DiagramKind::Flowchart).unwrap());
        assert_eq!(line, r#"A["Load (cached)"]"#);
    }
}
