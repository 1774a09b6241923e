use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::checks::traits::{DefectKind, LineCheck, LineContext};
use crate::core::classify::DiagramKind;

/// A rounded node `id(...)` whose text holds its own `(...)` group, quoted or not.
pub(crate) static NESTED_PAREN_NODE: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| {
    Regex::new(r#"(?P<id>[A-Za-z0-9_]+)\(\s*"?(?P<text>[^()"]*\([^()"]*\)[^()"]*)"?\s*\)"#)
});

pub struct MixedShapeCheck;

impl LineCheck for MixedShapeCheck {
    fn name(&self) -> &'static str {
        "mixed-shape-delimiters"
    }

    fn kind(&self) -> DefectKind {
        DefectKind::MixedShapeDelimiters
    }

    fn inspect(&self, line: &LineContext<'_>) -> Result<Option<String>> {
        if line.text.contains("([") && line.text.contains("])") {
            return Ok(Some(
                "Node mixes rounded and square shape delimiters `([...])`; use one shape only"
                    .to_string(),
            ));
        }
        Ok(None)
    }
}

pub struct NestedParenTextCheck;

impl LineCheck for NestedParenTextCheck {
    fn name(&self) -> &'static str {
        "parenthesized-node-text"
    }

    fn kind(&self) -> DefectKind {
        DefectKind::ParenthesizedNodeText
    }

    fn inspect(&self, line: &LineContext<'_>) -> Result<Option<String>> {
        // Sequence messages are free text, not node shapes.
        if line.kind == DiagramKind::Sequence {
            return Ok(None);
        }
        let re = NESTED_PAREN_NODE
            .as_ref()
            .map_err(|e| anyhow!("nested paren pattern failed to compile: {}", e))?;

        Ok(re.captures(line.text).map(|caps| {
            format!(
                "Node '{}' has parentheses inside rounded-shape text; use square brackets: {}[\"{}\"]",
                &caps["id"],
                &caps["id"],
                caps["text"].trim()
            )
        }))
    }
}

pub struct BracketBraceCheck;

impl LineCheck for BracketBraceCheck {
    fn name(&self) -> &'static str {
        "malformed-bracket-brace"
    }

    fn kind(&self) -> DefectKind {
        DefectKind::MalformedBracketBrace
    }

    fn inspect(&self, line: &LineContext<'_>) -> Result<Option<String>> {
        let found: Vec<&str> = ["]{", "}["]
            .into_iter()
            .filter(|pattern| line.text.contains(pattern))
            .collect();
        if found.is_empty() {
            return Ok(None);
        }
        Ok(Some(format!(
            "Brace directly adjacent to bracket ({})",
            found.join(", ")
        )))
    }
}
