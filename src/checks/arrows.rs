use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::checks::traits::{DefectKind, LineCheck, LineContext};
use crate::core::classify::DiagramKind;

/// `-->` followed by a stray dash or any extra head. Sequence diagrams use
/// `-->>` legitimately, so only a tripled head counts there.
pub(crate) static CORRUPT_ARROW: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"-->(?:-+|>+)"));
pub(crate) static CORRUPT_SEQUENCE_ARROW: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"-->(?:-+|>>+)"));

pub(crate) fn arrow_pattern(kind: DiagramKind) -> Result<&'static Regex> {
    let pattern = match kind {
        DiagramKind::Sequence => &CORRUPT_SEQUENCE_ARROW,
        _ => &CORRUPT_ARROW,
    };
    pattern
        .as_ref()
        .map_err(|e| anyhow!("arrow pattern failed to compile: {}", e))
}

pub struct InvalidArrowCheck;

impl LineCheck for InvalidArrowCheck {
    fn name(&self) -> &'static str {
        "invalid-arrow-syntax"
    }

    fn kind(&self) -> DefectKind {
        DefectKind::InvalidArrowSyntax
    }

    fn inspect(&self, line: &LineContext<'_>) -> Result<Option<String>> {
        let re = arrow_pattern(line.kind)?;
        Ok(re.find(line.text).map(|m| {
            format!(
                "Corrupted arrow '{}'; use '{}'",
                m.as_str(),
                if line.kind == DiagramKind::Sequence { "-->>" } else { "-->" }
            )
        }))
    }
}
