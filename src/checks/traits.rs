use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::core::classify::DiagramKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefectKind {
    MissingType,
    UnmatchedBrackets,
    MixedShapeDelimiters,
    ParenthesizedNodeText,
    MalformedBracketBrace,
    InvalidArrowSyntax,
    ValidatorInternalError,
}

impl DefectKind {
    /// Stable rule code, used by `ignore.rules` in the config file.
    pub fn code(&self) -> &'static str {
        match self {
            DefectKind::ValidatorInternalError => "MMD-000",
            DefectKind::MissingType => "MMD-001",
            DefectKind::UnmatchedBrackets => "MMD-002",
            DefectKind::MixedShapeDelimiters => "MMD-003",
            DefectKind::ParenthesizedNodeText => "MMD-004",
            DefectKind::MalformedBracketBrace => "MMD-005",
            DefectKind::InvalidArrowSyntax => "MMD-006",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DefectKind::MissingType => "missing-type",
            DefectKind::UnmatchedBrackets => "unmatched-brackets",
            DefectKind::MixedShapeDelimiters => "mixed-shape-delimiters",
            DefectKind::ParenthesizedNodeText => "parenthesized-node-text",
            DefectKind::MalformedBracketBrace => "malformed-bracket-brace",
            DefectKind::InvalidArrowSyntax => "invalid-arrow-syntax",
            DefectKind::ValidatorInternalError => "validator-internal-error",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            DefectKind::MissingType => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl std::fmt::Display for DefectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Warning = 50,
    Error = 100,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defect {
    /// 1-based line inside the block content; `None` for block-level defects.
    pub line: Option<usize>,
    pub kind: DefectKind,
    pub message: String,
}

impl Defect {
    pub fn at_line(line: usize, kind: DefectKind, message: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            kind,
            message: message.into(),
        }
    }

    pub fn block_level(kind: DefectKind, message: impl Into<String>) -> Self {
        Self {
            line: None,
            kind,
            message: message.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl std::fmt::Display for Defect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: [{}] {}", line, self.kind, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub defects: Vec<Defect>,
}

impl ValidationResult {
    pub fn from_defects(defects: Vec<Defect>) -> Self {
        Self {
            is_valid: defects.is_empty(),
            defects,
        }
    }

    pub fn count_of(&self, kind: DefectKind) -> usize {
        self.defects.iter().filter(|d| d.kind == kind).count()
    }
}

/// What a check sees for one non-blank, non-comment line.
#[derive(Debug, Clone, Copy)]
pub struct LineContext<'a> {
    pub number: usize,
    pub text: &'a str,
    pub kind: DiagramKind,
}

pub trait LineCheck: Send + Sync {
    fn name(&self) -> &'static str;
    fn kind(&self) -> DefectKind;

    /// Returns the defect message when the line is faulty.
    fn inspect(&self, line: &LineContext<'_>) -> Result<Option<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let kinds = [
            DefectKind::MissingType,
            DefectKind::UnmatchedBrackets,
            DefectKind::MixedShapeDelimiters,
            DefectKind::ParenthesizedNodeText,
            DefectKind::MalformedBracketBrace,
            DefectKind::InvalidArrowSyntax,
            DefectKind::ValidatorInternalError,
        ];
        let mut codes: Vec<_> = kinds.iter().map(|k| k.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
    }

    #[test]
    fn test_missing_type_is_warning() {
        assert_eq!(DefectKind::MissingType.severity(), Severity::Warning);
        assert_eq!(DefectKind::InvalidArrowSyntax.severity(), Severity::Error);
        assert!(Severity::Error > Severity::Warning);
    }

    #[test]
    fn test_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&DefectKind::MixedShapeDelimiters).unwrap();
        assert_eq!(json, "\"mixed-shape-delimiters\"");
    }

    #[test]
    fn test_validation_result_validity_tracks_defects() {
        assert!(ValidationResult::from_defects(vec![]).is_valid);
        let result = ValidationResult::from_defects(vec![Defect::at_line(
            2,
            DefectKind::UnmatchedBrackets,
            "x",
        )]);
        assert!(!result.is_valid);
        assert_eq!(result.count_of(DefectKind::UnmatchedBrackets), 1);
    }

    #[test]
    fn test_defect_display() {
        let defect = Defect::at_line(3, DefectKind::InvalidArrowSyntax, "bad arrow");
        assert_eq!(defect.to_string(), "line 3: [invalid-arrow-syntax] bad arrow");
        let defect = Defect::block_level(DefectKind::MissingType, "no type");
        assert_eq!(defect.to_string(), "[missing-type] no type");
    }
}
