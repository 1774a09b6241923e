use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagramKind {
    Flowchart,
    Sequence,
    Class,
    State,
    EntityRelationship,
    Gantt,
    Pie,
    Journey,
    Unknown,
}

impl std::fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagramKind::Flowchart => write!(f, "flowchart"),
            DiagramKind::Sequence => write!(f, "sequence"),
            DiagramKind::Class => write!(f, "class"),
            DiagramKind::State => write!(f, "state"),
            DiagramKind::EntityRelationship => write!(f, "entity-relationship"),
            DiagramKind::Gantt => write!(f, "gantt"),
            DiagramKind::Pie => write!(f, "pie"),
            DiagramKind::Journey => write!(f, "journey"),
            DiagramKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Keyword prefixes, checked in order against the lower-cased header line.
const KIND_KEYWORDS: &[(&str, DiagramKind)] = &[
    ("flowchart", DiagramKind::Flowchart),
    ("graph", DiagramKind::Flowchart),
    ("sequencediagram", DiagramKind::Sequence),
    ("classdiagram", DiagramKind::Class),
    ("statediagram", DiagramKind::State),
    ("erdiagram", DiagramKind::EntityRelationship),
    ("gantt", DiagramKind::Gantt),
    ("pie", DiagramKind::Pie),
    ("journey", DiagramKind::Journey),
];

/// Lines starting with this marker are mermaid comments or `%%{init}%%` directives.
pub const COMMENT_MARKER: &str = "%%";

pub fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with(COMMENT_MARKER)
}

/// Classifies a block by its first meaningful line. Never fails.
pub fn classify(raw_content: &str) -> DiagramKind {
    let Some(header) = raw_content.lines().find(|line| !is_skippable(line)) else {
        return DiagramKind::Unknown;
    };
    let header = header.trim().to_lowercase();

    KIND_KEYWORDS
        .iter()
        .find(|(keyword, _)| header.starts_with(keyword))
        .map(|(_, kind)| *kind)
        .unwrap_or(DiagramKind::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_known_headers() {
        assert_eq!(classify("flowchart TD\nA-->B"), DiagramKind::Flowchart);
        assert_eq!(classify("graph LR\nA-->B"), DiagramKind::Flowchart);
        assert_eq!(classify("sequenceDiagram\nA->>B: hi"), DiagramKind::Sequence);
        assert_eq!(classify("classDiagram\nclass A"), DiagramKind::Class);
        assert_eq!(classify("stateDiagram-v2\n[*] --> A"), DiagramKind::State);
        assert_eq!(classify("erDiagram\nA ||--o{ B : has"), DiagramKind::EntityRelationship);
        assert_eq!(classify("gantt\ntitle Plan"), DiagramKind::Gantt);
        assert_eq!(classify("pie title Pets\n\"Dogs\" : 3"), DiagramKind::Pie);
        assert_eq!(classify("journey\ntitle Day"), DiagramKind::Journey);
    }

    #[test]
    fn test_skips_blank_and_comment_lines() {
        let raw = "\n   \n%% a comment\n%%{init: {'theme': 'dark'}}%%\n  sequenceDiagram\n";
        assert_eq!(classify(raw), DiagramKind::Sequence);
    }

    #[test]
    fn test_unknown_is_a_valid_result() {
        assert_eq!(classify(""), DiagramKind::Unknown);
        assert_eq!(classify("%% only comments\n\n"), DiagramKind::Unknown);
        assert_eq!(classify("A --> B"), DiagramKind::Unknown);
        assert_eq!(classify("mindmap\n  root"), DiagramKind::Unknown);
    }

    #[test]
    fn test_only_first_meaningful_line_counts() {
        assert_eq!(classify("A-->B\nflowchart TD"), DiagramKind::Unknown);
    }

    #[test]
    fn test_classifier_is_deterministic() {
        let raw = "flowchart TD\n  A[Start] --> B";
        assert_eq!(classify(raw), classify(raw));
    }
}
