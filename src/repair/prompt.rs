use std::fmt::Write;

use crate::core::validator::DocumentReport;

const REPAIR_GUIDANCE: &str = "\
Fix ONLY the mermaid syntax errors listed above. Known fixes:
- `id([Text])` mixes shapes: use `id[Text]` or `id(Text)`, never both.
- `id(\"text (with parens)\")`: parentheses inside rounded nodes collide with the shape; use `id[\"text (with parens)\"]`.
- Node text with spaces or special characters: wrap it in double quotes inside the existing shape delimiters, e.g. `id[\"My node: v2\"]`.
- Corrupted arrows such as `-->-` or `-->>` in flowcharts: use the canonical `-->`.
- Every line must have as many `[` as `]` and as many `(` as `)`.
- Never put a brace directly against a bracket (`]{` or `}[`).

Keep all prose, headings and non-diagram content exactly as it is.
Return the complete corrected markdown document and nothing else.";

/// Builds the prompt sent to the rewriting model for one repair round-trip.
pub fn build_repair_prompt(document: &str, report: &DocumentReport) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "The following markdown document contains mermaid diagrams with syntax errors.\n\n",
    );
    prompt.push_str("## Errors found\n\n");

    for block in report.invalid_blocks() {
        // Writing to a String cannot fail.
        let _ = writeln!(prompt, "Diagram {} ({}):", block.index, block.kind);
        for defect in &block.result.defects {
            let _ = writeln!(prompt, "- {}", defect);
        }
        prompt.push('\n');
    }

    prompt.push_str("## Instructions\n\n");
    prompt.push_str(REPAIR_GUIDANCE);
    prompt.push_str("\n\n## Document\n\n");
    prompt.push_str(document);
    if !document.ends_with('\n') {
        prompt.push('\n');
    }
    prompt
}

fn is_fence_line(line: &str) -> bool {
    line.starts_with("```")
}

/// Model CLIs often wrap their whole answer in a ```markdown fence; strip it.
///
/// The outer fence is only removed when its closing ``` sits on a line of its
/// own and every fence inside it is paired. A truncated answer whose last
/// line happens to close an inner block is returned untouched.
pub fn unwrap_markdown_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed
        .strip_prefix("```markdown")
        .or_else(|| trimmed.strip_prefix("```md"))
    else {
        return response;
    };
    let Some(body) = rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n")) else {
        return response;
    };
    let Some(inner) = body.strip_suffix("```") else {
        return response;
    };
    if !(inner.is_empty() || inner.ends_with('\n')) {
        return response;
    }
    let inner_fences = inner.lines().filter(|line| is_fence_line(line)).count();
    if inner_fences % 2 != 0 {
        return response;
    }
    inner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::Document;
    use crate::core::validator::default_validator;

    #[test]
    fn test_prompt_lists_only_invalid_blocks() {
        let text = "# Doc\n\n```mermaid\nflowchart TD\nA-->B\n```\n\n```mermaid\nflowchart TD\nx([Label])\n```\n";
        let document = Document::parse(text);
        let report = default_validator().validate_document(&document);
        let prompt = build_repair_prompt(text, &report);

        assert!(prompt.contains("Diagram 2 (flowchart):"));
        assert!(!prompt.contains("Diagram 1 ("));
        assert!(prompt.contains("line 2: [mixed-shape-delimiters]"));
        assert!(prompt.contains("`id[\"text (with parens)\"]`"));
        assert!(prompt.ends_with(text));
    }

    #[test]
    fn test_unwrap_markdown_fence() {
        let wrapped = "```markdown\n# Doc\n\n```mermaid\ngraph LR\nA-->B\n```\n```\n";
        assert_eq!(
            unwrap_markdown_fence(wrapped),
            "# Doc\n\n```mermaid\ngraph LR\nA-->B\n```\n"
        );
    }

    #[test]
    fn test_unwrapped_response_is_returned_as_is() {
        let plain = "# Doc\n\n```mermaid\ngraph LR\nA-->B\n```\n";
        assert_eq!(unwrap_markdown_fence(plain), plain);
        let unterminated = "```markdown\n# Doc\n";
        assert_eq!(unwrap_markdown_fence(unterminated), unterminated);
    }

    #[test]
    fn test_truncated_wrapper_keeps_inner_closing_fence() {
        let truncated = "```markdown\n# Doc\n\n```mermaid\nflowchart TD\n  x([L]) --> y\n```\n";
        assert_eq!(unwrap_markdown_fence(truncated), truncated);
    }

    #[test]
    fn test_closing_fence_must_stand_alone() {
        let glued = "```markdown\n# Doc\ntext```";
        assert_eq!(unwrap_markdown_fence(glued), glued);
    }
}
