use anyhow::Result;

use crate::checks::traits::{DefectKind, LineCheck, LineContext};

pub struct UnmatchedBracketsCheck;

fn count(text: &str, c: char) -> usize {
    text.chars().filter(|ch| *ch == c).count()
}

impl LineCheck for UnmatchedBracketsCheck {
    fn name(&self) -> &'static str {
        "unmatched-brackets"
    }

    fn kind(&self) -> DefectKind {
        DefectKind::UnmatchedBrackets
    }

    fn inspect(&self, line: &LineContext<'_>) -> Result<Option<String>> {
        let mut problems = Vec::new();

        let (open_sq, close_sq) = (count(line.text, '['), count(line.text, ']'));
        if open_sq != close_sq {
            problems.push(format!("{} '[' vs {} ']'", open_sq, close_sq));
        }

        let (open_paren, close_paren) = (count(line.text, '('), count(line.text, ')'));
        if open_paren != close_paren {
            problems.push(format!("{} '(' vs {} ')'", open_paren, close_paren));
        }

        if problems.is_empty() {
            return Ok(None);
        }
        Ok(Some(format!("Unbalanced brackets: {}", problems.join(", "))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classify::DiagramKind;

    fn inspect(text: &str) -> Option<String> {
        let line = LineContext {
            number: 1,
            text,
            kind: DiagramKind::Flowchart,
        };
        UnmatchedBracketsCheck.inspect(&line).unwrap()
    }

    #[test]
    fn test_balanced_lines_pass() {
        assert!(inspect("A[Start] --> B(End)").is_none());
        assert!(inspect("x([Label])").is_none());
        assert!(inspect("no brackets here").is_none());
    }

    #[test]
    fn test_missing_close_square() {
        let message = inspect("A[Start --> B").unwrap();
        assert!(message.contains("'['"));
    }

    #[test]
    fn test_both_mismatches_reported_in_one_message() {
        let message = inspect("A[(Start --> B").unwrap();
        assert!(message.contains("'['"));
        assert!(message.contains("'('"));
    }
}
