use serde::Serialize;
use std::collections::HashMap;
use std::ops::Range;

use crate::core::classify::{classify, DiagramKind};

const FENCE: &str = "```";
pub const DIAGRAM_LANGUAGE: &str = "mermaid";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagramBlock {
    /// 1-based position among extracted blocks.
    pub index: usize,
    pub raw_content: String,
    pub kind: DiagramKind,
    #[serde(skip)]
    pub open_fence: Range<usize>,
    #[serde(skip)]
    pub content: Range<usize>,
    #[serde(skip)]
    pub close_fence: Range<usize>,
}

/// A markdown document together with the diagram blocks found in it.
#[derive(Debug, Clone)]
pub struct Document<'a> {
    text: &'a str,
    blocks: Vec<DiagramBlock>,
}

impl<'a> Document<'a> {
    pub fn parse(text: &'a str) -> Self {
        Self {
            text,
            blocks: extract_blocks(text),
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn blocks(&self) -> &[DiagramBlock] {
        &self.blocks
    }

    /// Rebuilds the document, substituting the content of the blocks named in
    /// `replacements` (keyed by block index). Fences and prose are copied verbatim.
    pub fn reassemble(&self, replacements: &HashMap<usize, String>) -> String {
        let mut out = String::with_capacity(self.text.len());
        let mut cursor = 0;
        for block in &self.blocks {
            out.push_str(&self.text[cursor..block.content.start]);
            match replacements.get(&block.index) {
                Some(content) => out.push_str(content),
                None => out.push_str(&self.text[block.content.clone()]),
            }
            cursor = block.content.end;
        }
        out.push_str(&self.text[cursor..]);
        out
    }
}

/// The info string of an opening fence, if `line` is one.
fn fence_tag(line: &str) -> Option<&str> {
    let tag = line.strip_prefix(FENCE)?.trim();
    if tag.is_empty() || tag.starts_with('`') {
        return None;
    }
    Some(tag)
}

fn is_close_fence(line: &str) -> bool {
    line.trim_end() == FENCE
}

enum OpenFence {
    Diagram(Range<usize>),
    /// A fenced block in another language; its content is not scanned.
    Foreign,
}

/// Finds every terminated diagram block, in document order.
///
/// A diagram fence that is not closed before the next opening fence of any
/// language (or the end of the text) is dropped, and scanning resumes from
/// that next fence.
pub fn extract_blocks(document: &str) -> Vec<DiagramBlock> {
    let mut blocks = Vec::new();
    let mut open: Option<OpenFence> = None;
    let mut offset = 0;

    for line in document.split_inclusive('\n') {
        let span = offset..offset + line.len();
        offset = span.end;

        if let Some(OpenFence::Foreign) = open {
            if is_close_fence(line) {
                open = None;
            }
            continue;
        }

        if let Some(tag) = fence_tag(line) {
            let next = if tag.eq_ignore_ascii_case(DIAGRAM_LANGUAGE) {
                OpenFence::Diagram(span)
            } else {
                OpenFence::Foreign
            };
            if let Some(OpenFence::Diagram(dropped)) = open.replace(next) {
                tracing::debug!(at = dropped.start, "dropping unterminated diagram fence");
            }
            continue;
        }

        if is_close_fence(line) {
            if let Some(OpenFence::Diagram(open_fence)) = open.take() {
                let content = open_fence.end..span.start;
                let raw_content = document[content.clone()].to_string();
                blocks.push(DiagramBlock {
                    index: blocks.len() + 1,
                    kind: classify(&raw_content),
                    raw_content,
                    open_fence,
                    content,
                    close_fence: span,
                });
            }
        }
    }

    if let Some(OpenFence::Diagram(dropped)) = open {
        tracing::debug!(at = dropped.start, "dropping diagram fence left open at end of document");
    }

    blocks
}
