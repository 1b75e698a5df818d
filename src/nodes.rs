//! Positioned nodes attached to the final output
//!
//! A [`Node`] is one structured fact about the sample: a hover, a query
//! answer, a highlighted span, a completion list, a diagnostic, or a custom
//! tag. Nodes are born with raw offsets into the pre-removal text, shifted by
//! the removal pass, and finally given line/character positions. The enum is
//! closed and every consumption site matches exhaustively, so adding a
//! variant fails loudly everywhere it matters.

use serde::Serialize;

use crate::provider::{CompletionEntry, DiagnosticLevel, DocTag};

/// Quick-info payload shared by hover and query nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverNode {
    pub start: usize,
    pub length: usize,
    pub line: usize,
    pub character: usize,
    /// Display text for the symbol, e.g. `const a: number`
    pub text: String,
    pub docs: Option<String>,
    /// Documentation tags attached to the symbol
    pub tags: Vec<DocTag>,
}

/// A `^^^` span with its optional trailing message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightNode {
    pub start: usize,
    pub length: usize,
    pub line: usize,
    pub character: usize,
    pub text: Option<String>,
}

/// A `^|` completion request with its filtered entries
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionNode {
    pub start: usize,
    pub length: usize,
    pub line: usize,
    pub character: usize,
    /// The identifier fragment completions were filtered against
    pub prefix: String,
    pub completions: Vec<CompletionEntry>,
}

/// One provider diagnostic
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorNode {
    pub start: usize,
    pub length: usize,
    pub line: usize,
    pub character: usize,
    pub text: String,
    pub code: u32,
    pub level: DiagnosticLevel,
    /// Path of the virtual file the diagnostic was reported in
    pub filepath: String,
}

/// A custom tag directive extracted for the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagNode {
    pub start: usize,
    pub length: usize,
    pub line: usize,
    pub character: usize,
    pub name: String,
    pub text: Option<String>,
}

/// One positioned fact about the final code
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Hover(HoverNode),
    Query(HoverNode),
    Highlight(HighlightNode),
    Completion(CompletionNode),
    Error(ErrorNode),
    Tag(TagNode),
}

impl Node {
    /// Stable lowercase name of the variant, also the sort tie-break key
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Hover(_) => "hover",
            Node::Query(_) => "query",
            Node::Highlight(_) => "highlight",
            Node::Completion(_) => "completion",
            Node::Error(_) => "error",
            Node::Tag(_) => "tag",
        }
    }

    pub fn start(&self) -> usize {
        match self {
            Node::Hover(n) | Node::Query(n) => n.start,
            Node::Highlight(n) => n.start,
            Node::Completion(n) => n.start,
            Node::Error(n) => n.start,
            Node::Tag(n) => n.start,
        }
    }

    pub fn length(&self) -> usize {
        match self {
            Node::Hover(n) | Node::Query(n) => n.length,
            Node::Highlight(n) => n.length,
            Node::Completion(n) => n.length,
            Node::Error(n) => n.length,
            Node::Tag(n) => n.length,
        }
    }

    pub fn set_start(&mut self, start: usize) {
        match self {
            Node::Hover(n) | Node::Query(n) => n.start = start,
            Node::Highlight(n) => n.start = start,
            Node::Completion(n) => n.start = start,
            Node::Error(n) => n.start = start,
            Node::Tag(n) => n.start = start,
        }
    }

    pub fn set_position(&mut self, line: usize, character: usize) {
        match self {
            Node::Hover(n) | Node::Query(n) => {
                n.line = line;
                n.character = character;
            }
            Node::Highlight(n) => {
                n.line = line;
                n.character = character;
            }
            Node::Completion(n) => {
                n.line = line;
                n.character = character;
            }
            Node::Error(n) => {
                n.line = line;
                n.character = character;
            }
            Node::Tag(n) => {
                n.line = line;
                n.character = character;
            }
        }
    }
}

/// Sort nodes by final start, tie-broken by type name, then collapse
/// same-type same-offset collisions
///
/// The collision rule is deliberate: when remapping lands two nodes of the
/// same type on the same offset, the later-created one wins (creation order
/// is scan/lookup order, preserved here by the stable sort).
pub fn sort_and_dedupe(mut nodes: Vec<Node>) -> Vec<Node> {
    nodes.sort_by(|a, b| {
        a.start()
            .cmp(&b.start())
            .then_with(|| a.type_name().cmp(b.type_name()))
    });

    let mut result: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        let replaces_last = result
            .last()
            .map(|prev| prev.start() == node.start() && prev.type_name() == node.type_name())
            .unwrap_or(false);
        if replaces_last {
            *result.last_mut().unwrap() = node;
        } else {
            result.push(node);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag_at(start: usize, name: &str) -> Node {
        Node::Tag(TagNode {
            start,
            length: 0,
            line: 0,
            character: 0,
            name: name.to_string(),
            text: None,
        })
    }

    fn highlight_at(start: usize) -> Node {
        Node::Highlight(HighlightNode {
            start,
            length: 3,
            line: 0,
            character: 0,
            text: None,
        })
    }

    #[test]
    fn test_sort_by_start_then_type() {
        let sorted = sort_and_dedupe(vec![tag_at(9, "a"), highlight_at(4), tag_at(4, "b")]);
        // highlight sorts before tag at the same offset (lexicographic)
        assert_eq!(sorted[0].type_name(), "highlight");
        assert_eq!(sorted[1].type_name(), "tag");
        assert_eq!(sorted[2].start(), 9);
    }

    #[test]
    fn test_same_type_same_offset_later_wins() {
        let sorted = sort_and_dedupe(vec![tag_at(4, "first"), tag_at(4, "second")]);
        assert_eq!(sorted.len(), 1);
        match &sorted[0] {
            Node::Tag(tag) => assert_eq!(tag.name, "second"),
            other => panic!("expected tag, got {}", other.type_name()),
        }
    }

    #[test]
    fn test_different_types_same_offset_both_survive() {
        let sorted = sort_and_dedupe(vec![tag_at(4, "a"), highlight_at(4)]);
        assert_eq!(sorted.len(), 2);
    }

    #[test]
    fn test_serialization_is_type_tagged() {
        let json = serde_json::to_value(tag_at(2, "warn")).unwrap();
        assert_eq!(json["type"], "tag");
        assert_eq!(json["start"], 2);
        assert_eq!(json["name"], "warn");
    }
}
