//! Marker target resolution
//!
//! Annotation markers carry a line and a caret column; this stage turns them
//! into absolute byte offsets in the original blob. Queries snap to the
//! identifier token under the caret on the anchor line. Completions target
//! the caret position itself and derive the textual prefix to filter entries
//! against. Highlights need no analysis at all; the caret run is the span.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::HoverdocError;
use crate::location::SourceMap;
use crate::notation::{AnnotationMarker, MarkerKind};

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z_$][A-Za-z0-9_$]*").unwrap());

/// A marker resolved to absolute offsets in the original blob
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedTarget {
    /// Start and length of the identifier token under the caret
    Query { start: usize, length: usize },
    /// Cursor offset and the prefix completions must start with
    Completion { offset: usize, prefix: String },
    /// The highlighted span and its optional message
    Highlight {
        start: usize,
        length: usize,
        text: Option<String>,
    },
}

impl ResolvedTarget {
    /// The offset queries/removal checks should test against
    pub fn offset(&self) -> usize {
        match self {
            ResolvedTarget::Query { start, .. } => *start,
            ResolvedTarget::Completion { offset, .. } => *offset,
            ResolvedTarget::Highlight { start, .. } => *start,
        }
    }
}

/// Resolve one annotation marker against the original blob
pub fn resolve_target(
    marker: &AnnotationMarker,
    code: &str,
    map: &SourceMap,
) -> Result<ResolvedTarget, HoverdocError> {
    let line_start = map
        .line_start(marker.target_line)
        .unwrap_or_else(|| code.len());
    let line_text = line_of(code, line_start);

    match &marker.kind {
        MarkerKind::Query => {
            let (start, length) = identifier_at_column(line_text, marker.character)
                .ok_or(HoverdocError::InvalidQuery { line: marker.line })?;
            Ok(ResolvedTarget::Query {
                start: line_start + start,
                length,
            })
        }
        MarkerKind::Completion => {
            let offset = line_start + marker.character.min(line_text.len());
            Ok(ResolvedTarget::Completion {
                offset,
                prefix: completion_prefix(code, offset),
            })
        }
        MarkerKind::Highlight { caret_len } => Ok(ResolvedTarget::Highlight {
            start: line_start + marker.character,
            length: *caret_len,
            text: marker.text.clone(),
        }),
    }
}

/// The identifier token on a line whose span contains a character column
///
/// Returns `(column, length)` of the token, or `None` when the caret points
/// at whitespace, punctuation, or past the end of the line.
pub fn identifier_at_column(line: &str, column: usize) -> Option<(usize, usize)> {
    IDENTIFIER
        .find_iter(line)
        .find(|m| m.start() <= column && column < m.end())
        .map(|m| (m.start(), m.end() - m.start()))
}

/// The identifier fragment ending at an offset, for completion filtering
///
/// Scans backward over identifier characters and dots, then keeps only the
/// segment after the last dot: at `value.to|` the prefix is `to`, and right
/// after a dot it is empty (meaning "show everything").
pub fn completion_prefix(code: &str, offset: usize) -> String {
    let bytes = code.as_bytes();
    let mut start = offset.min(bytes.len());
    while start > 0 {
        let b = bytes[start - 1];
        if b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b == b'.' {
            start -= 1;
        } else {
            break;
        }
    }
    code[start..offset]
        .rsplit('.')
        .next()
        .unwrap_or("")
        .to_string()
}

fn line_of(code: &str, line_start: usize) -> &str {
    let rest = &code[line_start.min(code.len())..];
    let end = rest.find('\n').unwrap_or(rest.len());
    rest[..end].trim_end_matches('\r')
}
