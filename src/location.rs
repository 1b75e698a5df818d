//! Position tracking and offset/line conversion for sample sources
//!
//! Every node the engine produces carries both a byte offset and a resolved
//! `line:character` position. Offsets are what the scanner and the removal
//! pass work in; positions are what renderers want. [`SourceMap`] is the
//! bridge: it precomputes a line-start table once (O(n)) and then answers
//! conversions in either direction with a binary search over that table.
//!
//! `\r\n` is treated as a single line terminator belonging to the preceding
//! line: line starts are recorded after the `\n` only, so no position ever
//! addresses the byte between `\r` and `\n`.

use std::fmt;

/// A 0-indexed position in sample source (line and character)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.character)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

/// Fast bidirectional conversion between byte offsets and positions
pub struct SourceMap {
    /// Byte offsets where each line starts
    line_starts: Vec<usize>,
    /// Total length of the source in bytes
    len: usize,
}

impl SourceMap {
    /// Build the line-start table for a source text
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];

        for (byte_pos, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(byte_pos + 1);
            }
        }

        Self {
            line_starts,
            len: source.len(),
        }
    }

    /// Convert a byte offset to a line/character position
    pub fn index_to_pos(&self, offset: usize) -> Position {
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i - 1);

        let character = offset - self.line_starts[line];

        Position::new(line, character)
    }

    /// Convert a line/character position back to a byte offset
    ///
    /// Positions past the last line clamp to the end of the text; a character
    /// past a line's end resolves into the following line's offsets, which the
    /// caller is expected to avoid.
    pub fn pos_to_index(&self, line: usize, character: usize) -> usize {
        match self.line_starts.get(line) {
            Some(start) => start + character,
            None => self.len,
        }
    }

    /// Total number of lines in the source
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset of the start of a line
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }
}
