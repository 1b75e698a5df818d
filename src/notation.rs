//! Directive notation scanner
//!
//! Scans raw sample text line by line and pattern-matches the directive
//! comment syntax: flags (`// @name`, `// @name: value`), filename markers
//! (`// @filename: path`), cut markers (`// ---cut---` and friends), and
//! annotation markers (`//  ^?`, `//  ^|`, `//  ^^^ msg`). The scanner only
//! recognizes syntax and records byte ranges; classifying flags and resolving
//! marker targets to identifiers happen in later stages.
//!
//! Annotation markers address a token on the nearest preceding line that is
//! not itself a directive line. Stacked markers therefore all anchor to the
//! same source line: each marker line is removed from the logical numbering,
//! so it never becomes another marker's target.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::HoverdocError;

static BOOLEAN_FLAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^//\s?@(\w+)$").unwrap());
static VALUED_FLAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^//\s?@(\w+):\s?(.*?)\s*$").unwrap());
static CUT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*//\s?---cut---\s*$").unwrap());
static CUT_AFTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*//\s?---cut-after---\s*$").unwrap());
static CUT_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*//\s?---cut-start---\s*$").unwrap());
static CUT_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*//\s?---cut-end---\s*$").unwrap());
static ANNOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*//\s*)(\^\?|\^\||\^+)[ \t]?(.*?)\s*$").unwrap());

/// One recognized `// @name` / `// @name: value` line, value still a raw string
#[derive(Debug, Clone, PartialEq)]
pub struct FlagNotation {
    pub name: String,
    /// `None` for bare boolean flags
    pub value: Option<String>,
    /// Byte range of the whole line, trailing newline included
    pub start: usize,
    pub end: usize,
}

/// One `// @filename: path` line
#[derive(Debug, Clone, PartialEq)]
pub struct FilenameMarker {
    pub path: String,
    /// Byte offset where the marker line starts
    pub start: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutKind {
    /// Remove everything up to and including this line
    Cut,
    /// Remove this line and everything after it
    CutAfter,
    /// Open a paired removal region
    CutStart,
    /// Close a paired removal region
    CutEnd,
}

/// One cut marker line, spanning the full line including its newline
#[derive(Debug, Clone, PartialEq)]
pub struct CutMarker {
    pub kind: CutKind,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarkerKind {
    /// `^?`: quick-info query on the token above
    Query,
    /// `^|`: completion request at the position above
    Completion,
    /// `^^^`: highlighted span; the caret run length is the span length
    Highlight { caret_len: usize },
}

/// One annotation marker line with its resolved anchor line
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationMarker {
    pub kind: MarkerKind,
    /// Physical line the marker sits on
    pub line: usize,
    /// Nearest preceding non-directive line; the marker targets a token there
    pub target_line: usize,
    /// Character column of the first caret within its line
    pub character: usize,
    /// Trailing free text, if any
    pub text: Option<String>,
    /// Byte range of the whole marker line, trailing newline included
    pub start: usize,
    pub end: usize,
}

/// Everything one scanning pass extracts from raw text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOutput {
    /// Flags in input order, `filename` excluded
    pub flags: Vec<FlagNotation>,
    pub filenames: Vec<FilenameMarker>,
    pub cuts: Vec<CutMarker>,
    pub markers: Vec<AnnotationMarker>,
}

/// Scan raw text for all directive notation
///
/// Validates cut-start/cut-end pairing; all other interpretation is deferred.
pub fn scan(source: &str) -> Result<ScanOutput, HoverdocError> {
    let mut out = ScanOutput::default();
    let mut offset = 0;
    let mut last_source_line: Option<usize> = None;

    for (line_idx, raw_line) in source.split_inclusive('\n').enumerate() {
        let line_start = offset;
        let line_end = offset + raw_line.len();
        offset = line_end;

        let line = raw_line.trim_end_matches('\n').trim_end_matches('\r');

        if let Some(kind) = match_cut(line) {
            out.cuts.push(CutMarker {
                kind,
                start: line_start,
                end: line_end,
            });
            continue;
        }

        if let Some(caps) = ANNOTATION.captures(line) {
            let lead = caps.get(1).unwrap();
            let carets = caps.get(2).unwrap();
            let text = caps.get(3).map(|m| m.as_str()).unwrap_or("");
            let kind = match carets.as_str() {
                "^?" => MarkerKind::Query,
                "^|" => MarkerKind::Completion,
                run => MarkerKind::Highlight {
                    caret_len: run.len(),
                },
            };
            out.markers.push(AnnotationMarker {
                kind,
                line: line_idx,
                // With no preceding source line the marker anchors to itself
                // and resolves to no identifier later
                target_line: last_source_line.unwrap_or(line_idx),
                character: lead.as_str().len(),
                text: if text.is_empty() {
                    None
                } else {
                    Some(text.to_string())
                },
                start: line_start,
                end: line_end,
            });
            continue;
        }

        if let Some(caps) = VALUED_FLAG.captures(line) {
            let name = caps.get(1).unwrap().as_str();
            let value = caps.get(2).unwrap().as_str();
            // A trailing colon with nothing after it is still directive
            // syntax; it reads as the bare form of the flag
            if name == "filename" && !value.is_empty() {
                out.filenames.push(FilenameMarker {
                    path: value.to_string(),
                    start: line_start,
                });
            } else {
                out.flags.push(FlagNotation {
                    name: name.to_string(),
                    value: if value.is_empty() {
                        None
                    } else {
                        Some(value.to_string())
                    },
                    start: line_start,
                    end: line_end,
                });
            }
            continue;
        }

        if let Some(caps) = BOOLEAN_FLAG.captures(line) {
            out.flags.push(FlagNotation {
                name: caps.get(1).unwrap().as_str().to_string(),
                value: None,
                start: line_start,
                end: line_end,
            });
            continue;
        }

        last_source_line = Some(line_idx);
    }

    validate_cut_pairs(&out.cuts)?;
    Ok(out)
}

fn match_cut(line: &str) -> Option<CutKind> {
    // Order matters: ---cut--- is a prefix-shaped sibling of the others
    if CUT_START.is_match(line) {
        Some(CutKind::CutStart)
    } else if CUT_END.is_match(line) {
        Some(CutKind::CutEnd)
    } else if CUT_AFTER.is_match(line) {
        Some(CutKind::CutAfter)
    } else if CUT.is_match(line) {
        Some(CutKind::Cut)
    } else {
        None
    }
}

/// Pair the i-th start with the i-th end; counts must match and every start
/// must precede its end
fn validate_cut_pairs(cuts: &[CutMarker]) -> Result<(), HoverdocError> {
    let starts: Vec<&CutMarker> = cuts.iter().filter(|c| c.kind == CutKind::CutStart).collect();
    let ends: Vec<&CutMarker> = cuts.iter().filter(|c| c.kind == CutKind::CutEnd).collect();

    if starts.len() != ends.len() {
        return Err(HoverdocError::MismatchedCutMarkers {
            starts: starts.len(),
            ends: ends.len(),
        });
    }
    for (start, end) in starts.iter().zip(ends.iter()) {
        if start.start > end.start {
            return Err(HoverdocError::MisorderedCutPair {
                start: start.start,
                end: end.start,
            });
        }
    }
    Ok(())
}
