//! Virtual file splitting
//!
//! A sample may describe several logical files via `// @filename: path`
//! markers. This stage partitions the blob into ordered [`VirtualFile`]
//! segments. The marker line stays inside the segment it opens, and the
//! concatenation of all segment contents in offset order reconstructs the
//! original blob byte for byte; every later stage relies on that invariant
//! to translate between per-file and blob-global offsets.

use crate::notation::FilenameMarker;

/// Extensions the external provider can answer queries for
const LSP_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs", "mts", "cts"];

/// Placeholder filename for an implicit first segment whose default name
/// collides with an explicit `@filename` marker
const IMPLICIT_PLACEHOLDER: &str = "__implicit__";

/// One contiguous slice of the sample attributed to a logical file
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct VirtualFile {
    /// Byte offset of this segment within the original blob
    pub offset: usize,
    /// Last path segment, e.g. `util.ts`
    pub filename: String,
    /// Full path as written in the marker (or the default filename)
    pub filepath: String,
    /// Exact slice of the blob, marker line included
    pub content: String,
    /// Lowercased extension, empty if the path has none
    pub extension: String,
    /// Whether the provider should be consulted for this file
    pub support_lsp: bool,
}

impl VirtualFile {
    fn new(offset: usize, filepath: &str, content: &str, has_marker_line: bool) -> Self {
        let filename = filepath.rsplit('/').next().unwrap_or(filepath).to_string();
        let extension = extension_of(filepath);

        // A segment holding nothing beyond its own marker line has no code
        // the provider could answer questions about
        let body = if has_marker_line {
            content.split_once('\n').map(|(_, rest)| rest).unwrap_or("")
        } else {
            content
        };
        let support_lsp =
            LSP_EXTENSIONS.contains(&extension.as_str()) && !body.trim().is_empty();

        Self {
            offset,
            filename,
            filepath: filepath.to_string(),
            content: content.to_string(),
            extension,
            support_lsp,
        }
    }

    /// Whether a blob-global offset falls inside this segment
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.offset && offset < self.offset + self.content.len()
    }
}

/// Lowercased extension of a path, empty when absent
pub fn extension_of(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
        _ => String::new(),
    }
}

/// Split a blob into virtual files on its filename markers
///
/// The implicit first segment (text before any marker) is named
/// `default_filename` unless that name also appears as an explicit marker, in
/// which case it is renamed to an internal placeholder to avoid the collision.
pub fn split_virtual_files(
    code: &str,
    markers: &[FilenameMarker],
    default_filename: &str,
) -> Vec<VirtualFile> {
    let mut files = Vec::new();

    let first_marker_start = markers.first().map(|m| m.start).unwrap_or(code.len());
    if first_marker_start > 0 || markers.is_empty() {
        let implicit_name = if markers.iter().any(|m| m.path == default_filename) {
            let ext = extension_of(default_filename);
            if ext.is_empty() {
                IMPLICIT_PLACEHOLDER.to_string()
            } else {
                format!("{}.{}", IMPLICIT_PLACEHOLDER, ext)
            }
        } else {
            default_filename.to_string()
        };
        files.push(VirtualFile::new(
            0,
            &implicit_name,
            &code[..first_marker_start],
            false,
        ));
    }

    for (i, marker) in markers.iter().enumerate() {
        let end = markers.get(i + 1).map(|m| m.start).unwrap_or(code.len());
        files.push(VirtualFile::new(
            marker.start,
            &marker.path,
            &code[marker.start..end],
            true,
        ));
    }

    files
}
