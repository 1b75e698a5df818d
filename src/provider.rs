//! The external type-information provider interface
//!
//! The engine never analyzes code itself; it asks an injected
//! [`TypeProvider`] for quick-info, diagnostics, completions, and emitted
//! output. Files are handed to the provider through an in-memory upsert call;
//! nothing touches a real disk. Provider lifecycle and caching (commonly a
//! per-compiler-options cache keyed by an options hash) are the caller's
//! policy, which is why the trait takes `&mut self` and the engine holds it
//! only for the duration of one invocation.
//!
//! [`FakeProvider`] is a deterministic scripted implementation used by the
//! crate's own tests and handy for embedders testing their integration.

use std::collections::BTreeMap;

use serde::Serialize;

/// Severity of a provider diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Error,
    Warning,
    Suggestion,
    Message,
}

/// One diagnostic for a file, with file-local offsets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub start: usize,
    pub length: usize,
    pub code: u32,
    pub level: DiagnosticLevel,
    pub message: String,
}

/// A documentation tag attached to a symbol (e.g. `@deprecated`)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocTag {
    pub name: String,
    pub text: Option<String>,
}

/// Quick-info for a symbol at a position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickInfo {
    /// Display text, e.g. `const a: number`
    pub text: String,
    pub docs: Option<String>,
    pub tags: Vec<DocTag>,
}

/// One completion entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionEntry {
    pub name: String,
    pub kind: Option<String>,
}

/// A completion response, optionally carrying the span the provider would
/// replace when applying an entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionResult {
    pub entries: Vec<CompletionEntry>,
    /// File-local `(start, length)` of the text an entry replaces
    pub replacement_span: Option<(usize, usize)>,
}

/// One file produced by compiling a source file
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedFile {
    pub path: String,
    pub text: String,
}

/// The oracle answering type questions about in-memory files
pub trait TypeProvider {
    /// Create or replace an in-memory file
    fn upsert_file(&mut self, path: &str, content: &str);

    /// Display info for the symbol at a file-local offset
    fn quick_info(&mut self, path: &str, offset: usize) -> Option<QuickInfo>;

    /// Semantic diagnostics for a file
    fn semantic_diagnostics(&mut self, path: &str) -> Vec<Diagnostic>;

    /// Syntactic diagnostics for a file
    fn syntactic_diagnostics(&mut self, path: &str) -> Vec<Diagnostic>;

    /// Completion entries at a file-local offset
    fn completions(&mut self, path: &str, offset: usize) -> CompletionResult;

    /// Compiled output files for a source file
    fn emit_output(&mut self, path: &str) -> Vec<EmittedFile>;
}

/// Scripted provider for tests
///
/// Unscripted quick-info is synthesized from the stored file content: the
/// identifier run containing the offset comes back as `var <name>: any`, so
/// most tests need no setup at all. Diagnostics, completions, and emits are
/// empty unless scripted.
#[derive(Default)]
pub struct FakeProvider {
    files: BTreeMap<String, String>,
    quick_infos: BTreeMap<(String, usize), QuickInfo>,
    diagnostics: BTreeMap<String, Vec<Diagnostic>>,
    completions: BTreeMap<String, CompletionResult>,
    emits: BTreeMap<String, Vec<EmittedFile>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script an exact quick-info answer for `(path, offset)`
    pub fn with_quick_info(mut self, path: &str, offset: usize, info: QuickInfo) -> Self {
        self.quick_infos.insert((path.to_string(), offset), info);
        self
    }

    /// Script the semantic diagnostics for a file
    pub fn with_diagnostics(mut self, path: &str, diagnostics: Vec<Diagnostic>) -> Self {
        self.diagnostics.insert(path.to_string(), diagnostics);
        self
    }

    /// Script the completion response for a file (returned at any offset)
    pub fn with_completions(mut self, path: &str, result: CompletionResult) -> Self {
        self.completions.insert(path.to_string(), result);
        self
    }

    /// Script the emitted files for a source file
    pub fn with_emit(mut self, path: &str, emitted: Vec<EmittedFile>) -> Self {
        self.emits.insert(path.to_string(), emitted);
        self
    }

    /// Content last upserted for a path, if any
    pub fn file_content(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(|s| s.as_str())
    }

    fn identifier_at(content: &str, offset: usize) -> Option<&str> {
        let bytes = content.as_bytes();
        if offset >= bytes.len() || !is_ident_byte(bytes[offset]) {
            return None;
        }
        let mut start = offset;
        while start > 0 && is_ident_byte(bytes[start - 1]) {
            start -= 1;
        }
        let mut end = offset;
        while end < bytes.len() && is_ident_byte(bytes[end]) {
            end += 1;
        }
        Some(&content[start..end])
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

impl TypeProvider for FakeProvider {
    fn upsert_file(&mut self, path: &str, content: &str) {
        self.files.insert(path.to_string(), content.to_string());
    }

    fn quick_info(&mut self, path: &str, offset: usize) -> Option<QuickInfo> {
        if let Some(info) = self.quick_infos.get(&(path.to_string(), offset)) {
            return Some(info.clone());
        }
        let content = self.files.get(path)?;
        Self::identifier_at(content, offset).map(|name| QuickInfo {
            text: format!("var {}: any", name),
            docs: None,
            tags: Vec::new(),
        })
    }

    fn semantic_diagnostics(&mut self, path: &str) -> Vec<Diagnostic> {
        self.diagnostics.get(path).cloned().unwrap_or_default()
    }

    fn syntactic_diagnostics(&mut self, _path: &str) -> Vec<Diagnostic> {
        Vec::new()
    }

    fn completions(&mut self, path: &str, _offset: usize) -> CompletionResult {
        self.completions.get(path).cloned().unwrap_or_default()
    }

    fn emit_output(&mut self, path: &str) -> Vec<EmittedFile> {
        self.emits.get(path).cloned().unwrap_or_default()
    }
}
