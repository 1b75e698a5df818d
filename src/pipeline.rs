//! The output assembler
//!
//! [`Pipeline`] drives one invocation through its stages:
//!
//! ```text
//! scanning -> option-resolution -> file-splitting -> provider-queries
//!          -> removal -> position-resolution -> done
//! ```
//!
//! Any fatal condition aborts the whole run; no partial result is returned.
//! Three terminal modes exist: the default strips notation and remaps every
//! node; `keepNotations` records the removal list in meta but applies nothing,
//! for adapters that remap through their own source maps first; `showEmit`
//! discards notation-derived nodes and removals and substitutes the
//! provider's emitted text as the output code.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::HoverdocError;
use crate::flags::{apply_handbook, resolve_flag, FlagKind, ParsedFlag};
use crate::locate::{resolve_target, ResolvedTarget};
use crate::location::SourceMap;
use crate::nodes::{
    sort_and_dedupe, CompletionNode, ErrorNode, HighlightNode, HoverNode, Node, TagNode,
};
use crate::notation::{scan, CutKind, ScanOutput};
use crate::options::{
    default_compiler_options, CompilerOptionDecl, HandbookOptions, SampleOptions,
};
use crate::provider::{CompletionEntry, TypeProvider};
use crate::ranges::{apply_removals, in_any_range, merge_ranges, Removal};
use crate::vfs::{extension_of, split_virtual_files, VirtualFile};

static IDENTIFIER: once_cell::sync::Lazy<regex::Regex> =
    once_cell::sync::Lazy::new(|| regex::Regex::new(r"[A-Za-z_$][A-Za-z0-9_$]*").unwrap());

/// Everything learned about a sample besides its code and nodes
#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    /// Merged removal ranges over the original blob
    pub removals: Vec<Removal>,
    pub flag_notations: Vec<ParsedFlag>,
    pub virtual_files: Vec<VirtualFile>,
    /// Raw target offsets of `^?`, `^|`, `^^^` markers, in marker order
    pub position_queries: Vec<usize>,
    pub position_completions: Vec<usize>,
    pub position_highlights: Vec<usize>,
    pub compiler_options: BTreeMap<String, serde_json::Value>,
    pub handbook_options: HandbookOptions,
    /// Extension of the output code (reset by `showEmit`)
    pub extension: String,
}

/// The final product of one invocation
#[derive(Debug, Clone, Serialize)]
pub struct Sample {
    pub code: String,
    pub nodes: Vec<Node>,
    pub meta: Meta,
}

impl Sample {
    pub fn hovers(&self) -> Vec<&HoverNode> {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                Node::Hover(h) => Some(h),
                _ => None,
            })
            .collect()
    }

    pub fn queries(&self) -> Vec<&HoverNode> {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                Node::Query(q) => Some(q),
                _ => None,
            })
            .collect()
    }

    pub fn highlights(&self) -> Vec<&HighlightNode> {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                Node::Highlight(h) => Some(h),
                _ => None,
            })
            .collect()
    }

    pub fn completions(&self) -> Vec<&CompletionNode> {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                Node::Completion(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<&ErrorNode> {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                Node::Error(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    pub fn tags(&self) -> Vec<&TagNode> {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                Node::Tag(t) => Some(t),
                _ => None,
            })
            .collect()
    }
}

/// One configured invocation of the engine
pub struct Pipeline<'a> {
    options: SampleOptions,
    compiler_table: &'a [CompilerOptionDecl],
}

impl Pipeline<'static> {
    /// A pipeline using the built-in compiler-option table
    pub fn new(options: SampleOptions) -> Self {
        Pipeline {
            options,
            compiler_table: default_compiler_options(),
        }
    }
}

impl<'a> Pipeline<'a> {
    /// A pipeline with a caller-supplied compiler-option table
    pub fn with_compiler_table(options: SampleOptions, table: &'a [CompilerOptionDecl]) -> Self {
        Pipeline {
            options,
            compiler_table: table,
        }
    }

    /// Process one annotated sample
    pub fn run(
        &self,
        code: &str,
        extension: &str,
        provider: &mut dyn TypeProvider,
    ) -> Result<Sample, HoverdocError> {
        let map = SourceMap::new(code);

        // -- scanning
        let scanned = scan(code)?;

        // -- option-resolution
        let mut handbook = self.options.handbook.clone();
        let mut compiler_options: BTreeMap<String, serde_json::Value> =
            self.options.compiler_defaults.iter().cloned().collect();
        let mut flag_notations = Vec::with_capacity(scanned.flags.len());
        let mut nodes: Vec<Node> = Vec::new();

        for flag in &scanned.flags {
            let parsed = resolve_flag(flag, &self.options.custom_tags, self.compiler_table)?;
            match parsed.kind {
                FlagKind::Tag => nodes.push(Node::Tag(TagNode {
                    // Anchored just past the directive line so it survives
                    // the line's own removal and lands where the line was
                    start: parsed.end,
                    length: 0,
                    line: 0,
                    character: 0,
                    name: parsed.name.clone(),
                    text: parsed.value.as_str().map(|s| s.to_string()),
                })),
                FlagKind::CompilerOption => {
                    compiler_options.insert(parsed.name.clone(), parsed.value.clone());
                }
                FlagKind::HandbookOption => apply_handbook(&mut handbook, &parsed),
                FlagKind::Unknown => {}
            }
            flag_notations.push(parsed);
        }

        if !handbook.no_error_validation {
            if let Some(unknown) = flag_notations.iter().find(|f| f.kind == FlagKind::Unknown) {
                return Err(HoverdocError::UnknownFlag {
                    name: unknown.name.clone(),
                });
            }
        }
        if handbook.show_emit && handbook.keep_notations {
            return Err(HoverdocError::EmitConflictsWithKeepNotations);
        }

        // -- file-splitting
        let ext = extension.trim_start_matches('.').to_lowercase();
        let default_filename = self
            .options
            .default_filename
            .clone()
            .unwrap_or_else(|| {
                if ext.is_empty() {
                    "index".to_string()
                } else {
                    format!("index.{}", ext)
                }
            });
        let virtual_files = split_virtual_files(code, &scanned.filenames, &default_filename);

        let removals = merge_ranges(collect_removals(&scanned, &flag_notations, code.len()));

        // -- provider-queries
        for (path, content) in &self.options.extra_files {
            provider.upsert_file(path, content);
        }
        for file in virtual_files.iter().filter(|f| f.support_lsp) {
            provider.upsert_file(&file.filepath, &file.content);
        }

        let mut position_queries = Vec::new();
        let mut position_completions = Vec::new();
        let mut position_highlights = Vec::new();

        if !handbook.show_emit {
            if !handbook.no_static_semantic_info {
                self.collect_hovers(&virtual_files, provider, &mut nodes);
            }
            self.collect_marker_nodes(
                &scanned,
                code,
                &map,
                &virtual_files,
                &removals,
                &handbook,
                provider,
                &mut nodes,
                &mut position_queries,
                &mut position_completions,
                &mut position_highlights,
            )?;
            collect_diagnostics(&virtual_files, &removals, &handbook, provider, &mut nodes)?;
        }

        // -- removal
        let (final_code, mut final_nodes, extension) = if handbook.show_emit {
            let emitted = find_emitted_file(&virtual_files, &handbook, provider)?;
            let extension = extension_of(&emitted.0);
            (emitted.1, Vec::new(), extension)
        } else if handbook.keep_notations {
            // Removals stay recorded in meta; callers remap through their own
            // source maps before stripping
            (code.to_string(), sort_and_dedupe(nodes), ext)
        } else {
            let (stripped, remapped) = apply_removals(code, &removals, nodes);
            (stripped, remapped, ext)
        };

        // -- position-resolution
        let final_map = SourceMap::new(&final_code);
        for node in &mut final_nodes {
            let pos = final_map.index_to_pos(node.start());
            node.set_position(pos.line, pos.character);
        }
        final_nodes.retain(|node| self.options.keep_node(node));

        Ok(Sample {
            code: final_code,
            nodes: final_nodes,
            meta: Meta {
                // showEmit discards notation bookkeeping along with the nodes
                removals: if handbook.show_emit {
                    Vec::new()
                } else {
                    removals
                },
                flag_notations,
                virtual_files,
                position_queries,
                position_completions,
                position_highlights,
                compiler_options,
                handbook_options: handbook,
                extension,
            },
        })
    }

    /// Static quick-info for every identifier in every LSP-eligible file
    fn collect_hovers(
        &self,
        files: &[VirtualFile],
        provider: &mut dyn TypeProvider,
        nodes: &mut Vec<Node>,
    ) {
        for file in files.iter().filter(|f| f.support_lsp) {
            for m in IDENTIFIER.find_iter(&file.content) {
                let start = file.offset + m.start();
                if !self.options.include_hover(m.as_str(), start, &file.filepath) {
                    continue;
                }
                if let Some(info) = provider.quick_info(&file.filepath, m.start()) {
                    nodes.push(Node::Hover(HoverNode {
                        start,
                        length: m.len(),
                        line: 0,
                        character: 0,
                        text: info.text,
                        docs: info.docs,
                        tags: info.tags,
                    }));
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn collect_marker_nodes(
        &self,
        scanned: &ScanOutput,
        code: &str,
        map: &SourceMap,
        files: &[VirtualFile],
        removals: &[Removal],
        handbook: &HandbookOptions,
        provider: &mut dyn TypeProvider,
        nodes: &mut Vec<Node>,
        position_queries: &mut Vec<usize>,
        position_completions: &mut Vec<usize>,
        position_highlights: &mut Vec<usize>,
    ) -> Result<(), HoverdocError> {
        for marker in &scanned.markers {
            let target = resolve_target(marker, code, map)?;
            // Only queries and completions are fatal inside a removed range.
            // A highlight there just dies with the range in the removal pass.
            let needs_live_target = !matches!(target, ResolvedTarget::Highlight { .. });
            if needs_live_target && in_any_range(removals, target.offset()) {
                return Err(HoverdocError::QueryInRemovedRange {
                    offset: target.offset(),
                });
            }
            let file = files.iter().find(|f| f.contains(target.offset()));

            match target {
                ResolvedTarget::Query { start, length } => {
                    position_queries.push(start);
                    let info = file.filter(|f| f.support_lsp).and_then(|f| {
                        provider.quick_info(&f.filepath, start - f.offset)
                    });
                    let info = info.unwrap_or_else(|| crate::provider::QuickInfo {
                        text: String::new(),
                        docs: None,
                        tags: Vec::new(),
                    });
                    nodes.push(Node::Query(HoverNode {
                        start,
                        length,
                        line: 0,
                        character: 0,
                        text: info.text,
                        docs: info.docs,
                        tags: info.tags,
                    }));
                }
                ResolvedTarget::Completion { offset, prefix } => {
                    position_completions.push(offset);
                    let (entries, prefix) = match file.filter(|f| f.support_lsp) {
                        Some(f) => filter_completions(
                            provider.completions(&f.filepath, offset - f.offset),
                            &f.content,
                            offset - f.offset,
                            prefix,
                        ),
                        None => (Vec::new(), prefix),
                    };
                    if entries.is_empty() && !handbook.no_error_validation {
                        return Err(HoverdocError::NoCompletions {
                            prefix,
                            line: marker.line,
                        });
                    }
                    nodes.push(Node::Completion(CompletionNode {
                        start: offset,
                        length: 0,
                        line: 0,
                        character: 0,
                        prefix,
                        completions: entries,
                    }));
                }
                ResolvedTarget::Highlight {
                    start,
                    length,
                    text,
                } => {
                    position_highlights.push(start);
                    nodes.push(Node::Highlight(HighlightNode {
                        start,
                        length,
                        line: 0,
                        character: 0,
                        text,
                    }));
                }
            }
        }
        Ok(())
    }
}

/// Build the removal list: every flag line, every marker line, and the
/// spans the cut markers imply. Filename markers stay in the output; they
/// are how a reader sees the file boundaries.
fn collect_removals(
    scanned: &ScanOutput,
    flags: &[ParsedFlag],
    code_len: usize,
) -> Vec<Removal> {
    let mut removals = Vec::new();

    for flag in flags {
        removals.push(Removal::new(flag.start, flag.end));
    }
    for marker in &scanned.markers {
        removals.push(Removal::new(marker.start, marker.end));
    }

    // Counts and ordering were validated at scan time. An end closes the
    // most recent open start, so nested regions remove their union.
    let mut open_starts: Vec<usize> = Vec::new();
    for cut in &scanned.cuts {
        match cut.kind {
            CutKind::Cut => removals.push(Removal::new(0, cut.end)),
            CutKind::CutAfter => removals.push(Removal::new(cut.start, code_len)),
            CutKind::CutStart => open_starts.push(cut.start),
            CutKind::CutEnd => {
                if let Some(start) = open_starts.pop() {
                    removals.push(Removal::new(start, cut.end));
                }
            }
        }
    }

    removals
}

/// Re-derive the completion prefix from the provider's replacement span when
/// it disagrees with the naive backward scan, then filter entries to it
fn filter_completions(
    result: crate::provider::CompletionResult,
    file_content: &str,
    local_offset: usize,
    naive_prefix: String,
) -> (Vec<CompletionEntry>, String) {
    let prefix = match result.replacement_span {
        Some((span_start, _span_len)) if span_start <= local_offset => {
            let span_prefix = &file_content[span_start..local_offset];
            if span_prefix != naive_prefix {
                span_prefix.to_string()
            } else {
                naive_prefix
            }
        }
        _ => naive_prefix,
    };

    let entries = result
        .entries
        .into_iter()
        .filter(|entry| entry.name.starts_with(&prefix))
        .collect();
    (entries, prefix)
}

fn collect_diagnostics(
    files: &[VirtualFile],
    removals: &[Removal],
    handbook: &HandbookOptions,
    provider: &mut dyn TypeProvider,
    nodes: &mut Vec<Node>,
) -> Result<(), HoverdocError> {
    let mut undeclared: Vec<String> = Vec::new();

    for file in files.iter().filter(|f| f.support_lsp) {
        let mut diagnostics = provider.semantic_diagnostics(&file.filepath);
        diagnostics.extend(provider.syntactic_diagnostics(&file.filepath));

        for diag in diagnostics {
            if handbook.no_errors.suppresses(diag.code) {
                continue;
            }
            let start = file.offset + diag.start;
            if handbook.no_errors_cutted && in_any_range(removals, start) {
                continue;
            }
            if !handbook.errors.contains(&diag.code) {
                undeclared.push(format!("[{}] {}", diag.code, diag.message));
            }
            nodes.push(Node::Error(ErrorNode {
                start,
                length: diag.length,
                line: 0,
                character: 0,
                text: diag.message,
                code: diag.code,
                level: diag.level,
                filepath: file.filepath.clone(),
            }));
        }
    }

    if !undeclared.is_empty() && !handbook.no_error_validation {
        return Err(HoverdocError::UndeclaredErrors {
            expected: handbook.errors.clone(),
            found: undeclared,
        });
    }
    Ok(())
}

/// Locate the emitted file `showEmit` should substitute for the sample code
fn find_emitted_file(
    files: &[VirtualFile],
    handbook: &HandbookOptions,
    provider: &mut dyn TypeProvider,
) -> Result<(String, String), HoverdocError> {
    let target = match &handbook.show_emitted_file {
        Some(path) => path.clone(),
        None => {
            // Default to the entry file's primary output
            let entry = files
                .iter()
                .find(|f| f.support_lsp)
                .or_else(|| files.first());
            match entry {
                Some(f) => {
                    let stem = f.filename.rsplit_once('.').map(|(s, _)| s).unwrap_or(&f.filename);
                    format!("{}.js", stem)
                }
                None => "index.js".to_string(),
            }
        }
    };

    let target_name = target.rsplit('/').next().unwrap_or(&target);
    for file in files.iter().filter(|f| f.support_lsp) {
        for emitted in provider.emit_output(&file.filepath) {
            let emitted_name = emitted.path.rsplit('/').next().unwrap_or(&emitted.path);
            if emitted.path == target || emitted_name == target_name {
                return Ok((emitted.path, emitted.text));
            }
        }
    }

    Err(HoverdocError::EmitFileNotFound { path: target })
}
