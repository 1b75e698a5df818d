//! # hoverdoc
//!
//! An engine that turns an annotated source-code sample into a cleaned-up
//! version of the code plus a structured list of positioned nodes: hover
//! info, queries, highlights, completions, diagnostics, and custom tags.
//! It powers "hover this identifier to see its type" style documentation.
//!
//! A sample interleaves code with directive comments:
//!
//! ```text
//! // @errors: 2304
//! const a = "123"
//! // ---cut---
//! const b = "345"
//! //    ^?
//! ```
//!
//! The engine scans the directives, splits multi-file samples on
//! `// @filename:` markers, consults an injected [`TypeProvider`] for type
//! information, deletes every directive line, and rewrites all node offsets
//! to match the final directive-free code.
//!
//! ## Entry point
//!
//! ```no_run
//! use hoverdoc::{FakeProvider, Pipeline, SampleOptions};
//!
//! let pipeline = Pipeline::new(SampleOptions::default());
//! let mut provider = FakeProvider::new();
//! let sample = pipeline.run("const a = 1\n//    ^?\n", "ts", &mut provider)?;
//! # Ok::<(), hoverdoc::HoverdocError>(())
//! ```

pub mod error;
pub mod flags;
pub mod locate;
pub mod location;
pub mod nodes;
pub mod notation;
pub mod options;
pub mod pipeline;
pub mod provider;
pub mod ranges;
pub mod vfs;

pub use error::HoverdocError;
pub use location::{Position, SourceMap};
pub use nodes::{
    CompletionNode, ErrorNode, HighlightNode, HoverNode, Node, TagNode,
};
pub use options::{
    default_compiler_options, CompilerOptionDecl, ErrorSuppression, HandbookOptions, OptionType,
    SampleOptions,
};
pub use pipeline::{Meta, Pipeline, Sample};
pub use provider::{
    CompletionEntry, CompletionResult, Diagnostic, DiagnosticLevel, DocTag, EmittedFile,
    FakeProvider, QuickInfo, TypeProvider,
};
pub use ranges::Removal;
pub use vfs::VirtualFile;
