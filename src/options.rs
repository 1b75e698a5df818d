//! Caller-facing configuration
//!
//! Three layers of configuration feed one invocation:
//!
//! - [`SampleOptions`]: per-call knobs supplied by the embedding tool
//!   (custom tag names, hover/node predicates, synthetic files, defaults).
//! - [`CompilerOptionDecl`]: the immutable table of compiler options the
//!   provider understands, passed explicitly into the flag resolver. A
//!   built-in table covering the common options is provided via
//!   [`default_compiler_options`]; embedders with a different provider can
//!   supply their own.
//! - [`HandbookOptions`]: the closed set of behavior switches for the engine
//!   itself, mutated by handbook flags found in the sample.

use crate::nodes::Node;

/// Value shape a compiler option accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    Boolean,
    Number,
    String,
    /// Comma-separated list of strings
    List,
    /// Closed map of accepted spellings to canonical values
    Enum(&'static [(&'static str, &'static str)]),
}

/// Declaration of one compiler option the provider understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilerOptionDecl {
    pub name: &'static str,
    pub kind: OptionType,
}

const TARGETS: &[(&str, &str)] = &[
    ("es3", "ES3"),
    ("es5", "ES5"),
    ("es6", "ES2015"),
    ("es2015", "ES2015"),
    ("es2016", "ES2016"),
    ("es2017", "ES2017"),
    ("es2018", "ES2018"),
    ("es2019", "ES2019"),
    ("es2020", "ES2020"),
    ("es2021", "ES2021"),
    ("es2022", "ES2022"),
    ("esnext", "ESNext"),
];

const MODULES: &[(&str, &str)] = &[
    ("commonjs", "CommonJS"),
    ("amd", "AMD"),
    ("umd", "UMD"),
    ("system", "System"),
    ("es2015", "ES2015"),
    ("es2020", "ES2020"),
    ("es2022", "ES2022"),
    ("esnext", "ESNext"),
    ("node16", "Node16"),
    ("nodenext", "NodeNext"),
];

const MODULE_RESOLUTIONS: &[(&str, &str)] = &[
    ("classic", "Classic"),
    ("node", "Node"),
    ("node16", "Node16"),
    ("nodenext", "NodeNext"),
    ("bundler", "Bundler"),
];

const JSX_MODES: &[(&str, &str)] = &[
    ("preserve", "Preserve"),
    ("react", "React"),
    ("react-jsx", "ReactJSX"),
    ("react-jsxdev", "ReactJSXDev"),
    ("react-native", "ReactNative"),
];

const DEFAULT_COMPILER_OPTIONS: &[CompilerOptionDecl] = &[
    CompilerOptionDecl { name: "strict", kind: OptionType::Boolean },
    CompilerOptionDecl { name: "noImplicitAny", kind: OptionType::Boolean },
    CompilerOptionDecl { name: "strictNullChecks", kind: OptionType::Boolean },
    CompilerOptionDecl { name: "allowJs", kind: OptionType::Boolean },
    CompilerOptionDecl { name: "checkJs", kind: OptionType::Boolean },
    CompilerOptionDecl { name: "declaration", kind: OptionType::Boolean },
    CompilerOptionDecl { name: "sourceMap", kind: OptionType::Boolean },
    CompilerOptionDecl { name: "esModuleInterop", kind: OptionType::Boolean },
    CompilerOptionDecl { name: "experimentalDecorators", kind: OptionType::Boolean },
    CompilerOptionDecl { name: "resolveJsonModule", kind: OptionType::Boolean },
    CompilerOptionDecl { name: "isolatedModules", kind: OptionType::Boolean },
    CompilerOptionDecl { name: "noUncheckedIndexedAccess", kind: OptionType::Boolean },
    CompilerOptionDecl { name: "target", kind: OptionType::Enum(TARGETS) },
    CompilerOptionDecl { name: "module", kind: OptionType::Enum(MODULES) },
    CompilerOptionDecl { name: "moduleResolution", kind: OptionType::Enum(MODULE_RESOLUTIONS) },
    CompilerOptionDecl { name: "jsx", kind: OptionType::Enum(JSX_MODES) },
    CompilerOptionDecl { name: "lib", kind: OptionType::List },
    CompilerOptionDecl { name: "types", kind: OptionType::List },
    CompilerOptionDecl { name: "outDir", kind: OptionType::String },
    CompilerOptionDecl { name: "baseUrl", kind: OptionType::String },
    CompilerOptionDecl { name: "maxNodeModuleJsDepth", kind: OptionType::Number },
];

/// The built-in compiler-option declaration table
pub fn default_compiler_options() -> &'static [CompilerOptionDecl] {
    DEFAULT_COMPILER_OPTIONS
}

/// Tri-state for `noErrors`: suppress nothing, everything, or listed codes
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize)]
pub enum ErrorSuppression {
    #[default]
    None,
    All,
    Codes(Vec<u32>),
}

impl ErrorSuppression {
    /// Whether a diagnostic with this code should be dropped
    pub fn suppresses(&self, code: u32) -> bool {
        match self {
            ErrorSuppression::None => false,
            ErrorSuppression::All => true,
            ErrorSuppression::Codes(codes) => codes.contains(&code),
        }
    }
}

/// Behavior switches for the engine itself, set by handbook flags
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize)]
pub struct HandbookOptions {
    /// Diagnostic codes the sample declares as expected
    pub errors: Vec<u32>,
    /// Diagnostics to suppress entirely
    pub no_errors: ErrorSuppression,
    /// Replace output code with the provider's emitted text
    pub show_emit: bool,
    /// Which emitted file to show; `None` means the entry file's default output
    pub show_emitted_file: Option<String>,
    /// Record removals in meta but leave code and nodes unstripped
    pub keep_notations: bool,
    /// Downgrade the unknown-flag, undeclared-diagnostics, and
    /// empty-completions checks to non-fatal
    pub no_error_validation: bool,
    /// Skip automatic per-identifier hover collection
    pub no_static_semantic_info: bool,
    /// Ignore diagnostics whose span falls inside a removal range
    pub no_errors_cutted: bool,
}

/// The recognized handbook flag names, for classification
pub const HANDBOOK_FLAG_NAMES: &[&str] = &[
    "errors",
    "noErrors",
    "showEmit",
    "showEmittedFile",
    "keepNotations",
    "noErrorValidation",
    "noStaticSemanticInfo",
    "noErrorsCutted",
];

/// Per-invocation options supplied by the embedding tool
pub struct SampleOptions {
    /// Flag names to extract as tag nodes instead of treating as options
    pub custom_tags: Vec<String>,
    /// Filename for the implicit first virtual file; defaults to `index.<ext>`
    pub default_filename: Option<String>,
    /// Extra `(path, content)` files upserted into the provider before queries
    pub extra_files: Vec<(String, String)>,
    /// Handbook state before any sample flags apply
    pub handbook: HandbookOptions,
    /// Compiler-option values applied before any sample flags
    pub compiler_defaults: Vec<(String, serde_json::Value)>,
    /// Per-identifier predicate for automatic hover collection:
    /// `(identifier, start_offset, filepath) -> include`
    pub should_get_hover_info: Option<Box<dyn Fn(&str, usize, &str) -> bool>>,
    /// Final say over which nodes survive into the output
    pub filter_node: Option<Box<dyn Fn(&Node) -> bool>>,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            custom_tags: Vec::new(),
            default_filename: None,
            extra_files: Vec::new(),
            handbook: HandbookOptions::default(),
            compiler_defaults: Vec::new(),
            should_get_hover_info: None,
            filter_node: None,
        }
    }
}

impl SampleOptions {
    pub fn include_hover(&self, identifier: &str, start: usize, filepath: &str) -> bool {
        match &self.should_get_hover_info {
            Some(pred) => pred(identifier, start, filepath),
            None => true,
        }
    }

    pub fn keep_node(&self, node: &Node) -> bool {
        match &self.filter_node {
            Some(pred) => pred(node),
            None => true,
        }
    }
}
