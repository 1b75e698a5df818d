//! Error taxonomy for the notation engine
//!
//! Every failure the pipeline can hit is one variant of [`HoverdocError`].
//! Errors are structured for rendering: each carries a short title, a
//! description of what went wrong in this sample, and a recommendation for
//! fixing the sample. Nothing is swallowed; a failing invocation returns no
//! partial result. The three validation-skippable checks (unknown flag,
//! undeclared diagnostics, empty completions) are downgraded only when the
//! caller sets `noErrorValidation`.

use std::fmt;

/// Errors raised while processing an annotated sample
#[derive(Debug, Clone, PartialEq)]
pub enum HoverdocError {
    /// A `// @name` flag matched no custom tag, compiler option, or handbook option
    UnknownFlag { name: String },
    /// A compiler-option value could not be coerced to the declared primitive type
    InvalidOptionValue {
        option: String,
        value: String,
        expected: String,
    },
    /// An enumerated compiler-option value is not in the option's allowed map
    InvalidEnumOption {
        option: String,
        value: String,
        allowed: Vec<String>,
    },
    /// Unequal numbers of `---cut-start---` and `---cut-end---` markers
    MismatchedCutMarkers { starts: usize, ends: usize },
    /// A `---cut-start---` appears after its paired `---cut-end---`
    MisorderedCutPair { start: usize, end: usize },
    /// A query or completion marker resolved to no identifier on its target line
    InvalidQuery { line: usize },
    /// A query or completion marker targets a position inside a removed range
    QueryInRemovedRange { offset: usize },
    /// A completion marker yielded zero entries after prefix filtering
    NoCompletions { prefix: String, line: usize },
    /// The provider reported diagnostics not declared via the `errors` flag
    UndeclaredErrors {
        expected: Vec<u32>,
        found: Vec<String>,
    },
    /// `showEmit` and `keepNotations` were both requested
    EmitConflictsWithKeepNotations,
    /// The `showEmittedFile` target does not exist in the virtual filesystem
    EmitFileNotFound { path: String },
}

impl HoverdocError {
    /// Short name of the failure, stable across releases
    pub fn title(&self) -> &'static str {
        match self {
            HoverdocError::UnknownFlag { .. } => "Unknown flag notation",
            HoverdocError::InvalidOptionValue { .. } => "Invalid option value",
            HoverdocError::InvalidEnumOption { .. } => "Invalid enumerated option value",
            HoverdocError::MismatchedCutMarkers { .. } => "Mismatched cut markers",
            HoverdocError::MisorderedCutPair { .. } => "Misordered cut markers",
            HoverdocError::InvalidQuery { .. } => "Invalid query",
            HoverdocError::QueryInRemovedRange { .. } => "Query inside removed range",
            HoverdocError::NoCompletions { .. } => "No completions found",
            HoverdocError::UndeclaredErrors { .. } => "Undeclared errors in sample",
            HoverdocError::EmitConflictsWithKeepNotations => {
                "showEmit conflicts with keepNotations"
            }
            HoverdocError::EmitFileNotFound { .. } => "Emit target not found",
        }
    }

    /// What went wrong, with the offending names/values filled in
    pub fn description(&self) -> String {
        match self {
            HoverdocError::UnknownFlag { name } => {
                format!("The flag '@{}' matches no custom tag, compiler option, or handbook option", name)
            }
            HoverdocError::InvalidOptionValue {
                option,
                value,
                expected,
            } => format!(
                "The value '{}' for compiler option '{}' could not be parsed as {}",
                value, option, expected
            ),
            HoverdocError::InvalidEnumOption {
                option,
                value,
                allowed,
            } => format!(
                "The value '{}' is not allowed for '{}'; expected one of: {}",
                value,
                option,
                allowed.join(", ")
            ),
            HoverdocError::MismatchedCutMarkers { starts, ends } => format!(
                "Found {} ---cut-start--- marker(s) but {} ---cut-end--- marker(s)",
                starts, ends
            ),
            HoverdocError::MisorderedCutPair { start, end } => format!(
                "A ---cut-start--- at offset {} appears after its ---cut-end--- at offset {}",
                start, end
            ),
            HoverdocError::InvalidQuery { line } => format!(
                "The marker on line {} does not point at an identifier on the previous line",
                line + 1
            ),
            HoverdocError::QueryInRemovedRange { offset } => format!(
                "The marker targets offset {}, which is removed from the final output",
                offset
            ),
            HoverdocError::NoCompletions { prefix, line } => format!(
                "The completion marker on line {} matched no entries for prefix '{}'",
                line + 1,
                prefix
            ),
            HoverdocError::UndeclaredErrors { expected, found } => format!(
                "The sample raised diagnostics not declared via '@errors': {} (declared: {:?})",
                found.join("\n"),
                expected
            ),
            HoverdocError::EmitConflictsWithKeepNotations => {
                "A sample cannot request both '@showEmit' and '@keepNotations'".to_string()
            }
            HoverdocError::EmitFileNotFound { path } => format!(
                "The emit target '{}' was not produced for any file in the sample",
                path
            ),
        }
    }

    /// How to fix the sample
    pub fn recommendation(&self) -> &'static str {
        match self {
            HoverdocError::UnknownFlag { .. } => {
                "Check the flag spelling, or register it as a custom tag"
            }
            HoverdocError::InvalidOptionValue { .. } => {
                "Use a value matching the option's declared type"
            }
            HoverdocError::InvalidEnumOption { .. } => "Use one of the listed values",
            HoverdocError::MismatchedCutMarkers { .. } => {
                "Every ---cut-start--- needs exactly one later ---cut-end---"
            }
            HoverdocError::MisorderedCutPair { .. } => {
                "Move the ---cut-start--- above its ---cut-end---"
            }
            HoverdocError::InvalidQuery { .. } => {
                "Align the caret with an identifier on the line above"
            }
            HoverdocError::QueryInRemovedRange { .. } => {
                "Move the marker outside the cut region"
            }
            HoverdocError::NoCompletions { .. } => {
                "Align the caret after a prefix with at least one completion"
            }
            HoverdocError::UndeclaredErrors { .. } => {
                "Declare the codes with '// @errors: <codes>' or fix the sample"
            }
            HoverdocError::EmitConflictsWithKeepNotations => {
                "Request at most one of the two output modes"
            }
            HoverdocError::EmitFileNotFound { .. } => {
                "Point '@showEmittedFile' at a file the sample emits"
            }
        }
    }
}

impl fmt::Display for HoverdocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.title(),
            self.description(),
            self.recommendation()
        )
    }
}

impl std::error::Error for HoverdocError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_all_three_parts() {
        let err = HoverdocError::UnknownFlag {
            name: "tpyo".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("Unknown flag notation"));
        assert!(rendered.contains("@tpyo"));
        assert!(rendered.contains("custom tag"));
    }

    #[test]
    fn test_invalid_query_reports_one_indexed_line() {
        let err = HoverdocError::InvalidQuery { line: 4 };
        assert!(err.description().contains("line 5"));
    }
}
