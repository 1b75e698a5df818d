//! Flag classification and value coercion
//!
//! A scanned `// @name[: value]` line is just a name and a raw string until
//! this stage classifies it against three namespaces, in priority order:
//! caller-supplied custom tag names, the compiler-option declaration table,
//! and the closed handbook-option set. The winner determines how the raw
//! value is coerced into a typed [`serde_json::Value`]. Names matching none
//! of the three come back as [`FlagKind::Unknown`]; whether that is fatal is
//! the pipeline's call (it depends on `noErrorValidation`).

use serde_json::Value;

use crate::error::HoverdocError;
use crate::notation::FlagNotation;
use crate::options::{
    CompilerOptionDecl, ErrorSuppression, HandbookOptions, OptionType, HANDBOOK_FLAG_NAMES,
};

/// Which namespace a flag resolved into
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FlagKind {
    Tag,
    CompilerOption,
    HandbookOption,
    Unknown,
}

/// A classified flag with its coerced value
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ParsedFlag {
    pub kind: FlagKind,
    pub name: String,
    pub value: Value,
    pub start: usize,
    pub end: usize,
}

/// Classify one scanned flag and coerce its value
pub fn resolve_flag(
    flag: &FlagNotation,
    custom_tags: &[String],
    table: &[CompilerOptionDecl],
) -> Result<ParsedFlag, HoverdocError> {
    let raw = flag.value.as_deref();

    let (kind, value) = if custom_tags.iter().any(|t| t == &flag.name) {
        let value = match raw {
            Some(text) => Value::String(text.to_string()),
            None => Value::Bool(true),
        };
        (FlagKind::Tag, value)
    } else if let Some(decl) = table.iter().find(|d| d.name == flag.name) {
        (FlagKind::CompilerOption, coerce(decl, raw)?)
    } else if HANDBOOK_FLAG_NAMES.contains(&flag.name.as_str()) {
        (
            FlagKind::HandbookOption,
            parse_handbook_value(&flag.name, raw)?,
        )
    } else {
        (FlagKind::Unknown, Value::Null)
    };

    Ok(ParsedFlag {
        kind,
        name: flag.name.clone(),
        value,
        start: flag.start,
        end: flag.end,
    })
}

/// Coerce a raw string value to a compiler option's declared type
fn coerce(decl: &CompilerOptionDecl, raw: Option<&str>) -> Result<Value, HoverdocError> {
    let invalid = |expected: &str| HoverdocError::InvalidOptionValue {
        option: decl.name.to_string(),
        value: raw.unwrap_or("").to_string(),
        expected: expected.to_string(),
    };

    match decl.kind {
        OptionType::Boolean => match raw {
            None => Ok(Value::Bool(true)),
            Some("true") => Ok(Value::Bool(true)),
            Some("false") => Ok(Value::Bool(false)),
            Some(_) => Err(invalid("a boolean")),
        },
        OptionType::Number => {
            let text = raw.ok_or_else(|| invalid("a number"))?;
            if let Ok(n) = text.parse::<i64>() {
                Ok(Value::from(n))
            } else if let Ok(n) = text.parse::<f64>() {
                Ok(Value::from(n))
            } else {
                Err(invalid("a number"))
            }
        }
        OptionType::String => {
            let text = raw.ok_or_else(|| invalid("a string"))?;
            Ok(Value::String(text.to_string()))
        }
        OptionType::List => {
            let text = raw.ok_or_else(|| invalid("a comma-separated list"))?;
            let items: Vec<Value> = text
                .split(',')
                .map(|item| Value::String(item.trim().to_string()))
                .collect();
            Ok(Value::Array(items))
        }
        OptionType::Enum(members) => {
            let text = raw.ok_or_else(|| invalid("an enumerated value"))?;
            let lookup = text.to_lowercase();
            members
                .iter()
                .find(|(spelling, _)| *spelling == lookup)
                .map(|(_, canonical)| Value::String((*canonical).to_string()))
                .ok_or_else(|| HoverdocError::InvalidEnumOption {
                    option: decl.name.to_string(),
                    value: text.to_string(),
                    allowed: members.iter().map(|(s, _)| (*s).to_string()).collect(),
                })
        }
    }
}

/// Parse a handbook flag's value, honoring the two special shapes
/// (space-separated code lists for `errors`, tri-state for `noErrors`)
fn parse_handbook_value(name: &str, raw: Option<&str>) -> Result<Value, HoverdocError> {
    let invalid = |expected: &str| HoverdocError::InvalidOptionValue {
        option: name.to_string(),
        value: raw.unwrap_or("").to_string(),
        expected: expected.to_string(),
    };

    match name {
        "errors" => {
            let text = raw.ok_or_else(|| invalid("a space-separated list of codes"))?;
            let codes = parse_code_list(text).ok_or_else(|| invalid("a space-separated list of codes"))?;
            Ok(Value::Array(codes.into_iter().map(Value::from).collect()))
        }
        "noErrors" => match raw {
            None | Some("true") => Ok(Value::Bool(true)),
            Some("false") => Ok(Value::Bool(false)),
            Some(text) => {
                let codes = parse_code_list(text)
                    .ok_or_else(|| invalid("a boolean or a list of codes"))?;
                Ok(Value::Array(codes.into_iter().map(Value::from).collect()))
            }
        },
        "showEmittedFile" => {
            let text = raw.ok_or_else(|| invalid("a filename"))?;
            Ok(Value::String(text.to_string()))
        }
        // Remaining handbook options are plain booleans
        _ => match raw {
            None | Some("true") => Ok(Value::Bool(true)),
            Some("false") => Ok(Value::Bool(false)),
            Some(_) => Err(invalid("a boolean")),
        },
    }
}

/// Apply a resolved handbook flag to the option state
pub fn apply_handbook(options: &mut HandbookOptions, flag: &ParsedFlag) {
    let as_bool = |value: &Value| value.as_bool().unwrap_or(false);
    let as_codes = |value: &Value| -> Vec<u32> {
        value
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_u64().map(|n| n as u32))
                    .collect()
            })
            .unwrap_or_default()
    };

    match flag.name.as_str() {
        "errors" => options.errors = as_codes(&flag.value),
        "noErrors" => {
            options.no_errors = match &flag.value {
                Value::Bool(true) => ErrorSuppression::All,
                Value::Bool(false) => ErrorSuppression::None,
                other => ErrorSuppression::Codes(as_codes(other)),
            }
        }
        "showEmit" => options.show_emit = as_bool(&flag.value),
        "showEmittedFile" => {
            options.show_emitted_file = flag.value.as_str().map(|s| s.to_string())
        }
        "keepNotations" => options.keep_notations = as_bool(&flag.value),
        "noErrorValidation" => options.no_error_validation = as_bool(&flag.value),
        "noStaticSemanticInfo" => options.no_static_semantic_info = as_bool(&flag.value),
        "noErrorsCutted" => options.no_errors_cutted = as_bool(&flag.value),
        _ => {}
    }
}

fn parse_code_list(text: &str) -> Option<Vec<u32>> {
    let mut codes = Vec::new();
    for part in text.split([' ', ',']).filter(|p| !p.is_empty()) {
        codes.push(part.parse::<u32>().ok()?);
    }
    Some(codes)
}
