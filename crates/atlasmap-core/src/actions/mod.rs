//! Field actions
//!
//! Actions are small value transformations declared on a mapping entry or
//! on an output field. They run after conversion and before the value is
//! written, in declared order.
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

mod processor;

pub use processor::{apply_actions, ActionProcessor};

use crate::types::FieldType;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A value transformation, tagged by `name` in mapping definitions
///
/// ```json
/// {"name": "PadStringLeft", "padCharacter": "0", "padCount": 3}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "name")]
pub enum FieldAction {
    Uppercase,
    Lowercase,
    /// Upper-case the first character
    Capitalize,
    Trim,
    TrimLeft,
    TrimRight,
    /// Replace the value with its length in characters
    StringLength,
    Append {
        string: String,
    },
    Prepend {
        string: String,
    },
    /// Prepend `pad_count` copies of `pad_character`
    #[serde(rename_all = "camelCase")]
    PadStringLeft {
        pad_character: char,
        pad_count: usize,
    },
    #[serde(rename_all = "camelCase")]
    PadStringRight {
        pad_character: char,
        pad_count: usize,
    },
    /// Characters `start_index..end_index`, to the end when unbounded
    #[serde(rename_all = "camelCase")]
    SubString {
        start_index: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end_index: Option<usize>,
    },
    /// Replace every literal occurrence of `match`
    Replace {
        #[serde(rename = "match")]
        pattern: String,
        replacement: String,
    },
    AbsoluteValue,
    /// Replace whitespace, `+`, `:`, `_`, `=` and `.` with `-`
    SeparateByDash,
    /// Replace whitespace, `+`, `:`, `-`, `=` and `.` with `_`
    SeparateByUnderscore,
}

impl FieldAction {
    pub fn name(&self) -> &'static str {
        match self {
            FieldAction::Uppercase => "Uppercase",
            FieldAction::Lowercase => "Lowercase",
            FieldAction::Capitalize => "Capitalize",
            FieldAction::Trim => "Trim",
            FieldAction::TrimLeft => "TrimLeft",
            FieldAction::TrimRight => "TrimRight",
            FieldAction::StringLength => "StringLength",
            FieldAction::Append { .. } => "Append",
            FieldAction::Prepend { .. } => "Prepend",
            FieldAction::PadStringLeft { .. } => "PadStringLeft",
            FieldAction::PadStringRight { .. } => "PadStringRight",
            FieldAction::SubString { .. } => "SubString",
            FieldAction::Replace { .. } => "Replace",
            FieldAction::AbsoluteValue => "AbsoluteValue",
            FieldAction::SeparateByDash => "SeparateByDash",
            FieldAction::SeparateByUnderscore => "SeparateByUnderscore",
        }
    }
}

impl fmt::Display for FieldAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised while applying a field action
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// Numeric action on a non-numeric value
    #[error("{action} requires a numeric value, got {value_type}")]
    NotNumeric {
        action: &'static str,
        value_type: FieldType,
    },

    /// Textual action on a complex value
    #[error("{action} cannot be applied to a complex value")]
    Complex { action: &'static str },

    /// SubString bounds outside the value
    #[error("SubString bounds {start}..{end} are invalid for a value of length {length}")]
    Bounds {
        start: usize,
        end: usize,
        length: usize,
    },

    /// Result not representable in the value's type
    #[error("{action} overflows for value {value}")]
    Overflow { action: &'static str, value: String },

    /// Action declared with unusable parameters
    #[error("Invalid {action} parameters: {message}")]
    Parameters {
        action: &'static str,
        message: String,
    },
}
