//! Conversion rule types
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

use crate::types::{FieldType, FieldValue};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Risk classification of a conversion rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConversionConcern {
    /// Always succeeds without loss
    None,
    /// May fail when the value exceeds the target range
    Range,
    /// May fail when the value cannot be parsed
    Format,
    /// The pairing is not supported at all
    Unsupported,
    /// Result follows a value convention rather than a numeric rule
    Convention,
}

impl ConversionConcern {
    /// Diagnostic message for a conversion between two types
    pub fn describe(&self, source: FieldType, target: FieldType) -> String {
        match self {
            ConversionConcern::None => {
                format!("Conversion from '{}' to '{}' is supported", source, target)
            }
            ConversionConcern::Range => format!(
                "Conversion from '{}' to '{}' can cause out of range exceptions",
                source, target
            ),
            ConversionConcern::Format => format!(
                "Conversion from '{}' to '{}' can cause numeric format exceptions",
                source, target
            ),
            ConversionConcern::Unsupported => format!(
                "Conversions from '{}' to '{}' is not supported",
                source, target
            ),
            ConversionConcern::Convention => format!(
                "Conversion from '{}' to '{}' follows a value convention",
                source, target
            ),
        }
    }
}

impl fmt::Display for ConversionConcern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConversionConcern::None => "NONE",
            ConversionConcern::Range => "RANGE",
            ConversionConcern::Format => "FORMAT",
            ConversionConcern::Unsupported => "UNSUPPORTED",
            ConversionConcern::Convention => "CONVENTION",
        };
        f.write_str(name)
    }
}

/// Value-level conversion failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{concern} error converting {source_type} to {target_type}: {message}")]
pub struct ConversionError {
    pub concern: ConversionConcern,
    pub source_type: FieldType,
    pub target_type: FieldType,
    pub message: String,
}

impl ConversionError {
    pub fn new(
        concern: ConversionConcern,
        source_type: FieldType,
        target_type: FieldType,
        message: impl Into<String>,
    ) -> Self {
        Self {
            concern,
            source_type,
            target_type,
            message: message.into(),
        }
    }

    pub fn range(source_type: FieldType, target_type: FieldType, message: impl Into<String>) -> Self {
        Self::new(ConversionConcern::Range, source_type, target_type, message)
    }

    pub fn format(source_type: FieldType, target_type: FieldType, message: impl Into<String>) -> Self {
        Self::new(ConversionConcern::Format, source_type, target_type, message)
    }

    /// No rule exists for the pairing
    pub fn unsupported(source_type: FieldType, target_type: FieldType) -> Self {
        Self::new(
            ConversionConcern::Unsupported,
            source_type,
            target_type,
            ConversionConcern::Unsupported.describe(source_type, target_type),
        )
    }
}

/// Compiled boolean conventions, anchored to match whole values
#[derive(Debug, Clone)]
pub struct BooleanPatterns {
    pub char_true: Regex,
    pub string_true: Regex,
    pub string_false: Regex,
}

/// Per-call conversion inputs besides the value itself
#[derive(Debug, Clone, Copy)]
pub struct ConversionContext<'a> {
    pub source_format: Option<&'a str>,
    pub target_format: Option<&'a str>,
    pub patterns: &'a BooleanPatterns,
}

impl ConversionContext<'_> {
    /// The source format when one was given and is non-empty
    pub fn source_format(&self) -> Option<&str> {
        self.source_format.filter(|f| !f.is_empty())
    }
}

/// Converter function shared by every rule of one source type
pub type Converter =
    fn(&FieldValue, FieldType, &ConversionContext<'_>) -> Result<FieldValue, ConversionError>;

/// One registered (source, target) conversion
#[derive(Clone)]
pub struct ConversionRule {
    pub source: FieldType,
    pub target: FieldType,
    pub concerns: Vec<ConversionConcern>,
    pub(crate) converter: Converter,
}

impl ConversionRule {
    pub fn new(
        source: FieldType,
        target: FieldType,
        concerns: &[ConversionConcern],
        converter: Converter,
    ) -> Self {
        Self {
            source,
            target,
            concerns: concerns.to_vec(),
            converter,
        }
    }

    /// Whether the rule can fail or bend the value
    pub fn has_concerns(&self) -> bool {
        self.concerns.iter().any(|c| *c != ConversionConcern::None)
    }

    /// Apply the rule to a value
    pub fn apply(
        &self,
        value: &FieldValue,
        context: &ConversionContext<'_>,
    ) -> Result<FieldValue, ConversionError> {
        (self.converter)(value, self.target, context)
    }
}

impl fmt::Debug for ConversionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionRule")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("concerns", &self.concerns)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concern_messages() {
        assert_eq!(
            ConversionConcern::Range.describe(FieldType::Double, FieldType::Byte),
            "Conversion from 'DOUBLE' to 'BYTE' can cause out of range exceptions"
        );
        assert_eq!(
            ConversionConcern::Unsupported.describe(FieldType::Complex, FieldType::Integer),
            "Conversions from 'COMPLEX' to 'INTEGER' is not supported"
        );
    }

    #[test]
    fn test_error_display() {
        let err = ConversionError::range(FieldType::Char, FieldType::Byte, "Character value 200 is greater than BYTE.MAX_VALUE");
        assert_eq!(
            err.to_string(),
            "RANGE error converting CHAR to BYTE: Character value 200 is greater than BYTE.MAX_VALUE"
        );
    }
}
