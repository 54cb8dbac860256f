//! Error types for the AtlasMap core library
//!
//! This module defines the error handling system for the mapping engine,
//! using thiserror for ergonomic error definitions and anyhow for flexible
//! error contexts. Subsystem errors (`PathError`, `ConversionError`) convert
//! into [`Error`] so callers only ever deal with one type.

use crate::actions::ActionError;
use crate::conversion::ConversionError;
use crate::path::PathError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main error type for AtlasMap operations
#[derive(Error, Debug)]
pub enum Error {
    /// Path syntax is invalid
    #[error("Malformed path '{path}': {message}")]
    MalformedPath {
        path: String,
        message: String,
        position: Option<usize>,
    },

    /// Value-level conversion failure
    #[error("Conversion failed: {source}")]
    Conversion {
        #[from]
        source: ConversionError,
    },

    /// Field action could not be applied to a value
    #[error("Field action failed: {source}")]
    FieldAction {
        #[from]
        source: ActionError,
    },

    /// Document is not set, or cannot be parsed
    #[error("Document access failed{}: {message}", describe_doc(.doc_id))]
    DocumentAccess {
        doc_id: Option<String>,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Mapping entry lacks the fields it needs to be processed
    #[error("Structural mapping error: {message}")]
    StructuralMapping {
        message: String,
        mapping_id: Option<String>,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// YAML parsing errors
    #[error("YAML error: {message}")]
    Yaml {
        message: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// XML parsing and serialization errors
    #[error("XML error: {message}")]
    Xml {
        message: String,
        position: Option<u64>,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal error with context
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

fn describe_doc(doc_id: &Option<String>) -> String {
    doc_id
        .as_ref()
        .map(|id| format!(" for '{}'", id))
        .unwrap_or_default()
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a document access error for the given document
    pub fn document_access(doc_id: Option<&str>, message: impl Into<String>) -> Self {
        Error::DocumentAccess {
            doc_id: doc_id.map(str::to_string),
            message: message.into(),
            source: None,
        }
    }

    /// Create an XML error from any displayable parser or writer failure
    pub fn xml(err: impl fmt::Display, position: Option<u64>) -> Self {
        Error::Xml {
            message: err.to_string(),
            position,
        }
    }

    /// Create a structural error for a mapping entry
    pub fn structural(message: impl Into<String>, mapping_id: Option<&str>) -> Self {
        Error::StructuralMapping {
            message: message.into(),
            mapping_id: mapping_id.map(str::to_string),
        }
    }
}

/// Severity of an audit record or validation notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditStatus {
    /// Informational, no action required
    Info,
    /// Warning, output may be incomplete
    Warn,
    /// Error, output should not be trusted
    Error,
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditStatus::Info => write!(f, "INFO"),
            AuditStatus::Warn => write!(f, "WARN"),
            AuditStatus::Error => write!(f, "ERROR"),
        }
    }
}

// Conversion implementations
impl From<PathError> for Error {
    fn from(err: PathError) -> Self {
        Error::MalformedPath {
            message: err.message().to_string(),
            position: err.position(),
            path: err.path().to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::xml(err, None)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::ConversionConcern;
    use crate::types::FieldType;

    #[test]
    fn test_error_display() {
        let err = Error::structural("Mapping does not contain at least one output field", Some("m1"));
        assert!(matches!(
            &err,
            Error::StructuralMapping { mapping_id: Some(id), .. } if id == "m1"
        ));
        assert_eq!(
            err.to_string(),
            "Structural mapping error: Mapping does not contain at least one output field"
        );
    }

    #[test]
    fn test_document_access_display() {
        let err = Error::document_access(Some("source"), "document is not set");
        assert_eq!(err.to_string(), "Document access failed for 'source': document is not set");

        let err = Error::document_access(None, "document is not set");
        assert_eq!(err.to_string(), "Document access failed: document is not set");
    }

    #[test]
    fn test_path_error_conversion() {
        let err: Error = PathError::new("/a//b", "empty segment name", Some(3)).into();
        match err {
            Error::MalformedPath { path, position, .. } => {
                assert_eq!(path, "/a//b");
                assert_eq!(position, Some(3));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_conversion_error_conversion() {
        let err: Error = ConversionError::new(
            ConversionConcern::Range,
            FieldType::Double,
            FieldType::Byte,
            "Double 300 is greater than Byte.MAX_VALUE",
        )
        .into();
        assert!(matches!(err, Error::Conversion { .. }));
    }

    #[test]
    fn test_audit_status_ordering() {
        assert!(AuditStatus::Info < AuditStatus::Warn);
        assert!(AuditStatus::Warn < AuditStatus::Error);
        assert_eq!(AuditStatus::Warn.to_string(), "WARN");
    }
}
