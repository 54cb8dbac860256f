//! Mapping validation
//!
//! Validation runs over a mapping definition before any document is read.
//! It reports structural problems (entries without fields, unknown lookup
//! tables, data source references pointing the wrong way) and, for MAP
//! entries with declared types on both sides, the concerns of the
//! conversion the engine will have to perform.
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

mod validator;

pub use validator::MappingValidator;

use crate::audit::Audit;
use crate::error::AuditStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Part of the mapping definition a notice refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidationScope {
    Mapping,
    DataSource,
    LookupTable,
    /// A single mapping entry, identified by its id or alias
    Entry,
}

impl fmt::Display for ValidationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationScope::Mapping => write!(f, "MAPPING"),
            ValidationScope::DataSource => write!(f, "DATA_SOURCE"),
            ValidationScope::LookupTable => write!(f, "LOOKUP_TABLE"),
            ValidationScope::Entry => write!(f, "ENTRY"),
        }
    }
}

/// One validation notice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub scope: ValidationScope,
    /// Id of the data source, lookup table or entry in scope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub message: String,
    pub status: AuditStatus,
}

impl Validation {
    pub fn new(
        scope: ValidationScope,
        id: Option<&str>,
        message: impl Into<String>,
        status: AuditStatus,
    ) -> Self {
        Self {
            scope,
            id: id.map(str::to_string),
            message: message.into(),
            status,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == AuditStatus::Error
    }

    /// Audit record carrying this notice
    pub fn to_audit(&self) -> Audit {
        let mut audit = Audit::new(self.status, self.message.clone());
        if self.scope == ValidationScope::Entry {
            audit.mapping_id = self.id.clone();
        }
        audit
    }
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "[{}] {} '{}': {}", self.status, self.scope, id, self.message),
            None => write!(f, "[{}] {}: {}", self.status, self.scope, self.message),
        }
    }
}

/// Whether any notice in `validations` is an error
pub fn has_errors(validations: &[Validation]) -> bool {
    validations.iter().any(Validation::is_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let notice = Validation::new(
            ValidationScope::Entry,
            Some("m1"),
            "Mapping entry has no input fields",
            AuditStatus::Error,
        );
        assert_eq!(
            notice.to_string(),
            "[ERROR] ENTRY 'm1': Mapping entry has no input fields"
        );
        assert!(has_errors(&[notice]));
    }

    #[test]
    fn test_entry_notices_become_entry_audits() {
        let notice = Validation::new(ValidationScope::Entry, Some("m2"), "careful", AuditStatus::Warn);
        let audit = notice.to_audit();
        assert_eq!(audit.status, AuditStatus::Warn);
        assert_eq!(audit.mapping_id.as_deref(), Some("m2"));

        let notice = Validation::new(ValidationScope::LookupTable, Some("t"), "x", AuditStatus::Info);
        assert_eq!(notice.to_audit().mapping_id, None);
    }
}
