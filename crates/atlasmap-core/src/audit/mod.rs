//! Mapping pass diagnostics
//!
//! Every non-fatal issue met during a pass becomes an [`Audit`] appended to
//! the session's [`Audits`]. The list is ordered and append-only; callers
//! inspect the severities to decide whether partial output is usable.
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

pub mod reporting;

pub use reporting::AuditSummary;

use crate::error::AuditStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One diagnostic record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    pub status: AuditStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Offending value, when one is known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Mapping entry being processed when the record was made
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Audit {
    pub fn new(status: AuditStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            doc_id: None,
            path: None,
            value: None,
            mapping_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_doc_id(mut self, doc_id: Option<&str>) -> Self {
        self.doc_id = doc_id.map(str::to_string);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_value(mut self, value: impl ToString) -> Self {
        self.value = Some(value.to_string());
        self
    }
}

/// Ordered, append-only audit list of one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Audits {
    records: Vec<Audit>,
    #[serde(skip)]
    mapping_id: Option<String>,
}

impl Audits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute records made from now on to a mapping entry
    pub fn enter_mapping(&mut self, mapping_id: Option<&str>) {
        self.mapping_id = mapping_id.map(str::to_string);
    }

    /// Append a record, stamping it with the current mapping entry
    pub fn push(&mut self, mut audit: Audit) {
        if audit.mapping_id.is_none() {
            audit.mapping_id = self.mapping_id.clone();
        }
        self.records.push(audit);
    }

    pub fn info(&mut self, doc_id: Option<&str>, path: &str, message: impl Into<String>) {
        self.push(Audit::new(AuditStatus::Info, message).with_doc_id(doc_id).with_path(path));
    }

    pub fn warn(&mut self, doc_id: Option<&str>, path: &str, message: impl Into<String>) {
        self.push(Audit::new(AuditStatus::Warn, message).with_doc_id(doc_id).with_path(path));
    }

    pub fn error(&mut self, doc_id: Option<&str>, path: &str, message: impl Into<String>) {
        self.push(Audit::new(AuditStatus::Error, message).with_doc_id(doc_id).with_path(path));
    }

    pub fn records(&self) -> &[Audit] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &Audit> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn count(&self, status: AuditStatus) -> usize {
        self.records.iter().filter(|a| a.status == status).count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(AuditStatus::Error) > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.count(AuditStatus::Warn) > 0
    }

    /// Highest severity recorded so far
    pub fn max_status(&self) -> Option<AuditStatus> {
        self.records.iter().map(|a| a.status).max()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.mapping_id = None;
    }
}

impl<'a> IntoIterator for &'a Audits {
    type Item = &'a Audit;
    type IntoIter = std::slice::Iter<'a, Audit>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_keep_order_and_mapping() {
        let mut audits = Audits::new();
        audits.warn(Some("source"), "/a", "first");
        audits.enter_mapping(Some("m1"));
        audits.error(Some("target"), "/b", "second");

        let messages: Vec<_> = audits.iter().map(|a| a.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert_eq!(audits.records()[0].mapping_id, None);
        assert_eq!(audits.records()[1].mapping_id.as_deref(), Some("m1"));
    }

    #[test]
    fn test_severity_queries() {
        let mut audits = Audits::new();
        assert_eq!(audits.max_status(), None);
        audits.info(None, "/a", "note");
        audits.warn(None, "/a", "careful");
        assert!(audits.has_warnings());
        assert!(!audits.has_errors());
        assert_eq!(audits.max_status(), Some(AuditStatus::Warn));
    }
}
