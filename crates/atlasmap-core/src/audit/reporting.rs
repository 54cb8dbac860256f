//! Reporting and formatting utilities for audit lists

use super::Audits;
use crate::error::{AuditStatus, Result};
use serde::{Deserialize, Serialize};

/// Record counts per severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub info: usize,
    pub warn: usize,
    pub error: usize,
}

impl AuditSummary {
    pub fn total(&self) -> usize {
        self.info + self.warn + self.error
    }
}

impl Audits {
    /// Count records per severity
    pub fn summary(&self) -> AuditSummary {
        self.iter().fold(AuditSummary::default(), |mut summary, audit| {
            match audit.status {
                AuditStatus::Info => summary.info += 1,
                AuditStatus::Warn => summary.warn += 1,
                AuditStatus::Error => summary.error += 1,
            }
            summary
        })
    }

    /// Serialize the records as a JSON array
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Generate a human-readable audit report
    pub fn generate_report(&self) -> String {
        let summary = self.summary();
        let mut report = String::new();

        report.push_str("=== Mapping Audit Report ===\n\n");
        report.push_str(&format!("Errors: {}\n", summary.error));
        report.push_str(&format!("Warnings: {}\n", summary.warn));
        report.push_str(&format!("Info: {}\n", summary.info));

        if self.is_empty() {
            return report;
        }

        report.push('\n');
        for audit in self {
            report.push_str(&format!("[{}] {}\n", audit.status, audit.message));
            let location: Vec<String> = [
                audit.mapping_id.as_ref().map(|m| format!("mapping={}", m)),
                audit.doc_id.as_ref().map(|d| format!("docId={}", d)),
                audit.path.as_ref().map(|p| format!("path={}", p)),
                audit.value.as_ref().map(|v| format!("value={}", v)),
            ]
            .into_iter()
            .flatten()
            .collect();
            if !location.is_empty() {
                report.push_str(&format!("    {}\n", location.join(" ")));
            }
        }

        report
    }
}
