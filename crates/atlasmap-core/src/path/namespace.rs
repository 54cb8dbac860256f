//! Namespace prefix table
//!
//! Ordered URI to prefix declarations, seeded from a document's own
//! declarations and from mapping metadata. When several URIs share a prefix
//! the first declared one wins.
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

use indexmap::IndexMap;

/// Ordered namespace declarations keyed by URI
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceTable {
    entries: IndexMap<String, String>,
}

impl NamespaceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `uri` under `prefix`; the empty prefix is the default namespace
    pub fn declare(&mut self, uri: impl Into<String>, prefix: impl Into<String>) {
        self.entries.insert(uri.into(), prefix.into());
    }

    /// Add every declaration of `other` not already present here
    pub fn merge(&mut self, other: &NamespaceTable) {
        for (uri, prefix) in &other.entries {
            self.entries
                .entry(uri.clone())
                .or_insert_with(|| prefix.clone());
        }
    }

    pub fn uri_for_prefix(&self, prefix: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, p)| p.as_str() == prefix)
            .map(|(uri, _)| uri.as_str())
    }

    pub fn prefix_for_uri(&self, uri: &str) -> Option<&str> {
        self.entries.get(uri).map(String::as_str)
    }

    pub fn default_namespace(&self) -> Option<&str> {
        self.uri_for_prefix("")
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Declarations in order as `(uri, prefix)`
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(u, p)| (u.as_str(), p.as_str()))
    }
}

impl<U: Into<String>, P: Into<String>> FromIterator<(U, P)> for NamespaceTable {
    fn from_iter<I: IntoIterator<Item = (U, P)>>(iter: I) -> Self {
        let mut table = NamespaceTable::new();
        for (uri, prefix) in iter {
            table.declare(uri, prefix);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_declaration_wins_for_shared_prefix() {
        let table: NamespaceTable = [("urn:a", "ns"), ("urn:b", "ns")].into_iter().collect();
        assert_eq!(table.uri_for_prefix("ns"), Some("urn:a"));
        assert_eq!(table.prefix_for_uri("urn:b"), Some("ns"));
    }

    #[test]
    fn test_missing_prefix() {
        let table: NamespaceTable = [("urn:a", "a")].into_iter().collect();
        assert_eq!(table.uri_for_prefix("b"), None);
        assert_eq!(table.default_namespace(), None);
    }

    #[test]
    fn test_merge_keeps_existing() {
        let mut doc: NamespaceTable = [("urn:a", "a")].into_iter().collect();
        let mapping: NamespaceTable = [("urn:a", "other"), ("urn:b", "b")].into_iter().collect();
        doc.merge(&mapping);
        assert_eq!(doc.prefix_for_uri("urn:a"), Some("a"));
        assert_eq!(doc.uri_for_prefix("b"), Some("urn:b"));
        assert_eq!(doc.len(), 2);
    }
}
