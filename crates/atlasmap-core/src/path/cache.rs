//! Pass-scoped cache of parsed and namespace-resolved paths
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

use super::{FieldPath, NamespaceTable, PathError};
use std::collections::HashMap;
use std::sync::Arc;

/// Cache of parsed paths keyed by their original string
#[derive(Debug, Clone, Default)]
pub struct PathCache {
    parsed: HashMap<String, Arc<FieldPath>>,
    resolved: HashMap<String, Arc<FieldPath>>,
    hits: usize,
    misses: usize,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `path`, reusing an earlier parse of the same string
    pub fn parse(&mut self, path: &str) -> Result<Arc<FieldPath>, PathError> {
        if let Some(cached) = self.parsed.get(path) {
            self.hits += 1;
            return Ok(Arc::clone(cached));
        }
        self.misses += 1;
        let parsed = Arc::new(FieldPath::parse(path)?);
        self.parsed.insert(path.to_string(), Arc::clone(&parsed));
        Ok(parsed)
    }

    /// Resolve the namespaces of `path` against `namespaces`
    ///
    /// Entries are keyed by path string only, so one cache must only ever be
    /// used with one namespace table.
    pub fn resolve(&mut self, path: &FieldPath, namespaces: &NamespaceTable) -> Arc<FieldPath> {
        if let Some(cached) = self.resolved.get(path.as_str()) {
            self.hits += 1;
            return Arc::clone(cached);
        }
        self.misses += 1;
        let resolved = Arc::new(path.resolve_namespaces(namespaces));
        self.resolved
            .insert(path.as_str().to_string(), Arc::clone(&resolved));
        resolved
    }

    pub fn len(&self) -> usize {
        self.parsed.len() + self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn clear(&mut self) {
        self.parsed.clear();
        self.resolved.clear();
    }
}
