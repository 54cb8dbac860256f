//! JSON field writer
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

use crate::config::DEFAULT_MAX_COLLECTION_INDEX;
use crate::document::{check_write_index, FieldWriter};
use crate::error::{Error, Result};
use crate::path::PathSegment;
use crate::types::{Document, Field};
use log::debug;
use serde_json::{Map, Value};

/// Builds a JSON tree from written fields
#[derive(Debug, Clone)]
pub struct JsonFieldWriter {
    doc_id: String,
    root: Value,
    pretty: bool,
    max_index: usize,
}

impl JsonFieldWriter {
    pub fn new(doc_id: &str) -> Self {
        Self {
            doc_id: doc_id.to_string(),
            root: Value::Object(Map::new()),
            pretty: false,
            max_index: DEFAULT_MAX_COLLECTION_INDEX,
        }
    }

    /// Largest index a write may grow an array to
    pub fn with_max_index(mut self, max_index: usize) -> Self {
        self.max_index = max_index;
        self
    }

    /// Serialize with indentation
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    fn error(&self, message: String) -> Error {
        Error::document_access(Some(&self.doc_id), message)
    }

    /// Member `key` of `node`, created with `fresh` when missing or null
    fn member<'a>(
        &self,
        node: &'a mut Value,
        segment: &PathSegment,
        fresh: fn() -> Value,
    ) -> Result<&'a mut Value> {
        if node.is_null() {
            *node = Value::Object(Map::new());
        }
        let map = node.as_object_mut().ok_or_else(|| {
            self.error(format!(
                "cannot create '{}' below a non-object value",
                segment.qualified_name()
            ))
        })?;
        let child = map.entry(segment.qualified_name()).or_insert_with(fresh);
        if child.is_null() {
            *child = fresh();
        }
        Ok(child)
    }

    /// Array member for a collection segment
    fn array<'a>(&self, node: &'a mut Value, segment: &PathSegment) -> Result<&'a mut Vec<Value>> {
        if let Some(index) = segment.negative_index {
            return Err(self.error(format!(
                "cannot write at negative index {} of '{}'",
                index, segment.name
            )));
        }
        check_write_index(&self.doc_id, segment, self.max_index)?;
        self.member(node, segment, || Value::Array(Vec::new()))?
            .as_array_mut()
            .ok_or_else(|| {
                self.error(format!(
                    "'{}' already holds a non-array value",
                    segment.qualified_name()
                ))
            })
    }

    /// Place `value` at `parents`/`last` below `root`
    fn place(
        &self,
        root: &mut Value,
        parents: &[PathSegment],
        last: &PathSegment,
        value: Value,
    ) -> Result<()> {
        let mut current = root;
        for segment in parents {
            current = if segment.is_collection() {
                let items = self.array(current, segment)?;
                let index = segment
                    .index
                    .unwrap_or_else(|| items.len().saturating_sub(1));
                let item = self.slot(items, segment, index)?;
                if item.is_null() {
                    *item = Value::Object(Map::new());
                }
                item
            } else {
                self.member(current, segment, || Value::Object(Map::new()))?
            };
        }

        if last.is_collection() {
            let items = self.array(current, last)?;
            match last.index {
                Some(index) => *self.slot(items, last, index)? = value,
                None => items.push(value),
            }
        } else {
            *self.member(current, last, || Value::Null)? = value;
        }
        Ok(())
    }

    /// Slot `index` of `items`, padding with nulls
    fn slot<'a>(
        &self,
        items: &'a mut Vec<Value>,
        segment: &PathSegment,
        index: usize,
    ) -> Result<&'a mut Value> {
        if items.len() <= index {
            let len = index
                .checked_add(1)
                .ok_or_else(|| self.error(format!("index {} of '{}' is too large", index, segment.name)))?;
            items.resize(len, Value::Null);
        }
        items
            .get_mut(index)
            .ok_or_else(|| self.error(format!("no slot {} in '{}'", index, segment.name)))
    }
}

impl FieldWriter for JsonFieldWriter {
    fn write(&mut self, field: &Field) -> Result<()> {
        debug!("Writing JSON field {} to '{}'", field.path, self.doc_id);
        let value = match &field.value {
            Some(value) => value.to_json()?,
            None => Value::Null,
        };

        let segments = field.path.segments();
        let (last, parents) = match segments.split_last() {
            Some(split) => split,
            None => {
                if !value.is_object() && !value.is_array() {
                    return Err(self.error("cannot write a scalar value at the document root".to_string()));
                }
                self.root = value;
                return Ok(());
            }
        };

        let mut root = std::mem::take(&mut self.root);
        let result = self.place(&mut root, parents, last, value);
        self.root = root;
        result
    }

    fn document(&self) -> Result<Document> {
        let text = if self.pretty {
            serde_json::to_string_pretty(&self.root)?
        } else {
            serde_json::to_string(&self.root)?
        };
        Ok(Document::Text(text))
    }
}
