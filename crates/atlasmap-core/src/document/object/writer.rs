//! Object-graph field writer
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

use super::ObjectValue;
use crate::config::DEFAULT_MAX_COLLECTION_INDEX;
use crate::document::{check_write_index, FieldWriter};
use crate::error::{Error, Result};
use crate::path::PathSegment;
use crate::types::{CollectionType, Document, Field};
use log::debug;

/// Builds an object graph from written fields
///
/// `[]` segments create arrays, `<>` segments create lists.
#[derive(Debug, Clone)]
pub struct ObjectFieldWriter {
    doc_id: String,
    root: ObjectValue,
    max_index: usize,
}

impl ObjectFieldWriter {
    pub fn new(doc_id: &str) -> Self {
        Self {
            doc_id: doc_id.to_string(),
            root: ObjectValue::object(),
            max_index: DEFAULT_MAX_COLLECTION_INDEX,
        }
    }

    /// Largest index a write may grow a list or array to
    pub fn with_max_index(mut self, max_index: usize) -> Self {
        self.max_index = max_index;
        self
    }

    pub fn root(&self) -> &ObjectValue {
        &self.root
    }

    fn error(&self, message: String) -> Error {
        Error::document_access(Some(&self.doc_id), message)
    }

    fn member<'a>(
        &self,
        node: &'a mut ObjectValue,
        segment: &PathSegment,
        fresh: ObjectValue,
    ) -> Result<&'a mut ObjectValue> {
        if *node == ObjectValue::Null {
            *node = ObjectValue::object();
        }
        let entries = match node {
            ObjectValue::Object { fields, .. } => fields,
            ObjectValue::Map(entries) => entries,
            _ => {
                return Err(self.error(format!(
                    "cannot create '{}' below a non-object value",
                    segment.qualified_name()
                )))
            }
        };
        let child = entries
            .entry(segment.qualified_name())
            .or_insert_with(|| fresh.clone());
        if *child == ObjectValue::Null {
            *child = fresh;
        }
        Ok(child)
    }

    fn items<'a>(
        &self,
        node: &'a mut ObjectValue,
        segment: &PathSegment,
    ) -> Result<&'a mut Vec<ObjectValue>> {
        if let Some(index) = segment.negative_index {
            return Err(self.error(format!(
                "cannot write at negative index {} of '{}'",
                index, segment.name
            )));
        }
        check_write_index(&self.doc_id, segment, self.max_index)?;
        let fresh = match segment.collection {
            Some(CollectionType::List) => ObjectValue::List(Vec::new()),
            _ => ObjectValue::Array(Vec::new()),
        };
        match self.member(node, segment, fresh)? {
            ObjectValue::List(items) | ObjectValue::Array(items) => Ok(items),
            _ => Err(self.error(format!(
                "'{}' already holds a non-collection value",
                segment.qualified_name()
            ))),
        }
    }

    fn place(
        &self,
        root: &mut ObjectValue,
        parents: &[PathSegment],
        last: &PathSegment,
        value: ObjectValue,
    ) -> Result<()> {
        let mut current = root;
        for segment in parents {
            current = if segment.is_collection() {
                let items = self.items(current, segment)?;
                let index = segment
                    .index
                    .unwrap_or_else(|| items.len().saturating_sub(1));
                let item = self.slot(items, segment, index)?;
                if *item == ObjectValue::Null {
                    *item = ObjectValue::object();
                }
                item
            } else {
                self.member(current, segment, ObjectValue::object())?
            };
        }

        if last.is_collection() {
            let items = self.items(current, last)?;
            match last.index {
                Some(index) => *self.slot(items, last, index)? = value,
                None => items.push(value),
            }
        } else {
            *self.member(current, last, ObjectValue::Null)? = value;
        }
        Ok(())
    }

    fn slot<'a>(
        &self,
        items: &'a mut Vec<ObjectValue>,
        segment: &PathSegment,
        index: usize,
    ) -> Result<&'a mut ObjectValue> {
        if items.len() <= index {
            let len = index
                .checked_add(1)
                .ok_or_else(|| self.error(format!("index {} of '{}' is too large", index, segment.name)))?;
            items.resize(len, ObjectValue::Null);
        }
        items
            .get_mut(index)
            .ok_or_else(|| self.error(format!("no slot {} in '{}'", index, segment.name)))
    }
}

impl FieldWriter for ObjectFieldWriter {
    fn write(&mut self, field: &Field) -> Result<()> {
        debug!("Writing object field {} to '{}'", field.path, self.doc_id);
        let value = match &field.value {
            Some(value) => ObjectValue::from_field_value(value)?,
            None => ObjectValue::Null,
        };

        let (last, parents) = match field.path.segments().split_last() {
            Some(split) => split,
            None => {
                if !matches!(
                    value,
                    ObjectValue::Object { .. }
                        | ObjectValue::Map(_)
                        | ObjectValue::List(_)
                        | ObjectValue::Array(_)
                ) {
                    return Err(self.error("cannot write a scalar value at the graph root".to_string()));
                }
                self.root = value;
                return Ok(());
            }
        };

        let mut root = std::mem::replace(&mut self.root, ObjectValue::Null);
        let result = self.place(&mut root, parents, last, value);
        self.root = root;
        result
    }

    fn document(&self) -> Result<Document> {
        Ok(Document::Object(self.root.clone()))
    }
}
