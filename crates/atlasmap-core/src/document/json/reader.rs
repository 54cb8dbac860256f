//! JSON field reader
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

use super::node_kind;
use crate::audit::Audits;
use crate::document::{element_path, negative_index, FieldReader, NodeKind};
use crate::error::{Error, Result};
use crate::path::{FieldPath, PathSegment};
use crate::types::{CollectionType, Document, Field, FieldType, FieldValue};
use log::debug;
use serde_json::Value;

/// Outcome of walking a path through the tree
enum Lookup<'a> {
    Found(&'a Value),
    Missing,
    NegativeIndex(i64),
}

/// Reads fields from a parsed JSON tree
#[derive(Debug, Clone)]
pub struct JsonFieldReader {
    doc_id: String,
    root: Value,
}

impl JsonFieldReader {
    /// Parse a JSON text document
    pub fn new(doc_id: &str, document: &Document) -> Result<Self> {
        let text = document.as_text().ok_or_else(|| {
            Error::document_access(Some(doc_id), "JSON document must be provided as text")
        })?;
        let root = serde_json::from_str(text).map_err(|e| Error::DocumentAccess {
            doc_id: Some(doc_id.to_string()),
            message: format!("document is not valid JSON: {}", e),
            source: Some(anyhow::Error::new(e)),
        })?;
        Ok(Self::from_value(doc_id, root))
    }

    pub fn from_value(doc_id: &str, root: Value) -> Self {
        Self {
            doc_id: doc_id.to_string(),
            root,
        }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Root to start walking from, peeling a single wrapper object whose key
    /// the path does not name
    fn start(&self, path: &FieldPath) -> &Value {
        if let (Value::Object(map), Some(first)) = (&self.root, path.first()) {
            if map.len() == 1 {
                if let Some((key, inner)) = map.iter().next() {
                    if *key != first.qualified_name() {
                        return inner;
                    }
                }
            }
        }
        &self.root
    }

    fn lookup<'a>(&'a self, path: &FieldPath) -> Lookup<'a> {
        let mut current = self.start(path);
        let last = path.len().saturating_sub(1);

        for (position, segment) in path.segments().iter().enumerate() {
            if let Some(index) = segment.negative_index {
                return Lookup::NegativeIndex(index);
            }
            let child = match current {
                Value::Object(map) => map.get(&segment.qualified_name()),
                _ => None,
            };
            let child = match child {
                Some(child) => child,
                None => return Lookup::Missing,
            };
            current = match (child, segment.index) {
                (Value::Array(items), Some(index)) => match items.get(index) {
                    Some(item) => item,
                    None => return Lookup::Missing,
                },
                // first occurrence on the way down, the whole array at the leaf
                (Value::Array(items), None) if position < last => match items.first() {
                    Some(item) => item,
                    None => return Lookup::Missing,
                },
                (other, _) => other,
            };
        }
        Lookup::Found(current)
    }
}

/// Populate `field` from the node it resolved to
pub(crate) fn populate(field: &mut Field, node: &Value) {
    match node_kind(node) {
        NodeKind::Textual => {
            let text = node.as_str().unwrap_or_default();
            let first = text.chars().next();
            match (field.field_type, first) {
                (Some(FieldType::Char), Some(c)) => field.value = Some(FieldValue::Char(c)),
                _ => {
                    field.value = Some(FieldValue::String(text.to_string()));
                    field.field_type = Some(FieldType::String);
                }
            }
        }
        NodeKind::Numeric | NodeKind::Boolean => {
            if let Some(value) = FieldValue::from_json_scalar(node) {
                field.field_type = Some(value.field_type());
                field.value = Some(value);
            }
        }
        NodeKind::Null => field.value = None,
        NodeKind::Container => {
            field.value = Some(FieldValue::Complex(node.to_string()));
            field.field_type = Some(FieldType::Complex);
            field.children = children(&field.path, node);
            if node.is_array() {
                field.collection_type = CollectionType::Array;
            }
        }
        NodeKind::Other => {
            log::warn!(
                "Detected unsupported json type for field p={} docId={:?}",
                field.path,
                field.doc_id
            );
            field.value = Some(FieldValue::String(node.to_string()));
            field.field_type = Some(FieldType::Unsupported);
        }
    }
}

/// Child fields of a container, paths computed from the parent path
fn children(parent: &FieldPath, node: &Value) -> Vec<Field> {
    let mut children = Vec::new();
    match node {
        Value::Object(map) => {
            for (key, value) in map {
                let mut child = Field::new(parent.child(PathSegment::named(key.as_str())));
                populate(&mut child, value);
                children.push(child);
            }
        }
        Value::Array(items) if !parent.is_root() => {
            for (index, value) in items.iter().enumerate() {
                let mut child = Field::new(element_path(parent, index, CollectionType::Array));
                populate(&mut child, value);
                children.push(child);
            }
        }
        _ => {}
    }
    children
}

impl FieldReader for JsonFieldReader {
    fn read(&mut self, field: &mut Field, audits: &mut Audits) -> Result<()> {
        debug!("Reading JSON field {} from '{}'", field.path, self.doc_id);
        match self.lookup(&field.path) {
            Lookup::Found(node) => populate(field, node),
            Lookup::Missing => {
                field.value = None;
                field.field_type = Some(FieldType::None);
            }
            Lookup::NegativeIndex(index) => negative_index(field, audits, index),
        }
        Ok(())
    }

    fn collection_size(&mut self, path: &FieldPath) -> usize {
        let cut = path
            .segments()
            .iter()
            .position(PathSegment::is_collection)
            .map(|i| i + 1)
            .unwrap_or(path.len());
        let mut segments = path.segments()[..cut].to_vec();
        if let Some(last) = segments.last_mut() {
            last.index = None;
            last.negative_index = None;
        }
        match self.lookup(&FieldPath::from_segments(segments)) {
            Lookup::Found(Value::Array(items)) => items.len(),
            Lookup::Found(Value::Null) | Lookup::Missing | Lookup::NegativeIndex(_) => 0,
            Lookup::Found(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuditStatus;
    use serde_json::json;

    fn read(root: Value, path: &str) -> (Field, Audits) {
        let mut reader = JsonFieldReader::from_value("source", root);
        let mut field = Field::at(path).unwrap().with_doc_id("source");
        let mut audits = Audits::new();
        reader.read(&mut field, &mut audits).unwrap();
        (field, audits)
    }

    #[test]
    fn test_read_integer() {
        let (field, _) = read(json!({"doors": 5}), "/doors");
        assert_eq!(field.value, Some(FieldValue::Integer(5)));
        assert_eq!(field.field_type, Some(FieldType::Integer));
    }

    #[test]
    fn test_read_indexed_nested() {
        let doc = json!({"orders": [
            {"address": {"city": "Boston"}},
            {"address": {"city": "Denver"}}
        ]});
        let (field, _) = read(doc, "/orders[1]/address/city");
        assert_eq!(field.value, Some(FieldValue::String("Denver".to_string())));
    }

    #[test]
    fn test_root_peeling() {
        let doc = json!({"order": {"id": 7}});
        assert_eq!(read(doc.clone(), "/id").0.value, Some(FieldValue::Integer(7)));
        assert_eq!(read(doc, "/order/id").0.value, Some(FieldValue::Integer(7)));
    }

    #[test]
    fn test_missing_path_is_none() {
        let (field, audits) = read(json!({"a": {"b": 1}}), "/a/x/y");
        assert_eq!(field.value, None);
        assert_eq!(field.field_type, Some(FieldType::None));
        assert!(audits.is_empty());
    }

    #[test]
    fn test_negative_index_warns() {
        let (field, audits) = read(json!({"orders": [1, 2]}), "/orders[-1]");
        assert_eq!(field.field_type, Some(FieldType::None));
        assert_eq!(field.value, None);
        assert_eq!(audits.len(), 1);
        assert_eq!(audits.records()[0].status, AuditStatus::Warn);
    }

    #[test]
    fn test_negative_index_on_missing_member_warns() {
        let (field, audits) = read(json!({"orders": [1, 2]}), "/missing[-1]");
        assert_eq!(field.value, None);
        assert_eq!(audits.count(AuditStatus::Warn), 1);
    }

    #[test]
    fn test_numeric_classification_is_lossy() {
        let doc = json!({"f": 1.5, "l": 5_000_000_000i64, "s": 3, "big": u64::MAX});
        assert_eq!(read(doc.clone(), "/f").0.field_type, Some(FieldType::Double));
        assert_eq!(read(doc.clone(), "/l").0.field_type, Some(FieldType::Long));
        assert_eq!(read(doc.clone(), "/s").0.field_type, Some(FieldType::Integer));
        assert_eq!(read(doc, "/big").0.field_type, Some(FieldType::Number));
    }

    #[test]
    fn test_expected_char() {
        let mut reader = JsonFieldReader::from_value("source", json!({"grade": "Alpha"}));
        let mut field = Field::at("/grade").unwrap().with_type(FieldType::Char);
        reader.read(&mut field, &mut Audits::new()).unwrap();
        assert_eq!(field.value, Some(FieldValue::Char('A')));
        assert_eq!(field.field_type, Some(FieldType::Char));
    }

    #[test]
    fn test_null_leaves_type_unset() {
        let (field, _) = read(json!({"a": null, "b": 1}), "/a");
        assert_eq!(field.value, None);
        assert_eq!(field.field_type, None);
    }

    #[test]
    fn test_complex_with_children() {
        let (field, _) = read(json!({"order": {"id": 1, "tags": ["x", "y"]}, "n": 0}), "/order");
        assert_eq!(field.field_type, Some(FieldType::Complex));
        assert_eq!(field.children.len(), 2);
        assert_eq!(field.children[0].path.to_string(), "/order/id");
        let tags = &field.children[1];
        assert_eq!(tags.collection_type, CollectionType::Array);
        assert_eq!(tags.children[1].path.to_string(), "/order/tags[1]");
        assert_eq!(tags.children[1].value, Some(FieldValue::String("y".to_string())));
    }

    #[test]
    fn test_collection_size() {
        let mut reader = JsonFieldReader::from_value(
            "source",
            json!({"orders": [{"id": 1}, {"id": 2}, {"id": 3}], "single": {"id": 1}}),
        );
        assert_eq!(reader.collection_size(&FieldPath::parse("/orders[0]/id").unwrap()), 3);
        assert_eq!(reader.collection_size(&FieldPath::parse("/single").unwrap()), 1);
        assert_eq!(reader.collection_size(&FieldPath::parse("/none[]").unwrap()), 0);
    }

    #[test]
    fn test_invalid_document() {
        let err = JsonFieldReader::new("source", &Document::text("{not json")).unwrap_err();
        assert!(matches!(err, Error::DocumentAccess { .. }));
    }
}
