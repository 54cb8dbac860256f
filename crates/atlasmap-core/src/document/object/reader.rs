//! Object-graph field reader
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

use super::ObjectValue;
use crate::audit::Audits;
use crate::document::{element_path, negative_index, FieldReader, NodeKind};
use crate::error::{Error, Result};
use crate::path::{FieldPath, PathSegment};
use crate::types::{CollectionType, Document, Field, FieldType, FieldValue};
use log::{debug, warn};

enum Lookup<'a> {
    Found(&'a ObjectValue),
    Missing,
    NegativeIndex(i64),
}

fn items(value: &ObjectValue) -> Option<&[ObjectValue]> {
    match value {
        ObjectValue::List(items) | ObjectValue::Array(items) => Some(items.as_slice()),
        _ => None,
    }
}

/// Reads fields from an object graph
#[derive(Debug, Clone)]
pub struct ObjectFieldReader {
    doc_id: String,
    root: ObjectValue,
}

impl ObjectFieldReader {
    pub fn new(doc_id: &str, document: &Document) -> Result<Self> {
        let root = document.as_object().ok_or_else(|| {
            Error::document_access(Some(doc_id), "object document must be provided as an object graph")
        })?;
        Ok(Self::from_value(doc_id, root.clone()))
    }

    pub fn from_value(doc_id: &str, root: ObjectValue) -> Self {
        Self {
            doc_id: doc_id.to_string(),
            root,
        }
    }

    /// Root to start from, peeling a single-property wrapper the path does
    /// not name
    fn start(&self, path: &FieldPath) -> &ObjectValue {
        if let (ObjectValue::Object { fields, .. }, Some(first)) = (&self.root, path.first()) {
            if fields.len() == 1 {
                if let Some((name, inner)) = fields.iter().next() {
                    if *name != first.qualified_name() {
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
            let child = match current.get(&segment.qualified_name()) {
                Some(child) => child,
                None => return Lookup::Missing,
            };
            current = match (items(child), segment.index) {
                (Some(items), Some(index)) => match items.get(index) {
                    Some(item) => item,
                    None => return Lookup::Missing,
                },
                (Some(items), None) if position < last => match items.first() {
                    Some(item) => item,
                    None => return Lookup::Missing,
                },
                _ => child,
            };
        }
        Lookup::Found(current)
    }
}

fn populate(field: &mut Field, node: &ObjectValue, audits: &mut Audits) {
    match node.kind() {
        NodeKind::Textual => match (node, field.field_type) {
            (ObjectValue::String(text), Some(FieldType::Char)) if !text.is_empty() => {
                field.value = text.chars().next().map(FieldValue::Char);
            }
            _ => {
                if let Some(value) = node.to_field_value() {
                    field.field_type = Some(value.field_type());
                    field.value = Some(value);
                }
            }
        },
        NodeKind::Numeric | NodeKind::Boolean => {
            if let Some(value) = node.to_field_value() {
                field.field_type = Some(value.field_type());
                field.value = Some(value);
            }
        }
        NodeKind::Null => field.value = None,
        NodeKind::Container => {
            field.value = Some(FieldValue::Complex(node.to_json().to_string()));
            field.field_type = Some(FieldType::Complex);
            match node {
                ObjectValue::List(_) => field.collection_type = CollectionType::List,
                ObjectValue::Array(_) => field.collection_type = CollectionType::Array,
                ObjectValue::Map(_) => field.collection_type = CollectionType::Map,
                _ => {}
            }
            field.children = children(&field.path, node, audits);
        }
        NodeKind::Other => {
            let type_name = match node {
                ObjectValue::Opaque { type_name, .. } => type_name.as_str(),
                _ => "unknown",
            };
            let message = format!(
                "Unsupported object type '{}' at path '{}'",
                type_name, field.path
            );
            warn!("{} (docId={:?})", message, field.doc_id);
            audits.warn(field.doc_id.as_deref(), field.path.as_str(), message);
            if let ObjectValue::Opaque { repr, .. } = node {
                field.value = Some(FieldValue::String(repr.clone()));
            }
            field.field_type = Some(FieldType::Unsupported);
        }
    }
}

fn children(parent: &FieldPath, node: &ObjectValue, audits: &mut Audits) -> Vec<Field> {
    let mut children = Vec::new();
    match node {
        ObjectValue::Object { fields: entries, .. } | ObjectValue::Map(entries) => {
            for (name, value) in entries {
                let mut child = Field::new(parent.child(PathSegment::named(name.as_str())));
                populate(&mut child, value, audits);
                children.push(child);
            }
        }
        ObjectValue::List(items) | ObjectValue::Array(items) if !parent.is_root() => {
            let collection = match node {
                ObjectValue::List(_) => CollectionType::List,
                _ => CollectionType::Array,
            };
            for (index, value) in items.iter().enumerate() {
                let mut child = Field::new(element_path(parent, index, collection));
                populate(&mut child, value, audits);
                children.push(child);
            }
        }
        _ => {}
    }
    children
}

impl FieldReader for ObjectFieldReader {
    fn read(&mut self, field: &mut Field, audits: &mut Audits) -> Result<()> {
        debug!("Reading object field {} from '{}'", field.path, self.doc_id);
        match self.lookup(&field.path) {
            Lookup::Found(node) => populate(field, node, audits),
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
            Lookup::Found(ObjectValue::Null) | Lookup::Missing | Lookup::NegativeIndex(_) => 0,
            Lookup::Found(ObjectValue::Map(entries)) => entries.len(),
            Lookup::Found(node) => items(node).map(<[ObjectValue]>::len).unwrap_or(1),
        }
    }
}
