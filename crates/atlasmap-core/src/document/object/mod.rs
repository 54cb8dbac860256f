//! Object-graph document module
//!
//! Host applications hand over an in-memory object graph instead of text.
//! How that graph is built from native objects is up to the caller; the
//! engine only sees [`ObjectValue`] trees. Scalars keep their exact numeric
//! width, unlike JSON where every integer is classified by magnitude.
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

pub mod reader;
pub mod writer;

pub use reader::ObjectFieldReader;
pub use writer::ObjectFieldWriter;

use super::{FieldReader, FieldWriter, FormatModule, NodeKind};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::path::NamespaceTable;
use crate::types::{Document, DocumentFormat, FieldValue};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

/// A node of an object graph
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectValue {
    Null,
    Boolean(bool),
    Byte(i8),
    Char(char),
    Short(i16),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    /// Arbitrary-precision integer
    Number(serde_json::Number),
    String(String),
    /// Bean-like object with named properties
    Object {
        type_name: Option<String>,
        fields: IndexMap<String, ObjectValue>,
    },
    List(Vec<ObjectValue>),
    Array(Vec<ObjectValue>),
    Map(IndexMap<String, ObjectValue>),
    /// Value the engine cannot look into
    Opaque { type_name: String, repr: String },
}

impl ObjectValue {
    /// Empty untyped object
    pub fn object() -> Self {
        ObjectValue::Object {
            type_name: None,
            fields: IndexMap::new(),
        }
    }

    /// Empty object of a named type
    pub fn typed(type_name: impl Into<String>) -> Self {
        ObjectValue::Object {
            type_name: Some(type_name.into()),
            fields: IndexMap::new(),
        }
    }

    /// Builder-style property setter; ignored on non-objects
    pub fn with(mut self, name: &str, value: impl Into<ObjectValue>) -> Self {
        if let ObjectValue::Object { fields, .. } = &mut self {
            fields.insert(name.to_string(), value.into());
        }
        self
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            ObjectValue::Null => NodeKind::Null,
            ObjectValue::Boolean(_) => NodeKind::Boolean,
            ObjectValue::Char(_) | ObjectValue::String(_) => NodeKind::Textual,
            ObjectValue::Byte(_)
            | ObjectValue::Short(_)
            | ObjectValue::Integer(_)
            | ObjectValue::Long(_)
            | ObjectValue::Float(_)
            | ObjectValue::Double(_)
            | ObjectValue::Decimal(_)
            | ObjectValue::Number(_) => NodeKind::Numeric,
            ObjectValue::Object { .. }
            | ObjectValue::List(_)
            | ObjectValue::Array(_)
            | ObjectValue::Map(_) => NodeKind::Container,
            ObjectValue::Opaque { .. } => NodeKind::Other,
        }
    }

    /// Named member of an object or map
    pub fn get(&self, name: &str) -> Option<&ObjectValue> {
        match self {
            ObjectValue::Object { fields, .. } => fields.get(name),
            ObjectValue::Map(entries) => entries.get(name),
            _ => None,
        }
    }

    /// The scalar as a field value
    pub fn to_field_value(&self) -> Option<FieldValue> {
        let value = match self {
            ObjectValue::Boolean(v) => FieldValue::Boolean(*v),
            ObjectValue::Byte(v) => FieldValue::Byte(*v),
            ObjectValue::Char(v) => FieldValue::Char(*v),
            ObjectValue::Short(v) => FieldValue::Short(*v),
            ObjectValue::Integer(v) => FieldValue::Integer(*v),
            ObjectValue::Long(v) => FieldValue::Long(*v),
            ObjectValue::Float(v) => FieldValue::Float(*v),
            ObjectValue::Double(v) => FieldValue::Double(*v),
            ObjectValue::Decimal(v) => FieldValue::Decimal(*v),
            ObjectValue::Number(v) => FieldValue::Number(v.clone()),
            ObjectValue::String(v) => FieldValue::String(v.clone()),
            _ => return None,
        };
        Some(value)
    }

    /// Object-graph value for a field value; complex values are parsed as JSON
    pub fn from_field_value(value: &FieldValue) -> Result<Self> {
        Ok(match value {
            FieldValue::Boolean(v) => ObjectValue::Boolean(*v),
            FieldValue::Byte(v) => ObjectValue::Byte(*v),
            FieldValue::Char(v) => ObjectValue::Char(*v),
            FieldValue::Short(v) => ObjectValue::Short(*v),
            FieldValue::Integer(v) => ObjectValue::Integer(*v),
            FieldValue::Long(v) => ObjectValue::Long(*v),
            FieldValue::Float(v) => ObjectValue::Float(*v),
            FieldValue::Double(v) => ObjectValue::Double(*v),
            FieldValue::Decimal(v) => ObjectValue::Decimal(*v),
            FieldValue::Number(v) => ObjectValue::Number(v.clone()),
            FieldValue::String(v) => ObjectValue::String(v.clone()),
            FieldValue::Complex(raw) => {
                let parsed: Value = serde_json::from_str(raw)?;
                ObjectValue::from_json(&parsed)
            }
        })
    }

    /// Build a graph from JSON; arrays become [`ObjectValue::Array`]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => ObjectValue::Null,
            Value::Bool(v) => ObjectValue::Boolean(*v),
            Value::Number(n) => match FieldValue::from_json_number(n) {
                FieldValue::Integer(v) => ObjectValue::Integer(v),
                FieldValue::Long(v) => ObjectValue::Long(v),
                FieldValue::Double(v) => ObjectValue::Double(v),
                _ => ObjectValue::Number(n.clone()),
            },
            Value::String(s) => ObjectValue::String(s.clone()),
            Value::Array(items) => ObjectValue::Array(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => ObjectValue::Object {
                type_name: None,
                fields: map
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            },
        }
    }

    /// JSON rendering, used for complex passthrough
    pub fn to_json(&self) -> Value {
        match self {
            ObjectValue::Null => Value::Null,
            ObjectValue::Object { fields, .. } => Value::Object(to_json_map(fields)),
            ObjectValue::Map(entries) => Value::Object(to_json_map(entries)),
            ObjectValue::List(items) | ObjectValue::Array(items) => {
                Value::Array(items.iter().map(Self::to_json).collect())
            }
            ObjectValue::Opaque { repr, .. } => Value::String(repr.clone()),
            scalar => scalar.to_field_value().map(Value::from).unwrap_or(Value::Null),
        }
    }
}

fn to_json_map(entries: &IndexMap<String, ObjectValue>) -> Map<String, Value> {
    entries
        .iter()
        .map(|(k, v)| (k.clone(), v.to_json()))
        .collect()
}

impl From<&str> for ObjectValue {
    fn from(value: &str) -> Self {
        ObjectValue::String(value.to_string())
    }
}

impl From<String> for ObjectValue {
    fn from(value: String) -> Self {
        ObjectValue::String(value)
    }
}

impl From<bool> for ObjectValue {
    fn from(value: bool) -> Self {
        ObjectValue::Boolean(value)
    }
}

impl From<i32> for ObjectValue {
    fn from(value: i32) -> Self {
        ObjectValue::Integer(value)
    }
}

impl From<i64> for ObjectValue {
    fn from(value: i64) -> Self {
        ObjectValue::Long(value)
    }
}

impl From<f64> for ObjectValue {
    fn from(value: f64) -> Self {
        ObjectValue::Double(value)
    }
}

/// In-memory object graphs
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectModule;

impl FormatModule for ObjectModule {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Object
    }

    fn create_reader(
        &self,
        doc_id: &str,
        document: &Document,
        _namespaces: &NamespaceTable,
    ) -> Result<Box<dyn FieldReader>> {
        Ok(Box::new(ObjectFieldReader::new(doc_id, document)?))
    }

    fn create_writer(
        &self,
        doc_id: &str,
        _namespaces: &NamespaceTable,
        config: &EngineConfig,
    ) -> Result<Box<dyn FieldWriter>> {
        Ok(Box::new(
            ObjectFieldWriter::new(doc_id).with_max_index(config.max_collection_index),
        ))
    }
}
