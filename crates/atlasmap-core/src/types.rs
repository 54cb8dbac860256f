//! Core types for the AtlasMap mapping engine
//!
//! This module contains the field-level data model shared by the path parser,
//! the conversion registry, the document readers/writers and the engine.
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

use crate::actions::FieldAction;
use crate::document::object::ObjectValue;
use crate::path::FieldPath;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Field type across all supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    Boolean,
    Byte,
    Char,
    Double,
    Float,
    Integer,
    Long,
    Short,
    String,
    Decimal,
    Number,
    Complex,
    Unsupported,
    None,
}

impl FieldType {
    /// All scalar types that take part in auto-conversion
    pub const PRIMITIVES: [FieldType; 11] = [
        FieldType::Boolean,
        FieldType::Byte,
        FieldType::Char,
        FieldType::Double,
        FieldType::Float,
        FieldType::Integer,
        FieldType::Long,
        FieldType::Short,
        FieldType::String,
        FieldType::Decimal,
        FieldType::Number,
    ];

    /// Upper-case name used in audit and validation messages
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Boolean => "BOOLEAN",
            FieldType::Byte => "BYTE",
            FieldType::Char => "CHAR",
            FieldType::Double => "DOUBLE",
            FieldType::Float => "FLOAT",
            FieldType::Integer => "INTEGER",
            FieldType::Long => "LONG",
            FieldType::Short => "SHORT",
            FieldType::String => "STRING",
            FieldType::Decimal => "DECIMAL",
            FieldType::Number => "NUMBER",
            FieldType::Complex => "COMPLEX",
            FieldType::Unsupported => "UNSUPPORTED",
            FieldType::None => "NONE",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldType::Byte
                | FieldType::Short
                | FieldType::Integer
                | FieldType::Long
                | FieldType::Float
                | FieldType::Double
                | FieldType::Decimal
                | FieldType::Number
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a value repeats inside its document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CollectionType {
    #[default]
    None,
    Array,
    List,
    Map,
}

/// Processing status of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldStatus {
    #[default]
    Supported,
    Unsupported,
    Error,
}

/// Where a field takes its value from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Addressed by path inside a source or target document
    #[default]
    Document,
    /// Value is carried inline by the mapping definition
    Constant,
    /// Value is resolved by name from session or mapping properties
    Property,
}

/// A runtime field value
///
/// Every scalar variant corresponds to exactly one [`FieldType`]. Complex
/// values keep the serialized sub-tree of their document so they can be
/// passed through to a writer of the same format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum FieldValue {
    Boolean(bool),
    Byte(i8),
    Char(char),
    Double(f64),
    Float(f32),
    Integer(i32),
    Long(i64),
    Short(i16),
    String(String),
    Decimal(Decimal),
    Number(serde_json::Number),
    Complex(String),
}

impl FieldValue {
    /// The field type this value is an instance of
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Boolean(_) => FieldType::Boolean,
            FieldValue::Byte(_) => FieldType::Byte,
            FieldValue::Char(_) => FieldType::Char,
            FieldValue::Double(_) => FieldType::Double,
            FieldValue::Float(_) => FieldType::Float,
            FieldValue::Integer(_) => FieldType::Integer,
            FieldValue::Long(_) => FieldType::Long,
            FieldValue::Short(_) => FieldType::Short,
            FieldValue::String(_) => FieldType::String,
            FieldValue::Decimal(_) => FieldType::Decimal,
            FieldValue::Number(_) => FieldType::Number,
            FieldValue::Complex(_) => FieldType::Complex,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Classify a JSON scalar the way the JSON reader does
    ///
    /// Integers become INTEGER when they fit 32 bits, LONG when they fit 64
    /// bits and NUMBER beyond that; every float becomes DOUBLE. JSON has no
    /// float/short/long tag, so those never come out of this function.
    pub fn from_json_scalar(value: &Value) -> Option<FieldValue> {
        match value {
            Value::Bool(b) => Some(FieldValue::Boolean(*b)),
            Value::Number(n) => Some(Self::from_json_number(n)),
            Value::String(s) => Some(FieldValue::String(s.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn from_json_number(n: &serde_json::Number) -> FieldValue {
        if let Some(i) = n.as_i64() {
            match i32::try_from(i) {
                Ok(i) => FieldValue::Integer(i),
                Err(_) => FieldValue::Long(i),
            }
        } else if n.is_u64() {
            FieldValue::Number(n.clone())
        } else {
            FieldValue::Double(n.as_f64().unwrap_or(f64::NAN))
        }
    }

    /// Render as a JSON value; complex values are re-parsed
    pub fn to_json(&self) -> crate::Result<Value> {
        match self {
            FieldValue::Complex(raw) => Ok(serde_json::from_str(raw)?),
            other => Ok(Value::from(other.clone())),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Boolean(v) => write!(f, "{}", v),
            FieldValue::Byte(v) => write!(f, "{}", v),
            FieldValue::Char(v) => write!(f, "{}", v),
            FieldValue::Double(v) => write!(f, "{:?}", v),
            FieldValue::Float(v) => write!(f, "{:?}", v),
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::Long(v) => write!(f, "{}", v),
            FieldValue::Short(v) => write!(f, "{}", v),
            FieldValue::String(v) => f.write_str(v),
            FieldValue::Decimal(v) => write!(f, "{}", v),
            FieldValue::Number(v) => write!(f, "{}", v),
            FieldValue::Complex(v) => f.write_str(v),
        }
    }
}

impl TryFrom<Value> for FieldValue {
    type Error = String;

    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        match value {
            Value::Null => Err("field value cannot be null".to_string()),
            Value::Array(_) | Value::Object(_) => Ok(FieldValue::Complex(value.to_string())),
            scalar => FieldValue::from_json_scalar(&scalar)
                .ok_or_else(|| format!("unsupported field value {}", scalar)),
        }
    }
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Boolean(v) => Value::Bool(v),
            FieldValue::Byte(v) => Value::from(v),
            FieldValue::Char(v) => Value::String(v.to_string()),
            FieldValue::Double(v) => float_to_json(v),
            FieldValue::Float(v) => float_to_json(f64::from(v)),
            FieldValue::Integer(v) => Value::from(v),
            FieldValue::Long(v) => Value::from(v),
            FieldValue::Short(v) => Value::from(v),
            FieldValue::String(v) => Value::String(v),
            FieldValue::Decimal(v) => serde_json::Number::from_str(&v.to_string())
                .map(Value::Number)
                .unwrap_or_else(|_| Value::String(v.to_string())),
            FieldValue::Number(v) => Value::Number(v),
            FieldValue::Complex(raw) => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
        }
    }
}

fn float_to_json(v: f64) -> Value {
    serde_json::Number::from_f64(v)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// One addressable value occurrence in a source or target document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub path: FieldPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    /// Property name for property fields, informational otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Declared or detected type; `None` while still unknown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(default)]
    pub collection_type: CollectionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FieldValue>,
    /// Position for COMBINE / SEPARATE ordering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default)]
    pub status: FieldStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<FieldAction>,
    /// Child fields of a COMPLEX value, paths computed from this field's path
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Field>,
}

impl Field {
    /// Create a document field addressed by `path`
    pub fn new(path: FieldPath) -> Self {
        Self {
            path,
            ..Default::default()
        }
    }

    /// Parse `path` and create a document field for it
    pub fn at(path: &str) -> crate::Result<Self> {
        Ok(Self::new(FieldPath::parse(path)?))
    }

    pub fn with_doc_id(mut self, doc_id: impl Into<String>) -> Self {
        self.doc_id = Some(doc_id.into());
        self
    }

    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    /// Set a value; the field type follows the value unless already declared
    pub fn with_value(mut self, value: FieldValue) -> Self {
        if self.field_type.is_none() {
            self.field_type = Some(value.field_type());
        }
        self.value = Some(value);
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_action(mut self, action: FieldAction) -> Self {
        self.actions.push(action);
        self
    }

    /// A constant input field carrying `value`
    pub fn constant(value: FieldValue) -> Self {
        Self {
            kind: FieldKind::Constant,
            ..Default::default()
        }
        .with_value(value)
    }

    /// A property input field resolved by `name`
    pub fn property(name: impl Into<String>) -> Self {
        Self {
            kind: FieldKind::Property,
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Detected type, treating "unset" as NONE
    pub fn effective_type(&self) -> FieldType {
        self.field_type.unwrap_or(FieldType::None)
    }
}

/// Wire format of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Json,
    Xml,
    /// In-memory object graph
    Object,
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Json => write!(f, "json"),
            DocumentFormat::Xml => write!(f, "xml"),
            DocumentFormat::Object => write!(f, "object"),
        }
    }
}

/// A materialized source or target document
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    /// Serialized text (JSON, XML)
    Text(String),
    /// Object graph
    Object(ObjectValue),
}

impl Document {
    pub fn text(body: impl Into<String>) -> Self {
        Document::Text(body.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Document::Text(body) => Some(body),
            Document::Object(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Document::Object(value) => Some(value),
            Document::Text(_) => None,
        }
    }
}

impl From<ObjectValue> for Document {
    fn from(value: ObjectValue) -> Self {
        Document::Object(value)
    }
}
