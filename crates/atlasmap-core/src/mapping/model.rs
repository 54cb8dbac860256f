//! Mapping definition model
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

use crate::actions::FieldAction;
use crate::path::NamespaceTable;
use crate::types::{DocumentFormat, Field, FieldType, FieldValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A complete mapping definition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlasMapping {
    pub name: String,
    #[serde(default)]
    pub data_sources: Vec<DataSource>,
    #[serde(default)]
    pub mappings: Vec<MappingEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lookup_tables: Vec<LookupTable>,
    /// Mapping-level properties, consulted after session properties
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, FieldValue>,
}

impl AtlasMapping {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn data_source(&self, id: &str) -> Option<&DataSource> {
        self.data_sources.iter().find(|ds| ds.id == id)
    }

    pub fn sources(&self) -> impl Iterator<Item = &DataSource> {
        self.data_sources
            .iter()
            .filter(|ds| ds.data_source_type == DataSourceType::Source)
    }

    pub fn targets(&self) -> impl Iterator<Item = &DataSource> {
        self.data_sources
            .iter()
            .filter(|ds| ds.data_source_type == DataSourceType::Target)
    }

    pub fn lookup_table(&self, name: &str) -> Option<&LookupTable> {
        self.lookup_tables.iter().find(|t| t.name == name)
    }
}

/// Direction of a data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataSourceType {
    Source,
    Target,
}

impl fmt::Display for DataSourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceType::Source => write!(f, "SOURCE"),
            DataSourceType::Target => write!(f, "TARGET"),
        }
    }
}

/// A namespace declared for an XML data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceDeclaration {
    /// Prefix used in field paths; empty for the default namespace
    #[serde(default)]
    pub alias: String,
    pub uri: String,
}

/// A source or target document declared by the mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub id: String,
    pub data_source_type: DataSourceType,
    pub format: DocumentFormat,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<NamespaceDeclaration>,
}

impl DataSource {
    pub fn source(id: impl Into<String>, format: DocumentFormat) -> Self {
        Self {
            id: id.into(),
            data_source_type: DataSourceType::Source,
            format,
            namespaces: Vec::new(),
        }
    }

    pub fn target(id: impl Into<String>, format: DocumentFormat) -> Self {
        Self {
            data_source_type: DataSourceType::Target,
            ..Self::source(id, format)
        }
    }

    pub fn with_namespace(mut self, alias: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.push(NamespaceDeclaration {
            alias: alias.into(),
            uri: uri.into(),
        });
        self
    }

    /// Declared namespaces as a lookup table
    pub fn namespace_table(&self) -> NamespaceTable {
        self.namespaces
            .iter()
            .map(|ns| (ns.uri.clone(), ns.alias.clone()))
            .collect()
    }
}

/// How a mapping entry relates its input and output fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MappingType {
    /// One input to one output
    #[default]
    Map,
    /// Many inputs joined into one output
    Combine,
    /// One input split across many outputs
    Separate,
    /// One input translated through a lookup table
    Lookup,
}

impl fmt::Display for MappingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingType::Map => write!(f, "MAP"),
            MappingType::Combine => write!(f, "COMBINE"),
            MappingType::Separate => write!(f, "SEPARATE"),
            MappingType::Lookup => write!(f, "LOOKUP"),
        }
    }
}

/// One declared transformation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub mapping_type: MappingType,
    #[serde(default)]
    pub input_fields: Vec<Field>,
    #[serde(default)]
    pub output_fields: Vec<Field>,
    /// COMBINE / SEPARATE delimiter, SPACE when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<StringDelimiter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup_table_name: Option<String>,
    /// Applied before each output field's own actions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<FieldAction>,
}

impl MappingEntry {
    pub fn new(mapping_type: MappingType) -> Self {
        Self {
            mapping_type,
            ..Default::default()
        }
    }

    /// Single-input, single-output MAP entry
    pub fn map(input: Field, output: Field) -> Self {
        Self {
            input_fields: vec![input],
            output_fields: vec![output],
            ..Self::new(MappingType::Map)
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_input(mut self, field: Field) -> Self {
        self.input_fields.push(field);
        self
    }

    pub fn with_output(mut self, field: Field) -> Self {
        self.output_fields.push(field);
        self
    }

    pub fn with_delimiter(mut self, delimiter: StringDelimiter) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_lookup_table(mut self, name: impl Into<String>) -> Self {
        self.lookup_table_name = Some(name.into());
        self
    }

    pub fn with_action(mut self, action: FieldAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Delimiter in effect for COMBINE / SEPARATE
    pub fn effective_delimiter(&self) -> StringDelimiter {
        self.delimiter.unwrap_or_default()
    }

    /// Identifier for audits: the id, else the alias
    pub fn label(&self) -> Option<&str> {
        self.id.as_deref().or(self.alias.as_deref())
    }
}

/// Delimiters for COMBINE and SEPARATE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StringDelimiter {
    #[default]
    Space,
    Ampersand,
    AtSign,
    Backslash,
    Colon,
    Comma,
    Dash,
    Equal,
    Hash,
    /// Any run of whitespace when splitting, one space when joining
    Multispace,
    Period,
    Pipe,
    Semicolon,
    Slash,
    Underscore,
}

impl StringDelimiter {
    /// Text placed between joined parts
    pub fn value(&self) -> &'static str {
        match self {
            StringDelimiter::Space | StringDelimiter::Multispace => " ",
            StringDelimiter::Ampersand => "&",
            StringDelimiter::AtSign => "@",
            StringDelimiter::Backslash => "\\",
            StringDelimiter::Colon => ":",
            StringDelimiter::Comma => ",",
            StringDelimiter::Dash => "-",
            StringDelimiter::Equal => "=",
            StringDelimiter::Hash => "#",
            StringDelimiter::Period => ".",
            StringDelimiter::Pipe => "|",
            StringDelimiter::Semicolon => ";",
            StringDelimiter::Slash => "/",
            StringDelimiter::Underscore => "_",
        }
    }

    /// Split `text` into parts; empty parts between adjacent delimiters are kept
    pub fn split(&self, text: &str) -> Vec<String> {
        match self {
            StringDelimiter::Multispace => text.split_whitespace().map(str::to_string).collect(),
            other => text.split(other.value()).map(str::to_string).collect(),
        }
    }

    pub fn join<S: AsRef<str>>(&self, parts: &[S]) -> String {
        parts
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join(self.value())
    }
}

/// A named value translation table
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupTable {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub entries: Vec<LookupEntry>,
}

impl LookupTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_entry(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.entries.push(LookupEntry {
            source_value: source.into(),
            target_value: target.into(),
            target_type: None,
        });
        self
    }

    /// First entry whose source value equals `source`
    pub fn lookup(&self, source: &str) -> Option<&LookupEntry> {
        self.entries.iter().find(|e| e.source_value == source)
    }
}

/// One row of a lookup table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupEntry {
    pub source_value: String,
    pub target_value: String,
    /// Type of the target value; STRING when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<FieldType>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_delimiters() {
        assert_eq!(StringDelimiter::Comma.split("a,,b"), vec!["a", "", "b"]);
        assert_eq!(StringDelimiter::Multispace.split("  a \t b "), vec!["a", "b"]);
        assert_eq!(StringDelimiter::AtSign.join(&["x", "y"]), "x@y");
        assert_eq!(StringDelimiter::default(), StringDelimiter::Space);
    }

    #[test]
    fn test_delimiter_names() {
        let parsed: StringDelimiter = serde_json::from_str("\"AT_SIGN\"").unwrap();
        assert_eq!(parsed, StringDelimiter::AtSign);
        assert_eq!(serde_json::to_string(&StringDelimiter::Multispace).unwrap(), "\"MULTISPACE\"");
    }

    #[test]
    fn test_namespace_table() {
        let ds = DataSource::source("in", DocumentFormat::Xml)
            .with_namespace("o", "urn:orders")
            .with_namespace("", "urn:default");
        let table = ds.namespace_table();
        assert_eq!(table.uri_for_prefix("o"), Some("urn:orders"));
        assert_eq!(table.default_namespace(), Some("urn:default"));
    }

    #[test]
    fn test_lookup() {
        let table = LookupTable::new("colors").with_entry("R", "Red").with_entry("G", "Green");
        assert_eq!(table.lookup("G").map(|e| e.target_value.as_str()), Some("Green"));
        assert!(table.lookup("B").is_none());
    }

    #[test]
    fn test_entry_label() {
        let mut entry = MappingEntry::new(MappingType::Map);
        assert_eq!(entry.label(), None);
        entry.alias = Some("alias".into());
        assert_eq!(entry.label(), Some("alias"));
        assert_eq!(entry.with_id("m1").label(), Some("m1"));
    }
}
