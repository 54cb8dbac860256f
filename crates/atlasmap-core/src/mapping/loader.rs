//! Mapping definition loading
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

use super::model::AtlasMapping;
use crate::config::DefinitionFormat;
use crate::error::{Error, Result};
use log::debug;
use std::path::Path;

/// Parse a mapping definition from text
///
/// Field paths are parsed while deserializing, so a malformed path fails
/// the load.
pub fn load_mapping_from_str(text: &str, format: DefinitionFormat) -> Result<AtlasMapping> {
    let mapping: AtlasMapping = format.parse(text)?;
    debug!(
        "Loaded mapping '{}' with {} entries and {} data sources",
        mapping.name,
        mapping.mappings.len(),
        mapping.data_sources.len()
    );
    Ok(mapping)
}

/// Parse a mapping definition from UTF-8 bytes
pub fn load_mapping_from_bytes(bytes: &[u8], format: DefinitionFormat) -> Result<AtlasMapping> {
    let text = std::str::from_utf8(bytes).map_err(|e| Error::Configuration {
        message: format!("Mapping definition is not valid UTF-8: {}", e),
        source: Some(e.into()),
    })?;
    load_mapping_from_str(text, format)
}

/// Load a mapping definition from a `.json`, `.yaml` or `.yml` file
pub fn load_mapping_from_file(path: impl AsRef<Path>) -> Result<AtlasMapping> {
    let path = path.as_ref();
    let format = DefinitionFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    load_mapping_from_bytes(&bytes, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{DataSourceType, MappingType, StringDelimiter};
    use crate::types::{DocumentFormat, FieldKind, FieldType, FieldValue};
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const JSON: &str = r#"{
        "name": "orders",
        "dataSources": [
            {"id": "in", "dataSourceType": "SOURCE", "format": "json"},
            {"id": "out", "dataSourceType": "TARGET", "format": "xml",
             "namespaces": [{"alias": "o", "uri": "urn:orders"}]}
        ],
        "mappings": [
            {
                "id": "m1",
                "mappingType": "COMBINE",
                "delimiter": "COMMA",
                "inputFields": [
                    {"path": "/first", "docId": "in", "index": 0},
                    {"kind": "constant", "value": "x", "index": 1}
                ],
                "outputFields": [
                    {"path": "/o:order/o:name", "docId": "out", "fieldType": "STRING",
                     "actions": [{"name": "Uppercase"}]}
                ]
            }
        ],
        "properties": {"region": "EU"}
    }"#;

    #[test]
    fn test_load_json() {
        let mapping = load_mapping_from_str(JSON, DefinitionFormat::Json).unwrap();
        assert_eq!(mapping.name, "orders");
        assert_eq!(mapping.data_sources[1].data_source_type, DataSourceType::Target);
        assert_eq!(mapping.data_sources[1].format, DocumentFormat::Xml);

        let entry = &mapping.mappings[0];
        assert_eq!(entry.mapping_type, MappingType::Combine);
        assert_eq!(entry.effective_delimiter(), StringDelimiter::Comma);
        assert_eq!(entry.input_fields[0].path.to_string(), "/first");
        assert_eq!(entry.input_fields[1].kind, FieldKind::Constant);
        assert_eq!(entry.input_fields[1].value, Some(FieldValue::String("x".into())));
        assert_eq!(entry.output_fields[0].field_type, Some(FieldType::String));
        assert_eq!(entry.output_fields[0].path.segments()[1].prefix.as_deref(), Some("o"));
        assert_eq!(mapping.properties["region"], FieldValue::String("EU".into()));
    }

    #[test]
    fn test_load_yaml() {
        let yaml = r#"
name: simple
dataSources:
  - id: in
    dataSourceType: SOURCE
    format: object
mappings:
  - inputFields:
      - path: /a
    outputFields:
      - path: /b
"#;
        let mapping = load_mapping_from_str(yaml, DefinitionFormat::Yaml).unwrap();
        assert_eq!(mapping.mappings[0].mapping_type, MappingType::Map);
        assert_eq!(mapping.mappings[0].output_fields[0].path.to_string(), "/b");
    }

    #[test]
    fn test_malformed_path_fails_load() {
        let text = r#"{"name": "bad", "mappings": [{"inputFields": [{"path": "/a//b"}]}]}"#;
        assert!(load_mapping_from_str(text, DefinitionFormat::Json).is_err());
    }

    #[test]
    fn test_invalid_utf8() {
        let err = load_mapping_from_bytes(&[0xff, 0xfe], DefinitionFormat::Json).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(JSON.as_bytes()).unwrap();
        let mapping = load_mapping_from_file(file.path()).unwrap();
        assert_eq!(mapping.mappings.len(), 1);

        let other = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        assert!(load_mapping_from_file(other.path()).is_err());
    }
}
