//! Mapping definition validator
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

use super::{Validation, ValidationScope};
use crate::conversion::{ConversionConcern, ConversionRegistry};
use crate::error::AuditStatus;
use crate::mapping::{AtlasMapping, DataSourceType, MappingEntry, MappingType};
use crate::types::{Field, FieldKind};
use log::debug;
use std::collections::HashSet;

/// Checks a mapping definition before it is processed
pub struct MappingValidator<'a> {
    mapping: &'a AtlasMapping,
    registry: &'a ConversionRegistry,
}

impl<'a> MappingValidator<'a> {
    pub fn new(mapping: &'a AtlasMapping, registry: &'a ConversionRegistry) -> Self {
        Self { mapping, registry }
    }

    /// Run every check, returning notices in definition order
    pub fn validate(&self) -> Vec<Validation> {
        let mut notices = Vec::new();

        self.validate_mapping(&mut notices);
        self.validate_data_sources(&mut notices);
        self.validate_lookup_tables(&mut notices);
        for entry in &self.mapping.mappings {
            self.validate_entry(entry, &mut notices);
        }

        debug!(
            "Validated mapping '{}': {} notices",
            self.mapping.name,
            notices.len()
        );
        notices
    }

    fn validate_mapping(&self, notices: &mut Vec<Validation>) {
        if self.mapping.name.trim().is_empty() {
            notices.push(Validation::new(
                ValidationScope::Mapping,
                None,
                "Mapping name must not be empty",
                AuditStatus::Warn,
            ));
        }
        if self.mapping.mappings.is_empty() {
            notices.push(Validation::new(
                ValidationScope::Mapping,
                None,
                "Mapping contains no mapping entries",
                AuditStatus::Warn,
            ));
        }
    }

    fn validate_data_sources(&self, notices: &mut Vec<Validation>) {
        let mut seen = HashSet::new();
        for ds in &self.mapping.data_sources {
            if !seen.insert(ds.id.as_str()) {
                notices.push(Validation::new(
                    ValidationScope::DataSource,
                    Some(&ds.id),
                    format!("Duplicate data source id '{}'", ds.id),
                    AuditStatus::Error,
                ));
            }
            for ns in &ds.namespaces {
                if ns.uri.is_empty() {
                    notices.push(Validation::new(
                        ValidationScope::DataSource,
                        Some(&ds.id),
                        format!("Namespace '{}' has an empty URI", ns.alias),
                        AuditStatus::Error,
                    ));
                }
            }
        }
    }

    fn validate_lookup_tables(&self, notices: &mut Vec<Validation>) {
        let mut names = HashSet::new();
        for table in &self.mapping.lookup_tables {
            if !names.insert(table.name.as_str()) {
                notices.push(Validation::new(
                    ValidationScope::LookupTable,
                    Some(&table.name),
                    format!("Duplicate lookup table '{}'", table.name),
                    AuditStatus::Error,
                ));
            }
            let mut sources = HashSet::new();
            for entry in &table.entries {
                if !sources.insert(entry.source_value.as_str()) {
                    notices.push(Validation::new(
                        ValidationScope::LookupTable,
                        Some(&table.name),
                        format!(
                            "Source value '{}' appears more than once, only the first entry is used",
                            entry.source_value
                        ),
                        AuditStatus::Warn,
                    ));
                }
            }
        }
    }

    fn validate_entry(&self, entry: &MappingEntry, notices: &mut Vec<Validation>) {
        let id = entry.label();
        let mut push = |message: String, status: AuditStatus| {
            notices.push(Validation::new(ValidationScope::Entry, id, message, status));
        };

        let inputs = entry.input_fields.len();
        let outputs = entry.output_fields.len();
        if inputs == 0 {
            push(
                format!("{} mapping entry has no input fields", entry.mapping_type),
                AuditStatus::Error,
            );
        }
        if outputs == 0 {
            push(
                format!("{} mapping entry has no output fields", entry.mapping_type),
                AuditStatus::Error,
            );
        }

        match entry.mapping_type {
            MappingType::Map | MappingType::Lookup | MappingType::Separate if inputs > 1 => push(
                format!(
                    "{} mapping entry must have exactly one input field, found {}",
                    entry.mapping_type, inputs
                ),
                AuditStatus::Error,
            ),
            _ => {}
        }
        match entry.mapping_type {
            MappingType::Combine if outputs > 1 => push(
                format!("COMBINE mapping entry must have exactly one output field, found {}", outputs),
                AuditStatus::Error,
            ),
            MappingType::Map | MappingType::Lookup if outputs > 1 => push(
                format!(
                    "{} mapping entry has {} output fields, only the first is written",
                    entry.mapping_type, outputs
                ),
                AuditStatus::Warn,
            ),
            _ => {}
        }

        if entry.mapping_type == MappingType::Lookup {
            match entry.lookup_table_name.as_deref() {
                None => push(
                    "LOOKUP mapping entry does not name a lookup table".to_string(),
                    AuditStatus::Error,
                ),
                Some(name) if self.mapping.lookup_table(name).is_none() => push(
                    format!("Lookup table '{}' is not defined", name),
                    AuditStatus::Error,
                ),
                Some(_) => {}
            }
        }

        for field in &entry.input_fields {
            for (message, status) in self.check_input(field) {
                push(message, status);
            }
        }
        for field in &entry.output_fields {
            for (message, status) in self.check_output(field) {
                push(message, status);
            }
        }

        if entry.mapping_type == MappingType::Map {
            if let (Some(input), Some(output)) = (entry.input_fields.first(), entry.output_fields.first()) {
                for (message, status) in self.check_conversion(input, output) {
                    push(message, status);
                }
            }
        }
    }

    fn check_input(&self, field: &Field) -> Vec<(String, AuditStatus)> {
        match field.kind {
            FieldKind::Constant if field.value.is_none() => vec![(
                "Constant input field has no value".to_string(),
                AuditStatus::Error,
            )],
            FieldKind::Property if field.name.is_none() => vec![(
                "Property input field has no name".to_string(),
                AuditStatus::Error,
            )],
            FieldKind::Document => self.check_doc_id(field, DataSourceType::Source),
            _ => Vec::new(),
        }
    }

    fn check_output(&self, field: &Field) -> Vec<(String, AuditStatus)> {
        if field.kind != FieldKind::Document {
            return vec![(
                format!("Output field '{}' must address a target document", field.path),
                AuditStatus::Error,
            )];
        }
        self.check_doc_id(field, DataSourceType::Target)
    }

    fn check_doc_id(&self, field: &Field, expected: DataSourceType) -> Vec<(String, AuditStatus)> {
        let doc_id = match field.doc_id.as_deref() {
            Some(doc_id) => doc_id,
            None => return Vec::new(),
        };
        match self.mapping.data_source(doc_id) {
            None => vec![(
                format!(
                    "Field '{}' refers to undeclared data source '{}'",
                    field.path, doc_id
                ),
                AuditStatus::Error,
            )],
            Some(ds) if ds.data_source_type != expected => vec![(
                format!(
                    "Field '{}' refers to {} data source '{}', expected {}",
                    field.path, ds.data_source_type, doc_id, expected
                ),
                AuditStatus::Error,
            )],
            Some(_) => Vec::new(),
        }
    }

    /// One notice per concern of the declared input to output conversion
    fn check_conversion(&self, input: &Field, output: &Field) -> Vec<(String, AuditStatus)> {
        let (source, target) = match (input.field_type, output.field_type) {
            (Some(source), Some(target)) => (source, target),
            _ => return Vec::new(),
        };
        self.registry
            .concerns(source, target)
            .into_iter()
            .filter_map(|concern| {
                let status = match concern {
                    ConversionConcern::None => return None,
                    ConversionConcern::Unsupported => AuditStatus::Error,
                    ConversionConcern::Range | ConversionConcern::Format => AuditStatus::Warn,
                    ConversionConcern::Convention => AuditStatus::Info,
                };
                Some((concern.describe(source, target), status))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{DataSource, LookupTable};
    use crate::types::{DocumentFormat, FieldType, FieldValue};
    use crate::validation::has_errors;
    use pretty_assertions::assert_eq;

    fn registry() -> ConversionRegistry {
        ConversionRegistry::with_defaults().unwrap()
    }

    fn base() -> AtlasMapping {
        let mut mapping = AtlasMapping::new("test");
        mapping.data_sources = vec![
            DataSource::source("in", DocumentFormat::Json),
            DataSource::target("out", DocumentFormat::Json),
        ];
        mapping
    }

    fn typed(path: &str, doc_id: &str, field_type: FieldType) -> Field {
        Field::at(path).unwrap().with_doc_id(doc_id).with_type(field_type)
    }

    fn messages(notices: &[Validation]) -> Vec<(AuditStatus, &str)> {
        notices.iter().map(|n| (n.status, n.message.as_str())).collect()
    }

    #[test]
    fn test_valid_mapping_has_no_notices() {
        let mut mapping = base();
        mapping.mappings.push(
            MappingEntry::map(
                typed("/a", "in", FieldType::Integer),
                typed("/b", "out", FieldType::Long),
            )
            .with_id("m1"),
        );
        let notices = MappingValidator::new(&mapping, &registry()).validate();
        assert_eq!(notices, Vec::new());
    }

    #[test]
    fn test_conversion_concerns() {
        let mut mapping = base();
        mapping.mappings.push(
            MappingEntry::map(
                typed("/a", "in", FieldType::Double),
                typed("/b", "out", FieldType::Byte),
            )
            .with_id("narrow"),
        );
        mapping.mappings.push(
            MappingEntry::map(
                typed("/a", "in", FieldType::Complex),
                typed("/b", "out", FieldType::Integer),
            )
            .with_id("complex"),
        );
        let notices = MappingValidator::new(&mapping, &registry()).validate();

        let narrow: Vec<_> = notices.iter().filter(|n| n.id.as_deref() == Some("narrow")).collect();
        assert!(narrow.iter().all(|n| n.status == AuditStatus::Warn));
        assert!(narrow
            .iter()
            .any(|n| n.message == "Conversion from 'DOUBLE' to 'BYTE' can cause out of range exceptions"));

        let complex: Vec<_> = notices.iter().filter(|n| n.id.as_deref() == Some("complex")).collect();
        assert_eq!(complex.len(), 1);
        assert_eq!(complex[0].status, AuditStatus::Error);
        assert_eq!(complex[0].message, "Conversions from 'COMPLEX' to 'INTEGER' is not supported");
    }

    #[test]
    fn test_structural_checks() {
        let mut mapping = base();
        mapping.mappings.push(MappingEntry::new(MappingType::Map).with_id("empty"));
        mapping.mappings.push(
            MappingEntry::new(MappingType::Combine)
                .with_id("combine")
                .with_input(Field::at("/a").unwrap())
                .with_output(Field::at("/x").unwrap())
                .with_output(Field::at("/y").unwrap()),
        );
        let notices = MappingValidator::new(&mapping, &registry()).validate();

        assert_eq!(
            messages(&notices),
            vec![
                (AuditStatus::Error, "MAP mapping entry has no input fields"),
                (AuditStatus::Error, "MAP mapping entry has no output fields"),
                (
                    AuditStatus::Error,
                    "COMBINE mapping entry must have exactly one output field, found 2"
                ),
            ]
        );
        assert!(has_errors(&notices));
    }

    #[test]
    fn test_lookup_table_must_exist() {
        let mut mapping = base();
        mapping.lookup_tables.push(LookupTable::new("colors").with_entry("R", "Red"));
        let entry = |table: &str| {
            MappingEntry::new(MappingType::Lookup)
                .with_input(Field::at("/c").unwrap())
                .with_output(Field::at("/d").unwrap())
                .with_lookup_table(table)
        };
        mapping.mappings.push(entry("colors"));
        mapping.mappings.push(entry("sizes").with_id("bad"));

        let notices = MappingValidator::new(&mapping, &registry()).validate();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].id.as_deref(), Some("bad"));
        assert_eq!(notices[0].message, "Lookup table 'sizes' is not defined");
    }

    #[test]
    fn test_doc_id_direction() {
        let mut mapping = base();
        mapping.mappings.push(MappingEntry::map(
            Field::at("/a").unwrap().with_doc_id("out"),
            Field::at("/b").unwrap().with_doc_id("nowhere"),
        ));
        let notices = MappingValidator::new(&mapping, &registry()).validate();
        assert_eq!(
            messages(&notices),
            vec![
                (
                    AuditStatus::Error,
                    "Field '/a' refers to TARGET data source 'out', expected SOURCE"
                ),
                (
                    AuditStatus::Error,
                    "Field '/b' refers to undeclared data source 'nowhere'"
                ),
            ]
        );
    }

    #[test]
    fn test_field_kinds() {
        let mut mapping = base();
        let mut constant = Field::constant(FieldValue::Integer(1));
        constant.value = None;
        mapping.mappings.push(
            MappingEntry::new(MappingType::Combine)
                .with_input(constant)
                .with_input(Field::property("region"))
                .with_output(Field::property("nope")),
        );
        let notices = MappingValidator::new(&mapping, &registry()).validate();
        assert_eq!(
            messages(&notices),
            vec![
                (AuditStatus::Error, "Constant input field has no value"),
                (AuditStatus::Error, "Output field '' must address a target document"),
            ]
        );
    }

    #[test]
    fn test_mapping_level_notices() {
        let mut mapping = AtlasMapping::new("");
        mapping.data_sources = vec![
            DataSource::source("dup", DocumentFormat::Json),
            DataSource::target("dup", DocumentFormat::Xml),
        ];
        mapping.lookup_tables.push(
            LookupTable::new("t")
                .with_entry("a", "1")
                .with_entry("a", "2"),
        );
        let notices = MappingValidator::new(&mapping, &registry()).validate();
        assert_eq!(
            messages(&notices),
            vec![
                (AuditStatus::Warn, "Mapping name must not be empty"),
                (AuditStatus::Warn, "Mapping contains no mapping entries"),
                (AuditStatus::Error, "Duplicate data source id 'dup'"),
                (
                    AuditStatus::Warn,
                    "Source value 'a' appears more than once, only the first entry is used"
                ),
            ]
        );
    }
}
