//! Input pass: resolve the values of an entry's input fields
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

use super::context::AtlasContext;
use super::session::resolve_property;
use crate::audit::Audits;
use crate::document::FieldReader;
use crate::error::{Error, Result};
use crate::mapping::{DataSourceType, MappingEntry};
use crate::types::{Document, DocumentFormat, Field, FieldKind, FieldType, FieldValue};
use indexmap::IndexMap;
use log::{debug, error, warn};
use std::collections::HashMap;
use std::ops::ControlFlow;

/// Reader cache key of the session's default input
const DEFAULT_INPUT: &str = "";

/// Reads input fields for one pass, creating each document's reader once
pub(crate) struct InputPass<'p> {
    context: &'p AtlasContext,
    inputs: &'p IndexMap<String, Document>,
    default_input: Option<&'p Document>,
    properties: &'p IndexMap<String, FieldValue>,
    readers: HashMap<String, Box<dyn FieldReader>>,
}

impl<'p> InputPass<'p> {
    pub(crate) fn new(
        context: &'p AtlasContext,
        inputs: &'p IndexMap<String, Document>,
        default_input: Option<&'p Document>,
        properties: &'p IndexMap<String, FieldValue>,
    ) -> Self {
        Self {
            context,
            inputs,
            default_input,
            properties,
            readers: HashMap::new(),
        }
    }

    /// Resolve every input field of `entry`
    ///
    /// Breaks with a structural error when the entry has no input fields or
    /// one of them is unsupported, whether declared so or detected on read;
    /// the caller stops the pass.
    pub(crate) fn process(
        &mut self,
        entry: &MappingEntry,
        audits: &mut Audits,
    ) -> Result<ControlFlow<Error, Vec<Field>>> {
        if entry.input_fields.is_empty() {
            let message = format!(
                "Mapping does not contain at least one input field alias={} desc={}",
                entry.alias.as_deref().unwrap_or("null"),
                entry.description.as_deref().unwrap_or("null")
            );
            warn!("{}", message);
            audits.warn(None, "", message.clone());
            return Ok(ControlFlow::Break(Error::structural(message, entry.label())));
        }

        let mut fields = Vec::with_capacity(entry.input_fields.len());
        for declared in &entry.input_fields {
            let field = match declared.kind {
                FieldKind::Constant => constant(declared),
                FieldKind::Property => self.property(declared, audits),
                FieldKind::Document => match self.document_field(declared, audits)? {
                    Some(field) => field,
                    None => {
                        return Ok(ControlFlow::Break(unsupported(entry, declared, audits)))
                    }
                },
            };
            if field.value.is_some() && field.field_type == Some(FieldType::Unsupported) {
                return Ok(ControlFlow::Break(unsupported(entry, &field, audits)));
            }
            debug!(
                "Processed input field p={} v={:?} t={:?} docId={:?}",
                field.path, field.value, field.field_type, field.doc_id
            );
            fields.push(field);
        }
        Ok(ControlFlow::Continue(fields))
    }

    fn property(&self, declared: &Field, audits: &mut Audits) -> Field {
        let mut field = declared.clone();
        let name = declared.name.as_deref().unwrap_or_default();
        match resolve_property(self.properties, &self.context.mapping().properties, name) {
            Some(value) => {
                field.field_type = Some(value.field_type());
                field.value = Some(value.clone());
            }
            None => {
                let message = format!("Property '{}' is not set", name);
                warn!("{}", message);
                audits.warn(None, name, message);
                field.value = None;
                field.field_type = Some(FieldType::None);
            }
        }
        field
    }

    /// Read a document field; `None` when the declared field is unsupported
    fn document_field(&mut self, declared: &Field, audits: &mut Audits) -> Result<Option<Field>> {
        let doc_id = declared.doc_id.as_deref();
        let (key, document) = match self.resolve_input(declared) {
            Some(found) => found,
            None => {
                let message = format!("No input document for docId {:?}", doc_id);
                error!("{}", message);
                audits.error(doc_id, declared.path.as_str(), message.clone());
                return Err(Error::document_access(doc_id, message));
            }
        };
        let format = self.source_format(&key, doc_id)?;
        let module = self.context.module(format)?;

        if !module.is_supported_field(declared) {
            return Ok(None);
        }

        if !self.readers.contains_key(&key) {
            let namespaces = self
                .context
                .mapping()
                .data_source(&key)
                .map(|ds| ds.namespace_table())
                .unwrap_or_default();
            let reader = module.create_reader(&key, document, &namespaces)?;
            debug!("Created {} reader for input '{}'", format, key);
            self.readers.insert(key.clone(), reader);
        }
        let reader = self
            .readers
            .get_mut(&key)
            .ok_or_else(|| Error::document_access(doc_id, "input reader is not available"))?;

        let mut field = module.clone_field(declared);
        reader.read(&mut field, audits)?;
        if field.field_type.is_none() {
            warn!(
                "Field type detection was unsuccessful for p={}, falling back to UNSUPPORTED",
                field.path
            );
            field.field_type = Some(FieldType::Unsupported);
        }
        Ok(Some(field))
    }

    /// Input document for a field: its own docId, else the default input,
    /// else the only registered input
    fn resolve_input(&self, field: &Field) -> Option<(String, &'p Document)> {
        if let Some(doc_id) = field.doc_id.as_deref() {
            if let Some(document) = self.inputs.get(doc_id) {
                return Some((doc_id.to_string(), document));
            }
        }
        if let Some(document) = self.default_input {
            return Some((DEFAULT_INPUT.to_string(), document));
        }
        if field.doc_id.is_none() && self.inputs.len() == 1 {
            return self
                .inputs
                .first()
                .map(|(doc_id, document)| (doc_id.clone(), document));
        }
        None
    }

    /// Format of an input: its declared source data source, else the only one
    fn source_format(&self, key: &str, doc_id: Option<&str>) -> Result<DocumentFormat> {
        let mapping = self.context.mapping();
        if let Some(ds) = mapping.data_source(key) {
            if ds.data_source_type == DataSourceType::Source {
                return Ok(ds.format);
            }
        }
        let mut sources = mapping.sources();
        match (sources.next(), sources.next()) {
            (Some(ds), None) => Ok(ds.format),
            _ => Err(Error::document_access(
                doc_id,
                format!("cannot determine the format of input '{}'", key),
            )),
        }
    }
}

/// Audit an unsupported input field and build the error stopping the pass
fn unsupported(entry: &MappingEntry, field: &Field, audits: &mut Audits) -> Error {
    let message = format!("Unsupported input field type={}", field.effective_type());
    error!("{} p={}", message, field.path);
    audits.error(field.doc_id.as_deref(), field.path.as_str(), message.clone());
    Error::structural(message, entry.label())
}

fn constant(declared: &Field) -> Field {
    let mut field = declared.clone();
    if field.field_type.is_none() {
        field.field_type = field.value.as_ref().map(FieldValue::field_type);
    }
    field
}
