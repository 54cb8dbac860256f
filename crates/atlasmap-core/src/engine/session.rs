//! Per-pass mapping session
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

use super::context::AtlasContext;
use super::input::InputPass;
use super::output::OutputPass;
use crate::audit::Audits;
use crate::error::{Error, Result};
use crate::path::FieldPath;
use crate::types::{Document, FieldValue};
use crate::validation::{has_errors, Validation};
use indexmap::IndexMap;
use log::{debug, error, info};
use std::ops::ControlFlow;

/// Documents, properties and results of mapping passes
///
/// A session owns everything a pass mutates: its input documents, property
/// overrides, the audit list and the produced output documents. Sessions
/// borrow their context and never share state with each other.
#[derive(Debug)]
pub struct AtlasSession<'a> {
    context: &'a AtlasContext,
    inputs: IndexMap<String, Document>,
    default_input: Option<Document>,
    properties: IndexMap<String, FieldValue>,
    audits: Audits,
    validations: Vec<Validation>,
    outputs: IndexMap<String, Document>,
}

impl<'a> AtlasSession<'a> {
    pub(crate) fn new(context: &'a AtlasContext) -> Self {
        Self {
            context,
            inputs: IndexMap::new(),
            default_input: None,
            properties: IndexMap::new(),
            audits: Audits::new(),
            validations: Vec::new(),
            outputs: IndexMap::new(),
        }
    }

    pub fn context(&self) -> &'a AtlasContext {
        self.context
    }

    /// Register the source document for `doc_id`
    pub fn set_input(&mut self, doc_id: impl Into<String>, document: impl Into<Document>) {
        self.inputs.insert(doc_id.into(), document.into());
    }

    /// Document read by fields without a registered `docId`
    pub fn set_default_input(&mut self, document: impl Into<Document>) {
        self.default_input = Some(document.into());
    }

    pub fn input(&self, doc_id: &str) -> Option<&Document> {
        self.inputs.get(doc_id)
    }

    pub fn has_input(&self, doc_id: &str) -> bool {
        self.inputs.contains_key(doc_id)
    }

    pub fn default_input(&self) -> Option<&Document> {
        self.default_input.as_ref()
    }

    /// Set a property, overriding a mapping-level property of the same name
    pub fn set_property(&mut self, name: impl Into<String>, value: FieldValue) {
        self.properties.insert(name.into(), value);
    }

    /// Property value, looked up in the session before the mapping
    pub fn property(&self, name: &str) -> Option<&FieldValue> {
        resolve_property(&self.properties, &self.context.mapping().properties, name)
    }

    pub fn audits(&self) -> &Audits {
        &self.audits
    }

    /// Notices of the last validation run
    pub fn validations(&self) -> &[Validation] {
        &self.validations
    }

    /// Output document produced for `doc_id` by the last pass
    pub fn output(&self, doc_id: &str) -> Option<&Document> {
        self.outputs.get(doc_id)
    }

    /// The output document when the mapping has exactly one target
    pub fn default_output(&self) -> Option<&Document> {
        match self.outputs.len() {
            1 => self.outputs.values().next(),
            _ => None,
        }
    }

    pub fn outputs(&self) -> &IndexMap<String, Document> {
        &self.outputs
    }

    /// Remove and return the output document for `doc_id`
    pub fn take_output(&mut self, doc_id: &str) -> Option<Document> {
        self.outputs.shift_remove(doc_id)
    }

    /// Occurrences addressed by the first collection segment of `path` in an input
    pub fn collection_size(&self, doc_id: &str, path: &FieldPath) -> Result<usize> {
        let document = self.inputs.get(doc_id).ok_or_else(|| {
            Error::document_access(Some(doc_id), "input document is not set")
        })?;
        let format = self
            .context
            .mapping()
            .data_source(doc_id)
            .map(|ds| ds.format)
            .ok_or_else(|| {
                Error::document_access(Some(doc_id), "no data source is declared for this document")
            })?;
        self.context.module(format)?.collection_size(document, path)
    }

    /// Run one mapping pass
    ///
    /// Audits and outputs of a previous pass are discarded first. Value-level
    /// failures become audits; a structural failure stops the pass but keeps
    /// what was already written. Missing or unparsable documents fail the
    /// whole pass with an error.
    pub fn process(&mut self) -> Result<()> {
        let context = self.context;
        let mapping = context.mapping();
        self.audits.clear();
        self.outputs.clear();
        self.validations.clear();
        info!("Processing mapping '{}'", mapping.name);

        if context.config().validate_mapping {
            self.validations = context.validate();
            for notice in &self.validations {
                self.audits.push(notice.to_audit());
            }
            if has_errors(&self.validations) {
                error!(
                    "Mapping '{}' failed validation, no documents were processed",
                    mapping.name
                );
                return Ok(());
            }
        }

        let mut inputs = InputPass::new(
            context,
            &self.inputs,
            self.default_input.as_ref(),
            &self.properties,
        );
        let mut outputs = OutputPass::new(context)?;

        for entry in &mapping.mappings {
            self.audits.enter_mapping(entry.label());
            debug!(
                "Processing {} entry {:?}",
                entry.mapping_type,
                entry.label()
            );

            let fields = match inputs.process(entry, &mut self.audits)? {
                ControlFlow::Continue(fields) => fields,
                ControlFlow::Break(stop) => {
                    error!("Stopping mapping '{}': {}", mapping.name, stop);
                    break;
                }
            };
            if let ControlFlow::Break(stop) = outputs.process(entry, &fields, &mut self.audits)? {
                error!("Stopping mapping '{}': {}", mapping.name, stop);
                break;
            }
        }
        self.audits.enter_mapping(None);

        self.outputs = outputs.finish()?;
        info!(
            "Processed mapping '{}': {} outputs, {} audits",
            mapping.name,
            self.outputs.len(),
            self.audits.len()
        );
        Ok(())
    }
}

pub(crate) fn resolve_property<'p>(
    session: &'p IndexMap<String, FieldValue>,
    mapping: &'p IndexMap<String, FieldValue>,
    name: &str,
) -> Option<&'p FieldValue> {
    session.get(name).or_else(|| mapping.get(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{AtlasMapping, DataSource};
    use crate::types::DocumentFormat;

    fn context() -> AtlasContext {
        let mut mapping = AtlasMapping::new("props");
        mapping.data_sources.push(DataSource::source("in", DocumentFormat::Json));
        mapping
            .properties
            .insert("region".to_string(), FieldValue::String("EU".into()));
        AtlasContext::new(mapping).unwrap()
    }

    #[test]
    fn test_session_properties_win() {
        let context = context();
        let mut session = context.create_session();
        assert_eq!(session.property("region"), Some(&FieldValue::String("EU".into())));
        session.set_property("region", FieldValue::String("US".into()));
        assert_eq!(session.property("region"), Some(&FieldValue::String("US".into())));
        assert_eq!(session.property("missing"), None);
    }

    #[test]
    fn test_inputs() {
        let context = context();
        let mut session = context.create_session();
        session.set_input("in", Document::text(r#"{"items": [1, 2, 3]}"#));
        assert!(session.has_input("in"));
        assert!(session.default_input().is_none());

        let path = FieldPath::parse("/items[]").unwrap();
        assert_eq!(session.collection_size("in", &path).unwrap(), 3);
        assert!(session.collection_size("other", &path).is_err());
    }

    #[test]
    fn test_empty_mapping_produces_no_outputs() {
        let context = context();
        let mut session = context.create_session();
        session.process().unwrap();
        assert!(session.outputs().is_empty());
        assert!(session.default_output().is_none());
        assert!(session.audits().has_warnings());
    }
}
