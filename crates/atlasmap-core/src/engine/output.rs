//! Output pass: turn resolved inputs into written output fields
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

use super::context::AtlasContext;
use super::strategies;
use crate::actions::ActionProcessor;
use crate::audit::{Audit, Audits};
use crate::document::{FieldWriter, FormatModule};
use crate::error::{AuditStatus, Error, Result};
use crate::mapping::{MappingEntry, MappingType};
use crate::types::{Document, Field, FieldKind, FieldType, FieldValue};
use indexmap::IndexMap;
use log::{debug, error, warn};
use std::ops::ControlFlow;
use std::sync::Arc;

struct Target {
    module: Arc<dyn FormatModule>,
    writer: Box<dyn FieldWriter>,
}

/// Writes output fields into one writer per declared target
pub(crate) struct OutputPass<'p> {
    context: &'p AtlasContext,
    targets: IndexMap<String, Target>,
    actions: ActionProcessor,
}

impl<'p> OutputPass<'p> {
    /// Create a writer for every target data source of the mapping
    pub(crate) fn new(context: &'p AtlasContext) -> Result<Self> {
        let mut targets = IndexMap::new();
        for ds in context.mapping().targets() {
            let module = context.module(ds.format)?;
            let writer = module.create_writer(&ds.id, &ds.namespace_table(), context.config())?;
            debug!("Created {} writer for target '{}'", ds.format, ds.id);
            targets.insert(ds.id.clone(), Target { module, writer });
        }
        Ok(Self {
            context,
            targets,
            actions: ActionProcessor::new(),
        })
    }

    /// Serialize every target document
    pub(crate) fn finish(self) -> Result<IndexMap<String, Document>> {
        self.targets
            .into_iter()
            .map(|(doc_id, target)| target.writer.document().map(|document| (doc_id, document)))
            .collect()
    }

    /// Produce and write the outputs of `entry`
    ///
    /// Breaks with a structural error on problems with the output fields;
    /// value-level failures, failed writes included, are audited and only
    /// skip the affected output.
    pub(crate) fn process(
        &mut self,
        entry: &MappingEntry,
        inputs: &[Field],
        audits: &mut Audits,
    ) -> Result<ControlFlow<Error>> {
        if entry.output_fields.is_empty() {
            let message = format!(
                "Mapping does not contain at least one output field alias={} desc={}",
                entry.alias.as_deref().unwrap_or("null"),
                entry.description.as_deref().unwrap_or("null")
            );
            error!("{}", message);
            audits.error(None, "", message.clone());
            return Ok(ControlFlow::Break(Error::structural(message, entry.label())));
        }
        for output in &entry.output_fields {
            if !self.is_supported(output)? {
                let message = format!(
                    "Unsupported output field kind={:?} type={}",
                    output.kind,
                    output.effective_type()
                );
                error!("{} p={}", message, output.path);
                audits.error(output.doc_id.as_deref(), output.path.as_str(), message.clone());
                return Ok(ControlFlow::Break(Error::structural(message, entry.label())));
            }
        }

        match entry.mapping_type {
            MappingType::Map => self.map(entry, inputs, audits)?,
            MappingType::Combine => self.combine(entry, inputs, audits)?,
            MappingType::Separate => self.separate(entry, inputs, audits)?,
            MappingType::Lookup => self.lookup(entry, inputs, audits)?,
        }
        Ok(ControlFlow::Continue(()))
    }

    fn map(&mut self, entry: &MappingEntry, inputs: &[Field], audits: &mut Audits) -> Result<()> {
        let (input, declared) = match (inputs.first(), entry.output_fields.first()) {
            (Some(input), Some(output)) => (input, output),
            _ => return Ok(()),
        };
        let value = match &input.value {
            Some(value) => value,
            None => {
                debug!("Skipping MAP to {}: input {} has no value", declared.path, input.path);
                return Ok(());
            }
        };
        self.emit(entry, declared, value.clone(), audits)
    }

    fn combine(&mut self, entry: &MappingEntry, inputs: &[Field], audits: &mut Audits) -> Result<()> {
        let declared = match entry.output_fields.first() {
            Some(output) => output,
            None => return Ok(()),
        };
        let context = self.context;
        let max_index = context.config().max_collection_index;
        let delimiter = entry.effective_delimiter();
        match strategies::combine(context.conversions(), inputs, delimiter, max_index) {
            Ok(Some(text)) => self.emit(entry, declared, FieldValue::String(text), audits),
            Ok(None) => {
                debug!("Skipping COMBINE to {}: no input has a value", declared.path);
                Ok(())
            }
            Err(e) => {
                value_failure(audits, declared, None, format!("Unable to combine input values: {}", e));
                Ok(())
            }
        }
    }

    fn separate(&mut self, entry: &MappingEntry, inputs: &[Field], audits: &mut Audits) -> Result<()> {
        let value = match inputs.first().and_then(|input| input.value.as_ref()) {
            Some(value) => value,
            None => return Ok(()),
        };
        let text = match strategies::text_of(self.context.conversions(), value) {
            Ok(text) => text,
            Err(e) => {
                for declared in &entry.output_fields {
                    value_failure(audits, declared, Some(value), format!("Unable to separate value: {}", e));
                }
                return Ok(());
            }
        };

        let parts = strategies::separate(&text, entry.effective_delimiter());
        for (position, declared) in entry.output_fields.iter().enumerate() {
            let index = declared.index.unwrap_or(position);
            match parts.get(index) {
                Some(part) => self.emit(entry, declared, FieldValue::String(part.clone()), audits)?,
                None => debug!(
                    "Skipping SEPARATE output {}: no part at index {} of {}",
                    declared.path,
                    index,
                    parts.len()
                ),
            }
        }
        Ok(())
    }

    fn lookup(&mut self, entry: &MappingEntry, inputs: &[Field], audits: &mut Audits) -> Result<()> {
        let declared = match entry.output_fields.first() {
            Some(output) => output,
            None => return Ok(()),
        };
        let value = match inputs.first().and_then(|input| input.value.as_ref()) {
            Some(value) => value,
            None => return Ok(()),
        };
        let context = self.context;
        let registry = context.conversions();
        let name = entry.lookup_table_name.as_deref().unwrap_or_default();
        let table = match context.mapping().lookup_table(name) {
            Some(table) => table,
            None => {
                value_failure(audits, declared, None, format!("Lookup table '{}' is not defined", name));
                return Ok(());
            }
        };
        let source = match strategies::text_of(registry, value) {
            Ok(source) => source,
            Err(e) => {
                value_failure(audits, declared, Some(value), format!("Unable to look up value: {}", e));
                return Ok(());
            }
        };
        let found = match strategies::lookup(table, &source) {
            Some(found) => found,
            None => {
                let message = format!("No entry for '{}' in lookup table '{}'", source, name);
                warn!("{}", message);
                audits.push(
                    Audit::new(AuditStatus::Warn, message)
                        .with_doc_id(declared.doc_id.as_deref())
                        .with_path(declared.path.as_str())
                        .with_value(&source),
                );
                return Ok(());
            }
        };
        match strategies::lookup_value(registry, found) {
            Ok(target) => self.emit(entry, declared, target, audits),
            Err(e) => {
                value_failure(audits, declared, Some(value), format!("Unable to type lookup value: {}", e));
                Ok(())
            }
        }
    }

    /// Convert, apply actions and write one output value
    ///
    /// The output type is inferred from the value when undeclared; equal
    /// types copy the value as is. Failures, a rejected write included, are
    /// audited and skip the output; what was written before stays.
    fn emit(
        &mut self,
        entry: &MappingEntry,
        declared: &Field,
        value: FieldValue,
        audits: &mut Audits,
    ) -> Result<()> {
        let target_type = declared.field_type.unwrap_or_else(|| value.field_type());
        let converted = if value.field_type() == target_type {
            value
        } else {
            match self.context.conversions().convert_value(&value, target_type) {
                Ok(converted) => converted,
                Err(e) => {
                    value_failure(
                        audits,
                        declared,
                        Some(&value),
                        format!(
                            "Unable to auto-convert for iT={} oT={} oF={} msg={}",
                            value.field_type(),
                            target_type,
                            declared.path,
                            e
                        ),
                    );
                    return Ok(());
                }
            }
        };

        let actions = entry.actions.iter().chain(declared.actions.iter());
        let result = match self.actions.process(actions, converted) {
            Ok(result) => result,
            Err(e) => {
                value_failure(audits, declared, None, format!("Field action failed: {}", e));
                return Ok(());
            }
        };

        let mut output = declared.clone();
        output.field_type = Some(result.field_type());
        output.value = Some(result);
        if let Err(e) = self.write(&output) {
            let message = format!("Unable to write output field: {}", e);
            value_failure(audits, declared, output.value.as_ref(), message);
        }
        Ok(())
    }

    fn write(&mut self, field: &Field) -> Result<()> {
        let doc_id = self.target_id(field)?;
        let target = self
            .targets
            .get_mut(&doc_id)
            .ok_or_else(|| Error::document_access(Some(&doc_id), "target writer is not available"))?;
        debug!(
            "Writing output field p={} v={:?} t={:?} docId={}",
            field.path, field.value, field.field_type, doc_id
        );
        target.writer.write(field)
    }

    /// Target of an output field: its own docId, else the only target
    fn target_id(&self, field: &Field) -> Result<String> {
        if let Some(doc_id) = field.doc_id.as_deref() {
            if self.targets.contains_key(doc_id) {
                return Ok(doc_id.to_string());
            }
        }
        match self.targets.len() {
            1 => self
                .targets
                .keys()
                .next()
                .cloned()
                .ok_or_else(|| Error::document_access(None, "no target document")),
            _ => Err(Error::document_access(
                field.doc_id.as_deref(),
                format!("no target document for output field '{}'", field.path),
            )),
        }
    }

    fn is_supported(&self, field: &Field) -> Result<bool> {
        if field.kind != FieldKind::Document || field.field_type == Some(FieldType::Unsupported) {
            return Ok(false);
        }
        let doc_id = self.target_id(field)?;
        Ok(self
            .targets
            .get(&doc_id)
            .map(|target| target.module.is_supported_field(field))
            .unwrap_or(false))
    }
}

/// Audit a value-level failure for `field`
fn value_failure(audits: &mut Audits, field: &Field, value: Option<&FieldValue>, message: String) {
    warn!("{}", message);
    let mut audit = Audit::new(AuditStatus::Error, message)
        .with_doc_id(field.doc_id.as_deref())
        .with_path(field.path.as_str());
    if let Some(value) = value {
        audit = audit.with_value(value);
    }
    audits.push(audit);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::FieldAction;
    use crate::mapping::{AtlasMapping, DataSource, LookupTable, StringDelimiter};
    use crate::types::DocumentFormat;
    use pretty_assertions::assert_eq;

    fn context() -> AtlasContext {
        let mut mapping = AtlasMapping::new("outputs");
        mapping.data_sources = vec![DataSource::target("out", DocumentFormat::Json)];
        mapping
            .lookup_tables
            .push(LookupTable::new("colors").with_entry("R", "Red"));
        AtlasContext::new(mapping).unwrap()
    }

    fn valued(value: FieldValue) -> Field {
        Field::default().with_value(value)
    }

    fn out(path: &str) -> Field {
        Field::at(path).unwrap()
    }

    fn output_of(pass: OutputPass<'_>) -> String {
        let outputs = pass.finish().unwrap();
        outputs["out"].as_text().unwrap().to_string()
    }

    #[test]
    fn test_map_converts_and_applies_actions() {
        let context = context();
        let mut pass = OutputPass::new(&context).unwrap();
        let mut audits = Audits::new();

        let entry = MappingEntry::map(Field::default(), out("/n").with_type(FieldType::Long));
        pass.process(&entry, &[valued(FieldValue::Integer(7))], &mut audits).unwrap();

        let entry = MappingEntry::map(Field::default(), out("/s").with_action(FieldAction::Uppercase));
        pass.process(&entry, &[valued(FieldValue::String("ab".into()))], &mut audits).unwrap();

        assert!(audits.is_empty());
        assert_eq!(output_of(pass), r#"{"n":7,"s":"AB"}"#);
    }

    #[test]
    fn test_map_conversion_failure_skips_entry() {
        let context = context();
        let mut pass = OutputPass::new(&context).unwrap();
        let mut audits = Audits::new();

        let entry = MappingEntry::map(Field::default(), out("/b").with_type(FieldType::Byte));
        let flow = pass
            .process(&entry, &[valued(FieldValue::Double(300.0))], &mut audits)
            .unwrap();

        assert!(flow.is_continue());
        assert_eq!(audits.len(), 1);
        assert_eq!(audits.records()[0].status, AuditStatus::Error);
        assert_eq!(audits.records()[0].value.as_deref(), Some("300.0"));
        assert_eq!(output_of(pass), "{}");
    }

    #[test]
    fn test_map_skips_null_input() {
        let context = context();
        let mut pass = OutputPass::new(&context).unwrap();
        let mut audits = Audits::new();
        let entry = MappingEntry::map(Field::default(), out("/x"));
        pass.process(&entry, &[Field::default()], &mut audits).unwrap();
        assert!(audits.is_empty());
        assert_eq!(output_of(pass), "{}");
    }

    #[test]
    fn test_combine_separate_lookup() {
        let context = context();
        let mut pass = OutputPass::new(&context).unwrap();
        let mut audits = Audits::new();

        let combine = MappingEntry::new(MappingType::Combine)
            .with_output(out("/full"))
            .with_delimiter(StringDelimiter::Space);
        let names = [
            valued(FieldValue::String("Ann".into())),
            valued(FieldValue::String("Lee".into())),
        ];
        pass.process(&combine, &names, &mut audits).unwrap();

        let separate = MappingEntry::new(MappingType::Separate)
            .with_output(out("/first"))
            .with_output(out("/last"))
            .with_output(out("/middle"))
            .with_delimiter(StringDelimiter::Comma);
        pass.process(&separate, &[valued(FieldValue::String("Bo,Yu".into()))], &mut audits)
            .unwrap();

        let lookup = MappingEntry::new(MappingType::Lookup)
            .with_output(out("/color"))
            .with_lookup_table("colors");
        pass.process(&lookup, &[valued(FieldValue::Char('R'))], &mut audits).unwrap();
        pass.process(&lookup, &[valued(FieldValue::Char('Q'))], &mut audits).unwrap();

        assert_eq!(audits.len(), 1);
        assert_eq!(audits.records()[0].status, AuditStatus::Warn);
        assert_eq!(audits.records()[0].message, "No entry for 'Q' in lookup table 'colors'");
        assert_eq!(
            output_of(pass),
            r#"{"color":"Red","first":"Bo","full":"Ann Lee","last":"Yu"}"#
        );
    }

    #[test]
    fn test_failed_action_skips_output() {
        let context = context();
        let mut pass = OutputPass::new(&context).unwrap();
        let mut audits = Audits::new();
        let entry = MappingEntry::map(Field::default(), out("/n"))
            .with_action(FieldAction::AbsoluteValue);
        pass.process(&entry, &[valued(FieldValue::String("x".into()))], &mut audits)
            .unwrap();
        assert_eq!(audits.count(AuditStatus::Error), 1);
        assert_eq!(output_of(pass), "{}");
    }

    #[test]
    fn test_rejected_write_is_audited_and_skipped() {
        let context = context();
        let mut pass = OutputPass::new(&context).unwrap();
        let mut audits = Audits::new();

        for path in ["/good", "/items[-1]", "/good/nested", "/after"] {
            let entry = MappingEntry::map(Field::default(), out(path));
            let flow = pass
                .process(&entry, &[valued(FieldValue::Integer(1))], &mut audits)
                .unwrap();
            assert!(flow.is_continue());
        }

        assert_eq!(audits.count(AuditStatus::Error), 2);
        let paths: Vec<_> = audits.records().iter().map(|a| a.path.as_deref()).collect();
        assert_eq!(paths, vec![Some("/items[-1]"), Some("/good/nested")]);
        assert!(audits.records()[0].message.starts_with("Unable to write output field"));
        assert_eq!(output_of(pass), r#"{"after":1,"good":1}"#);
    }

    #[test]
    fn test_structural_problems_break() {
        let context = context();
        let mut pass = OutputPass::new(&context).unwrap();
        let mut audits = Audits::new();

        let no_outputs = MappingEntry::new(MappingType::Map);
        assert!(pass.process(&no_outputs, &[], &mut audits).unwrap().is_break());

        let property_output =
            MappingEntry::map(Field::default(), Field::property("p")).with_id("m2");
        match pass.process(&property_output, &[], &mut audits).unwrap() {
            ControlFlow::Break(Error::StructuralMapping { mapping_id, .. }) => {
                assert_eq!(mapping_id.as_deref(), Some("m2"));
            }
            other => panic!("unexpected flow: {other:?}"),
        }
        assert_eq!(audits.count(AuditStatus::Error), 2);
    }
}
