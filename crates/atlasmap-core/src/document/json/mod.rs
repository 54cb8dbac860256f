//! JSON document module
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

pub mod reader;
pub mod writer;

pub use reader::JsonFieldReader;
pub use writer::JsonFieldWriter;

use super::{FieldReader, FieldWriter, FormatModule, NodeKind};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::path::NamespaceTable;
use crate::types::{Document, DocumentFormat};
use serde_json::Value;

/// Classify a JSON node
pub fn node_kind(value: &Value) -> NodeKind {
    match value {
        Value::String(_) => NodeKind::Textual,
        Value::Number(_) => NodeKind::Numeric,
        Value::Bool(_) => NodeKind::Boolean,
        Value::Null => NodeKind::Null,
        Value::Array(_) | Value::Object(_) => NodeKind::Container,
    }
}

/// JSON text documents
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonModule;

impl FormatModule for JsonModule {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Json
    }

    fn create_reader(
        &self,
        doc_id: &str,
        document: &Document,
        _namespaces: &NamespaceTable,
    ) -> Result<Box<dyn FieldReader>> {
        Ok(Box::new(JsonFieldReader::new(doc_id, document)?))
    }

    fn create_writer(
        &self,
        doc_id: &str,
        _namespaces: &NamespaceTable,
        config: &EngineConfig,
    ) -> Result<Box<dyn FieldWriter>> {
        Ok(Box::new(
            JsonFieldWriter::new(doc_id).with_max_index(config.max_collection_index),
        ))
    }
}
