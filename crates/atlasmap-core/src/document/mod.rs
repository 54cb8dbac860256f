//! Document readers and writers
//!
//! Each supported wire format plugs into the engine through a
//! [`FormatModule`]: it creates a [`FieldReader`] over a source document and
//! a [`FieldWriter`] building a target document. The engine only talks to
//! these traits; the [`ModuleRegistry`] maps a [`DocumentFormat`] to its
//! module.
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

pub mod json;
pub mod object;
pub mod xml;

pub use json::JsonModule;
pub use object::{ObjectModule, ObjectValue};
pub use xml::XmlModule;

use crate::audit::Audits;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::path::{FieldPath, NamespaceTable, PathSegment};
use crate::types::{CollectionType, Document, DocumentFormat, Field, FieldKind, FieldType};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Kind of a document node at a resolved path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Textual,
    Numeric,
    Boolean,
    Null,
    /// Object, array or element with children
    Container,
    /// Node the format cannot classify
    Other,
}

/// Reads field values out of one source document
pub trait FieldReader: Send {
    /// Populate `field`'s value, type and collection type from the document
    ///
    /// A path that resolves to nothing sets the type to NONE and is not an
    /// error.
    fn read(&mut self, field: &mut Field, audits: &mut Audits) -> Result<()>;

    /// Number of occurrences addressed by the first collection segment of `path`
    fn collection_size(&mut self, path: &FieldPath) -> usize;
}

/// Builds one target document from written fields
pub trait FieldWriter: Send {
    /// Write `field`'s value at its path, creating missing parents
    fn write(&mut self, field: &Field) -> Result<()>;

    /// Serialize the document built so far
    fn document(&self) -> Result<Document>;
}

/// Capability interface of a document format
pub trait FormatModule: Send + Sync + fmt::Debug {
    fn format(&self) -> DocumentFormat;

    fn create_reader(
        &self,
        doc_id: &str,
        document: &Document,
        namespaces: &NamespaceTable,
    ) -> Result<Box<dyn FieldReader>>;

    fn create_writer(
        &self,
        doc_id: &str,
        namespaces: &NamespaceTable,
        config: &EngineConfig,
    ) -> Result<Box<dyn FieldWriter>>;

    /// Number of occurrences addressed by the first collection segment of `path`
    fn collection_size(&self, document: &Document, path: &FieldPath) -> Result<usize> {
        let mut reader = self.create_reader("", document, &NamespaceTable::new())?;
        Ok(reader.collection_size(path))
    }

    /// Independent copy of a field for per-pass mutation
    fn clone_field(&self, field: &Field) -> Field {
        field.clone()
    }

    /// Whether this module can read or write `field`
    fn is_supported_field(&self, field: &Field) -> bool {
        field.kind == FieldKind::Document
            && !matches!(field.field_type, Some(FieldType::Unsupported))
    }
}

/// Registered format modules
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: HashMap<DocumentFormat, Arc<dyn FormatModule>>,
}

impl ModuleRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the JSON, XML and object-graph modules
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(JsonModule));
        registry.register(Arc::new(XmlModule));
        registry.register(Arc::new(ObjectModule));
        registry
    }

    /// Register a module, replacing any module for the same format
    pub fn register(&mut self, module: Arc<dyn FormatModule>) {
        self.modules.insert(module.format(), module);
    }

    pub fn get(&self, format: DocumentFormat) -> Option<Arc<dyn FormatModule>> {
        self.modules.get(&format).cloned()
    }

    pub fn formats(&self) -> impl Iterator<Item = DocumentFormat> + '_ {
        self.modules.keys().copied()
    }
}

/// Path of the `index`-th element of a collection leaf below `parent`
///
/// A leaf without index notation takes the notation of `collection`.
pub(crate) fn element_path(parent: &FieldPath, index: usize, collection: CollectionType) -> FieldPath {
    let mut segments = parent.segments().to_vec();
    if let Some(last) = segments.last_mut() {
        if last.collection.is_none() {
            last.collection = Some(collection);
        }
        last.index = Some(index);
        last.negative_index = None;
    }
    FieldPath::from_segments(segments)
}

/// Audit and log a negative index met while reading
/// Reject a write whose index would grow a collection past `max_index`
pub(crate) fn check_write_index(doc_id: &str, segment: &PathSegment, max_index: usize) -> Result<()> {
    match segment.index {
        Some(index) if index > max_index => Err(Error::document_access(
            Some(doc_id),
            format!(
                "index {} of '{}' exceeds the maximum collection index {}",
                index, segment.name, max_index
            ),
        )),
        _ => Ok(()),
    }
}

pub(crate) fn negative_index(field: &mut Field, audits: &mut Audits, index: i64) {
    let message = format!(
        "Negative index {} in path '{}' is not supported, no value read",
        index, field.path
    );
    log::warn!("{} (docId={:?})", message, field.doc_id);
    audits.warn(field.doc_id.as_deref(), field.path.as_str(), message);
    field.value = None;
    field.field_type = Some(FieldType::None);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_has_all_formats() {
        let registry = ModuleRegistry::with_defaults();
        for format in [DocumentFormat::Json, DocumentFormat::Xml, DocumentFormat::Object] {
            assert_eq!(registry.get(format).map(|m| m.format()), Some(format));
        }
    }

    #[test]
    fn test_element_path() {
        let parent = FieldPath::parse("/orders").unwrap();
        assert_eq!(element_path(&parent, 2, CollectionType::Array).to_string(), "/orders[2]");
        assert_eq!(element_path(&parent, 1, CollectionType::List).to_string(), "/orders<1>");
        let listed = FieldPath::parse("/orders<>").unwrap();
        assert_eq!(element_path(&listed, 0, CollectionType::Array).to_string(), "/orders<0>");
    }

    #[test]
    fn test_unsupported_fields() {
        let module = JsonModule;
        assert!(module.is_supported_field(&Field::at("/a").unwrap()));
        assert!(!module.is_supported_field(&Field::property("name")));
        assert!(!module.is_supported_field(&Field::at("/a").unwrap().with_type(FieldType::Unsupported)));
    }
}
