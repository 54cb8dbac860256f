//! XML document module
//!
//! Paths address elements by local name and, when their prefix is declared,
//! by namespace URI. `@name` segments address attributes.
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

pub mod dom;
pub mod reader;
pub mod writer;

pub use dom::{XmlAttribute, XmlElement, XmlNode};
pub use reader::XmlFieldReader;
pub use writer::XmlFieldWriter;

use super::{FieldReader, FieldWriter, FormatModule};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::path::NamespaceTable;
use crate::types::{Document, DocumentFormat};

/// XML text documents
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlModule;

impl FormatModule for XmlModule {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Xml
    }

    fn create_reader(
        &self,
        doc_id: &str,
        document: &Document,
        namespaces: &NamespaceTable,
    ) -> Result<Box<dyn FieldReader>> {
        Ok(Box::new(XmlFieldReader::new(doc_id, document, namespaces)?))
    }

    fn create_writer(
        &self,
        doc_id: &str,
        namespaces: &NamespaceTable,
        config: &EngineConfig,
    ) -> Result<Box<dyn FieldWriter>> {
        Ok(Box::new(
            XmlFieldWriter::new(doc_id, namespaces)
                .with_declaration(config.xml.write_declaration)
                .with_max_index(config.max_collection_index),
        ))
    }
}
