//! XML field writer
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

use super::dom::{self, XmlElement, XmlNode};
use crate::config::DEFAULT_MAX_COLLECTION_INDEX;
use crate::document::{check_write_index, FieldWriter};
use crate::error::{Error, Result};
use crate::path::{NamespaceTable, PathCache, PathSegment};
use crate::types::{Document, Field, FieldValue};
use log::debug;

/// Builds an XML tree from written fields
#[derive(Debug, Clone)]
pub struct XmlFieldWriter {
    doc_id: String,
    root: Option<XmlElement>,
    namespaces: NamespaceTable,
    declaration: bool,
    paths: PathCache,
    max_index: usize,
}

impl XmlFieldWriter {
    /// Writer declaring `namespaces` on the root element it creates
    pub fn new(doc_id: &str, namespaces: &NamespaceTable) -> Self {
        Self {
            doc_id: doc_id.to_string(),
            root: None,
            namespaces: namespaces.clone(),
            declaration: false,
            paths: PathCache::new(),
            max_index: DEFAULT_MAX_COLLECTION_INDEX,
        }
    }

    /// Largest index a write may grow a repeated element to
    pub fn with_max_index(mut self, max_index: usize) -> Self {
        self.max_index = max_index;
        self
    }

    /// Prefix the serialized document with an XML declaration
    pub fn with_declaration(mut self, declaration: bool) -> Self {
        self.declaration = declaration;
        self
    }

    pub fn root(&self) -> Option<&XmlElement> {
        self.root.as_ref()
    }

    fn error(&self, message: String) -> Error {
        Error::document_access(Some(&self.doc_id), message)
    }
}

fn new_root(segment: &PathSegment, namespaces: &NamespaceTable) -> XmlElement {
    let mut root = XmlElement::new(segment.qualified_name(), segment.namespace_uri.clone());
    for (uri, prefix) in namespaces.iter() {
        let name = if prefix.is_empty() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{}", prefix)
        };
        root.set_attribute(&name, None, uri);
    }
    root
}

/// Child element of `parent` addressed by `segment`, created when missing
///
/// An unindexed collection segment appends at the leaf and reuses the last
/// occurrence on the way down.
fn child<'a>(
    parent: &'a mut XmlElement,
    segment: &PathSegment,
    leaf: bool,
) -> Result<&'a mut XmlElement> {
    let existing = parent.elements().filter(|e| e.matches(segment)).count();
    let wanted = match segment.index {
        Some(index) => index,
        None if segment.is_collection() && leaf => existing,
        None if segment.is_collection() => existing.saturating_sub(1),
        None => 0,
    };
    for _ in existing..=wanted {
        parent.children.push(XmlNode::Element(XmlElement::new(
            segment.qualified_name(),
            segment.namespace_uri.clone(),
        )));
    }

    parent
        .children
        .iter_mut()
        .filter_map(|node| match node {
            XmlNode::Element(element) if element.matches(segment) => Some(element),
            _ => None,
        })
        .nth(wanted)
        .ok_or_else(|| {
            Error::document_access(None, format!("no element for segment '{}'", segment))
        })
}

/// Store `value` as the content of `element`
fn assign(element: &mut XmlElement, value: &FieldValue) -> Result<()> {
    match value {
        FieldValue::Complex(raw) => {
            let fragment = dom::parse(raw)?;
            element.attributes = fragment.attributes;
            element.children = fragment.children;
        }
        scalar => element.set_text(scalar.to_string()),
    }
    Ok(())
}

impl FieldWriter for XmlFieldWriter {
    fn write(&mut self, field: &Field) -> Result<()> {
        debug!("Writing XML field {} to '{}'", field.path, self.doc_id);
        let path = self.paths.resolve(&field.path, &self.namespaces);
        let segments = path.segments();

        if let Some(negative) = segments.iter().find_map(|s| s.negative_index) {
            return Err(self.error(format!(
                "cannot write at negative index {} in '{}'",
                negative, field.path
            )));
        }
        for segment in segments {
            check_write_index(&self.doc_id, segment, self.max_index)?;
        }
        let (first, rest) = match segments.split_first() {
            Some((first, rest)) if !first.attribute => (first, rest),
            _ => {
                return Err(self.error(format!(
                    "path '{}' does not start with an element",
                    field.path
                )))
            }
        };

        let namespaces = &self.namespaces;
        let root = self.root.get_or_insert_with(|| new_root(first, namespaces));
        if !root.matches(first) {
            let message = format!(
                "path '{}' does not address the root element <{}>",
                field.path, root.name
            );
            return Err(Error::document_access(Some(&self.doc_id), message));
        }

        let (last, parents) = match rest.split_last() {
            Some(split) => split,
            None => {
                if let Some(value) = &field.value {
                    assign(root, value)?;
                }
                return Ok(());
            }
        };

        let mut current = root;
        for segment in parents {
            if segment.attribute {
                return Err(Error::document_access(
                    Some(&self.doc_id),
                    format!("attribute '{}' cannot have children", segment.name),
                ));
            }
            current = child(current, segment, false)?;
        }

        if last.attribute {
            let text = field.value.as_ref().map(ToString::to_string).unwrap_or_default();
            current.set_attribute(&last.qualified_name(), last.namespace_uri.clone(), text);
        } else {
            let element = child(current, last, true)?;
            if let Some(value) = &field.value {
                assign(element, value)?;
            }
        }
        Ok(())
    }

    fn document(&self) -> Result<Document> {
        let text = match &self.root {
            Some(root) => dom::serialize(root, self.declaration)?,
            None => String::new(),
        };
        Ok(Document::Text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write(writer: &mut XmlFieldWriter, path: &str, value: FieldValue) -> Result<()> {
        writer.write(&Field::at(path).unwrap().with_value(value))
    }

    fn text(writer: &XmlFieldWriter) -> String {
        writer.document().unwrap().as_text().unwrap().to_string()
    }

    #[test]
    fn test_write_nested_elements_and_attributes() {
        let mut writer = XmlFieldWriter::new("target", &NamespaceTable::new());
        write(&mut writer, "/order/@id", FieldValue::String("a1".into())).unwrap();
        write(&mut writer, "/order/customer/name", FieldValue::String("Ann".into())).unwrap();
        write(&mut writer, "/order/customer/age", FieldValue::Integer(41)).unwrap();
        assert_eq!(
            text(&writer),
            r#"<order id="a1"><customer><name>Ann</name><age>41</age></customer></order>"#
        );
    }

    #[test]
    fn test_namespaces_declared_on_root() {
        let mut namespaces = NamespaceTable::new();
        namespaces.declare("urn:orders", "o");
        let mut writer = XmlFieldWriter::new("target", &namespaces).with_declaration(true);
        write(&mut writer, "/o:order/o:total", FieldValue::Double(10.5)).unwrap();
        assert_eq!(
            text(&writer),
            r#"<?xml version="1.0" encoding="UTF-8"?><o:order xmlns:o="urn:orders"><o:total>10.5</o:total></o:order>"#
        );
    }

    #[test]
    fn test_indexed_and_appended_occurrences() {
        let mut writer = XmlFieldWriter::new("target", &NamespaceTable::new());
        write(&mut writer, "/list/item[1]/v", FieldValue::Integer(2)).unwrap();
        write(&mut writer, "/list/item[0]/v", FieldValue::Integer(1)).unwrap();
        write(&mut writer, "/list/tag[]", FieldValue::String("x".into())).unwrap();
        write(&mut writer, "/list/tag[]", FieldValue::String("y".into())).unwrap();
        assert_eq!(
            text(&writer),
            "<list><item><v>1</v></item><item><v>2</v></item><tag>x</tag><tag>y</tag></list>"
        );
    }

    #[test]
    fn test_complex_value_is_spliced() {
        let mut writer = XmlFieldWriter::new("target", &NamespaceTable::new());
        write(
            &mut writer,
            "/order/address",
            FieldValue::Complex(r#"<address zip="02110"><city>Boston</city></address>"#.into()),
        )
        .unwrap();
        assert_eq!(
            text(&writer),
            r#"<order><address zip="02110"><city>Boston</city></address></order>"#
        );
    }

    #[test]
    fn test_root_mismatch_and_negative_index() {
        let mut writer = XmlFieldWriter::new("target", &NamespaceTable::new());
        write(&mut writer, "/order/id", FieldValue::Integer(1)).unwrap();
        let err = write(&mut writer, "/invoice/id", FieldValue::Integer(1)).unwrap_err();
        assert!(matches!(err, Error::DocumentAccess { .. }));
        let err = write(&mut writer, "/order/line[-1]", FieldValue::Integer(1)).unwrap_err();
        assert!(matches!(err, Error::DocumentAccess { .. }));
    }

    #[test]
    fn test_empty_writer() {
        let writer = XmlFieldWriter::new("target", &NamespaceTable::new());
        assert_eq!(text(&writer), "");
    }

    #[test]
    fn test_index_beyond_limit_is_rejected() {
        let mut writer = XmlFieldWriter::new("target", &NamespaceTable::new()).with_max_index(1);
        write(&mut writer, "/list/item[1]", FieldValue::Integer(2)).unwrap();
        let err = write(&mut writer, "/list/item[9223372036854775807]", FieldValue::Integer(3))
            .unwrap_err();
        assert!(matches!(err, Error::DocumentAccess { .. }));
        assert_eq!(text(&writer), "<list><item/><item>2</item></list>");
    }
}
