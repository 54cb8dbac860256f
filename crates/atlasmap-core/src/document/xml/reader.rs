//! XML field reader
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

use super::dom::{self, XmlAttribute, XmlElement};
use crate::audit::Audits;
use crate::document::{negative_index, FieldReader};
use crate::error::{Error, Result};
use crate::path::{FieldPath, NamespaceTable, PathCache, PathSegment};
use crate::types::{Document, Field, FieldType, FieldValue};
use log::debug;

enum Lookup<'a> {
    Element(&'a XmlElement),
    Attribute(&'a XmlAttribute),
    Missing,
    NegativeIndex(i64),
}

/// Reads fields from a parsed XML tree
#[derive(Debug, Clone)]
pub struct XmlFieldReader {
    doc_id: String,
    root: XmlElement,
    namespaces: NamespaceTable,
    paths: PathCache,
}

impl XmlFieldReader {
    /// Parse an XML text document
    ///
    /// Namespaces declared on the root element are known up front; the
    /// `namespaces` declared by the mapping are added to them.
    pub fn new(doc_id: &str, document: &Document, namespaces: &NamespaceTable) -> Result<Self> {
        let text = document.as_text().ok_or_else(|| {
            Error::document_access(Some(doc_id), "XML document must be provided as text")
        })?;
        let root = dom::parse(text).map_err(|e| Error::DocumentAccess {
            doc_id: Some(doc_id.to_string()),
            message: format!("document is not valid XML: {}", e),
            source: Some(anyhow::Error::new(e)),
        })?;
        Ok(Self::from_element(doc_id, root, namespaces))
    }

    pub fn from_element(doc_id: &str, root: XmlElement, namespaces: &NamespaceTable) -> Self {
        let mut table = root.namespace_declarations();
        table.merge(namespaces);
        Self {
            doc_id: doc_id.to_string(),
            root,
            namespaces: table,
            paths: PathCache::new(),
        }
    }

    pub fn namespaces(&self) -> &NamespaceTable {
        &self.namespaces
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }
}

/// Walk `path` from the root; a first segment that does not name the root
/// element starts below it
fn find<'a>(root: &'a XmlElement, path: &FieldPath) -> Lookup<'a> {
    let segments = path.segments();
    let rest = match segments.first() {
        Some(first) if root.matches(first) => {
            if let Some(index) = first.negative_index {
                return Lookup::NegativeIndex(index);
            }
            &segments[1..]
        }
        _ => segments,
    };

    let mut current = root;
    for (position, segment) in rest.iter().enumerate() {
        if let Some(index) = segment.negative_index {
            return Lookup::NegativeIndex(index);
        }
        if segment.attribute {
            if position + 1 != rest.len() {
                return Lookup::Missing;
            }
            return match current.find_attribute(segment) {
                Some(attribute) => Lookup::Attribute(attribute),
                None => Lookup::Missing,
            };
        }
        let index = segment.index.unwrap_or(0);
        current = match current.elements().filter(|e| e.matches(segment)).nth(index) {
            Some(element) => element,
            None => return Lookup::Missing,
        };
    }
    Lookup::Element(current)
}

fn textual(field: &mut Field, text: &str) {
    match (field.field_type, text.chars().next()) {
        (Some(FieldType::Char), Some(c)) => field.value = Some(FieldValue::Char(c)),
        _ => {
            field.value = Some(FieldValue::String(text.to_string()));
            field.field_type = Some(FieldType::String);
        }
    }
}

/// Populate `field` from the element it resolved to
fn populate(field: &mut Field, element: &XmlElement) -> Result<()> {
    if !element.has_elements() {
        textual(field, &element.text());
        return Ok(());
    }

    field.value = Some(FieldValue::Complex(element.to_xml()?));
    field.field_type = Some(FieldType::Complex);
    if let Some(collection) = field.path.last().and_then(|s| s.collection) {
        field.collection_type = collection;
    }

    let mut children = Vec::new();
    for attribute in element.data_attributes() {
        let mut segment = PathSegment::named(attribute.local_name());
        segment.prefix = attribute.name.split_once(':').map(|(p, _)| p.to_string());
        segment.attribute = true;
        let mut child = Field::new(field.path.child(segment));
        textual(&mut child, &attribute.value);
        children.push(child);
    }

    let mut seen: Vec<(&str, usize)> = Vec::new();
    let repeated = |name: &str| element.elements().filter(|e| e.name == name).count() > 1;
    for child_element in element.elements() {
        let mut segment = PathSegment::named(child_element.local_name());
        segment.prefix = child_element.prefix().map(str::to_string);
        if repeated(&child_element.name) {
            let occurrence = match seen.iter_mut().find(|(name, _)| *name == child_element.name) {
                Some((_, count)) => {
                    *count += 1;
                    *count
                }
                None => {
                    seen.push((child_element.name.as_str(), 0));
                    0
                }
            };
            segment.collection = Some(crate::types::CollectionType::Array);
            segment.index = Some(occurrence);
        }
        let mut child = Field::new(field.path.child(segment));
        populate(&mut child, child_element)?;
        children.push(child);
    }
    field.children = children;
    Ok(())
}

impl FieldReader for XmlFieldReader {
    fn read(&mut self, field: &mut Field, audits: &mut Audits) -> Result<()> {
        debug!("Reading XML field {} from '{}'", field.path, self.doc_id);
        let path = self.paths.resolve(&field.path, &self.namespaces);
        match find(&self.root, &path) {
            Lookup::Element(element) => populate(field, element)?,
            Lookup::Attribute(attribute) => textual(field, &attribute.value),
            Lookup::Missing => {
                field.value = None;
                field.field_type = Some(FieldType::None);
            }
            Lookup::NegativeIndex(index) => negative_index(field, audits, index),
        }
        Ok(())
    }

    fn collection_size(&mut self, path: &FieldPath) -> usize {
        let path = self.paths.resolve(path, &self.namespaces);
        let segments = path.segments();
        let cut = match segments.iter().position(PathSegment::is_collection) {
            Some(cut) => cut,
            None => {
                return match find(&self.root, &path) {
                    Lookup::Element(_) | Lookup::Attribute(_) => 1,
                    Lookup::Missing | Lookup::NegativeIndex(_) => 0,
                };
            }
        };

        let target = &segments[cut];
        if cut == 0 && self.root.matches(target) {
            return 1;
        }
        let parent = FieldPath::from_segments(segments[..cut].to_vec());
        match find(&self.root, &parent) {
            Lookup::Element(parent) => parent.elements().filter(|e| e.matches(target)).count(),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CollectionType;
    use pretty_assertions::assert_eq;

    const ORDERS: &str = r#"<?xml version="1.0"?>
<ns:orders xmlns:ns="urn:orders" count="2">
  <ns:order id="a1"><ns:total>10.5</ns:total><ns:grade>Premium</ns:grade></ns:order>
  <ns:order id="b2"><ns:total>7</ns:total></ns:order>
</ns:orders>"#;

    fn reader(xml: &str) -> XmlFieldReader {
        XmlFieldReader::new("source", &Document::text(xml), &NamespaceTable::new()).unwrap()
    }

    fn read(reader: &mut XmlFieldReader, path: &str) -> (Field, Audits) {
        let mut field = Field::at(path).unwrap().with_doc_id("source");
        let mut audits = Audits::new();
        reader.read(&mut field, &mut audits).unwrap();
        (field, audits)
    }

    #[test]
    fn test_namespaces_seeded_from_root() {
        let reader = reader(ORDERS);
        assert_eq!(reader.namespaces().uri_for_prefix("ns"), Some("urn:orders"));
    }

    #[test]
    fn test_read_indexed_text_and_attributes() {
        let mut reader = reader(ORDERS);
        let (total, _) = read(&mut reader, "/ns:orders/ns:order[1]/ns:total");
        assert_eq!(total.value, Some(FieldValue::String("7".to_string())));
        assert_eq!(total.field_type, Some(FieldType::String));

        let (id, _) = read(&mut reader, "/ns:orders/ns:order[0]/@id");
        assert_eq!(id.value, Some(FieldValue::String("a1".to_string())));

        let (count, _) = read(&mut reader, "/ns:orders/@count");
        assert_eq!(count.value, Some(FieldValue::String("2".to_string())));
    }

    #[test]
    fn test_mapping_prefix_matches_by_uri() {
        let mut mapping = NamespaceTable::new();
        mapping.declare("urn:other", "o");
        let mut reader =
            XmlFieldReader::new("source", &Document::text(ORDERS), &mapping).unwrap();
        assert_eq!(reader.namespaces().len(), 2);
        let (total, _) = read(&mut reader, "/o:orders/o:order[0]/o:total");
        assert_eq!(total.field_type, Some(FieldType::None));
        // undeclared prefixes fall back to local names
        let (total, _) = read(&mut reader, "/x:orders/x:order[0]/x:total");
        assert_eq!(total.value, Some(FieldValue::String("10.5".to_string())));
    }

    #[test]
    fn test_root_may_be_omitted() {
        let mut reader = reader(ORDERS);
        let (total, _) = read(&mut reader, "/ns:order[0]/ns:total");
        assert_eq!(total.value, Some(FieldValue::String("10.5".to_string())));
    }

    #[test]
    fn test_expected_char() {
        let mut reader = reader(ORDERS);
        let mut field = Field::at("/ns:orders/ns:order/ns:grade")
            .unwrap()
            .with_type(FieldType::Char);
        reader.read(&mut field, &mut Audits::new()).unwrap();
        assert_eq!(field.value, Some(FieldValue::Char('P')));
    }

    #[test]
    fn test_missing_and_negative() {
        let mut reader = reader(ORDERS);
        let (missing, audits) = read(&mut reader, "/ns:orders/ns:order[5]/ns:total");
        assert_eq!(missing.field_type, Some(FieldType::None));
        assert!(audits.is_empty());

        let (negative, audits) = read(&mut reader, "/ns:orders/ns:order[-1]/ns:total");
        assert_eq!(negative.field_type, Some(FieldType::None));
        assert_eq!(audits.len(), 1);
    }

    #[test]
    fn test_complex_element() {
        let mut reader = reader(ORDERS);
        let (order, _) = read(&mut reader, "/ns:orders/ns:order[0]");
        assert_eq!(order.field_type, Some(FieldType::Complex));
        let names: Vec<String> = order.children.iter().map(|c| c.path.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "/ns:orders/ns:order[0]/@id",
                "/ns:orders/ns:order[0]/ns:total",
                "/ns:orders/ns:order[0]/ns:grade",
            ]
        );

        let (orders, _) = read(&mut reader, "/ns:orders");
        assert_eq!(orders.children[1].path.to_string(), "/ns:orders/ns:order[0]");
        assert_eq!(orders.children[2].path.to_string(), "/ns:orders/ns:order[1]");
        assert_eq!(orders.children[2].children.len(), 2);
    }

    #[test]
    fn test_collection_type_from_path() {
        let mut reader = reader(ORDERS);
        let (order, _) = read(&mut reader, "/ns:orders/ns:order[0]");
        assert_eq!(order.collection_type, CollectionType::Array);
    }

    #[test]
    fn test_collection_size() {
        let mut reader = reader(ORDERS);
        let path = FieldPath::parse("/ns:orders/ns:order[]/ns:total").unwrap();
        assert_eq!(reader.collection_size(&path), 2);
        let single = FieldPath::parse("/ns:orders/@count").unwrap();
        assert_eq!(reader.collection_size(&single), 1);
        let none = FieldPath::parse("/ns:orders/ns:missing[]").unwrap();
        assert_eq!(reader.collection_size(&none), 0);
    }

    #[test]
    fn test_rejects_object_documents() {
        let err = XmlFieldReader::new(
            "source",
            &Document::Object(crate::document::ObjectValue::Null),
            &NamespaceTable::new(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::DocumentAccess { .. }));
    }
}
