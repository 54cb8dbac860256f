//! Minimal XML tree
//!
//! Elements keep their qualified names as written and the namespace URI
//! those names resolved to in scope at parse time. Comments, processing
//! instructions and the document type are dropped.
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::path::{NamespaceTable, PathSegment};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// An attribute with its resolved namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub name: String,
    pub namespace: Option<String>,
    pub value: String,
}

impl XmlAttribute {
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Whether this is a namespace declaration rather than data
    pub fn is_declaration(&self) -> bool {
        self.name == "xmlns" || self.name.starts_with("xmlns:")
    }
}

/// Child node of an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An element with attributes and ordered children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub namespace: Option<String>,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlNode>,
}

fn local_part(name: &str) -> &str {
    name.split_once(':').map(|(_, local)| local).unwrap_or(name)
}

impl XmlElement {
    pub fn new(name: impl Into<String>, namespace: Option<String>) -> Self {
        Self {
            name: name.into(),
            namespace,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Child elements in document order
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    pub fn has_elements(&self) -> bool {
        self.elements().next().is_some()
    }

    /// Concatenated direct text content
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(text) => Some(text.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// Replace the direct text content, keeping child elements
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children.retain(|node| matches!(node, XmlNode::Element(_)));
        self.children.insert(0, XmlNode::Text(text.into()));
    }

    /// Data attributes, without namespace declarations
    pub fn data_attributes(&self) -> impl Iterator<Item = &XmlAttribute> {
        self.attributes.iter().filter(|a| !a.is_declaration())
    }

    pub fn set_attribute(&mut self, name: &str, namespace: Option<String>, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(XmlAttribute {
                name: name.to_string(),
                namespace,
                value,
            }),
        }
    }

    /// Namespaces declared on this element as a table
    pub fn namespace_declarations(&self) -> NamespaceTable {
        self.attributes
            .iter()
            .filter_map(|a| {
                if a.name == "xmlns" {
                    Some((a.value.clone(), String::new()))
                } else {
                    a.name
                        .strip_prefix("xmlns:")
                        .map(|prefix| (a.value.clone(), prefix.to_string()))
                }
            })
            .collect()
    }

    /// Whether this element is addressed by `segment`
    pub fn matches(&self, segment: &PathSegment) -> bool {
        !segment.attribute
            && self.local_name() == segment.name
            && match &segment.namespace_uri {
                Some(uri) => self.namespace.as_deref() == Some(uri.as_str()),
                None => true,
            }
    }

    /// The attribute addressed by `segment`
    pub fn find_attribute(&self, segment: &PathSegment) -> Option<&XmlAttribute> {
        self.data_attributes().find(|a| {
            a.local_name() == segment.name
                && match &segment.namespace_uri {
                    Some(uri) => a.namespace.as_deref() == Some(uri.as_str()),
                    None => true,
                }
        })
    }

    /// Serialize this element and its subtree
    pub fn to_xml(&self) -> Result<String> {
        serialize(self, false)
    }
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| Error::xml(e, None))
}

type Scopes = Vec<Vec<(String, String)>>;

fn lookup<'s>(scopes: &'s Scopes, prefix: &str) -> Option<&'s String> {
    scopes
        .iter()
        .rev()
        .flat_map(|scope| scope.iter())
        .find(|(p, _)| p == prefix)
        .map(|(_, uri)| uri)
}

/// Build an element from a start tag, opening its namespace scope
fn open(start: &BytesStart<'_>, scopes: &mut Scopes) -> Result<XmlElement> {
    let name = utf8(start.name().as_ref())?.to_string();
    let mut raw = Vec::new();
    let mut declared = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::xml(e, None))?;
        let key = utf8(attr.key.as_ref())?.to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::xml(e, None))?
            .into_owned();
        if key == "xmlns" {
            declared.push((String::new(), value.clone()));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            declared.push((prefix.to_string(), value.clone()));
        }
        raw.push((key, value));
    }
    scopes.push(declared);

    let namespace = lookup(scopes, name.split_once(':').map(|(p, _)| p).unwrap_or("")).cloned();
    let attributes = raw
        .into_iter()
        .map(|(name, value)| {
            let namespace = match name.split_once(':') {
                Some((prefix, _)) if prefix != "xmlns" => lookup(scopes, prefix).cloned(),
                _ => None,
            };
            XmlAttribute {
                name,
                namespace,
                value,
            }
        })
        .collect();

    Ok(XmlElement {
        name,
        namespace,
        attributes,
        children: Vec::new(),
    })
}

fn close(element: XmlElement, stack: &mut [XmlElement], root: &mut Option<XmlElement>) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => return Err(Error::xml("document has more than one root element", None)),
    }
    Ok(())
}

/// Parse an XML document into its root element
pub fn parse(text: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut scopes: Scopes = Vec::new();
    let mut root = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(Error::xml(e, u64::try_from(reader.buffer_position()).ok()));
            }
        };
        match event {
            Event::Start(start) => {
                let element = open(&start, &mut scopes)?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = open(&start, &mut scopes)?;
                scopes.pop();
                close(element, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::xml("unexpected closing tag", None))?;
                scopes.pop();
                close(element, &mut stack, &mut root)?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| Error::xml(e, None))?;
                if let Some(current) = stack.last_mut() {
                    current.children.push(XmlNode::Text(text.into_owned()));
                }
            }
            Event::CData(data) => {
                let text = utf8(&data.into_inner())?.to_string();
                if let Some(current) = stack.last_mut() {
                    current.children.push(XmlNode::Text(text));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(Error::xml("document ended before all elements were closed", None));
    }
    root.ok_or_else(|| Error::xml("document has no root element", None))
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> Result<()> {
    let start = BytesStart::new(element.name.as_str()).with_attributes(
        element
            .attributes
            .iter()
            .map(|a| (a.name.as_str(), a.value.as_str())),
    );
    if element.children.is_empty() {
        writer
            .write_event(Event::Empty(start))
            .map_err(|e| Error::xml(e, None))?;
        return Ok(());
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| Error::xml(e, None))?;
    for child in &element.children {
        match child {
            XmlNode::Element(child) => write_element(writer, child)?,
            XmlNode::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(|e| Error::xml(e, None))?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|e| Error::xml(e, None))?;
    Ok(())
}

/// Serialize a tree, optionally with an XML declaration
pub fn serialize(root: &XmlElement, declaration: bool) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    if declaration {
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|e| Error::xml(e, None))?;
    }
    write_element(&mut writer, root)?;
    String::from_utf8(writer.into_inner()).map_err(|e| Error::xml(e, None))
}
