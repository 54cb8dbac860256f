//! Field path addressing
//!
//! A [`FieldPath`] is the parsed, segment-wise form of a field location such
//! as `/orders[1]/address/city` or `/ns:order/@ns:id`. Paths are immutable
//! once parsed; readers and writers walk them segment by segment.
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

pub mod cache;
pub mod error;
pub mod namespace;
pub mod parser;


pub use cache::PathCache;
pub use error::PathError;
pub use namespace::NamespaceTable;
pub use parser::PathParser;

use crate::types::CollectionType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of a [`FieldPath`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment {
    /// Local name, without namespace prefix or attribute marker
    pub name: String,
    /// Namespace prefix as written in the path
    pub prefix: Option<String>,
    /// Namespace URI the prefix resolved to, if any
    pub namespace_uri: Option<String>,
    /// Segment addresses an attribute (`@name`)
    pub attribute: bool,
    /// Index notation used: `[]` for arrays, `<>` for lists
    pub collection: Option<CollectionType>,
    /// Explicit non-negative position
    pub index: Option<usize>,
    /// Negative position found in the path text; never resolves to a value
    pub negative_index: Option<i64>,
}

impl PathSegment {
    /// A plain named segment
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: None,
            namespace_uri: None,
            attribute: false,
            collection: None,
            index: None,
            negative_index: None,
        }
    }

    /// An array segment at `index`
    pub fn indexed(name: impl Into<String>, index: usize) -> Self {
        Self {
            collection: Some(CollectionType::Array),
            index: Some(index),
            ..Self::named(name)
        }
    }

    /// Whether the segment carries index notation
    pub fn is_collection(&self) -> bool {
        self.collection.is_some()
    }

    /// `prefix:name` when prefixed, otherwise the bare name
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.attribute {
            f.write_str("@")?;
        }
        f.write_str(&self.qualified_name())?;
        if let Some(collection) = self.collection {
            let (open, close) = match collection {
                CollectionType::List => ('<', '>'),
                _ => ('[', ']'),
            };
            match (self.index, self.negative_index) {
                (Some(index), _) => write!(f, "{}{}{}", open, index, close)?,
                (None, Some(negative)) => write!(f, "{}{}{}", open, negative, close)?,
                (None, None) => write!(f, "{}{}", open, close)?,
            }
        }
        Ok(())
    }
}

/// Parsed field path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    original: String,
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Parse a path string
    pub fn parse(path: &str) -> Result<Self, PathError> {
        PathParser::new(path).parse()
    }

    /// Parse a path string and resolve its prefixes against `namespaces`
    pub fn parse_with_namespaces(path: &str, namespaces: &NamespaceTable) -> Result<Self, PathError> {
        Ok(Self::parse(path)?.resolve_namespaces(namespaces))
    }

    pub(crate) fn with_original(original: String, segments: Vec<PathSegment>) -> Self {
        Self { original, segments }
    }

    /// Build a path from segments, rendering its canonical string form
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        let original = render(&segments);
        Self { original, segments }
    }

    /// The root path (no segments)
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn first(&self) -> Option<&PathSegment> {
        self.segments.first()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// The path string this path was parsed from
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// Path of a child segment below this one
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self::from_segments(segments)
    }

    /// Path with the leading `count` segments removed
    pub fn skip(&self, count: usize) -> Self {
        Self::from_segments(self.segments.iter().skip(count).cloned().collect())
    }

    /// Whether any segment addresses a repeated element
    pub fn has_collection(&self) -> bool {
        self.segments.iter().any(PathSegment::is_collection)
    }

    /// Copy of this path with namespace prefixes resolved
    ///
    /// Prefixed segments take the URI declared for their prefix; a prefix
    /// with no declaration leaves the segment unqualified. Unprefixed
    /// elements fall into the default namespace when one is declared.
    pub fn resolve_namespaces(&self, namespaces: &NamespaceTable) -> Self {
        let segments = self
            .segments
            .iter()
            .map(|segment| {
                let namespace_uri = match &segment.prefix {
                    Some(prefix) => namespaces.uri_for_prefix(prefix).map(str::to_string),
                    None if !segment.attribute => {
                        namespaces.default_namespace().map(str::to_string)
                    }
                    None => None,
                };
                PathSegment {
                    namespace_uri,
                    ..segment.clone()
                }
            })
            .collect();
        Self {
            original: self.original.clone(),
            segments,
        }
    }
}

fn render(segments: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in segments {
        out.push('/');
        out.push_str(&segment.to_string());
    }
    out
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl TryFrom<String> for FieldPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.original
    }
}

impl std::str::FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Convenience function for one-off parsing
pub fn parse(path: &str) -> crate::Result<FieldPath> {
    Ok(FieldPath::parse(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_indexed_path() {
        let path = FieldPath::parse("/a/b[2]").unwrap();
        assert_eq!(
            path.segments(),
            &[PathSegment::named("a"), PathSegment::indexed("b", 2)]
        );
    }

    #[test]
    fn test_child_path_rendering() {
        let parent = FieldPath::parse("/orders[1]").unwrap();
        let child = parent.child(PathSegment::named("address"));
        assert_eq!(child.to_string(), "/orders[1]/address");
        assert_eq!(child.skip(1).to_string(), "/address");
        assert_eq!(FieldPath::root().to_string(), "");
    }

    #[test]
    fn test_rendering_keeps_notation() {
        let path = FieldPath::parse("/a<3>/b[]/@ns:c").unwrap();
        let rebuilt = FieldPath::from_segments(path.segments().to_vec());
        assert_eq!(rebuilt.to_string(), "/a<3>/b[]/@ns:c");
        assert_eq!(rebuilt, FieldPath::parse("/a<3>/b[]/@ns:c").unwrap());
    }

    #[test]
    fn test_resolve_namespaces() {
        let mut namespaces = NamespaceTable::new();
        namespaces.declare("http://example.com/orders", "ord");
        namespaces.declare("http://example.com/default", "");

        let path = FieldPath::parse("/ord:order/item/@id/x:unknown").unwrap();
        let resolved = path.resolve_namespaces(&namespaces);
        let uris: Vec<_> = resolved
            .segments()
            .iter()
            .map(|s| s.namespace_uri.as_deref())
            .collect();
        assert_eq!(
            uris,
            vec![
                Some("http://example.com/orders"),
                Some("http://example.com/default"),
                None,
                None,
            ]
        );
        // unknown prefixes stay on the segment, only the URI is missing
        assert_eq!(resolved.segments()[3].prefix.as_deref(), Some("x"));
    }

    #[test]
    fn test_serde_roundtrip_as_string() {
        let path: FieldPath = serde_json::from_str("\"/car/doors\"").unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(serde_json::to_string(&path).unwrap(), "\"/car/doors\"");
        assert!(serde_json::from_str::<FieldPath>("\"/car//doors\"").is_err());
    }
}
