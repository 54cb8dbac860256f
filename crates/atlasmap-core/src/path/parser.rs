//! Field path parser
//!
//! Paths are root-relative and `/`-separated. A segment is a name with an
//! optional `prefix:` namespace qualifier, an optional leading `@` for
//! attributes and an optional index suffix in array (`name[N]`) or list
//! (`name<N>`) notation. Empty brackets mark a collection segment without a
//! position.
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

use super::error::PathError;
use super::{FieldPath, PathSegment};
use crate::types::CollectionType;

/// Field path parser
pub struct PathParser<'a> {
    /// Input string being parsed
    input: &'a str,
}

impl<'a> PathParser<'a> {
    /// Create a new parser for the given input
    pub fn new(input: &'a str) -> Self {
        Self { input }
    }

    /// Parse the input into a [`FieldPath`]
    pub fn parse(self) -> Result<FieldPath, PathError> {
        let (body, offset) = match self.input.strip_prefix('/') {
            Some(rest) => (rest, 1),
            None => (self.input, 0),
        };

        let mut segments = Vec::new();
        if !body.is_empty() {
            let mut position = offset;
            for token in body.split('/') {
                segments.push(self.parse_segment(token, position)?);
                position += token.len() + 1;
            }
        }

        Ok(FieldPath::with_original(self.input.to_string(), segments))
    }

    fn parse_segment(&self, token: &str, position: usize) -> Result<PathSegment, PathError> {
        if token.is_empty() {
            return Err(PathError::empty_segment(self.input, position));
        }

        let (attribute, rest, name_offset) = match token.strip_prefix('@') {
            Some(rest) => (true, rest, position + 1),
            None => (false, token, position),
        };

        let (name_part, collection, index, negative_index) =
            self.split_index(rest, name_offset)?;

        if let Some(bad) = name_part.find(|c: char| matches!(c, '[' | ']' | '<' | '>' | '@')) {
            return Err(PathError::new(
                self.input,
                format!("unexpected character '{}' in segment '{}'", &name_part[bad..bad + 1], token),
                Some(name_offset + bad),
            ));
        }

        let (prefix, name) = match name_part.split_once(':') {
            Some((prefix, local)) => {
                if prefix.is_empty() || local.is_empty() || local.contains(':') {
                    return Err(PathError::new(
                        self.input,
                        format!("invalid qualified name '{}'", name_part),
                        Some(name_offset),
                    ));
                }
                (Some(prefix.to_string()), local.to_string())
            }
            None => (None, name_part.to_string()),
        };

        if name.is_empty() {
            return Err(PathError::empty_segment(self.input, position));
        }

        if attribute && collection.is_some() {
            return Err(PathError::new(
                self.input,
                format!("attribute segment '{}' cannot be indexed", token),
                Some(position),
            ));
        }

        Ok(PathSegment {
            name,
            prefix,
            namespace_uri: None,
            attribute,
            collection,
            index,
            negative_index,
        })
    }

    /// Split an index suffix off `token`
    ///
    /// Returns the name part, the collection notation used, the position and
    /// any negative position found in the text.
    #[allow(clippy::type_complexity)]
    fn split_index<'t>(
        &self,
        token: &'t str,
        position: usize,
    ) -> Result<(&'t str, Option<CollectionType>, Option<usize>, Option<i64>), PathError> {
        let (open, collection) = if token.ends_with(']') {
            ('[', CollectionType::Array)
        } else if token.ends_with('>') {
            ('<', CollectionType::List)
        } else {
            return Ok((token, None, None, None));
        };

        let start = token.rfind(open).ok_or_else(|| {
            PathError::new(
                self.input,
                format!("unbalanced index brackets in segment '{}'", token),
                Some(position),
            )
        })?;
        let raw = &token[start + 1..token.len() - 1];
        let name = &token[..start];

        if raw.is_empty() {
            return Ok((name, Some(collection), None, None));
        }

        let value: i64 = raw
            .parse()
            .map_err(|_| PathError::invalid_index(self.input, raw, position + start + 1))?;
        if value < 0 {
            Ok((name, Some(collection), None, Some(value)))
        } else {
            let index = usize::try_from(value)
                .map_err(|_| PathError::invalid_index(self.input, raw, position + start + 1))?;
            Ok((name, Some(collection), Some(index), None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(path: &str) -> FieldPath {
        PathParser::new(path).parse().unwrap()
    }

    #[test]
    fn test_simple_path() {
        let path = parse("/a/b/c");
        let names: Vec<_> = path.segments().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(path.segments().iter().all(|s| s.index.is_none()));
    }

    #[test]
    fn test_empty_path_is_root() {
        assert!(parse("").is_root());
        assert!(parse("/").is_root());
    }

    #[test]
    fn test_unrooted_path() {
        let path = parse("a/b");
        assert_eq!(path.len(), 2);
        assert_eq!(path.segments()[0].name, "a");
    }

    #[test]
    fn test_array_and_list_index() {
        let path = parse("/orders[2]/items<0>");
        let orders = &path.segments()[0];
        assert_eq!(orders.name, "orders");
        assert_eq!(orders.index, Some(2));
        assert_eq!(orders.collection, Some(CollectionType::Array));

        let items = &path.segments()[1];
        assert_eq!(items.index, Some(0));
        assert_eq!(items.collection, Some(CollectionType::List));
    }

    #[test]
    fn test_collection_without_index() {
        let path = parse("/orders[]");
        let segment = &path.segments()[0];
        assert_eq!(segment.collection, Some(CollectionType::Array));
        assert_eq!(segment.index, None);
        assert!(segment.is_collection());
    }

    #[test]
    fn test_negative_index_is_kept_aside() {
        let path = parse("/orders[-1]");
        let segment = &path.segments()[0];
        assert_eq!(segment.index, None);
        assert_eq!(segment.negative_index, Some(-1));
    }

    #[test]
    fn test_namespaced_segments() {
        let path = parse("/ns:order/@ns:id");
        let order = &path.segments()[0];
        assert_eq!(order.prefix.as_deref(), Some("ns"));
        assert_eq!(order.name, "order");
        assert!(!order.attribute);

        let id = &path.segments()[1];
        assert!(id.attribute);
        assert_eq!(id.prefix.as_deref(), Some("ns"));
        assert_eq!(id.name, "id");
    }

    #[test]
    fn test_malformed_paths() {
        for bad in ["/a//b", "/a/", "//", "/a[x]", "/a[1", "/[1]", "/@", "/ns:", "/:a", "/a:b:c", "/@a[0]", "/a]b"] {
            assert!(PathParser::new(bad).parse().is_err(), "expected '{}' to fail", bad);
        }
    }

    #[test]
    fn test_error_position() {
        let err = PathParser::new("/a//b").parse().unwrap_err();
        assert_eq!(err.position(), Some(3));

        let err = PathParser::new("/abc/d[x]").parse().unwrap_err();
        assert_eq!(err.position(), Some(7));
    }
}
