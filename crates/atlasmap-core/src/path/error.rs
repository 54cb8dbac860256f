//! Error types for field path parsing
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

use thiserror::Error;

/// Field path syntax error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed path '{path}'{}: {message}", at_position(.position))]
pub struct PathError {
    path: String,
    message: String,
    position: Option<usize>,
}

fn at_position(position: &Option<usize>) -> String {
    position
        .map(|p| format!(" at position {}", p))
        .unwrap_or_default()
}

impl PathError {
    pub fn new(path: impl Into<String>, message: impl Into<String>, position: Option<usize>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            position,
        }
    }

    /// Error for a segment with no name where one is required
    pub fn empty_segment(path: &str, position: usize) -> Self {
        Self::new(path, "segment name cannot be empty", Some(position))
    }

    /// Error for an index that is not an integer
    pub fn invalid_index(path: &str, index: &str, position: usize) -> Self {
        Self::new(
            path,
            format!("index '{}' is not an integer", index),
            Some(position),
        )
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_position() {
        let err = PathError::empty_segment("/a//b", 3);
        assert_eq!(
            err.to_string(),
            "Malformed path '/a//b' at position 3: segment name cannot be empty"
        );
    }

    #[test]
    fn test_display_without_position() {
        let err = PathError::new("x", "bad", None);
        assert_eq!(err.to_string(), "Malformed path 'x': bad");
    }
}
