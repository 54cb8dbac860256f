//! Engine configuration
//!
//! Configuration is plain serde data with defaults for every field, loadable
//! from JSON or YAML text or from a file whose extension selects the format.
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default char to boolean true pattern
pub const DEFAULT_CHAR_TRUE_PATTERN: &str = "t|T|y|Y|1";
/// Default string to boolean true pattern
pub const DEFAULT_STRING_TRUE_PATTERN: &str = "true|True|TRUE|t|T|yes|Yes|YES|y|Y|1";
/// Default string to boolean false pattern
pub const DEFAULT_STRING_FALSE_PATTERN: &str = "false|False|FALSE|f|F|no|No|NO|n|N|0";
/// Default largest collection index a write may grow a collection to
pub const DEFAULT_MAX_COLLECTION_INDEX: usize = 65_535;

/// Text format of a configuration file or mapping definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml)
    Yaml,
}

impl DefinitionFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("json") => Ok(DefinitionFormat::Json),
            Some("yaml") | Some("yml") => Ok(DefinitionFormat::Yaml),
            _ => Err(Error::Configuration {
                message: format!("Unsupported file format: {}", path.display()),
                source: None,
            }),
        }
    }

    /// Deserialize `text` in this format
    pub fn parse<T: DeserializeOwned>(&self, text: &str) -> Result<T> {
        match self {
            DefinitionFormat::Json => Ok(serde_json::from_str(text)?),
            DefinitionFormat::Yaml => Ok(serde_yaml::from_str(text)?),
        }
    }
}

/// Main engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Conversion conventions
    pub conversion: ConversionConfig,

    /// Run mapping validation before the input pass
    pub validate_mapping: bool,

    /// XML output settings
    pub xml: XmlConfig,

    /// Largest index a writer or COMBINE may grow a collection to
    pub max_collection_index: usize,
}

/// Boolean conventions used by the conversion registry
///
/// Patterns match the whole value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Characters that convert to `true`
    pub char_true_pattern: String,

    /// Strings that convert to `true`
    pub string_true_pattern: String,

    /// Strings that convert to `false`
    pub string_false_pattern: String,
}

/// XML writer settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmlConfig {
    /// Prefix output with `<?xml version="1.0" encoding="UTF-8"?>`
    pub write_declaration: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            conversion: ConversionConfig::default(),
            validate_mapping: true,
            xml: XmlConfig::default(),
            max_collection_index: DEFAULT_MAX_COLLECTION_INDEX,
        }
    }
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            char_true_pattern: DEFAULT_CHAR_TRUE_PATTERN.to_string(),
            string_true_pattern: DEFAULT_STRING_TRUE_PATTERN.to_string(),
            string_false_pattern: DEFAULT_STRING_FALSE_PATTERN.to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse configuration text
    pub fn from_text(text: &str, format: DefinitionFormat) -> Result<Self> {
        format.parse(text)
    }

    /// Load configuration from a `.json`, `.yaml` or `.yml` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = DefinitionFormat::from_path(path)?;
        let text = std::fs::read_to_string(path)?;
        Self::from_text(&text, format)
    }
}
