//! Conversion registry
//!
//! The registry is built once per process (or per context) and shared by
//! reference. Every (source, target) pairing is an individual rule that can
//! be queried for its concerns before any document is processed.
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

use super::types::{
    BooleanPatterns, ConversionConcern, ConversionContext, ConversionError, ConversionRule,
};
use super::{boolean, character, numeric, string};
use crate::config::ConversionConfig;
use crate::error::{Error, Result};
use crate::types::{FieldType, FieldValue};
use log::debug;
use regex::Regex;
use std::collections::BTreeMap;

/// Registry of conversion rules keyed by (source, target)
#[derive(Debug, Clone)]
pub struct ConversionRegistry {
    rules: BTreeMap<(FieldType, FieldType), ConversionRule>,
    patterns: BooleanPatterns,
}

fn anchored(name: &str, pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| Error::Configuration {
        message: format!("Invalid {} pattern '{}': {}", name, pattern, e),
        source: Some(anyhow::Error::new(e)),
    })
}

impl ConversionRegistry {
    /// Build the registry with all built-in rules and the given conventions
    pub fn from_config(config: &ConversionConfig) -> Result<Self> {
        let patterns = BooleanPatterns {
            char_true: anchored("char true", &config.char_true_pattern)?,
            string_true: anchored("string true", &config.string_true_pattern)?,
            string_false: anchored("string false", &config.string_false_pattern)?,
        };

        let mut registry = Self {
            rules: BTreeMap::new(),
            patterns,
        };
        for rule in boolean::rules()
            .into_iter()
            .chain(character::rules())
            .chain(numeric::rules())
            .chain(string::rules())
        {
            registry.register(rule);
        }
        Ok(registry)
    }

    /// Build the registry with the default conventions
    pub fn with_defaults() -> Result<Self> {
        Self::from_config(&ConversionConfig::default())
    }

    /// Register a rule, replacing any existing rule for the same pairing
    pub fn register(&mut self, rule: ConversionRule) {
        self.rules.insert((rule.source, rule.target), rule);
    }

    pub fn find_rule(&self, source: FieldType, target: FieldType) -> Option<&ConversionRule> {
        self.rules.get(&(source, target))
    }

    /// All registered rules, ordered by (source, target)
    pub fn rules(&self) -> impl Iterator<Item = &ConversionRule> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn is_supported(&self, source: FieldType, target: FieldType) -> bool {
        source == target || self.rules.contains_key(&(source, target))
    }

    /// Concerns of converting `source` to `target`
    ///
    /// Same-type conversions have no concerns; a pairing without a rule is
    /// reported as UNSUPPORTED.
    pub fn concerns(&self, source: FieldType, target: FieldType) -> Vec<ConversionConcern> {
        if source == target {
            return Vec::new();
        }
        match self.find_rule(source, target) {
            Some(rule) => rule.concerns.clone(),
            None => vec![ConversionConcern::Unsupported],
        }
    }

    /// Human-readable diagnostics for a pairing, one per concern
    pub fn describe(&self, source: FieldType, target: FieldType) -> Vec<String> {
        let concerns = self.concerns(source, target);
        if concerns.is_empty() {
            return vec![ConversionConcern::None.describe(source, target)];
        }
        concerns
            .iter()
            .map(|concern| concern.describe(source, target))
            .collect()
    }

    /// The field type a runtime value is an instance of
    pub fn field_type_from_value(value: &FieldValue) -> FieldType {
        value.field_type()
    }

    /// Convert an optional value from `source` to `target`
    pub fn convert(
        &self,
        value: Option<&FieldValue>,
        source: FieldType,
        target: FieldType,
    ) -> std::result::Result<Option<FieldValue>, ConversionError> {
        self.convert_with_format(value, source, target, None, None)
    }

    /// Convert with explicit source and target formats
    ///
    /// A missing value converts to a missing value. When the runtime value
    /// disagrees with the declared `source`, the runtime type is used.
    pub fn convert_with_format(
        &self,
        value: Option<&FieldValue>,
        source: FieldType,
        target: FieldType,
        source_format: Option<&str>,
        target_format: Option<&str>,
    ) -> std::result::Result<Option<FieldValue>, ConversionError> {
        let value = match value {
            Some(value) => value,
            None => return Ok(None),
        };

        let actual = value.field_type();
        if actual != source {
            debug!(
                "Declared source type {} differs from value type {}, converting from {}",
                source, actual, actual
            );
        }
        if actual == target {
            return Ok(Some(value.clone()));
        }

        let rule = self
            .find_rule(actual, target)
            .ok_or_else(|| ConversionError::unsupported(actual, target))?;
        let context = ConversionContext {
            source_format,
            target_format,
            patterns: &self.patterns,
        };
        rule.apply(value, &context).map(Some)
    }

    /// Convert a present value to `target`, using its own type as source
    pub fn convert_value(
        &self,
        value: &FieldValue,
        target: FieldType,
    ) -> std::result::Result<FieldValue, ConversionError> {
        let converted = self.convert(Some(value), value.field_type(), target)?;
        converted.ok_or_else(|| {
            ConversionError::new(
                ConversionConcern::Unsupported,
                value.field_type(),
                target,
                "conversion produced no value",
            )
        })
    }
}
