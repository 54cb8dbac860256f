//! Shared, immutable mapping context
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

use super::session::AtlasSession;
use crate::config::EngineConfig;
use crate::conversion::ConversionRegistry;
use crate::document::{FormatModule, ModuleRegistry};
use crate::error::{Error, Result};
use crate::mapping::{load_mapping_from_file, AtlasMapping};
use crate::types::DocumentFormat;
use crate::validation::{MappingValidator, Validation};
use log::debug;
use std::path::Path;
use std::sync::Arc;

/// Everything a mapping pass needs that does not change between passes
///
/// The context holds the mapping definition, the conversion and format
/// module registries and the engine configuration. It is never mutated
/// after construction, so one context can serve sessions on many threads.
#[derive(Debug, Clone)]
pub struct AtlasContext {
    mapping: AtlasMapping,
    conversions: Arc<ConversionRegistry>,
    modules: Arc<ModuleRegistry>,
    config: EngineConfig,
}

impl AtlasContext {
    /// Context with the default configuration and registries
    pub fn new(mapping: AtlasMapping) -> Result<Self> {
        Self::with_config(mapping, EngineConfig::default())
    }

    /// Context whose conversion registry follows `config`
    pub fn with_config(mapping: AtlasMapping, config: EngineConfig) -> Result<Self> {
        let conversions = ConversionRegistry::from_config(&config.conversion)?;
        Ok(Self::with_registries(
            mapping,
            config,
            Arc::new(conversions),
            Arc::new(ModuleRegistry::with_defaults()),
        ))
    }

    /// Context sharing registries built elsewhere
    pub fn with_registries(
        mapping: AtlasMapping,
        config: EngineConfig,
        conversions: Arc<ConversionRegistry>,
        modules: Arc<ModuleRegistry>,
    ) -> Self {
        debug!(
            "Created context for mapping '{}' ({} entries)",
            mapping.name,
            mapping.mappings.len()
        );
        Self {
            mapping,
            conversions,
            modules,
            config,
        }
    }

    /// Load a mapping definition file and build a default context for it
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(load_mapping_from_file(path)?)
    }

    pub fn mapping(&self) -> &AtlasMapping {
        &self.mapping
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn conversions(&self) -> &ConversionRegistry {
        &self.conversions
    }

    pub fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    /// Module registered for `format`
    pub fn module(&self, format: DocumentFormat) -> Result<Arc<dyn FormatModule>> {
        self.modules.get(format).ok_or_else(|| Error::Configuration {
            message: format!("No format module registered for '{}'", format),
            source: None,
        })
    }

    /// Validate the mapping definition without processing any document
    pub fn validate(&self) -> Vec<Validation> {
        MappingValidator::new(&self.mapping, &self.conversions).validate()
    }

    /// Start a new session against this context
    pub fn create_session(&self) -> AtlasSession<'_> {
        AtlasSession::new(self)
    }

    /// Run one mapping pass for `session`
    pub fn process(&self, session: &mut AtlasSession<'_>) -> Result<()> {
        if !std::ptr::eq(session.context(), self) {
            return Err(Error::Configuration {
                message: "Session was created by a different context".to_string(),
                source: None,
            });
        }
        session.process()
    }
}
