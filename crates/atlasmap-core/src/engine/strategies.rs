//! COMBINE, SEPARATE and LOOKUP value strategies
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

use crate::conversion::{ConversionError, ConversionRegistry};
use crate::error::{Error, Result};
use crate::mapping::{LookupEntry, LookupTable, StringDelimiter};
use crate::types::{Field, FieldType, FieldValue};

/// Text form of a value, converted through the registry
pub(crate) fn text_of(
    registry: &ConversionRegistry,
    value: &FieldValue,
) -> std::result::Result<String, ConversionError> {
    match registry.convert_value(value, FieldType::String)? {
        FieldValue::String(text) => Ok(text),
        other => Ok(other.to_string()),
    }
}

/// Join input values ordered by index
///
/// Inputs without an index take their position in the list. Positions no
/// input fills, and inputs without a value, contribute empty parts.
/// Returns `None` when no input has a value. An index above `max_index` is
/// an error.
pub(crate) fn combine(
    registry: &ConversionRegistry,
    inputs: &[Field],
    delimiter: StringDelimiter,
    max_index: usize,
) -> Result<Option<String>> {
    if inputs.iter().all(|field| field.value.is_none()) {
        return Ok(None);
    }

    let mut parts: Vec<String> = Vec::new();
    for (position, field) in inputs.iter().enumerate() {
        let index = field.index.unwrap_or(position);
        let len = match index.checked_add(1) {
            Some(len) if index <= max_index => len,
            _ => {
                return Err(Error::structural(
                    format!(
                        "COMBINE input index {} exceeds the maximum collection index {}",
                        index, max_index
                    ),
                    None,
                ))
            }
        };
        if parts.len() < len {
            parts.resize(len, String::new());
        }
        if let Some(value) = &field.value {
            parts[index] = text_of(registry, value)?;
        }
    }
    Ok(Some(delimiter.join(&parts)))
}

/// Parts of a separated value; output `i` receives part `i`
pub(crate) fn separate(text: &str, delimiter: StringDelimiter) -> Vec<String> {
    delimiter.split(text)
}

/// Table entry for `source`
pub(crate) fn lookup<'t>(table: &'t LookupTable, source: &str) -> Option<&'t LookupEntry> {
    table.lookup(source)
}

/// Target value of a lookup entry, typed by its declared target type
pub(crate) fn lookup_value(
    registry: &ConversionRegistry,
    entry: &LookupEntry,
) -> std::result::Result<FieldValue, ConversionError> {
    let value = FieldValue::String(entry.target_value.clone());
    match entry.target_type {
        Some(target) if target != FieldType::String => registry.convert_value(&value, target),
        _ => Ok(value),
    }
}
