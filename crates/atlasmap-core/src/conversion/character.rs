//! CHAR source conversions
//!
//! Numeric targets receive the code point. BOOLEAN follows the configured
//! true pattern, which a non-empty source format replaces for the call.
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

use super::numeric::{convert_numeric, Numeric};
use super::types::{ConversionConcern, ConversionContext, ConversionError, ConversionRule};
use crate::types::{FieldType, FieldValue};
use regex::Regex;

fn convert(
    value: &FieldValue,
    target: FieldType,
    context: &ConversionContext<'_>,
) -> Result<FieldValue, ConversionError> {
    let c = match value {
        FieldValue::Char(c) => *c,
        other => return Err(ConversionError::unsupported(other.field_type(), target)),
    };
    match target {
        FieldType::Boolean => {
            let text = c.to_string();
            let matched = match context.source_format() {
                Some(pattern) => Regex::new(&format!("^(?:{})$", pattern))
                    .map_err(|e| {
                        ConversionError::format(
                            FieldType::Char,
                            target,
                            format!("Invalid boolean pattern '{}': {}", pattern, e),
                        )
                    })?
                    .is_match(&text),
                None => context.patterns.char_true.is_match(&text),
            };
            Ok(FieldValue::Boolean(matched))
        }
        FieldType::Byte if u32::from(c) > 127 => Err(ConversionError::range(
            FieldType::Char,
            target,
            format!("Character value {} is greater than BYTE.MAX_VALUE", c),
        )),
        FieldType::String => Ok(FieldValue::String(c.to_string())),
        _ => convert_numeric(Numeric::Integral(i128::from(u32::from(c))), value, target),
    }
}

fn concerns(target: FieldType) -> &'static [ConversionConcern] {
    match target {
        FieldType::Boolean => &[ConversionConcern::Convention],
        FieldType::Byte => &[ConversionConcern::Range],
        FieldType::Short => &[ConversionConcern::Range, ConversionConcern::Convention],
        _ => &[],
    }
}

pub(super) fn rules() -> Vec<ConversionRule> {
    FieldType::PRIMITIVES
        .iter()
        .filter(|target| **target != FieldType::Char)
        .map(|target| ConversionRule::new(FieldType::Char, *target, concerns(*target), convert))
        .collect()
}
