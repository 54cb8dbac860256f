//! BOOLEAN source conversions
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

use super::numeric::{convert_numeric, Numeric};
use super::types::{ConversionConcern, ConversionContext, ConversionError, ConversionRule};
use crate::types::{FieldType, FieldValue};

fn convert(
    value: &FieldValue,
    target: FieldType,
    _context: &ConversionContext<'_>,
) -> Result<FieldValue, ConversionError> {
    let flag = match value {
        FieldValue::Boolean(flag) => *flag,
        other => return Err(ConversionError::unsupported(other.field_type(), target)),
    };
    match target {
        FieldType::Char => Ok(FieldValue::Char(if flag { '1' } else { '0' })),
        FieldType::String => Ok(FieldValue::String(flag.to_string())),
        _ => convert_numeric(Numeric::Integral(i128::from(flag)), value, target),
    }
}

pub(super) fn rules() -> Vec<ConversionRule> {
    FieldType::PRIMITIVES
        .iter()
        .filter(|target| **target != FieldType::Boolean)
        .map(|target| {
            let concerns: &[ConversionConcern] = if *target == FieldType::String {
                &[]
            } else {
                &[ConversionConcern::Convention]
            };
            ConversionRule::new(FieldType::Boolean, *target, concerns, convert)
        })
        .collect()
}
