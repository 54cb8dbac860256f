//! STRING source conversions
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

use super::numeric::{convert_numeric, Numeric};
use super::types::{ConversionConcern, ConversionContext, ConversionError, ConversionRule};
use crate::types::{FieldType, FieldValue};
use rust_decimal::Decimal;
use std::num::IntErrorKind;
use std::str::FromStr;

fn not_a_number(text: &str, target: FieldType) -> ConversionError {
    ConversionError::format(
        FieldType::String,
        target,
        format!("String '{}' cannot be parsed as {}", text, target),
    )
}

/// Lift numeric text, keeping integers exact
fn parse_numeric(text: &str, target: FieldType) -> Result<Numeric, ConversionError> {
    let trimmed = text.trim();
    match trimmed.parse::<i128>() {
        Ok(i) => Ok(Numeric::Integral(i)),
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            Err(ConversionError::range(
                FieldType::String,
                target,
                format!("String '{}' is out of range for {}", text, target),
            ))
        }
        Err(_) => Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map(Numeric::Exact)
            .map_err(|_| not_a_number(text, target)),
    }
}

fn parse_floating(text: &str, target: FieldType) -> Result<f64, ConversionError> {
    let trimmed = text.trim();
    let value: f64 = trimmed.parse().map_err(|_| not_a_number(text, target))?;
    if value.is_infinite() && !trimmed.to_ascii_lowercase().contains("inf") {
        return Err(ConversionError::range(
            FieldType::String,
            target,
            format!("String '{}' is out of range for {}", text, target),
        ));
    }
    Ok(value)
}

fn convert(
    value: &FieldValue,
    target: FieldType,
    context: &ConversionContext<'_>,
) -> Result<FieldValue, ConversionError> {
    let text = match value {
        FieldValue::String(text) => text.as_str(),
        other => return Err(ConversionError::unsupported(other.field_type(), target)),
    };

    match target {
        FieldType::Boolean => {
            if context.patterns.string_true.is_match(text) {
                Ok(FieldValue::Boolean(true))
            } else if context.patterns.string_false.is_match(text) {
                Ok(FieldValue::Boolean(false))
            } else {
                Err(ConversionError::format(
                    FieldType::String,
                    target,
                    format!("String '{}' is neither a true nor a false value", text),
                ))
            }
        }
        FieldType::Char => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(FieldValue::Char(c)),
                (None, _) => Err(ConversionError::format(
                    FieldType::String,
                    target,
                    "Empty string cannot be converted to CHAR",
                )),
                (Some(_), Some(_)) => Err(ConversionError::range(
                    FieldType::String,
                    target,
                    format!("String '{}' is longer than one character", text),
                )),
            }
        }
        FieldType::Byte | FieldType::Short | FieldType::Integer | FieldType::Long => {
            convert_numeric(parse_numeric(text, target)?, value, target)
        }
        FieldType::Float | FieldType::Double => {
            convert_numeric(Numeric::Floating(parse_floating(text, target)?), value, target)
        }
        FieldType::Decimal => Decimal::from_str(text.trim())
            .or_else(|_| Decimal::from_scientific(text.trim()))
            .map(FieldValue::Decimal)
            .map_err(|_| not_a_number(text, target)),
        FieldType::Number => serde_json::from_str::<serde_json::Number>(text.trim())
            .map(FieldValue::Number)
            .map_err(|_| not_a_number(text, target)),
        FieldType::String => Ok(value.clone()),
        FieldType::Complex | FieldType::Unsupported | FieldType::None => {
            Err(ConversionError::unsupported(FieldType::String, target))
        }
    }
}

fn concerns(target: FieldType) -> &'static [ConversionConcern] {
    match target {
        FieldType::Boolean => &[ConversionConcern::Convention, ConversionConcern::Format],
        FieldType::Decimal | FieldType::Number => &[ConversionConcern::Format],
        _ => &[ConversionConcern::Format, ConversionConcern::Range],
    }
}

pub(super) fn rules() -> Vec<ConversionRule> {
    FieldType::PRIMITIVES
        .iter()
        .filter(|target| **target != FieldType::String)
        .map(|target| ConversionRule::new(FieldType::String, *target, concerns(*target), convert))
        .collect()
}
