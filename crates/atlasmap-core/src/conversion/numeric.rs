//! Numeric conversions
//!
//! Every numeric source (and the numeric side of CHAR and BOOLEAN) is lifted
//! into a [`Numeric`] and narrowed from there. Floating and decimal values
//! only convert to integral targets when they are whole numbers inside the
//! target range.
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

use super::types::{ConversionConcern, ConversionContext, ConversionError, ConversionRule};
use crate::types::{FieldType, FieldValue};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::str::FromStr;

const NO_CONCERNS: &[ConversionConcern] = &[];
const RANGE: &[ConversionConcern] = &[ConversionConcern::Range];
const CONVENTION: &[ConversionConcern] = &[ConversionConcern::Convention];
const RANGE_CONVENTION: &[ConversionConcern] =
    &[ConversionConcern::Range, ConversionConcern::Convention];

/// Source types handled by [`convert`]
pub(super) const NUMERIC_SOURCES: [FieldType; 8] = [
    FieldType::Byte,
    FieldType::Short,
    FieldType::Integer,
    FieldType::Long,
    FieldType::Float,
    FieldType::Double,
    FieldType::Decimal,
    FieldType::Number,
];

/// Numeric value lifted out of a [`FieldValue`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum Numeric {
    Integral(i128),
    Floating(f64),
    Exact(Decimal),
}

impl Numeric {
    pub(super) fn of(value: &FieldValue) -> Option<Numeric> {
        match value {
            FieldValue::Byte(v) => Some(Numeric::Integral(i128::from(*v))),
            FieldValue::Short(v) => Some(Numeric::Integral(i128::from(*v))),
            FieldValue::Integer(v) => Some(Numeric::Integral(i128::from(*v))),
            FieldValue::Long(v) => Some(Numeric::Integral(i128::from(*v))),
            FieldValue::Char(c) => Some(Numeric::Integral(i128::from(u32::from(*c)))),
            FieldValue::Float(v) => Some(Numeric::Floating(f64::from(*v))),
            FieldValue::Double(v) => Some(Numeric::Floating(*v)),
            FieldValue::Decimal(d) => Some(Numeric::Exact(*d)),
            FieldValue::Number(n) => Some(if let Some(i) = n.as_i64() {
                Numeric::Integral(i128::from(i))
            } else if let Some(u) = n.as_u64() {
                Numeric::Integral(i128::from(u))
            } else {
                Numeric::Floating(n.as_f64().unwrap_or(f64::NAN))
            }),
            FieldValue::Boolean(_) | FieldValue::String(_) | FieldValue::Complex(_) => None,
        }
    }

    fn is_zero(&self) -> bool {
        match self {
            Numeric::Integral(i) => *i == 0,
            Numeric::Floating(v) => *v == 0.0,
            Numeric::Exact(d) => d.is_zero(),
        }
    }

    /// The value as a whole number, failing on fractions and non-finite values
    fn whole(&self, source: FieldType, target: FieldType, shown: &str) -> Result<i128, ConversionError> {
        let not_whole = || {
            ConversionError::range(
                source,
                target,
                format!("{} {} is not a whole number", source, shown),
            )
        };
        match self {
            Numeric::Integral(i) => Ok(*i),
            Numeric::Floating(v) => {
                if !v.is_finite() || v.fract() != 0.0 {
                    Err(not_whole())
                } else {
                    Ok(*v as i128)
                }
            }
            Numeric::Exact(d) => {
                if !d.fract().is_zero() {
                    return Err(not_whole());
                }
                d.to_i128().ok_or_else(|| out_of_range(source, target, shown))
            }
        }
    }
}

fn out_of_range(source: FieldType, target: FieldType, shown: &str) -> ConversionError {
    ConversionError::range(
        source,
        target,
        format!(
            "{} {} is greater than {}.MAX_VALUE or less than {}.MIN_VALUE",
            source, shown, target, target
        ),
    )
}

/// Narrow or widen `numeric`, which was lifted from `value`, to `target`
pub(super) fn convert_numeric(
    numeric: Numeric,
    value: &FieldValue,
    target: FieldType,
) -> Result<FieldValue, ConversionError> {
    let source = value.field_type();
    let shown = value.to_string();
    let range = || out_of_range(source, target, &shown);

    match target {
        FieldType::Boolean => Ok(FieldValue::Boolean(!numeric.is_zero())),
        FieldType::Byte => {
            let whole = numeric.whole(source, target, &shown)?;
            i8::try_from(whole).map(FieldValue::Byte).map_err(|_| range())
        }
        FieldType::Short => {
            let whole = numeric.whole(source, target, &shown)?;
            i16::try_from(whole).map(FieldValue::Short).map_err(|_| range())
        }
        FieldType::Integer => {
            let whole = numeric.whole(source, target, &shown)?;
            i32::try_from(whole).map(FieldValue::Integer).map_err(|_| range())
        }
        FieldType::Long => {
            let whole = numeric.whole(source, target, &shown)?;
            i64::try_from(whole).map(FieldValue::Long).map_err(|_| range())
        }
        FieldType::Char => {
            let whole = numeric.whole(source, target, &shown)?;
            u32::try_from(whole)
                .ok()
                .filter(|code| *code <= 0xFFFF)
                .and_then(char::from_u32)
                .map(FieldValue::Char)
                .ok_or_else(range)
        }
        FieldType::Float => match numeric {
            Numeric::Integral(i) => Ok(FieldValue::Float(i as f32)),
            Numeric::Floating(v) => {
                if v.is_finite() && v.abs() > f64::from(f32::MAX) {
                    Err(range())
                } else {
                    Ok(FieldValue::Float(v as f32))
                }
            }
            Numeric::Exact(d) => d.to_f32().map(FieldValue::Float).ok_or_else(range),
        },
        FieldType::Double => match numeric {
            Numeric::Integral(i) => Ok(FieldValue::Double(i as f64)),
            Numeric::Floating(v) => Ok(FieldValue::Double(v)),
            Numeric::Exact(d) => d.to_f64().map(FieldValue::Double).ok_or_else(range),
        },
        FieldType::Decimal => match numeric {
            Numeric::Integral(i) => Decimal::try_from_i128_with_scale(i, 0)
                .map(FieldValue::Decimal)
                .map_err(|_| range()),
            Numeric::Floating(v) => {
                if !v.is_finite() {
                    return Err(range());
                }
                Decimal::from_str(&v.to_string())
                    .ok()
                    .or_else(|| Decimal::from_f64(v))
                    .map(FieldValue::Decimal)
                    .ok_or_else(range)
            }
            Numeric::Exact(d) => Ok(FieldValue::Decimal(d)),
        },
        FieldType::Number => match numeric {
            Numeric::Integral(i) => integral_number(i).ok_or_else(range),
            Numeric::Floating(v) => serde_json::Number::from_f64(v)
                .map(FieldValue::Number)
                .ok_or_else(range),
            Numeric::Exact(d) if d.fract().is_zero() => {
                d.to_i128().and_then(integral_number).ok_or_else(range)
            }
            Numeric::Exact(d) => d
                .to_f64()
                .and_then(serde_json::Number::from_f64)
                .map(FieldValue::Number)
                .ok_or_else(range),
        },
        FieldType::String => Ok(FieldValue::String(shown.clone())),
        FieldType::Complex | FieldType::Unsupported | FieldType::None => {
            Err(ConversionError::unsupported(source, target))
        }
    }
}

fn integral_number(i: i128) -> Option<FieldValue> {
    if let Ok(v) = i64::try_from(i) {
        Some(FieldValue::Number(serde_json::Number::from(v)))
    } else {
        u64::try_from(i)
            .ok()
            .map(|v| FieldValue::Number(serde_json::Number::from(v)))
    }
}

fn integral_width(field_type: FieldType) -> Option<u8> {
    match field_type {
        FieldType::Byte => Some(8),
        FieldType::Short => Some(16),
        FieldType::Integer => Some(32),
        FieldType::Long => Some(64),
        _ => None,
    }
}

/// Concerns of converting one numeric type to another primitive
fn concerns(source: FieldType, target: FieldType) -> &'static [ConversionConcern] {
    match target {
        FieldType::Boolean => CONVENTION,
        FieldType::Char => RANGE_CONVENTION,
        FieldType::Byte | FieldType::Short | FieldType::Integer | FieldType::Long => {
            match (integral_width(source), integral_width(target)) {
                (Some(from), Some(to)) if from <= to => NO_CONCERNS,
                _ => RANGE,
            }
        }
        FieldType::Float => match source {
            FieldType::Double | FieldType::Decimal | FieldType::Number => RANGE,
            _ => NO_CONCERNS,
        },
        FieldType::Decimal | FieldType::Number => match source {
            FieldType::Float | FieldType::Double => RANGE,
            _ => NO_CONCERNS,
        },
        _ => NO_CONCERNS,
    }
}

fn convert(
    value: &FieldValue,
    target: FieldType,
    _context: &ConversionContext<'_>,
) -> Result<FieldValue, ConversionError> {
    let numeric = Numeric::of(value)
        .ok_or_else(|| ConversionError::unsupported(value.field_type(), target))?;
    convert_numeric(numeric, value, target)
}

/// Rules for every numeric source to every other primitive
pub(super) fn rules() -> Vec<ConversionRule> {
    NUMERIC_SOURCES
        .iter()
        .flat_map(|source| {
            FieldType::PRIMITIVES
                .iter()
                .filter(move |target| *target != source)
                .map(move |target| {
                    ConversionRule::new(*source, *target, concerns(*source, *target), convert)
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn narrow(value: FieldValue, target: FieldType) -> Result<FieldValue, ConversionError> {
        convert_numeric(Numeric::of(&value).unwrap(), &value, target)
    }

    #[test]
    fn test_whole_double_to_byte() {
        assert_eq!(narrow(FieldValue::Double(5.0), FieldType::Byte), Ok(FieldValue::Byte(5)));
        assert_eq!(
            narrow(FieldValue::Double(-128.0), FieldType::Byte),
            Ok(FieldValue::Byte(-128))
        );
    }

    #[test]
    fn test_double_to_byte_out_of_range() {
        let err = narrow(FieldValue::Double(300.0), FieldType::Byte).unwrap_err();
        assert_eq!(err.concern, ConversionConcern::Range);
        assert!(err.message.contains("300.0"));
    }

    #[test]
    fn test_fractional_to_integral_fails() {
        for target in [FieldType::Byte, FieldType::Short, FieldType::Integer, FieldType::Long] {
            let err = narrow(FieldValue::Double(2.5), target).unwrap_err();
            assert_eq!(err.concern, ConversionConcern::Range);
        }
        let err = narrow(FieldValue::Decimal(Decimal::new(15, 1)), FieldType::Integer).unwrap_err();
        assert_eq!(err.concern, ConversionConcern::Range);
        assert!(err.message.contains("not a whole number"));
    }

    #[test]
    fn test_char_boundaries() {
        assert_eq!(narrow(FieldValue::Integer(65), FieldType::Char), Ok(FieldValue::Char('A')));
        assert!(narrow(FieldValue::Integer(-1), FieldType::Char).is_err());
        assert!(narrow(FieldValue::Double(70_000.0), FieldType::Char).is_err());
        assert_eq!(narrow(FieldValue::Char('é'), FieldType::Short), Ok(FieldValue::Short(233)));
    }

    #[test]
    fn test_double_to_float_range() {
        assert!(narrow(FieldValue::Double(1e300), FieldType::Float).is_err());
        assert_eq!(narrow(FieldValue::Double(-1.5), FieldType::Float), Ok(FieldValue::Float(-1.5)));
    }

    #[test]
    fn test_boolean_convention() {
        assert_eq!(narrow(FieldValue::Double(0.0), FieldType::Boolean), Ok(FieldValue::Boolean(false)));
        assert_eq!(narrow(FieldValue::Long(-3), FieldType::Boolean), Ok(FieldValue::Boolean(true)));
    }

    #[test]
    fn test_number_and_decimal_targets() {
        assert_eq!(
            narrow(FieldValue::Long(42), FieldType::Number),
            Ok(FieldValue::Number(serde_json::Number::from(42)))
        );
        assert_eq!(
            narrow(FieldValue::Double(1.25), FieldType::Decimal),
            Ok(FieldValue::Decimal(Decimal::new(125, 2)))
        );
        assert!(narrow(FieldValue::Double(f64::NAN), FieldType::Decimal).is_err());
    }

    #[test]
    fn test_rule_concerns() {
        assert_eq!(concerns(FieldType::Integer, FieldType::Long), NO_CONCERNS);
        assert_eq!(concerns(FieldType::Long, FieldType::Integer), RANGE);
        assert_eq!(concerns(FieldType::Double, FieldType::Byte), RANGE);
        assert_eq!(concerns(FieldType::Double, FieldType::Boolean), CONVENTION);
    }
}
