//! Ordered application of field actions
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

use super::{ActionError, FieldAction};
use crate::types::FieldValue;
use log::debug;

/// Applies chains of field actions to values
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionProcessor;

impl ActionProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Apply `actions` in order, stopping at the first failure
    pub fn process<'a>(
        &self,
        actions: impl IntoIterator<Item = &'a FieldAction>,
        value: FieldValue,
    ) -> Result<FieldValue, ActionError> {
        let mut value = value;
        for action in actions {
            debug!("Applying field action {}", action);
            value = self.apply(action, &value)?;
        }
        Ok(value)
    }

    /// Apply a single action
    pub fn apply(&self, action: &FieldAction, value: &FieldValue) -> Result<FieldValue, ActionError> {
        let text = match action {
            FieldAction::AbsoluteValue => return absolute(value),
            _ => textual(action, value)?,
        };
        let result = match action {
            FieldAction::Uppercase => text.to_uppercase(),
            FieldAction::Lowercase => text.to_lowercase(),
            FieldAction::Capitalize => {
                let mut chars = text.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
            FieldAction::Trim => text.trim().to_string(),
            FieldAction::TrimLeft => text.trim_start().to_string(),
            FieldAction::TrimRight => text.trim_end().to_string(),
            FieldAction::StringLength => {
                let length = text.chars().count();
                return i32::try_from(length)
                    .map(FieldValue::Integer)
                    .map_err(|_| ActionError::Overflow {
                        action: action.name(),
                        value: length.to_string(),
                    });
            }
            FieldAction::Append { string } => format!("{}{}", text, string),
            FieldAction::Prepend { string } => format!("{}{}", string, text),
            FieldAction::PadStringLeft {
                pad_character,
                pad_count,
            } => {
                let mut padded: String = std::iter::repeat(*pad_character).take(*pad_count).collect();
                padded.push_str(&text);
                padded
            }
            FieldAction::PadStringRight {
                pad_character,
                pad_count,
            } => {
                let mut padded = text;
                padded.extend(std::iter::repeat(*pad_character).take(*pad_count));
                padded
            }
            FieldAction::SubString {
                start_index,
                end_index,
            } => {
                let length = text.chars().count();
                let end = end_index.unwrap_or(length);
                if *start_index > end || end > length {
                    return Err(ActionError::Bounds {
                        start: *start_index,
                        end,
                        length,
                    });
                }
                text.chars().skip(*start_index).take(end - start_index).collect()
            }
            FieldAction::Replace {
                pattern,
                replacement,
            } => {
                if pattern.is_empty() {
                    return Err(ActionError::Parameters {
                        action: action.name(),
                        message: "match must not be empty".to_string(),
                    });
                }
                text.replace(pattern.as_str(), replacement)
            }
            FieldAction::SeparateByDash => separate(&text, '-', '_'),
            FieldAction::SeparateByUnderscore => separate(&text, '_', '-'),
            FieldAction::AbsoluteValue => return absolute(value),
        };
        Ok(FieldValue::String(result))
    }
}

/// Text an action works on; scalars use their display form
fn textual(action: &FieldAction, value: &FieldValue) -> Result<String, ActionError> {
    match value {
        FieldValue::Complex(_) => Err(ActionError::Complex {
            action: action.name(),
        }),
        other => Ok(other.to_string()),
    }
}

/// Replace separator characters with `separator`; `kept` is left alone
fn separate(text: &str, separator: char, kept: char) -> String {
    text.chars()
        .map(|c| {
            let is_separator = c.is_whitespace() || matches!(c, '+' | ':' | '=' | '.' | '_' | '-');
            if is_separator && c != kept {
                separator
            } else {
                c
            }
        })
        .collect()
}

fn absolute(value: &FieldValue) -> Result<FieldValue, ActionError> {
    let overflow = || ActionError::Overflow {
        action: "AbsoluteValue",
        value: value.to_string(),
    };
    let result = match value {
        FieldValue::Byte(v) => FieldValue::Byte(v.checked_abs().ok_or_else(overflow)?),
        FieldValue::Short(v) => FieldValue::Short(v.checked_abs().ok_or_else(overflow)?),
        FieldValue::Integer(v) => FieldValue::Integer(v.checked_abs().ok_or_else(overflow)?),
        FieldValue::Long(v) => FieldValue::Long(v.checked_abs().ok_or_else(overflow)?),
        FieldValue::Float(v) => FieldValue::Float(v.abs()),
        FieldValue::Double(v) => FieldValue::Double(v.abs()),
        FieldValue::Decimal(v) => FieldValue::Decimal(v.abs()),
        FieldValue::Number(n) => {
            let text = n.to_string();
            let magnitude = text.strip_prefix('-').unwrap_or(&text);
            FieldValue::Number(magnitude.parse().map_err(|_| overflow())?)
        }
        other => {
            return Err(ActionError::NotNumeric {
                action: "AbsoluteValue",
                value_type: other.field_type(),
            })
        }
    };
    Ok(result)
}

/// Apply `actions` in order with a default processor
pub fn apply_actions<'a>(
    actions: impl IntoIterator<Item = &'a FieldAction>,
    value: FieldValue,
) -> Result<FieldValue, ActionError> {
    ActionProcessor::new().process(actions, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldType;
    use pretty_assertions::assert_eq;

    fn string(s: &str) -> FieldValue {
        FieldValue::String(s.to_string())
    }

    fn apply(action: FieldAction, value: FieldValue) -> Result<FieldValue, ActionError> {
        ActionProcessor::new().apply(&action, &value)
    }

    #[test]
    fn test_case_and_trim() {
        assert_eq!(apply(FieldAction::Uppercase, string("abc")).unwrap(), string("ABC"));
        assert_eq!(apply(FieldAction::Capitalize, string("boston")).unwrap(), string("Boston"));
        assert_eq!(apply(FieldAction::Capitalize, string("")).unwrap(), string(""));
        assert_eq!(apply(FieldAction::TrimLeft, string("  a ")).unwrap(), string("a "));
        assert_eq!(apply(FieldAction::Trim, string("  a ")).unwrap(), string("a"));
    }

    #[test]
    fn test_padding_and_affixes() {
        let pad = FieldAction::PadStringLeft {
            pad_character: '0',
            pad_count: 3,
        };
        assert_eq!(apply(pad, string("7")).unwrap(), string("0007"));
        let append = FieldAction::Append {
            string: "!".into(),
        };
        assert_eq!(apply(append, FieldValue::Integer(5)).unwrap(), string("5!"));
    }

    #[test]
    fn test_substring_bounds() {
        let sub = FieldAction::SubString {
            start_index: 1,
            end_index: Some(3),
        };
        assert_eq!(apply(sub, string("héllo")).unwrap(), string("él"));

        let bad = FieldAction::SubString {
            start_index: 4,
            end_index: Some(9),
        };
        assert_eq!(
            apply(bad, string("abc")).unwrap_err(),
            ActionError::Bounds {
                start: 4,
                end: 9,
                length: 3
            }
        );
    }

    #[test]
    fn test_separators() {
        assert_eq!(
            apply(FieldAction::SeparateByDash, string("a b_c:d")).unwrap(),
            string("a-b-c-d")
        );
        assert_eq!(
            apply(FieldAction::SeparateByUnderscore, string("a-b c")).unwrap(),
            string("a_b_c")
        );
    }

    #[test]
    fn test_absolute_value() {
        assert_eq!(
            apply(FieldAction::AbsoluteValue, FieldValue::Integer(-4)).unwrap(),
            FieldValue::Integer(4)
        );
        assert!(matches!(
            apply(FieldAction::AbsoluteValue, FieldValue::Byte(i8::MIN)),
            Err(ActionError::Overflow { .. })
        ));
        assert_eq!(
            apply(FieldAction::AbsoluteValue, string("x")).unwrap_err(),
            ActionError::NotNumeric {
                action: "AbsoluteValue",
                value_type: FieldType::String
            }
        );
    }

    #[test]
    fn test_chain_in_order() {
        let actions = vec![
            FieldAction::Trim,
            FieldAction::Uppercase,
            FieldAction::Append { string: "-1".into() },
        ];
        assert_eq!(apply_actions(&actions, string(" ab ")).unwrap(), string("AB-1"));
        assert_eq!(
            apply_actions(&[FieldAction::StringLength], string("four")).unwrap(),
            FieldValue::Integer(4)
        );
    }

    #[test]
    fn test_complex_values_are_rejected() {
        assert!(matches!(
            apply(FieldAction::Uppercase, FieldValue::Complex("{}".into())),
            Err(ActionError::Complex { .. })
        ));
    }
}
