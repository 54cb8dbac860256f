//! Type conversion
//!
//! Converts field values between the engine's field types. Each (source,
//! target) pairing is a registered [`ConversionRule`] tagged with the
//! [`ConversionConcern`]s that describe how it can fail; conversions either
//! produce a value of the target type or fail with a [`ConversionError`].
//!
//! # Examples
//!
//! ```
//! use atlasmap_core::conversion::ConversionRegistry;
//! use atlasmap_core::{FieldType, FieldValue};
//!
//! let registry = ConversionRegistry::with_defaults().unwrap();
//! let byte = registry.convert_value(&FieldValue::Double(5.0), FieldType::Byte).unwrap();
//! assert_eq!(byte, FieldValue::Byte(5));
//! ```
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

mod boolean;
mod character;
mod numeric;
pub mod registry;
mod string;
pub mod types;


pub use registry::ConversionRegistry;
pub use types::{
    BooleanPatterns, ConversionConcern, ConversionContext, ConversionError, ConversionRule,
    Converter,
};
