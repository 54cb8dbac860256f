//! Mapping definitions
//!
//! A mapping definition names its data sources, the entries relating their
//! fields, lookup tables and properties. It is plain serde data with
//! camelCase keys, loadable from JSON or YAML.
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

pub mod loader;
pub mod model;

pub use loader::{load_mapping_from_bytes, load_mapping_from_file, load_mapping_from_str};
pub use model::{
    AtlasMapping, DataSource, DataSourceType, LookupEntry, LookupTable, MappingEntry, MappingType,
    NamespaceDeclaration, StringDelimiter,
};
