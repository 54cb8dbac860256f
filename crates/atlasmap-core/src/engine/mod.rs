//! Mapping execution engine
//!
//! An [`AtlasContext`] holds what every pass shares: the mapping definition,
//! the conversion registry, the format modules and the configuration. An
//! [`AtlasSession`] holds what one pass owns: input documents, properties,
//! audits and outputs.
//!
//! A pass validates the mapping (when enabled), then processes entries in
//! definition order. For each entry the input pass resolves input field
//! values through a pass-scoped reader cache, and the output pass runs the
//! MAP, COMBINE, SEPARATE or LOOKUP strategy, converts to the output type,
//! applies field actions and writes the result.
//!
//! # Examples
//!
//! ```
//! use atlasmap_core::engine::AtlasContext;
//! use atlasmap_core::mapping::{AtlasMapping, DataSource, MappingEntry};
//! use atlasmap_core::{Document, DocumentFormat, Field};
//!
//! let mut mapping = AtlasMapping::new("cars");
//! mapping.data_sources.push(DataSource::source("in", DocumentFormat::Json));
//! mapping.data_sources.push(DataSource::target("out", DocumentFormat::Json));
//! mapping.mappings.push(MappingEntry::map(
//!     Field::at("/doors").unwrap().with_doc_id("in"),
//!     Field::at("/car/doors").unwrap().with_doc_id("out"),
//! ));
//!
//! let context = AtlasContext::new(mapping).unwrap();
//! let mut session = context.create_session();
//! session.set_input("in", Document::text(r#"{"doors": 5}"#));
//! session.process().unwrap();
//!
//! assert_eq!(
//!     session.output("out"),
//!     Some(&Document::text(r#"{"car":{"doors":5}}"#))
//! );
//! ```
//!
//! Copyright (c) 2025 AtlasMap Team
//! Licensed under the Apache-2.0 license

mod context;
mod input;
mod output;
mod session;
mod strategies;

pub use context::AtlasContext;
pub use session::AtlasSession;
