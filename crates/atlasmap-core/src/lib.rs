//! AtlasMap Core - Data-mapping engine
//!
//! This crate reads field values out of source documents, converts and
//! transforms them, and writes them into target documents, as declared by a
//! mapping definition.
//!
//! # Main Components
//!
//! - **Paths**: `/a/b[2]/@ns:attr` style field paths, parsed once and cached
//! - **Conversion**: a registry of per type-pair conversion rules tagged with
//!   their concerns (range, format, convention, unsupported)
//! - **Documents**: JSON, XML and object-graph readers and writers behind a
//!   common format module interface
//! - **Actions**: ordered value transformations applied before writing
//! - **Engine**: contexts and sessions running MAP, COMBINE, SEPARATE and
//!   LOOKUP entries, recording every value-level problem as an audit
//!
//! # Example
//!
//! ```no_run
//! use atlasmap_core::engine::AtlasContext;
//! use atlasmap_core::{Document, Result};
//!
//! fn example() -> Result<()> {
//!     let context = AtlasContext::from_file("mapping.json")?;
//!     let mut session = context.create_session();
//!     session.set_default_input(Document::text(r#"{"doors": 5}"#));
//!     session.process()?;
//!     for audit in session.audits() {
//!         println!("{}: {}", audit.status, audit.message);
//!     }
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod audit;
pub mod config;
pub mod conversion;
pub mod document;
pub mod engine;
pub mod error;
pub mod mapping;
pub mod path;
pub mod types;
pub mod validation;

// Re-export main types for convenience
pub use audit::{Audit, Audits};
pub use config::EngineConfig;
pub use engine::{AtlasContext, AtlasSession};
pub use error::{AuditStatus, Error, Result};
pub use path::{FieldPath, PathSegment};
pub use types::{
    CollectionType, Document, DocumentFormat, Field, FieldKind, FieldStatus, FieldType, FieldValue,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
