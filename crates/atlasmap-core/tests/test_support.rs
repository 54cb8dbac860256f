//! Shared test support utilities for integration tests

#![allow(dead_code)]

use atlasmap_core::mapping::{AtlasMapping, DataSource, MappingEntry};
use atlasmap_core::{AtlasContext, AtlasSession, Audits, Document, DocumentFormat, EngineConfig, Field};
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::path::PathBuf;

/// Mapping with one JSON source `in` and one target `out` of `target` format
pub fn mapping(target: DocumentFormat, entries: Vec<MappingEntry>) -> AtlasMapping {
    let mut mapping = AtlasMapping::new("integration");
    mapping.data_sources = vec![
        DataSource::source("in", DocumentFormat::Json),
        DataSource::target("out", target),
    ];
    mapping.mappings = entries;
    mapping
}

/// Input field in the `in` document
pub fn input(path: &str) -> Field {
    Field::at(path).expect("valid input path").with_doc_id("in")
}

/// Output field in the `out` document
pub fn output(path: &str) -> Field {
    Field::at(path).expect("valid output path").with_doc_id("out")
}

/// Context with mapping validation turned off
pub fn unvalidated(mapping: AtlasMapping) -> AtlasContext {
    let config = EngineConfig {
        validate_mapping: false,
        ..Default::default()
    };
    AtlasContext::with_config(mapping, config).expect("context builds")
}

/// Run one pass with `body` as the `in` document
pub fn run<'a>(context: &'a AtlasContext, body: &str) -> AtlasSession<'a> {
    let mut session = context.create_session();
    session.set_input("in", Document::text(body));
    session.process().expect("pass succeeds");
    session
}

/// Text of the `out` document
pub fn output_text(session: &AtlasSession<'_>) -> String {
    session
        .output("out")
        .and_then(Document::as_text)
        .expect("text output")
        .to_string()
}

/// Assert the `out` document parses to `expected`
pub fn assert_json_output(session: &AtlasSession<'_>, expected: Value) {
    let actual: Value = serde_json::from_str(&output_text(session)).expect("output is JSON");
    assert_eq!(actual, expected);
}

/// Messages of all audits, in order
pub fn messages(audits: &Audits) -> Vec<String> {
    audits.iter().map(|a| a.message.clone()).collect()
}

/// Path of a file under `tests/fixtures`
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}
