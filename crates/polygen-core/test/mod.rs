//! End-to-end scenario and property tests for the grammar pipeline.

mod emit;
mod preprocess;
mod properties;
mod transform;

use crate::{
  journal::ReportType,
  pipeline,
  types::{Grammar, PolygenResult},
  Journal,
};

/// Preprocesses and transforms a grammar string under a default-config
/// journal.
pub(crate) fn build(source: &str) -> (Journal, PolygenResult<Grammar>) {
  let mut j = Journal::new(None);
  let grammar = pipeline::grammar_from_string(&mut j, source);
  (j, grammar)
}

pub(crate) fn build_ok(source: &str) -> (Journal, Grammar) {
  let (j, grammar) = build(source);
  match grammar {
    Ok(grammar) => (j, grammar),
    Err(err) => {
      j.dump_errors();
      panic!("expected the grammar to build: {}", err);
    }
  }
}

/// True when any report holds a diagnostic with the given slug.
pub(crate) fn has_error(j: &Journal, slug: &str) -> bool {
  let mut found = false;
  j.get_reports(ReportType::Any, |report| {
    if report.errors().iter().any(|e| e.is(slug)) {
      found = true;
    }
  });
  found
}
