//! The build pipeline: preprocess, transform, emit. Each stage reports
//! into the journal, and the pipeline refuses to advance past a stage
//! that produced critical errors.

use crate::{
  emit::{emit_parser, get_backend},
  grammar::{preprocess, preprocess_source, FsLoader, StringLoader},
  journal::{Journal, ReportType},
  transform::transform_grammar,
  types::{Grammar, PolygenErrorSeverity, PolygenResult},
};
use std::path::Path;

/// Builds parser source from the grammar file at `path`, resolving
/// includes through the filesystem.
pub fn build_from_path(j: &mut Journal, path: &Path) -> PolygenResult<String> {
  let loader = FsLoader;
  let mut grammar = preprocess(j, &loader, path)?;
  build_from_grammar(j, &mut grammar)
}

/// Builds parser source from a grammar given as a string. The string is
/// treated as the root of the include tree.
pub fn build_from_string(j: &mut Journal, source: &str) -> PolygenResult<String> {
  let mut grammar = grammar_from_string(j, source)?;
  emit(j, &grammar)
}

/// Preprocesses and transforms a grammar string without emitting. Useful
/// for grammar validation and for tests.
pub fn grammar_from_string(j: &mut Journal, source: &str) -> PolygenResult<Grammar> {
  let loader = StringLoader::default();
  let mut grammar = preprocess_source(j, &loader, source, Path::new("<string>"))?;
  gate(j, "preprocessing")?;
  transform_grammar(j, &mut grammar)?;
  Ok(grammar)
}

fn build_from_grammar(j: &mut Journal, grammar: &mut Grammar) -> PolygenResult<String> {
  gate(j, "preprocessing")?;
  transform_grammar(j, grammar)?;
  emit(j, grammar)
}

fn emit(j: &mut Journal, grammar: &Grammar) -> PolygenResult<String> {
  j.set_active_report("Emit", ReportType::Emit);

  let backend = match get_backend(&j.config().backend) {
    Ok(backend) => backend,
    Err(err) => {
      j.report_mut().add_error(err.clone());
      return Err(err);
    }
  };

  match emit_parser(j, grammar, backend) {
    Ok(source) => {
      j.flush_reports();
      Ok(source)
    }
    Err(err) => {
      j.report_mut().add_error(err.clone());
      Err(err)
    }
  }
}

fn gate(j: &Journal, stage: &str) -> PolygenResult<()> {
  if j.have_errors_of_type(PolygenErrorSeverity::Critical) {
    Err(format!("{} produced errors; aborting", stage).into())
  } else {
    Ok(())
  }
}
