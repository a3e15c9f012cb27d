//! Constructor helpers for every diagnostic the pipeline can produce.
//! Stages report through these so ids, messages and severities stay in one
//! place.

use super::{ErrorClass, Ident, PolygenError, PolygenErrorSeverity, Token};
use crate::journal::Journal;
use std::path::PathBuf;

use ErrorClass::*;

// ---------------------------------------------------------------------------
// ----------------- Reader / parser errors ----------------------------------
// ---------------------------------------------------------------------------

pub(crate) fn create_syntax_error(loc: Token, expected: String) -> PolygenError {
  PolygenError::SourceError {
    path: loc.path(),
    id: (Syntax, 0, "unexpected-input").into(),
    msg: format!("expected {} at {}", expected, loc.loc_stub()),
    inline_msg: format!("expected {}", expected),
    severity: PolygenErrorSeverity::Critical,
    loc,
  }
}

pub(crate) fn create_malformed_escape_error(loc: Token) -> PolygenError {
  PolygenError::SourceError {
    path: loc.path(),
    id: (Lexical, 0, "malformed-escape").into(),
    msg: "malformed escape sequence".into(),
    inline_msg: "not a valid escape".into(),
    severity: PolygenErrorSeverity::Critical,
    loc,
  }
}

pub(crate) fn create_unterminated_error(loc: Token, what: &str) -> PolygenError {
  PolygenError::SourceError {
    path: loc.path(),
    id: (Lexical, 1, "unterminated").into(),
    msg: format!("unterminated {}", what),
    inline_msg: format!("{} opened here is never closed", what),
    severity: PolygenErrorSeverity::Critical,
    loc,
  }
}

// ---------------------------------------------------------------------------
// ----------------- Preprocessor errors -------------------------------------
// ---------------------------------------------------------------------------

/// A grammar file includes itself, directly or through other includes.
pub(crate) fn add_cyclic_include_error(j: &mut Journal, loc: Token, target: &PathBuf) {
  j.report_mut().add_error(PolygenError::SourceError {
    path: loc.path(),
    id: (Include, 0, "cyclic-include").into(),
    msg: format!("inclusion of {} forms a cycle", target.to_str().unwrap_or("")),
    inline_msg: "this file is already being included".into(),
    severity: PolygenErrorSeverity::Critical,
    loc,
  });
}

/// The path named by an `@include` does not resolve to a readable file.
pub(crate) fn add_missing_include_error(j: &mut Journal, loc: Token, target: &PathBuf, err: String) {
  j.report_mut().add_error(PolygenError::SourceError {
    path: loc.path(),
    id: (Include, 1, "unresolved-include").into(),
    msg: format!("could not load {}: {}", target.to_str().unwrap_or(""), err),
    inline_msg: "source not found".into(),
    severity: PolygenErrorSeverity::Critical,
    loc,
  });
}

/// `@toplevel` and `@backend(..)` queries may not nest.
pub(crate) fn add_nested_query_error(j: &mut Journal, loc: Token) {
  j.report_mut().add_error(PolygenError::SourceError {
    path: loc.path(),
    id: (Include, 2, "nested-query-unsupported").into(),
    msg: "conditional inclusion queries cannot be nested".into(),
    inline_msg: "this query appears inside another query body".into(),
    severity: PolygenErrorSeverity::Critical,
    loc,
  });
}

pub(crate) fn add_duplicate_entry_error(j: &mut Journal, first: &Token, second: &Token) {
  j.report_mut().add_error(PolygenError::SourcesError {
    id:       (Semantic, 0, "duplicate-entry").into(),
    msg:      "a grammar can have only one entry rule".into(),
    sources:  vec![
      (first.clone(), first.path(), "first entry designation occurs here".into()),
      (second.clone(), second.path(), "second entry designation occurs here".into()),
    ],
    severity: PolygenErrorSeverity::Critical,
  });
}

pub(crate) fn add_unknown_directive_id_error(j: &mut Journal, directive: &str, id: &Ident) {
  j.report_mut().add_error(PolygenError::SourceError {
    loc: id.tok.clone(),
    path: id.tok.path(),
    id: (Semantic, 1, "unknown-rule-in-directive").into(),
    msg: format!("@{} names the rule {}, which is not defined", directive, id.name),
    inline_msg: "no rule with this name".into(),
    severity: PolygenErrorSeverity::Critical,
  });
}

/// A bare `@entry` with no rule following it in the same file.
pub(crate) fn add_dangling_entry_error(j: &mut Journal, loc: Token) {
  j.report_mut().add_error(PolygenError::SourceError {
    path: loc.path(),
    id: (Semantic, 2, "dangling-entry").into(),
    msg: "@entry is not followed by a rule definition".into(),
    inline_msg: "nothing for this directive to mark".into(),
    severity: PolygenErrorSeverity::Critical,
    loc,
  });
}

// ---------------------------------------------------------------------------
// ----------------- Transformer errors --------------------------------------
// ---------------------------------------------------------------------------

pub(crate) fn add_reversed_range_error(j: &mut Journal, loc: &Token, low: char, high: char) {
  j.report_mut().add_error(PolygenError::SourceError {
    loc: loc.clone(),
    path: loc.path(),
    id: (Semantic, 3, "reversed-class-range").into(),
    msg: format!("class range {:?}-{:?} runs backwards", low, high),
    inline_msg: "range begin exceeds range end".into(),
    severity: PolygenErrorSeverity::Critical,
  });
}

pub(crate) fn add_bad_repetition_error(j: &mut Journal, loc: &Token, lo: u32, hi: u32) {
  j.report_mut().add_error(PolygenError::SourceError {
    loc: loc.clone(),
    path: loc.path(),
    id: (Semantic, 4, "bad-repetition-bounds").into(),
    msg: format!("repetition bounds {{{},{}}} are inverted", lo, hi),
    inline_msg: "lower bound exceeds upper bound".into(),
    severity: PolygenErrorSeverity::Critical,
  });
}

pub(crate) fn add_empty_class_error(j: &mut Journal, loc: &Token) {
  j.report_mut().add_error(PolygenError::SourceError {
    loc: loc.clone(),
    path: loc.path(),
    id: (Semantic, 5, "empty-class").into(),
    msg: "character class matches nothing".into(),
    inline_msg: "no ranges remain after normalisation".into(),
    severity: PolygenErrorSeverity::Critical,
  });
}

pub(crate) fn add_predicate_metaname_error(j: &mut Journal, loc: &Token) {
  j.report_mut().add_error(PolygenError::SourceError {
    loc: loc.clone(),
    path: loc.path(),
    id: (Semantic, 6, "metaname-on-predicate").into(),
    msg: "lookahead predicates consume no input and cannot bind a metavariable".into(),
    inline_msg: "remove the metaname or the predicate".into(),
    severity: PolygenErrorSeverity::Critical,
  });
}

pub(crate) fn add_undefined_metarule_error(j: &mut Journal, id: &Ident) {
  j.report_mut().add_error(PolygenError::SourceError {
    loc: id.tok.clone(),
    path: id.tok.path(),
    id: (Semantic, 7, "undefined-metarule").into(),
    msg: format!("no metarule named {} is defined", id.name),
    inline_msg: "referenced here".into(),
    severity: PolygenErrorSeverity::Critical,
  });
}

pub(crate) fn add_orphan_metarule_error(j: &mut Journal, id: &Ident) {
  j.report_mut().add_error(PolygenError::SourceError {
    loc: id.tok.clone(),
    path: id.tok.path(),
    id: (Semantic, 8, "orphan-metarule").into(),
    msg: format!("metarule {} is never referenced", id.name),
    inline_msg: "defined here but unused".into(),
    severity: PolygenErrorSeverity::Critical,
  });
}

pub(crate) fn add_duplicate_metarule_error(j: &mut Journal, old: &Ident, new: &Ident) {
  j.report_mut().add_error(PolygenError::SourcesError {
    id:       (Semantic, 9, "metarule-redefinition").into(),
    msg:      format!("redefinition of metarule {}", new.name),
    sources:  vec![
      (old.tok.clone(), old.tok.path(), format!("first definition of {} occurs here", old.name)),
      (new.tok.clone(), new.tok.path(), format!("redefinition of {} occurs here", new.name)),
    ],
    severity: PolygenErrorSeverity::Critical,
  });
}

pub(crate) fn add_duplicate_rule_error(j: &mut Journal, old: &Ident, new: &Ident) {
  j.report_mut().add_error(PolygenError::SourcesError {
    id:       (Semantic, 10, "rule-redefinition").into(),
    msg:      format!("redefinition of rule {}", new.name),
    sources:  vec![
      (old.tok.clone(), old.tok.path(), format!("first definition of {} occurs here", old.name)),
      (new.tok.clone(), new.tok.path(), format!("redefinition of {} occurs here", new.name)),
    ],
    severity: PolygenErrorSeverity::Critical,
  });
}

pub(crate) fn add_unresolved_reference_error(j: &mut Journal, id: &Ident) {
  j.report_mut().add_error(PolygenError::SourceError {
    loc: id.tok.clone(),
    path: id.tok.path(),
    id: (Semantic, 11, "unresolved-reference").into(),
    msg: format!("reference to undefined rule {}", id.name),
    inline_msg: "no rule with this name".into(),
    severity: PolygenErrorSeverity::Critical,
  });
}

pub(crate) fn add_no_entry_error(j: &mut Journal) {
  j.report_mut().add_error(PolygenError::Text(
    "no entry rule: mark exactly one rule with @entry".into(),
  ));
}

pub(crate) fn add_unreachable_rule_warning(j: &mut Journal, id: &Ident) {
  j.report_mut().add_error(PolygenError::SourceError {
    loc: id.tok.clone(),
    path: id.tok.path(),
    id: (Semantic, 12, "unreachable-rule").into(),
    msg: format!("rule {} is not reachable from the entry rule and was dropped", id.name),
    inline_msg: "unreachable".into(),
    severity: PolygenErrorSeverity::Warning,
  });
}

pub(crate) fn add_cut_masks_alternative_error(j: &mut Journal, cut: &Token, masked: &Token) {
  j.report_mut().add_error(PolygenError::SourcesError {
    id:       (Semantic, 13, "unreachable-alternative-after-cut").into(),
    msg:      "alternative is unreachable: an earlier alternative commits with ^ on the same prefix"
      .into(),
    sources:  vec![
      (cut.clone(), cut.path(), "the cut commits the choice here".into()),
      (masked.clone(), masked.path(), "this alternative can never be tried".into()),
    ],
    severity: PolygenErrorSeverity::Critical,
  });
}

// ---------------------------------------------------------------------------
// ----------------- Backend errors ------------------------------------------
// ---------------------------------------------------------------------------

pub(crate) fn create_unknown_backend_error(name: &str) -> PolygenError {
  PolygenError::Text(format!("unknown backend {:?}: no description is registered", name))
}

pub(crate) fn create_missing_placeholder_error(name: &str) -> PolygenError {
  PolygenError::Text(format!("skeleton is missing the required @backend.{} placeholder", name))
}

pub(crate) fn create_duplicate_skeleton_directive_error(name: &str) -> PolygenError {
  PolygenError::Text(format!("skeleton names the @backend.{} placeholder more than once", name))
}
