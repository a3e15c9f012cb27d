use super::{build, build_ok, has_error};
use crate::{
  compile::{preprocess_source, StringLoader},
  Journal,
};
use std::path::Path;

fn preprocess_with(
  loader: &StringLoader,
  root: &str,
) -> (Journal, crate::types::PolygenResult<crate::types::Grammar>) {
  let mut j = Journal::new(None);
  let grammar = preprocess_source(&mut j, loader, root, Path::new("/root.peg"));
  (j, grammar)
}

#[test]
fn includes_inline_rules_in_place() {
  let loader = StringLoader::default().with("/digits.peg", "Digit <- [0-9]");
  let (j, g) =
    preprocess_with(&loader, "@entry\nNumber <- Digit\n@include \"/digits.peg\"");

  let g = g.unwrap();
  assert!(g.rule("Digit").is_some());
  assert!(!j.dump_errors());
}

#[test]
fn include_cycles_are_detected() {
  let loader = StringLoader::default()
    .with("/a.peg", "@include \"/b.peg\"\nA <- 'a'")
    .with("/b.peg", "@include \"/a.peg\"\nB <- 'b'");
  let (j, _) = preprocess_with(&loader, "@include \"/a.peg\"\n@entry\nR <- A");

  assert!(has_error(&j, "cyclic-include"));
}

#[test]
fn a_missing_include_is_reported_with_its_origin() {
  let loader = StringLoader::default();
  let (j, _) = preprocess_with(&loader, "@include \"/nowhere.peg\"\n@entry\nR <- 'r'");

  assert!(has_error(&j, "unresolved-include"));
}

#[test]
fn toplevel_blocks_fire_only_in_the_root_file() {
  // In the root file the query fires and sets the entry.
  let loader = StringLoader::default();
  let (j, g) = preprocess_with(&loader, "@toplevel { @entry Main }\nMain <- 'm'");
  let g = g.unwrap();
  assert!(g.rule("Main").unwrap().entry);
  assert!(!j.dump_errors());

  // Included from another file, the same query is dropped.
  let loader =
    StringLoader::default().with("/lib.peg", "@toplevel { @entry Main }\nMain <- 'm'");
  let (j, g) =
    preprocess_with(&loader, "@include \"/lib.peg\"\n@entry\nRoot <- Main");
  let g = g.unwrap();
  assert!(!g.rule("Main").unwrap().entry);
  assert!(g.rule("Root").unwrap().entry);
  assert!(!has_error(&j, "duplicate-entry"));
}

#[test]
fn backend_queries_match_the_configured_backend() {
  // The default configuration selects the rust backend.
  let (_, g) = build_ok(
    "@backend(rust) { Extra <- 'x' }\n@backend(python) { Extra <- 'y' }\n@entry\nR <- Extra",
  );
  assert!(g.rule("Extra").is_some());
}

#[test]
fn nested_queries_are_rejected() {
  let (j, _) = build("@toplevel { @backend(rust) { A <- 'a' } }\n@entry\nB <- 'b'");
  assert!(has_error(&j, "nested-query-unsupported"));
}

#[test]
fn duplicate_entries_are_rejected() {
  let (j, _) = build("@entry A\n@entry B\nA <- 'a'\nB <- 'b'");
  assert!(has_error(&j, "duplicate-entry"));
}

#[test]
fn unknown_entry_targets_are_rejected() {
  let (j, _) = build("@entry Missing\nA <- 'a'");
  assert!(has_error(&j, "unknown-rule-in-directive"));
}

#[test]
fn unknown_ignore_targets_are_rejected() {
  let (j, _) = build("@entry\nA <- 'a'\n@ignore { Missing }");
  assert!(has_error(&j, "unknown-rule-in-directive"));
}

#[test]
fn a_dangling_bare_entry_is_rejected() {
  let (j, _) = build("A <- 'a'\n@entry");
  assert!(has_error(&j, "dangling-entry"));
}

#[test]
fn backend_definitions_survive_preprocessing() {
  let (_, g) = build_ok("@entry\nA <- 'a'\n@backend.header { // custom }");
  let defs: Vec<_> = g.backend_defs().collect();
  assert_eq!(defs.len(), 1);
  assert_eq!(defs[0].0.name, "header");
  assert_eq!(defs[0].1.trim(), "// custom");
}
