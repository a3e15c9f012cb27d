use crate::{pipeline, Config, Journal};

fn emit(source: &str) -> String {
  let mut j = Journal::new(Some(Config::for_backend("rust")));
  match pipeline::build_from_string(&mut j, source) {
    Ok(output) => output,
    Err(err) => {
      j.dump_errors();
      panic!("expected emission to succeed: {}", err);
    }
  }
}

#[test]
fn every_rule_memoizes_by_rule_and_position() {
  let output = emit("@entry\nPair <- Digit Digit\nDigit <- [0-9]");

  assert!(output.contains("self.memo.get(&(0, pos))"));
  assert!(output.contains("self.memo.get(&(1, pos))"));
  assert!(output.contains("self.memo.insert((0, pos), res.clone());"));
}

#[test]
fn left_recursive_rules_grow_a_seed() {
  let output = emit("@entry\nE <- E '+' T / T\nT <- [0-9]");

  // The seed is planted as NoMatch before the first evaluation.
  assert!(output.contains("self.memo.insert((0, pos), None);"));
  assert!(output.contains("(Some((_, grown)), Some((_, best))) if *grown <= *best => break"));

  // Non-recursive rules evaluate their body once.
  assert!(output.contains("let res = self.p1_t_body(pos);"));
}

#[test]
fn cuts_commit_the_enclosing_choice() {
  let output = emit(r#"@entry
Esc <- '\\' ^ 'n' / 'q'"#);

  assert!(output.contains("committed = true;"));
  assert!(output.contains("self.cut_error(cut_at);"));
}

#[test]
fn alternatives_return_their_tuple_in_source_order() {
  let output =
    emit("@entry\nPair <- Number ',' Number\nNumber <- [0-9]");

  assert!(output.contains("Value::Seq(vec![mv_number, mv__1, mv_number1])"));
}

#[test]
fn ignored_items_are_matched_but_not_returned() {
  let output = emit(
    "@entry\nPair <- Number Sep Number\nNumber <- [0-9]\nSep <- ','\n@ignore { Sep }",
  );

  assert!(output.contains("Value::Seq(vec![mv_number, mv_number1])"));
}

#[test]
fn metarule_bodies_are_inlined_with_bindings() {
  let output = emit(
    "@entry\nNumber <- d:Digit $int\nDigit <- [0-9]\n$int {\n    Value::Str(d.text())\n}",
  );

  assert!(output.contains("let d = mv_d;"));
  assert!(output.contains("Value::Str(d.text())"));
}

#[test]
fn quantifier_loops_enforce_their_bounds() {
  let output = emit("@entry\nV <- [0-9]{2,4}");

  assert!(output.contains("if vs1.len() >= 4 {"));
  assert!(output.contains("if vs1.len() < 2 {"));
}

#[test]
fn predicates_consume_no_input() {
  let output = emit("@entry\nK <- &'k' . !'z' .");

  assert!(output.contains(".is_none() {"));
  assert!(output.contains(".is_some() {"));
  assert!(output.contains("self.expect_any(p)"));
}

#[test]
fn the_skeleton_resolves_completely() {
  let output = emit("@entry\nA <- 'a'");

  assert!(!output.contains("@backend."));
  assert!(output.contains("pub fn parse_input"));
  assert!(output.contains("pub struct Parser"));
}

#[test]
fn grammar_backend_definitions_override_generated_fragments() {
  let output = emit("@entry\nA <- 'a'\n@backend.header { // house header }");

  assert!(output.contains("// house header"));
  assert!(!output.contains("generated by polygen"));
}

#[test]
fn unknown_backends_are_rejected() {
  let mut j = Journal::new(Some(Config::for_backend("cobol")));
  let err = pipeline::build_from_string(&mut j, "@entry\nA <- 'a'").unwrap_err();
  assert!(err.to_string().contains("unknown backend"), "{}", err);
}
