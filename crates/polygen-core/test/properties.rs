use super::build_ok;
use crate::{
  compile::{parse_grammar, render_grammar, transform_grammar},
  Journal,
};
use std::path::Path;

/// For any accepted grammar, rendering and reparsing reproduces the same
/// structure. Equality is judged on the canonical rendering, which is a
/// fixpoint of render-then-parse.
fn assert_round_trips(source: &str) {
  let g1 = parse_grammar(source, Path::new("/round.peg")).expect("first parse");
  let text1 = render_grammar(&g1);
  let g2 = parse_grammar(&text1, Path::new("/round.peg")).expect("reparse of rendering");
  let text2 = render_grammar(&g2);
  assert_eq!(text1, text2, "rendering is not stable for:\n{}", source);
}

#[test]
fn parser_round_trip() {
  assert_round_trips("@entry\nNumber <- Digit+ $int\nDigit <- [0-9]\n$int { int(_1) }");
  assert_round_trips("A <- x:B _:C ^ !D 'e'? / ( 'f' / 'g' ){2,4} .");
  assert_round_trips(r"S <- '\n\t\\' [a-zA-Z0-9_-] 'q'{3}");
  assert_round_trips("@include \"lib.peg\"\n@ignore { Sep }\n@entry Main\nMain <- Sep\nSep <- ','");
  assert_round_trips("@toplevel { @entry M }\n@backend(rust) { M <- 'm' }\nM2 <- &M");
  assert_round_trips("@backend.header { // hi \\} }\nA <- 'a' ${ Value::Unit }");
}

#[test]
fn the_transformer_is_idempotent() {
  let sources = [
    "@entry\nNumber <- Digit+ $int\nDigit <- [0-9]\n$int { int(_1) }",
    "@entry\nList <- '(' ( Item ' ' )* ')'\nItem <- [a-z]+",
    "@entry\nE <- E '+' T / T\nT <- [0-9]",
    "@entry\nTwoNumbers <- Number Sep Number\nNumber <- [0-9]+\nSep <- ','\n@ignore { Sep }",
  ];

  for source in sources {
    let (_, g) = build_ok(source);
    let before = render_grammar(&g);
    let counter_before = g.gen_counter;

    let mut again = g.clone();
    let mut j = Journal::new(None);
    transform_grammar(&mut j, &mut again).expect("second run");

    assert_eq!(render_grammar(&again), before, "transform not idempotent for:\n{}", source);
    assert_eq!(again.gen_counter, counter_before);
    assert!(!j.dump_errors());
  }
}

#[test]
fn synthetic_names_never_collide_with_user_rules() {
  let (_, g) = build_ok(
    "@entry\nNumber <- Digit+ Number__GEN_1\nNumber__GEN_1 <- 'x'\nDigit <- [0-9]",
  );

  // The user owns Number__GEN_1; the promoted quantifier had to skip it.
  assert!(!g.rule("Number__GEN_1").unwrap().synthetic);
  let generated = g.rule("Number__GEN_2").expect("fresh synthetic name");
  assert!(generated.synthetic);
}

#[test]
fn synthetic_counters_increase_monotonically() {
  let (_, g) = build_ok("@entry\nA <- B? B* B+\nB <- 'b'");

  let names: Vec<_> =
    g.rules().filter(|r| r.synthetic).map(|r| r.id.name.clone()).collect();
  assert_eq!(names, vec!["A__GEN_1", "A__GEN_2", "A__GEN_3"]);
  assert_eq!(g.gen_counter, 3);
}

#[test]
fn deduced_metanames_are_pairwise_distinct() {
  let (_, g) = build_ok("@entry\nTriple <- Number Number Number 'x' 'y'\nNumber <- [0-9]");

  let alt = &g.rule("Triple").unwrap().expr.alts[0];
  let tuple = alt.return_tuple();
  assert_eq!(tuple, vec!["number", "number1", "number2", "_1", "_2"]);

  let mut unique = tuple.clone();
  unique.sort();
  unique.dedup();
  assert_eq!(unique.len(), tuple.len());
}

#[test]
fn every_retained_rule_is_reachable_from_the_entry() {
  let (_, g) = build_ok("@entry\nA <- B 'x'\nB <- 'b'\nOrphan <- Unused\nUnused <- 'u'");

  assert!(g.rule("Orphan").is_none());
  assert!(g.rule("Unused").is_none());

  // What remains is exactly the reachable set.
  let names: Vec<_> = g.rules().map(|r| r.id.name.as_str()).collect();
  assert_eq!(names, vec!["A", "B"]);
}
