use super::{build, build_ok, has_error};
use crate::types::{Item, PolygenErrorSeverity};

#[test]
fn number_grammar_promotes_the_quantified_digit() {
  let (j, g) = build_ok(
    "@entry\nNumber <- Digit+ $int\nDigit  <- [0-9]\n$int { Value::Str(_1.text()) }",
  );

  let number = g.rule("Number").expect("entry rule");
  assert!(number.entry);

  // The quantified reference moved into a synthetic rule; the alternative
  // now references it.
  let generated = g.rule("Number__GEN_1").expect("synthetic rule");
  assert!(generated.synthetic);
  match &g.rule("Number").unwrap().expr.alts[0].items[0].item {
    Item::NonTerm(id) => assert_eq!(id.name, "Number__GEN_1"),
    other => panic!("expected a reference, got {:?}", other),
  }

  // The reference inside it deduces the metaname `digit`.
  let inner = &generated.expr.alts[0].items[0];
  assert_eq!(inner.binding.as_deref(), Some("digit"));

  assert!(!j.have_errors_of_type(PolygenErrorSeverity::Critical));
  assert!(!j.have_errors_of_type(PolygenErrorSeverity::Warning));
}

#[test]
fn indirect_left_recursion_marks_the_whole_component() {
  let (_, g) = build_ok(
    "@entry\n\
     Primary <- MethodInvocation / FieldAccess / ArrayAccess / This\n\
     MethodInvocation <- Primary '.' Name '(' ')'\n\
     FieldAccess <- Primary '.' Name\n\
     ArrayAccess <- Primary '[' Name ']'\n\
     This <- 'this'\n\
     Name <- [a-z]+",
  );

  for name in ["Primary", "MethodInvocation", "FieldAccess", "ArrayAccess"] {
    assert!(g.rule(name).unwrap().left_recursive, "{} should be marked", name);
  }
  assert!(!g.rule("This").unwrap().left_recursive);
  assert!(!g.rule("Name").unwrap().left_recursive);
}

#[test]
fn direct_left_recursion_is_marked_and_right_recursion_is_not() {
  let (_, g) = build_ok("@entry\nE <- E '+' T / T\nT <- [0-9]");
  assert!(g.rule("E").unwrap().left_recursive);

  let (_, g) = build_ok("@entry\nE <- T '+' E / T\nT <- [0-9]");
  assert!(!g.rule("E").unwrap().left_recursive);
}

#[test]
fn left_recursion_sees_through_nullable_prefixes() {
  let (_, g) = build_ok("@entry\nE <- Sign? E '!' / 'e'\nSign <- '-'");
  assert!(g.rule("E").unwrap().left_recursive);
}

#[test]
fn a_cut_masking_a_sibling_alternative_is_an_error() {
  let (j, result) = build(r#"@entry
Char <- '\\' ^ 'n' / '\\' 'r'"#);

  assert!(result.is_err());
  assert!(has_error(&j, "unreachable-alternative-after-cut"));
}

#[test]
fn a_cut_over_a_diverging_sibling_is_fine() {
  let (j, _) = build_ok(r#"@entry
Char <- '\\' ^ 'n' / 'x' 'r'"#);
  assert!(!has_error(&j, "unreachable-alternative-after-cut"));
}

#[test]
fn ignored_rules_drop_out_of_the_return_tuple() {
  let (_, g) = build_ok(
    "@entry\nTwoNumbers <- Number Sep Number\nNumber <- [0-9]+\nSep <- ','\n@ignore { Sep }",
  );

  let alt = &g.rule("TwoNumbers").unwrap().expr.alts[0];
  assert_eq!(alt.return_tuple(), vec!["number", "number1"]);
}

#[test]
fn an_explicit_metaname_overrides_ignore_propagation() {
  let (_, g) = build_ok(
    "@entry\nPair <- Number s:Sep Number\nNumber <- [0-9]+\nSep <- ','\n@ignore { Sep }",
  );

  let alt = &g.rule("Pair").unwrap().expr.alts[0];
  assert_eq!(alt.return_tuple(), vec!["number", "s", "number1"]);
}

#[test]
fn explicit_underscore_marks_are_excluded() {
  let (_, g) = build_ok("@entry\nA <- _:'(' B ')' \nB <- [a-z]");
  let alt = &g.rule("A").unwrap().expr.alts[0];
  assert_eq!(alt.return_tuple(), vec!["b", "_1"]);
}

#[test]
fn classes_normalise_to_sorted_disjoint_ranges() {
  let (_, g) = build_ok("@entry\nV <- [d-fa-cb]");

  match &g.rule("V").unwrap().expr.alts[0].items[0].item {
    Item::Class(class) => {
      assert_eq!(class.ranges.len(), 1);
      assert_eq!(class.ranges[0].low(), 'a' as u32);
      assert_eq!(class.ranges[0].high(), 'f' as u32);
    }
    other => panic!("expected a class, got {:?}", other),
  }
}

#[test]
fn the_fixed_trailing_dash_class_normalises_cleanly() {
  let (_, g) = build_ok("@entry\nV <- [0-9_-]");

  match &g.rule("V").unwrap().expr.alts[0].items[0].item {
    Item::Class(class) => {
      let spans: Vec<(u32, u32)> = class.ranges.iter().map(|r| (r.low(), r.high())).collect();
      assert_eq!(spans, vec![
        ('-' as u32, '-' as u32),
        ('0' as u32, '9' as u32),
        ('_' as u32, '_' as u32),
      ]);
    }
    other => panic!("expected a class, got {:?}", other),
  }
}

#[test]
fn reversed_ranges_are_rejected() {
  let (j, result) = build("@entry\nV <- [z-a]");
  assert!(result.is_err());
  assert!(has_error(&j, "reversed-class-range"));
}

#[test]
fn inverted_repetition_bounds_are_rejected() {
  let (j, result) = build("@entry\nV <- 'x'{3,1}");
  assert!(result.is_err());
  assert!(has_error(&j, "bad-repetition-bounds"));
}

#[test]
fn metanames_on_predicates_are_rejected() {
  let (j, result) = build("@entry\nV <- x:!'a' 'b'");
  assert!(result.is_err());
  assert!(has_error(&j, "metaname-on-predicate"));
}

#[test]
fn undefined_metarules_are_rejected() {
  let (j, result) = build("@entry\nV <- 'v' $missing");
  assert!(result.is_err());
  assert!(has_error(&j, "undefined-metarule"));
}

#[test]
fn orphan_metarules_are_rejected() {
  let (j, result) = build("@entry\nV <- 'v'\n$unused { 0 }");
  assert!(result.is_err());
  assert!(has_error(&j, "orphan-metarule"));
}

#[test]
fn unresolved_references_are_rejected() {
  let (j, result) = build("@entry\nV <- Missing");
  assert!(result.is_err());
  assert!(has_error(&j, "unresolved-reference"));
}

#[test]
fn duplicate_rule_names_are_rejected() {
  let (j, result) = build("@entry\nV <- 'a'\nV <- 'b'");
  assert!(result.is_err());
  assert!(has_error(&j, "rule-redefinition"));
}

#[test]
fn unreachable_rules_are_warned_about_and_dropped() {
  let (j, g) = build_ok("@entry\nA <- 'a'\nB <- 'b'");

  assert!(g.rule("B").is_none());
  assert!(has_error(&j, "unreachable-rule"));
  assert!(j.have_errors_of_type(PolygenErrorSeverity::Warning));
  assert!(!j.have_errors_of_type(PolygenErrorSeverity::Critical));
}

#[test]
fn groups_inside_alternatives_become_synthetic_rules() {
  let (_, g) = build_ok("@entry\nList <- '(' ( Item ' ' )* ')'\nItem <- [a-z]+");

  // No group survives anywhere.
  for rule in g.rules() {
    for alt in &rule.expr.alts {
      for part in &alt.items {
        assert!(!matches!(part.item, Item::Group(..)), "group left in {}", rule.id.name);
      }
    }
  }

  // Quantifiers only survive as the lone item of a synthetic rule.
  for rule in g.rules() {
    for alt in &rule.expr.alts {
      for part in &alt.items {
        if part.item.is_quantified() {
          assert!(rule.synthetic && alt.items.len() == 1, "bad quantifier in {}", rule.id.name);
        }
      }
    }
  }
}

#[test]
fn multi_char_literals_expand_into_their_characters() {
  let (_, g) = build_ok("@entry\nKw <- 'if' [a-z]");

  let alt = &g.rule("Kw").unwrap().expr.alts[0];
  assert_eq!(alt.items.len(), 3);
  assert!(matches!(alt.items[0].item, Item::Ch(c, _) if c.as_char() == 'i'));
  assert!(matches!(alt.items[1].item, Item::Ch(c, _) if c.as_char() == 'f'));
  // Unnamed terminals number left to right.
  assert_eq!(alt.return_tuple(), vec!["_1", "_2", "_3"]);
}

#[test]
fn a_named_multi_char_literal_keeps_its_binding() {
  let (_, g) = build_ok("@entry\nKw <- word:'if' [a-z]");

  let alt = &g.rule("Kw").unwrap().expr.alts[0];
  assert_eq!(alt.items.len(), 2);
  assert_eq!(alt.return_tuple(), vec!["word", "_1"]);

  // The literal became a synthetic rule holding the character sequence.
  match &alt.items[0].item {
    Item::NonTerm(id) => {
      let generated = g.rule(&id.name).expect("synthetic rule");
      assert!(generated.synthetic);
      assert_eq!(generated.expr.alts[0].items.len(), 2);
    }
    other => panic!("expected a reference, got {:?}", other),
  }
}
