//! The tree rewriter. Runs an ordered battery of passes that normalise and
//! validate a preprocessed grammar:
//!
//! 1.  sanity checks (range order, repetition bounds, predicate metanames)
//! 2.  metarule resolution
//! 3.  string-literal expansion
//! 4.  character-class normalisation
//! 5.  desugaring of groups and quantifiers into synthetic rules
//! 6.  metaname deduction
//! 7.  `@ignore` propagation
//! 8.  identifier resolution
//! 9.  left-recursion analysis
//! 10. entry enforcement and reachability pruning
//! 11. cut placement checking
//!
//! Every pass is a total function over the AST; diagnostics accumulate in
//! the journal's active report, and a pass that produced critical errors
//! stops the battery. Running the battery on its own output is a no-op.

mod classes;
mod cuts;
mod desugar;
mod entry;
mod ignore;
mod literals;
mod metanames;
mod metarules;
mod recursion;
mod resolve;
mod sanity;

use crate::{
  journal::{Journal, ReportType},
  types::{Alt, Expr, Grammar, Item, NamedItem, PolygenErrorSeverity, PolygenResult},
};

pub fn transform_grammar(j: &mut Journal, g: &mut Grammar) -> PolygenResult<()> {
  j.set_active_report("Transform", ReportType::Transform);

  let passes: &[(&'static str, fn(&mut Journal, &mut Grammar))] = &[
    ("sanity check", sanity::run),
    ("metarule resolution", metarules::run),
    ("literal expansion", literals::run),
    ("class normalisation", classes::run),
    ("desugaring", desugar::run),
    ("metaname deduction", metanames::run),
    ("ignore propagation", ignore::run),
    ("identifier resolution", resolve::run),
    ("recursion analysis", recursion::run),
    ("entry enforcement", entry::run),
    ("cut placement check", cuts::run),
  ];

  for (name, pass) in passes {
    j.report_mut().start_timer(name);
    pass(j, g);
    j.report_mut().stop_timer(name);

    if j.report().have_errors_of_type(PolygenErrorSeverity::Critical) {
      return Err(format!("grammar transformation failed during {}", name).into());
    }
  }

  Ok(())
}

// ---------------------------------------------------------------------------
// Shared walkers. The AST holds no parent pointers; passes either iterate
// rules directly or thread these visitors through nested expressions.

/// Calls `f` for every alternative of `expr`, including the alternatives
/// of parenthesised sub-expressions.
pub(crate) fn for_each_alt_mut(expr: &mut Expr, f: &mut dyn FnMut(&mut Alt)) {
  for alt in &mut expr.alts {
    f(alt);
    for part in &mut alt.items {
      alt_in_item_mut(&mut part.item, f);
    }
  }
}

fn alt_in_item_mut(item: &mut Item, f: &mut dyn FnMut(&mut Alt)) {
  match item {
    Item::Group(expr, _) => for_each_alt_mut(expr, f),
    Item::ZeroOrOne(inner, _)
    | Item::ZeroOrMore(inner, _)
    | Item::OneOrMore(inner, _)
    | Item::Repetition { item: inner, .. }
    | Item::And(inner, _)
    | Item::Not(inner, _) => alt_in_item_mut(inner, f),
    _ => {}
  }
}

/// Calls `f` for every part of `expr`, including parts of parenthesised
/// sub-expressions.
pub(crate) fn for_each_part_mut(expr: &mut Expr, f: &mut dyn FnMut(&mut NamedItem)) {
  for alt in &mut expr.alts {
    for part in &mut alt.items {
      f(part);
      part_in_item_mut(&mut part.item, f);
    }
  }
}

fn part_in_item_mut(item: &mut Item, f: &mut dyn FnMut(&mut NamedItem)) {
  match item {
    Item::Group(expr, _) => for_each_part_mut(expr, f),
    Item::ZeroOrOne(inner, _)
    | Item::ZeroOrMore(inner, _)
    | Item::OneOrMore(inner, _)
    | Item::Repetition { item: inner, .. }
    | Item::And(inner, _)
    | Item::Not(inner, _) => part_in_item_mut(inner, f),
    _ => {}
  }
}

/// Calls `f` for every item of `expr`, nested ones included.
pub(crate) fn for_each_item_mut(expr: &mut Expr, f: &mut dyn FnMut(&mut Item)) {
  for alt in &mut expr.alts {
    for part in &mut alt.items {
      item_walk_mut(&mut part.item, f);
    }
  }
}

fn item_walk_mut(item: &mut Item, f: &mut dyn FnMut(&mut Item)) {
  f(item);
  match item {
    Item::Group(expr, _) => for_each_item_mut(expr, f),
    Item::ZeroOrOne(inner, _)
    | Item::ZeroOrMore(inner, _)
    | Item::OneOrMore(inner, _)
    | Item::Repetition { item: inner, .. }
    | Item::And(inner, _)
    | Item::Not(inner, _) => item_walk_mut(inner, f),
    _ => {}
  }
}

/// The rule a part ultimately refers to, looking through quantifiers.
/// `None` for terminals, groups, and predicates.
pub(crate) fn ref_target(item: &Item) -> Option<&str> {
  match item {
    Item::NonTerm(id) => Some(&id.name),
    Item::ZeroOrOne(inner, _)
    | Item::ZeroOrMore(inner, _)
    | Item::OneOrMore(inner, _)
    | Item::Repetition { item: inner, .. } => ref_target(inner),
    _ => None,
  }
}

/// Every rule name referenced anywhere inside `item`, predicates included.
pub(crate) fn collect_refs(item: &Item, out: &mut Vec<String>) {
  match item {
    Item::NonTerm(id) => out.push(id.name.clone()),
    Item::Group(expr, _) => {
      for alt in &expr.alts {
        for part in &alt.items {
          collect_refs(&part.item, out);
        }
      }
    }
    Item::ZeroOrOne(inner, _)
    | Item::ZeroOrMore(inner, _)
    | Item::OneOrMore(inner, _)
    | Item::Repetition { item: inner, .. }
    | Item::And(inner, _)
    | Item::Not(inner, _) => collect_refs(inner, out),
    _ => {}
  }
}
