//! Validates the surface forms the parser cannot reject on its own:
//! class-range ordering, repetition bounds, and metanames on lookahead
//! predicates.

use super::{for_each_item_mut, for_each_part_mut};
use crate::{
  journal::Journal,
  types::{
    error_types::{
      add_bad_repetition_error,
      add_predicate_metaname_error,
      add_reversed_range_error,
    },
    Grammar,
    Item,
  },
};

pub(crate) fn run(j: &mut Journal, g: &mut Grammar) {
  for rule in g.rules_mut() {
    for_each_item_mut(&mut rule.expr, &mut |item| match item {
      Item::Class(class) => {
        for range in &class.ranges {
          if range.high() < range.low() {
            add_reversed_range_error(j, &class.tok, range.begin.as_char(), {
              range.end.map(|e| e.as_char()).unwrap_or(range.begin.as_char())
            });
          }
        }
      }
      Item::Repetition { lo, hi: Some(hi), tok, .. } => {
        if *hi < *lo {
          add_bad_repetition_error(j, tok, *lo, *hi);
        }
      }
      _ => {}
    });

    for_each_part_mut(&mut rule.expr, &mut |part| {
      if part.metaname.is_some() && part.item.is_predicate() {
        add_predicate_metaname_error(j, &part.tok);
      }
    });
  }
}
