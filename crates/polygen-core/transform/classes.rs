//! Normalises character classes: ranges are sorted, overlapping and
//! adjacent ranges merge, and a class left with no ranges is rejected.

use super::for_each_item_mut;
use crate::{
  journal::Journal,
  types::{error_types::add_empty_class_error, CharLit, Grammar, Item, Range},
};

pub(crate) fn run(j: &mut Journal, g: &mut Grammar) {
  for rule in g.rules_mut() {
    for_each_item_mut(&mut rule.expr, &mut |item| {
      if let Item::Class(class) = item {
        let mut spans: Vec<(u32, u32)> =
          class.ranges.iter().map(|r| (r.low(), r.high())).collect();
        spans.sort_unstable();

        let mut merged: Vec<(u32, u32)> = Vec::with_capacity(spans.len());
        for (lo, hi) in spans {
          match merged.last_mut() {
            Some((_, prev_hi)) if lo <= prev_hi.saturating_add(1) => {
              *prev_hi = (*prev_hi).max(hi);
            }
            _ => merged.push((lo, hi)),
          }
        }

        if merged.is_empty() {
          add_empty_class_error(j, &class.tok);
        }

        class.ranges = merged
          .into_iter()
          .map(|(lo, hi)| Range {
            begin: CharLit { code: lo },
            end:   (hi > lo).then(|| CharLit { code: hi }),
          })
          .collect();
      }
    });
  }
}
