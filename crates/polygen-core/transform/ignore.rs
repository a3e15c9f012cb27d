//! Propagates rule-level `@ignore` into every part that refers to an
//! ignored rule, unless the part carries an explicit user metaname. The
//! pass runs after desugaring, so references that started life inside
//! parenthesised sub-expressions are reached through their synthetic
//! rules.

use super::ref_target;
use crate::{journal::Journal, types::Grammar};
use std::collections::HashSet;

pub(crate) fn run(_j: &mut Journal, g: &mut Grammar) {
  let ignored: HashSet<String> =
    g.rules().filter(|r| r.ignore).map(|r| r.id.name.clone()).collect();

  if ignored.is_empty() {
    return;
  }

  for rule in g.rules_mut() {
    for alt in &mut rule.expr.alts {
      for part in &mut alt.items {
        if part.has_explicit_name() {
          continue;
        }
        if let Some(target) = ref_target(&part.item) {
          if ignored.contains(target) {
            part.ignored = true;
          }
        }
      }
    }
  }
}
