//! Enforces the single-entry invariant and prunes rules the entry rule
//! cannot reach.

use super::collect_refs;
use crate::{
  journal::Journal,
  types::{
    error_types::{add_duplicate_entry_error, add_no_entry_error, add_unreachable_rule_warning},
    Entity,
    Grammar,
  },
};
use std::collections::HashSet;

pub(crate) fn run(j: &mut Journal, g: &mut Grammar) {
  let entries: Vec<_> = g.rules().filter(|r| r.entry).map(|r| r.id.clone()).collect();

  match entries.len() {
    0 => {
      add_no_entry_error(j);
      return;
    }
    1 => {}
    _ => {
      add_duplicate_entry_error(j, &entries[0].tok, &entries[1].tok);
      return;
    }
  }

  // Reachability over reference edges, predicates included.
  let mut reachable: HashSet<String> = HashSet::new();
  let mut pending = vec![entries[0].name.clone()];

  while let Some(name) = pending.pop() {
    if !reachable.insert(name.clone()) {
      continue;
    }
    if let Some(rule) = g.rule(&name) {
      let mut refs = Vec::new();
      for alt in &rule.expr.alts {
        for part in &alt.items {
          collect_refs(&part.item, &mut refs);
        }
      }
      pending.extend(refs);
    }
  }

  for rule in g.rules() {
    if !reachable.contains(&rule.id.name) && !rule.synthetic {
      add_unreachable_rule_warning(j, &rule.id);
    }
  }

  g.entities.retain(|entity| match entity {
    Entity::Rule(rule) => reachable.contains(&rule.id.name),
    _ => true,
  });
}
