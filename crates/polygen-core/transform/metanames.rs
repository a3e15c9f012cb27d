//! Deduces a metavariable binding for every part without an explicit one:
//! references take the lowercased rule name (suffixed `1, 2, ...` on
//! repeats within an alternative), terminals and synthetic references are
//! numbered `_<n>`, explicit `_` marks stay ignored, and predicates never
//! receive a binding.

use super::ref_target;
use crate::{
  journal::Journal,
  types::{Alt, Grammar, MetaName},
};
use std::collections::HashSet;

pub(crate) fn run(_j: &mut Journal, g: &mut Grammar) {
  let synthetic: HashSet<String> =
    g.rules().filter(|r| r.synthetic).map(|r| r.id.name.clone()).collect();

  for rule in g.rules_mut() {
    for alt in &mut rule.expr.alts {
      deduce_alt(alt, &synthetic);
    }
  }
}

fn deduce_alt(alt: &mut Alt, synthetic: &HashSet<String>) {
  let mut used: HashSet<String> = alt
    .items
    .iter()
    .filter_map(|part| match &part.metaname {
      Some(MetaName::Name(name)) => Some(name.clone()),
      _ => None,
    })
    .collect();

  let mut unnamed_terminals = 0u32;

  for part in &mut alt.items {
    part.binding = None;
    part.ignored = false;

    if part.item.is_predicate() {
      continue;
    }

    match &part.metaname {
      Some(MetaName::Ignore) => part.ignored = true,

      Some(MetaName::Name(name)) => part.binding = Some(name.clone()),

      None => {
        let base = match ref_target(&part.item) {
          Some(name) if !synthetic.contains(name) => name.to_lowercase(),
          _ => {
            unnamed_terminals += 1;
            format!("_{}", unnamed_terminals)
          }
        };

        let name = if used.contains(&base) {
          let mut n = 1;
          loop {
            let candidate = format!("{}{}", base, n);
            if !used.contains(&candidate) {
              break candidate;
            }
            n += 1;
          }
        } else {
          base
        };

        used.insert(name.clone());
        part.binding = Some(name);
      }
    }
  }
}
