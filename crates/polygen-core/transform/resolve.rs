//! Verifies that rule names are unique and that every reference targets a
//! defined rule.

use super::for_each_item_mut;
use crate::{
  journal::Journal,
  types::{
    error_types::{add_duplicate_rule_error, add_unresolved_reference_error},
    Grammar,
    Ident,
    Item,
  },
};
use std::collections::HashMap;

pub(crate) fn run(j: &mut Journal, g: &mut Grammar) {
  let mut seen: HashMap<String, Ident> = HashMap::new();

  for rule in g.rules() {
    match seen.get(&rule.id.name) {
      Some(first) => add_duplicate_rule_error(j, first, &rule.id),
      None => {
        seen.insert(rule.id.name.clone(), rule.id.clone());
      }
    }
  }

  for rule in g.rules_mut() {
    for_each_item_mut(&mut rule.expr, &mut |item| {
      if let Item::NonTerm(id) = item {
        if !seen.contains_key(&id.name) {
          add_unresolved_reference_error(j, id);
        }
      }
    });
  }
}
