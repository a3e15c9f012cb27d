//! Pairs every metarule reference with its definition. References are
//! rewritten into inline actions; the top-level definitions are then
//! consumed. Undefined references and orphan definitions are errors.

use super::for_each_alt_mut;
use crate::{
  journal::Journal,
  types::{
    error_types::{
      add_duplicate_metarule_error,
      add_orphan_metarule_error,
      add_undefined_metarule_error,
    },
    AltAction,
    Entity,
    Grammar,
    MetaRule,
  },
};
use std::collections::{HashMap, HashSet};

pub(crate) fn run(j: &mut Journal, g: &mut Grammar) {
  let mut defs: HashMap<String, MetaRule> = HashMap::new();
  let mut order: Vec<String> = Vec::new();

  for meta in g.metarules() {
    let id = meta.id.clone().unwrap_or_default();
    match defs.get(&id.name) {
      Some(first) => {
        add_duplicate_metarule_error(j, first.id.as_ref().unwrap_or(&id), &id)
      }
      None => {
        order.push(id.name.clone());
        defs.insert(id.name.clone(), meta.clone());
      }
    }
  }

  let mut used: HashSet<String> = HashSet::new();

  for rule in g.rules_mut() {
    for_each_alt_mut(&mut rule.expr, &mut |alt| {
      if let Some(AltAction::Ref(id)) = &alt.action {
        match defs.get(&id.name) {
          Some(meta) => {
            used.insert(id.name.clone());
            alt.action = Some(AltAction::Inline(meta.clone()));
          }
          None => add_undefined_metarule_error(j, id),
        }
      }
    });
  }

  for name in &order {
    if !used.contains(name) {
      if let Some(id) = defs.get(name).and_then(|m| m.id.as_ref()) {
        add_orphan_metarule_error(j, id);
      }
    }
  }

  g.entities.retain(|e| !matches!(e, Entity::Meta(_)));
}
