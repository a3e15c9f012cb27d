//! Replaces every non-trivial sub-expression (a parenthesised expression
//! used inside an alternative, or a quantifier applied to anything other
//! than the lone item of a synthetic rule) with a reference to a fresh
//! synthetic rule named `<Parent>__GEN_<n>`. Afterwards every alternative
//! is a flat sequence of references and terminals, and every surviving
//! quantifier applies to a simple primary inside its own synthetic rule.

use crate::{
  journal::Journal,
  types::{
    Alt,
    Entity,
    Expr,
    Grammar,
    Ident,
    Item,
    MetaName,
    NamedItem,
    Rule,
    Token,
    GEN_SEPARATOR,
  },
};
use std::collections::HashSet;

pub(crate) fn run(_j: &mut Journal, g: &mut Grammar) {
  let mut names: HashSet<String> = g.rules().map(|r| r.id.name.clone()).collect();
  let mut counter = g.gen_counter;
  let mut inserts: Vec<(usize, Vec<Rule>)> = Vec::new();

  for (idx, entity) in g.entities.iter_mut().enumerate() {
    let rule = match entity {
      Entity::Rule(rule) => rule,
      _ => continue,
    };

    let mut ctx = Desugar {
      parent:  rule.id.name.clone(),
      names:   &mut names,
      counter: &mut counter,
      out:     Vec::new(),
    };
    ctx.expr(&mut rule.expr, rule.synthetic);

    if !ctx.out.is_empty() {
      inserts.push((idx, ctx.out));
    }
  }

  // Synthetic rules land directly after the rule they were lifted from.
  for (idx, rules) in inserts.into_iter().rev() {
    for (k, rule) in rules.into_iter().enumerate() {
      g.entities.insert(idx + 1 + k, Entity::Rule(Box::new(rule)));
    }
  }

  g.gen_counter = counter;
}

struct Desugar<'a> {
  parent:  String,
  names:   &'a mut HashSet<String>,
  counter: &'a mut u32,
  out:     Vec<Rule>,
}

impl Desugar<'_> {
  fn expr(&mut self, expr: &mut Expr, rule_is_synthetic: bool) {
    for alt in &mut expr.alts {
      let lone_item = alt.items.len() == 1;
      for part in &mut alt.items {
        self.part(part, rule_is_synthetic && lone_item);
      }
    }
  }

  fn part(&mut self, part: &mut NamedItem, in_normal_position: bool) {
    let inherit_ignore = part.metaname == Some(MetaName::Ignore);

    match &mut part.item {
      item @ Item::Group(..) => {
        let taken = take(item);
        if let Item::Group(expr, tok) = taken {
          let id = self.hoist_expr(*expr, tok, inherit_ignore);
          *item = Item::NonTerm(id);
        }
      }

      item if item.is_quantified() => {
        self.flatten_quantifier_operand(item);
        if !in_normal_position {
          let taken = take(item);
          let id = self.hoist_single(taken, inherit_ignore);
          *item = Item::NonTerm(id);
        }
      }

      Item::And(inner, _) | Item::Not(inner, _) => {
        if let Item::Group(..) = inner.as_ref() {
          let taken = take(inner.as_mut());
          if let Item::Group(expr, tok) = taken {
            let id = self.hoist_expr(*expr, tok, false);
            **inner = Item::NonTerm(id);
          }
        } else if inner.is_quantified() {
          self.flatten_quantifier_operand(inner.as_mut());
          let taken = take(inner.as_mut());
          let id = self.hoist_single(taken, false);
          **inner = Item::NonTerm(id);
        }
      }

      _ => {}
    }
  }

  /// Makes the operand of a quantifier a simple primary, lifting groups
  /// out into synthetic rules.
  fn flatten_quantifier_operand(&mut self, quantified: &mut Item) {
    let inner = match quantified {
      Item::ZeroOrOne(inner, _)
      | Item::ZeroOrMore(inner, _)
      | Item::OneOrMore(inner, _)
      | Item::Repetition { item: inner, .. } => inner,
      _ => return,
    };

    if let Item::Group(..) = inner.as_ref() {
      let taken = take(inner.as_mut());
      if let Item::Group(expr, tok) = taken {
        let id = self.hoist_expr(*expr, tok, false);
        **inner = Item::NonTerm(id);
      }
    }
  }

  /// Lifts a sub-expression into a fresh synthetic rule and returns the
  /// identifier to reference it by.
  fn hoist_expr(&mut self, mut expr: Expr, tok: Token, inherit_ignore: bool) -> Ident {
    self.expr(&mut expr, false);
    self.fresh_rule(expr, tok, inherit_ignore)
  }

  /// Lifts a single already-flattened item into a synthetic rule holding
  /// one single-item alternative.
  fn hoist_single(&mut self, item: Item, inherit_ignore: bool) -> Ident {
    let tok = item.tok().clone();
    let expr = Expr {
      alts: vec![Alt { items: vec![NamedItem::plain(item)], action: None, tok: tok.clone() }],
    };
    self.fresh_rule(expr, tok, inherit_ignore)
  }

  fn fresh_rule(&mut self, expr: Expr, tok: Token, inherit_ignore: bool) -> Ident {
    let name = loop {
      *self.counter += 1;
      let name = format!("{}{}{}", self.parent, GEN_SEPARATOR, self.counter);
      if self.names.insert(name.clone()) {
        break name;
      }
    };

    let id = Ident::new(name, tok.clone());
    let mut rule = Rule::new(id.clone(), expr, tok);
    rule.synthetic = true;
    rule.ignore = inherit_ignore;
    self.out.push(rule);

    id
  }
}

fn take(item: &mut Item) -> Item {
  std::mem::replace(item, Item::Any(Token::empty()))
}
