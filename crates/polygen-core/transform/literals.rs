//! Expands string literals: a multi-character literal becomes the
//! sequence of its characters within the containing alternative, and a
//! single-character literal becomes a plain character. A multi-character
//! literal carrying an explicit metaname keeps its binding by turning
//! into a parenthesised character sequence, which the desugaring pass
//! then promotes to a synthetic rule.

use super::for_each_alt_mut;
use crate::{
  journal::Journal,
  types::{Alt, Expr, Grammar, Item, NamedItem, StringLit},
};

pub(crate) fn run(_j: &mut Journal, g: &mut Grammar) {
  for rule in g.rules_mut() {
    for_each_alt_mut(&mut rule.expr, &mut |alt| {
      let parts: Vec<NamedItem> = alt.items.drain(..).collect();

      for mut part in parts {
        match part.item {
          Item::Literal(lit) if lit.chars.len() == 1 => {
            part.item = Item::Ch(lit.chars[0], lit.tok);
            alt.items.push(part);
          }
          Item::Literal(lit) if part.metaname.is_none() => {
            // Splice the characters into the alternative; the cut mark
            // stays on the first of them.
            for (i, c) in lit.chars.iter().enumerate() {
              let mut ch = NamedItem::plain(Item::Ch(*c, lit.tok.clone()));
              ch.cut = part.cut && i == 0;
              alt.items.push(ch);
            }
          }
          Item::Literal(lit) => {
            part.item = group_of_chars(lit);
            alt.items.push(part);
          }
          _ => {
            fix_nested(&mut part.item);
            alt.items.push(part);
          }
        }
      }
    });
  }
}

/// Literals nested under quantifiers or predicates cannot be spliced;
/// they become character groups instead.
fn fix_nested(item: &mut Item) {
  match item {
    Item::ZeroOrOne(inner, _)
    | Item::ZeroOrMore(inner, _)
    | Item::OneOrMore(inner, _)
    | Item::Repetition { item: inner, .. }
    | Item::And(inner, _)
    | Item::Not(inner, _) => fix_nested(inner),
    Item::Literal(lit) if lit.chars.len() == 1 => {
      *item = Item::Ch(lit.chars[0], lit.tok.clone());
    }
    Item::Literal(lit) => {
      *item = group_of_chars(lit.clone());
    }
    _ => {}
  }
}

fn group_of_chars(lit: StringLit) -> Item {
  let items =
    lit.chars.iter().map(|c| NamedItem::plain(Item::Ch(*c, lit.tok.clone()))).collect();
  let expr = Expr { alts: vec![Alt { items, action: None, tok: lit.tok.clone() }] };
  Item::Group(Box::new(expr), lit.tok)
}
