//! Cut placement check. Once the items before a `^` have matched, the
//! enclosing choice is committed: a later alternative that agrees with
//! that whole committed prefix can never be tried, which makes it dead
//! grammar.

use crate::{
  journal::Journal,
  types::{error_types::add_cut_masks_alternative_error, Grammar},
};

pub(crate) fn run(j: &mut Journal, g: &mut Grammar) {
  for rule in g.rules() {
    let alts = &rule.expr.alts;

    for i in 0..alts.len() {
      let cut_at = match alts[i].items.iter().position(|p| p.cut) {
        Some(k) => k,
        None => continue,
      };

      let prefix = &alts[i].items[..cut_at];

      for later in &alts[i + 1..] {
        let masked = later.items.len() >= cut_at
          && prefix.iter().zip(later.items.iter()).all(|(a, b)| a.item.same_shape(&b.item));

        if masked {
          add_cut_masks_alternative_error(j, &alts[i].items[cut_at].tok, &later.tok);
        }
      }
    }
  }
}
