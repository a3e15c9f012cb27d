//! Walks a normalised grammar and renders the rule functions of a packrat
//! recognizer through a backend's templates, then merges the fragments
//! into the backend skeleton.
//!
//! The contracts the generated code honours:
//! - every rule invocation is memoized by `(rule, position)`, misses
//!   evaluate the body and populate the cache;
//! - rules marked left-recursive evaluate through a seed-and-grow loop
//!   that accepts a re-evaluation only while it strictly advances the
//!   input pointer;
//! - a cut commits the enclosing choice: once the items before the `^`
//!   have matched, a later failure reports an error at the cut point
//!   instead of trying sibling alternatives;
//! - an alternative returns the values of its non-ignored items in source
//!   order, or the value of its semantic action with every metaname bound.

use super::{backend::fill, postprocess::postprocess_skeleton, BackendDescription};
use crate::{
  grammar::render_expr_text,
  journal::Journal,
  types::{Alt, AltAction, Grammar, Item, NamedItem, PolygenResult, Rule},
  writer::code_writer::CodeWriter,
};
use std::collections::HashMap;

/// Emits a complete parser source file for `g`, which must have been
/// transformed. The journal supplies `-d` defines as extra skeleton
/// fragments.
pub fn emit_parser(
  j: &mut Journal,
  g: &Grammar,
  desc: &BackendDescription,
) -> PolygenResult<String> {
  let entry = match g.entry_rule() {
    Some(rule) => rule,
    None => return Err("cannot emit a grammar without an entry rule".into()),
  };

  let emitter = Emitter::new(g, desc);

  let mut fragments: HashMap<String, String> = HashMap::new();

  let source = entry.id.tok.path();
  let source = source.to_str().unwrap_or("<string>");
  fragments.insert(
    "header".to_string(),
    fill(desc.header, &[("source", source), ("backend", desc.name)]),
  );
  fragments.insert("state".to_string(), String::new());
  fragments.insert("rules".to_string(), emitter.emit_rules()?);
  fragments
    .insert("entry".to_string(), fill(desc.entry_fn, &[("fn", &emitter.fn_of(&entry.id.name))]));

  for (key, value) in &j.config().defines {
    fragments.insert(format!("define.{}", key), value.clone());
  }

  // Fragments defined in the grammar with `@backend.<name> { ... }` win
  // over generated defaults.
  for (name, body) in g.backend_defs() {
    fragments.insert(name.name.clone(), body.to_string());
  }

  j.report_mut().add_note("emit", format!("emitted {} rules", g.rules().count()));

  postprocess_skeleton(desc.skeleton, &fragments, desc.required_placeholders)
}

struct Emitter<'a> {
  g:    &'a Grammar,
  desc: &'a BackendDescription,
  /// Rule name -> (memo id, function name).
  fns:  HashMap<&'a str, (usize, String)>,
}

impl<'a> Emitter<'a> {
  fn new(g: &'a Grammar, desc: &'a BackendDescription) -> Self {
    let fns = g
      .rules()
      .enumerate()
      .map(|(i, r)| {
        (r.id.name.as_str(), (i, format!("p{}_{}", i, r.id.name.to_lowercase())))
      })
      .collect();
    Emitter { g, desc, fns }
  }

  fn fn_of(&self, rule: &str) -> String {
    self.fns.get(rule).map(|(_, f)| f.clone()).unwrap_or_default()
  }

  fn emit_rules(&self) -> PolygenResult<String> {
    let mut w = CodeWriter::new(Vec::new());
    w.indent_spaces(2);
    w.indent();

    for rule in self.g.rules() {
      self.emit_rule(&mut w, rule)?;
      w.newline()?;
    }

    Ok(w.into_string())
  }

  fn emit_rule(&self, w: &mut CodeWriter<Vec<u8>>, rule: &Rule) -> PolygenResult<()> {
    let desc = self.desc;
    let (id, fn_name) = &self.fns[rule.id.name.as_str()];
    let id = id.to_string();

    w.newline()?;
    w.wrtln(&format!(
      "{} {} <- {}",
      desc.line_comment,
      rule.id.name,
      render_expr_text(&rule.expr)
    ))?;

    // The memoizing wrapper.
    w.wrtln(&fill(desc.rule_open, &[("fn", fn_name)]))?.indent();
    w.wrtln(&fill(desc.memo_lookup, &[("id", &id)]))?;
    if rule.left_recursive {
      w.wrtln(&fill(desc.seed_grow, &[("id", &id), ("fn", fn_name)]))?;
    } else {
      w.wrtln(&fill(desc.plain_eval, &[("fn", fn_name)]))?;
    }
    w.wrtln(&fill(desc.memo_store, &[("id", &id)]))?;
    w.wrtln(desc.rule_return)?;
    w.dedent().wrtln(desc.block_close)?;

    // The body: one block per alternative, tried in order.
    let has_cut = rule.expr.alts.iter().any(|a| a.items.iter().any(|p| p.cut));

    w.wrtln(&fill(desc.body_open, &[("fn", fn_name)]))?.indent();
    if has_cut {
      w.wrtln(desc.cut_init)?;
    }

    for (ai, alt) in rule.expr.alts.iter().enumerate() {
      self.emit_alt(w, ai, alt)?;
      if has_cut {
        w.wrtln(desc.cut_check)?;
      }
    }

    w.wrtln(desc.choice_fail)?;
    w.dedent().wrtln(desc.block_close)?;

    Ok(())
  }

  fn emit_alt(&self, w: &mut CodeWriter<Vec<u8>>, ai: usize, alt: &Alt) -> PolygenResult<()> {
    let desc = self.desc;
    let label = format!("alt{}", ai);
    let exit = fill(desc.alt_exit, &[("label", &label)]);

    w.wrtln(&fill(desc.alt_open, &[("label", &label)]))?.indent();
    w.wrtln(desc.alt_start_pos)?;

    let mut loop_vars = 0usize;

    for part in &alt.items {
      if part.cut {
        w.wrtln(desc.cut_mark)?;
      }

      match &part.item {
        Item::And(inner, _) => {
          let call = self.item_call(inner)?;
          w.wrtln(&fill(desc.and_step, &[("call", &call), ("exit", &exit)]))?;
        }

        Item::Not(inner, _) => {
          let call = self.item_call(inner)?;
          w.wrtln(&fill(desc.not_step, &[("call", &call), ("exit", &exit)]))?;
        }

        item if item.is_quantified() => {
          loop_vars += 1;
          self.emit_loop(w, part, loop_vars, &exit)?;
        }

        _ => {
          let call = self.item_call(&part.item)?;
          if part.in_return_tuple() {
            let var = self.binding_var(part);
            w.wrtln(&fill(desc.bind_step, &[
              ("var", var.as_str()),
              ("call", &call),
              ("exit", &exit),
            ]))?;
          } else {
            w.wrtln(&fill(desc.skip_step, &[("call", &call), ("exit", &exit)]))?;
          }
        }
      }
    }

    self.emit_alt_return(w, alt)?;
    w.dedent().wrtln(desc.block_close)?;

    Ok(())
  }

  fn emit_loop(
    &self,
    w: &mut CodeWriter<Vec<u8>>,
    part: &NamedItem,
    n: usize,
    exit: &str,
  ) -> PolygenResult<()> {
    let desc = self.desc;

    let (inner, min, max) = match &part.item {
      Item::ZeroOrOne(inner, _) => (inner.as_ref(), 0, Some(1u32)),
      Item::ZeroOrMore(inner, _) => (inner.as_ref(), 0, None),
      Item::OneOrMore(inner, _) => (inner.as_ref(), 1, None),
      Item::Repetition { item, lo, hi, .. } => (item.as_ref(), *lo, *hi),
      _ => return Err("emit_loop called on a non-quantified item".into()),
    };

    let var = format!("vs{}", n);
    let call = self.item_call(inner)?;

    w.wrtln(&fill(desc.loop_open, &[("var", &var)]))?.indent();
    if let Some(max) = max {
      w.wrtln(&fill(desc.loop_cap, &[("var", &var), ("max", &max.to_string())]))?;
    }
    w.wrtln(&fill(desc.loop_step, &[("var", &var), ("call", &call)]))?;
    w.dedent().wrtln(desc.loop_close)?;

    if min > 0 {
      w.wrtln(&fill(desc.loop_min, &[
        ("var", &var),
        ("min", &min.to_string()),
        ("exit", exit),
      ]))?;
    }

    if part.in_return_tuple() {
      let value = fill(desc.loop_value, &[("var", &var)]);
      w.wrtln(&fill(desc.let_stmt, &[("var", self.binding_var(part).as_str()), ("value", &value)]))?;
    }

    Ok(())
  }

  fn emit_alt_return(&self, w: &mut CodeWriter<Vec<u8>>, alt: &Alt) -> PolygenResult<()> {
    let desc = self.desc;
    let tuple = alt.return_tuple();

    match &alt.action {
      Some(AltAction::Inline(meta)) => {
        w.wrtln(desc.action_open)?.indent();
        for name in &tuple {
          let var = format!("{}{}", desc.var_prefix, name);
          w.wrtln(&fill(desc.action_bind, &[("name", name), ("var", var.as_str())]))?;
        }
        for line in normalize_indent(&meta.body) {
          w.wrtln(&line)?;
        }
        w.dedent().wrtln(desc.action_close)?;
        w.wrtln(&fill(desc.alt_return, &[("value", "ret")]))?;
      }

      Some(AltAction::Ref(id)) => {
        return Err(
          format!("metarule reference {} survived transformation; cannot emit", id.name).into(),
        );
      }

      None => {
        let value = match tuple.len() {
          0 => desc.value_unit.to_string(),
          1 => format!("{}{}", desc.var_prefix, tuple[0]),
          _ => {
            let members = tuple
              .iter()
              .map(|name| format!("{}{}", desc.var_prefix, name))
              .collect::<Vec<_>>()
              .join(", ");
            format!("{}{}{}", desc.tuple_open, members, desc.tuple_close)
          }
        };
        w.wrtln(&fill(desc.alt_return, &[("value", &value)]))?;
      }
    }

    Ok(())
  }

  /// The expression evaluating one simple item at position `p`.
  fn item_call(&self, item: &Item) -> PolygenResult<String> {
    let desc = self.desc;

    match item {
      Item::NonTerm(id) => match self.fns.get(id.name.as_str()) {
        Some((_, fn_name)) => Ok(fill(desc.call_rule, &[("fn", fn_name.as_str())])),
        None => Err(format!("reference to unknown rule {} during emission", id.name).into()),
      },
      Item::Ch(c, _) => {
        Ok(fill(desc.match_char, &[("ch", &format!("{:?}", c.as_char()))]))
      }
      Item::Class(class) => {
        let ranges = class
          .ranges
          .iter()
          .map(|r| format!("({}, {})", r.low(), r.high()))
          .collect::<Vec<_>>()
          .join(", ");
        Ok(fill(desc.match_class, &[("ranges", &ranges)]))
      }
      Item::Any(_) => Ok(desc.match_any.to_string()),
      _ => Err("emitter requires a normalised grammar: composite item in call position".into()),
    }
  }

  fn binding_var(&self, part: &NamedItem) -> String {
    format!("{}{}", self.desc.var_prefix, part.binding.as_deref().unwrap_or("unnamed"))
  }
}

/// Strips the common leading indentation from a semantic-action body.
fn normalize_indent(body: &str) -> Vec<String> {
  let lines: Vec<&str> = body.trim_matches('\n').lines().collect();

  let min_indent = lines
    .iter()
    .filter(|l| !l.trim().is_empty())
    .map(|l| l.len() - l.trim_start().len())
    .min()
    .unwrap_or(0);

  lines
    .iter()
    .map(|l| if l.len() >= min_indent { l[min_indent..].trim_end().to_string() } else { String::new() })
    .collect()
}
