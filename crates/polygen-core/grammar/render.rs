//! Renders a [Grammar] back to grammar-language text. Parsing the rendered
//! text yields a structurally identical grammar; the round-trip property
//! tests rely on this.

use crate::types::{
  Alt,
  AltAction,
  CharLit,
  Directive,
  Entity,
  Expr,
  Grammar,
  Item,
  MetaName,
  MetaRule,
  NamedItem,
  Range,
  Rule,
};

pub fn render_grammar(g: &Grammar) -> String {
  let mut out = String::new();

  for entity in &g.entities {
    match entity {
      Entity::Rule(rule) => render_rule(&mut out, rule),
      Entity::Meta(meta) => render_metarule(&mut out, meta),
      Entity::Directive(directive) => render_directive(&mut out, directive),
    }
  }

  out
}

fn render_rule(out: &mut String, rule: &Rule) {
  if rule.entry {
    out.push_str("@entry\n");
  }
  if rule.ignore {
    out.push_str(&format!("@ignore {{ {} }}\n", rule.id.name));
  }
  out.push_str(&format!("{} <- {}\n", rule.id.name, render_expr(&rule.expr)));
}

fn render_metarule(out: &mut String, meta: &MetaRule) {
  match &meta.id {
    Some(id) => out.push_str(&format!("${} {{{}}}\n", id.name, escape_body(&meta.body))),
    None => out.push_str(&format!("${{{}}}\n", escape_body(&meta.body))),
  }
}

fn render_directive(out: &mut String, directive: &Directive) {
  match directive {
    Directive::Include { path, .. } => {
      out.push_str(&format!("@include \"{}\"\n", escape_chars(path.chars().map(u32::from), '"')))
    }
    Directive::Entry { id: Some(id), .. } => out.push_str(&format!("@entry {}\n", id.name)),
    Directive::Entry { id: None, .. } => out.push_str("@entry\n"),
    Directive::Ignore { ids, .. } => {
      let names = ids.iter().map(|i| i.name.as_str()).collect::<Vec<_>>().join(" ");
      out.push_str(&format!("@ignore {{ {} }}\n", names));
    }
    Directive::Toplevel { body, .. } => {
      out.push_str("@toplevel {\n");
      for entity in body {
        match entity {
          Entity::Rule(rule) => render_rule(out, rule),
          Entity::Meta(meta) => render_metarule(out, meta),
          Entity::Directive(d) => render_directive(out, d),
        }
      }
      out.push_str("}\n");
    }
    Directive::BackendQuery { name, body, .. } => {
      out.push_str(&format!("@backend({}) {{\n", name.name));
      for entity in body {
        match entity {
          Entity::Rule(rule) => render_rule(out, rule),
          Entity::Meta(meta) => render_metarule(out, meta),
          Entity::Directive(d) => render_directive(out, d),
        }
      }
      out.push_str("}\n");
    }
    Directive::BackendDef { name, body, .. } => {
      out.push_str(&format!("@backend.{} {{{}}}\n", name.name, escape_body(body)));
    }
  }
}

fn render_expr(expr: &Expr) -> String {
  expr.alts.iter().map(render_alt).collect::<Vec<_>>().join(" / ")
}

/// One-line rendering of an expression, for comments in emitted source.
pub(crate) fn render_expr_text(expr: &Expr) -> String {
  render_expr(expr)
}

fn render_alt(alt: &Alt) -> String {
  let mut parts = alt.items.iter().map(render_part).collect::<Vec<_>>();

  match &alt.action {
    Some(AltAction::Ref(id)) => parts.push(format!("${}", id.name)),
    Some(AltAction::Inline(meta)) => parts.push(format!("${{{}}}", escape_body(&meta.body))),
    None => {}
  }

  parts.join(" ")
}

fn render_part(part: &NamedItem) -> String {
  let cut = if part.cut { "^ " } else { "" };
  let meta = match &part.metaname {
    Some(MetaName::Name(name)) => format!("{}:", name),
    Some(MetaName::Ignore) => "_:".to_string(),
    None => String::new(),
  };
  format!("{}{}{}", cut, meta, render_item(&part.item))
}

fn render_item(item: &Item) -> String {
  match item {
    Item::NonTerm(id) => id.name.clone(),
    Item::Group(expr, _) => format!("( {} )", render_expr(expr)),
    Item::Literal(lit) => {
      format!("'{}'", escape_chars(lit.chars.iter().map(|c| c.code), '\''))
    }
    Item::Ch(c, _) => format!("'{}'", escape_chars([c.code].into_iter(), '\'')),
    Item::Class(class) => format!("[{}]", class.ranges.iter().map(render_range).collect::<String>()),
    Item::Any(_) => ".".to_string(),
    Item::ZeroOrOne(inner, _) => format!("{}?", render_item(inner)),
    Item::ZeroOrMore(inner, _) => format!("{}*", render_item(inner)),
    Item::OneOrMore(inner, _) => format!("{}+", render_item(inner)),
    Item::Repetition { item, lo, hi: Some(hi), .. } => {
      format!("{}{{{},{}}}", render_item(item), lo, hi)
    }
    Item::Repetition { item, lo, hi: None, .. } => format!("{}{{{}}}", render_item(item), lo),
    Item::And(inner, _) => format!("&{}", render_item(inner)),
    Item::Not(inner, _) => format!("!{}", render_item(inner)),
  }
}

fn render_range(range: &Range) -> String {
  match range.end {
    Some(end) => format!("{}-{}", class_char(range.begin), class_char(end)),
    None => class_char(range.begin),
  }
}

fn class_char(c: CharLit) -> String {
  escape_one(c.code, &['[', ']'])
}

fn escape_chars(codes: impl Iterator<Item = u32>, quote: char) -> String {
  codes.map(|c| escape_one(c, &[quote])).collect()
}

fn escape_one(code: u32, quoted: &[char]) -> String {
  match char::from_u32(code) {
    Some('\n') => "\\n".to_string(),
    Some('\r') => "\\r".to_string(),
    Some('\t') => "\\t".to_string(),
    Some('\\') => "\\\\".to_string(),
    Some(c) if quoted.contains(&c) => format!("\\{}", c),
    Some(c) if (c as u32) >= 0x20 => c.to_string(),
    _ if code <= 0xFFFF => format!("\\u{:04X}", code),
    _ => char::from_u32(code).map(String::from).unwrap_or_default(),
  }
}

fn escape_body(body: &str) -> String {
  body.replace('}', "\\}")
}
