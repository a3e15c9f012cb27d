//! The rust backend: a packrat recognizer emitted as a standalone source
//! file. The skeleton carries the parser runtime; the emitter fills the
//! `@backend.rules` and `@backend.entry` placeholders.

use super::backend::BackendDescription;

pub(crate) static RUST_BACKEND: BackendDescription = BackendDescription {
  name:           "rust",
  file_extension: "rs",
  line_comment:   "//",

  skeleton: RUST_SKELETON,
  required_placeholders: &["rules", "entry"],

  header: "//! Parser generated by polygen from {source} (backend: {backend}). Do not edit.",

  entry_fn: "impl Parser {\n  /// Parses `text`, requiring the entry rule to consume all of it.\n  pub fn \
             parse_input(text: &str) -> Result<Value, String> {\n    let mut parser = \
             Parser::new(text);\n    match parser.{fn}(0) {\n      Some((value, end)) if end == \
             parser.input.len() => Ok(value),\n      _ => Err(parser.error_message()),\n    }\n  }\n}",

  rule_open:   "fn {fn}(&mut self, pos: usize) -> PRes {",
  memo_lookup: "if let Some(res) = self.memo.get(&({id}, pos)) {\n  return res.clone();\n}",
  plain_eval:  "let res = self.{fn}_body(pos);",
  seed_grow:   "self.memo.insert(({id}, pos), None);\nlet mut res: PRes = None;\nloop {\n  let candidate = \
                self.{fn}_body(pos);\n  match (&candidate, &res) {\n    (Some((_, grown)), Some((_, best))) \
                if *grown <= *best => break,\n    (None, _) => break,\n    _ => {}\n  }\n  res = \
                candidate;\n  self.memo.insert(({id}, pos), res.clone());\n}",
  memo_store:  "self.memo.insert(({id}, pos), res.clone());",
  rule_return: "res",
  body_open:   "fn {fn}_body(&mut self, pos: usize) -> PRes {",
  block_close: "}",

  alt_open:      "'{label}: {",
  alt_start_pos: "let mut p = pos;",
  alt_exit:      "break '{label};",
  choice_fail:   "None",
  cut_init:      "let mut committed = false;\nlet mut cut_at = pos;",
  cut_mark:      "committed = true;\ncut_at = p;",
  cut_check:     "if committed {\n  self.cut_error(cut_at);\n  return None;\n}",

  match_char:  "self.expect_char(p, {ch})",
  match_class: "self.expect_class(p, &[{ranges}])",
  match_any:   "self.expect_any(p)",
  call_rule:   "self.{fn}(p)",

  bind_step: "let {var} = match {call} {\n  Some((v, np)) => {\n    p = np;\n    v\n  }\n  None => {\n    \
              {exit}\n  }\n};",
  skip_step: "match {call} {\n  Some((_, np)) => p = np,\n  None => {\n    {exit}\n  }\n}",
  and_step:  "if {call}.is_none() {\n  {exit}\n}",
  not_step:  "if {call}.is_some() {\n  {exit}\n}",

  loop_open:  "let mut {var}: Vec<Value> = Vec::new();\nloop {",
  loop_cap:   "if {var}.len() >= {max} {\n  break;\n}",
  loop_step:  "match {call} {\n  Some((v, np)) => {\n    let stalled = np == p;\n    {var}.push(v);\n    p = \
               np;\n    if stalled {\n      break;\n    }\n  }\n  None => break,\n}",
  loop_close: "}",
  loop_min:   "if {var}.len() < {min} {\n  {exit}\n}",
  loop_value: "Value::Seq({var})",

  let_stmt:     "let {var} = {value};",
  value_unit:   "Value::Unit",
  tuple_open:   "Value::Seq(vec![",
  tuple_close:  "])",
  alt_return:   "return Some(({value}, p));",
  action_bind:  "let {name} = {var};",
  action_open:  "let ret = {",
  action_close: "};",

  var_prefix: "mv_",
};

static RUST_SKELETON: &str = r##"#![allow(unused_variables, unused_mut, dead_code)]
@backend.header { header comment }

use std::collections::HashMap;

/// A value produced by a rule: a matched character, a string built by a
/// semantic action, an aggregate of an alternative's non-ignored values,
/// or nothing.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
  Ch(char),
  Str(String),
  Seq(Vec<Value>),
  Unit,
}

impl Value {
  /// The matched text, flattened.
  pub fn text(&self) -> String {
    match self {
      Value::Ch(c) => c.to_string(),
      Value::Str(s) => s.clone(),
      Value::Seq(vs) => vs.iter().map(|v| v.text()).collect(),
      Value::Unit => String::new(),
    }
  }
}

pub type PRes = Option<(Value, usize)>;

pub struct Parser {
  input: Vec<char>,
  /// Packrat memo: one slot per (rule, position) pair, for this parse
  /// only.
  memo: HashMap<(u32, usize), PRes>,
  /// Furthest position a terminal failed at.
  failure: usize,
  /// Position of the first cut whose committed alternative failed.
  cut: Option<usize>,
@backend.state { extra parser state }
}

impl Parser {
  pub fn new(text: &str) -> Self {
    Parser { input: text.chars().collect(), memo: HashMap::new(), failure: 0, cut: None }
  }

  fn fail(&mut self, pos: usize) -> PRes {
    if pos > self.failure {
      self.failure = pos;
    }
    None
  }

  fn expect_char(&mut self, pos: usize, c: char) -> PRes {
    match self.input.get(pos) {
      Some(i) if *i == c => Some((Value::Ch(c), pos + 1)),
      _ => self.fail(pos),
    }
  }

  fn expect_class(&mut self, pos: usize, ranges: &[(u32, u32)]) -> PRes {
    match self.input.get(pos) {
      Some(i) if ranges.iter().any(|(lo, hi)| (*i as u32) >= *lo && (*i as u32) <= *hi) => {
        Some((Value::Ch(*i), pos + 1))
      }
      _ => self.fail(pos),
    }
  }

  fn expect_any(&mut self, pos: usize) -> PRes {
    match self.input.get(pos) {
      Some(i) => Some((Value::Ch(*i), pos + 1)),
      None => self.fail(pos),
    }
  }

  fn cut_error(&mut self, pos: usize) {
    if self.cut.is_none() {
      self.cut = Some(pos);
    }
  }

  fn error_message(&self) -> String {
    match self.cut {
      Some(pos) => format!("parse error at offset {} (committed by cut)", pos),
      None => format!("parse error at offset {}", self.failure),
    }
  }

@backend.rules { rule functions }
}

@backend.entry { entry point }
"##;
