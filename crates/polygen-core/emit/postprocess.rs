//! Substitutes `@backend.<name> { placeholder }` directives inside a
//! skeleton with generator-supplied fragments. Unknown directives are
//! left untouched; a known name appearing twice is an error, since a
//! fragment is consumed by its first substitution.

use crate::types::{
  error_types::{create_duplicate_skeleton_directive_error, create_missing_placeholder_error},
  PolygenResult,
};
use std::collections::{HashMap, HashSet};

const DIRECTIVE_PREFIX: &str = "@backend.";

pub fn postprocess_skeleton(
  skeleton: &str,
  fragments: &HashMap<String, String>,
  required: &[&str],
) -> PolygenResult<String> {
  let mut out = String::with_capacity(skeleton.len());
  let mut rest = skeleton;
  let mut substituted: HashSet<String> = HashSet::new();

  while let Some(at) = rest.find(DIRECTIVE_PREFIX) {
    let (before, directive) = rest.split_at(at);
    out.push_str(before);

    match parse_directive(directive) {
      Some((name, consumed)) if fragments.contains_key(&name) => {
        if !substituted.insert(name.clone()) {
          return Err(create_duplicate_skeleton_directive_error(&name));
        }
        out.push_str(&fragments[&name]);
        rest = &directive[consumed..];
      }
      _ => {
        // Not a well-formed directive, or no fragment for it: keep the
        // text as it stands.
        out.push_str(DIRECTIVE_PREFIX);
        rest = &directive[DIRECTIVE_PREFIX.len()..];
      }
    }
  }
  out.push_str(rest);

  for name in required {
    if !substituted.contains(*name) {
      return Err(create_missing_placeholder_error(name));
    }
  }

  Ok(out)
}

/// Parses `@backend.<name> { ... }` at the start of `text`. Returns the
/// directive name and the byte length of the whole directive.
fn parse_directive(text: &str) -> Option<(String, usize)> {
  let body = &text[DIRECTIVE_PREFIX.len()..];

  let name_len = body
    .char_indices()
    .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '.'))
    .map(|(i, _)| i)
    .unwrap_or(body.len());
  if name_len == 0 {
    return None;
  }
  let name = &body[..name_len];

  let after_name = &body[name_len..];
  let ws_len = after_name.len() - after_name.trim_start().len();
  let after_ws = &after_name[ws_len..];
  if !after_ws.starts_with('{') {
    return None;
  }

  let close = after_ws.find('}')?;
  let consumed = DIRECTIVE_PREFIX.len() + name_len + ws_len + close + 1;

  Some((name.to_string(), consumed))
}

#[cfg(test)]
mod test {
  use super::*;

  fn fragments(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
  }

  #[test]
  fn substitutes_named_fragments() {
    let out = postprocess_skeleton(
      "before @backend.rules { placeholder } after",
      &fragments(&[("rules", "fn generated() {}")]),
      &["rules"],
    )
    .unwrap();
    assert_eq!(out, "before fn generated() {} after");
  }

  #[test]
  fn unknown_directives_are_left_unchanged() {
    let skeleton = "keep @backend.mystery { ? } this";
    let out = postprocess_skeleton(skeleton, &fragments(&[]), &[]).unwrap();
    assert_eq!(out, skeleton);
  }

  #[test]
  fn duplicate_directives_are_rejected() {
    let err = postprocess_skeleton(
      "@backend.rules { a } @backend.rules { b }",
      &fragments(&[("rules", "x")]),
      &["rules"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("more than once"), "{}", err);
  }

  #[test]
  fn missing_required_placeholders_are_rejected() {
    let err =
      postprocess_skeleton("no placeholders here", &fragments(&[("rules", "x")]), &["rules"])
        .unwrap_err();
    assert!(err.to_string().contains("missing"), "{}", err);
  }
}
