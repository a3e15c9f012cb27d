//! Backend descriptions: the named template sets the emitter renders a
//! normalised grammar through, plus the runner interface the equivalency
//! harness drives generated parsers with.

use crate::types::{error_types::create_unknown_backend_error, PolygenResult};
use std::path::Path;

/// Everything the emitter needs to know about one code-generation target:
/// the skeleton, the naming conventions, and a template for every
/// construct of the normalised grammar. Templates use `{slot}`
/// placeholders filled by [fill].
pub struct BackendDescription {
  pub name:           &'static str,
  pub file_extension: &'static str,
  pub line_comment:   &'static str,

  /// Target-language source with `@backend.<name> { ... }` placeholders.
  pub skeleton: &'static str,
  /// Placeholder names the skeleton must contain.
  pub required_placeholders: &'static [&'static str],

  /// The default `header` fragment. Slots: `{source}`, `{backend}`.
  pub header: &'static str,
  /// The entry-point fragment. Slots: `{fn}`.
  pub entry_fn: &'static str,

  // Rule scaffolding. Slots: `{fn}` rule function, `{id}` memo key.
  pub rule_open:  &'static str,
  pub memo_lookup: &'static str,
  pub plain_eval: &'static str,
  /// The seed-and-grow wrapper for left-recursive rules.
  pub seed_grow:  &'static str,
  pub memo_store: &'static str,
  pub rule_return: &'static str,
  pub body_open:  &'static str,
  pub block_close: &'static str,

  // Alternative scaffolding. Slots: `{label}`.
  pub alt_open:      &'static str,
  pub alt_start_pos: &'static str,
  pub alt_exit:      &'static str,
  pub choice_fail:   &'static str,
  pub cut_init:      &'static str,
  pub cut_mark:      &'static str,
  pub cut_check:     &'static str,

  // Terminal matchers and rule calls. Slots: `{ch}`, `{ranges}`, `{fn}`.
  pub match_char:  &'static str,
  pub match_class: &'static str,
  pub match_any:   &'static str,
  pub call_rule:   &'static str,

  // Sequencing. Slots: `{var}`, `{call}`, `{exit}`.
  pub bind_step: &'static str,
  pub skip_step: &'static str,
  pub and_step:  &'static str,
  pub not_step:  &'static str,

  // Quantifier loops. Slots: `{var}`, `{call}`, `{min}`, `{max}`, `{exit}`.
  pub loop_open:  &'static str,
  pub loop_cap:   &'static str,
  pub loop_step:  &'static str,
  pub loop_close: &'static str,
  pub loop_min:   &'static str,
  pub loop_value: &'static str,

  // Value construction and semantic actions. Slots: `{var}`, `{value}`,
  // `{name}`.
  pub let_stmt:    &'static str,
  pub value_unit:  &'static str,
  pub tuple_open:  &'static str,
  pub tuple_close: &'static str,
  pub alt_return:  &'static str,
  pub action_bind: &'static str,
  pub action_open: &'static str,
  pub action_close: &'static str,

  /// Prefix for the locals holding matched metavariable values.
  pub var_prefix: &'static str,
}

/// Looks a backend description up by name. The registry is populated at
/// startup; backends are compiled in, not hot-loaded.
pub fn get_backend(name: &str) -> PolygenResult<&'static BackendDescription> {
  match name {
    "rust" => Ok(&super::rust::RUST_BACKEND),
    _ => Err(create_unknown_backend_error(name)),
  }
}

/// Substitutes `{slot}` placeholders in a template.
pub(crate) fn fill(template: &str, subs: &[(&str, &str)]) -> String {
  let mut out = template.to_string();
  for (slot, value) in subs {
    out = out.replace(&format!("{{{}}}", slot), value);
  }
  out
}

/// The output of one run of a generated parser under a [Runner].
pub struct RunnerOutput {
  pub stdout:    String,
  pub exit_code: i32,
}

/// The interface the backend equivalency harness drives a generated
/// parser through. Implementations live with the harness, outside the
/// core.
pub trait Runner {
  /// Compiles the generated parser at `source_path` into a runnable
  /// artifact.
  fn compile(&mut self, source_path: &Path) -> PolygenResult<()>;

  /// Runs the compiled parser over one input file.
  fn run(&mut self, input_path: &Path) -> PolygenResult<RunnerOutput>;

  /// Removes build artifacts.
  fn cleanup(&mut self) -> PolygenResult<()>;
}
