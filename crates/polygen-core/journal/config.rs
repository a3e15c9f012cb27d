/// Configuration of a generator run, handed down from the CLI or the host
/// build script.
#[derive(Clone, Debug)]
pub struct Config {
  /// The name of the backend whose description drives emission. Also the
  /// name `@backend(name)` queries are matched against.
  pub backend: String,
  /// `-d key=value` pairs, exposed to skeletons as
  /// `@backend.define.<key>` fragments.
  pub defines: Vec<(String, String)>,
}

impl Default for Config {
  fn default() -> Self {
    Config { backend: "rust".to_string(), defines: Vec::new() }
  }
}

impl Config {
  pub fn for_backend(backend: &str) -> Self {
    Config { backend: backend.to_string(), ..Default::default() }
  }
}
