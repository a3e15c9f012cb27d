//! Resolves file-scope directives before the grammar is transformed:
//! `@include` inlining with cycle detection, `@toplevel` / `@backend(..)`
//! conditional inclusion, and `@entry` / `@ignore` flag application. The
//! output is a single flattened [Grammar].

use super::parse::parse_grammar;
use crate::{
  journal::{Journal, ReportType},
  types::{
    error_types::{
      add_cyclic_include_error,
      add_dangling_entry_error,
      add_duplicate_entry_error,
      add_missing_include_error,
      add_nested_query_error,
      add_unknown_directive_id_error,
    },
    Directive,
    Entity,
    Grammar,
    Ident,
    PolygenResult,
    Token,
  },
};
use std::{
  collections::HashMap,
  path::{Path, PathBuf},
};

/// The file access the preprocessor needs. The filesystem itself is an
/// external collaborator; tests substitute an in-memory loader.
pub trait SourceLoader {
  fn load(&self, path: &Path) -> std::io::Result<String>;

  /// The stable identity of a path, used for include-cycle detection.
  fn canonicalize(&self, path: &Path) -> PathBuf {
    path.to_path_buf()
  }
}

/// Loads grammar files from the filesystem.
#[derive(Default)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
  fn load(&self, path: &Path) -> std::io::Result<String> {
    std::fs::read_to_string(path)
  }

  fn canonicalize(&self, path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
  }
}

/// An in-memory loader for tests and embedded grammars.
#[derive(Default)]
pub struct StringLoader {
  pub files: HashMap<PathBuf, String>,
}

impl StringLoader {
  pub fn with(mut self, path: &str, source: &str) -> Self {
    self.files.insert(PathBuf::from(path), source.to_string());
    self
  }
}

impl SourceLoader for StringLoader {
  fn load(&self, path: &Path) -> std::io::Result<String> {
    self
      .files
      .get(path)
      .cloned()
      .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"))
  }
}

/// Loads and preprocesses the grammar rooted at `root_path`.
pub fn preprocess(
  j: &mut Journal,
  loader: &dyn SourceLoader,
  root_path: &Path,
) -> PolygenResult<Grammar> {
  j.set_active_report("Preprocess", ReportType::Preprocess);

  let source = match loader.load(root_path) {
    Ok(source) => source,
    Err(err) => {
      let err = crate::types::PolygenError::IOError(format!(
        "could not read {}: {}",
        root_path.to_str().unwrap_or(""),
        err
      ));
      j.report_mut().add_error(err.clone());
      return Err(err);
    }
  };

  preprocess_source(j, loader, &source, root_path)
}

/// Preprocesses a grammar given as a string, as if it were the file at
/// `origin`. The string is the root of the include tree, so `@toplevel`
/// queries inside it fire.
pub fn preprocess_source(
  j: &mut Journal,
  loader: &dyn SourceLoader,
  source: &str,
  origin: &Path,
) -> PolygenResult<Grammar> {
  if j.report().report_type != ReportType::Preprocess {
    j.set_active_report("Preprocess", ReportType::Preprocess);
  }

  let grammar = match parse_grammar(source, origin) {
    Ok(grammar) => grammar,
    Err(err) => {
      j.report_mut().add_error(err.clone());
      return Err(err);
    }
  };

  let dir = origin.parent().map(|p| p.to_path_buf()).unwrap_or_default();
  let backend = j.config().backend.clone();

  let mut pp = Preprocessor {
    j,
    loader,
    backend,
    include_stack: vec![loader.canonicalize(origin)],
    out: Vec::new(),
    pending_entry: None,
    fired_entries: Vec::new(),
    named_entries: Vec::new(),
    ignore_ids: Vec::new(),
  };

  pp.process(grammar.entities, true, &dir, false);
  Ok(pp.finish())
}

struct Preprocessor<'a> {
  j:      &'a mut Journal,
  loader: &'a dyn SourceLoader,

  /// The backend name `@backend(name)` queries are matched against.
  backend: String,

  /// Canonical paths of every file currently being inlined. A repeated
  /// entry is an include cycle.
  include_stack: Vec<PathBuf>,

  out: Vec<Entity>,

  /// A bare `@entry` waiting for the next rule entity.
  pending_entry: Option<Token>,
  /// Entry designations that fired, for duplicate detection.
  fired_entries: Vec<Token>,
  named_entries: Vec<Ident>,
  ignore_ids:    Vec<Ident>,
}

impl<'a> Preprocessor<'a> {
  fn process(&mut self, entities: Vec<Entity>, is_top: bool, dir: &Path, in_query: bool) {
    for entity in entities {
      match entity {
        Entity::Rule(mut rule) => {
          if let Some(tok) = self.pending_entry.take() {
            rule.entry = true;
            self.fired_entries.push(tok);
          }
          self.out.push(Entity::Rule(rule));
        }

        Entity::Meta(meta) => self.out.push(Entity::Meta(meta)),

        Entity::Directive(directive) => match *directive {
          Directive::Include { path, tok } => self.include(&path, &tok, dir, in_query),

          Directive::Entry { id: None, tok } => {
            if let Some(prev) = self.pending_entry.replace(tok) {
              add_dangling_entry_error(self.j, prev);
            }
          }

          Directive::Entry { id: Some(id), tok } => {
            self.fired_entries.push(tok);
            self.named_entries.push(id);
          }

          Directive::Ignore { ids, .. } => self.ignore_ids.extend(ids),

          Directive::Toplevel { body, tok } => {
            if in_query {
              add_nested_query_error(self.j, tok);
            } else if is_top {
              self.process(body, is_top, dir, true);
            }
          }

          Directive::BackendQuery { name, body, tok } => {
            if in_query {
              add_nested_query_error(self.j, tok);
            } else if name.name == self.backend {
              self.process(body, is_top, dir, true);
            }
          }

          directive @ Directive::BackendDef { .. } => {
            self.out.push(Entity::Directive(Box::new(directive)));
          }
        },
      }
    }
  }

  fn include(&mut self, path: &str, tok: &Token, dir: &Path, in_query: bool) {
    let resolved = if Path::new(path).is_absolute() {
      PathBuf::from(path)
    } else {
      dir.join(path)
    };
    let canonical = self.loader.canonicalize(&resolved);

    if self.include_stack.contains(&canonical) {
      add_cyclic_include_error(self.j, tok.clone(), &resolved);
      return;
    }

    let source = match self.loader.load(&resolved) {
      Ok(source) => source,
      Err(err) => {
        add_missing_include_error(self.j, tok.clone(), &resolved, err.to_string());
        return;
      }
    };

    let grammar = match parse_grammar(&source, &resolved) {
      Ok(grammar) => grammar,
      Err(err) => {
        self.j.report_mut().add_error(err);
        return;
      }
    };

    let child_dir = resolved.parent().map(|p| p.to_path_buf()).unwrap_or_default();

    // Inclusion is transitive but never confers the top-file identity.
    self.include_stack.push(canonical);
    self.process(grammar.entities, false, &child_dir, in_query);
    self.include_stack.pop();
  }

  fn finish(mut self) -> Grammar {
    if let Some(tok) = self.pending_entry.take() {
      add_dangling_entry_error(self.j, tok);
    }

    let mut grammar = Grammar::new(self.out);

    for id in &self.named_entries {
      match grammar.rule_mut(&id.name) {
        Some(rule) => rule.entry = true,
        None => add_unknown_directive_id_error(self.j, "entry", id),
      }
    }

    if self.fired_entries.len() > 1 {
      add_duplicate_entry_error(self.j, &self.fired_entries[0], &self.fired_entries[1]);
    }

    for id in &self.ignore_ids {
      match grammar.rule_mut(&id.name) {
        Some(rule) => rule.ignore = true,
        None => add_unknown_directive_id_error(self.j, "ignore", id),
      }
    }

    grammar
  }
}
