use super::Token;
use std::{fmt::Display, path::PathBuf};

/// Severity levels of PolygenErrors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum PolygenErrorSeverity {
  Hint,
  Warning,
  Critical,
}

/// The error families of the generator, one per pipeline surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
  Lexical,
  Syntax,
  Include,
  Semantic,
  Backend,
}

impl Display for ErrorClass {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(match self {
      ErrorClass::Lexical => "lexical",
      ErrorClass::Syntax => "syntax",
      ErrorClass::Include => "include",
      ErrorClass::Semantic => "semantic",
      ErrorClass::Backend => "backend",
    })
  }
}

/// A stable identifier for one error kind: class, numeric code, and a
/// human-oriented slug.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ErrorId {
  pub class: ErrorClass,
  pub code:  u32,
  pub slug:  &'static str,
}

impl From<(ErrorClass, u32, &'static str)> for ErrorId {
  fn from((class, code, slug): (ErrorClass, u32, &'static str)) -> Self {
    ErrorId { class, code, slug }
  }
}

/// Stores every error type that can be generated by the grammar pipeline.
/// Also wraps common error types.
#[derive(Clone, Debug)]
pub enum PolygenError {
  /// A diagnostic anchored to a single source location.
  SourceError {
    loc:        Token,
    path:       PathBuf,
    id:         ErrorId,
    msg:        String,
    inline_msg: String,
    severity:   PolygenErrorSeverity,
  },

  /// A diagnostic spanning several source locations.
  SourcesError {
    id:       ErrorId,
    sources:  Vec<(Token, PathBuf, String)>,
    msg:      String,
    severity: PolygenErrorSeverity,
  },

  IOError(String),

  Text(String),

  Many {
    message: String,
    errors:  Vec<PolygenError>,
  },
}

use PolygenError::*;

impl PolygenError {
  pub fn get_severity(&self) -> PolygenErrorSeverity {
    match self {
      SourceError { severity, .. } | SourcesError { severity, .. } => *severity,
      Many { errors, .. } => errors
        .iter()
        .map(|e| e.get_severity())
        .max()
        .unwrap_or(PolygenErrorSeverity::Critical),
      _ => PolygenErrorSeverity::Critical,
    }
  }

  pub fn is_critical(&self) -> bool {
    self.get_severity() == PolygenErrorSeverity::Critical
  }

  pub fn is_warning(&self) -> bool {
    self.get_severity() == PolygenErrorSeverity::Warning
  }

  /// Compares the slug of an error with a string, returning `true` if the
  /// two match.
  pub fn is(&self, slug: &str) -> bool {
    match self {
      SourceError { id, .. } | SourcesError { id, .. } => id.slug == slug,
      Many { errors, .. } => errors.iter().any(|e| e.is(slug)),
      _ => false,
    }
  }
}

impl From<std::io::Error> for PolygenError {
  fn from(err: std::io::Error) -> Self {
    IOError(err.to_string())
  }
}

impl From<std::fmt::Error> for PolygenError {
  fn from(err: std::fmt::Error) -> Self {
    Text(err.to_string())
  }
}

impl From<&str> for PolygenError {
  fn from(err: &str) -> Self {
    Text(err.to_string())
  }
}

impl From<String> for PolygenError {
  fn from(err: String) -> Self {
    Text(err)
  }
}

impl Display for PolygenError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      SourceError { loc, path, id, msg, inline_msg, .. } => f.write_fmt(format_args!(
        "{}:{}: {}: {}\n{}",
        path.to_str().unwrap_or(""),
        loc.loc_stub(),
        id.class,
        msg,
        loc.blame(inline_msg),
      )),
      SourcesError { id, sources, msg, .. } => {
        f.write_fmt(format_args!("{}: {}", id.class, msg))?;
        for (loc, path, note) in sources {
          f.write_fmt(format_args!(
            "\n{}:{}:\n{}",
            path.to_str().unwrap_or(""),
            loc.loc_stub(),
            loc.blame(note),
          ))?;
        }
        Ok(())
      }
      IOError(err_string) => f.write_fmt(format_args!("IO Error: {}", err_string)),
      Text(err_string) => f.write_str(err_string),
      Many { message, errors } => f.write_fmt(format_args!(
        "{}\n{}",
        message,
        errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("\n")
      )),
    }
  }
}
