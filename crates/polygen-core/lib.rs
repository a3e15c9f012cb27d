//! # Polygen
//! A packrat parser generator.
//!
//! Polygen consumes an extended PEG grammar and produces the source code of a
//! memoizing recognizer in a chosen target language. The pipeline is:
//! grammar parse -> preprocess (`@include`, `@toplevel`, `@backend(..)`) ->
//! transform (normalisation passes) -> emit (skeleton + postprocessor).
//!
//! ## Examples:
//!
//! ### generate a parser from a grammar string
//! ```ignore
//! use polygen_core::{Config, Journal};
//!
//! let mut j = Journal::new(Some(Config::for_backend("rust")));
//! let source = polygen_core::pipeline::build_from_string(
//!   &mut j,
//!   r##"
//!   @entry
//!   Number <- Digit+ $int
//!   Digit  <- [0-9]
//!   $int { chars_to_int(digit) }
//!   "##,
//! )?;
//! ```

mod emit;
mod grammar;
mod journal;
mod transform;
mod types;
mod writer;

#[cfg(test)]
mod test;

pub mod pipeline;

pub use journal::{Config, Journal, Report, ReportType};
pub use types::{PolygenError, PolygenErrorSeverity, PolygenResult};

/// Methods for compiling a grammar into a normalised AST.
pub mod compile {
  pub use crate::{
    grammar::{
      parse_grammar,
      preprocess,
      preprocess_source,
      render_grammar,
      FsLoader,
      SourceLoader,
      StringLoader,
    },
    transform::transform_grammar,
    types::{
      Alt,
      AltAction,
      CharLit,
      ClassLit,
      Directive,
      Entity,
      Expr,
      Grammar,
      Ident,
      Item,
      MetaName,
      MetaRule,
      NamedItem,
      Range,
      Rule,
      SourceText,
      StringLit,
      Token,
    },
  };
}

/// Backend descriptions and source emission.
pub mod backend {
  pub use crate::{
    emit::{
      emit_parser,
      get_backend,
      postprocess_skeleton,
      BackendDescription,
      Runner,
      RunnerOutput,
    },
    writer::code_writer::CodeWriter,
  };
}

/// Error objects
pub mod errors {
  pub use crate::types::{ErrorClass, ErrorId, PolygenError, PolygenErrorSeverity};
}
