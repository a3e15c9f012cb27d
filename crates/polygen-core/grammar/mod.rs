//! Grammar-language surface: the reader, the packrat parser, the
//! preprocessor, and the grammar renderer.

pub(crate) mod lex;
mod parse;
mod preprocess;
mod render;

pub use parse::parse_grammar;
pub use preprocess::{preprocess, preprocess_source, FsLoader, SourceLoader, StringLoader};
pub use render::render_grammar;

pub(crate) use render::render_expr_text;
