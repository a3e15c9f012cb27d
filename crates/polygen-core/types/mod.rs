mod ast;
mod error;
mod token;

pub(crate) mod error_types;

pub use ast::*;
pub use error::*;
pub use token::*;

/// The suffix separating a parent rule name from a synthetic-rule counter.
pub const GEN_SEPARATOR: &str = "__GEN_";

pub type PolygenResult<T> = std::result::Result<T, PolygenError>;
