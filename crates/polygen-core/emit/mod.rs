//! Source emission: backend descriptions, the normalised-grammar walker,
//! and the skeleton postprocessor.

mod backend;
mod emitter;
mod postprocess;
mod rust;

pub use backend::{get_backend, BackendDescription, Runner, RunnerOutput};
pub use emitter::emit_parser;
pub use postprocess::postprocess_skeleton;
