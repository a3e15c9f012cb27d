pub mod code_writer;
