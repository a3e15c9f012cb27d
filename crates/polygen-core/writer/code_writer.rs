//! A chaining writer for emitting indented target-language source.

use std::io::{Result, Write};

pub struct CodeWriter<W: Write> {
  output:        W,
  indent:        usize,
  indent_spaces: usize,
  line_open:     bool,
}

impl<W: Write> CodeWriter<W> {
  pub fn new(output: W) -> Self {
    CodeWriter { output, indent: 0, indent_spaces: 2, line_open: false }
  }

  /// Sets the width of one indentation step.
  pub fn indent_spaces(&mut self, spaces: usize) -> &mut Self {
    self.indent_spaces = spaces;
    self
  }

  pub fn indent(&mut self) -> &mut Self {
    self.indent += 1;
    self
  }

  pub fn dedent(&mut self) -> &mut Self {
    self.indent = self.indent.saturating_sub(1);
    self
  }

  pub fn increase_indent(&mut self) {
    self.indent += 1;
  }

  pub fn decrease_indent(&mut self) {
    self.indent = self.indent.saturating_sub(1);
  }

  /// Appends to the current line. Embedded newlines continue at the
  /// current indentation.
  pub fn wrt(&mut self, string: &str) -> Result<&mut Self> {
    let mut first = true;
    for line in string.split('\n') {
      if !first {
        self.output.write_all(b"\n")?;
        self.line_open = false;
      }
      if !line.is_empty() {
        if !self.line_open {
          self.write_indent()?;
          self.line_open = true;
        }
        self.output.write_all(line.as_bytes())?;
      }
      first = false;
    }
    Ok(self)
  }

  /// Starts a fresh line and writes `string` onto it.
  pub fn wrtln(&mut self, string: &str) -> Result<&mut Self> {
    if self.line_open {
      self.output.write_all(b"\n")?;
      self.line_open = false;
    }
    self.wrt(string)
  }

  pub fn write_line(&mut self, string: &str) -> Result<&mut Self> {
    self.wrtln(string)
  }

  pub fn newline(&mut self) -> Result<&mut Self> {
    self.output.write_all(b"\n")?;
    self.line_open = false;
    Ok(self)
  }

  /// A fresh writer at the same indentation, for staging fragments that
  /// may be discarded.
  pub fn checkpoint<B: Write + Default>(&self) -> CodeWriter<B> {
    CodeWriter {
      output:        B::default(),
      indent:        self.indent,
      indent_spaces: self.indent_spaces,
      line_open:     false,
    }
  }

  pub fn into_output(self) -> W {
    self.output
  }

  fn write_indent(&mut self) -> Result<()> {
    let pad = " ".repeat(self.indent * self.indent_spaces);
    self.output.write_all(pad.as_bytes())
  }
}

impl CodeWriter<Vec<u8>> {
  pub fn into_string(self) -> String {
    String::from_utf8(self.output).unwrap_or_default()
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn indentation_tracks_blocks() {
    let mut w = CodeWriter::new(Vec::new());
    w.wrtln("fn f() {").unwrap().indent();
    w.wrtln("body();").unwrap();
    w.dedent().wrtln("}").unwrap();
    assert_eq!(w.into_string(), "fn f() {\n  body();\n}");
  }

  #[test]
  fn wrt_appends_to_the_open_line() {
    let mut w = CodeWriter::new(Vec::new());
    w.wrtln("let x = ").unwrap();
    w.wrt("1;").unwrap();
    assert_eq!(w.into_string(), "let x = 1;");
  }
}
