//! The grammar reader: decodes a source file into positioned characters
//! from which the parser builds [Token]s.

use crate::types::{SourceText, Token};
use std::sync::Arc;

/// One decoded character with its byte offset and 1-based line/column.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ChPos {
  pub ch:   char,
  pub off:  u32,
  pub line: u32,
  pub col:  u32,
}

/// A positioned cursor over the characters of one grammar file.
pub(crate) struct Reader {
  src:   Arc<SourceText>,
  chars: Vec<ChPos>,
  pub pos: usize,
}

impl Reader {
  pub fn new(src: Arc<SourceText>) -> Self {
    let mut chars = Vec::with_capacity(src.text.len());
    let (mut line, mut col) = (1u32, 1u32);

    for (off, ch) in src.text.char_indices() {
      chars.push(ChPos { ch, off: off as u32, line, col });
      if ch == '\n' {
        line += 1;
        col = 1;
      } else {
        col += 1;
      }
    }

    Reader { src, chars, pos: 0 }
  }

  pub fn at_end(&self) -> bool {
    self.pos >= self.chars.len()
  }

  pub fn peek(&self) -> Option<char> {
    self.chars.get(self.pos).map(|c| c.ch)
  }

  pub fn peek_at(&self, ahead: usize) -> Option<char> {
    self.chars.get(self.pos + ahead).map(|c| c.ch)
  }

  pub fn bump(&mut self) -> Option<char> {
    let ch = self.peek();
    if ch.is_some() {
      self.pos += 1;
    }
    ch
  }

  /// Consumes `c` if it is the next character.
  pub fn eat(&mut self, c: char) -> bool {
    if self.peek() == Some(c) {
      self.pos += 1;
      true
    } else {
      false
    }
  }

  /// Consumes `s` if the next characters spell it out.
  pub fn eat_str(&mut self, s: &str) -> bool {
    for (i, c) in s.chars().enumerate() {
      if self.peek_at(i) != Some(c) {
        return false;
      }
    }
    self.pos += s.chars().count();
    true
  }

  /// A token spanning the characters from `start` to the current position.
  pub fn token_from(&self, start: usize) -> Token {
    let end = self.pos.min(self.chars.len());
    let (off, line, col) = match self.chars.get(start) {
      Some(c) => (c.off, c.line, c.col),
      None => (self.src.text.len() as u32, 0, 0),
    };
    let end_off = match self.chars.get(end) {
      Some(c) => c.off,
      None => self.src.text.len() as u32,
    };
    Token::new(self.src.clone(), off, end_off.saturating_sub(off), line, col)
  }

  /// A single-character token at an arbitrary position. Used for
  /// "expected X here" diagnostics.
  pub fn token_at(&self, at: usize) -> Token {
    match self.chars.get(at.min(self.chars.len().saturating_sub(1))) {
      Some(c) => Token::new(self.src.clone(), c.off, c.ch.len_utf8() as u32, c.line, c.col),
      None => Token::new(self.src.clone(), 0, 0, 1, 1),
    }
  }
}

pub(crate) fn is_ident_start(c: char) -> bool {
  c.is_ascii_alphabetic() || c == '_'
}

pub(crate) fn is_ident_continue(c: char) -> bool {
  c.is_ascii_alphanumeric() || c == '_'
}
