use std::{
  fmt::{Debug, Display},
  ops::Add,
  path::PathBuf,
  sync::Arc,
};

/// The full text of one grammar source file, shared by every [Token]
/// produced from it.
#[derive(Debug, Default)]
pub struct SourceText {
  pub path: PathBuf,
  pub text: String,
}

impl SourceText {
  pub fn new(path: PathBuf, text: String) -> Arc<Self> {
    Arc::new(SourceText { path, text })
  }
}

/// A byte range within a grammar source file, with the line and column of
/// its first character. Nodes carry a Token so diagnostics can render
/// `file:line:col` stubs and caret-underlined source snippets.
#[derive(Clone, Default)]
pub struct Token {
  src:  Option<Arc<SourceText>>,
  off:  u32,
  len:  u32,
  line: u32,
  col:  u32,
}

impl Token {
  pub fn new(src: Arc<SourceText>, off: u32, len: u32, line: u32, col: u32) -> Self {
    Token { src: Some(src), off, len, line, col }
  }

  /// A token with no source attached. Used for nodes created by the
  /// transformer that have no surface counterpart.
  pub fn empty() -> Self {
    Default::default()
  }

  pub fn path(&self) -> PathBuf {
    self.src.as_ref().map(|s| s.path.clone()).unwrap_or_default()
  }

  /// 1-based line of the first character.
  pub fn line(&self) -> u32 {
    self.line.max(1)
  }

  /// 1-based column of the first character.
  pub fn column(&self) -> u32 {
    self.col.max(1)
  }

  /// Column one past the last character, clamped to the first line of the
  /// token.
  pub fn column_end(&self) -> u32 {
    self.column() + self.slice().chars().take_while(|c| *c != '\n').count().max(1) as u32
  }

  /// The source characters the token covers.
  pub fn slice(&self) -> &str {
    match &self.src {
      Some(src) => {
        let start = self.off as usize;
        let end = (self.off + self.len) as usize;
        src.text.get(start..end).unwrap_or("")
      }
      None => "",
    }
  }

  /// `line:col` rendering used in diagnostic headers.
  pub fn loc_stub(&self) -> String {
    format!("{}:{}", self.line(), self.column())
  }

  /// Renders the source line the token starts on, with a caret underline
  /// spanning the token and `inline_msg` appended after it.
  pub fn blame(&self, inline_msg: &str) -> String {
    let src = match &self.src {
      Some(src) => src,
      None => return Default::default(),
    };

    let text = &src.text;
    let off = (self.off as usize).min(text.len());
    let line_start = text[..off].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = text[off..].find('\n').map(|i| off + i).unwrap_or(text.len());
    let line_text = &text[line_start..line_end];

    let lead = text[line_start..off].chars().count();
    let span = self.slice().chars().take_while(|c| *c != '\n').count().max(1);
    let span = span.min(line_text.chars().count().saturating_sub(lead).max(1));

    let gutter = format!("{:>4}", self.line());
    let pad = " ".repeat(gutter.len());
    let underline = format!("{}{}", " ".repeat(lead), "^".repeat(span));

    if inline_msg.is_empty() {
      format!("{} | {}\n{} | {}", gutter, line_text, pad, underline)
    } else {
      format!("{} | {}\n{} | {} {}", gutter, line_text, pad, underline, inline_msg)
    }
  }

  fn is_empty(&self) -> bool {
    self.src.is_none()
  }
}

/// Merges two tokens of the same source file into one spanning both.
impl Add for &Token {
  type Output = Token;

  fn add(self, other: &Token) -> Token {
    if self.is_empty() {
      return other.clone();
    }
    if other.is_empty() {
      return self.clone();
    }

    let (first, last) =
      if self.off <= other.off { (self, other) } else { (other, self) };

    Token {
      src:  first.src.clone(),
      off:  first.off,
      len:  (last.off + last.len).saturating_sub(first.off),
      line: first.line,
      col:  first.col,
    }
  }
}

impl Display for Token {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.slice())
  }
}

impl Debug for Token {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_fmt(format_args!("Token[{}]({:?})", self.loc_stub(), self.slice()))
  }
}

#[cfg(test)]
mod test {
  use super::*;

  fn tok(text: &str, off: u32, len: u32, line: u32, col: u32) -> Token {
    Token::new(SourceText::new("/g.peg".into(), text.into()), off, len, line, col)
  }

  #[test]
  fn blame_underlines_the_token_span() {
    let t = tok("Number <- Digit+\n", 10, 6, 1, 11);
    let blame = t.blame("promoted here");
    assert!(blame.contains("Number <- Digit+"));
    assert!(blame.contains("^^^^^^ promoted here"));
  }

  #[test]
  fn tokens_merge_into_a_span() {
    let text = "A <- B C";
    let a = tok(text, 0, 1, 1, 1);
    let c = tok(text, 7, 1, 1, 8);
    let merged = &a + &c;
    assert_eq!(merged.slice(), "A <- B C");
    assert_eq!(merged.loc_stub(), "1:1");
  }
}
