//! A packrat recognizer for the Polygen grammar language. Produces an
//! unnormalised [Grammar]; every diagnostic carries the origin of the
//! offending characters.

use super::lex::{is_ident_continue, is_ident_start, Reader};
use crate::types::{
  error_types::{create_malformed_escape_error, create_syntax_error, create_unterminated_error},
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
  PolygenError,
  PolygenResult,
  Range,
  Rule,
  SourceText,
  StringLit,
  Token,
};
use std::{collections::{BTreeSet, HashMap}, path::Path};

/// Parses one grammar file. `origin` is recorded in every token the parse
/// produces.
pub fn parse_grammar(source: &str, origin: &Path) -> PolygenResult<Grammar> {
  let src = SourceText::new(origin.to_path_buf(), source.to_string());
  Parser::new(Reader::new(src)).grammar()
}

/// Sentinel for a failed sub-parse. The interesting data (furthest failure
/// offset and expected set) lives on the parser itself.
struct Fail;

type PResult<T> = Result<T, Fail>;

struct Parser {
  r: Reader,

  /// Packrat memo for the backtracked-into nonterminals, keyed by input
  /// position.
  primary_memo: HashMap<usize, Option<(Item, usize)>>,

  /// Furthest position any sub-parse failed at, and what was expected
  /// there. Becomes the "expected X at Y" syntax error.
  furthest: usize,
  expected: BTreeSet<&'static str>,

  /// Lexical errors abort the parse instead of backtracking.
  hard_error: Option<PolygenError>,
}

impl Parser {
  fn new(r: Reader) -> Self {
    Parser {
      r,
      primary_memo: HashMap::new(),
      furthest: 0,
      expected: BTreeSet::new(),
      hard_error: None,
    }
  }

  fn grammar(mut self) -> PolygenResult<Grammar> {
    self.ws();

    let mut entities = Vec::new();

    while !self.r.at_end() {
      match self.entity() {
        Ok(entity) => {
          entities.push(entity);
          self.ws();
        }
        Err(_) => return Err(self.into_error()),
      }
    }

    Ok(Grammar::new(entities))
  }

  fn into_error(mut self) -> PolygenError {
    if let Some(err) = self.hard_error.take() {
      return err;
    }
    let expected = self.expected.iter().copied().collect::<Vec<_>>().join(" or ");
    let expected = if expected.is_empty() { "a grammar entity".to_string() } else { expected };
    create_syntax_error(self.r.token_at(self.furthest), expected)
  }

  // -------------------------------------------------------------------------
  // Failure bookkeeping

  fn fail(&mut self, expected: &'static str) -> Fail {
    if self.r.pos > self.furthest {
      self.furthest = self.r.pos;
      self.expected.clear();
    }
    if self.r.pos == self.furthest {
      self.expected.insert(expected);
    }
    Fail
  }

  fn hard(&mut self, err: PolygenError) -> Fail {
    if self.hard_error.is_none() {
      self.hard_error = Some(err);
    }
    Fail
  }

  // -------------------------------------------------------------------------
  // Lexical layer

  /// Skips whitespace and `#` comments.
  fn ws(&mut self) {
    loop {
      match self.r.peek() {
        Some(' ') | Some('\t') | Some('\n') | Some('\r') => {
          self.r.bump();
        }
        Some('#') => {
          while let Some(c) = self.r.bump() {
            if c == '\n' {
              break;
            }
          }
        }
        _ => break,
      }
    }
  }

  fn ident(&mut self) -> PResult<Ident> {
    let start = self.r.pos;
    match self.r.peek() {
      Some(c) if is_ident_start(c) => {
        while matches!(self.r.peek(), Some(c) if is_ident_continue(c)) {
          self.r.bump();
        }
        let tok = self.r.token_from(start);
        let name = tok.slice().to_string();
        Ok(Ident::new(name, tok))
      }
      _ => Err(self.fail("an identifier")),
    }
  }

  fn expect(&mut self, c: char, label: &'static str) -> PResult<()> {
    if self.r.eat(c) {
      Ok(())
    } else {
      Err(self.fail(label))
    }
  }

  fn number(&mut self) -> PResult<u32> {
    let start = self.r.pos;
    while matches!(self.r.peek(), Some(c) if c.is_ascii_digit()) {
      self.r.bump();
    }
    if self.r.pos == start {
      return Err(self.fail("a number"));
    }
    self.r.token_from(start).slice().parse().map_err(|_| self.fail("a smaller number"))
  }

  /// Decodes one literal character, resolving escape sequences. Returns
  /// its code point.
  fn char_or_escape(&mut self) -> PResult<u32> {
    let start = self.r.pos;

    if !self.r.eat('\\') {
      return match self.r.bump() {
        Some(c) => Ok(c as u32),
        None => Err(self.fail("a character")),
      };
    }

    let code = match self.r.bump() {
      Some('n') => '\n' as u32,
      Some('r') => '\r' as u32,
      Some('t') => '\t' as u32,
      Some(c @ ('\'' | '"' | '[' | ']' | '\\')) => c as u32,
      Some('u') => {
        let mut code = 0u32;
        for _ in 0..4 {
          match self.r.bump().and_then(|c| c.to_digit(16)) {
            Some(d) => code = code * 16 + d,
            None => {
              let err = create_malformed_escape_error(self.r.token_from(start));
              return Err(self.hard(err));
            }
          }
        }
        code
      }
      Some(d1 @ '0'..='7') => {
        // Octal: \oo, or \ooo when the leading digit keeps the value
        // inside the byte range.
        let d2 = match self.r.peek() {
          Some(d @ '0'..='7') => {
            self.r.bump();
            d
          }
          _ => {
            let err = create_malformed_escape_error(self.r.token_from(start));
            return Err(self.hard(err));
          }
        };
        let mut code = (d1 as u32 - '0' as u32) * 8 + (d2 as u32 - '0' as u32);
        if d1 <= '2' {
          if let Some(d3 @ '0'..='7') = self.r.peek() {
            self.r.bump();
            code = code * 8 + (d3 as u32 - '0' as u32);
          }
        }
        code
      }
      _ => {
        let err = create_malformed_escape_error(self.r.token_from(start));
        return Err(self.hard(err));
      }
    };

    Ok(code)
  }

  /// `'...'` / `"..."` literal bodies.
  fn quoted(&mut self, quote: char) -> PResult<StringLit> {
    let start = self.r.pos;
    self.r.bump();

    let mut chars = Vec::new();
    loop {
      match self.r.peek() {
        None | Some('\n') => {
          let err = create_unterminated_error(self.r.token_from(start), "literal");
          return Err(self.hard(err));
        }
        Some(c) if c == quote => {
          self.r.bump();
          break;
        }
        _ => chars.push(CharLit { code: self.char_or_escape()? }),
      }
    }

    Ok(StringLit { chars, tok: self.r.token_from(start) })
  }

  /// `[ ... ]` character classes. A `-` directly before the closing `]`
  /// is a literal member; the class closes at the first unescaped `]`.
  fn class(&mut self) -> PResult<ClassLit> {
    let start = self.r.pos;
    self.r.bump();

    let mut ranges = Vec::new();
    loop {
      match self.r.peek() {
        None => {
          let err = create_unterminated_error(self.r.token_from(start), "class");
          return Err(self.hard(err));
        }
        Some(']') => {
          self.r.bump();
          break;
        }
        _ => {
          let begin = CharLit { code: self.char_or_escape()? };
          if self.r.peek() == Some('-') && !matches!(self.r.peek_at(1), Some(']') | None) {
            self.r.bump();
            let end = CharLit { code: self.char_or_escape()? };
            ranges.push(Range { begin, end: Some(end) });
          } else {
            ranges.push(Range { begin, end: None });
          }
        }
      }
    }

    Ok(ClassLit { ranges, tok: self.r.token_from(start) })
  }

  /// `{ ... }` metarule and backend-definition bodies. Opaque except for
  /// the `\}` escape; everything else, backslashes included, is kept
  /// verbatim.
  fn meta_body(&mut self) -> PResult<(String, Token)> {
    let start = self.r.pos;
    self.expect('{', "`{`")?;

    let mut body = String::new();
    loop {
      match self.r.bump() {
        None => {
          let err = create_unterminated_error(self.r.token_from(start), "metarule body");
          return Err(self.hard(err));
        }
        Some('}') => break,
        Some('\\') if self.r.peek() == Some('}') => {
          self.r.bump();
          body.push('}');
        }
        Some(c) => body.push(c),
      }
    }

    Ok((body, self.r.token_from(start)))
  }

  // -------------------------------------------------------------------------
  // Entities

  fn entity(&mut self) -> PResult<Entity> {
    match self.r.peek() {
      Some('@') => Ok(Entity::Directive(Box::new(self.directive()?))),
      Some('$') => Ok(Entity::Meta(Box::new(self.metarule_def()?))),
      Some(c) if is_ident_start(c) => Ok(Entity::Rule(Box::new(self.rule()?))),
      _ => Err(self.fail("a rule, a metarule, or a directive")),
    }
  }

  fn rule(&mut self) -> PResult<Rule> {
    let start = self.r.pos;
    let id = self.ident()?;
    self.ws();
    if !self.r.eat_str("<-") {
      return Err(self.fail("`<-`"));
    }
    self.ws();
    let expr = self.expression()?;
    Ok(Rule::new(id, expr, self.r.token_from(start)))
  }

  /// Top-level `$name { body }` metarule definitions.
  fn metarule_def(&mut self) -> PResult<MetaRule> {
    let start = self.r.pos;
    self.r.bump();
    let id = self.ident()?;
    self.ws();
    let (body, _) = self.meta_body()?;
    Ok(MetaRule { id: Some(id), body, tok: self.r.token_from(start) })
  }

  fn directive(&mut self) -> PResult<Directive> {
    let start = self.r.pos;
    self.r.bump();
    let word = self.ident()?;
    self.ws();

    match word.name.as_str() {
      "include" => {
        let lit = match self.r.peek() {
          Some(q @ ('\'' | '"')) => self.quoted(q)?,
          _ => return Err(self.fail("a quoted include path")),
        };
        let path = lit.chars.iter().map(|c| c.as_char()).collect();
        Ok(Directive::Include { path, tok: self.r.token_from(start) })
      }

      "entry" => {
        // A bare `@entry` marks the next rule; `@entry Name` marks by
        // name. An identifier followed by `<-` belongs to the next rule
        // definition, not to this directive.
        let save = self.r.pos;
        let id = match self.r.peek() {
          Some(c) if is_ident_start(c) => {
            let id = self.ident()?;
            self.ws();
            if self.r.peek() == Some('<') && self.r.peek_at(1) == Some('-') {
              self.r.pos = save;
              None
            } else {
              Some(id)
            }
          }
          _ => None,
        };
        Ok(Directive::Entry { id, tok: self.r.token_from(start) })
      }

      "ignore" => {
        let mut ids = Vec::new();
        if self.r.eat('{') {
          self.ws();
          while matches!(self.r.peek(), Some(c) if is_ident_start(c)) {
            ids.push(self.ident()?);
            self.ws();
          }
          self.expect('}', "`}`")?;
        } else {
          ids.push(self.ident()?);
        }
        Ok(Directive::Ignore { ids, tok: self.r.token_from(start) })
      }

      "toplevel" => {
        let body = self.entity_block()?;
        Ok(Directive::Toplevel { body, tok: self.r.token_from(start) })
      }

      "backend" => {
        if self.r.eat('.') {
          let name = self.ident()?;
          self.ws();
          let (body, _) = self.meta_body()?;
          Ok(Directive::BackendDef { name, body, tok: self.r.token_from(start) })
        } else if self.r.eat('(') {
          self.ws();
          let name = self.ident()?;
          self.ws();
          self.expect(')', "`)`")?;
          self.ws();
          let body = self.entity_block()?;
          Ok(Directive::BackendQuery { name, body, tok: self.r.token_from(start) })
        } else {
          Err(self.fail("`.` or `(` after @backend"))
        }
      }

      _ => Err(self.fail("a directive name")),
    }
  }

  fn entity_block(&mut self) -> PResult<Vec<Entity>> {
    self.expect('{', "`{`")?;
    self.ws();

    let mut entities = Vec::new();
    while !matches!(self.r.peek(), Some('}') | None) {
      entities.push(self.entity()?);
      self.ws();
    }

    self.expect('}', "`}`")?;
    Ok(entities)
  }

  // -------------------------------------------------------------------------
  // Expressions

  fn expression(&mut self) -> PResult<Expr> {
    let mut alts = vec![self.alternative()?];

    while self.r.eat('/') {
      self.ws();
      alts.push(self.alternative()?);
    }

    Ok(Expr { alts })
  }

  fn alternative(&mut self) -> PResult<Alt> {
    let start = self.r.pos;

    let mut items = vec![self.part()?];
    loop {
      let save = self.r.pos;
      match self.part() {
        Ok(part) => items.push(part),
        Err(_) => {
          self.r.pos = save;
          break;
        }
      }
    }

    let action = self.action()?;
    Ok(Alt { items, action, tok: self.r.token_from(start) })
  }

  /// The optional `$name` / `${ body }` semantic action closing an
  /// alternative. `$name { body }` is not an action: it is the next
  /// top-level metarule definition.
  fn action(&mut self) -> PResult<Option<AltAction>> {
    if self.r.peek() != Some('$') {
      return Ok(None);
    }

    let save = self.r.pos;
    self.r.bump();

    match self.r.peek() {
      Some('{') => {
        let (body, tok) = self.meta_body()?;
        self.ws();
        Ok(Some(AltAction::Inline(MetaRule { id: None, body, tok })))
      }
      Some(c) if is_ident_start(c) => {
        let id = self.ident()?;
        let after_id = self.r.pos;
        self.ws();
        if self.r.peek() == Some('{') {
          // A metarule definition follows; the alternative has no action.
          self.r.pos = save;
          Ok(None)
        } else {
          self.r.pos = after_id;
          self.ws();
          Ok(Some(AltAction::Ref(id)))
        }
      }
      _ => Err(self.fail("a metarule name or body")),
    }
  }

  fn part(&mut self) -> PResult<NamedItem> {
    let start = self.r.pos;

    let cut = self.r.eat('^');
    if cut {
      self.ws();
    }

    let metaname = self.metaname()?;

    let item = self.lookahead()?;
    self.ws();

    Ok(NamedItem {
      metaname,
      cut,
      item,
      binding: None,
      ignored: false,
      tok: self.r.token_from(start),
    })
  }

  fn metaname(&mut self) -> PResult<Option<MetaName>> {
    let save = self.r.pos;

    match self.r.peek() {
      Some(c) if is_ident_start(c) => {
        let id = self.ident()?;
        self.ws();
        if self.r.eat(':') {
          self.ws();
          if id.name == "_" {
            Ok(Some(MetaName::Ignore))
          } else {
            Ok(Some(MetaName::Name(id.name)))
          }
        } else {
          self.r.pos = save;
          Ok(None)
        }
      }
      _ => Ok(None),
    }
  }

  fn lookahead(&mut self) -> PResult<Item> {
    let start = self.r.pos;

    if self.r.eat('&') {
      self.ws();
      let inner = self.quantified()?;
      return Ok(Item::And(Box::new(inner), self.r.token_from(start)));
    }
    if self.r.eat('!') {
      self.ws();
      let inner = self.quantified()?;
      return Ok(Item::Not(Box::new(inner), self.r.token_from(start)));
    }

    self.quantified()
  }

  fn quantified(&mut self) -> PResult<Item> {
    let start = self.r.pos;
    let item = self.primary()?;

    match self.r.peek() {
      Some('?') => {
        self.r.bump();
        Ok(Item::ZeroOrOne(Box::new(item), self.r.token_from(start)))
      }
      Some('*') => {
        self.r.bump();
        Ok(Item::ZeroOrMore(Box::new(item), self.r.token_from(start)))
      }
      Some('+') => {
        self.r.bump();
        Ok(Item::OneOrMore(Box::new(item), self.r.token_from(start)))
      }
      Some('{') if matches!(self.r.peek_at(1), Some(c) if c.is_ascii_digit()) => {
        self.r.bump();
        let lo = self.number()?;
        let hi = if self.r.eat(',') { Some(self.number()?) } else { None };
        self.expect('}', "`}`")?;
        Ok(Item::Repetition { item: Box::new(item), lo, hi, tok: self.r.token_from(start) })
      }
      _ => Ok(item),
    }
  }

  fn primary(&mut self) -> PResult<Item> {
    let pos = self.r.pos;
    if let Some(memo) = self.primary_memo.get(&pos) {
      return match memo.clone() {
        Some((item, next)) => {
          self.r.pos = next;
          Ok(item)
        }
        None => Err(self.fail("a primary")),
      };
    }

    let result = self.primary_uncached();

    if self.hard_error.is_none() {
      let entry = match &result {
        Ok(item) => Some((item.clone(), self.r.pos)),
        Err(_) => None,
      };
      self.primary_memo.insert(pos, entry);
    }

    result
  }

  fn primary_uncached(&mut self) -> PResult<Item> {
    let start = self.r.pos;

    match self.r.peek() {
      Some(c) if is_ident_start(c) => {
        let save = self.r.pos;
        let id = self.ident()?;
        let after_id = self.r.pos;
        self.ws();
        // An identifier followed by `<-` starts the next rule.
        if self.r.peek() == Some('<') && self.r.peek_at(1) == Some('-') {
          self.r.pos = save;
          Err(self.fail("a primary"))
        } else {
          self.r.pos = after_id;
          Ok(Item::NonTerm(id))
        }
      }

      Some('(') => {
        self.r.bump();
        self.ws();
        let expr = self.expression()?;
        self.expect(')', "`)`")?;
        Ok(Item::Group(Box::new(expr), self.r.token_from(start)))
      }

      Some(q @ ('\'' | '"')) => Ok(Item::Literal(self.quoted(q)?)),

      Some('[') => Ok(Item::Class(self.class()?)),

      Some('.') => {
        self.r.bump();
        Ok(Item::Any(self.r.token_from(start)))
      }

      _ => Err(self.fail("a primary")),
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  fn parse(input: &str) -> PolygenResult<Grammar> {
    parse_grammar(input, Path::new("/test.peg"))
  }

  #[test]
  fn parses_a_minimal_rule() {
    let g = parse("A <- 'b'").unwrap();
    assert_eq!(g.rules().count(), 1);
    assert_eq!(g.rule("A").unwrap().expr.alts.len(), 1);
  }

  #[test]
  fn parses_ordered_choice_and_sequences() {
    let g = parse("A <- B C / D").unwrap();
    let rule = g.rule("A").unwrap();
    assert_eq!(rule.expr.alts.len(), 2);
    assert_eq!(rule.expr.alts[0].items.len(), 2);
  }

  #[test]
  fn a_rule_identifier_is_not_consumed_as_a_reference() {
    let g = parse("A <- B\nC <- D").unwrap();
    assert_eq!(g.rules().count(), 2);
    assert_eq!(g.rule("A").unwrap().expr.alts[0].items.len(), 1);
  }

  #[test]
  fn parses_metanames_cuts_and_predicates() {
    let g = parse("A <- x:B _:C ^ !D 'e'?").unwrap();
    let alt = &g.rule("A").unwrap().expr.alts[0];
    assert_eq!(alt.items.len(), 4);
    assert_eq!(alt.items[0].metaname, Some(MetaName::Name("x".into())));
    assert_eq!(alt.items[1].metaname, Some(MetaName::Ignore));
    assert!(alt.items[2].cut);
    assert!(matches!(alt.items[2].item, Item::Not(..)));
    assert!(matches!(alt.items[3].item, Item::ZeroOrOne(..)));
  }

  #[test]
  fn quantifiers_bind_tighter_than_lookahead() {
    let g = parse("A <- !B+").unwrap();
    match &g.rule("A").unwrap().expr.alts[0].items[0].item {
      Item::Not(inner, _) => assert!(matches!(inner.as_ref(), Item::OneOrMore(..))),
      other => panic!("expected a predicate, got {:?}", other),
    }
  }

  #[test]
  fn trailing_dash_closes_a_class_at_the_first_bracket() {
    let g = parse("A <- [0-9_-]").unwrap();
    match &g.rule("A").unwrap().expr.alts[0].items[0].item {
      Item::Class(class) => {
        assert_eq!(class.ranges.len(), 3);
        assert_eq!((class.ranges[0].low(), class.ranges[0].high()), ('0' as u32, '9' as u32));
        assert_eq!(class.ranges[1].low(), '_' as u32);
        assert_eq!(class.ranges[2].low(), '-' as u32);
      }
      other => panic!("expected a class, got {:?}", other),
    }
  }

  #[test]
  fn escapes_decode_inside_literals() {
    let g = parse(r"A <- '\n\tA\101\']'").unwrap();
    match &g.rule("A").unwrap().expr.alts[0].items[0].item {
      Item::Literal(lit) => {
        let codes: Vec<u32> = lit.chars.iter().map(|c| c.code).collect();
        assert_eq!(codes, vec![10, 9, 0x41, 0o101, '\'' as u32, ']' as u32]);
      }
      other => panic!("expected a literal, got {:?}", other),
    }
  }

  #[test]
  fn an_action_reference_does_not_swallow_a_metarule_definition() {
    let g = parse("A <- B $int\n$int { int(_1) }").unwrap();
    assert!(matches!(
      g.rule("A").unwrap().expr.alts[0].action,
      Some(AltAction::Ref(ref id)) if id.name == "int"
    ));
    assert_eq!(g.metarules().count(), 1);
  }

  #[test]
  fn metarule_bodies_unescape_closing_braces() {
    let g = parse(r"$f { if x { y \} }").unwrap();
    assert_eq!(g.metarules().next().unwrap().body.trim(), "if x { y }");
  }

  #[test]
  fn bare_entry_does_not_capture_the_next_rule_name() {
    let g = parse("@entry\nMain <- 'a'").unwrap();
    match g.entities.first() {
      Some(Entity::Directive(d)) => {
        assert!(matches!(d.as_ref(), Directive::Entry { id: None, .. }))
      }
      other => panic!("expected a directive, got {:?}", other),
    }
    assert!(g.rule("Main").is_some());
  }

  #[test]
  fn named_entry_captures_the_name() {
    let g = parse("@entry Main\nMain <- 'a'").unwrap();
    match g.entities.first() {
      Some(Entity::Directive(d)) => match d.as_ref() {
        Directive::Entry { id: Some(id), .. } => assert_eq!(id.name, "Main"),
        other => panic!("expected a named entry, got {:?}", other),
      },
      other => panic!("expected a directive, got {:?}", other),
    }
  }

  #[test]
  fn syntax_errors_name_the_expected_input() {
    let err = parse("A <- ").unwrap_err();
    let text = err.to_string();
    assert!(text.contains("expected"), "{}", text);
    assert!(text.contains("/test.peg"), "{}", text);
  }

  #[test]
  fn unterminated_literals_are_lexical_errors() {
    let err = parse("A <- 'abc").unwrap_err();
    assert!(err.is("unterminated"), "{}", err);
  }
}
