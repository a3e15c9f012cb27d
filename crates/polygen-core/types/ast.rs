use super::Token;

/// A rule or metarule name together with the place it was written.
#[derive(Clone, Debug, Default)]
pub struct Ident {
  pub name: String,
  pub tok:  Token,
}

impl Ident {
  pub fn new(name: impl Into<String>, tok: Token) -> Self {
    Ident { name: name.into(), tok }
  }
}

/// A single unicode code point matched by the generated parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct CharLit {
  pub code: u32,
}

impl CharLit {
  pub fn as_char(&self) -> char {
    char::from_u32(self.code).unwrap_or(char::REPLACEMENT_CHARACTER)
  }
}

impl From<char> for CharLit {
  fn from(c: char) -> Self {
    CharLit { code: c as u32 }
  }
}

/// A quoted literal. Multi-character literals are expanded into their
/// component characters by the transformer.
#[derive(Clone, Debug)]
pub struct StringLit {
  pub chars: Vec<CharLit>,
  pub tok:   Token,
}

/// One member of a character class: a single character, or an inclusive
/// range when `end` is present.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Range {
  pub begin: CharLit,
  pub end:   Option<CharLit>,
}

impl Range {
  pub fn low(&self) -> u32 {
    self.begin.code
  }

  pub fn high(&self) -> u32 {
    self.end.map(|e| e.code).unwrap_or(self.begin.code)
  }
}

/// A `[...]` character class.
#[derive(Clone, Debug)]
pub struct ClassLit {
  pub ranges: Vec<Range>,
  pub tok:    Token,
}

/// A matchable grammar element. Lookahead predicates and quantifiers nest
/// arbitrarily at parse time; the transformer flattens them until every
/// quantifier applies to a simple primary and no group survives inside an
/// alternative.
#[derive(Clone, Debug)]
pub enum Item {
  /// A reference to another rule.
  NonTerm(Ident),
  /// A parenthesised sub-expression.
  Group(Box<Expr>, Token),
  Literal(StringLit),
  Ch(CharLit, Token),
  Class(ClassLit),
  /// The `.` wildcard.
  Any(Token),
  ZeroOrOne(Box<Item>, Token),
  ZeroOrMore(Box<Item>, Token),
  OneOrMore(Box<Item>, Token),
  /// `{n}` / `{n,m}` bounded repetition.
  Repetition {
    item: Box<Item>,
    lo:   u32,
    hi:   Option<u32>,
    tok:  Token,
  },
  /// `&` positive lookahead.
  And(Box<Item>, Token),
  /// `!` negative lookahead.
  Not(Box<Item>, Token),
}

impl Item {
  pub fn tok(&self) -> &Token {
    match self {
      Item::NonTerm(id) => &id.tok,
      Item::Group(_, tok)
      | Item::Ch(_, tok)
      | Item::Any(tok)
      | Item::ZeroOrOne(_, tok)
      | Item::ZeroOrMore(_, tok)
      | Item::OneOrMore(_, tok)
      | Item::Repetition { tok, .. }
      | Item::And(_, tok)
      | Item::Not(_, tok) => tok,
      Item::Literal(lit) => &lit.tok,
      Item::Class(class) => &class.tok,
    }
  }

  pub fn is_predicate(&self) -> bool {
    matches!(self, Item::And(..) | Item::Not(..))
  }

  pub fn is_quantified(&self) -> bool {
    matches!(
      self,
      Item::ZeroOrOne(..) | Item::ZeroOrMore(..) | Item::OneOrMore(..) | Item::Repetition { .. }
    )
  }

  /// True for items a quantifier may be applied to directly after
  /// normalisation.
  pub fn is_simple(&self) -> bool {
    matches!(
      self,
      Item::NonTerm(..) | Item::Ch(..) | Item::Class(..) | Item::Any(..) | Item::Literal(..)
    )
  }

  /// Structural equality, ignoring source positions. Used by the cut
  /// placement check to compare alternative prefixes.
  pub fn same_shape(&self, other: &Item) -> bool {
    match (self, other) {
      (Item::NonTerm(a), Item::NonTerm(b)) => a.name == b.name,
      (Item::Group(a, _), Item::Group(b, _)) => a.same_shape(b),
      (Item::Literal(a), Item::Literal(b)) => a.chars == b.chars,
      (Item::Ch(a, _), Item::Ch(b, _)) => a == b,
      (Item::Class(a), Item::Class(b)) => a.ranges == b.ranges,
      (Item::Any(_), Item::Any(_)) => true,
      (Item::ZeroOrOne(a, _), Item::ZeroOrOne(b, _))
      | (Item::ZeroOrMore(a, _), Item::ZeroOrMore(b, _))
      | (Item::OneOrMore(a, _), Item::OneOrMore(b, _))
      | (Item::And(a, _), Item::And(b, _))
      | (Item::Not(a, _), Item::Not(b, _)) => a.same_shape(b),
      (
        Item::Repetition { item: a, lo: alo, hi: ahi, .. },
        Item::Repetition { item: b, lo: blo, hi: bhi, .. },
      ) => alo == blo && ahi == bhi && a.same_shape(b),
      _ => false,
    }
  }
}

/// The metavariable annotation written before an item: `name:` binds the
/// matched value, `_:` discards it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MetaName {
  Name(String),
  Ignore,
}

/// One part of an alternative: an optional cut mark, an optional metaname,
/// and the item itself. `binding` and `ignored` are filled in by the
/// transformer; the return tuple of the alternative is the ordered list of
/// bindings whose items are not ignored.
#[derive(Clone, Debug)]
pub struct NamedItem {
  pub metaname: Option<MetaName>,
  pub cut:      bool,
  pub item:     Item,
  pub binding:  Option<String>,
  pub ignored:  bool,
  pub tok:      Token,
}

impl NamedItem {
  pub fn plain(item: Item) -> Self {
    let tok = item.tok().clone();
    NamedItem { metaname: None, cut: false, item, binding: None, ignored: false, tok }
  }

  pub fn has_explicit_name(&self) -> bool {
    matches!(self.metaname, Some(MetaName::Name(_)))
  }

  /// True when the item contributes a value to the alternative's return
  /// tuple.
  pub fn in_return_tuple(&self) -> bool {
    !self.ignored && self.binding.is_some()
  }
}

/// The semantic action attached to an alternative: a reference to a named
/// metarule, or an inline body. Metarule resolution rewrites every `Ref`
/// into an `Inline`.
#[derive(Clone, Debug)]
pub enum AltAction {
  Ref(Ident),
  Inline(MetaRule),
}

/// A sequence of parts forming one alternative of an ordered choice.
#[derive(Clone, Debug)]
pub struct Alt {
  pub items:  Vec<NamedItem>,
  pub action: Option<AltAction>,
  pub tok:    Token,
}

impl Alt {
  /// The ordered bindings returned by this alternative.
  pub fn return_tuple(&self) -> Vec<&str> {
    self
      .items
      .iter()
      .filter(|i| i.in_return_tuple())
      .filter_map(|i| i.binding.as_deref())
      .collect()
  }
}

/// An ordered choice. Non-empty by construction.
#[derive(Clone, Debug)]
pub struct Expr {
  pub alts: Vec<Alt>,
}

impl Expr {
  pub fn same_shape(&self, other: &Expr) -> bool {
    self.alts.len() == other.alts.len()
      && self.alts.iter().zip(other.alts.iter()).all(|(a, b)| {
        a.items.len() == b.items.len()
          && a.items.iter().zip(b.items.iter()).all(|(x, y)| x.item.same_shape(&y.item))
      })
  }
}

/// A named production.
#[derive(Clone, Debug)]
pub struct Rule {
  pub id:             Ident,
  pub expr:           Expr,
  pub entry:          bool,
  pub ignore:         bool,
  /// True for rules the transformer created while flattening
  /// sub-expressions.
  pub synthetic:      bool,
  /// Set by the recursion analysis; the emitter selects the seed-and-grow
  /// evaluation scheme for marked rules.
  pub left_recursive: bool,
  pub tok:            Token,
}

impl Rule {
  pub fn new(id: Ident, expr: Expr, tok: Token) -> Self {
    Rule { id, expr, entry: false, ignore: false, synthetic: false, left_recursive: false, tok }
  }
}

/// A named semantic action body. The body is target-language source and is
/// never interpreted; `\}` escapes were already unfolded by the parser.
#[derive(Clone, Debug)]
pub struct MetaRule {
  pub id:   Option<Ident>,
  pub body: String,
  pub tok:  Token,
}

/// A preprocessor entity.
#[derive(Clone, Debug)]
pub enum Directive {
  /// `@include "path"`
  Include { path: String, tok: Token },
  /// `@entry` / `@entry Name`. A bare `@entry` marks the next rule.
  Entry { id: Option<Ident>, tok: Token },
  /// `@ignore { A B ... }`
  Ignore { ids: Vec<Ident>, tok: Token },
  /// `@toplevel { ... }`, inlined only when the containing file is the
  /// root of the include tree.
  Toplevel { body: Vec<Entity>, tok: Token },
  /// `@backend(name) { ... }`, inlined only for the configured backend.
  BackendQuery { name: Ident, body: Vec<Entity>, tok: Token },
  /// `@backend.name { body }`, an opaque fragment kept for the emitter.
  BackendDef { name: Ident, body: String, tok: Token },
}

impl Directive {
  pub fn tok(&self) -> &Token {
    match self {
      Directive::Include { tok, .. }
      | Directive::Entry { tok, .. }
      | Directive::Ignore { tok, .. }
      | Directive::Toplevel { tok, .. }
      | Directive::BackendQuery { tok, .. }
      | Directive::BackendDef { tok, .. } => tok,
    }
  }
}

/// One top-level grammar entity, in source order.
#[derive(Clone, Debug)]
pub enum Entity {
  Rule(Box<Rule>),
  Meta(Box<MetaRule>),
  Directive(Box<Directive>),
}

/// A grammar: the ordered entity list produced by the parser. The
/// preprocessor consumes every directive except `BackendDef`; the
/// transformer consumes the top-level metarules once they are inlined.
#[derive(Clone, Debug, Default)]
pub struct Grammar {
  pub entities: Vec<Entity>,
  /// Monotone counter for synthetic-rule naming. Grammar-scoped, owned by
  /// the transformer.
  pub gen_counter: u32,
}

impl Grammar {
  pub fn new(entities: Vec<Entity>) -> Self {
    Grammar { entities, gen_counter: 0 }
  }

  pub fn rules(&self) -> impl Iterator<Item = &Rule> {
    self.entities.iter().filter_map(|e| match e {
      Entity::Rule(r) => Some(r.as_ref()),
      _ => None,
    })
  }

  pub fn rules_mut(&mut self) -> impl Iterator<Item = &mut Rule> {
    self.entities.iter_mut().filter_map(|e| match e {
      Entity::Rule(r) => Some(r.as_mut()),
      _ => None,
    })
  }

  pub fn metarules(&self) -> impl Iterator<Item = &MetaRule> {
    self.entities.iter().filter_map(|e| match e {
      Entity::Meta(m) => Some(m.as_ref()),
      _ => None,
    })
  }

  pub fn rule(&self, name: &str) -> Option<&Rule> {
    self.rules().find(|r| r.id.name == name)
  }

  pub fn rule_mut(&mut self, name: &str) -> Option<&mut Rule> {
    self.rules_mut().find(|r| r.id.name == name)
  }

  pub fn entry_rule(&self) -> Option<&Rule> {
    self.rules().find(|r| r.entry)
  }

  /// The retained `@backend.<name>` fragments, in source order.
  pub fn backend_defs(&self) -> impl Iterator<Item = (&Ident, &str)> {
    self.entities.iter().filter_map(|e| match e {
      Entity::Directive(d) => match d.as_ref() {
        Directive::BackendDef { name, body, .. } => Some((name, body.as_str())),
        _ => None,
      },
      _ => None,
    })
  }
}
