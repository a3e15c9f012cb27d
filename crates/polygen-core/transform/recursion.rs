//! Left-recursion analysis. Builds the graph of references that can be
//! evaluated at the start of a rule (looking through nullable prefixes),
//! runs Tarjan's strongly-connected-components algorithm over it, and
//! marks every rule inside a non-trivial component as left-recursive. The
//! emitter selects the seed-and-grow evaluation scheme for marked rules.

use crate::{
  journal::Journal,
  types::{Expr, Grammar, Item},
};
use std::collections::{BTreeSet, HashMap};

pub(crate) fn run(_j: &mut Journal, g: &mut Grammar) {
  let marks = analyze(g);

  for (i, rule) in g.rules_mut().enumerate() {
    rule.left_recursive = marks[i];
  }
}

fn analyze(g: &Grammar) -> Vec<bool> {
  let rules: Vec<_> = g.rules().collect();
  let index: HashMap<&str, usize> =
    rules.iter().enumerate().map(|(i, r)| (r.id.name.as_str(), i)).collect();
  let n = rules.len();

  // Nullability fixpoint: a rule is nullable when some alternative can
  // match without consuming input.
  let mut nullable = vec![false; n];
  loop {
    let mut changed = false;
    for (i, rule) in rules.iter().enumerate() {
      if nullable[i] {
        continue;
      }
      if expr_nullable(&rule.expr, &index, &nullable) {
        nullable[i] = true;
        changed = true;
      }
    }
    if !changed {
      break;
    }
  }

  // First-reference edges: every rule reachable before the first input
  // character is necessarily consumed.
  let mut edges: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n];
  for (i, rule) in rules.iter().enumerate() {
    for alt in &rule.expr.alts {
      for part in &alt.items {
        head_refs(&part.item, &index, &nullable, &mut edges[i]);
        if !item_nullable(&part.item, &index, &nullable) {
          break;
        }
      }
    }
  }

  let components = tarjan(n, &edges);

  let mut component_sizes = vec![0usize; n];
  for c in &components {
    component_sizes[*c] += 1;
  }

  (0..n)
    .map(|i| component_sizes[components[i]] > 1 || edges[i].contains(&i))
    .collect()
}

fn expr_nullable(expr: &Expr, index: &HashMap<&str, usize>, nullable: &[bool]) -> bool {
  expr.alts.iter().any(|alt| alt.items.iter().all(|p| item_nullable(&p.item, index, nullable)))
}

fn item_nullable(item: &Item, index: &HashMap<&str, usize>, nullable: &[bool]) -> bool {
  match item {
    Item::And(..) | Item::Not(..) => true,
    Item::ZeroOrOne(..) | Item::ZeroOrMore(..) => true,
    Item::OneOrMore(inner, _) => item_nullable(inner, index, nullable),
    Item::Repetition { lo: 0, .. } => true,
    Item::Repetition { item: inner, .. } => item_nullable(inner, index, nullable),
    Item::NonTerm(id) => index.get(id.name.as_str()).map(|i| nullable[*i]).unwrap_or(false),
    Item::Group(expr, _) => expr_nullable(expr, index, nullable),
    _ => false,
  }
}

/// Rules referenced at the very start of `item`. Predicate operands count:
/// a rule invoking itself inside a lookahead at position zero recurses
/// just as surely as a plain reference.
fn head_refs(
  item: &Item,
  index: &HashMap<&str, usize>,
  nullable: &[bool],
  out: &mut BTreeSet<usize>,
) {
  match item {
    Item::NonTerm(id) => {
      if let Some(i) = index.get(id.name.as_str()) {
        out.insert(*i);
      }
    }
    Item::ZeroOrOne(inner, _)
    | Item::ZeroOrMore(inner, _)
    | Item::OneOrMore(inner, _)
    | Item::Repetition { item: inner, .. }
    | Item::And(inner, _)
    | Item::Not(inner, _) => head_refs(inner, index, nullable, out),
    Item::Group(expr, _) => {
      for alt in &expr.alts {
        for part in &alt.items {
          head_refs(&part.item, index, nullable, out);
          if !item_nullable(&part.item, index, nullable) {
            break;
          }
        }
      }
    }
    _ => {}
  }
}

// ---------------------------------------------------------------------------
// Tarjan SCC over rule indices. The AST itself stays acyclic; the cycles
// live only in this index graph.

struct Tarjan<'a> {
  edges:    &'a [BTreeSet<usize>],
  index:    Vec<Option<u32>>,
  lowlink:  Vec<u32>,
  on_stack: Vec<bool>,
  stack:    Vec<usize>,
  next:     u32,
  component: Vec<usize>,
  found:    usize,
}

fn tarjan(n: usize, edges: &[BTreeSet<usize>]) -> Vec<usize> {
  let mut t = Tarjan {
    edges,
    index: vec![None; n],
    lowlink: vec![0; n],
    on_stack: vec![false; n],
    stack: Vec::new(),
    next: 0,
    component: vec![0; n],
    found: 0,
  };

  for v in 0..n {
    if t.index[v].is_none() {
      t.connect(v);
    }
  }

  t.component
}

impl Tarjan<'_> {
  fn connect(&mut self, v: usize) {
    self.index[v] = Some(self.next);
    self.lowlink[v] = self.next;
    self.next += 1;
    self.stack.push(v);
    self.on_stack[v] = true;

    let successors: Vec<usize> = self.edges[v].iter().copied().collect();
    for w in successors {
      match self.index[w] {
        None => {
          self.connect(w);
          self.lowlink[v] = self.lowlink[v].min(self.lowlink[w]);
        }
        Some(w_index) if self.on_stack[w] => {
          self.lowlink[v] = self.lowlink[v].min(w_index);
        }
        _ => {}
      }
    }

    if Some(self.lowlink[v]) == self.index[v] {
      let id = self.found;
      self.found += 1;
      loop {
        let w = self.stack.pop().unwrap();
        self.on_stack[w] = false;
        self.component[w] = id;
        if w == v {
          break;
        }
      }
    }
  }
}
