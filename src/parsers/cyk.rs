// Copyright 2019 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A CYK chart parser that returns every parse tree of a sentence.
//!
//! The chart has one cell per span `start..end` of the input. A cell maps
//! each non-terminal that derives the span to the set of trees deriving it.
//! Cells are filled by increasing span length:
//!
//! 1. A span of one word gets the heads of the rules producing that word.
//! 2. A longer span gets the head of every binary rule `A = B C` such that
//!    `B` derives a prefix of the span and `C` derives the rest.
//! 3. Each cell is then closed under unit rules `A = B`.
//!
//! Unit rule cycles are rejected when the parser is created, so the closure
//! always terminates.

use {
  crate::{
    grammar::{unit_cycles::find_unit_cycle, Grammar, Symbol},
    parsers::{ParseError, ParseTree},
    utils::{breadth_first_search, WasChanged},
  },
  std::collections::{BTreeMap, BTreeSet},
};

/// Limits on a single parse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CykConfig {
  /// The most trees one chart cell may hold, across all of its symbols.
  /// `None` removes the limit. Highly ambiguous grammars have exponentially
  /// many trees in the length of the input.
  pub max_trees_per_cell: Option<usize>,
}

impl Default for CykConfig {
  fn default() -> Self {
    CykConfig {
      max_trees_per_cell: Some(100_000),
    }
  }
}

#[derive(Default)]
struct Cell {
  trees: BTreeMap<Symbol, BTreeSet<ParseTree>>,
  tree_count: usize,
}

impl Cell {
  fn insert(&mut self, symbol: Symbol, tree: ParseTree) -> WasChanged {
    let added = self.trees.entry(symbol).or_default().insert(tree);
    if added {
      self.tree_count += 1;
    }
    WasChanged::from_changed(added)
  }

  fn symbols(&self) -> impl Iterator<Item = &Symbol> {
    self.trees.keys()
  }

  fn trees<'a>(
    &'a self,
    symbol: &Symbol,
  ) -> impl Iterator<Item = &'a ParseTree> + 'a {
    self.trees.get(symbol).into_iter().flatten()
  }

  fn into_trees(mut self, symbol: &Symbol) -> Vec<ParseTree> {
    self
      .trees
      .remove(symbol)
      .map(|trees| trees.into_iter().collect())
      .unwrap_or_default()
  }
}

/// The upper triangle of an `n` by `n` table, indexed by span.
struct Chart<C> {
  size: usize,
  cells: Vec<C>,
}

impl<C: Default> Chart<C> {
  fn new(size: usize) -> Self {
    Chart {
      size,
      cells: (0..size * size).map(|_| C::default()).collect(),
    }
  }

  fn index(&self, start: usize, end: usize) -> usize {
    debug_assert!(start < end && end <= self.size);
    start * self.size + (end - 1)
  }

  fn get(&self, start: usize, end: usize) -> &C {
    &self.cells[self.index(start, end)]
  }

  fn set(&mut self, start: usize, end: usize, cell: C) {
    let index = self.index(start, end);
    self.cells[index] = cell;
  }

  fn take(&mut self, start: usize, end: usize) -> C {
    let index = self.index(start, end);
    std::mem::take(&mut self.cells[index])
  }
}

/// A CYK parser over a grammar in relaxed CNF.
///
/// The parser borrows its grammar and holds no per-parse state, so one
/// parser can serve many threads at once.
pub struct CykParser<'g> {
  grammar: &'g Grammar,
  config: CykConfig,
}

impl<'g> CykParser<'g> {
  pub fn new(grammar: &'g Grammar) -> Result<Self, ParseError> {
    Self::with_config(grammar, CykConfig::default())
  }

  /// Checks that `grammar` can be parsed: it must be in relaxed CNF, and its
  /// unit rules must not form a cycle.
  pub fn with_config(
    grammar: &'g Grammar,
    config: CykConfig,
  ) -> Result<Self, ParseError> {
    grammar.check_relaxed_cnf()?;
    if let Some(cycle) = find_unit_cycle(grammar) {
      return Err(ParseError::CyclicUnaryRule { cycle });
    }
    Ok(CykParser { grammar, config })
  }

  pub fn grammar(&self) -> &'g Grammar {
    self.grammar
  }

  pub fn config(&self) -> &CykConfig {
    &self.config
  }

  /// Returns every tree for `words` rooted at the start symbol, with each
  /// distinct tree reported once.
  pub fn parse<S: AsRef<str>>(
    &self,
    words: &[S],
  ) -> Result<Vec<ParseTree>, ParseError> {
    let n = words.len();
    if n == 0 {
      return Ok(Vec::new());
    }

    let mut chart: Chart<Cell> = Chart::new(n);
    for (i, word) in words.iter().enumerate() {
      let cell = self.fill_word_cell(i, word.as_ref())?;
      chart.set(i, i + 1, cell);
    }
    for len in 2..=n {
      for start in 0..=(n - len) {
        let cell = self.fill_span_cell(&chart, start, start + len)?;
        chart.set(start, start + len, cell);
      }
    }

    let trees = chart.take(0, n).into_trees(self.grammar.start_symbol());
    log::debug!("Found {} parses of {} words.", trees.len(), n);
    Ok(trees)
  }

  /// Returns true if `words` has a parse. Only the symbols of each span are
  /// computed, so this is not bound by the tree limit.
  pub fn is_in_language<S: AsRef<str>>(
    &self,
    words: &[S],
  ) -> Result<bool, ParseError> {
    let n = words.len();
    if n == 0 {
      return Ok(false);
    }

    let mut chart: Chart<BTreeSet<Symbol>> = Chart::new(n);
    for (i, word) in words.iter().enumerate() {
      let term = Symbol::term(word.as_ref());
      let direct = self
        .grammar
        .rules_producing(std::slice::from_ref(&term))
        .map(|rule| rule.lhs().clone());
      chart.set(i, i + 1, self.unit_closure(direct));
    }
    for len in 2..=n {
      for start in 0..=(n - len) {
        let end = start + len;
        let mut direct = BTreeSet::new();
        for mid in (start + 1)..end {
          for left in chart.get(start, mid) {
            for right in chart.get(mid, end) {
              direct.extend(
                self
                  .grammar
                  .rules_producing(&[left.clone(), right.clone()])
                  .map(|rule| rule.lhs().clone()),
              );
            }
          }
        }
        chart.set(start, end, self.unit_closure(direct));
      }
    }

    Ok(chart.get(0, n).contains(self.grammar.start_symbol()))
  }

  fn unit_closure(
    &self,
    direct: impl IntoIterator<Item = Symbol>,
  ) -> BTreeSet<Symbol> {
    breadth_first_search(direct, |symbol| {
      self
        .grammar
        .rules_producing(std::slice::from_ref(symbol))
        .map(|rule| rule.lhs().clone())
        .collect::<Vec<_>>()
    })
  }

  fn fill_word_cell(&self, i: usize, word: &str) -> Result<Cell, ParseError> {
    let term = Symbol::term(word);
    let leaf = ParseTree::leaf(term.clone());
    let mut cell = Cell::default();
    for rule in self.grammar.rules_producing(std::slice::from_ref(&term)) {
      let tree = ParseTree::branch(rule.lhs().clone(), vec![leaf.clone()]);
      self.insert(&mut cell, (i, i + 1), rule.lhs().clone(), tree)?;
    }
    if cell.tree_count == 0 {
      log::trace!("No rule produces word {:?} at {}.", word, i);
    }
    self.close_cell(&mut cell, (i, i + 1))?;
    Ok(cell)
  }

  fn fill_span_cell(
    &self,
    chart: &Chart<Cell>,
    start: usize,
    end: usize,
  ) -> Result<Cell, ParseError> {
    let mut cell = Cell::default();
    for mid in (start + 1)..end {
      let left_cell = chart.get(start, mid);
      let right_cell = chart.get(mid, end);
      for left in left_cell.symbols() {
        for right in right_cell.symbols() {
          let body = [left.clone(), right.clone()];
          for rule in self.grammar.rules_producing(&body) {
            for left_tree in left_cell.trees(left) {
              for right_tree in right_cell.trees(right) {
                let tree = ParseTree::branch(
                  rule.lhs().clone(),
                  vec![left_tree.clone(), right_tree.clone()],
                );
                let head = rule.lhs().clone();
                self.insert(&mut cell, (start, end), head, tree)?;
              }
            }
          }
        }
      }
    }
    self.close_cell(&mut cell, (start, end))?;
    Ok(cell)
  }

  /// Adds a tree for every unit rule `A = B` where `B` is in the cell, until
  /// nothing changes.
  fn close_cell(
    &self,
    cell: &mut Cell,
    span: (usize, usize),
  ) -> Result<(), ParseError> {
    let mut pending: Vec<(Symbol, ParseTree)> = cell
      .trees
      .iter()
      .flat_map(|(symbol, trees)| {
        trees.iter().map(move |tree| (symbol.clone(), tree.clone()))
      })
      .collect();

    while let Some((symbol, tree)) = pending.pop() {
      for rule in self.grammar.rules_producing(std::slice::from_ref(&symbol)) {
        let parent = ParseTree::branch(rule.lhs().clone(), vec![tree.clone()]);
        if self
          .insert(cell, span, rule.lhs().clone(), parent.clone())?
          .is_changed()
        {
          pending.push((rule.lhs().clone(), parent));
        }
      }
    }

    log::trace!(
      "Cell {}..{}: {} symbols, {} trees.",
      span.0,
      span.1,
      cell.trees.len(),
      cell.tree_count
    );
    Ok(())
  }

  fn insert(
    &self,
    cell: &mut Cell,
    (start, end): (usize, usize),
    symbol: Symbol,
    tree: ParseTree,
  ) -> Result<WasChanged, ParseError> {
    let changed = cell.insert(symbol, tree);
    match self.config.max_trees_per_cell {
      Some(limit) if cell.tree_count > limit => {
        log::warn!(
          "Span {}..{} exceeded the limit of {} trees.",
          start,
          end,
          limit
        );
        Err(ParseError::TreeLimitExceeded { start, end, limit })
      }
      _ => Ok(changed),
    }
  }
}
