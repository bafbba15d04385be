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

//! A dumb recognizer for any grammar, normalized or not.
//!
//! This is not intended to be fast, but a baseline that the chart parser and
//! the normalizer can be validated against.

use {
  crate::grammar::{Grammar, Symbol},
  std::collections::BTreeSet,
};

struct Recognizer<'a, S> {
  words: &'a [S],
  // table[i][j] holds the non-terminals deriving words[i..j], once final.
  table: Vec<Vec<BTreeSet<Symbol>>>,
}

/// The span being computed, and the non-terminals found for it so far.
struct Pending<'a> {
  start: usize,
  end: usize,
  found: &'a BTreeSet<Symbol>,
}

impl<'a, S: AsRef<str>> Recognizer<'a, S> {
  fn matches_one(
    &self,
    sym: &Symbol,
    start: usize,
    end: usize,
    pending: &Pending,
  ) -> bool {
    match sym.as_term() {
      Some(name) => end == start + 1 && self.words[start].as_ref() == name.str(),
      None if (start, end) == (pending.start, pending.end) => {
        pending.found.contains(sym)
      }
      None => self.table[start][end].contains(sym),
    }
  }

  fn matches_seq(
    &self,
    rhs: &[Symbol],
    start: usize,
    end: usize,
    pending: &Pending,
  ) -> bool {
    match rhs {
      [] => start == end,
      [sym] => self.matches_one(sym, start, end, pending),
      [first, rest @ ..] => {
        // Every symbol covers at least one word.
        if end - start < rhs.len() {
          return false;
        }
        ((start + 1)..=(end - rest.len())).any(|mid| {
          self.matches_one(first, start, mid, pending)
            && self.matches_seq(rest, mid, end, pending)
        })
      }
    }
  }
}

/// Returns true if the start symbol of `g` derives `words`.
pub fn recognizes<S: AsRef<str>>(g: &Grammar, words: &[S]) -> bool {
  let n = words.len();
  if n == 0 {
    return false;
  }
  let mut rec = Recognizer {
    words,
    table: vec![vec![BTreeSet::new(); n + 1]; n + 1],
  };

  for len in 1..=n {
    for start in 0..=(n - len) {
      let end = start + len;
      let mut found = BTreeSet::new();
      loop {
        let pending = Pending {
          start,
          end,
          found: &found,
        };
        let added: Vec<Symbol> = g
          .rules()
          .iter()
          .filter(|rule| !found.contains(rule.lhs()))
          .filter(|rule| rec.matches_seq(rule.rhs(), start, end, &pending))
          .map(|rule| rule.lhs().clone())
          .collect();
        if added.is_empty() {
          break;
        }
        found.extend(added);
      }
      rec.table[start][end] = found;
    }
  }

  rec.table[0][n].contains(g.start_symbol())
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::grammar::examples;

  #[test]
  fn test_recognizes_unnormalized_grammars() {
    let g = examples::make_duck();
    assert!(recognizes(&g, &["I", "saw", "the", "duck"]));
    assert!(!recognizes(&g, &["the", "duck"]));
    let g = examples::make_long_mixed();
    assert!(recognizes(&g, &["a", "b", "b", "c", "d", "e"]));
    assert!(!recognizes(&g, &["a", "c", "d", "e"]));
  }

  #[test]
  fn test_recognizes_through_unit_cycles() {
    let g = examples::make_unit_cycle();
    assert!(recognizes(&g, &["x"]));
    assert!(!recognizes(&g, &["x", "x"]));
  }
}
