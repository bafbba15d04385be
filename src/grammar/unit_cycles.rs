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

//! Detection of cycles among unit rules (`A = B`, `B = C`, ..., `C = A`).
//!
//! With such a cycle, every span labeled with one symbol of the cycle is
//! also labeled with all the others, and each of them has infinitely many
//! derivation trees.

use {
  crate::grammar::{Grammar, Symbol},
  std::collections::BTreeMap,
};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Mark {
  Active,
  Done,
}

/// Maps each non-terminal to the non-terminals it derives by a single unit
/// rule.
fn unit_edges(g: &Grammar) -> BTreeMap<&Symbol, Vec<&Symbol>> {
  let mut edges: BTreeMap<&Symbol, Vec<&Symbol>> = BTreeMap::new();
  for rule in g.rules() {
    if let Some(child) = rule.unary_nonterm() {
      edges.entry(rule.lhs()).or_default().push(child);
    }
  }
  edges
}

/// Returns a cycle of unit rules, if the grammar has one.
///
/// The returned path starts and ends with the same symbol, so `A = A` is
/// reported as `[$A, $A]`.
pub fn find_unit_cycle(g: &Grammar) -> Option<Vec<Symbol>> {
  let edges = unit_edges(g);
  let mut marks: BTreeMap<&Symbol, Mark> = BTreeMap::new();

  for &root in edges.keys() {
    if marks.contains_key(root) {
      continue;
    }

    // Each frame is a node on the current path and the index of the next
    // edge to follow out of it.
    let mut path: Vec<(&Symbol, usize)> = vec![(root, 0)];
    marks.insert(root, Mark::Active);

    while let Some((node, next_edge)) = path.last_mut() {
      let children = edges.get(*node).map(Vec::as_slice).unwrap_or(&[]);
      let child = match children.get(*next_edge) {
        Some(child) => *child,
        None => {
          marks.insert(*node, Mark::Done);
          path.pop();
          continue;
        }
      };
      *next_edge += 1;

      match marks.get(child) {
        Some(Mark::Done) => {}
        Some(Mark::Active) => {
          let start = path
            .iter()
            .position(|(sym, _)| *sym == child)
            .unwrap_or(0);
          let mut cycle: Vec<Symbol> =
            path[start..].iter().map(|(sym, _)| (*sym).clone()).collect();
          cycle.push(child.clone());
          log::debug!("Found unit rule cycle of length {}.", cycle.len() - 1);
          return Some(cycle);
        }
        None => {
          marks.insert(child, Mark::Active);
          path.push((child, 0));
        }
      }
    }
  }

  None
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::grammar::{build, examples};

  #[test]
  fn test_finds_three_cycle() {
    let g = examples::make_unit_cycle();
    let cycle = find_unit_cycle(&g).unwrap();
    assert_eq!(cycle.len(), 4);
    assert_eq!(cycle.first(), cycle.last());
    let mut members: Vec<_> = cycle[..3].to_vec();
    members.sort();
    assert_eq!(
      members,
      vec![
        Symbol::nonterm("A"),
        Symbol::nonterm("B"),
        Symbol::nonterm("C")
      ]
    );
  }

  #[test]
  fn test_finds_self_loop() {
    let g = build(|gb| {
      gb.add_public_rule("$S", ["$S"]).add_public_rule("$S", ["s"]);
    })
    .unwrap();
    assert_eq!(
      find_unit_cycle(&g),
      Some(vec![Symbol::nonterm("S"), Symbol::nonterm("S")])
    );
  }

  #[test]
  fn test_chains_and_diamonds_are_acyclic() {
    assert_eq!(find_unit_cycle(&examples::make_unit_chain()), None);
    let diamond = build(|gb| {
      gb.add_public_rule("$S", ["$A"])
        .add_public_rule("$S", ["$B"])
        .add_rule("$A", ["$C"])
        .add_rule("$B", ["$C"])
        .add_rule("$C", ["c"]);
    })
    .unwrap();
    assert_eq!(find_unit_cycle(&diamond), None);
  }

  #[test]
  fn test_binary_rules_do_not_form_unit_cycles() {
    assert_eq!(find_unit_cycle(&examples::make_parens().normalized()), None);
  }
}
