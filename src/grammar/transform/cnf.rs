// Copyright 2018 Google LLC
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

//! A Grammar transform into relaxed Chomsky normal form.
//!
//! In relaxed CNF every rule either produces a single symbol (terminal or
//! non-terminal), or produces exactly two non-terminals. The transform runs
//! two passes, each of which preserves the generated language:
//!
//! 1. Every terminal inside a body of two or more symbols is replaced by a
//!    fresh helper non-terminal, and a unit rule from the helper to the
//!    terminal is appended to the grammar.
//! 2. Every body of more than two symbols is split into a right-branching
//!    chain of binary rules, with one fresh helper per extra symbol.
//!
//! Example: For the grammar:
//!
//! ```text
//! $S = a $B $C;
//! ```
//!
//! This is transformed into:
//!
//! ```text
//! $S = $_H0 $_H1;
//! $_H1 = $B $C;
//! $_H0 = a;
//! ```
//!
//! Unit rules between non-terminals are kept as they are; the parser takes
//! their closure.

use crate::grammar::{Grammar, Rule, Symbol, SymbolMinter};

/// Rewrites `g` into relaxed CNF in place.
///
/// The rewritten rules, symbol table and counter are computed on the side and
/// committed together. A grammar that is already in relaxed CNF is left
/// untouched.
pub fn normalize(g: &mut Grammar) {
  if g.is_relaxed_cnf() {
    log::debug!("Grammar is already in relaxed CNF.");
    return;
  }

  let before = g.rules().len();
  let mut minter = g.minter();
  let lifted = lift_terminals(g.rules(), &mut minter);
  let binarized = binarize(lifted, &mut minter);
  g.commit_rules(binarized, minter);

  debug_assert!(g.is_relaxed_cnf());
  log::debug!(
    "Normalized grammar from {} to {} rules with {} helpers.",
    before,
    g.rules().len(),
    g.helpers().count()
  );
}

/// Replaces terminals in bodies of two or more symbols with helpers.
fn lift_terminals(rules: &[Rule], minter: &mut SymbolMinter) -> Vec<Rule> {
  let mut result = Vec::with_capacity(rules.len());
  let mut helper_rules = Vec::new();

  for rule in rules {
    let is_mixed =
      rule.rhs().len() > 1 && rule.rhs().iter().any(Symbol::is_terminal);
    if !is_mixed {
      result.push(rule.clone());
      continue;
    }

    let rhs = rule
      .rhs()
      .iter()
      .map(|sym| {
        if sym.is_terminal() {
          let helper = minter.mint();
          helper_rules.push(Rule::from_parts(
            helper.clone(),
            vec![sym.clone()],
            None,
          ));
          helper
        } else {
          sym.clone()
        }
      })
      .collect();

    result.push(Rule::from_parts(
      rule.lhs().clone(),
      rhs,
      rule.label().cloned(),
    ));
  }

  result.append(&mut helper_rules);
  result
}

/// Splits bodies longer than two symbols into right-branching chains.
fn binarize(rules: Vec<Rule>, minter: &mut SymbolMinter) -> Vec<Rule> {
  let mut result = Vec::with_capacity(rules.len());

  for rule in rules {
    let rhs = rule.rhs();
    if rhs.len() <= 2 {
      result.push(rule);
      continue;
    }

    let (init, last_pair) = rhs.split_at(rhs.len() - 2);
    let mut head = rule.lhs().clone();
    let mut label = rule.label().cloned();
    for sym in init {
      let helper = minter.mint();
      result.push(Rule::from_parts(
        head,
        vec![sym.clone(), helper.clone()],
        label.take(),
      ));
      head = helper;
    }
    result.push(Rule::from_parts(head, last_pair.to_vec(), label.take()));
  }

  result
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::grammar::examples;
  use crate::parsers::reference::recognizes;

  fn rule_strings(g: &Grammar) -> Vec<String> {
    g.rules().iter().map(|rule| rule.to_string()).collect()
  }

  #[test]
  fn test_lifts_terminals_out_of_mixed_rules() {
    let g = examples::make_duck().normalized();
    assert_eq!(
      rule_strings(&g),
      vec![
        "$S = $NP $VP;",
        "$NP = I;",
        "$NP = $_H0 $N;",
        "$VP = $V $NP;",
        "$N = duck;",
        "$V = saw;",
        "$_H0 = the;",
      ]
    );
    assert!(g.is_helper(&Symbol::nonterm("_H0")));
    assert!(!g.is_helper(&Symbol::nonterm("NP")));
  }

  #[test]
  fn test_binarizes_long_rules_in_place() {
    let g = examples::make_long_mixed().normalized();
    assert_eq!(
      rule_strings(&g),
      vec![
        "$S = $_H0 $_H4;",
        "$_H4 = $B $_H5;",
        "$_H5 = $_H1 $_H6;",
        "$_H6 = $D $_H2;",
        "$B = b;",
        "$B = $B $_H3;",
        "$D = d;",
        "$_H0 = a;",
        "$_H1 = c;",
        "$_H2 = e;",
        "$_H3 = b;",
      ]
    );
    assert_eq!(g.helpers().count(), 7);
    assert!(g.is_relaxed_cnf());
  }

  #[test]
  fn test_label_moves_to_head_of_chain() {
    let mut g = crate::grammar::build(|gb| {
      gb.add_public_rule("$S", ["$A"])
        .add_labeled_rule("$A", ["$B", "$B", "$B"], "triple")
        .add_rule("$B", ["b"]);
    })
    .unwrap();
    g.normalize();
    assert_eq!(g.rules()[1].to_string(), "$A = $B $_H0 {triple};");
    assert_eq!(g.rules()[2].to_string(), "$_H0 = $B $B;");
  }

  #[test]
  fn test_helpers_skip_declared_names() {
    let mut g = crate::grammar::build(|gb| {
      gb.add_public_rule("$S", ["a", "$_H0"]).add_rule("$_H0", ["b"]);
    })
    .unwrap();
    g.normalize();
    assert_eq!(g.rules()[0].to_string(), "$S = $_H1 $_H0;");
    assert!(!g.is_helper(&Symbol::nonterm("_H0")));
    assert!(g.is_helper(&Symbol::nonterm("_H1")));
  }

  #[test]
  fn test_normalizing_twice_changes_nothing() {
    let once = examples::make_parens().normalized();
    let twice = once.clone().normalized();
    assert_eq!(once.rules(), twice.rules());
    assert_eq!(
      once.helpers().collect::<Vec<_>>(),
      twice.helpers().collect::<Vec<_>>()
    );
  }

  #[test]
  fn test_all_examples_conform_after_normalizing() {
    let grammars = vec![
      examples::make_telescope(),
      examples::make_duck(),
      examples::make_ambiguous(),
      examples::make_unit_chain(),
      examples::make_long_mixed(),
      examples::make_parens(),
    ];
    for g in grammars {
      let g = g.normalized();
      assert!(g.is_relaxed_cnf(), "not conformant: {}", g.to_srgs());
      assert!(g.check_relaxed_cnf().is_ok());
    }
  }

  /// Every sentence of up to `max_len` tokens over the grammar's terminals.
  fn sentences(g: &Grammar, max_len: usize) -> Vec<Vec<String>> {
    let alphabet: Vec<String> = g
      .terminals()
      .into_iter()
      .map(|sym| sym.name().to_string())
      .collect();
    let mut result = Vec::new();
    let mut frontier: Vec<Vec<String>> = vec![Vec::new()];
    for _ in 0..max_len {
      let mut next = Vec::new();
      for prefix in &frontier {
        for token in &alphabet {
          let mut sentence = prefix.clone();
          sentence.push(token.clone());
          next.push(sentence);
        }
      }
      result.extend(next.iter().cloned());
      frontier = next;
    }
    result
  }

  #[test]
  fn test_normalizing_preserves_language() -> anyhow::Result<()> {
    let cases = vec![
      (examples::make_duck(), 4),
      (examples::make_ambiguous(), 3),
      (examples::make_long_mixed(), 6),
      (examples::make_parens(), 6),
    ];
    for (original, max_len) in cases {
      let normalized = original.clone().normalized();
      for sentence in sentences(&original, max_len) {
        let expected = recognizes(&original, &sentence);
        assert_eq!(
          crate::parsers::is_in_language(&sentence, &normalized)?,
          expected,
          "sentence {:?}",
          sentence
        );
        assert_eq!(recognizes(&normalized, &sentence), expected);
      }
    }
    Ok(())
  }
}
