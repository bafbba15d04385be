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

//! Parsers over grammars in relaxed Chomsky normal form.

use {
  crate::grammar::{Grammar, GrammarError, Symbol},
  unicode_segmentation::UnicodeSegmentation,
};

pub mod cyk;
#[cfg(test)]
pub(crate) mod reference;
pub mod tree;

pub use cyk::{CykConfig, CykParser};
pub use tree::ParseTree;

#[derive(Clone, Debug, thiserror::Error)]
pub enum ParseError {
  #[error(transparent)]
  Grammar(#[from] GrammarError),
  #[error("unit rules form a cycle: {}", format_cycle(.cycle))]
  CyclicUnaryRule { cycle: Vec<Symbol> },
  #[error("span {start}..{end} has more than {limit} parse trees")]
  TreeLimitExceeded {
    start: usize,
    end: usize,
    limit: usize,
  },
}

fn format_cycle(cycle: &[Symbol]) -> String {
  cycle
    .iter()
    .map(Symbol::to_string)
    .collect::<Vec<_>>()
    .join(" -> ")
}

/// Returns every parse tree of `words` rooted at the grammar's start symbol.
///
/// An empty sentence has no parses. The grammar must be in relaxed CNF.
pub fn parse<S: AsRef<str>>(
  words: &[S],
  grammar: &Grammar,
) -> Result<Vec<ParseTree>, ParseError> {
  if words.is_empty() {
    return Ok(Vec::new());
  }
  CykParser::new(grammar)?.parse(words)
}

/// Returns true if `words` has at least one parse.
pub fn is_in_language<S: AsRef<str>>(
  words: &[S],
  grammar: &Grammar,
) -> Result<bool, ParseError> {
  if words.is_empty() {
    return Ok(false);
  }
  CykParser::new(grammar)?.is_in_language(words)
}

/// Splits a sentence into word tokens on Unicode word boundaries, dropping
/// whitespace.
///
/// Punctuation marks become tokens of their own: `"the duck."` yields
/// `["the", "duck", "."]`.
pub fn tokenize(sentence: &str) -> Vec<&str> {
  sentence
    .split_word_bounds()
    .filter(|token| !token.trim().is_empty())
    .collect()
}
