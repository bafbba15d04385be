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

use {
  crate::utils::{Name, ToDoc},
  std::collections::{btree_map, BTreeMap},
};

/// The prefix that marks a raw token as a non-terminal.
pub const NONTERMINAL_MARKER: char = '$';

/// A single grammar symbol (terminal or non-terminal).
///
/// Two symbols are equal iff both their kind and their name match. Terminals
/// match input tokens literally.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
  Term(Name),
  NonTerm(Name),
}

impl Symbol {
  /// Classifies a raw token. Tokens starting with `$` are non-terminals, and
  /// the marker is not part of the stored name. Everything else is a
  /// terminal.
  pub fn from_token(token: &str) -> Self {
    match token.strip_prefix(NONTERMINAL_MARKER) {
      Some(name) => Symbol::NonTerm(Name::new(name)),
      None => Symbol::Term(Name::new(token)),
    }
  }

  pub fn term(name: &str) -> Self {
    Symbol::Term(Name::new(name))
  }

  pub fn nonterm(name: &str) -> Self {
    Symbol::NonTerm(Name::new(name))
  }

  /// Returns the name of this symbol, without any marker.
  pub fn name(&self) -> &Name {
    match self {
      Symbol::Term(name) | Symbol::NonTerm(name) => name,
    }
  }

  pub fn is_terminal(&self) -> bool {
    matches!(self, Symbol::Term(_))
  }

  pub fn is_nonterminal(&self) -> bool {
    matches!(self, Symbol::NonTerm(_))
  }

  /// If this symbol is a terminal, returns a `Some` value containing its
  /// name. Returns `None` otherwise.
  pub fn as_term(&self) -> Option<&Name> {
    match self {
      Symbol::Term(name) => Some(name),
      Symbol::NonTerm(_) => None,
    }
  }
}

impl std::fmt::Display for Symbol {
  fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
    match self {
      Symbol::Term(name) => write!(fmt, "{}", name),
      Symbol::NonTerm(name) => write!(fmt, "{}{}", NONTERMINAL_MARKER, name),
    }
  }
}

impl std::fmt::Debug for Symbol {
  fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
    std::fmt::Display::fmt(self, fmt)
  }
}

impl ToDoc for Symbol {
  fn to_doc<'a, DA: pretty::DocAllocator<'a>>(
    &self,
    da: &'a DA,
  ) -> pretty::DocBuilder<'a, DA> {
    da.text(self.to_string())
  }
}

/// The table of canonical symbols of one grammar, keyed by raw token.
#[derive(Clone, Default, Debug)]
pub struct SymbolTable {
  by_token: BTreeMap<String, Symbol>,
}

impl SymbolTable {
  pub fn new() -> Self {
    SymbolTable::default()
  }

  /// Returns the canonical symbol for `token`, creating it on first use.
  pub fn intern(&mut self, token: &str) -> Symbol {
    match self.by_token.entry(token.to_string()) {
      btree_map::Entry::Occupied(occ) => occ.get().clone(),
      btree_map::Entry::Vacant(vac) => {
        vac.insert(Symbol::from_token(token)).clone()
      }
    }
  }

  /// Interns an already constructed symbol.
  pub fn intern_symbol(&mut self, symbol: Symbol) -> Symbol {
    self
      .by_token
      .entry(symbol.to_string())
      .or_insert(symbol)
      .clone()
  }

  pub fn get(&self, token: &str) -> Option<&Symbol> {
    self.by_token.get(token)
  }

  pub fn contains(&self, symbol: &Symbol) -> bool {
    self.by_token.contains_key(&symbol.to_string())
  }

  pub fn len(&self) -> usize {
    self.by_token.len()
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_marker_classifies_tokens() {
    assert_eq!(Symbol::from_token("$NP"), Symbol::nonterm("NP"));
    assert_eq!(Symbol::from_token("duck"), Symbol::term("duck"));
    assert_eq!(Symbol::from_token("$"), Symbol::nonterm(""));
    assert_eq!(Symbol::from_token(""), Symbol::term(""));
  }

  #[test]
  fn test_kind_is_part_of_identity() {
    assert_ne!(Symbol::term("NP"), Symbol::nonterm("NP"));
    assert_eq!(Symbol::nonterm("NP").name().str(), "NP");
    assert_eq!(Symbol::nonterm("NP").to_string(), "$NP");
    assert_eq!(Symbol::term("NP").to_string(), "NP");
  }

  #[test]
  fn test_table_interns_once() {
    let mut table = SymbolTable::new();
    let a = table.intern("$S");
    let b = table.intern("$S");
    let c = table.intern("S");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(table.len(), 2);
    assert!(table.contains(&Symbol::nonterm("S")));
    assert_eq!(table.get("S"), Some(&Symbol::term("S")));
  }
}
