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

use super::{Grammar, GrammarError};

/// One rule as delivered by a rule reader, before any symbol is interned.
///
/// Tokens use the raw surface syntax: non-terminals carry the `$` marker.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RuleSpec {
  /// The 1-based source line, used in error reports.
  pub line: usize,
  pub is_public: bool,
  pub lhs: String,
  pub rhs: Vec<String>,
  pub label: Option<String>,
}

pub struct GrammarBuilder {
  language: Option<String>,
  specs: Vec<RuleSpec>,
}

impl GrammarBuilder {
  fn new() -> Self {
    GrammarBuilder {
      language: None,
      specs: Vec::new(),
    }
  }

  fn build(self) -> Result<Grammar, GrammarError> {
    let GrammarBuilder { language, specs } = self;
    Grammar::from_specs(specs, language)
  }

  fn push<R>(
    &mut self,
    is_public: bool,
    lhs: &str,
    rhs: R,
    label: Option<&str>,
  ) -> &mut Self
  where
    R: IntoIterator,
    R::Item: AsRef<str>,
  {
    let line = self.specs.len() + 1;
    self.specs.push(RuleSpec {
      line,
      is_public,
      lhs: lhs.to_string(),
      rhs: rhs.into_iter().map(|tok| tok.as_ref().to_string()).collect(),
      label: label.map(str::to_string),
    });
    self
  }

  pub fn language(&mut self, language: &str) -> &mut Self {
    self.language = Some(language.to_string());
    self
  }

  pub fn add_rule<R>(&mut self, lhs: &str, rhs: R) -> &mut Self
  where
    R: IntoIterator,
    R::Item: AsRef<str>,
  {
    self.push(false, lhs, rhs, None)
  }

  /// Adds a rule whose head is the start symbol.
  pub fn add_public_rule<R>(&mut self, lhs: &str, rhs: R) -> &mut Self
  where
    R: IntoIterator,
    R::Item: AsRef<str>,
  {
    self.push(true, lhs, rhs, None)
  }

  pub fn add_labeled_rule<R>(
    &mut self,
    lhs: &str,
    rhs: R,
    label: &str,
  ) -> &mut Self
  where
    R: IntoIterator,
    R::Item: AsRef<str>,
  {
    self.push(false, lhs, rhs, Some(label))
  }
}

/// Builds a grammar using a builder function.
///
/// Example:
///
/// ```rust
/// let g = bramble::grammar::build(|gb| {
///   gb.add_public_rule("$S", ["$NP", "$VP"])
///     .add_rule("$NP", ["I"])
///     .add_rule("$VP", ["sleep"]);
/// })
/// .unwrap();
/// assert_eq!(g.rules().len(), 3);
/// ```
///
/// Rules are numbered in the order they are added; that number is reported
/// as the line of a `MalformedRule` error.
pub fn build(
  build_fn: impl FnOnce(&mut GrammarBuilder),
) -> Result<Grammar, GrammarError> {
  let mut builder = GrammarBuilder::new();
  build_fn(&mut builder);
  builder.build()
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::grammar::Symbol;

  #[test]
  fn test_builder_numbers_rules() {
    let err = build(|gb| {
      gb.add_public_rule("$S", ["$A"]).add_rule("$A", Vec::<&str>::new());
    })
    .unwrap_err();
    assert!(matches!(err, GrammarError::MalformedRule { line: 2, .. }));
  }

  #[test]
  fn test_builder_keeps_labels_and_language() {
    let g = build(|gb| {
      gb.language("en-us")
        .add_public_rule("$S", ["$A"])
        .add_labeled_rule("$A", ["a", "$A"], "rec");
    })
    .unwrap();
    assert_eq!(g.language(), Some("en-us"));
    assert_eq!(g.rules()[1].label(), Some(&Symbol::term("rec")));
  }
}
