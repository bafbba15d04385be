// Copyright 2020 Google LLC
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

use std::sync::Arc;

use im::Vector;

use crate::{
  grammar::{Grammar, Symbol},
  utils::{render_doc, Name, ToDoc},
};

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct NodeInner {
  symbol: Symbol,
  children: Vector<ParseTree>,
}

/// A derivation tree.
///
/// Leaves hold a terminal and have no children; every other node holds a
/// non-terminal and the trees it was derived from, in order. Trees compare
/// structurally. Subtrees are shared, so cloning a tree is cheap.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParseTree(Arc<NodeInner>);

impl ParseTree {
  pub fn leaf(symbol: Symbol) -> Self {
    ParseTree(Arc::new(NodeInner {
      symbol,
      children: Vector::new(),
    }))
  }

  pub fn branch(
    symbol: Symbol,
    children: impl IntoIterator<Item = ParseTree>,
  ) -> Self {
    ParseTree(Arc::new(NodeInner {
      symbol,
      children: children.into_iter().collect(),
    }))
  }

  pub fn symbol(&self) -> &Symbol {
    &self.0.symbol
  }

  pub fn children(&self) -> impl Iterator<Item = &ParseTree> {
    self.0.children.iter()
  }

  pub fn child_count(&self) -> usize {
    self.0.children.len()
  }

  pub fn is_leaf(&self) -> bool {
    self.0.children.is_empty()
  }

  /// Returns the names of the terminal leaves, left to right.
  pub fn tokens(&self) -> Vec<&Name> {
    let mut tokens = Vec::new();
    let mut stack = vec![self];
    while let Some(node) = stack.pop() {
      if node.is_leaf() {
        if let Some(name) = node.symbol().as_term() {
          tokens.push(name);
        }
      } else {
        stack.extend(node.0.children.iter().rev());
      }
    }
    tokens
  }

  /// Splices the helper non-terminals minted by `grammar`'s normalizer out of
  /// this tree, so that each node's children match the rule the grammar's
  /// author wrote.
  pub fn unfold_helpers(&self, grammar: &Grammar) -> ParseTree {
    let mut children = Vec::with_capacity(self.child_count());
    for child in self.children() {
      child.splice_into(grammar, &mut children);
    }
    ParseTree::branch(self.symbol().clone(), children)
  }

  fn splice_into(&self, grammar: &Grammar, out: &mut Vec<ParseTree>) {
    if grammar.is_helper(self.symbol()) {
      for child in self.children() {
        child.splice_into(grammar, out);
      }
    } else if self.is_leaf() {
      out.push(self.clone());
    } else {
      out.push(self.unfold_helpers(grammar));
    }
  }

  pub fn to_pretty(&self) -> String {
    render_doc(self, 80)
  }
}

impl std::fmt::Display for ParseTree {
  fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(fmt, "{}", self.symbol())?;
    if !self.is_leaf() {
      fmt.write_str("(")?;
      for (i, child) in self.children().enumerate() {
        if i > 0 {
          fmt.write_str(", ")?;
        }
        write!(fmt, "{}", child)?;
      }
      fmt.write_str(")")?;
    }
    Ok(())
  }
}

impl std::fmt::Debug for ParseTree {
  fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
    std::fmt::Display::fmt(self, fmt)
  }
}

impl ToDoc for ParseTree {
  fn to_doc<'a, DA: pretty::DocAllocator<'a>>(
    &self,
    da: &'a DA,
  ) -> pretty::DocBuilder<'a, DA>
  where
    DA::Doc: Clone,
  {
    if self.is_leaf() {
      return self.symbol().to_doc(da);
    }

    let children = da.intersperse(
      self.children().map(|child| child.to_doc(da)),
      da.text(",").append(da.line()),
    );
    self
      .symbol()
      .to_doc(da)
      .append(da.text("("))
      .append(da.line_().append(children).nest(2))
      .append(da.line_())
      .append(da.text(")"))
      .group()
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::grammar::examples;

  fn nt(name: &str, children: Vec<ParseTree>) -> ParseTree {
    ParseTree::branch(Symbol::nonterm(name), children)
  }

  fn t(name: &str) -> ParseTree {
    ParseTree::leaf(Symbol::term(name))
  }

  fn sample() -> ParseTree {
    nt(
      "NP",
      vec![nt("_H0", vec![t("the")]), nt("N", vec![t("duck")])],
    )
  }

  #[test]
  fn test_structural_equality() {
    assert_eq!(sample(), sample());
    assert_ne!(sample(), nt("NP", vec![t("the")]));
    let mut set = std::collections::BTreeSet::new();
    set.insert(sample());
    assert!(!set.insert(sample()));
  }

  #[test]
  fn test_display() {
    assert_eq!(sample().to_string(), "$NP($_H0(the), $N(duck))");
    assert_eq!(t("duck").to_string(), "duck");
  }

  #[test]
  fn test_tokens_in_order() {
    let tree = sample();
    let names: Vec<&str> = tree.tokens().into_iter().map(Name::str).collect();
    assert_eq!(names, vec!["the", "duck"]);
  }

  #[test]
  fn test_unfold_helpers() {
    let g = examples::make_duck().normalized();
    let unfolded = sample().unfold_helpers(&g);
    assert_eq!(unfolded.to_string(), "$NP(the, $N(duck))");
  }

  #[test]
  fn test_pretty_fits_on_one_line() {
    assert_eq!(sample().to_pretty(), "$NP($_H0(the), $N(duck))");
  }
}
