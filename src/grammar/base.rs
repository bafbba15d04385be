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

pub mod builder;
mod symbol;

use {
  crate::utils::{breadth_first_search, render_doc, ToDoc},
  std::collections::{BTreeMap, BTreeSet},
};

pub use builder::RuleSpec;
pub use symbol::{Symbol, SymbolTable, NONTERMINAL_MARKER};

/// Prefix of the names of non-terminals minted by the normalizer.
pub const HELPER_PREFIX: &str = "_H";

#[derive(Clone, Debug, thiserror::Error)]
pub enum GrammarError {
  #[error("malformed rule on line {line}: {reason}")]
  MalformedRule { line: usize, reason: String },
  #[error("no public rule declares a start symbol")]
  MissingStart,
  #[error("public rules declare two start symbols: {first} and {second}")]
  AmbiguousStart { first: Symbol, second: Symbol },
  #[error("rule `{rule}` is not in relaxed Chomsky normal form")]
  Conformance { rule: Rule },
}

/// A single production `lhs = rhs`, optionally tagged with a semantic label.
///
/// Rules are immutable. The normalizer replaces rules rather than editing
/// them.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Rule {
  lhs: Symbol,
  rhs: Vec<Symbol>,
  label: Option<Symbol>,
}

impl Rule {
  /// Creates a rule. The head must be a non-terminal and the body must not
  /// be empty.
  pub fn new(
    lhs: Symbol,
    rhs: Vec<Symbol>,
    label: Option<Symbol>,
  ) -> Result<Self, String> {
    if !lhs.is_nonterminal() {
      return Err(format!("left-hand side `{}` is not a non-terminal", lhs));
    }
    if rhs.is_empty() {
      return Err(format!("rule for `{}` has an empty right-hand side", lhs));
    }
    Ok(Rule::from_parts(lhs, rhs, label))
  }

  pub(crate) fn from_parts(
    lhs: Symbol,
    rhs: Vec<Symbol>,
    label: Option<Symbol>,
  ) -> Self {
    debug_assert!(lhs.is_nonterminal() && !rhs.is_empty());
    Rule { lhs, rhs, label }
  }

  pub fn lhs(&self) -> &Symbol {
    &self.lhs
  }

  pub fn rhs(&self) -> &[Symbol] {
    &self.rhs
  }

  pub fn label(&self) -> Option<&Symbol> {
    self.label.as_ref()
  }

  pub fn is_unary(&self) -> bool {
    self.rhs.len() == 1
  }

  /// Returns the produced terminal if this is a unary terminal rule.
  pub fn unary_term(&self) -> Option<&Symbol> {
    match self.rhs.as_slice() {
      [sym] if sym.is_terminal() => Some(sym),
      _ => None,
    }
  }

  /// Returns the produced non-terminal if this is a unary non-terminal
  /// (chain) rule.
  pub fn unary_nonterm(&self) -> Option<&Symbol> {
    match self.rhs.as_slice() {
      [sym] if sym.is_nonterminal() => Some(sym),
      _ => None,
    }
  }

  /// Returns true if this rule produces exactly two non-terminals.
  pub fn is_binary(&self) -> bool {
    matches!(
      self.rhs.as_slice(),
      [left, right] if left.is_nonterminal() && right.is_nonterminal()
    )
  }

  /// Unary (either kind), or binary over two non-terminals.
  pub fn is_relaxed_cnf(&self) -> bool {
    self.is_unary() || self.is_binary()
  }

  /// Unary over a terminal, or binary over two non-terminals.
  pub fn is_cnf(&self) -> bool {
    self.unary_term().is_some() || self.is_binary()
  }
}

impl std::fmt::Display for Rule {
  fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(fmt, "{} =", self.lhs)?;
    for sym in &self.rhs {
      write!(fmt, " {}", sym)?;
    }
    if let Some(label) = &self.label {
      write!(fmt, " {{{}}}", label)?;
    }
    fmt.write_str(";")
  }
}

impl ToDoc for Rule {
  fn to_doc<'a, DA: pretty::DocAllocator<'a>>(
    &self,
    da: &'a DA,
  ) -> pretty::DocBuilder<'a, DA>
  where
    DA::Doc: Clone,
  {
    let label = match &self.label {
      Some(label) => da.softline().append(label.to_doc(da).braces()),
      None => da.nil(),
    };

    self
      .lhs
      .to_doc(da)
      .append(da.text(" ="))
      .append(da.softline())
      .append(
        da.intersperse(self.rhs.iter().map(|sym| sym.to_doc(da)), da.softline()),
      )
      .append(label)
      .append(da.text(";"))
      .nest(2)
      .group()
  }
}

/// Maps each distinct right-hand side to the positions of the rules that
/// produce it, in grammar order.
#[derive(Clone, Default)]
struct RuleIndex(BTreeMap<Vec<Symbol>, Vec<usize>>);

impl RuleIndex {
  fn new(rules: &[Rule]) -> Self {
    let mut index = BTreeMap::new();
    for (i, rule) in rules.iter().enumerate() {
      index
        .entry(rule.rhs.clone())
        .or_insert_with(Vec::new)
        .push(i);
    }
    RuleIndex(index)
  }

  fn get(&self, rhs: &[Symbol]) -> &[usize] {
    self.0.get(rhs).map(Vec::as_slice).unwrap_or(&[])
  }
}

/// Draws fresh helper non-terminals for one grammar.
///
/// A minter works on copies of the grammar's symbol table and counter. Its
/// state only becomes part of the grammar when the rewritten rules are
/// committed, so a rewrite is applied all at once or not at all.
pub struct SymbolMinter {
  symbols: SymbolTable,
  counter: usize,
  helpers: BTreeSet<Symbol>,
}

impl SymbolMinter {
  /// Returns a new non-terminal whose name is not yet in the symbol table.
  pub fn mint(&mut self) -> Symbol {
    loop {
      let candidate =
        Symbol::nonterm(&format!("{}{}", HELPER_PREFIX, self.counter));
      self.counter += 1;
      if !self.symbols.contains(&candidate) {
        let helper = self.symbols.intern_symbol(candidate);
        log::trace!("Minted helper non-terminal {}.", helper);
        self.helpers.insert(helper.clone());
        return helper;
      }
    }
  }
}

/// A context-free grammar made of sequence rules.
///
/// - A start non-terminal, declared by the `public` rules.
/// - An ordered list of rules. Order has no meaning for the generated
///   language, but is kept so output is reproducible.
/// - The table of interned symbols, and the counter used to mint helper
///   non-terminals during normalization.
///
/// Grammars are built once, may be normalized in place, and are read-only
/// while parsing.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct Grammar {
  start_symbol: Symbol,
  rules: Vec<Rule>,
  language: Option<String>,
  #[derivative(Debug = "ignore")]
  symbols: SymbolTable,
  fresh_counter: usize,
  helpers: BTreeSet<Symbol>,
  #[derivative(Debug = "ignore")]
  rule_index: RuleIndex,
}

impl Grammar {
  /// Builds a grammar from rule tuples.
  ///
  /// Aborts on the first malformed rule. Public rules must all share one
  /// left-hand side, which becomes the start symbol.
  pub fn from_specs(
    specs: impl IntoIterator<Item = RuleSpec>,
    language: Option<String>,
  ) -> Result<Self, GrammarError> {
    let mut symbols = SymbolTable::new();
    let mut rules = Vec::new();
    let mut start: Option<Symbol> = None;

    for spec in specs {
      let lhs = symbols.intern(&spec.lhs);
      let rhs = spec.rhs.iter().map(|tok| symbols.intern(tok)).collect();
      let label = spec.label.as_ref().map(|tok| symbols.intern(tok));
      let rule = Rule::new(lhs, rhs, label).map_err(|reason| {
        GrammarError::MalformedRule {
          line: spec.line,
          reason,
        }
      })?;

      if spec.is_public {
        match &start {
          None => start = Some(rule.lhs.clone()),
          Some(curr) if curr == &rule.lhs => {}
          Some(curr) => {
            return Err(GrammarError::AmbiguousStart {
              first: curr.clone(),
              second: rule.lhs.clone(),
            })
          }
        }
      }

      rules.push(rule);
    }

    let start_symbol = start.ok_or(GrammarError::MissingStart)?;
    let grammar = Grammar {
      start_symbol,
      rule_index: RuleIndex::new(&rules),
      rules,
      language,
      symbols,
      fresh_counter: 0,
      helpers: BTreeSet::new(),
    };

    log::debug!(
      "Built grammar with {} rules and start symbol {}.",
      grammar.rules.len(),
      grammar.start_symbol
    );
    grammar.warn_about_dead_rules();
    Ok(grammar)
  }

  /// Returns the start non-terminal for this grammar.
  pub fn start_symbol(&self) -> &Symbol {
    &self.start_symbol
  }

  pub fn rules(&self) -> &[Rule] {
    &self.rules
  }

  pub fn symbols(&self) -> &SymbolTable {
    &self.symbols
  }

  /// The language tag of the rule file this grammar was read from, if any.
  pub fn language(&self) -> Option<&str> {
    self.language.as_deref()
  }

  /// Returns every rule whose right-hand side is exactly `rhs`, in grammar
  /// order.
  pub fn rules_producing<'a>(
    &'a self,
    rhs: &[Symbol],
  ) -> impl Iterator<Item = &'a Rule> + 'a {
    let positions = self.rule_index.get(rhs);
    positions.iter().map(move |&i| &self.rules[i])
  }

  /// Returns every rule whose left-hand side is `lhs`.
  pub fn rules_for<'a>(
    &'a self,
    lhs: &'a Symbol,
  ) -> impl Iterator<Item = &'a Rule> + 'a {
    self.rules.iter().filter(move |rule| &rule.lhs == lhs)
  }

  /// Returns true if `symbol` was minted by the normalizer.
  pub fn is_helper(&self, symbol: &Symbol) -> bool {
    self.helpers.contains(symbol)
  }

  pub fn helpers(&self) -> impl Iterator<Item = &Symbol> {
    self.helpers.iter()
  }

  /// All terminals used in rule bodies.
  pub fn terminals(&self) -> BTreeSet<&Symbol> {
    self.body_symbols().filter(|sym| sym.is_terminal()).collect()
  }

  /// All non-terminals that head a rule or appear in a rule body.
  pub fn nonterminals(&self) -> BTreeSet<&Symbol> {
    self
      .rules
      .iter()
      .map(|rule| &rule.lhs)
      .chain(self.body_symbols().filter(|sym| sym.is_nonterminal()))
      .collect()
  }

  fn body_symbols(&self) -> impl Iterator<Item = &Symbol> {
    self.rules.iter().flat_map(|rule| rule.rhs.iter())
  }

  /// Returns the first rule that is neither unary nor binary over two
  /// non-terminals.
  pub fn first_cnf_violation(&self) -> Option<&Rule> {
    self.rules.iter().find(|rule| !rule.is_relaxed_cnf())
  }

  /// Returns true if every rule is unary, or binary over two non-terminals.
  pub fn is_relaxed_cnf(&self) -> bool {
    self.first_cnf_violation().is_none()
  }

  pub fn check_relaxed_cnf(&self) -> Result<(), GrammarError> {
    match self.first_cnf_violation() {
      Some(rule) => Err(GrammarError::Conformance { rule: rule.clone() }),
      None => Ok(()),
    }
  }

  /// Returns true if every rule is unary over a terminal, or binary over two
  /// non-terminals.
  pub fn is_cnf(&self) -> bool {
    self.rules.iter().all(Rule::is_cnf)
  }

  /// Rewrites this grammar into relaxed Chomsky normal form.
  pub fn normalize(&mut self) {
    crate::grammar::transform::cnf::normalize(self)
  }

  /// Consuming form of `normalize`.
  pub fn normalized(mut self) -> Self {
    self.normalize();
    self
  }

  pub(crate) fn minter(&self) -> SymbolMinter {
    SymbolMinter {
      symbols: self.symbols.clone(),
      counter: self.fresh_counter,
      helpers: self.helpers.clone(),
    }
  }

  /// Replaces the rule list with a rewrite produced using `minter`.
  pub(crate) fn commit_rules(&mut self, rules: Vec<Rule>, minter: SymbolMinter) {
    let SymbolMinter {
      symbols,
      counter,
      helpers,
    } = minter;
    self.rule_index = RuleIndex::new(&rules);
    self.rules = rules;
    self.symbols = symbols;
    self.fresh_counter = counter;
    self.helpers = helpers;
  }

  fn reachable_nonterms(&self) -> BTreeSet<&Symbol> {
    breadth_first_search(std::iter::once(&self.start_symbol), |nt| {
      self
        .rules_for(*nt)
        .flat_map(|rule| rule.rhs.iter())
        .filter(|sym| sym.is_nonterminal())
        .collect::<Vec<_>>()
    })
  }

  fn warn_about_dead_rules(&self) {
    let heads: BTreeSet<_> = self.rules.iter().map(|rule| &rule.lhs).collect();
    for nt in self.nonterminals() {
      if !heads.contains(nt) {
        log::warn!("Non-terminal {} is used but has no rules.", nt);
      }
    }

    let reachable = self.reachable_nonterms();
    for rule in &self.rules {
      if !reachable.contains(&rule.lhs) {
        log::warn!("Rule `{}` is unreachable from {}.", rule, self.start_symbol);
      }
    }
  }

  /// Writes the grammar in the line format read by `Grammar::from_srgs`.
  pub fn to_srgs(&self) -> String {
    let mut out = String::from("#ABNF V1.0 utf-8;\n");
    if let Some(language) = &self.language {
      out.push_str(&format!("language {};\n", language));
    }
    for rule in &self.rules {
      if rule.lhs == self.start_symbol {
        out.push_str("public ");
      }
      out.push_str(&format!("{}\n", rule));
    }
    out
  }

  pub fn to_pretty(&self) -> String {
    render_doc(self, 80)
  }
}

impl ToDoc for Grammar {
  fn to_doc<'a, DA: pretty::DocAllocator<'a>>(
    &self,
    da: &'a DA,
  ) -> pretty::DocBuilder<'a, DA>
  where
    DA::Doc: Clone,
  {
    let start_entry = da
      .text("Start =")
      .group()
      .append(da.softline())
      .append(self.start_symbol.to_doc(da));
    let rules_entry = da.text("Rules ").append(
      da.hardline()
        .append(da.intersperse(
          self.rules.iter().map(|rule| rule.to_doc(da)),
          da.hardline(),
        ))
        .nest(2)
        .append(da.hardline())
        .braces(),
    );

    start_entry
      .append(da.text(","))
      .append(da.hardline())
      .append(rules_entry)
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::grammar::examples;

  fn spec(line: usize, is_public: bool, lhs: &str, rhs: &[&str]) -> RuleSpec {
    RuleSpec {
      line,
      is_public,
      lhs: lhs.to_string(),
      rhs: rhs.iter().map(|s| s.to_string()).collect(),
      label: None,
    }
  }

  #[test]
  fn test_builds_from_specs() {
    let g = Grammar::from_specs(
      vec![
        spec(1, true, "$S", &["$A", "b"]),
        spec(2, false, "$A", &["a"]),
      ],
      None,
    )
    .unwrap();
    assert_eq!(g.start_symbol(), &Symbol::nonterm("S"));
    assert_eq!(g.rules().len(), 2);
    assert_eq!(g.rules()[0].rhs(), &[Symbol::nonterm("A"), Symbol::term("b")]);
    assert_eq!(g.symbols().len(), 4);
  }

  #[test]
  fn test_terminal_head_is_malformed() {
    let err = Grammar::from_specs(
      vec![spec(1, true, "$S", &["a"]), spec(2, false, "A", &["a"])],
      None,
    )
    .unwrap_err();
    assert!(matches!(err, GrammarError::MalformedRule { line: 2, .. }));
  }

  #[test]
  fn test_empty_body_is_malformed() {
    let err =
      Grammar::from_specs(vec![spec(7, true, "$S", &[])], None).unwrap_err();
    assert!(matches!(err, GrammarError::MalformedRule { line: 7, .. }));
  }

  #[test]
  fn test_start_symbol_must_be_declared_once() {
    let missing =
      Grammar::from_specs(vec![spec(1, false, "$S", &["a"])], None).unwrap_err();
    assert!(matches!(missing, GrammarError::MissingStart));

    let ambiguous = Grammar::from_specs(
      vec![spec(1, true, "$S", &["a"]), spec(2, true, "$T", &["b"])],
      None,
    )
    .unwrap_err();
    match ambiguous {
      GrammarError::AmbiguousStart { first, second } => {
        assert_eq!(first, Symbol::nonterm("S"));
        assert_eq!(second, Symbol::nonterm("T"));
      }
      other => panic!("unexpected error: {}", other),
    }

    let repeated = Grammar::from_specs(
      vec![spec(1, true, "$S", &["a"]), spec(2, true, "$S", &["b"])],
      None,
    );
    assert!(repeated.is_ok());
  }

  #[test]
  fn test_rule_index_groups_by_body() {
    let g = examples::make_ambiguous();
    let producers: Vec<_> = g
      .rules_producing(&[Symbol::term("x")])
      .map(|rule| rule.lhs().clone())
      .collect();
    assert_eq!(producers, vec![Symbol::nonterm("A"), Symbol::nonterm("B")]);
    assert_eq!(g.rules_producing(&[Symbol::term("y")]).count(), 0);
  }

  #[test]
  fn test_conformance_reports_first_violation() {
    let g = examples::make_duck();
    let rule = g.first_cnf_violation().unwrap();
    assert_eq!(rule.to_string(), "$NP = the $N;");
    assert!(!g.is_relaxed_cnf());
    match g.check_relaxed_cnf() {
      Err(GrammarError::Conformance { rule: reported }) => {
        assert_eq!(&reported, rule)
      }
      other => panic!("unexpected result: {:?}", other),
    }
  }

  #[test]
  fn test_strict_cnf_rejects_chain_rules() {
    let g = examples::make_unit_chain();
    assert!(g.is_relaxed_cnf());
    assert!(!g.is_cnf());
    let g = examples::make_ambiguous().normalized();
    assert!(g.is_cnf());
  }

  #[test]
  fn test_srgs_output_marks_start_rules() {
    let g = examples::make_duck();
    let text = g.to_srgs();
    assert!(text.starts_with("#ABNF V1.0 utf-8;\n"));
    assert!(text.contains("public $S = $NP $VP;\n"));
    assert!(text.contains("\n$NP = the $N;\n"));
  }

  #[test]
  fn test_pretty_lists_rules() {
    let g = examples::make_duck();
    let pretty = g.to_pretty();
    assert!(pretty.starts_with("Start = $S,"));
    assert!(pretty.contains("$VP = $V $NP;"));
  }
}
