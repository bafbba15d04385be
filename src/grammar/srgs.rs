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

//! A line-oriented reader for a small subset of the SRGS ABNF format.
//!
//! Each non-empty line holds exactly one sequence rule:
//!
//! ```text
//! #ABNF V1.0 utf-8;
//! language en;
//! public $S = $NP $VP;   // the start rule
//! $NP = the $N {np};     // an optional label in braces
//! $N = duck;
//! ```
//!
//! Alternatives (`|`) are not supported; they must be written as separate
//! rules.

use crate::grammar::{Grammar, GrammarError, RuleSpec, NONTERMINAL_MARKER};

/// The rules and header data read from one grammar file.
#[derive(Clone, Debug, Default)]
pub struct SrgsDocument {
  pub language: Option<String>,
  pub rules: Vec<RuleSpec>,
}

fn malformed(line: usize, reason: impl Into<String>) -> GrammarError {
  GrammarError::MalformedRule {
    line,
    reason: reason.into(),
  }
}

fn strip_comment(line: &str) -> &str {
  match line.find("//") {
    Some(pos) => &line[..pos],
    None => line,
  }
}

/// Splits a rule file into rule tuples.
pub fn read_rule_specs(text: &str) -> Result<SrgsDocument, GrammarError> {
  let mut doc = SrgsDocument::default();
  let mut seen_content = false;

  for (index, raw_line) in text.lines().enumerate() {
    let line_no = index + 1;
    let line = strip_comment(raw_line).trim();
    if line.is_empty() {
      continue;
    }

    let first_content = !seen_content;
    seen_content = true;

    if line.starts_with('#') {
      if first_content && line.to_lowercase().starts_with("#abnf") {
        continue;
      }
      return Err(malformed(line_no, "unexpected header line"));
    }

    let body = line
      .strip_suffix(';')
      .ok_or_else(|| malformed(line_no, "missing terminating `;`"))?
      .trim();

    if let Some(language) = body.strip_prefix("language") {
      let language = language.trim();
      if language.is_empty() || language.contains(char::is_whitespace) {
        return Err(malformed(line_no, "expected a single language tag"));
      }
      doc.language = Some(language.to_string());
      continue;
    }

    doc.rules.push(parse_rule(line_no, body)?);
  }

  Ok(doc)
}

/// Parses the text of one rule, without its terminating `;`.
fn parse_rule(line_no: usize, body: &str) -> Result<RuleSpec, GrammarError> {
  let (is_public, body) = match body.strip_prefix("public") {
    Some(rest) if rest.starts_with(char::is_whitespace) => (true, rest.trim()),
    _ => (false, body),
  };

  let eq_pos = body
    .find('=')
    .ok_or_else(|| malformed(line_no, "missing `=`"))?;
  let lhs = body[..eq_pos].trim();
  let mut rhs = body[eq_pos + 1..].trim();

  if !lhs.starts_with(NONTERMINAL_MARKER)
    || lhs.len() == 1
    || lhs.contains(char::is_whitespace)
  {
    return Err(malformed(
      line_no,
      format!("left-hand side `{}` must be a single non-terminal", lhs),
    ));
  }

  let mut label = None;
  if let Some(open) = rhs.find('{') {
    let close = rhs
      .strip_suffix('}')
      .map(|_| rhs.len() - 1)
      .ok_or_else(|| malformed(line_no, "label must close the rule"))?;
    let text = rhs[open + 1..close].trim();
    if text.is_empty() || text.contains(|c: char| c == '{' || c == '}') {
      return Err(malformed(line_no, "empty or nested label"));
    }
    label = Some(text.to_string());
    rhs = rhs[..open].trim();
  }

  if rhs.contains('|') {
    return Err(malformed(line_no, "alternatives (`|`) are not supported"));
  }

  let rhs: Vec<String> = rhs.split_whitespace().map(str::to_string).collect();
  if rhs.is_empty() {
    return Err(malformed(line_no, "empty right-hand side"));
  }

  Ok(RuleSpec {
    line: line_no,
    is_public,
    lhs: lhs.to_string(),
    rhs,
    label,
  })
}

impl Grammar {
  /// Reads a grammar from rule-file text.
  pub fn from_srgs(text: &str) -> Result<Self, GrammarError> {
    let SrgsDocument { language, rules } = read_rule_specs(text)?;
    Grammar::from_specs(rules, language)
  }
}
