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

//! Small grammars used by tests and documentation.

use crate::grammar::{build, Grammar};

/// The classic prepositional-attachment grammar. "I saw the duck with a
/// telescope" has two parses under it.
pub const TELESCOPE_SRGS: &str = "\
#ABNF V1.0 utf-8;
language en;
public $S = $NP $VP;
$NP = I;
$NP = $Det $N;
$NP = $NP $PP;
$VP = $V $NP;
$VP = $VP $PP;
$PP = $P $NP;
$V = saw;
$Det = the;
$Det = a;
$N = duck;
$N = telescope;
$P = with;
";

pub fn make_telescope() -> Grammar {
  Grammar::from_srgs(TELESCOPE_SRGS).expect("telescope grammar is well formed")
}

/// `S -> NP VP; NP -> I | the N; VP -> V NP; N -> duck; V -> saw`
pub fn make_duck() -> Grammar {
  build(|gb| {
    gb.add_public_rule("$S", ["$NP", "$VP"])
      .add_rule("$NP", ["I"])
      .add_rule("$NP", ["the", "$N"])
      .add_rule("$VP", ["$V", "$NP"])
      .add_rule("$N", ["duck"])
      .add_rule("$V", ["saw"]);
  })
  .expect("duck grammar is well formed")
}

/// `S -> A B; A -> x; B -> x; S -> x x`: two derivations of "x x".
pub fn make_ambiguous() -> Grammar {
  build(|gb| {
    gb.add_public_rule("$S", ["$A", "$B"])
      .add_rule("$A", ["x"])
      .add_rule("$B", ["x"])
      .add_public_rule("$S", ["x", "x"]);
  })
  .expect("ambiguous grammar is well formed")
}

/// A grammar in relaxed (but not strict) CNF, with a chain of unary rules.
pub fn make_unit_chain() -> Grammar {
  build(|gb| {
    gb.add_public_rule("$S", ["$A"])
      .add_public_rule("$S", ["$S", "$S"])
      .add_rule("$A", ["$B"])
      .add_rule("$B", ["b"]);
  })
  .expect("unit chain grammar is well formed")
}

/// `A -> B; B -> C; C -> A`, with `A -> x` so the cycle is reachable.
pub fn make_unit_cycle() -> Grammar {
  build(|gb| {
    gb.add_public_rule("$A", ["$B"])
      .add_rule("$B", ["$C"])
      .add_rule("$C", ["$A"])
      .add_public_rule("$A", ["x"]);
  })
  .expect("unit cycle grammar is well formed")
}

/// A long rule mixing terminals and non-terminals.
pub fn make_long_mixed() -> Grammar {
  build(|gb| {
    gb.add_public_rule("$S", ["a", "$B", "c", "$D", "e"])
      .add_rule("$B", ["b"])
      .add_rule("$B", ["$B", "b"])
      .add_rule("$D", ["d"]);
  })
  .expect("long mixed grammar is well formed")
}

/// Balanced parentheses around `x`, with sequencing.
pub fn make_parens() -> Grammar {
  build(|gb| {
    gb.add_public_rule("$E", ["x"])
      .add_public_rule("$E", ["(", "$E", ")"])
      .add_public_rule("$E", ["$E", "$E"]);
  })
  .expect("parens grammar is well formed")
}
