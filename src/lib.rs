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

//! Context-free grammars in relaxed Chomsky normal form, and a CYK parser
//! that returns every parse tree of a sentence.
//!
//! ```rust
//! use bramble::{grammar::Grammar, parsers};
//!
//! let g = Grammar::from_srgs(
//!   "public $S = $NP $VP;\n\
//!    $NP = I;\n\
//!    $NP = the $N;\n\
//!    $VP = $V $NP;\n\
//!    $N = duck;\n\
//!    $V = saw;\n",
//! )?
//! .normalized();
//! let trees = parsers::parse(&parsers::tokenize("I saw the duck"), &g)?;
//! assert_eq!(trees.len(), 1);
//! # Ok::<(), parsers::ParseError>(())
//! ```

#[macro_use]
extern crate derivative;

pub mod grammar;
pub mod parsers;
pub mod utils;
