//! # Generators
//!
//! This module contains generators for [validated grammars](`crate::compiler::ValidatedGrammar`):
//! a runnable [parser](instantiate()) or the [Rust source code](rust::gen_rust_str) of an equivalent one.
//!
//! It also contains an [EBNF generator](ebnf::gen_ebnf) to get a grammar's text back from its rule graph.

pub mod ebnf;
pub mod instantiate;
pub mod rust;

pub use self::ebnf::gen_ebnf;
pub use self::instantiate::instantiate;
pub use self::rust::*;
