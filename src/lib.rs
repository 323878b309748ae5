//! # ebnfgen
//!
//! ebnfgen is a parser generator for EBNF grammars, limited to a single token of lookahead.
//!
//! It [compiles](`compiler::EbnfCompiler`) a grammar either to a parser usable right away, or to the Rust source code
//! of an equivalent parser, which can also be generated at build time with the `ebnfgen_macro` crate.
//!
//! Terminal literals are turned into tokens automatically, unless a [token map](`compiler::TokenMap`) provides
//! patterns matching them.
//!
//! ## Usage
//!
//! ```rust
//! use ebnfgen::compiler::{compile, pretty_format_compile_error, CompileOptions, TokenMap};
//!
//! // 1. Define the grammar
//! static GRAMMAR: &str = r#"
//! Expr   = Term, { ("+" | "-"), Term };
//! Term   = Number | ( "(", Expr, ")" );
//! Number = "0";
//! "#;
//!
//! // 2. Map literals to real tokens, if needed ("0" will match any number)
//! let tokens = TokenMap::new()
//!     .with("Number", "[0-9]+")
//!     .with_skipped("Space", "[ \t]+");
//!
//! // 3. Compile the grammar
//! let parser = compile(GRAMMAR, &CompileOptions::new("Math").with_token_map(tokens))
//!     .unwrap_or_else(|err| panic!("{}", pretty_format_compile_error(GRAMMAR, &err)))
//!     .into_parser()
//!     .unwrap();
//!
//! // 4. Parse!
//! let tree = parser.parse("1 + (20 - 3)").unwrap_or_else(|err| panic!("{}", err));
//! assert_eq!(tree.as_node().unwrap().name(), "Expr");
//! ```

#![forbid(unsafe_code)]
#![forbid(unused_must_use)]

pub mod compiler;
pub mod generators;
pub mod runtime;
