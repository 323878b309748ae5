//! # Parsing runtime
//!
//! Building blocks shared by the [instantiated](Parser) parsers, the parsers emitted as source code
//! by [`crate::generators::rust`], and the grammar compiler itself:
//! an ordered-pattern [`Lexer`], a one-token-lookahead [`Recognizer`] and a [`Program`] interpreter.

mod data;
mod errors;
mod executor;
mod lexer;
mod recognizer;

pub use data::*;
pub use errors::*;
pub use executor::*;
pub use lexer::*;
pub use recognizer::*;
