//! # Grammar compiler
//!
//! This module turns EBNF grammars into [rule graphs](RuleGraph), validates them, and hands them to the
//! [generators](crate::generators) to get either a runnable [parser](crate::runtime::Parser) or its Rust source code.
//!
//! The pipeline is: [tokenize](vocabulary::VOCABULARY) -> [parse](parse_ebnf) -> [build](build_rule_graph)
//! -> [validate](validate) -> generate. Each step can be run separately through [`EbnfCompiler`].

mod builder;
pub mod cst;
pub mod data;
mod errors;
mod lookahead;
mod parser;
mod report;
mod terminals;
mod validator;
pub mod vocabulary;

pub use builder::*;
pub use data::*;
pub use errors::*;
pub use lookahead::*;
pub use parser::*;
pub use report::*;
pub use terminals::*;
pub use validator::*;

use crate::generators;
use crate::runtime::{LexerError, Parser, Token};
use cst::GrammarNode;
use log::debug;

/// What a compilation produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// A parser object, usable right away
    #[default]
    Instantiate,

    /// Rust source code of an equivalent parser
    Source,
}

/// Options of a single compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Target name, used to name the generated parser
    pub name: String,

    /// Token definitions to try before minting tokens for literals
    pub token_map: Option<TokenMap>,

    /// Output mode
    pub mode: OutputMode,

    /// Rule to start parsing from, instead of the inferred one
    pub entry_rule: Option<String>,
}

impl CompileOptions {
    /// Create a new set of options
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            token_map: None,
            mode: OutputMode::default(),
            entry_rule: None,
        }
    }

    pub fn with_token_map(mut self, token_map: TokenMap) -> Self {
        self.token_map = Some(token_map);
        self
    }

    pub fn with_mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_entry_rule(mut self, entry_rule: &str) -> Self {
        self.entry_rule = Some(entry_rule.to_string());
        self
    }
}

/// Result of a compilation
#[derive(Debug, Clone)]
pub enum Artifact {
    Parser(Parser),
    Source(String),
}

impl Artifact {
    pub fn into_parser(self) -> Option<Parser> {
        match self {
            Self::Parser(parser) => Some(parser),
            Self::Source(_) => None,
        }
    }

    pub fn into_source(self) -> Option<String> {
        match self {
            Self::Parser(_) => None,
            Self::Source(source) => Some(source),
        }
    }
}

/// A grammar's text, checked against the EBNF vocabulary
///
/// ```
/// use ebnfgen::compiler::{CompileOptions, EbnfCompiler};
///
/// let compiler = EbnfCompiler::new(r#"Digit = "0" | "1"; Number = Digit, { Digit };"#).unwrap();
///
/// let parser = compiler
///     .compile(&CompileOptions::new("Binary"))
///     .unwrap()
///     .into_parser()
///     .unwrap();
///
/// let tree = parser.parse("101").unwrap();
/// assert_eq!(tree.to_sexpr(), r#"(Number (Digit "1") (Digit "0") (Digit "1"))"#);
/// ```
#[derive(Debug, Clone)]
pub struct EbnfCompiler {
    source: String,
    tokens: Vec<Token>,
}

impl EbnfCompiler {
    /// Tokenize a grammar, failing with every span outside of the vocabulary
    pub fn new(source: &str) -> Result<Self, CompileError> {
        let tokens = vocabulary::VOCABULARY.tokenize(source).map_err(|errors| {
            CompileError::Lex(errors.into_iter().map(Diagnostic::from).collect())
        })?;

        debug!("Tokenized grammar into {} token(s)", tokens.len());

        Ok(Self {
            source: source.to_string(),
            tokens,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Parse the grammar
    pub fn parse_tree(&self) -> Result<GrammarNode, CompileError> {
        parse_ebnf(&self.tokens)
    }

    /// Parse the grammar and build its (unvalidated) rule graph
    pub fn build(&self, token_map: Option<&TokenMap>) -> Result<(RuleGraph, TokenSet), CompileError> {
        build_rule_graph(&self.parse_tree()?, token_map)
    }

    /// Parse, build and validate the grammar
    pub fn analyze(&self, options: &CompileOptions) -> Result<ValidatedGrammar, CompileError> {
        let (graph, tokens) = self.build(options.token_map.as_ref())?;
        validate(&options.name, graph, tokens, options.entry_rule.as_deref())
    }

    /// Run the whole pipeline
    pub fn compile(&self, options: &CompileOptions) -> Result<Artifact, CompileError> {
        let grammar = self.analyze(options)?;

        let artifact = match options.mode {
            OutputMode::Instantiate => Artifact::Parser(generators::instantiate(&grammar)?),
            OutputMode::Source => Artifact::Source(generators::gen_rust_str(&grammar)),
        };

        debug!("Generated {:?} artifact for [{}]", options.mode, options.name);

        Ok(artifact)
    }
}

/// Compile a grammar in a single call
pub fn compile(source: &str, options: &CompileOptions) -> Result<Artifact, CompileError> {
    EbnfCompiler::new(source)?.compile(options)
}

impl From<LexerError> for CompileError {
    fn from(err: LexerError) -> Self {
        match err {
            LexerError::InvalidPattern { name, source } => {
                CompileError::InvalidTokenPattern { name, source }
            }
        }
    }
}
