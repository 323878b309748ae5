//! Concrete syntax tree of an EBNF grammar, as produced by the [meta-grammar parser](super::parse_ebnf)
//!
//! Every node keeps the tokens it was built from, trivia excepted.

use crate::runtime::{Location, Token};

/// A whole grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarNode {
    pub rules: Vec<RuleNode>,
}

/// `Identifier = RHS ;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleNode {
    pub name: IdentifierNode,
    pub define: Token,
    pub rhs: RhsNode,
    pub terminator: Token,
}

/// Comma-separated sequences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RhsNode {
    pub sequences: Vec<SequenceNode>,

    /// Commas between the sequences
    pub separators: Vec<Token>,
}

/// Pipe-separated terms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceNode {
    pub terms: Vec<TermNode>,

    /// Pipes between the terms
    pub separators: Vec<Token>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermNode {
    /// `[ RHS ]`
    Optional(BracketedNode),

    /// `{ RHS }`
    Repeated(BracketedNode),

    /// `( RHS )`
    Group(BracketedNode),

    Terminal(TerminalNode),
    Identifier(IdentifierNode),
}

/// An RHS between a pair of brackets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketedNode {
    pub open: Token,
    pub rhs: Box<RhsNode>,
    pub close: Token,
}

/// Quoted literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalNode {
    pub open: Token,

    /// Tokens between the quotes, whitespace included
    pub chars: Vec<Token>,

    pub close: Token,
}

impl TerminalNode {
    /// Get the literal's text, without the quotes
    pub fn value(&self) -> String {
        self.chars.iter().map(Token::image).collect()
    }
}

/// Letter, then letters, digits and underscores
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierNode {
    pub chars: Vec<Token>,
}

impl IdentifierNode {
    pub fn name(&self) -> String {
        self.chars.iter().map(Token::image).collect()
    }

    pub fn location(&self) -> Location {
        self.chars
            .first()
            .map_or_else(Location::start, Token::location)
    }
}

impl TermNode {
    /// Location of the term's first character
    pub fn location(&self) -> Location {
        match self {
            Self::Optional(node) | Self::Repeated(node) | Self::Group(node) => node.open.location(),
            Self::Terminal(node) => node.open.location(),
            Self::Identifier(node) => node.location(),
        }
    }
}
