use crate::runtime::{LexError, Location, SyntaxError};
use std::fmt;
use thiserror::Error;

/// A located message about a grammar's text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    message: String,
    location: Location,
}

impl Diagnostic {
    pub(crate) fn new(message: impl Into<String>, location: Location) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn line(&self) -> usize {
        self.location.line()
    }

    pub fn column(&self) -> usize {
        self.location.column()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.location)
    }
}

impl From<LexError> for Diagnostic {
    fn from(err: LexError) -> Self {
        Self::new(err.to_string(), err.location())
    }
}

impl From<SyntaxError> for Diagnostic {
    fn from(err: SyntaxError) -> Self {
        Self::new(err.message(), err.location())
    }
}

/// Why a grammar cannot be parsed with a single token of lookahead
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ambiguity {
    /// The rule can invoke itself before consuming any token, through the listed rules
    LeftRecursion { path: Vec<String> },

    /// Two alternatives of a choice can start with the same tokens
    ConflictingAlternatives {
        first: usize,
        second: usize,
        tokens: Vec<String>,
    },

    /// More than one alternative of a choice can match an empty input
    MultipleEmptyAlternatives,

    /// A repetition's body can match an empty input
    EmptyRepetition,

    /// An optional part can start with tokens which can also follow it
    OptionalFollowConflict { tokens: Vec<String> },

    /// A repetition's body can start with tokens which can also follow the repetition
    RepetitionFollowConflict { tokens: Vec<String> },

    /// An alternative can start with tokens which can also follow the empty alternative
    EmptyAlternativeFollowConflict {
        empty: usize,
        other: usize,
        tokens: Vec<String>,
    },
}

impl fmt::Display for Ambiguity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::LeftRecursion { path } => {
                write!(f, "left recursion ({})", path.join(" -> "))
            }
            Self::ConflictingAlternatives {
                first,
                second,
                tokens,
            } => write!(
                f,
                "alternatives {} and {} can both start with [{}]",
                first + 1,
                second + 1,
                tokens.join(", ")
            ),
            Self::MultipleEmptyAlternatives => {
                write!(f, "several alternatives can match an empty input")
            }
            Self::EmptyRepetition => write!(f, "a repetition can match an empty input"),
            Self::OptionalFollowConflict { tokens } => write!(
                f,
                "an optional part can start with [{}], which can also follow it",
                tokens.join(", ")
            ),
            Self::RepetitionFollowConflict { tokens } => write!(
                f,
                "a repetition can continue with [{}], which can also follow it",
                tokens.join(", ")
            ),
            Self::EmptyAlternativeFollowConflict {
                empty,
                other,
                tokens,
            } => write!(
                f,
                "alternative {} can start with [{}], which can also follow the empty alternative {}",
                other + 1,
                tokens.join(", "),
                empty + 1
            ),
        }
    }
}

/// Compilation failure
#[derive(Debug, Error)]
pub enum CompileError {
    /// The grammar contains characters outside of the EBNF vocabulary
    #[error("{}", format_diagnostics("Lexer Error", .0))]
    Lex(Vec<Diagnostic>),

    /// The grammar doesn't follow the EBNF syntax
    #[error("{}", format_diagnostics("Parser Error", .0))]
    Parse(Vec<Diagnostic>),

    /// A rule references an undeclared one
    #[error("Undefined rule [{name}] referenced by rule [{referenced_by}] ({location})")]
    UndefinedRule {
        name: String,
        referenced_by: String,
        location: Location,
    },

    /// Two rules have the same name
    #[error("Rule [{name}] is declared twice ({duplicate}, first declared at {first})")]
    DuplicateRule {
        name: String,
        first: Location,
        duplicate: Location,
    },

    /// The grammar requires more than one token of lookahead
    #[error("Ambiguous grammar in rule [{rule}]: {reason}")]
    AmbiguousGrammar { rule: String, reason: Ambiguity },

    /// A token map pattern is not a valid regular expression
    #[error("Invalid pattern for token [{name}]: {source}")]
    InvalidTokenPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    /// Two token map entries have the same name
    #[error("Token [{0}] is declared twice in the token map")]
    DuplicateTokenName(String),

    /// A token map's JSON representation is malformed
    #[error("Invalid token map: {0}")]
    InvalidTokenMap(#[source] serde_json::Error),

    /// A literal's minted token can't be produced by the lexer, as earlier tokens match its beginning
    #[error("Literal {literal:?} can never be lexed as token [{token}], as an earlier token matches its beginning")]
    UnreachableLiteral { literal: String, token: String },

    /// The requested entry rule doesn't exist
    #[error("Entry rule [{0}] was not found")]
    UnknownEntryRule(String),
}

impl CompileError {
    /// List the located messages carried by this error
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            Self::Lex(diags) | Self::Parse(diags) => diags.clone(),
            Self::UndefinedRule {
                name,
                referenced_by,
                location,
            } => vec![Diagnostic::new(
                format!("Undefined rule [{}] referenced by rule [{}]", name, referenced_by),
                *location,
            )],
            Self::DuplicateRule {
                name, duplicate, ..
            } => vec![Diagnostic::new(
                format!("Rule [{}] is declared twice", name),
                *duplicate,
            )],
            Self::AmbiguousGrammar { .. }
            | Self::InvalidTokenPattern { .. }
            | Self::DuplicateTokenName(_)
            | Self::InvalidTokenMap(_)
            | Self::UnreachableLiteral { .. }
            | Self::UnknownEntryRule(_) => vec![],
        }
    }
}

fn format_diagnostics(prefix: &str, diags: &[Diagnostic]) -> String {
    diags
        .iter()
        .map(|diag| format!("{}: {}", prefix, diag))
        .collect::<Vec<_>>()
        .join("\n")
}
