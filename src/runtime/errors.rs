use super::data::{Location, Token};
use thiserror::Error;

/// Error raised while building a [`super::Lexer`] from token definitions
#[derive(Debug, Error)]
pub enum LexerError {
    /// A token pattern is not a valid regular expression
    #[error("Invalid pattern for token [{name}]: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

/// A span of input no token definition matches
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unexpected character sequence {text:?}")]
pub struct LexError {
    /// Unmatched text
    text: String,

    /// Byte offset of the span in the tokenized input
    offset: usize,

    /// Location of the span's first character
    location: Location,
}

impl LexError {
    pub(crate) fn new(text: &str, offset: usize, location: Location) -> Self {
        Self {
            text: text.to_string(),
            offset,
            location,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn location(&self) -> Location {
        self.location
    }
}

/// Token stream does not follow the grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} ({location})", syntax_message(.rule, .expected, .found))]
pub struct SyntaxError {
    /// Rule being parsed when the error occurred, if known
    rule: Option<String>,

    /// Token kinds that would have been accepted
    expected: Vec<String>,

    /// Offending token (`None` at end of input)
    found: Option<Token>,

    /// Error's location
    location: Location,
}

impl SyntaxError {
    pub(crate) fn new(
        rule: Option<&str>,
        expected: Vec<String>,
        found: Option<Token>,
        location: Location,
    ) -> Self {
        Self {
            rule: rule.map(str::to_string),
            expected,
            found,
            location,
        }
    }

    pub fn rule(&self) -> Option<&str> {
        self.rule.as_deref()
    }

    pub fn expected(&self) -> &[String] {
        &self.expected
    }

    pub fn found(&self) -> Option<&Token> {
        self.found.as_ref()
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Format the error without its location
    pub fn message(&self) -> String {
        syntax_message(&self.rule, &self.expected, &self.found)
    }
}

/// Error raised by a generated parser
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The parser's lexer could not be built
    #[error(transparent)]
    Lexer(#[from] LexerError),

    /// The input contains text no token matches
    #[error("{}", format_lex_errors(.0))]
    Lex(Vec<LexError>),

    /// The token stream does not follow the grammar
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// Parsing was requested from a rule the grammar doesn't declare
    #[error("Rule [{0}] was not found")]
    UnknownRule(String),
}

impl From<Vec<LexError>> for RuntimeError {
    fn from(errors: Vec<LexError>) -> Self {
        Self::Lex(errors)
    }
}

impl RuntimeError {
    /// Location of the first reported problem, if any
    pub fn location(&self) -> Option<Location> {
        match self {
            Self::Lex(errors) => errors.first().map(LexError::location),
            Self::Syntax(err) => Some(err.location()),
            Self::Lexer(_) | Self::UnknownRule(_) => None,
        }
    }
}

fn format_lex_errors(errors: &[LexError]) -> String {
    errors
        .iter()
        .map(|err| format!("{} ({})", err, err.location()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn syntax_message(rule: &Option<String>, expected: &[String], found: &Option<Token>) -> String {
    let expected = match expected.len() {
        0 => "end of input".to_string(),
        1 => format!("[{}]", expected[0]),
        _ => format!("one of [{}]", expected.join(", ")),
    };

    let found = match found {
        Some(token) => format!("[{}] {:?}", token.kind(), token.image()),
        None => "end of input".to_string(),
    };

    match rule {
        Some(rule) => format!("In rule [{}]: expected {}, found {}", rule, expected, found),
        None => format!("Expected {}, found {}", expected, found),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn syntax_errors_display_their_location() {
        let token = Token::new(Arc::from("Str_x"), "x", 3, Location::new(1, 4));
        let err = SyntaxError::new(
            Some("Pair"),
            vec!["Str_a".to_string(), "Str_b".to_string()],
            Some(token),
            Location::new(1, 4),
        );

        assert_eq!(
            err.to_string(),
            r#"In rule [Pair]: expected one of [Str_a, Str_b], found [Str_x] "x" (line: 1, col: 4)"#
        );

        let err = SyntaxError::new(None, vec![], None, Location::new(2, 1));
        let source: &dyn std::error::Error = &err;
        assert_eq!(source.to_string(), "Expected end of input, found end of input (line: 2, col: 1)");
    }
}
