use super::data::{Location, Token};
use super::errors::SyntaxError;

/// Cursor over a token stream with one token of lookahead
///
/// Shared by the instantiated parsers, the generated ones and the meta-grammar parser.
#[derive(Debug, Clone)]
pub struct Recognizer<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Recognizer<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Get the next token without consuming it
    pub fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Check if the next token is of the provided kind
    pub fn at(&self, kind: &str) -> bool {
        self.peek().map_or(false, |token| token.kind() == kind)
    }

    /// Check if the next token is of any of the provided kinds
    pub fn at_any<S: AsRef<str>>(&self, kinds: &[S]) -> bool {
        self.peek()
            .map_or(false, |token| kinds.iter().any(|kind| kind.as_ref() == token.kind()))
    }

    /// Consume the next token, whatever its kind
    pub fn advance(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    /// Consume the next token if it is of the provided kind
    pub fn consume(&mut self, kind: &str) -> Result<Token, SyntaxError> {
        match self.peek() {
            Some(token) if token.kind() == kind => {
                self.pos += 1;
                Ok(token.clone())
            }
            _ => Err(self.unexpected(None, vec![kind.to_string()])),
        }
    }

    /// Consume the next token if it is of the provided kind, reporting failures as happening in a rule
    pub fn expect(&mut self, rule: &str, kind: &str) -> Result<Token, SyntaxError> {
        self.consume(kind)
            .map_err(|_| self.unexpected(Some(rule), vec![kind.to_string()]))
    }

    /// Build the error for a choice where no alternative starts with the next token
    pub fn no_viable_alternative<S: AsRef<str>>(&self, rule: &str, expected: &[S]) -> SyntaxError {
        self.unexpected(
            Some(rule),
            expected.iter().map(|kind| kind.as_ref().to_string()).collect(),
        )
    }

    /// Build an error reporting the next token as unexpected
    pub fn unexpected(&self, rule: Option<&str>, expected: Vec<String>) -> SyntaxError {
        let found = self.peek().cloned();

        let location = found
            .as_ref()
            .map_or_else(|| self.end_location(), Token::location);

        SyntaxError::new(rule, expected, found, location)
    }

    /// Ensure the whole token stream was consumed
    pub fn finish(&self) -> Result<(), SyntaxError> {
        if self.is_at_end() {
            Ok(())
        } else {
            Err(self.unexpected(None, vec![]))
        }
    }

    /// Location right after the last token
    pub fn end_location(&self) -> Location {
        self.tokens
            .last()
            .map_or_else(Location::start, Token::end_location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn tokens() -> Vec<Token> {
        let a: Arc<str> = Arc::from("A");
        let b: Arc<str> = Arc::from("B");

        vec![
            Token::new(Arc::clone(&a), "a", 0, Location::new(1, 1)),
            Token::new(b, "bb", 1, Location::new(1, 2)),
        ]
    }

    #[test]
    fn consumes_matching_kinds() {
        let tokens = tokens();
        let mut rec = Recognizer::new(&tokens);

        assert!(rec.at("A"));
        assert!(rec.at_any(&["B", "A"]));
        assert_eq!(rec.consume("A").unwrap().image(), "a");

        let err = rec.consume("A").unwrap_err();
        assert_eq!(err.expected(), ["A".to_string()]);
        assert_eq!(err.found().map(Token::image), Some("bb"));
        assert!(rec.finish().is_err());

        let err = rec.expect("Rule", "A").unwrap_err();
        assert_eq!(err.rule(), Some("Rule"));

        rec.advance();
        assert!(rec.finish().is_ok());
    }

    #[test]
    fn reports_end_of_input_after_last_token() {
        let tokens = tokens();
        let mut rec = Recognizer::new(&tokens);
        rec.advance();
        rec.advance();

        let err = rec.no_viable_alternative("Rule", &["A"]);
        assert_eq!(err.found(), None);
        assert_eq!(err.location(), Location::new(1, 4));
        assert_eq!(err.rule(), Some("Rule"));
    }
}
