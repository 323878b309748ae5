use super::data::{Location, Token};
use super::errors::{LexError, LexerError};
use regex::Regex;
use std::sync::Arc;

/// A named token pattern
#[derive(Debug, Clone)]
pub struct TokenDef {
    /// Token kind's name
    name: Arc<str>,

    /// Pattern, as written by the grammar author
    pattern: String,

    /// Pattern anchored to the current position
    regex: Regex,

    /// Matches are consumed but not emitted
    skipped: bool,
}

impl TokenDef {
    /// Compile a token definition
    pub fn new(name: &str, pattern: &str) -> Result<Self, LexerError> {
        let regex = Regex::new(&format!("^(?:{})", pattern)).map_err(|source| {
            LexerError::InvalidPattern {
                name: name.to_string(),
                source,
            }
        })?;

        Ok(Self {
            name: Arc::from(name),
            pattern: pattern.to_string(),
            regex,
            skipped: false,
        })
    }

    /// Mark the definition as skipped
    pub fn skipped(mut self) -> Self {
        self.skipped = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped
    }
}

/// First-match lexer: at each position, the first definition (in order) producing a non-empty match wins
#[derive(Debug, Clone)]
pub struct Lexer {
    defs: Vec<TokenDef>,
}

impl Lexer {
    pub fn new(defs: Vec<TokenDef>) -> Self {
        Self { defs }
    }

    /// Build a lexer from `(name, pattern, skipped)` triplets, as found in generated parsers
    pub fn from_table(table: &[(&str, &str, bool)]) -> Result<Self, LexerError> {
        let defs = table
            .iter()
            .map(|(name, pattern, skipped)| {
                let def = TokenDef::new(name, pattern)?;
                Ok(if *skipped { def.skipped() } else { def })
            })
            .collect::<Result<Vec<_>, LexerError>>()?;

        Ok(Self::new(defs))
    }

    pub fn definitions(&self) -> &[TokenDef] {
        &self.defs
    }

    /// Split an input into tokens
    ///
    /// Consecutive characters no definition matches are reported as a single [`LexError`];
    /// all such spans are collected before failing.
    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>, Vec<LexError>> {
        let mut tokens = vec![];
        let mut errors = vec![];

        let mut offset = 0;
        let mut location = Location::start();

        // Start of the current run of unmatched characters
        let mut unmatched: Option<(usize, Location)> = None;

        while offset < input.len() {
            let rest = &input[offset..];

            let matched = self.defs.iter().find_map(|def| {
                def.regex
                    .find(rest)
                    .filter(|m| !m.as_str().is_empty())
                    .map(|m| (def, m.as_str()))
            });

            match matched {
                Some((def, image)) => {
                    if let Some((start, start_loc)) = unmatched.take() {
                        errors.push(LexError::new(&input[start..offset], start, start_loc));
                    }

                    if !def.skipped {
                        tokens.push(Token::new(Arc::clone(&def.name), image, offset, location));
                    }

                    offset += image.len();
                    location = location.after(image);
                }

                None => {
                    if unmatched.is_none() {
                        unmatched = Some((offset, location));
                    }

                    // Input is never empty here
                    let c = rest.chars().next().unwrap_or_default();
                    let len = c.len_utf8().max(1);

                    location = location.after(&rest[..len]);
                    offset += len;
                }
            }
        }

        if let Some((start, start_loc)) = unmatched {
            errors.push(LexError::new(&input[start..], start, start_loc));
        }

        if errors.is_empty() {
            Ok(tokens)
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits() -> Lexer {
        Lexer::from_table(&[("Digit", "[0-9]", false), ("Space", " +", true)]).unwrap()
    }

    #[test]
    fn skips_and_locates_tokens() {
        let tokens = digits().tokenize("1 2\n3").unwrap_err();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text(), "\n");

        let tokens = digits().tokenize("1  2").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].image(), "2");
        assert_eq!(tokens[1].location(), Location::new(1, 4));
    }

    #[test]
    fn merges_unmatched_runs() {
        let errors = digits().tokenize("1ab2c").unwrap_err();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].text(), "ab");
        assert_eq!(errors[0].location(), Location::new(1, 2));
        assert_eq!(errors[1].text(), "c");
        assert_eq!(errors[1].offset(), 4);
    }

    #[test]
    fn first_definition_wins() {
        let lexer = Lexer::from_table(&[("A", "a", false), ("AA", "aa", false)]).unwrap();
        let tokens = lexer.tokenize("aa").unwrap();

        assert_eq!(tokens.len(), 2);
        assert!(tokens.iter().all(|t| t.kind() == "A"));
    }

    #[test]
    fn rejects_invalid_patterns() {
        assert!(matches!(
            TokenDef::new("Bad", "("),
            Err(LexerError::InvalidPattern { .. })
        ));
    }
}
