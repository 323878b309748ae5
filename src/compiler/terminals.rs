use super::data::TokenMap;
use super::errors::CompileError;
use crate::runtime::{Lexer, LexerError, TokenDef};
use log::debug;
use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Identifier of a token in a [`TokenSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TokenId(pub(crate) usize);

impl TokenId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Where a token comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum TokenOrigin {
    /// Token map entry
    Mapped,

    /// Created for a literal no token map entry matched
    Minted { literal: String },
}

/// A token of the target language
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenSpec {
    name: String,
    pattern: String,
    skipped: bool,
    origin: TokenOrigin,
}

impl TokenSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    pub fn origin(&self) -> &TokenOrigin {
        &self.origin
    }

    /// Get the literal a minted token was created for
    pub fn minted_literal(&self) -> Option<&str> {
        match &self.origin {
            TokenOrigin::Mapped => None,
            TokenOrigin::Minted { literal } => Some(literal),
        }
    }
}

/// Tokens of a compiled grammar: token map entries first, then minted tokens in minting order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TokenSet {
    tokens: Vec<TokenSpec>,
}

impl TokenSet {
    pub fn get(&self, id: TokenId) -> &TokenSpec {
        &self.tokens[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = (TokenId, &TokenSpec)> {
        self.tokens
            .iter()
            .enumerate()
            .map(|(i, token)| (TokenId(i), token))
    }

    /// Find a token from its name
    pub fn find(&self, name: &str) -> Option<TokenId> {
        self.tokens
            .iter()
            .position(|token| token.name == name)
            .map(TokenId)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Order in which the generated lexers try the tokens
    ///
    /// Mapped tokens keep their listed order, then minted tokens follow from the longest literal
    /// to the shortest so that e.g. `<=` is tried before `<`.
    pub fn lexer_order(&self) -> Vec<TokenId> {
        let (mapped, mut minted): (Vec<_>, Vec<_>) = self
            .iter()
            .partition(|(_, token)| token.origin == TokenOrigin::Mapped);

        // Stable sort: ties stay in minting order
        minted.sort_by_key(|(_, token)| {
            std::cmp::Reverse(token.minted_literal().map_or(0, |lit| lit.chars().count()))
        });

        mapped.into_iter().chain(minted).map(|(id, _)| id).collect()
    }

    /// Ensure each minted literal is lexed as a single token of its own
    ///
    /// Token map entries are tried first, so one of them can swallow the beginning of a literal.
    pub fn check_minted_literals(&self) -> Result<(), CompileError> {
        let lexer = self.to_lexer()?;

        for (_, token) in self.iter() {
            let literal = match token.minted_literal() {
                Some(literal) => literal,
                None => continue,
            };

            let lexed_alone = match lexer.tokenize(literal) {
                Ok(lexed) => lexed.len() == 1 && lexed[0].kind() == token.name,
                Err(_) => false,
            };

            if !lexed_alone {
                return Err(CompileError::UnreachableLiteral {
                    literal: literal.to_string(),
                    token: token.name.clone(),
                });
            }
        }

        Ok(())
    }

    /// Build the lexer recognizing this set
    pub fn to_lexer(&self) -> Result<Lexer, LexerError> {
        let defs = self
            .lexer_order()
            .into_iter()
            .map(|id| {
                let token = self.get(id);
                let def = TokenDef::new(&token.name, &token.pattern)?;
                Ok(if token.skipped { def.skipped() } else { def })
            })
            .collect::<Result<Vec<_>, LexerError>>()?;

        Ok(Lexer::new(defs))
    }
}

/// Resolves terminal literals to tokens, minting new ones when no token map entry matches
#[derive(Debug)]
pub struct TerminalMatcher {
    tokens: Vec<TokenSpec>,

    /// Full-match regex of each non-skipped token map entry, with the entry's token
    mapped: Vec<(Regex, TokenId)>,

    /// Literals that were already resolved
    resolved: HashMap<String, TokenId>,

    /// Names already taken
    names: HashSet<String>,
}

impl TerminalMatcher {
    /// Create a matcher from an optional token map
    pub fn new(token_map: Option<&TokenMap>) -> Result<Self, CompileError> {
        let mut tokens = vec![];
        let mut mapped = vec![];
        let mut names = HashSet::new();

        for entry in token_map.map(TokenMap::entries).unwrap_or_default() {
            if !names.insert(entry.name.clone()) {
                return Err(CompileError::DuplicateTokenName(entry.name.clone()));
            }

            let full = Regex::new(&format!("^(?:{})$", entry.pattern)).map_err(|source| {
                CompileError::InvalidTokenPattern {
                    name: entry.name.clone(),
                    source,
                }
            })?;

            let id = TokenId(tokens.len());

            if !entry.skipped {
                mapped.push((full, id));
            }

            tokens.push(TokenSpec {
                name: entry.name.clone(),
                pattern: entry.pattern.clone(),
                skipped: entry.skipped,
                origin: TokenOrigin::Mapped,
            });
        }

        Ok(Self {
            tokens,
            mapped,
            resolved: HashMap::new(),
            names,
        })
    }

    /// Get the token matching a literal
    pub fn resolve(&mut self, literal: &str) -> TokenId {
        if let Some(id) = self.resolved.get(literal) {
            return *id;
        }

        let id = match self.mapped.iter().find(|(regex, _)| regex.is_match(literal)) {
            Some((_, id)) => {
                debug!(
                    "Literal {:?} resolved to mapped token [{}]",
                    literal, self.tokens[id.0].name
                );
                *id
            }
            None => self.mint(literal),
        };

        self.resolved.insert(literal.to_string(), id);
        id
    }

    fn mint(&mut self, literal: &str) -> TokenId {
        let base = token_name_for_literal(literal);
        let mut name = base.clone();
        let mut suffix = 2;

        while self.names.contains(&name) {
            name = format!("{}_{}", base, suffix);
            suffix += 1;
        }

        debug!("Minted token [{}] for literal {:?}", name, literal);

        self.names.insert(name.clone());
        self.tokens.push(TokenSpec {
            name,
            pattern: regex::escape(literal),
            skipped: false,
            origin: TokenOrigin::Minted {
                literal: literal.to_string(),
            },
        });

        TokenId(self.tokens.len() - 1)
    }

    /// Get the resulting token set
    pub fn finish(self) -> TokenSet {
        TokenSet {
            tokens: self.tokens,
        }
    }
}

/// Derive a readable token name from a literal, e.g. `"<="` gives `Str_LessEquals`
pub fn token_name_for_literal(literal: &str) -> String {
    let mut name = String::from("Str_");

    for c in literal.chars() {
        if c.is_ascii_alphanumeric() {
            name.push(c);
            continue;
        }

        let spelled = match c {
            '+' => "Plus",
            '-' => "Minus",
            '*' => "Star",
            '/' => "Slash",
            '\\' => "Backslash",
            '=' => "Equals",
            '<' => "Less",
            '>' => "Greater",
            '(' => "LParen",
            ')' => "RParen",
            '[' => "LBracket",
            ']' => "RBracket",
            '{' => "LBrace",
            '}' => "RBrace",
            '.' => "Dot",
            ',' => "Comma",
            ';' => "Semicolon",
            ':' => "Colon",
            '!' => "Bang",
            '?' => "Question",
            '&' => "Amp",
            '|' => "Pipe",
            '^' => "Caret",
            '%' => "Percent",
            '$' => "Dollar",
            '#' => "Hash",
            '@' => "At",
            '~' => "Tilde",
            '`' => "Backtick",
            '\'' => "Quote",
            '"' => "DoubleQuote",
            '_' => "_",
            ' ' => "Space",
            '\t' => "Tab",
            '\n' => "NewLine",
            '\r' => "Return",
            _ => "X",
        };

        name.push_str(spelled);
    }

    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mints_once_per_literal() {
        let mut matcher = TerminalMatcher::new(None).unwrap();

        let plus = matcher.resolve("+");
        let minus = matcher.resolve("-");

        assert_eq!(matcher.resolve("+"), plus);
        assert_ne!(plus, minus);

        let tokens = matcher.finish();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens.get(plus).name(), "Str_Plus");
        assert_eq!(tokens.get(plus).pattern(), r"\+");
    }

    #[test]
    fn first_mapped_entry_wins() {
        let map = TokenMap::new()
            .with("Digit", "[0-9]")
            .with("Number", "[0-9]+")
            .with_skipped("Any", ".+");

        let mut matcher = TerminalMatcher::new(Some(&map)).unwrap();

        assert_eq!(matcher.resolve("7"), TokenId(0));
        assert_eq!(matcher.resolve("42"), TokenId(1));

        // Skipped entries never resolve literals
        let minted = matcher.resolve("x");
        assert_eq!(minted, TokenId(3));
        assert_eq!(matcher.finish().get(minted).minted_literal(), Some("x"));
    }

    #[test]
    fn disambiguates_minted_names() {
        let map = TokenMap::new().with("Str_a", "b");
        let mut matcher = TerminalMatcher::new(Some(&map)).unwrap();

        let id = matcher.resolve("a");
        assert_eq!(matcher.finish().get(id).name(), "Str_a_2");
    }

    #[test]
    fn longer_literals_are_lexed_first() {
        let mut matcher = TerminalMatcher::new(None).unwrap();
        let lt = matcher.resolve("<");
        let le = matcher.resolve("<=");

        let tokens = matcher.finish();
        assert_eq!(tokens.lexer_order(), vec![le, lt]);

        let lexed = tokens.to_lexer().unwrap().tokenize("<=<").unwrap();
        let kinds: Vec<_> = lexed.iter().map(|t| t.kind()).collect();
        assert_eq!(kinds, ["Str_LessEquals", "Str_Less"]);
    }

    #[test]
    fn detects_literals_swallowed_by_mapped_tokens() {
        let map = TokenMap::new().with("Op", "[<>]").with_skipped("Space", " +");
        let mut matcher = TerminalMatcher::new(Some(&map)).unwrap();
        matcher.resolve("<=");

        match matcher.finish().check_minted_literals() {
            Err(CompileError::UnreachableLiteral { literal, token }) => {
                assert_eq!(literal, "<=");
                assert_eq!(token, "Str_LessEquals");
            }
            other => panic!("Unexpected result: {:?}", other),
        }

        let mut matcher = TerminalMatcher::new(Some(&map)).unwrap();
        matcher.resolve(" ");
        assert!(matcher.finish().check_minted_literals().is_err());

        let mut matcher = TerminalMatcher::new(Some(&map)).unwrap();
        matcher.resolve("=");
        matcher.resolve("==");
        assert!(matcher.finish().check_minted_literals().is_ok());
    }

    #[test]
    fn rejects_invalid_token_maps() {
        let invalid = TokenMap::new().with("Bad", "(");
        assert!(matches!(
            TerminalMatcher::new(Some(&invalid)),
            Err(CompileError::InvalidTokenPattern { .. })
        ));

        let duplicate = TokenMap::new().with("A", "a").with("A", "b");
        assert!(matches!(
            TerminalMatcher::new(Some(&duplicate)),
            Err(CompileError::DuplicateTokenName(_))
        ));
    }
}
