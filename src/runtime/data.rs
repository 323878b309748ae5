use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Location in a source text (both numbers start at 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    /// Line number
    line: usize,

    /// Column number, counted in characters
    column: usize,
}

impl Location {
    /// Create a new location
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Location of the very first character of an input
    pub fn start() -> Self {
        Self::new(1, 1)
    }

    /// Get the location's line number
    pub fn line(&self) -> usize {
        self.line
    }

    /// Get the location's column number
    pub fn column(&self) -> usize {
        self.column
    }

    /// Get the location right after the provided text, if it starts at this location
    pub fn after(&self, text: &str) -> Self {
        let mut loc = *self;

        for c in text.chars() {
            if c == '\n' {
                loc.line += 1;
                loc.column = 1;
            } else {
                loc.column += 1;
            }
        }

        loc
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line: {}, col: {}", self.line, self.column)
    }
}

/// A classified lexeme produced by a [`super::Lexer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Name of the token definition that matched
    kind: Arc<str>,

    /// Matched text
    image: String,

    /// Byte offset in the tokenized input
    offset: usize,

    /// Location of the first character
    location: Location,
}

impl Token {
    pub(crate) fn new(kind: Arc<str>, image: &str, offset: usize, location: Location) -> Self {
        Self {
            kind,
            image: image.to_string(),
            offset,
            location,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn offset(&self) -> usize {
        self.offset
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

    /// Location right after the token's last character
    pub fn end_location(&self) -> Location {
        self.location.after(&self.image)
    }
}

/// Parse tree produced by the [instantiated](super::Parser) and generated parsers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseTree {
    /// A rule invocation
    Node(ParseNode),

    /// A consumed token
    Token(Token),
}

/// Rule node of a [`ParseTree`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNode {
    /// Name of the matched rule
    name: String,

    /// Tokens and sub-rule nodes, in input order
    children: Vec<ParseTree>,
}

impl ParseTree {
    /// Create a rule node
    pub fn node(name: &str, children: Vec<ParseTree>) -> Self {
        Self::Node(ParseNode {
            name: name.to_string(),
            children,
        })
    }

    pub fn as_node(&self) -> Option<&ParseNode> {
        match self {
            Self::Node(node) => Some(node),
            Self::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Self::Node(_) => None,
            Self::Token(token) => Some(token),
        }
    }

    /// Concatenate the images of all tokens under this tree
    pub fn text(&self) -> String {
        match self {
            Self::Node(node) => node.children.iter().map(ParseTree::text).collect(),
            Self::Token(token) => token.image.clone(),
        }
    }

    /// Render the tree as an S-expression, e.g. `(Number (Digit "1") (Digit "2"))`
    pub fn to_sexpr(&self) -> String {
        match self {
            Self::Node(node) => {
                let mut out = format!("({}", node.name);

                for child in &node.children {
                    out.push(' ');
                    out.push_str(&child.to_sexpr());
                }

                out.push(')');
                out
            }
            Self::Token(token) => format!("{:?}", token.image),
        }
    }
}

impl From<Token> for ParseTree {
    fn from(token: Token) -> Self {
        Self::Token(token)
    }
}

impl ParseNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[ParseTree] {
        &self.children
    }

    /// Iterate over the direct children which are rule nodes
    pub fn child_nodes(&self) -> impl Iterator<Item = &ParseNode> {
        self.children.iter().filter_map(ParseTree::as_node)
    }

    /// Iterate over the direct children which are tokens
    pub fn child_tokens(&self) -> impl Iterator<Item = &Token> {
        self.children.iter().filter_map(ParseTree::as_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_after_multiline_text() {
        let loc = Location::new(2, 5).after("ab\ncd");
        assert_eq!(loc, Location::new(3, 3));
    }

    #[test]
    fn sexpr_nests_nodes_and_tokens() {
        let kind: Arc<str> = Arc::from("Str_1");
        let one = Token::new(kind, "1", 0, Location::start());
        let tree = ParseTree::node("Number", vec![ParseTree::node("Digit", vec![one.into()])]);

        assert_eq!(tree.to_sexpr(), r#"(Number (Digit "1"))"#);
        assert_eq!(tree.text(), "1");
    }
}
