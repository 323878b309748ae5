use super::data::{ParseTree, Token};
use super::errors::{RuntimeError, SyntaxError};
use super::lexer::Lexer;
use super::recognizer::Recognizer;
use log::trace;
use std::collections::HashMap;
use std::sync::Arc;

/// Rule set of an instantiated parser, lowered to parsing primitives
#[derive(Debug, Clone)]
pub struct Program {
    /// Rules, in declaration order
    rules: Vec<RuleProgram>,

    /// Position of each rule in [`Self::rules`]
    index: HashMap<String, usize>,
}

/// A single rule of a [`Program`]
#[derive(Debug, Clone)]
pub struct RuleProgram {
    /// Rule's name
    name: String,

    /// Productions to run in sequence
    body: Vec<Production>,
}

/// Parsing primitive
///
/// Occurrence indexes identify a construct among the ones of the same kind in a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Production {
    /// Consume a token of the given kind
    Consume { token: Arc<str>, occurrence: usize },

    /// Invoke a rule (by position in the program)
    Subrule { rule: usize, occurrence: usize },

    /// Run the body if the next token is in the lookahead set
    Option {
        lookahead: Vec<Arc<str>>,
        body: Vec<Production>,
        occurrence: usize,
    },

    /// Run the body as long as the next token is in the lookahead set
    Many {
        lookahead: Vec<Arc<str>>,
        body: Vec<Production>,
        occurrence: usize,
    },

    /// Run the first alternative whose lookahead set contains the next token, or the nullable one
    Or {
        alternatives: Vec<Alternative>,
        expected: Vec<Arc<str>>,
        occurrence: usize,
    },
}

/// Branch of a [`Production::Or`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    /// Tokens starting this alternative
    pub lookahead: Vec<Arc<str>>,

    /// Can this alternative match an empty input?
    pub nullable: bool,

    /// Productions to run in sequence
    pub body: Vec<Production>,
}

impl RuleProgram {
    pub fn new(name: &str, body: Vec<Production>) -> Self {
        Self {
            name: name.to_string(),
            body,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &[Production] {
        &self.body
    }
}

impl Program {
    pub fn new(rules: Vec<RuleProgram>) -> Self {
        let index = rules
            .iter()
            .enumerate()
            .map(|(i, rule)| (rule.name.clone(), i))
            .collect();

        Self { rules, index }
    }

    pub fn rules(&self) -> &[RuleProgram] {
        &self.rules
    }

    /// Get the position of a rule from its name
    pub fn rule_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Parse a rule from the recognizer's current position
    pub fn run_rule(&self, rule: usize, rec: &mut Recognizer) -> Result<ParseTree, SyntaxError> {
        let rule = &self.rules[rule];

        trace!("Entering rule [{}] at token {}", rule.name, rec.position());

        let mut children = vec![];
        self.run_body(rule, &rule.body, rec, &mut children)?;

        Ok(ParseTree::node(&rule.name, children))
    }

    fn run_body(
        &self,
        rule: &RuleProgram,
        body: &[Production],
        rec: &mut Recognizer,
        children: &mut Vec<ParseTree>,
    ) -> Result<(), SyntaxError> {
        for production in body {
            match production {
                Production::Consume { token, .. } => {
                    children.push(rec.expect(&rule.name, token)?.into());
                }

                Production::Subrule { rule: subrule, .. } => {
                    children.push(self.run_rule(*subrule, rec)?);
                }

                Production::Option {
                    lookahead,
                    body,
                    occurrence,
                } => {
                    if rec.at_any(lookahead) {
                        trace!("[{}] entering option #{}", rule.name, occurrence);
                        self.run_body(rule, body, rec, children)?;
                    }
                }

                Production::Many {
                    lookahead,
                    body,
                    occurrence,
                } => {
                    while rec.at_any(lookahead) {
                        trace!("[{}] iterating repetition #{}", rule.name, occurrence);
                        self.run_body(rule, body, rec, children)?;
                    }
                }

                Production::Or {
                    alternatives,
                    expected,
                    occurrence,
                } => {
                    let chosen = alternatives
                        .iter()
                        .position(|alt| rec.at_any(&alt.lookahead))
                        .or_else(|| alternatives.iter().position(|alt| alt.nullable));

                    match chosen {
                        Some(i) => {
                            trace!("[{}] choice #{} takes alternative {}", rule.name, occurrence, i);
                            self.run_body(rule, &alternatives[i].body, rec, children)?;
                        }
                        None => return Err(rec.no_viable_alternative(&rule.name, expected)),
                    }
                }
            }
        }

        Ok(())
    }
}

/// A runnable parser, built from a compiled grammar
///
/// Cloning is cheap, and parsers can be shared between threads.
#[derive(Debug, Clone)]
pub struct Parser {
    inner: Arc<ParserInner>,
}

#[derive(Debug)]
struct ParserInner {
    name: String,
    lexer: Lexer,
    program: Program,
    entry: usize,
}

impl Parser {
    pub(crate) fn new(name: &str, lexer: Lexer, program: Program, entry: usize) -> Self {
        Self {
            inner: Arc::new(ParserInner {
                name: name.to_string(),
                lexer,
                program,
                entry,
            }),
        }
    }

    /// Get the grammar's name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Get the name of the rule [`Self::parse`] starts from
    pub fn entry_rule(&self) -> &str {
        self.inner.program.rules[self.inner.entry].name()
    }

    pub fn lexer(&self) -> &Lexer {
        &self.inner.lexer
    }

    pub fn program(&self) -> &Program {
        &self.inner.program
    }

    /// Tokenize an input with the grammar's tokens
    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>, RuntimeError> {
        Ok(self.inner.lexer.tokenize(input)?)
    }

    /// Parse a token stream from the entry rule
    pub fn parse_tokens(&self, tokens: &[Token]) -> Result<ParseTree, RuntimeError> {
        self.run(self.inner.entry, tokens)
    }

    /// Tokenize then parse an input from the entry rule
    pub fn parse(&self, input: &str) -> Result<ParseTree, RuntimeError> {
        let tokens = self.tokenize(input)?;
        self.parse_tokens(&tokens)
    }

    /// Tokenize then parse an input from a specific rule
    pub fn parse_rule(&self, rule: &str, input: &str) -> Result<ParseTree, RuntimeError> {
        let index = self
            .inner
            .program
            .rule_index(rule)
            .ok_or_else(|| RuntimeError::UnknownRule(rule.to_string()))?;

        let tokens = self.tokenize(input)?;
        self.run(index, &tokens)
    }

    fn run(&self, rule: usize, tokens: &[Token]) -> Result<ParseTree, RuntimeError> {
        let mut rec = Recognizer::new(tokens);

        let tree = self.inner.program.run_rule(rule, &mut rec)?;
        rec.finish()?;

        Ok(tree)
    }
}
