use crate::compiler::{Definition, Element, Sequence, TokenId, ValidatedGrammar};
use crate::runtime::{Alternative, LexerError, Parser, Production, Program, RuleProgram};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Build a runnable parser from a validated grammar
pub fn instantiate(grammar: &ValidatedGrammar) -> Result<Parser, LexerError> {
    let lexer = grammar.tokens().to_lexer()?;

    Ok(Parser::new(
        grammar.name(),
        lexer,
        lower(grammar),
        grammar.entry_index(),
    ))
}

/// Translate a grammar's rules to parsing primitives
///
/// Choices of the rules' top level and of optional or repeated bodies get occurrence 0,
/// while parenthesized choices keep the occurrence of their group.
pub fn lower(grammar: &ValidatedGrammar) -> Program {
    let lowering = Lowering {
        grammar,
        token_names: grammar
            .tokens()
            .iter()
            .map(|(_, token)| Arc::from(token.name()))
            .collect(),
        rule_indexes: grammar
            .graph()
            .rules()
            .iter()
            .enumerate()
            .map(|(i, rule)| (rule.name(), i))
            .collect(),
    };

    Program::new(
        grammar
            .graph()
            .rules()
            .iter()
            .map(|rule| RuleProgram::new(rule.name(), lowering.definition(rule.definition(), 0)))
            .collect(),
    )
}

struct Lowering<'g> {
    grammar: &'g ValidatedGrammar,
    token_names: Vec<Arc<str>>,
    rule_indexes: HashMap<&'g str, usize>,
}

impl<'g> Lowering<'g> {
    fn definition(&self, def: &Definition, occurrence: usize) -> Vec<Production> {
        match def.alternatives() {
            [single] => self.sequence(single),
            alternatives => {
                let lookahead = self.grammar.lookahead();

                vec![Production::Or {
                    alternatives: alternatives
                        .iter()
                        .map(|seq| Alternative {
                            lookahead: self.names(lookahead.sequence_first(seq)),
                            nullable: lookahead.sequence_nullable(seq),
                            body: self.sequence(seq),
                        })
                        .collect(),
                    expected: self.names(lookahead.definition_first(def)),
                    occurrence,
                }]
            }
        }
    }

    fn sequence(&self, seq: &Sequence) -> Vec<Production> {
        seq.elements()
            .iter()
            .flat_map(|el| self.element(el))
            .collect()
    }

    fn element(&self, el: &Element) -> Vec<Production> {
        let lookahead = self.grammar.lookahead();

        match el {
            Element::Terminal {
                token, occurrence, ..
            } => vec![Production::Consume {
                token: Arc::clone(&self.token_names[token.index()]),
                occurrence: *occurrence,
            }],

            // References were resolved by the validator
            Element::Reference {
                name, occurrence, ..
            } => vec![Production::Subrule {
                rule: self.rule_indexes[name.as_str()],
                occurrence: *occurrence,
            }],

            Element::Optional {
                definition,
                occurrence,
            } => vec![Production::Option {
                lookahead: self.names(lookahead.definition_first(definition)),
                body: self.definition(definition, 0),
                occurrence: *occurrence,
            }],

            Element::Repeated {
                definition,
                occurrence,
            } => vec![Production::Many {
                lookahead: self.names(lookahead.definition_first(definition)),
                body: self.definition(definition, 0),
                occurrence: *occurrence,
            }],

            // Single-alternative groups are inlined
            Element::Group {
                definition,
                occurrence,
            } => self.definition(definition, *occurrence),
        }
    }

    fn names(&self, set: BTreeSet<TokenId>) -> Vec<Arc<str>> {
        set.into_iter()
            .map(|id| Arc::clone(&self.token_names[id.index()]))
            .collect()
    }
}
