use super::cst::*;
use super::data::{Definition, Element, Rule, RuleGraph, Sequence, TokenMap};
use super::errors::CompileError;
use super::terminals::{TerminalMatcher, TokenSet};
use log::debug;

/// Build the rule graph of a parsed grammar, resolving its literals to tokens
///
/// Commas bind less tightly than pipes: `a | b, c` is the sequence of the choice `a | b`, then `c`.
pub fn build_rule_graph(
    grammar: &GrammarNode,
    token_map: Option<&TokenMap>,
) -> Result<(RuleGraph, TokenSet), CompileError> {
    let mut builder = Builder {
        matcher: TerminalMatcher::new(token_map)?,
    };

    let rules = grammar
        .rules
        .iter()
        .map(|rule| {
            Rule::new(
                &rule.name.name(),
                builder.rhs(&rule.rhs),
                rule.name.location(),
            )
        })
        .collect();

    let graph = RuleGraph::new(rules);
    let tokens = builder.matcher.finish();

    debug!(
        "Built rule graph with {} rule(s) and {} token(s)",
        graph.len(),
        tokens.len()
    );

    Ok((graph, tokens))
}

struct Builder {
    matcher: TerminalMatcher,
}

impl Builder {
    fn rhs(&mut self, rhs: &RhsNode) -> Definition {
        match rhs.sequences.as_slice() {
            // A single slot: each pipe-separated term is an alternative
            [single] => self.choice(single),

            // Several slots: one sequence, with a nested choice for each slot holding a pipe
            slots => {
                let elements = slots
                    .iter()
                    .map(|slot| match slot.terms.as_slice() {
                        [term] => self.term(term),
                        _ => Element::Group {
                            definition: self.choice(slot),
                            occurrence: 0,
                        },
                    })
                    .collect();

                Definition::new(vec![Sequence::new(elements)])
            }
        }
    }

    fn choice(&mut self, slot: &SequenceNode) -> Definition {
        Definition::new(
            slot.terms
                .iter()
                .map(|term| Sequence::new(vec![self.term(term)]))
                .collect(),
        )
    }

    fn term(&mut self, term: &TermNode) -> Element {
        match term {
            TermNode::Optional(node) => Element::Optional {
                definition: self.rhs(&node.rhs),
                occurrence: 0,
            },

            TermNode::Repeated(node) => Element::Repeated {
                definition: self.rhs(&node.rhs),
                occurrence: 0,
            },

            TermNode::Group(node) => Element::Group {
                definition: self.rhs(&node.rhs),
                occurrence: 0,
            },

            TermNode::Terminal(node) => {
                let literal = node.value();

                Element::Terminal {
                    token: self.matcher.resolve(&literal),
                    literal,
                    occurrence: 0,
                }
            }

            TermNode::Identifier(node) => Element::Reference {
                name: node.name(),
                occurrence: 0,
                location: node.location(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::parser::parse_ebnf;
    use crate::compiler::vocabulary::VOCABULARY;

    fn build(input: &str) -> (RuleGraph, TokenSet) {
        let grammar = parse_ebnf(&VOCABULARY.tokenize(input).unwrap()).unwrap();
        build_rule_graph(&grammar, None).unwrap()
    }

    fn shape(def: &Definition) -> String {
        def.alternatives()
            .iter()
            .map(|seq| {
                seq.elements()
                    .iter()
                    .map(|el| match el {
                        Element::Optional { definition, .. } => format!("[{}]", shape(definition)),
                        Element::Repeated { definition, .. } => format!("{{{}}}", shape(definition)),
                        Element::Group { definition, .. } => format!("({})", shape(definition)),
                        Element::Terminal { literal, .. } => format!("'{}'", literal),
                        Element::Reference { name, .. } => name.clone(),
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }

    #[test]
    fn pipe_binds_tighter_than_comma() {
        let (graph, _) = build("A = a | b, c; B = a, c | b, c;");

        assert_eq!(shape(graph.rules()[0].definition()), "(a | b) c");
        assert_eq!(shape(graph.rules()[1].definition()), "a (c | b) c");
    }

    #[test]
    fn brackets_wrap_their_definition() {
        let (graph, _) = build("A = ['x', y], {z | 'w'}, (q);");

        assert_eq!(shape(graph.rules()[0].definition()), "['x' y] {z | 'w'} (q)");
    }

    #[test]
    fn single_slot_alternatives() {
        let (graph, tokens) = build("Digit = \"0\" | \"1\" | \"0\";");

        assert_eq!(shape(graph.rules()[0].definition()), "'0' | '1' | '0'");
        assert_eq!(tokens.len(), 2);
    }
}
