use super::data::{Definition, Element, Rule, RuleGraph};
use super::errors::CompileError;
use super::lookahead::Lookahead;
use super::terminals::{TokenId, TokenSet};
use log::debug;
use std::collections::{HashMap, HashSet};

/// A rule graph which passed validation, ready for code generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedGrammar {
    name: String,
    graph: RuleGraph,
    tokens: TokenSet,
    lookahead: Lookahead,
    entry: usize,
}

impl ValidatedGrammar {
    /// Get the grammar's target name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn graph(&self) -> &RuleGraph {
        &self.graph
    }

    pub fn tokens(&self) -> &TokenSet {
        &self.tokens
    }

    pub fn lookahead(&self) -> &Lookahead {
        &self.lookahead
    }

    /// Get the rule parsing starts from
    pub fn entry_rule(&self) -> &Rule {
        &self.graph.rules()[self.entry]
    }

    /// Get the position of the entry rule in the rule graph
    pub fn entry_index(&self) -> usize {
        self.entry
    }

    /// Serialize the rules and tokens, e.g. to render them as a diagram
    pub fn serialized_productions(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "entry": self.entry_rule().name(),
            "rules": self.graph,
            "tokens": self.tokens,
        })
    }
}

/// Validate a rule graph and assign its occurrence indexes
///
/// Checks are performed in order: duplicate rules, undefined references, minted literals,
/// lookahead, entry rule.
pub fn validate(
    name: &str,
    mut graph: RuleGraph,
    tokens: TokenSet,
    entry_rule: Option<&str>,
) -> Result<ValidatedGrammar, CompileError> {
    check_duplicates(&graph)?;
    check_references(&graph)?;
    tokens.check_minted_literals()?;

    for rule in graph.rules_mut() {
        let mut counters = HashMap::new();
        index_occurrences(rule.definition_mut(), &mut counters);
    }

    let lookahead = Lookahead::compute(&graph);
    lookahead.check(&graph, &tokens)?;

    let entry = match entry_rule {
        Some(entry_rule) => graph
            .position(entry_rule)
            .ok_or_else(|| CompileError::UnknownEntryRule(entry_rule.to_string()))?,
        None => infer_entry_rule(&graph),
    };

    debug!(
        "Validated grammar [{}] with entry rule [{}]",
        name,
        graph.rules()[entry].name()
    );

    Ok(ValidatedGrammar {
        name: name.to_string(),
        graph,
        tokens,
        lookahead,
        entry,
    })
}

fn check_duplicates(graph: &RuleGraph) -> Result<(), CompileError> {
    let mut seen: HashMap<&str, &Rule> = HashMap::new();

    for rule in graph.rules() {
        if let Some(first) = seen.insert(rule.name(), rule) {
            return Err(CompileError::DuplicateRule {
                name: rule.name().to_string(),
                first: first.location(),
                duplicate: rule.location(),
            });
        }
    }

    Ok(())
}

fn check_references(graph: &RuleGraph) -> Result<(), CompileError> {
    for rule in graph.rules() {
        check_definition_references(graph, rule, rule.definition())?;
    }

    Ok(())
}

fn check_definition_references(
    graph: &RuleGraph,
    rule: &Rule,
    def: &Definition,
) -> Result<(), CompileError> {
    for el in def.alternatives().iter().flat_map(|seq| seq.elements()) {
        match el {
            Element::Reference { name, location, .. } => {
                if graph.get(name).is_none() {
                    return Err(CompileError::UndefinedRule {
                        name: name.clone(),
                        referenced_by: rule.name().to_string(),
                        location: *location,
                    });
                }
            }
            Element::Terminal { .. } => {}
            Element::Optional { definition, .. }
            | Element::Repeated { definition, .. }
            | Element::Group { definition, .. } => {
                check_definition_references(graph, rule, definition)?
            }
        }
    }

    Ok(())
}

/// Construct kinds whose occurrences are counted separately
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum OccurrenceKey {
    Token(TokenId),
    Rule(String),
    Optional,
    Repeated,
    Group,
}

/// Number each construct among the ones of the same kind in a rule (pre-order, starting at 1)
fn index_occurrences(def: &mut Definition, counters: &mut HashMap<OccurrenceKey, usize>) {
    for seq in def.alternatives_mut() {
        for el in seq.elements_mut() {
            match el {
                Element::Terminal {
                    token, occurrence, ..
                } => *occurrence = next_occurrence(counters, OccurrenceKey::Token(*token)),

                Element::Reference {
                    name, occurrence, ..
                } => *occurrence = next_occurrence(counters, OccurrenceKey::Rule(name.clone())),

                Element::Optional {
                    definition,
                    occurrence,
                } => {
                    *occurrence = next_occurrence(counters, OccurrenceKey::Optional);
                    index_occurrences(definition, counters);
                }

                Element::Repeated {
                    definition,
                    occurrence,
                } => {
                    *occurrence = next_occurrence(counters, OccurrenceKey::Repeated);
                    index_occurrences(definition, counters);
                }

                Element::Group {
                    definition,
                    occurrence,
                } => {
                    *occurrence = next_occurrence(counters, OccurrenceKey::Group);
                    index_occurrences(definition, counters);
                }
            }
        }
    }
}

fn next_occurrence(counters: &mut HashMap<OccurrenceKey, usize>, key: OccurrenceKey) -> usize {
    let counter = counters.entry(key).or_insert(0);
    *counter += 1;
    *counter
}

/// Get the first rule no other rule references, or the first rule if they all are
fn infer_entry_rule(graph: &RuleGraph) -> usize {
    let mut referenced = HashSet::new();

    for rule in graph.rules() {
        collect_references(rule.definition(), &mut |name| {
            if name != rule.name() {
                referenced.insert(name.to_string());
            }
        });
    }

    graph
        .rules()
        .iter()
        .position(|rule| !referenced.contains(rule.name()))
        .unwrap_or(0)
}

fn collect_references(def: &Definition, on_ref: &mut impl FnMut(&str)) {
    for el in def.alternatives().iter().flat_map(|seq| seq.elements()) {
        match el {
            Element::Reference { name, .. } => on_ref(name),
            Element::Terminal { .. } => {}
            Element::Optional { definition, .. }
            | Element::Repeated { definition, .. }
            | Element::Group { definition, .. } => collect_references(definition, on_ref),
        }
    }
}
