use super::data::{Definition, Element, RuleGraph, Sequence};
use super::errors::{Ambiguity, CompileError};
use super::terminals::{TokenId, TokenSet};
use std::collections::{BTreeSet, HashMap};

/// FIRST, FOLLOW sets and nullability of a grammar's rules
///
/// References to unknown rules are treated as matching nothing. The end of input is not part of
/// the FOLLOW sets, as parsing may start from any rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookahead {
    index: HashMap<String, usize>,
    nullable: Vec<bool>,
    first: Vec<BTreeSet<TokenId>>,
    follow: Vec<BTreeSet<TokenId>>,
}

impl Lookahead {
    /// Compute the sets of a rule graph (fixpoint iterations)
    pub fn compute(graph: &RuleGraph) -> Self {
        let mut lookahead = Self {
            index: graph
                .rules()
                .iter()
                .enumerate()
                .map(|(i, rule)| (rule.name().to_string(), i))
                .collect(),
            nullable: vec![false; graph.len()],
            first: vec![BTreeSet::new(); graph.len()],
            follow: vec![BTreeSet::new(); graph.len()],
        };

        loop {
            let mut changed = false;

            for (i, rule) in graph.rules().iter().enumerate() {
                let nullable = lookahead.definition_nullable(rule.definition());
                let first = lookahead.definition_first(rule.definition());

                if nullable != lookahead.nullable[i] || first != lookahead.first[i] {
                    lookahead.nullable[i] = nullable;
                    lookahead.first[i] = first;
                    changed = true;
                }
            }

            if !changed {
                break;
            }
        }

        // FOLLOW sets only grow, and depend on the final FIRST sets
        loop {
            let mut follow = lookahead.follow.clone();

            for (i, rule) in graph.rules().iter().enumerate() {
                lookahead.collect_follow(rule.definition(), &lookahead.follow[i], &mut follow);
            }

            if follow == lookahead.follow {
                break lookahead;
            }

            lookahead.follow = follow;
        }
    }

    pub fn rule_nullable(&self, name: &str) -> bool {
        self.index.get(name).map_or(false, |i| self.nullable[*i])
    }

    pub fn rule_first(&self, name: &str) -> BTreeSet<TokenId> {
        self.index
            .get(name)
            .map(|i| self.first[*i].clone())
            .unwrap_or_default()
    }

    /// Tokens which can come right after a rule
    pub fn rule_follow(&self, name: &str) -> BTreeSet<TokenId> {
        self.index
            .get(name)
            .map(|i| self.follow[*i].clone())
            .unwrap_or_default()
    }

    pub fn definition_nullable(&self, def: &Definition) -> bool {
        def.alternatives()
            .iter()
            .any(|seq| self.sequence_nullable(seq))
    }

    pub fn definition_first(&self, def: &Definition) -> BTreeSet<TokenId> {
        def.alternatives()
            .iter()
            .flat_map(|seq| self.sequence_first(seq))
            .collect()
    }

    pub fn sequence_nullable(&self, seq: &Sequence) -> bool {
        seq.elements().iter().all(|el| self.element_nullable(el))
    }

    pub fn sequence_first(&self, seq: &Sequence) -> BTreeSet<TokenId> {
        self.elements_first(seq.elements())
    }

    pub fn element_nullable(&self, el: &Element) -> bool {
        match el {
            Element::Optional { .. } | Element::Repeated { .. } => true,
            Element::Group { definition, .. } => self.definition_nullable(definition),
            Element::Terminal { .. } => false,
            Element::Reference { name, .. } => self.rule_nullable(name),
        }
    }

    pub fn element_first(&self, el: &Element) -> BTreeSet<TokenId> {
        match el {
            Element::Optional { definition, .. }
            | Element::Repeated { definition, .. }
            | Element::Group { definition, .. } => self.definition_first(definition),
            Element::Terminal { token, .. } => BTreeSet::from([*token]),
            Element::Reference { name, .. } => self.rule_first(name),
        }
    }

    fn elements_first(&self, elements: &[Element]) -> BTreeSet<TokenId> {
        let mut first = BTreeSet::new();

        for el in elements {
            first.extend(self.element_first(el));

            if !self.element_nullable(el) {
                break;
            }
        }

        first
    }

    /// Tokens which can come after a sequence's prefix, given the ones following the sequence
    fn follow_of_rest(&self, rest: &[Element], after: &BTreeSet<TokenId>) -> BTreeSet<TokenId> {
        let mut follow = self.elements_first(rest);

        if rest.iter().all(|el| self.element_nullable(el)) {
            follow.extend(after.iter().copied());
        }

        follow
    }

    /// Add to the FOLLOW sets of the rules a definition references
    fn collect_follow(
        &self,
        def: &Definition,
        after: &BTreeSet<TokenId>,
        out: &mut [BTreeSet<TokenId>],
    ) {
        for seq in def.alternatives() {
            let elements = seq.elements();

            for (i, el) in elements.iter().enumerate() {
                let follow = self.follow_of_rest(&elements[i + 1..], after);

                match el {
                    Element::Reference { name, .. } => {
                        if let Some(j) = self.index.get(name.as_str()) {
                            out[*j].extend(follow);
                        }
                    }
                    Element::Terminal { .. } => {}
                    Element::Optional { definition, .. } | Element::Group { definition, .. } => {
                        self.collect_follow(definition, &follow, out)
                    }
                    Element::Repeated { definition, .. } => {
                        let mut again = follow;
                        again.extend(self.definition_first(definition));
                        self.collect_follow(definition, &again, out)
                    }
                }
            }
        }
    }

    /// Ensure a grammar can be parsed with one token of lookahead
    ///
    /// Optional parts, repetitions and empty alternatives are entered whenever the next token
    /// allows it, so what follows them must not be able to start them.
    pub fn check(&self, graph: &RuleGraph, tokens: &TokenSet) -> Result<(), CompileError> {
        for rule in graph.rules() {
            if let Some(path) = self.find_left_recursion(graph, rule.name()) {
                return Err(CompileError::AmbiguousGrammar {
                    rule: rule.name().to_string(),
                    reason: Ambiguity::LeftRecursion { path },
                });
            }
        }

        for (i, rule) in graph.rules().iter().enumerate() {
            self.check_definition(rule.definition(), &self.follow[i], tokens)
                .map_err(|reason| CompileError::AmbiguousGrammar {
                    rule: rule.name().to_string(),
                    reason,
                })?;
        }

        Ok(())
    }

    fn check_definition(
        &self,
        def: &Definition,
        follow: &BTreeSet<TokenId>,
        tokens: &TokenSet,
    ) -> Result<(), Ambiguity> {
        let alts = def.alternatives();

        for (i, a) in alts.iter().enumerate() {
            let a_first = self.sequence_first(a);

            for (j, b) in alts.iter().enumerate().skip(i + 1) {
                let common = token_names(tokens, a_first.intersection(&self.sequence_first(b)));

                if !common.is_empty() {
                    return Err(Ambiguity::ConflictingAlternatives {
                        first: i,
                        second: j,
                        tokens: common,
                    });
                }
            }
        }

        let mut nullable = alts
            .iter()
            .enumerate()
            .filter(|(_, seq)| self.sequence_nullable(seq))
            .map(|(i, _)| i);

        if let Some(empty) = nullable.next() {
            if nullable.next().is_some() {
                return Err(Ambiguity::MultipleEmptyAlternatives);
            }

            for (other, seq) in alts.iter().enumerate().filter(|(i, _)| *i != empty) {
                let common = token_names(tokens, self.sequence_first(seq).intersection(follow));

                if !common.is_empty() {
                    return Err(Ambiguity::EmptyAlternativeFollowConflict {
                        empty,
                        other,
                        tokens: common,
                    });
                }
            }
        }

        for seq in alts {
            let elements = seq.elements();

            for (i, el) in elements.iter().enumerate() {
                let el_follow = self.follow_of_rest(&elements[i + 1..], follow);

                match el {
                    Element::Repeated { definition, .. } => {
                        if self.definition_nullable(definition) {
                            return Err(Ambiguity::EmptyRepetition);
                        }

                        let first = self.definition_first(definition);
                        let common = token_names(tokens, first.intersection(&el_follow));

                        if !common.is_empty() {
                            return Err(Ambiguity::RepetitionFollowConflict { tokens: common });
                        }

                        let mut again = el_follow;
                        again.extend(first);
                        self.check_definition(definition, &again, tokens)?;
                    }

                    Element::Optional { definition, .. } => {
                        let first = self.definition_first(definition);
                        let common = token_names(tokens, first.intersection(&el_follow));

                        if !common.is_empty() {
                            return Err(Ambiguity::OptionalFollowConflict { tokens: common });
                        }

                        self.check_definition(definition, &el_follow, tokens)?;
                    }

                    Element::Group { definition, .. } => {
                        self.check_definition(definition, &el_follow, tokens)?;
                    }

                    Element::Terminal { .. } | Element::Reference { .. } => {}
                }
            }
        }

        Ok(())
    }

    /// Find a path through which a rule invokes itself before consuming any token
    fn find_left_recursion(&self, graph: &RuleGraph, rule_name: &str) -> Option<Vec<String>> {
        let mut path = vec![rule_name];
        let mut visited = vec![false; graph.len()];

        if self.find_in_rule(graph, rule_name, &mut path, &mut visited) {
            Some(path.into_iter().map(str::to_string).collect())
        } else {
            None
        }
    }

    fn find_in_rule<'a>(
        &self,
        graph: &'a RuleGraph,
        target: &str,
        path: &mut Vec<&'a str>,
        visited: &mut [bool],
    ) -> bool {
        let current = match path.last().and_then(|name| graph.get(name)) {
            Some(rule) => rule,
            None => return false,
        };

        let mut leading = vec![];
        self.leading_references(current.definition(), &mut leading);

        for name in leading {
            if name == target {
                path.push(name);
                return true;
            }

            let i = match self.index.get(name) {
                Some(i) => *i,
                None => continue,
            };

            if visited[i] {
                continue;
            }

            visited[i] = true;
            path.push(name);

            if self.find_in_rule(graph, target, path, visited) {
                return true;
            }

            path.pop();
        }

        false
    }

    /// List the rules a definition can invoke before consuming any token
    fn leading_references<'a>(&self, def: &'a Definition, out: &mut Vec<&'a str>) {
        for seq in def.alternatives() {
            for el in seq.elements() {
                match el {
                    Element::Reference { name, .. } => out.push(name),
                    Element::Terminal { .. } => {}
                    Element::Optional { definition, .. }
                    | Element::Repeated { definition, .. }
                    | Element::Group { definition, .. } => {
                        self.leading_references(definition, out)
                    }
                }

                if !self.element_nullable(el) {
                    break;
                }
            }
        }
    }
}

fn token_names<'a>(tokens: &TokenSet, ids: impl Iterator<Item = &'a TokenId>) -> Vec<String> {
    ids.map(|id| tokens.get(*id).name().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::builder::build_rule_graph;
    use crate::compiler::parser::parse_ebnf;
    use crate::compiler::vocabulary::VOCABULARY;

    fn analyze(input: &str) -> (Lookahead, RuleGraph, TokenSet) {
        let grammar = parse_ebnf(&VOCABULARY.tokenize(input).unwrap()).unwrap();
        let (graph, tokens) = build_rule_graph(&grammar, None).unwrap();
        (Lookahead::compute(&graph), graph, tokens)
    }

    fn names(tokens: &TokenSet, set: BTreeSet<TokenId>) -> Vec<&str> {
        set.into_iter().map(|id| tokens.get(id).name()).collect()
    }

    #[test]
    fn first_sets_go_through_nullable_prefixes() {
        let (la, _, tokens) = analyze("A = [B], C; B = 'b'; C = {'c'}, 'd';");

        assert_eq!(names(&tokens, la.rule_first("A")), ["Str_b", "Str_c", "Str_d"]);
        assert!(!la.rule_nullable("A"));
        assert!(!la.rule_nullable("C"));
    }

    #[test]
    fn nullability_propagates_through_references() {
        let (la, _, _) = analyze("A = B, C; B = ['b']; C = {'c'};");
        assert!(la.rule_nullable("A"));
    }

    #[test]
    fn finds_indirect_left_recursion() {
        let (la, graph, tokens) = analyze("A = [x], B, 'a'; B = A | 'b'; x = 'x';");

        match la.check(&graph, &tokens) {
            Err(CompileError::AmbiguousGrammar {
                rule,
                reason: Ambiguity::LeftRecursion { path },
            }) => {
                assert_eq!(rule, "A");
                assert_eq!(path, ["A", "B", "A"]);
            }
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn follow_sets_go_through_callers_and_repetitions() {
        let (la, _, tokens) = analyze("A = { B }, 'a'; B = 'b', [C]; C = 'c';");

        assert_eq!(names(&tokens, la.rule_follow("B")), ["Str_a", "Str_b"]);
        assert_eq!(names(&tokens, la.rule_follow("C")), ["Str_a", "Str_b"]);
        assert!(la.rule_follow("A").is_empty());
    }

    #[test]
    fn optional_parts_must_not_start_with_what_follows_them() {
        let (la, graph, tokens) = analyze("A = B, 'x'; B = 'b', ['x'];");

        match la.check(&graph, &tokens) {
            Err(CompileError::AmbiguousGrammar {
                rule,
                reason: Ambiguity::OptionalFollowConflict { tokens },
            }) => {
                assert_eq!(rule, "B");
                assert_eq!(tokens, ["Str_x"]);
            }
            other => panic!("Unexpected result: {:?}", other),
        }

        let (la, graph, tokens) = analyze("A = B, 'y'; B = 'b', ['x'];");
        assert!(la.check(&graph, &tokens).is_ok());
    }

    #[test]
    fn accepts_right_recursion() {
        let (la, graph, tokens) = analyze("List = 'x', [',', List];");
        assert!(la.check(&graph, &tokens).is_ok());
    }
}
