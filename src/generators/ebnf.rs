use crate::compiler::{Definition, Element, RuleGraph, Sequence};

/// Generate an EBNF grammar from a rule graph
///
/// Useful to get back to the source code after building.
///
/// Groups are always parenthesized, so the output compiles back to the same rule graph.
/// Whitespace and line breaks of the original grammar aren't restored.
pub fn gen_ebnf(graph: &RuleGraph) -> String {
    graph
        .rules()
        .iter()
        .map(|rule| format!("{} = {};", rule.name(), gen_ebnf_definition(rule.definition())))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Generate the EBNF code for a single [`Definition`]
pub fn gen_ebnf_definition(def: &Definition) -> String {
    def.alternatives()
        .iter()
        .map(gen_ebnf_sequence)
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Generate the EBNF code for a single [`Sequence`]
pub fn gen_ebnf_sequence(seq: &Sequence) -> String {
    seq.elements()
        .iter()
        .map(gen_ebnf_element)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Generate the EBNF code for a single [`Element`]
pub fn gen_ebnf_element(el: &Element) -> String {
    match el {
        Element::Optional { definition, .. } => format!("[ {} ]", gen_ebnf_definition(definition)),
        Element::Repeated { definition, .. } => format!("{{ {} }}", gen_ebnf_definition(definition)),
        Element::Group { definition, .. } => format!("( {} )", gen_ebnf_definition(definition)),
        Element::Terminal { literal, .. } => {
            if literal.contains('"') {
                format!("'{}'", literal)
            } else {
                format!("\"{}\"", literal)
            }
        }
        Element::Reference { name, .. } => name.clone(),
    }
}
