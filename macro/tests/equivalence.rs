use ebnfgen::compiler::{compile, CompileOptions, TokenMap};
use ebnfgen::runtime::{ParseTree, Parser, RuntimeError};
use ebnfgen_macro::ebnf_grammar;
use rstest::rstest;

#[ebnf_grammar(filename = "tests/grammars/math.ebnf")]
mod math {}

#[ebnf_grammar(filename = "tests/grammars/calc.ebnf", name = "Calc", tokens = "tests/grammars/calc.json")]
pub mod calc {}

fn instantiated_math() -> Parser {
    compile(
        include_str!("grammars/math.ebnf"),
        &CompileOptions::new("math"),
    )
    .unwrap()
    .into_parser()
    .unwrap()
}

fn instantiated_calc() -> Parser {
    let tokens = TokenMap::from_json(include_str!("grammars/calc.json")).unwrap();

    compile(
        include_str!("grammars/calc.ebnf"),
        &CompileOptions::new("Calc").with_token_map(tokens),
    )
    .unwrap()
    .into_parser()
    .unwrap()
}

/// Both parsers must take the same decision, and build the same tree when accepting
fn assert_same_outcome(
    generated: Result<ParseTree, RuntimeError>,
    instantiated: Result<ParseTree, RuntimeError>,
) {
    match (generated, instantiated) {
        (Ok(a), Ok(b)) => assert_eq!(a.to_sexpr(), b.to_sexpr()),
        (Err(a), Err(b)) => assert_eq!(a.to_string(), b.to_string()),
        (a, b) => panic!("Parsers disagree: {:?} / {:?}", a, b),
    }
}

#[test]
fn generated_constants() {
    assert_eq!(math::GRAMMAR_NAME, "math");
    assert_eq!(math::ENTRY_RULE, "Expression");
    assert_eq!(calc::GRAMMAR_NAME, "Calc");
    assert_eq!(calc::ENTRY_RULE, "Statement");
}

#[rstest]
#[case::operations("1 + 2 * 3 - 4 / 5 + 6 / 7 - 8 * 9")]
#[case::nested("(1 + (23)) * 4")]
#[case::tight("12*(3-4)")]
#[case::single_digit("7")]
#[case::dangling_operator("1 +")]
#[case::missing_operator("1 2")]
#[case::unclosed("(1 + 2")]
#[case::unknown_character("1a")]
#[case::empty("")]
fn math_parsers_agree(#[case] input: &str) {
    assert_same_outcome(math::parse(input), instantiated_math().parse(input));
}

#[rstest]
#[case::assignment("let x = 1 + y * 3")]
#[case::print("print (x - 2) / z")]
#[case::missing_value("let x =")]
#[case::no_keyword("x = 1")]
#[case::trailing("print 1 2")]
fn calc_parsers_agree(#[case] input: &str) {
    assert_same_outcome(calc::parse(input), instantiated_calc().parse(input));
}

#[test]
fn parse_from_any_rule() {
    let tree = math::parse_rule("Integer", "42").unwrap();
    assert_eq!(tree.to_sexpr(), r#"(Integer (Digit "4") (Digit "2"))"#);

    assert!(matches!(
        math::parse_rule("Nope", "1"),
        Err(RuntimeError::UnknownRule(_))
    ));

    let tokens = calc::tokenize("print 1").unwrap();
    let tree = calc::rules::Print(&mut ebnfgen::runtime::Recognizer::new(&tokens)).unwrap();
    assert_eq!(tree.to_sexpr(), r#"(Print "print" (Sum (Product (Atom (Number "1")))))"#);
}

#[test]
fn accepted_trees() {
    let tree = math::parse("(1+2)").unwrap();

    assert_eq!(
        tree.to_sexpr(),
        r#"(Expression (Operand (SubExpression "(" (Expression (Operand (Integer (Digit "1"))) (Operator "+") (Operand (Integer (Digit "2")))) ")")))"#
    );
}
