use ebnfgen::compiler::{compile, CompileOptions, EbnfCompiler, OutputMode, TokenMap};
use ebnfgen::generators::{gen_rust_str, gen_rust_token_stream};

fn source(grammar: &str, options: CompileOptions) -> String {
    compile(grammar, &options.with_mode(OutputMode::Source))
        .unwrap()
        .into_source()
        .expect("source mode produces source code")
}

#[test]
fn emits_a_complete_module() {
    let code = source(
        r#"Digit = "0" | "1"; Number = Digit, { Digit }, [ "." , Digit ];"#,
        CompileOptions::new("Digits"),
    );

    assert!(code.starts_with("// @generated by ebnfgen from grammar [Digits]"));
    assert!(code.contains(r#"pub const GRAMMAR_NAME: &str = "Digits";"#));
    assert!(code.contains(r#"pub const ENTRY_RULE: &str = "Number";"#));
    assert!(code.contains(r#"("Str_Dot", "\\.", false)"#));
    assert!(code.contains("pub fn parse("));
    assert!(code.contains("pub fn parse_rule("));
    assert!(code.contains("pub fn Number("));
    assert!(code.contains("fn __Number_many1("));
    assert!(code.contains("fn __Number_option1("));

    syn::parse_file(&code).unwrap();
}

#[test]
fn parenthesized_choices_get_a_helper() {
    let code = source(
        r#"Op = ( "+" | "-" ), "1", ( "*" | "/" );"#,
        CompileOptions::new("Ops"),
    );

    assert!(code.contains("fn __Op_or1("));
    assert!(code.contains("fn __Op_or2("));
    assert!(code.contains("no_viable_alternative("));
}

#[test]
fn escapes_keyword_rule_names() {
    let code = source(
        r#"Main = type, self, self_; type = "t"; self = "s"; self_ = "u";"#,
        CompileOptions::new("Keywords"),
    );

    assert!(code.contains("pub fn r#type("));
    assert!(code.contains("pub fn __self("));
    assert!(code.contains("pub fn self_("));
    assert!(code.contains("__children.push(self::__self(__rec)?);"));

    // Parse trees keep the grammar's names
    assert!(code.contains(r#"ParseTree::node("self", __nodes)"#));

    syn::parse_file(&code).unwrap();
}

#[test]
fn lexer_table_follows_token_map_then_longest_literals() {
    let tokens = TokenMap::new().with_skipped("Space", " +");

    let grammar = EbnfCompiler::new(r#"Cmp = "<" | "<=" | "=";"#)
        .unwrap()
        .analyze(&CompileOptions::new("Cmp").with_token_map(tokens))
        .unwrap();

    let code = gen_rust_token_stream(&grammar).to_string();

    let space = code.find("\"Space\"").unwrap();
    let less_eq = code.find("\"Str_LessEquals\"").unwrap();
    let less = code.find("\"Str_Less\"").unwrap();

    assert!(space < less_eq);
    assert!(less_eq < less);

    assert_eq!(gen_rust_str(&grammar), gen_rust_str(&grammar));
}
