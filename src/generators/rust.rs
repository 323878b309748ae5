use super::instantiate::lower;
use crate::compiler::ValidatedGrammar;
use crate::runtime::{Alternative, Production, Program};
use log::warn;
use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use std::sync::Arc;

/// Generate the Rust source code of a parser, pretty-printed
pub fn gen_rust_str(grammar: &ValidatedGrammar) -> String {
    let tokens = gen_rust_token_stream(grammar);

    let body = match syn::parse2::<syn::File>(tokens.clone()) {
        Ok(file) => prettyplease::unparse(&file),
        Err(err) => {
            warn!("Failed to pretty-print the generated parser: {}", err);
            tokens.to_string()
        }
    };

    format!(
        "// @generated by ebnfgen from grammar [{}]\n\n{}",
        grammar.name(),
        body
    )
}

/// Generate the Rust code of a parser
///
/// The code only depends on [`crate::runtime`], and takes the same decisions as the
/// [instantiated](super::instantiate()) parser.
pub fn gen_rust_token_stream(grammar: &ValidatedGrammar) -> TokenStream {
    let program = lower(grammar);

    let name = grammar.name();
    let entry_name = grammar.entry_rule().name();
    let entry = make_safe_ident(entry_name);

    let token_table = grammar.tokens().lexer_order().into_iter().map(|id| {
        let token = grammar.tokens().get(id);
        let (name, pattern, skipped) = (token.name(), token.pattern(), token.is_skipped());
        quote! { (#name, #pattern, #skipped) }
    });

    let mut functions = vec![];

    for rule in program.rules() {
        let rule_gen = RuleGen {
            program: &program,
            rule: rule.name(),
        };

        let ident = make_safe_ident(rule.name());
        let rule_name = rule.name();
        let body = rule_gen.body(rule.body(), &mut functions);

        functions.push(quote! {
            pub fn #ident(
                __rec: &mut ::ebnfgen::runtime::Recognizer,
            ) -> ::core::result::Result<::ebnfgen::runtime::ParseTree, ::ebnfgen::runtime::SyntaxError> {
                let mut __nodes = ::std::vec::Vec::new();
                {
                    let __children = &mut __nodes;
                    #body
                }
                ::core::result::Result::Ok(::ebnfgen::runtime::ParseTree::node(#rule_name, __nodes))
            }
        });
    }

    let rule_arms = program.rules().iter().map(|rule| {
        let rule_name = rule.name();
        let ident = make_safe_ident(rule_name);
        quote! { #rule_name => self::rules::#ident(&mut __rec)?, }
    });

    quote! {
        /// Name of the grammar this parser was generated from
        pub const GRAMMAR_NAME: &str = #name;

        /// Rule [`parse`] starts from
        pub const ENTRY_RULE: &str = #entry_name;

        /// Tokens as `(name, pattern, skipped)`, in matching order
        pub const TOKENS: &[(&str, &str, bool)] = &[#(#token_table),*];

        /// Build the lexer of this grammar
        pub fn lexer() -> ::core::result::Result<::ebnfgen::runtime::Lexer, ::ebnfgen::runtime::LexerError> {
            ::ebnfgen::runtime::Lexer::from_table(TOKENS)
        }

        /// Split an input into tokens
        pub fn tokenize(
            input: &str,
        ) -> ::core::result::Result<::std::vec::Vec<::ebnfgen::runtime::Token>, ::ebnfgen::runtime::RuntimeError> {
            ::core::result::Result::Ok(self::lexer()?.tokenize(input)?)
        }

        /// Parse a token stream from the entry rule
        pub fn parse_tokens(
            tokens: &[::ebnfgen::runtime::Token],
        ) -> ::core::result::Result<::ebnfgen::runtime::ParseTree, ::ebnfgen::runtime::RuntimeError> {
            let mut __rec = ::ebnfgen::runtime::Recognizer::new(tokens);
            let __tree = self::rules::#entry(&mut __rec)?;
            __rec.finish()?;
            ::core::result::Result::Ok(__tree)
        }

        /// Tokenize then parse an input from the entry rule
        pub fn parse(
            input: &str,
        ) -> ::core::result::Result<::ebnfgen::runtime::ParseTree, ::ebnfgen::runtime::RuntimeError> {
            let __tokens = self::tokenize(input)?;
            self::parse_tokens(&__tokens)
        }

        /// Tokenize then parse an input from a specific rule
        pub fn parse_rule(
            rule: &str,
            input: &str,
        ) -> ::core::result::Result<::ebnfgen::runtime::ParseTree, ::ebnfgen::runtime::RuntimeError> {
            let __tokens = self::tokenize(input)?;
            let mut __rec = ::ebnfgen::runtime::Recognizer::new(&__tokens);

            let __tree = match rule {
                #(#rule_arms)*
                _ => {
                    return ::core::result::Result::Err(::ebnfgen::runtime::RuntimeError::UnknownRule(
                        ::std::borrow::ToOwned::to_owned(rule),
                    ))
                }
            };

            __rec.finish()?;
            ::core::result::Result::Ok(__tree)
        }

        #[allow(non_snake_case, unused_mut, unreachable_code, clippy::all)]
        pub mod rules {
            #(#functions)*
        }
    }
}

/// Code generation for a single rule
struct RuleGen<'p> {
    program: &'p Program,
    rule: &'p str,
}

impl<'p> RuleGen<'p> {
    /// Generate the statements running productions, pushing the helper functions they need
    fn body(&self, body: &[Production], functions: &mut Vec<TokenStream>) -> TokenStream {
        let rule = self.rule;

        let statements = body.iter().map(|production| match production {
            Production::Consume { token, .. } => {
                let token: &str = token;
                quote! {
                    __children.push(::ebnfgen::runtime::ParseTree::Token(__rec.expect(#rule, #token)?));
                }
            }

            Production::Subrule { rule, .. } => {
                let ident = make_safe_ident(self.program.rules()[*rule].name());
                quote! { __children.push(self::#ident(__rec)?); }
            }

            Production::Option {
                lookahead,
                body,
                occurrence,
            } => {
                let helper = format_ident!("__{}_option{}", rule, occurrence);
                let cond = at_any(lookahead);
                let inner = self.body(body, functions);

                functions.push(self.helper(&helper, quote! { if #cond { #inner } }));
                quote! { self::#helper(__rec, __children)?; }
            }

            Production::Many {
                lookahead,
                body,
                occurrence,
            } => {
                let helper = format_ident!("__{}_many{}", rule, occurrence);
                let cond = at_any(lookahead);
                let inner = self.body(body, functions);

                functions.push(self.helper(&helper, quote! { while #cond { #inner } }));
                quote! { self::#helper(__rec, __children)?; }
            }

            Production::Or {
                alternatives,
                expected,
                occurrence,
            } => {
                let choice = self.choice(alternatives, expected, functions);

                // Top-level choices are inlined, parenthesized ones get their own function
                if *occurrence == 0 {
                    choice
                } else {
                    let helper = format_ident!("__{}_or{}", rule, occurrence);
                    functions.push(self.helper(&helper, choice));
                    quote! { self::#helper(__rec, __children)?; }
                }
            }
        });

        // Collect first: generating statements pushes helper functions
        let statements: Vec<_> = statements.collect();

        quote! { #(#statements)* }
    }

    /// Same decision order as [`Program::run_rule`]: lookahead match, then the nullable alternative
    fn choice(
        &self,
        alternatives: &[Alternative],
        expected: &[Arc<str>],
        functions: &mut Vec<TokenStream>,
    ) -> TokenStream {
        let rule = self.rule;

        let mut chain = TokenStream::new();

        for alt in alternatives.iter().filter(|alt| !alt.lookahead.is_empty()) {
            if !chain.is_empty() {
                chain.extend(quote! { else });
            }

            let cond = at_any(&alt.lookahead);
            let inner = self.body(&alt.body, functions);
            chain.extend(quote! { if #cond { #inner } });
        }

        let fallback = match alternatives.iter().find(|alt| alt.nullable) {
            Some(alt) => self.body(&alt.body, functions),
            None => {
                let expected = expected.iter().map(|kind| &**kind);
                quote! {
                    return ::core::result::Result::Err(__rec.no_viable_alternative(#rule, &[#(#expected),*]));
                }
            }
        };

        if chain.is_empty() {
            fallback
        } else {
            quote! { #chain else { #fallback } }
        }
    }

    fn helper(&self, ident: &Ident, body: TokenStream) -> TokenStream {
        quote! {
            fn #ident(
                __rec: &mut ::ebnfgen::runtime::Recognizer,
                __children: &mut ::std::vec::Vec<::ebnfgen::runtime::ParseTree>,
            ) -> ::core::result::Result<(), ::ebnfgen::runtime::SyntaxError> {
                #body
                ::core::result::Result::Ok(())
            }
        }
    }
}

/// Condition checking the next token is in a lookahead set
fn at_any(lookahead: &[Arc<str>]) -> TokenStream {
    if lookahead.is_empty() {
        return quote! { false };
    }

    let kinds = lookahead.iter().map(|kind| &**kind);
    quote! { __rec.at_any(&[#(#kinds),*]) }
}

/// Make an identifier from a rule name, escaping Rust keywords
///
/// Keywords which can't be raw identifiers get a `__` prefix, which no rule name can start with.
pub fn make_safe_ident(ident: &str) -> Ident {
    if RAW_FORBIDDEN_KEYWORDS.contains(&ident) {
        format_ident!("__{}", ident)
    } else if RUST_RESERVED_KEYWORDS.contains(&ident) {
        format_ident!("r#{}", ident)
    } else {
        format_ident!("{}", ident)
    }
}

/// Keywords which can't be used as raw identifiers
static RAW_FORBIDDEN_KEYWORDS: &[&str] = &["crate", "self", "Self", "super"];

pub static RUST_RESERVED_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use", "where",
    "while", "async", "await", "dyn", "abstract", "become", "box", "do", "final", "macro",
    "override", "priv", "typeof", "unsized", "virtual", "yield", "try", "union", "gen",
];
