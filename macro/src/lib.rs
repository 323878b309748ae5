#![forbid(unsafe_code)]
#![forbid(unused_must_use)]

use ebnfgen::compiler::{pretty_format_compile_error, CompileOptions, EbnfCompiler, TokenMap};
use ebnfgen::generators::gen_rust_token_stream;
use lazy_static::lazy_static;
use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use regex::Regex;
use std::env;
use std::fs;
use std::path::PathBuf;
use syn::{Ident, ItemMod, Visibility};

lazy_static! {
    static ref ATTR_ENTRY: Regex =
        Regex::new("(?P<key>[a-z_]+)\\s*=\\s*\"(?P<value>[^\"]*)\"\\s*(?:,|$)").unwrap();
}

/// Options decoded from the attribute
struct Options {
    /// Input file (grammar)
    grammar_file: PathBuf,

    /// Grammar's target name
    name: Option<String>,

    /// JSON token map file
    tokens_file: Option<PathBuf>,

    /// Rule to start parsing from
    entry: Option<String>,
}

/// Generate a parser from an EBNF grammar file, inside an empty inline module
///
/// ```ignore
/// #[ebnf_grammar(filename = "grammars/math.ebnf", name = "Math", tokens = "grammars/math.json")]
/// mod math {}
///
/// let tree = math::parse("1 + 2")?;
/// ```
///
/// Paths start from the crate's manifest directory. `name`, `tokens` (a JSON token map) and `entry`
/// (the rule to start from) are optional.
#[proc_macro_attribute]
pub fn ebnf_grammar(attr: TokenStream, item: TokenStream) -> TokenStream {
    match expand(attr, item) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand(attr: TokenStream, item: TokenStream) -> syn::Result<proc_macro2::TokenStream> {
    let (mod_ident, mod_vis) = parse_input_mod(item)?;
    let options = parse_options_attr(attr)?;

    let grammar_src = read_file(&options.grammar_file)?;

    let mut compile_options =
        CompileOptions::new(options.name.as_deref().unwrap_or(&mod_ident.to_string()));

    if let Some(tokens_file) = &options.tokens_file {
        let token_map = TokenMap::from_json(&read_file(tokens_file)?)
            .map_err(|err| error(format!("Failed to load token map: {}", err)))?;

        compile_options = compile_options.with_token_map(token_map);
    }

    if let Some(entry) = &options.entry {
        compile_options = compile_options.with_entry_rule(entry);
    }

    let grammar = EbnfCompiler::new(&grammar_src)
        .and_then(|compiler| compiler.analyze(&compile_options))
        .map_err(|err| {
            error(format!(
                "Failed to compile grammar:\n{}",
                pretty_format_compile_error(&grammar_src, &err)
            ))
        })?;

    let generated_rust = gen_rust_token_stream(&grammar);

    // Rebuild when the input files change
    let tracked = std::iter::once(&options.grammar_file)
        .chain(options.tokens_file.as_ref())
        .map(|path| path.to_string_lossy().to_string());

    Ok(quote! {
        #mod_vis mod #mod_ident {
            #(const _: &str = include_str!(#tracked);)*

            #generated_rust
        }
    })
}

fn parse_input_mod(item: TokenStream) -> syn::Result<(Ident, Visibility)> {
    let item = syn::parse::<ItemMod>(item).map_err(|err| {
        syn::Error::new(
            err.span(),
            "This macro must be used on a module which will be filled with the generated parser",
        )
    })?;

    let mod_ident = item.ident;

    match item.content {
        Some((_, content)) if content.is_empty() => Ok((mod_ident, item.vis)),
        _ => Err(syn::Error::new(
            mod_ident.span(),
            format!(
                "This macro must be used on an inline, empty module (e.g. 'mod {} {{}}')",
                mod_ident
            ),
        )),
    }
}

fn parse_options_attr(attr: TokenStream) -> syn::Result<Options> {
    let attr = attr.to_string();

    let mut grammar_file = None;
    let mut name = None;
    let mut tokens_file = None;
    let mut entry = None;

    for captured in ATTR_ENTRY.captures_iter(&attr) {
        let value = captured["value"].to_string();

        match &captured["key"] {
            "filename" => grammar_file = Some(manifest_path(&value)?),
            "name" => name = Some(value),
            "tokens" => tokens_file = Some(manifest_path(&value)?),
            "entry" => entry = Some(value),
            key => return Err(error(format!("Unknown option '{}'", key))),
        }
    }

    let grammar_file = grammar_file.ok_or_else(|| {
        error("Please provide a grammar file path under the form: #[ebnf_grammar(filename = \"<path>\")]")
    })?;

    Ok(Options {
        grammar_file,
        name,
        tokens_file,
        entry,
    })
}

fn manifest_path(relative: &str) -> syn::Result<PathBuf> {
    let mut path = PathBuf::from(
        env::var("CARGO_MANIFEST_DIR")
            .map_err(|_| error("Environment variable CARGO_MANIFEST_DIR is not set"))?,
    );

    path.push(relative);
    Ok(path)
}

fn read_file(path: &PathBuf) -> syn::Result<String> {
    fs::read_to_string(path)
        .map_err(|err| error(format!("Failed to read file '{}': {}", path.display(), err)))
}

fn error(message: impl std::fmt::Display) -> syn::Error {
    syn::Error::new(Span::call_site(), message)
}
