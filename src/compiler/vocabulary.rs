use crate::runtime::{Lexer, TokenDef};
use lazy_static::lazy_static;

/// Token kinds of the EBNF dialect, in lexing priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VocabularyKind {
    NewLine,
    WhiteSpace,
    Letter,
    Digit,
    Underscore,
    SingleQuote,
    DoubleQuote,
    OpenOption,
    CloseOption,
    OpenRepeat,
    CloseRepeat,
    OpenGroup,
    CloseGroup,
    Alternate,
    Conjoin,
    Define,
    Terminator,
    Symbol,
}

impl VocabularyKind {
    /// All kinds, in lexing priority order
    pub const ALL: [VocabularyKind; 18] = [
        Self::NewLine,
        Self::WhiteSpace,
        Self::Letter,
        Self::Digit,
        Self::Underscore,
        Self::SingleQuote,
        Self::DoubleQuote,
        Self::OpenOption,
        Self::CloseOption,
        Self::OpenRepeat,
        Self::CloseRepeat,
        Self::OpenGroup,
        Self::CloseGroup,
        Self::Alternate,
        Self::Conjoin,
        Self::Define,
        Self::Terminator,
        Self::Symbol,
    ];

    /// Name of the kind, as found in [`crate::runtime::Token::kind`]
    pub fn name(self) -> &'static str {
        match self {
            Self::NewLine => "NewLine",
            Self::WhiteSpace => "WhiteSpace",
            Self::Letter => "Letter",
            Self::Digit => "Digit",
            Self::Underscore => "Underscore",
            Self::SingleQuote => "SingleQuote",
            Self::DoubleQuote => "DoubleQuote",
            Self::OpenOption => "OpenOption",
            Self::CloseOption => "CloseOption",
            Self::OpenRepeat => "OpenRepeat",
            Self::CloseRepeat => "CloseRepeat",
            Self::OpenGroup => "OpenGroup",
            Self::CloseGroup => "CloseGroup",
            Self::Alternate => "Alternate",
            Self::Conjoin => "Conjoin",
            Self::Define => "Define",
            Self::Terminator => "Terminator",
            Self::Symbol => "Symbol",
        }
    }

    /// Get a kind from its name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    /// Pattern matching the kind
    pub fn pattern(self) -> &'static str {
        match self {
            Self::NewLine => r"(\r?\n)+",
            Self::WhiteSpace => r"[ \t\r\x0B\x0C]+",
            Self::Letter => r"[A-Za-z]",
            Self::Digit => r"[0-9]",
            Self::Underscore => r"_",
            Self::SingleQuote => r"'",
            Self::DoubleQuote => r#"""#,
            Self::OpenOption => r"\[",
            Self::CloseOption => r"\]",
            Self::OpenRepeat => r"\{",
            Self::CloseRepeat => r"\}",
            Self::OpenGroup => r"\(",
            Self::CloseGroup => r"\)",
            Self::Alternate => r"\|",
            Self::Conjoin => r",",
            Self::Define => r"=",
            Self::Terminator => r";",
            Self::Symbol => r"[~`!@#$%^&*\-+\\:<>?./]",
        }
    }

    /// Whitespace kinds, skippable around delimiters
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::NewLine | Self::WhiteSpace)
    }
}

lazy_static! {
    /// Lexer of the EBNF dialect
    ///
    /// Trivia tokens are kept, as they are significant inside terminal literals.
    pub static ref VOCABULARY: Lexer = Lexer::new(
        VocabularyKind::ALL
            .iter()
            .map(|kind| TokenDef::new(kind.name(), kind.pattern())
                .expect("Vocabulary patterns are valid"))
            .collect()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<String> {
        VOCABULARY
            .tokenize(input)
            .unwrap()
            .iter()
            .map(|token| token.kind().to_string())
            .collect()
    }

    #[test]
    fn tokenizes_a_rule() {
        assert_eq!(
            kinds("A_1 = [\"+\"];\n\n"),
            [
                "Letter",
                "Underscore",
                "Digit",
                "WhiteSpace",
                "Define",
                "WhiteSpace",
                "OpenOption",
                "DoubleQuote",
                "Symbol",
                "DoubleQuote",
                "CloseOption",
                "Terminator",
                "NewLine"
            ]
        );
    }

    #[test]
    fn crlf_is_a_newline() {
        assert_eq!(kinds("\r\n\r\n"), ["NewLine"]);
    }

    #[test]
    fn rejects_characters_outside_the_dialect() {
        let errors = VOCABULARY.tokenize("A = \"é\";").unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].text(), "é");
        assert_eq!(errors[0].location().column(), 6);
    }
}
