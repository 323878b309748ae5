use super::cst::*;
use super::errors::{CompileError, Diagnostic};
use super::vocabulary::VocabularyKind::{self, *};
use crate::runtime::{Recognizer, Token};
use log::debug;

/// Parse an EBNF grammar from its tokens (see [`super::vocabulary::VOCABULARY`])
///
/// All syntax errors are collected: after an error, parsing resumes after the next `;`.
pub fn parse_ebnf(tokens: &[Token]) -> Result<GrammarNode, CompileError> {
    let grammar = MetaParser {
        rec: Recognizer::new(tokens),
    }
    .grammar()
    .map_err(CompileError::Parse)?;

    debug!("Parsed {} rule(s)", grammar.rules.len());

    Ok(grammar)
}

type PResult<T> = Result<T, Diagnostic>;

struct MetaParser<'t> {
    rec: Recognizer<'t>,
}

impl<'t> MetaParser<'t> {
    fn grammar(&mut self) -> Result<GrammarNode, Vec<Diagnostic>> {
        let mut rules = vec![];
        let mut errors = vec![];

        self.skip_trivia();

        while !self.rec.is_at_end() {
            match self.rule() {
                Ok(rule) => rules.push(rule),
                Err(err) => {
                    errors.push(err);
                    self.recover();
                }
            }

            self.skip_trivia();
        }

        if rules.is_empty() && errors.is_empty() {
            errors.push(Diagnostic::new(
                "Grammar doesn't declare any rule",
                self.rec.end_location(),
            ));
        }

        if errors.is_empty() {
            Ok(GrammarNode { rules })
        } else {
            Err(errors)
        }
    }

    fn rule(&mut self) -> PResult<RuleNode> {
        let name = self.identifier("a rule name")?;

        self.skip_trivia();
        let define = self.expect(Define, "'=' after the rule name")?;

        self.skip_trivia();
        let rhs = self.rhs()?;

        self.skip_trivia();
        let terminator = self.expect(Terminator, "',', '|' or ';'")?;

        Ok(RuleNode {
            name,
            define,
            rhs,
            terminator,
        })
    }

    fn rhs(&mut self) -> PResult<RhsNode> {
        let mut sequences = vec![self.sequence()?];
        let mut separators = vec![];

        loop {
            self.skip_trivia();

            if !self.at(Conjoin) {
                break;
            }

            separators.push(self.bump("','")?);
            self.skip_trivia();
            sequences.push(self.sequence()?);
        }

        Ok(RhsNode {
            sequences,
            separators,
        })
    }

    fn sequence(&mut self) -> PResult<SequenceNode> {
        let mut terms = vec![self.term()?];
        let mut separators = vec![];

        loop {
            self.skip_trivia();

            if !self.at(Alternate) {
                break;
            }

            separators.push(self.bump("'|'")?);
            self.skip_trivia();
            terms.push(self.term()?);
        }

        Ok(SequenceNode { terms, separators })
    }

    fn term(&mut self) -> PResult<TermNode> {
        match self.peek_kind() {
            Some(OpenOption) => Ok(TermNode::Optional(self.bracketed(CloseOption, "']'")?)),
            Some(OpenRepeat) => Ok(TermNode::Repeated(self.bracketed(CloseRepeat, "'}'")?)),
            Some(OpenGroup) => Ok(TermNode::Group(self.bracketed(CloseGroup, "')'")?)),
            Some(SingleQuote) | Some(DoubleQuote) => Ok(TermNode::Terminal(self.terminal()?)),
            Some(Letter) => Ok(TermNode::Identifier(self.identifier("an identifier")?)),
            _ => Err(self.unexpected("an identifier, a literal, '[', '{' or '('")),
        }
    }

    fn bracketed(&mut self, close: VocabularyKind, what: &str) -> PResult<BracketedNode> {
        let open = self.bump("an opening bracket")?;

        self.skip_trivia();
        let rhs = self.rhs()?;

        self.skip_trivia();
        let close = self.expect(close, what).map_err(|err| {
            Diagnostic::new(
                format!("{} (bracket opened at {})", err.message(), open.location()),
                err.location(),
            )
        })?;

        Ok(BracketedNode {
            open,
            rhs: Box::new(rhs),
            close,
        })
    }

    fn terminal(&mut self) -> PResult<TerminalNode> {
        let open = self.bump("a quote")?;
        let mut chars = vec![];

        // Anything but the opening quote kind is part of the literal, line breaks included
        loop {
            match self.rec.peek() {
                Some(token) if token.kind() == open.kind() => break,
                Some(token) => {
                    chars.push(token.clone());
                    self.rec.advance();
                }
                None => return Err(Diagnostic::new("Unterminated literal", open.location())),
            }
        }

        let close = self.bump("a closing quote")?;

        if chars.is_empty() {
            return Err(Diagnostic::new(
                "Empty literals are forbidden as they match nothing",
                open.location(),
            ));
        }

        Ok(TerminalNode { open, chars, close })
    }

    fn identifier(&mut self, what: &str) -> PResult<IdentifierNode> {
        let mut chars = vec![self.expect(Letter, what)?];

        while matches!(self.peek_kind(), Some(Letter) | Some(Digit) | Some(Underscore)) {
            chars.push(self.bump("an identifier character")?);
        }

        Ok(IdentifierNode { chars })
    }

    fn peek_kind(&self) -> Option<VocabularyKind> {
        self.rec
            .peek()
            .and_then(|token| VocabularyKind::from_name(token.kind()))
    }

    fn at(&self, kind: VocabularyKind) -> bool {
        self.rec.at(kind.name())
    }

    fn skip_trivia(&mut self) {
        while self.peek_kind().map_or(false, VocabularyKind::is_trivia) {
            self.rec.advance();
        }
    }

    /// Skip tokens up to and including the next `;`
    fn recover(&mut self) {
        while let Some(token) = self.rec.advance() {
            if token.kind() == Terminator.name() {
                break;
            }
        }
    }

    fn bump(&mut self, what: &str) -> PResult<Token> {
        self.rec
            .advance()
            .cloned()
            .ok_or_else(|| self.unexpected(what))
    }

    fn expect(&mut self, kind: VocabularyKind, what: &str) -> PResult<Token> {
        self.rec
            .consume(kind.name())
            .map_err(|_| self.unexpected(what))
    }

    fn unexpected(&self, what: &str) -> Diagnostic {
        match self.rec.peek() {
            Some(token) => Diagnostic::new(
                format!("Expected {}, found {:?}", what, token.image()),
                token.location(),
            ),
            None => Diagnostic::new(
                format!("Expected {}, found end of input", what),
                self.rec.end_location(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::vocabulary::VOCABULARY;
    use crate::runtime::Location;

    fn parse(input: &str) -> Result<GrammarNode, CompileError> {
        parse_ebnf(&VOCABULARY.tokenize(input).unwrap())
    }

    fn parse_errors(input: &str) -> Vec<Diagnostic> {
        match parse(input) {
            Err(CompileError::Parse(diags)) => diags,
            other => panic!("Expected parse errors, got {:?}", other),
        }
    }

    #[test]
    fn parses_rules_across_lines() {
        let grammar = parse("Digit = \"0\" | \"1\";\n\nNumber =\n  Digit,\n  { Digit };  Other = [ 'x' ];").unwrap();

        assert_eq!(grammar.rules.len(), 3);

        let number = &grammar.rules[1];
        assert_eq!(number.name.name(), "Number");
        assert_eq!(number.rhs.sequences.len(), 2);
        assert!(matches!(number.rhs.sequences[1].terms[0], TermNode::Repeated(_)));

        let digit = &grammar.rules[0];
        assert_eq!(digit.rhs.sequences[0].terms.len(), 2);
    }

    #[test]
    fn keeps_other_quotes_and_spaces_in_literals() {
        let grammar = parse("Greeting = \"he said 'hi'\";").unwrap();

        match &grammar.rules[0].rhs.sequences[0].terms[0] {
            TermNode::Terminal(lit) => assert_eq!(lit.value(), "he said 'hi'"),
            other => panic!("Unexpected term: {:?}", other),
        }
    }

    #[test]
    fn keeps_line_breaks_in_literals() {
        let grammar = parse("A = 'a\nb', \"c\r\n\";").unwrap();
        let terms: Vec<_> = grammar.rules[0]
            .rhs
            .sequences
            .iter()
            .map(|seq| match &seq.terms[0] {
                TermNode::Terminal(lit) => lit.value(),
                other => panic!("Unexpected term: {:?}", other),
            })
            .collect();

        assert_eq!(terms, ["a\nb", "c\r\n"]);
    }

    #[test]
    fn reports_every_malformed_rule() {
        let errors = parse_errors("A = b\nB = c;\nC = ;\nD = (e;\nE = f;");

        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].location(), Location::new(2, 1));
        assert_eq!(errors[1].location(), Location::new(3, 5));
        assert_eq!(errors[2].location(), Location::new(4, 7));
    }

    #[test]
    fn rejects_bad_literals() {
        let errors = parse_errors("A = 'abc\n;");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), "Unterminated literal");
        assert_eq!(errors[0].location(), Location::new(1, 5));

        let errors = parse_errors("A = \"\";");
        assert_eq!(errors[0].location(), Location::new(1, 5));
    }

    #[test]
    fn rejects_empty_grammars() {
        assert_eq!(parse_errors("  \n\n").len(), 1);
    }
}
