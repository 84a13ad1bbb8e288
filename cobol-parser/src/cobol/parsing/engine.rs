//! Recursive-descent engine
//!
//! [`CobolParser`] drives a [`TokenStream`] through the outline grammar: source units made of
//! program units, each with its identification division, optional environment/data/procedure
//! divisions, nested programs and an optional `END PROGRAM` trailer. Division bodies are not
//! analyzed; their tokens are collected verbatim until the next division boundary.
//!
//! Error handling follows a two-level recovery scheme:
//!
//!     - A production that cannot find a required keyword records an error diagnostic and
//!       returns a [`ParseFailure`]. Each division production closes its own frame before
//!       propagating, so partial divisions stay in the tree.
//!     - The program-unit production catches failures from below: the partial unit is detached,
//!       its children are re-attached as one Skipped node, one token is skipped, and the failure
//!       is handed to the source-unit loop.
//!     - The source-unit loop synchronizes: it skips tokens up to and including the next `.`
//!       and resumes.
//!
//! Skipped tokens always merge into a Skipped node that is the last child of the current node,
//! so two Skipped siblings are never adjacent. No token consumed from the stream is ever
//! dropped, which keeps the concatenation of leaf lexemes equal to the input text.

use super::context::ParseContext;
use super::error::{quote_all, ParseFailure};
use super::similarity::{KeywordMatch, SimilarityMatcher};
use super::ParseResult;
use crate::cobol::ast::{Diagnostic, Element, Node, NodeKind};
use crate::cobol::lexing::TokenStream;
use crate::cobol::token::{Token, TokenType};
use tracing::{debug, trace};

type ParseOutcome<T = ()> = Result<T, ParseFailure>;

const IDENTIFICATION_OPENERS: [&str; 2] = ["ID", "IDENTIFICATION"];
const QUALIFIERS: [&str; 2] = ["RECURSIVE", "INITIAL"];

/// One position in a lookahead pattern.
#[derive(Debug, Clone, Copy)]
enum Ahead {
    /// Accepted by the similarity matcher.
    Keyword(&'static str),
    /// Case-insensitive equality only.
    Exact(&'static str),
    AnyWord,
}

/// Division openers in the order a program unit may contain them.
const DIVISION_ORDER: [(NodeKind, &str); 3] = [
    (NodeKind::EnvironmentDivision, "ENVIRONMENT"),
    (NodeKind::DataDivision, "DATA"),
    (NodeKind::ProcedureDivision, "PROCEDURE"),
];

pub struct CobolParser<S> {
    stream: S,
    ctx: ParseContext,
    matcher: SimilarityMatcher,
    diagnostics: Vec<Diagnostic>,
    /// Upper-cased names of the program units currently open, outermost first.
    open_programs: Vec<String>,
    /// No significant token has been consumed since the last `.` (or since the start of input).
    statement_start: bool,
}

impl<S: TokenStream> CobolParser<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            ctx: ParseContext::new(Node::new(NodeKind::SourceUnit)),
            matcher: SimilarityMatcher::new(),
            diagnostics: Vec::new(),
            open_programs: Vec::new(),
            statement_start: true,
        }
    }

    /// Consume the entire stream and return the tree with every diagnostic recorded.
    pub fn parse(mut self) -> ParseResult {
        self.source_unit();
        ParseResult::new(self.ctx.finish(), self.diagnostics)
    }

    fn source_unit(&mut self) {
        while self.stream.has_more() {
            if let Err(failure) = self.source_unit_item() {
                debug!(%failure, "synchronizing after parse failure");
                self.synchronize();
            }
        }
    }

    fn source_unit_item(&mut self) -> ParseOutcome {
        self.spaces();
        if !self.stream.has_more() {
            return Ok(());
        }

        if self.matches(&IDENTIFICATION_OPENERS) {
            self.program_unit()?;
        } else {
            let token = self.advance();
            self.diagnostics.push(
                Diagnostic::error(token.range(), format!("Unknown input: '{}'", token.lexeme))
                    .with_code("unknown-input"),
            );
            self.skip(token);
        }
        self.spaces();
        Ok(())
    }

    // ----- program units -----

    fn program_unit(&mut self) -> ParseOutcome {
        let open = self.open_programs.len();
        self.ctx.push(Node::new(NodeKind::ProgramUnit));

        let outcome = self.program_unit_body();
        self.open_programs.truncate(open);

        match outcome {
            Ok(()) => {
                self.ctx.pop_and_attach();
                Ok(())
            }
            Err(failure) => {
                if let Some(partial) = self.ctx.pop() {
                    trace!(children = partial.children.len(), "degrading program unit");
                    self.attach_skipped(partial.children);
                }
                // The failure unwinds through every enclosing unit; only the outermost skips.
                if open == 0 {
                    self.skip_next();
                }
                Err(failure)
            }
        }
    }

    fn program_unit_body(&mut self) -> ParseOutcome {
        let name = self.identification_division()?;
        self.open_programs.push(name.to_uppercase());
        self.ctx.current().name = Some(name);

        for (kind, opener) in DIVISION_ORDER {
            if self.at_division_header_for(opener) {
                self.division(kind, opener)?;
            }
        }

        while self.at_identification_header() {
            self.spaces();
            self.program_unit()?;
        }

        if self.at_any_division_header() {
            return Err(self.unexpected_division_header());
        }

        if self.at_end_program() && !self.end_program_closes_enclosing() {
            self.end_program()?;
        }
        Ok(())
    }

    /// A division header that cannot appear at this point, reported with the openers that could.
    fn unexpected_division_header(&mut self) -> ParseFailure {
        let token = self.next_significant();
        let present: Vec<NodeKind> = self.ctx.current().child_nodes().map(|n| n.kind).collect();
        let last_division = DIVISION_ORDER
            .iter()
            .rposition(|(kind, _)| present.contains(kind));
        let nested = present.contains(&NodeKind::ProgramUnit);

        let mut expected: Vec<String> = Vec::new();
        if !nested {
            let from = last_division.map_or(0, |index| index + 1);
            expected.extend(DIVISION_ORDER[from..].iter().map(|(_, kw)| kw.to_string()));
        }
        expected.extend(IDENTIFICATION_OPENERS.iter().map(|kw| kw.to_string()));

        self.fail(ParseFailure::NoAlternative {
            found: token.lexeme.clone(),
            expected,
            range: token.range(),
        })
    }

    /// `END PROGRAM <name>` where the name belongs to an enclosing unit rather than this one.
    /// The current unit then ends without a trailer and leaves it to its owner.
    fn end_program_closes_enclosing(&mut self) -> bool {
        let ahead = self
            .stream
            .peek_seq(self.ctx.rule(), 3, &|token: &Token| token.is_trivia());
        let Some(name) = ahead.get(2).map(|token| program_name_of(token).to_uppercase()) else {
            return false;
        };
        match self.open_programs.split_last() {
            Some((own, enclosing)) => *own != name && enclosing.contains(&name),
            None => false,
        }
    }

    fn end_program(&mut self) -> ParseOutcome {
        self.spaces();
        self.consume("END")?;
        self.spaces();
        self.consume("PROGRAM")?;
        self.spaces();
        let name_token = self.program_name()?;
        self.spaces();
        self.consume(".")?;

        let name = program_name_of(&name_token);
        if let Some(own) = self.open_programs.last() {
            if *own != name.to_uppercase() {
                let declared = self.ctx.current().name.clone().unwrap_or_default();
                self.diagnostics.push(
                    Diagnostic::warning(
                        name_token.range(),
                        format!("END PROGRAM '{name}' does not match PROGRAM-ID '{declared}'"),
                    )
                    .with_code("end-program-mismatch"),
                );
            }
        }
        Ok(())
    }

    // ----- divisions -----

    /// Returns the declared program name.
    fn identification_division(&mut self) -> ParseOutcome<String> {
        self.ctx.push(Node::new(NodeKind::IdentificationDivision));
        let outcome = self.identification_division_body();
        self.ctx.pop_and_attach();
        outcome
    }

    fn identification_division_body(&mut self) -> ParseOutcome<String> {
        self.or(&IDENTIFICATION_OPENERS)?;
        self.spaces();
        self.consume("DIVISION")?;
        self.spaces();
        self.consume(".")?;
        self.spaces();
        self.consume("PROGRAM-ID")?;
        self.optional(".");
        self.spaces();
        let name = program_name_of(&self.program_name()?);
        self.spaces();

        if self.matches(&["IS"]) {
            self.consume("IS")?;
            self.spaces();
            self.or(&QUALIFIERS)?;
            self.spaces();
            self.optional("PROGRAM");
        } else if self.matches(&QUALIFIERS) {
            self.or(&QUALIFIERS)?;
            self.spaces();
            self.optional("PROGRAM");
        }
        self.spaces();
        self.optional(".");

        self.division_content();
        Ok(name)
    }

    fn division(&mut self, kind: NodeKind, opener: &str) -> ParseOutcome {
        self.spaces();
        self.ctx.push(Node::new(kind));
        let outcome = self.division_header(kind, opener);
        if outcome.is_ok() {
            self.division_content();
        }
        self.ctx.pop_and_attach();
        outcome
    }

    fn division_header(&mut self, kind: NodeKind, opener: &str) -> ParseOutcome {
        self.consume(opener)?;
        self.spaces();
        self.consume("DIVISION")?;
        if kind == NodeKind::ProcedureDivision {
            // USING/RETURNING phrases run up to the period and stay in the body.
            self.optional(".");
            return Ok(());
        }
        self.spaces();
        self.consume(".")
    }

    /// Collect tokens verbatim until the next division boundary or end of input.
    fn division_content(&mut self) {
        while !self.at_division_boundary() {
            let token = self.advance();
            self.ctx.current().push_token(token);
        }
    }

    // ----- boundaries -----

    fn at_division_boundary(&mut self) -> bool {
        self.stream.peek(self.ctx.rule()).is_eof()
            || self.at_any_division_header()
            || self.at_end_program()
    }

    /// A known opener followed by DIVISION, or an unknown `<word> DIVISION .` that begins a
    /// statement. Words such as DIVISOR or DIVISION-CODE inside a body never qualify.
    fn at_any_division_header(&mut self) -> bool {
        DIVISION_ORDER
            .iter()
            .any(|(_, opener)| self.at_division_header_for(*opener))
            || self.at_identification_header()
            || (self.statement_start
                && self.lookahead(&[Ahead::AnyWord, Ahead::Exact("DIVISION"), Ahead::Exact(".")]))
    }

    fn at_identification_header(&mut self) -> bool {
        IDENTIFICATION_OPENERS
            .iter()
            .any(|opener| self.at_division_header_for(*opener))
    }

    fn at_division_header_for(&mut self, opener: &'static str) -> bool {
        if opener == "PROCEDURE" {
            self.lookahead(&[Ahead::Keyword(opener), Ahead::Keyword("DIVISION")])
        } else {
            self.lookahead(&[
                Ahead::Keyword(opener),
                Ahead::Keyword("DIVISION"),
                Ahead::Keyword("."),
            ])
        }
    }

    fn at_end_program(&mut self) -> bool {
        self.lookahead(&[Ahead::Keyword("END"), Ahead::Keyword("PROGRAM")])
    }

    /// Silent sequence probe over the next significant tokens.
    fn lookahead(&mut self, pattern: &[Ahead]) -> bool {
        let ahead = self.stream.peek_seq(
            self.ctx.rule(),
            pattern.len(),
            &|token: &Token| token.is_trivia(),
        );
        ahead.len() == pattern.len()
            && ahead.iter().zip(pattern).all(|(token, expect)| match expect {
                Ahead::AnyWord => token.kind == TokenType::Word,
                Ahead::Keyword(keyword) => self.matcher.probe(token, keyword),
                Ahead::Exact(keyword) => token.lexeme.eq_ignore_ascii_case(keyword),
            })
    }

    // ----- primitives -----

    /// Silent single-token test against a list of keywords.
    fn matches(&mut self, keywords: &[&str]) -> bool {
        let token = self.stream.peek(self.ctx.rule());
        !token.is_eof() && keywords.iter().any(|kw| self.matcher.probe(&token, kw))
    }

    /// Append all whitespace and newline tokens at the cursor to the current node.
    fn spaces(&mut self) {
        while self.stream.peek(self.ctx.rule()).is_trivia() {
            let token = self.advance();
            self.ctx.current().push_token(token);
        }
    }

    fn consume(&mut self, expected: &str) -> ParseOutcome {
        let token = self.stream.peek(self.ctx.rule());
        if token.is_eof() {
            return Err(self.fail(ParseFailure::UnexpectedEndOfInput {
                expected: format!("'{expected}'"),
                range: token.range(),
            }));
        }
        if self.matcher.accept(&token, expected, &mut self.diagnostics) {
            self.append_next();
            Ok(())
        } else {
            Err(self.fail(ParseFailure::UnexpectedToken {
                found: token.lexeme.clone(),
                expected: expected.to_string(),
                range: token.range(),
            }))
        }
    }

    /// Consume the first matching alternative. Exact matches win over near-misses.
    fn or(&mut self, alternatives: &[&str]) -> ParseOutcome {
        let token = self.stream.peek(self.ctx.rule());
        if token.is_eof() {
            return Err(self.fail(ParseFailure::UnexpectedEndOfInput {
                expected: quote_all(alternatives),
                range: token.range(),
            }));
        }

        let exact = alternatives
            .iter()
            .find(|kw| self.matcher.compare(&token.lexeme, kw) == KeywordMatch::Exact);
        let chosen = exact.or_else(|| {
            alternatives
                .iter()
                .find(|kw| self.matcher.probe(&token, kw))
        });

        match chosen {
            Some(keyword) => {
                self.matcher.accept(&token, keyword, &mut self.diagnostics);
                self.append_next();
                Ok(())
            }
            None => Err(self.fail(ParseFailure::NoAlternative {
                found: token.lexeme.clone(),
                expected: alternatives.iter().map(|kw| kw.to_string()).collect(),
                range: token.range(),
            })),
        }
    }

    fn optional(&mut self, keyword: &str) {
        let token = self.stream.peek(self.ctx.rule());
        if !token.is_eof() && self.matcher.accept(&token, keyword, &mut self.diagnostics) {
            self.append_next();
        }
    }

    /// The program name token, consumed into the current node.
    fn program_name(&mut self) -> ParseOutcome<Token> {
        let token = self.stream.peek(self.ctx.rule());
        if token.is_eof() {
            return Err(self.fail(ParseFailure::UnexpectedEndOfInput {
                expected: "program name".to_string(),
                range: token.range(),
            }));
        }
        if token.is_terminator() {
            return Err(self.fail(ParseFailure::UnexpectedToken {
                found: token.lexeme.clone(),
                expected: "program name".to_string(),
                range: token.range(),
            }));
        }
        self.append_next();
        Ok(token)
    }

    /// Every token leaves the stream through here.
    fn advance(&mut self) -> Token {
        let token = self.stream.forward(self.ctx.rule());
        if !token.is_trivia() && !token.is_eof() {
            self.statement_start = token.is_terminator();
        }
        token
    }

    fn append_next(&mut self) {
        let token = self.advance();
        self.ctx.current().push_token(token);
    }

    fn next_significant(&mut self) -> Token {
        let rule = self.ctx.rule();
        let mut ahead = self.stream.peek_seq(rule, 1, &|token: &Token| token.is_trivia());
        ahead.pop().unwrap_or_else(|| self.stream.peek(rule))
    }

    fn fail(&mut self, failure: ParseFailure) -> ParseFailure {
        self.diagnostics.push(failure.to_diagnostic());
        failure
    }

    // ----- recovery -----

    /// Skip tokens up to and including the next statement terminator, or to end of input.
    fn synchronize(&mut self) {
        loop {
            let token = self.advance();
            if token.is_eof() {
                break;
            }
            let terminator = token.is_terminator();
            self.skip(token);
            if terminator {
                break;
            }
        }
    }

    fn skip_next(&mut self) {
        let token = self.advance();
        self.skip(token);
    }

    /// Attach a token to the trailing Skipped node of the current node, opening one if needed.
    fn skip(&mut self, token: Token) {
        if token.is_eof() {
            return;
        }
        self.attach_skipped(vec![Element::Token(token)]);
    }

    fn attach_skipped(&mut self, elements: Vec<Element>) {
        if elements.is_empty() {
            return;
        }
        let current = self.ctx.current();
        if let Some(Element::Node(last)) = current.children.last_mut() {
            if last.kind == NodeKind::Skipped {
                last.children.extend(elements);
                return;
            }
        }
        current.push_node(Node::new(NodeKind::Skipped).with_children(elements));
    }
}

/// Program names may be written as literals; the quotes are not part of the name.
fn program_name_of(token: &Token) -> String {
    token
        .lexeme
        .trim_matches(|c| c == '\'' || c == '"')
        .to_string()
}
