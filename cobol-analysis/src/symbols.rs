//! Symbol index
//!
//! Built once per parse from the tree. It records the names a COBOL program declares and where
//! every word occurs:
//!
//!     - programs: the PROGRAM-ID of every ProgramUnit, with its enclosing program
//!     - labels: paragraph and section headers in procedure divisions
//!     - data items: level-numbered entries in data divisions, linked into their group hierarchy
//!     - occurrences: every word token, grouped by upper-cased name
//!
//! Data entries follow the level-number rules: 01 and 77 start a new hierarchy, 02-49 nest under
//! the nearest preceding entry with a lower level, 66 and 88 attach to the entry just before them.
//! Label and data-entry detection is lexical; division bodies are not parsed.

use cobol_parser::cobol::ast::{Node, NodeKind, Range};
use cobol_parser::cobol::token::{Token, TokenType};
use std::collections::BTreeMap;

/// Verbs that may stand alone as a sentence and must not be mistaken for paragraph labels.
const STANDALONE_VERBS: &[&str] = &["EXIT", "GOBACK", "CONTINUE", "STOP"];

#[derive(Debug, Clone, PartialEq)]
pub struct ProgramSymbol {
    pub name: String,
    /// Range of the name token after PROGRAM-ID.
    pub range: Range,
    pub extent: Range,
    pub parent: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    Section,
    Paragraph,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelSymbol {
    pub name: String,
    pub kind: LabelKind,
    pub range: Range,
    pub program: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataItem {
    pub level: u8,
    pub name: String,
    pub range: Range,
    pub extent: Range,
    /// The entry as written, whitespace collapsed and without the period.
    pub display_line: String,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub program: Option<usize>,
}

impl DataItem {
    pub fn is_filler(&self) -> bool {
        self.name.eq_ignore_ascii_case("FILLER")
    }

    pub fn is_condition(&self) -> bool {
        self.level == 88
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolIndex {
    programs: Vec<ProgramSymbol>,
    labels: Vec<LabelSymbol>,
    data_items: Vec<DataItem>,
    occurrences: BTreeMap<String, Vec<Range>>,
}

impl SymbolIndex {
    pub fn build(root: &Node) -> Self {
        let mut index = SymbolIndex {
            occurrences: group_occurrences(root.tokens()),
            ..SymbolIndex::default()
        };
        index.visit(root, None);
        index
    }

    pub fn programs(&self) -> &[ProgramSymbol] {
        &self.programs
    }

    pub fn labels(&self) -> &[LabelSymbol] {
        &self.labels
    }

    pub fn data_items(&self) -> &[DataItem] {
        &self.data_items
    }

    /// Every range where `name` occurs as a word, in source order. Case-insensitive.
    pub fn occurrences(&self, name: &str) -> &[Range] {
        self.occurrences
            .get(&name.to_uppercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Declaration sites of `name` across programs, labels and data items. Case-insensitive.
    pub fn definitions(&self, name: &str) -> Vec<Range> {
        let programs = self
            .programs
            .iter()
            .filter(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| p.range.clone());
        let labels = self
            .labels
            .iter()
            .filter(|l| l.name.eq_ignore_ascii_case(name))
            .map(|l| l.range.clone());
        let items = self
            .data_items
            .iter()
            .filter(|d| !d.is_filler() && d.name.eq_ignore_ascii_case(name))
            .map(|d| d.range.clone());
        let mut ranges: Vec<Range> = programs.chain(labels).chain(items).collect();
        ranges.sort_by_key(|r| r.span.start);
        ranges
    }

    pub fn program_named(&self, name: &str) -> Option<usize> {
        self.programs
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn label_named(&self, name: &str) -> Option<&LabelSymbol> {
        self.labels.iter().find(|l| l.name.eq_ignore_ascii_case(name))
    }

    pub fn data_item_named(&self, name: &str) -> Option<usize> {
        self.data_items
            .iter()
            .position(|d| !d.is_filler() && d.name.eq_ignore_ascii_case(name))
    }

    /// The item at `index` preceded by all of its ancestors, outermost first.
    pub fn data_lineage(&self, index: usize) -> Vec<&DataItem> {
        let mut chain = Vec::new();
        let mut cursor = Some(index);
        while let Some(i) = cursor {
            match self.data_items.get(i) {
                Some(item) => {
                    chain.push(item);
                    cursor = item.parent;
                }
                None => break,
            }
        }
        chain.reverse();
        chain
    }

    /// The program at `index` preceded by every program enclosing it, outermost first.
    pub fn program_lineage(&self, index: usize) -> Vec<&ProgramSymbol> {
        let mut chain = Vec::new();
        let mut cursor = Some(index);
        while let Some(i) = cursor {
            match self.programs.get(i) {
                Some(program) => {
                    chain.push(program);
                    cursor = program.parent;
                }
                None => break,
            }
        }
        chain.reverse();
        chain
    }

    fn visit(&mut self, node: &Node, program: Option<usize>) {
        let mut program = program;
        match node.kind {
            NodeKind::ProgramUnit => program = Some(self.add_program(node, program)),
            NodeKind::DataDivision => self.index_data_division(node, program),
            NodeKind::ProcedureDivision => self.index_procedure_division(node, program),
            _ => {}
        }
        for child in node.child_nodes() {
            self.visit(child, program);
        }
    }

    fn add_program(&mut self, unit: &Node, parent: Option<usize>) -> usize {
        let extent = unit.range().unwrap_or_default();
        let name_token = unit
            .child_nodes()
            .find(|n| n.kind == NodeKind::IdentificationDivision)
            .and_then(program_name_token);
        let name = unit
            .name
            .clone()
            .or_else(|| name_token.map(|t| t.lexeme.clone()))
            .unwrap_or_default();
        self.programs.push(ProgramSymbol {
            name,
            range: name_token.map(Token::range).unwrap_or_else(|| extent.clone()),
            extent,
            parent,
        });
        self.programs.len() - 1
    }

    fn index_data_division(&mut self, division: &Node, program: Option<usize>) {
        let tokens = division.tokens();
        let mut open: Vec<(u8, usize)> = Vec::new();

        for entry in sentences(&tokens) {
            let mut significant = entry.iter().filter(|t| !t.is_trivia());
            let Some(level) = significant.next().and_then(|t| level_number(t)) else {
                continue;
            };
            let Some(name_token) = significant.next().filter(|t| t.kind == TokenType::Word) else {
                continue;
            };

            let parent = match level {
                1 | 77 => {
                    open.clear();
                    None
                }
                66 | 88 => open.last().map(|(_, index)| *index),
                _ => {
                    while open.last().is_some_and(|(open_level, _)| *open_level >= level) {
                        open.pop();
                    }
                    open.last().map(|(_, index)| *index)
                }
            };

            let ranges: Vec<Range> = entry
                .iter()
                .filter(|t| !t.is_trivia())
                .map(|t| t.range())
                .collect();
            let index = self.data_items.len();
            self.data_items.push(DataItem {
                level,
                name: name_token.lexeme.clone(),
                range: name_token.range(),
                extent: Range::bounding_box(ranges.iter()).unwrap_or_else(|| name_token.range()),
                display_line: display_line(&entry),
                parent,
                children: Vec::new(),
                program,
            });
            if let Some(parent) = parent {
                self.data_items[parent].children.push(index);
            }
            if !matches!(level, 66 | 88) {
                open.push((level, index));
            }
        }
    }

    fn index_procedure_division(&mut self, division: &Node, program: Option<usize>) {
        let significant: Vec<&Token> = division
            .tokens()
            .into_iter()
            .filter(|t| !t.is_trivia())
            .collect();

        for (i, token) in significant.iter().enumerate() {
            if token.kind != TokenType::Word {
                continue;
            }
            let first_on_line = i == 0 || significant[i - 1].line != token.line;
            if !first_on_line || is_standalone_verb(&token.lexeme) {
                continue;
            }
            let next = significant.get(i + 1);
            let kind = if next.is_some_and(|t| t.is_terminator()) {
                LabelKind::Paragraph
            } else if next.is_some_and(|t| t.lexeme.eq_ignore_ascii_case("SECTION"))
                && significant.get(i + 2).is_some_and(|t| t.is_terminator())
            {
                LabelKind::Section
            } else {
                continue;
            };
            self.labels.push(LabelSymbol {
                name: token.lexeme.clone(),
                kind,
                range: token.range(),
                program,
            });
        }
    }
}

/// Group word tokens by upper-cased lexeme. Each call builds a fresh map; ranges keep the
/// order in which tokens are given.
pub fn group_occurrences<'a, I>(tokens: I) -> BTreeMap<String, Vec<Range>>
where
    I: IntoIterator<Item = &'a Token>,
{
    let mut groups: BTreeMap<String, Vec<Range>> = BTreeMap::new();
    for token in tokens {
        if token.kind == TokenType::Word {
            groups
                .entry(token.lexeme.to_uppercase())
                .or_default()
                .push(token.range());
        }
    }
    groups
}

/// Level numbers 01-49, 66, 77 and 88, written with one or two digits.
pub fn level_number(token: &Token) -> Option<u8> {
    if token.kind != TokenType::Word
        || token.lexeme.len() > 2
        || !token.lexeme.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    let level: u8 = token.lexeme.parse().ok()?;
    ((1..=49).contains(&level) || matches!(level, 66 | 77 | 88)).then_some(level)
}

fn program_name_token(identification: &Node) -> Option<&Token> {
    let tokens = identification.tokens();
    let after = tokens
        .iter()
        .position(|t| t.lexeme.eq_ignore_ascii_case("PROGRAM-ID"))?;
    tokens[after + 1..]
        .iter()
        .find(|t| !t.is_trivia() && !t.is_terminator())
        .copied()
}

fn is_standalone_verb(lexeme: &str) -> bool {
    let upper = lexeme.to_uppercase();
    upper.starts_with("END-") || STANDALONE_VERBS.contains(&upper.as_str())
}

/// Split tokens at statement terminators. Terminators are dropped; a trailing unterminated
/// sentence is kept.
fn sentences<'a>(tokens: &[&'a Token]) -> Vec<Vec<&'a Token>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for token in tokens {
        if token.is_terminator() {
            out.push(std::mem::take(&mut current));
        } else {
            current.push(*token);
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn display_line(entry: &[&Token]) -> String {
    entry
        .iter()
        .map(|t| if t.is_trivia() { " " } else { t.lexeme.as_str() })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
