//! Property-based tests for the parsing engine
//!
//! Sources are assembled from fragments that exercise every production and every recovery path:
//! well-formed headers, misspelled and truncated headers, stray periods, literals and arbitrary
//! words. Whatever comes out, the engine must terminate, keep every token, and never leave two
//! Skipped nodes side by side.

use cobol_parser::cobol::ast::NodeKind;
use cobol_parser::cobol::lexing::CobolLexer;
use cobol_parser::cobol::parsing::{parse_source, KeywordMatch, SimilarityMatcher};
use cobol_parser::cobol::testing::{adjacent_skipped, leaf_count, leaf_text};
use proptest::prelude::*;

fn fragment_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("IDENTIFICATION DIVISION.".to_string()),
        Just("ID DIVISION.".to_string()),
        Just("IDENTIFICATON DIVISON.".to_string()),
        Just("PROGRAM-ID.".to_string()),
        Just("IS RECURSIVE PROGRAM".to_string()),
        Just("INITIAL".to_string()),
        Just("ENVIRONMENT DIVISION.".to_string()),
        Just("DATA DIVISION.".to_string()),
        Just("DTA DIVISION.".to_string()),
        Just("PROCEDURE DIVISION".to_string()),
        Just("END PROGRAM".to_string()),
        Just("END".to_string()),
        Just(".".to_string()),
        Just("'QUOTED LITERAL'".to_string()),
        Just("\"UNTERMINATED".to_string()),
        Just("*> floating comment".to_string()),
        Just("PIC X(10).".to_string()),
        Just("MOVE 1 TO DIVISOR.".to_string()),
        Just("DIVISION-CODE".to_string()),
        Just("END-PROGRAM-FLAG".to_string()),
        "[A-Z][A-Z0-9-]{0,8}",
        "[#%&;,]{1,3}",
    ]
}

fn separator_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(" ".to_string()),
        Just("\n".to_string()),
        Just("\r\n".to_string()),
        Just("\t".to_string()),
        Just(String::new()),
    ]
}

fn source_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec((fragment_strategy(), separator_strategy()), 0..40).prop_map(|parts| {
        parts
            .into_iter()
            .map(|(fragment, separator)| format!("{fragment}{separator}"))
            .collect()
    })
}

fn lookalike_statement_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "    MOVE 1 TO DIVISOR.\n",
        "    MOVE 'A' TO DIVISION-CODE.\n",
        "    MOVE 'Y' TO END-PROGRAM-FLAG.\n",
        "    DIVIDE DIVISOR INTO WS-DIVISION.\n",
        "    IF DIVISION-CODE = 'X' DISPLAY DIVISOR END-IF.\n",
    ])
}

fn keyword_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "IDENTIFICATION",
        "ENVIRONMENT",
        "DATA",
        "PROCEDURE",
        "DIVISION",
        "PROGRAM-ID",
        "RECURSIVE",
    ])
}

fn random_case(word: &str, mask: &[bool]) -> String {
    word.chars()
        .zip(mask.iter().cycle())
        .map(|(c, lower)| if *lower { c.to_ascii_lowercase() } else { c })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn test_every_token_ends_up_in_the_tree(source in source_strategy()) {
        let result = parse_source(&source);
        let lexer = CobolLexer::new(&source);
        prop_assert_eq!(leaf_count(result.root()), lexer.tokens().len());
        prop_assert_eq!(leaf_text(result.root()), source);
    }

    #[test]
    fn test_skipped_nodes_never_adjacent(source in source_strategy()) {
        let result = parse_source(&source);
        prop_assert!(adjacent_skipped(result.root()).is_empty());
    }

    #[test]
    fn test_diagnostics_point_into_the_source(source in source_strategy()) {
        let result = parse_source(&source);
        for diagnostic in result.diagnostics() {
            prop_assert!(diagnostic.range.span.start <= diagnostic.range.span.end);
            prop_assert!(diagnostic.range.span.end <= source.len());
        }
    }

    #[test]
    fn test_root_is_always_a_source_unit(source in source_strategy()) {
        let result = parse_source(&source);
        prop_assert_eq!(result.root().kind, NodeKind::SourceUnit);
        for program in result.programs() {
            prop_assert!(program.name.is_some());
        }
    }

    #[test]
    fn test_lookalike_statements_leave_structure_intact(
        statements in prop::collection::vec(lookalike_statement_strategy(), 1..12),
    ) {
        let source = format!(
            "ID DIVISION.\nPROGRAM-ID. P.\nDATA DIVISION.\nWORKING-STORAGE SECTION.\n\
             01 DIVISOR PIC 9.\nPROCEDURE DIVISION.\n{}    STOP RUN.\n",
            statements.concat()
        );
        let result = parse_source(&source);
        prop_assert!(result.diagnostics().is_empty(), "{:?}", result.diagnostics());
        prop_assert_eq!(result.programs().len(), 1);
        prop_assert_eq!(leaf_text(result.root()), source);
    }

    #[test]
    fn test_keyword_case_never_matters(
        keyword in keyword_strategy(),
        mask in prop::collection::vec(any::<bool>(), 1..8),
    ) {
        let matcher = SimilarityMatcher::new();
        let written = random_case(keyword, &mask);
        prop_assert_eq!(matcher.compare(&written, keyword), KeywordMatch::Exact);
    }
}
