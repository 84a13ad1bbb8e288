//! Testing utilities for parse-tree assertions
//!
//!     COBOL fixtures are easy to get subtly wrong: a missing period after a header silently
//!     turns a division into body text. Tests therefore take their sources from [`samples`],
//!     where each fixture has been checked against the grammar once, and assert on trees with
//!     the helpers below rather than poking at children by index.
//!
//!     The helpers encode the structural guarantees every parse must keep:
//!         - [`leaf_text`]: leaves concatenated in order, to compare against the input
//!         - [`adjacent_skipped`]: pairs of Skipped siblings, which must never exist
//!         - [`kinds_at_depth`]: node kinds at one nesting level, for outline checks

use crate::cobol::ast::{Element, Node, NodeKind};

/// Verified COBOL fixtures.
pub mod samples {
    /// Smallest valid program.
    pub const MINIMAL: &str = "IDENTIFICATION DIVISION.\nPROGRAM-ID. HELLO.\n";

    /// All four divisions with a trailer.
    pub const FULL: &str = "\
IDENTIFICATION DIVISION.
PROGRAM-ID. PAYROLL.
ENVIRONMENT DIVISION.
CONFIGURATION SECTION.
DATA DIVISION.
WORKING-STORAGE SECTION.
01 EMPLOYEE.
   05 EMP-NAME PIC X(30).
   05 EMP-SALARY PIC 9(7)V99.
01 TOTAL PIC 9(9)V99.
PROCEDURE DIVISION.
MAIN-PARA.
    MOVE 0 TO TOTAL.
    ADD EMP-SALARY TO TOTAL.
    DISPLAY EMP-NAME.
    STOP RUN.
END PROGRAM PAYROLL.
";

    /// Program B nested inside program A.
    pub const NESTED: &str = "\
IDENTIFICATION DIVISION.
PROGRAM-ID. A.
PROCEDURE DIVISION.
    CALL 'B'.
IDENTIFICATION DIVISION.
PROGRAM-ID. B.
PROCEDURE DIVISION.
    DISPLAY 'IN B'.
END PROGRAM B.
END PROGRAM A.
";

    /// Two top-level programs in one source.
    pub const SIBLINGS: &str = "\
ID DIVISION.
PROGRAM-ID. FIRST-PROG.
END PROGRAM FIRST-PROG.
ID DIVISION.
PROGRAM-ID. SECOND-PROG.
END PROGRAM SECOND-PROG.
";

    /// A misspelled division header the engine cannot place.
    pub const MISSPELLED_DIVISION: &str = "IDENTIFICATION DIVISION. PROGRAM-ID. A. DTA DIVISION.";
}

/// Concatenated lexemes of every leaf under `node`, in order.
pub fn leaf_text(node: &Node) -> String {
    node.tokens()
        .iter()
        .map(|token| token.lexeme.as_str())
        .collect()
}

/// Number of leaves under `node`.
pub fn leaf_count(node: &Node) -> usize {
    node.tokens().len()
}

/// Every pair of directly adjacent Skipped siblings anywhere in the tree, by parent kind.
pub fn adjacent_skipped(node: &Node) -> Vec<NodeKind> {
    let mut found = Vec::new();
    for (parent, _) in node.walk() {
        let pairs = parent.children.windows(2);
        found.extend(
            pairs
                .filter(|pair| pair.iter().all(Element::is_skipped))
                .map(|_| parent.kind),
        );
    }
    found
}

/// Kinds of the nodes `depth` levels below `node`, in walk order.
pub fn kinds_at_depth(node: &Node, depth: usize) -> Vec<NodeKind> {
    node.walk()
        .into_iter()
        .filter(|(_, d)| *d == depth)
        .map(|(n, _)| n.kind)
        .collect()
}

/// First node of `kind` in walk order, panicking with the tree outline when absent.
pub fn expect_node(node: &Node, kind: NodeKind) -> &Node {
    node.walk()
        .into_iter()
        .map(|(n, _)| n)
        .find(|n| n.kind == kind)
        .unwrap_or_else(|| panic!("no {kind} in tree:\n{}", crate::cobol::formats::to_treeviz_str(node)))
}
