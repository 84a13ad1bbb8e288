use crate::document::DocumentAnalysis;

/// Program used by feature tests: nested units, data hierarchy, paragraphs.
pub const SAMPLE: &str = "\
IDENTIFICATION DIVISION.
PROGRAM-ID. ORDERS.
DATA DIVISION.
WORKING-STORAGE SECTION.
01 ORDER-REC.
   05 ORDER-ID PIC 9(6).
   05 ORDER-STATUS PIC X.
      88 ORDER-OPEN VALUE 'O'.
PROCEDURE DIVISION.
MAIN-PARA.
    MOVE 1 TO ORDER-ID.
    PERFORM SHOW-ORDER.
    STOP RUN.
SHOW-ORDER.
    DISPLAY ORDER-ID.
IDENTIFICATION DIVISION.
PROGRAM-ID. HELPER.
END PROGRAM HELPER.
END PROGRAM ORDERS.
";

pub fn sample_source() -> &'static str {
    SAMPLE
}

pub fn sample_analysis() -> DocumentAnalysis {
    DocumentAnalysis::from_source(SAMPLE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_is_clean() {
        let analysis = sample_analysis();
        assert!(analysis.diagnostics().is_empty(), "{:?}", analysis.diagnostics());
        assert_eq!(analysis.index().programs().len(), 2);
        assert_eq!(analysis.index().labels().len(), 2);
        assert_eq!(analysis.index().data_items().len(), 4);
    }
}
