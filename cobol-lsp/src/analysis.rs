//! Document analysis orchestrator
//!
//!     Drives the per-document lifecycle from the three text-synchronisation events:
//!
//!     open: the document is classified by the extension of its uri and by its declared language
//!     identifier. A present but unsupported extension is reported once and nothing else happens.
//!     A recognized language identifier registers a pending model, reports that loading is in
//!     progress, and dispatches an analysis. Anything else is reported as "engine not found".
//!
//!     change: always dispatches a fresh analysis. When it commits, the stored model is replaced
//!     wholesale and the new diagnostics are published, even when there are none.
//!
//!     close: removes the model. Analyses still in flight for it are dropped when they finish.
//!
//!     Every analysis runs as its own task; the engine itself runs on the blocking pool. A second
//!     task observes each analysis and logs any failure with the action and uri. Failures never
//!     reach the caller and never poison the store.
//!
//!     Results are committed through [`DocumentStore::commit`], so only the analysis of the most
//!     recent open/change for a uri can replace its model.

use std::any::Any;
use std::sync::Arc;

use cobol_config::DocumentsConfig;
use lsp_types::Url;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, warn};

use crate::communications::Communications;
use crate::convert::to_lsp_diagnostics;
use crate::documents::{CommitOutcome, DocumentModel, DocumentStore};
use crate::engine::{DefaultEngine, EngineError, LanguageEngine};

const ANALYSIS_ACTION: &str = "analysis";

/// Failure of a single analysis unit. Logged, never propagated.
#[derive(Debug, Error)]
pub enum AnalysisFault {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("analysis task panicked: {0}")]
    Panicked(String),
    #[error("analysis task was cancelled")]
    Cancelled,
}

impl From<JoinError> for AnalysisFault {
    fn from(err: JoinError) -> Self {
        if err.is_panic() {
            AnalysisFault::Panicked(panic_message(err.into_panic()))
        } else {
            AnalysisFault::Cancelled
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "non-string panic payload".to_string()
}

/// Which event dispatched an analysis; decides what is sent to the client on commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Open,
    Change,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    UnsupportedExtension(String),
    Recognized,
    EngineNotFound,
}

/// Everything after the last '.' of the uri, if there is one.
pub fn extension_of(uri: &Url) -> Option<&str> {
    let raw = uri.as_str();
    raw.rfind('.').map(|idx| &raw[idx + 1..])
}

pub fn classify(uri: &Url, language_id: &str, config: &DocumentsConfig) -> Classification {
    match extension_of(uri) {
        Some(extension) if !config.accepts_extension(extension) => {
            Classification::UnsupportedExtension(extension.to_string())
        }
        _ if config.accepts_language(language_id) => Classification::Recognized,
        _ => Classification::EngineNotFound,
    }
}

pub struct AnalysisOrchestrator<C, E = DefaultEngine> {
    documents: Arc<DocumentStore>,
    communications: Arc<C>,
    engine: Arc<E>,
    config: DocumentsConfig,
}

impl<C, E> AnalysisOrchestrator<C, E>
where
    C: Communications,
    E: LanguageEngine,
{
    pub fn new(communications: Arc<C>, engine: Arc<E>, config: DocumentsConfig) -> Self {
        Self {
            documents: Arc::new(DocumentStore::new()),
            communications,
            engine,
            config,
        }
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    /// Classify and, when recognized, start analysing a newly opened document.
    ///
    /// Returns the handle of the dispatched analysis, or `None` when nothing was dispatched.
    pub async fn open(&self, uri: Url, language_id: &str, text: String) -> Option<JoinHandle<()>> {
        match classify(&uri, language_id, &self.config) {
            Classification::UnsupportedExtension(extension) => {
                debug!(%uri, %extension, "unsupported extension");
                self.communications
                    .notify_extension_unsupported(&extension)
                    .await;
                None
            }
            Classification::EngineNotFound => {
                debug!(%uri, language_id, "no engine for language");
                self.communications.notify_engine_not_found(language_id).await;
                None
            }
            Classification::Recognized => {
                let stamp = self.documents.open(uri.clone(), text.clone());
                self.communications.notify_loading_in_progress(&uri).await;
                Some(self.dispatch(Trigger::Open, uri, text, stamp))
            }
        }
    }

    pub fn change(&self, uri: Url, text: String) -> JoinHandle<()> {
        let stamp = self.documents.begin(&uri);
        self.dispatch(Trigger::Change, uri, text, stamp)
    }

    pub fn close(&self, uri: &Url) -> bool {
        self.documents.remove(uri)
    }

    fn dispatch(&self, trigger: Trigger, uri: Url, text: String, stamp: u64) -> JoinHandle<()> {
        debug!(%uri, stamp, ?trigger, "dispatching analysis");
        let unit = tokio::spawn(run_unit(
            trigger,
            uri.clone(),
            text,
            stamp,
            Arc::clone(&self.documents),
            Arc::clone(&self.communications),
            Arc::clone(&self.engine),
        ));
        tokio::spawn(async move {
            let outcome = match unit.await {
                Ok(result) => result,
                Err(join) => Err(AnalysisFault::from(join)),
            };
            if let Err(fault) = outcome {
                error!(
                    action = ANALYSIS_ACTION,
                    %uri,
                    error = %fault,
                    "failed while applying {ANALYSIS_ACTION} for {uri}"
                );
            }
        })
    }
}

async fn run_unit<C, E>(
    trigger: Trigger,
    uri: Url,
    text: String,
    stamp: u64,
    documents: Arc<DocumentStore>,
    communications: Arc<C>,
    engine: Arc<E>,
) -> Result<(), AnalysisFault>
where
    C: Communications,
    E: LanguageEngine,
{
    let (text, analysis) = tokio::task::spawn_blocking(move || {
        let analysis = engine.analyze(&text);
        (text, analysis)
    })
    .await?;
    let analysis = analysis?;
    let diagnostics = to_lsp_diagnostics(analysis.diagnostics());

    match documents.commit(&uri, stamp, DocumentModel::analysed(text, analysis)) {
        CommitOutcome::Committed => {
            debug!(%uri, stamp, ?trigger, diagnostics = diagnostics.len(), "committed analysis");
            match trigger {
                Trigger::Open => {
                    communications.cancel_progress_notification(&uri).await;
                    if diagnostics.is_empty() {
                        communications.notify_document_analysed(&uri).await;
                    } else {
                        communications.publish_diagnostics(&uri, diagnostics).await;
                    }
                }
                Trigger::Change => communications.publish_diagnostics(&uri, diagnostics).await,
            }
        }
        CommitOutcome::Superseded { latest } => {
            debug!(%uri, stamp, latest, "dropping superseded analysis");
            if trigger == Trigger::Open {
                communications.cancel_progress_notification(&uri).await;
            }
        }
        CommitOutcome::Closed => {
            warn!(%uri, stamp, "analysis finished after the document was closed");
            if trigger == Trigger::Open {
                communications.cancel_progress_notification(&uri).await;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        cobol_uri, documents_config, Event, FlakyEngine, RecordingCommunications,
    };
    use cobol_parser::cobol::testing::samples;

    fn orchestrator() -> (
        Arc<RecordingCommunications>,
        AnalysisOrchestrator<RecordingCommunications, FlakyEngine>,
    ) {
        let comms = Arc::new(RecordingCommunications::default());
        let orchestrator = AnalysisOrchestrator::new(
            Arc::clone(&comms),
            Arc::new(FlakyEngine::default()),
            documents_config(),
        );
        (comms, orchestrator)
    }

    #[test]
    fn extension_is_text_after_last_dot() {
        let uri = Url::parse("file:///work/src.v2/payroll.cbl").unwrap();
        assert_eq!(extension_of(&uri), Some("cbl"));
        let bare = Url::parse("file:///work/payroll").unwrap();
        assert_eq!(extension_of(&bare), None);
    }

    #[test]
    fn classification_checks_extension_before_language() {
        let config = documents_config();
        let txt = Url::parse("file:///notes/readme.txt").unwrap();
        assert_eq!(
            classify(&txt, "cobol", &config),
            Classification::UnsupportedExtension("txt".into())
        );
        assert_eq!(
            classify(&cobol_uri(), "cobol", &config),
            Classification::Recognized
        );
        let bare = Url::parse("file:///work/payroll").unwrap();
        assert_eq!(classify(&bare, "COBOL", &config), Classification::Recognized);
        assert_eq!(
            classify(&bare, "plaintext", &config),
            Classification::EngineNotFound
        );
        // Extension matching is case-sensitive.
        let upper = Url::parse("file:///work/PAYROLL.CBL").unwrap();
        assert_eq!(
            classify(&upper, "cobol", &config),
            Classification::UnsupportedExtension("CBL".into())
        );
    }

    #[tokio::test]
    async fn unsupported_extension_dispatches_nothing() {
        let (comms, orchestrator) = orchestrator();
        let uri = Url::parse("file:///notes/readme.txt").unwrap();

        let handle = orchestrator.open(uri.clone(), "plaintext", "hello".into()).await;

        assert!(handle.is_none());
        assert_eq!(comms.events(), vec![Event::ExtensionUnsupported("txt".into())]);
        assert!(!orchestrator.documents().contains(&uri));
    }

    #[tokio::test]
    async fn unknown_language_reports_engine_not_found() {
        let (comms, orchestrator) = orchestrator();
        let uri = Url::parse("file:///work/payroll").unwrap();

        let handle = orchestrator.open(uri.clone(), "plaintext", "hello".into()).await;

        assert!(handle.is_none());
        assert_eq!(comms.events(), vec![Event::EngineNotFound("plaintext".into())]);
        assert!(orchestrator.documents().is_empty());
    }

    #[tokio::test]
    async fn clean_open_reports_document_analysed() {
        let (comms, orchestrator) = orchestrator();
        let uri = cobol_uri();

        let handle = orchestrator
            .open(uri.clone(), "cobol", samples::FULL.into())
            .await
            .expect("analysis dispatched");
        handle.await.unwrap();

        assert_eq!(
            comms.events(),
            vec![
                Event::LoadingInProgress(uri.clone()),
                Event::ProgressCancelled(uri.clone()),
                Event::DocumentAnalysed(uri.clone()),
            ]
        );
        let model = orchestrator.documents().get(&uri).unwrap();
        assert!(model.analysis().is_some());
        assert!(model.diagnostics().is_empty());
    }

    #[tokio::test]
    async fn open_with_errors_publishes_diagnostics() {
        let (comms, orchestrator) = orchestrator();
        let uri = cobol_uri();

        orchestrator
            .open(uri.clone(), "cobol", samples::MISSPELLED_DIVISION.into())
            .await
            .unwrap()
            .await
            .unwrap();

        let events = comms.events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1], Event::ProgressCancelled(uri.clone()));
        match &events[2] {
            Event::Diagnostics(published, diagnostics) => {
                assert_eq!(published, &uri);
                assert!(diagnostics.iter().any(|d| d.message.contains("'DTA'")));
            }
            other => panic!("expected diagnostics, got {other:?}"),
        }
        assert_eq!(comms.count(|e| matches!(e, Event::DocumentAnalysed(_))), 0);
    }

    #[tokio::test]
    async fn change_replaces_model_and_publishes_even_when_clean() {
        let (comms, orchestrator) = orchestrator();
        let uri = cobol_uri();
        orchestrator
            .open(uri.clone(), "cobol", samples::MISSPELLED_DIVISION.into())
            .await
            .unwrap()
            .await
            .unwrap();
        comms.clear();

        orchestrator
            .change(uri.clone(), samples::FULL.into())
            .await
            .unwrap();

        assert_eq!(comms.events(), vec![Event::Diagnostics(uri.clone(), Vec::new())]);
        let model = orchestrator.documents().get(&uri).unwrap();
        assert_eq!(model.text(), samples::FULL);
        assert!(model.diagnostics().is_empty());
    }

    #[tokio::test]
    async fn older_analysis_never_overwrites_newer_one() {
        let (comms, orchestrator) = orchestrator();
        let uri = cobol_uri();
        let slow = format!("{}{}", FlakyEngine::SLOW_MARKER, samples::MISSPELLED_DIVISION);

        let first = orchestrator
            .open(uri.clone(), "cobol", slow)
            .await
            .unwrap();
        let second = orchestrator.change(uri.clone(), samples::FULL.into());
        second.await.unwrap();
        first.await.unwrap();

        let model = orchestrator.documents().get(&uri).unwrap();
        assert_eq!(model.text(), samples::FULL);
        assert!(model.diagnostics().is_empty());
        // The superseded open only clears its progress indicator.
        assert_eq!(comms.count(|e| matches!(e, Event::DocumentAnalysed(_))), 0);
        assert_eq!(comms.count(|e| matches!(e, Event::Diagnostics(..))), 1);
        assert_eq!(comms.count(|e| matches!(e, Event::ProgressCancelled(_))), 1);
    }

    #[tokio::test]
    async fn close_drops_in_flight_results() {
        let (comms, orchestrator) = orchestrator();
        let uri = cobol_uri();
        orchestrator
            .open(uri.clone(), "cobol", samples::FULL.into())
            .await
            .unwrap()
            .await
            .unwrap();
        comms.clear();

        let pending = orchestrator.change(
            uri.clone(),
            format!("{}{}", FlakyEngine::SLOW_MARKER, samples::MISSPELLED_DIVISION),
        );
        assert!(orchestrator.close(&uri));
        pending.await.unwrap();

        assert!(comms.events().is_empty());
        assert!(orchestrator.documents().get(&uri).is_none());
    }

    #[tokio::test]
    async fn engine_error_is_contained() {
        let (comms, orchestrator) = orchestrator();
        let uri = cobol_uri();

        let handle = orchestrator
            .open(uri.clone(), "cobol", FlakyEngine::FAIL_MARKER.into())
            .await
            .unwrap();
        assert!(handle.await.is_ok());

        assert_eq!(comms.events(), vec![Event::LoadingInProgress(uri.clone())]);
        assert!(orchestrator.documents().get(&uri).unwrap().analysis().is_none());
    }

    #[tokio::test]
    async fn engine_panic_is_contained_and_store_keeps_working() {
        let (comms, orchestrator) = orchestrator();
        let uri = cobol_uri();

        orchestrator
            .open(uri.clone(), "cobol", FlakyEngine::PANIC_MARKER.into())
            .await
            .unwrap()
            .await
            .expect("observer task must not panic");
        comms.clear();

        orchestrator
            .change(uri.clone(), samples::FULL.into())
            .await
            .unwrap();
        assert_eq!(comms.events(), vec![Event::Diagnostics(uri.clone(), Vec::new())]);
    }

    #[test]
    fn join_panic_message_is_kept() {
        let message = panic_message(Box::new("engine exploded"));
        assert_eq!(message, "engine exploded");
        let owned = panic_message(Box::new(String::from("owned")));
        assert_eq!(owned, "owned");
        assert_eq!(panic_message(Box::new(7_u8)), "non-string panic payload");
    }
}
