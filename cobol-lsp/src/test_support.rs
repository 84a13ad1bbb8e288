use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use cobol_analysis::DocumentAnalysis;
use cobol_config::{load_defaults, DocumentsConfig};
use lsp_types::{Diagnostic, Url};
use tower_lsp::async_trait;

use crate::communications::Communications;
use crate::engine::{DefaultEngine, EngineError, LanguageEngine};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event {
    ExtensionUnsupported(String),
    EngineNotFound(String),
    LoadingInProgress(Url),
    ProgressCancelled(Url),
    Diagnostics(Url, Vec<Diagnostic>),
    DocumentAnalysed(Url),
}

#[derive(Debug, Default)]
pub(crate) struct RecordingCommunications {
    events: Mutex<Vec<Event>>,
}

impl RecordingCommunications {
    pub(crate) fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, predicate: impl Fn(&Event) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| predicate(e)).count()
    }

    pub(crate) fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl Communications for RecordingCommunications {
    async fn notify_extension_unsupported(&self, extension: &str) {
        self.record(Event::ExtensionUnsupported(extension.to_string()));
    }

    async fn notify_engine_not_found(&self, language_id: &str) {
        self.record(Event::EngineNotFound(language_id.to_string()));
    }

    async fn notify_loading_in_progress(&self, uri: &Url) {
        self.record(Event::LoadingInProgress(uri.clone()));
    }

    async fn cancel_progress_notification(&self, uri: &Url) {
        self.record(Event::ProgressCancelled(uri.clone()));
    }

    async fn publish_diagnostics(&self, uri: &Url, diagnostics: Vec<Diagnostic>) {
        self.record(Event::Diagnostics(uri.clone(), diagnostics));
    }

    async fn notify_document_analysed(&self, uri: &Url) {
        self.record(Event::DocumentAnalysed(uri.clone()));
    }
}

/// Parser-backed engine whose behavior can be steered from the document text.
#[derive(Debug, Default)]
pub(crate) struct FlakyEngine;

impl FlakyEngine {
    pub(crate) const SLOW_MARKER: &'static str = "*> slow\n";
    pub(crate) const FAIL_MARKER: &'static str = "*> fail\n";
    pub(crate) const PANIC_MARKER: &'static str = "*> panic\n";
}

impl LanguageEngine for FlakyEngine {
    fn analyze(&self, text: &str) -> Result<DocumentAnalysis, EngineError> {
        if text.contains(Self::PANIC_MARKER) {
            panic!("engine exploded");
        }
        if text.contains(Self::FAIL_MARKER) {
            return Err(EngineError::Failed("requested failure".into()));
        }
        if text.contains(Self::SLOW_MARKER) {
            thread::sleep(Duration::from_millis(150));
        }
        DefaultEngine.analyze(text)
    }
}

pub(crate) fn cobol_uri() -> Url {
    Url::parse("file:///work/payroll.cbl").unwrap()
}

pub(crate) fn documents_config() -> DocumentsConfig {
    load_defaults().unwrap().documents
}
