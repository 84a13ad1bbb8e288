//! Document store
//!
//!     Maps each open document's uri to its latest committed model. The map is a `DashMap`, so
//!     request handlers and analysis completions touch it concurrently without a global lock; each
//!     uri's entry is independent of every other.
//!
//!     Every open or change takes a stamp from a store-wide monotonic clock. An analysis unit
//!     carries the stamp it was dispatched with, and its result is committed only if that stamp is
//!     still the latest one recorded for the uri. A slow analysis of an older edit can therefore
//!     never overwrite the result of a newer one, and a result that arrives after the document was
//!     closed is dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cobol_analysis::DocumentAnalysis;
use cobol_parser::cobol::ast::Diagnostic;
use dashmap::DashMap;
use lsp_types::Url;

/// Text of a document together with the analysis computed from exactly that text.
///
/// A freshly opened document has no analysis yet; feature queries treat it like an empty result.
#[derive(Debug, Clone)]
pub struct DocumentModel {
    text: Arc<String>,
    analysis: Option<Arc<DocumentAnalysis>>,
}

impl DocumentModel {
    pub fn pending(text: impl Into<String>) -> Self {
        Self {
            text: Arc::new(text.into()),
            analysis: None,
        }
    }

    pub fn analysed(text: impl Into<String>, analysis: DocumentAnalysis) -> Self {
        Self {
            text: Arc::new(text.into()),
            analysis: Some(Arc::new(analysis)),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn analysis(&self) -> Option<&Arc<DocumentAnalysis>> {
        self.analysis.as_ref()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.analysis
            .as_deref()
            .map(DocumentAnalysis::diagnostics)
            .unwrap_or(&[])
    }
}

/// What happened to an analysis result handed to [`DocumentStore::commit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// A newer open or change was recorded after this analysis was dispatched.
    Superseded { latest: u64 },
    /// The document is not open.
    Closed,
}

#[derive(Debug)]
struct DocumentEntry {
    stamp: u64,
    model: DocumentModel,
}

#[derive(Debug, Default)]
pub struct DocumentStore {
    entries: DashMap<Url, DocumentEntry>,
    clock: AtomicU64,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Register a newly opened document with a pending model, replacing any previous entry.
    pub fn open(&self, uri: Url, text: impl Into<String>) -> u64 {
        let stamp = self.tick();
        self.entries.insert(
            uri,
            DocumentEntry {
                stamp,
                model: DocumentModel::pending(text),
            },
        );
        stamp
    }

    /// Record that a new analysis of `uri` is starting and return its stamp.
    ///
    /// The stored model is left untouched until the analysis commits. For a uri that is not open
    /// the stamp is still issued, but the eventual commit reports [`CommitOutcome::Closed`].
    pub fn begin(&self, uri: &Url) -> u64 {
        let stamp = self.tick();
        if let Some(mut entry) = self.entries.get_mut(uri) {
            entry.stamp = stamp;
        }
        stamp
    }

    /// Replace the model wholesale if `stamp` is still the latest for `uri`.
    pub fn commit(&self, uri: &Url, stamp: u64, model: DocumentModel) -> CommitOutcome {
        let Some(mut entry) = self.entries.get_mut(uri) else {
            return CommitOutcome::Closed;
        };
        if entry.stamp != stamp {
            return CommitOutcome::Superseded {
                latest: entry.stamp,
            };
        }
        entry.model = model;
        CommitOutcome::Committed
    }

    pub fn get(&self, uri: &Url) -> Option<DocumentModel> {
        self.entries.get(uri).map(|entry| entry.model.clone())
    }

    pub fn contains(&self, uri: &Url) -> bool {
        self.entries.contains_key(uri)
    }

    pub fn remove(&self, uri: &Url) -> bool {
        self.entries.remove(uri).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
