//! Client notifications
//!
//!     Everything the server tells the client outside of request/response pairs goes through
//!     [`Communications`]. The orchestrator only depends on the trait; the tower-lsp [`Client`]
//!     implements it for the real server and tests substitute a recording double.

use lsp_types::notification::{Notification, Progress};
use lsp_types::request::WorkDoneProgressCreate;
use lsp_types::{
    Diagnostic, MessageType, NumberOrString, ProgressParams, ProgressParamsValue, Url,
    WorkDoneProgress, WorkDoneProgressBegin, WorkDoneProgressCreateParams, WorkDoneProgressEnd,
};
use serde::{Deserialize, Serialize};
use tower_lsp::async_trait;
use tower_lsp::Client;
use tracing::debug;

#[async_trait]
pub trait Communications: Send + Sync + 'static {
    async fn notify_extension_unsupported(&self, extension: &str);
    async fn notify_engine_not_found(&self, language_id: &str);
    async fn notify_loading_in_progress(&self, uri: &Url);
    async fn cancel_progress_notification(&self, uri: &Url);
    async fn publish_diagnostics(&self, uri: &Url, diagnostics: Vec<Diagnostic>);
    async fn notify_document_analysed(&self, uri: &Url);
}

/// `cobol/documentAnalysed`: sent once an opened document finishes analysis without findings.
#[derive(Debug)]
pub enum DocumentAnalysed {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAnalysedParams {
    pub uri: Url,
}

impl Notification for DocumentAnalysed {
    type Params = DocumentAnalysedParams;
    const METHOD: &'static str = "cobol/documentAnalysed";
}

fn progress_token(uri: &Url) -> NumberOrString {
    NumberOrString::String(format!("cobol-analysis:{uri}"))
}

#[async_trait]
impl Communications for Client {
    async fn notify_extension_unsupported(&self, extension: &str) {
        self.show_message(
            MessageType::WARNING,
            format!("Files with extension '{extension}' are not supported by the COBOL language server"),
        )
        .await;
    }

    async fn notify_engine_not_found(&self, language_id: &str) {
        self.show_message(
            MessageType::ERROR,
            format!("No analysis engine is available for language '{language_id}'"),
        )
        .await;
    }

    async fn notify_loading_in_progress(&self, uri: &Url) {
        let token = progress_token(uri);
        let created = self
            .send_request::<WorkDoneProgressCreate>(WorkDoneProgressCreateParams {
                token: token.clone(),
            })
            .await;
        if let Err(err) = created {
            debug!(%uri, error = %err, "client refused progress token");
            return;
        }
        self.send_notification::<Progress>(ProgressParams {
            token,
            value: ProgressParamsValue::WorkDone(WorkDoneProgress::Begin(WorkDoneProgressBegin {
                title: "Analysing COBOL source".to_string(),
                cancellable: Some(false),
                message: Some(uri.to_string()),
                percentage: None,
            })),
        })
        .await;
    }

    async fn cancel_progress_notification(&self, uri: &Url) {
        self.send_notification::<Progress>(ProgressParams {
            token: progress_token(uri),
            value: ProgressParamsValue::WorkDone(WorkDoneProgress::End(WorkDoneProgressEnd {
                message: None,
            })),
        })
        .await;
    }

    async fn publish_diagnostics(&self, uri: &Url, diagnostics: Vec<Diagnostic>) {
        Client::publish_diagnostics(self, uri.clone(), diagnostics, None).await;
    }

    async fn notify_document_analysed(&self, uri: &Url) {
        self.send_notification::<DocumentAnalysed>(DocumentAnalysedParams { uri: uri.clone() })
            .await;
    }
}
