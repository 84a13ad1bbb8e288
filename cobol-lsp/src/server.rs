//! Main language server implementation

use std::sync::Arc;

use cobol_analysis::completion::{completion_items, CompletionCandidate};
use cobol_analysis::hover::{hover as compute_hover, HoverResult};
use cobol_analysis::navigation::{
    document_highlights, find_references, goto_definition, CobolHighlight,
};
use cobol_analysis::outline::{collect_document_symbols, CobolDocumentSymbol};
use cobol_analysis::DocumentAnalysis;
use cobol_config::CobolConfig;
use cobol_parser::cobol::ast::{Position as AstPosition, Range as AstRange};
use serde_json::Value;
use tower_lsp::async_trait;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    CompletionItem, CompletionOptions, CompletionParams, CompletionResponse,
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    DocumentHighlight, DocumentHighlightParams, DocumentSymbol, DocumentSymbolParams,
    DocumentSymbolResponse, ExecuteCommandOptions, ExecuteCommandParams, GotoDefinitionParams,
    GotoDefinitionResponse, Hover, HoverContents, HoverParams, HoverProviderCapability,
    InitializeParams, InitializeResult, InitializedParams, Location, MarkupContent, MarkupKind,
    OneOf, ReferenceParams, ServerCapabilities, ServerInfo, TextDocumentItem,
    TextDocumentSyncCapability, TextDocumentSyncKind, Url,
};
use tower_lsp::Client;
use tracing::{debug, info};

use crate::analysis::AnalysisOrchestrator;
use crate::communications::Communications;
use crate::convert::{from_lsp_position, to_document_symbol, to_lsp_range};
use crate::documents::DocumentModel;
use crate::engine::{DefaultEngine, LanguageEngine};
use crate::features::commands::{execute_command, COMMANDS};

pub trait FeatureProvider: Send + Sync + 'static {
    fn document_symbols(&self, analysis: &DocumentAnalysis) -> Vec<CobolDocumentSymbol>;
    fn hover(&self, analysis: &DocumentAnalysis, position: AstPosition) -> Option<HoverResult>;
    fn completion(
        &self,
        analysis: &DocumentAnalysis,
        text: &str,
        position: AstPosition,
        keywords: &[String],
    ) -> Vec<CompletionCandidate>;
    fn definition(&self, analysis: &DocumentAnalysis, position: AstPosition) -> Vec<AstRange>;
    fn references(
        &self,
        analysis: &DocumentAnalysis,
        position: AstPosition,
        include_declaration: bool,
    ) -> Vec<AstRange>;
    fn highlights(&self, analysis: &DocumentAnalysis, position: AstPosition)
        -> Vec<CobolHighlight>;
}

#[derive(Default)]
pub struct DefaultFeatureProvider;

impl DefaultFeatureProvider {
    pub fn new() -> Self {
        Self
    }
}

impl FeatureProvider for DefaultFeatureProvider {
    fn document_symbols(&self, analysis: &DocumentAnalysis) -> Vec<CobolDocumentSymbol> {
        collect_document_symbols(analysis)
    }

    fn hover(&self, analysis: &DocumentAnalysis, position: AstPosition) -> Option<HoverResult> {
        compute_hover(analysis, position)
    }

    fn completion(
        &self,
        analysis: &DocumentAnalysis,
        text: &str,
        position: AstPosition,
        keywords: &[String],
    ) -> Vec<CompletionCandidate> {
        completion_items(analysis, text, position, keywords)
    }

    fn definition(&self, analysis: &DocumentAnalysis, position: AstPosition) -> Vec<AstRange> {
        goto_definition(analysis, position)
    }

    fn references(
        &self,
        analysis: &DocumentAnalysis,
        position: AstPosition,
        include_declaration: bool,
    ) -> Vec<AstRange> {
        find_references(analysis, position, include_declaration)
    }

    fn highlights(
        &self,
        analysis: &DocumentAnalysis,
        position: AstPosition,
    ) -> Vec<CobolHighlight> {
        document_highlights(analysis, position)
    }
}

pub struct CobolLanguageServer<C = Client, P = DefaultFeatureProvider, E = DefaultEngine> {
    orchestrator: AnalysisOrchestrator<C, E>,
    features: Arc<P>,
    config: Arc<CobolConfig>,
}

impl CobolLanguageServer<Client, DefaultFeatureProvider, DefaultEngine> {
    pub fn new(client: Client, config: CobolConfig) -> Self {
        Self::with_parts(
            Arc::new(client),
            Arc::new(DefaultFeatureProvider::new()),
            Arc::new(DefaultEngine::new()),
            config,
        )
    }
}

impl<C, P, E> CobolLanguageServer<C, P, E>
where
    C: Communications,
    P: FeatureProvider,
    E: LanguageEngine,
{
    pub fn with_parts(
        communications: Arc<C>,
        features: Arc<P>,
        engine: Arc<E>,
        config: CobolConfig,
    ) -> Self {
        Self {
            orchestrator: AnalysisOrchestrator::new(
                communications,
                engine,
                config.documents.clone(),
            ),
            features,
            config: Arc::new(config),
        }
    }

    pub fn orchestrator(&self) -> &AnalysisOrchestrator<C, E> {
        &self.orchestrator
    }

    fn model(&self, uri: &Url) -> Option<DocumentModel> {
        self.orchestrator.documents().get(uri)
    }

    /// The committed analysis for `uri`; `None` for unknown or still-pending documents.
    fn analysis(&self, uri: &Url) -> Option<Arc<DocumentAnalysis>> {
        self.model(uri)
            .and_then(|model| model.analysis().map(Arc::clone))
    }
}

fn to_locations(uri: &Url, ranges: &[AstRange]) -> Vec<Location> {
    ranges
        .iter()
        .map(|range| Location::new(uri.clone(), to_lsp_range(range)))
        .collect()
}

fn to_completion_item(candidate: CompletionCandidate) -> CompletionItem {
    CompletionItem {
        label: candidate.label,
        kind: Some(candidate.kind),
        detail: candidate.detail,
        insert_text: candidate.insert_text,
        ..Default::default()
    }
}

fn to_document_highlight(highlight: &CobolHighlight) -> DocumentHighlight {
    DocumentHighlight {
        range: to_lsp_range(&highlight.range),
        kind: Some(highlight.kind),
    }
}

#[async_trait]
impl<C, P, E> tower_lsp::LanguageServer for CobolLanguageServer<C, P, E>
where
    C: Communications,
    P: FeatureProvider,
    E: LanguageEngine,
{
    async fn initialize(&self, _: InitializeParams) -> Result<InitializeResult> {
        let capabilities = ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
            hover_provider: Some(HoverProviderCapability::Simple(true)),
            completion_provider: Some(CompletionOptions::default()),
            definition_provider: Some(OneOf::Left(true)),
            references_provider: Some(OneOf::Left(true)),
            document_highlight_provider: Some(OneOf::Left(true)),
            document_symbol_provider: Some(OneOf::Left(true)),
            execute_command_provider: Some(ExecuteCommandOptions {
                commands: COMMANDS.iter().map(|command| command.to_string()).collect(),
                ..Default::default()
            }),
            ..ServerCapabilities::default()
        };

        Ok(InitializeResult {
            capabilities,
            server_info: Some(ServerInfo {
                name: "cobol-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("COBOL language server initialized");
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let TextDocumentItem {
            uri,
            language_id,
            text,
            ..
        } = params.text_document;
        self.orchestrator.open(uri, &language_id, text).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        if let Some(change) = params.content_changes.into_iter().last() {
            self.orchestrator.change(params.text_document.uri, change.text);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        if !self.orchestrator.close(&uri) {
            debug!(%uri, "close for a document that was not open");
        }
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let target = params.text_document_position_params;
        if let Some(analysis) = self.analysis(&target.text_document.uri) {
            let position = from_lsp_position(target.position);
            if let Some(result) = self.features.hover(&analysis, position) {
                return Ok(Some(Hover {
                    contents: HoverContents::Markup(MarkupContent {
                        kind: MarkupKind::Markdown,
                        value: result.contents,
                    }),
                    range: Some(to_lsp_range(&result.range)),
                }));
            }
        }
        Ok(None)
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let target = params.text_document_position;
        let Some(model) = self.model(&target.text_document.uri) else {
            return Ok(None);
        };
        let Some(analysis) = model.analysis() else {
            return Ok(None);
        };
        let position = from_lsp_position(target.position);
        let items = self
            .features
            .completion(
                analysis,
                model.text(),
                position,
                &self.config.completion.keywords,
            )
            .into_iter()
            .map(to_completion_item)
            .collect();
        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let target = params.text_document_position_params;
        let uri = target.text_document.uri;
        if let Some(analysis) = self.analysis(&uri) {
            let ranges = self
                .features
                .definition(&analysis, from_lsp_position(target.position));
            if !ranges.is_empty() {
                return Ok(Some(GotoDefinitionResponse::Array(to_locations(
                    &uri, &ranges,
                ))));
            }
        }
        Ok(None)
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let target = params.text_document_position;
        let uri = target.text_document.uri;
        if let Some(analysis) = self.analysis(&uri) {
            let ranges = self.features.references(
                &analysis,
                from_lsp_position(target.position),
                params.context.include_declaration,
            );
            return Ok(Some(to_locations(&uri, &ranges)));
        }
        Ok(None)
    }

    async fn document_highlight(
        &self,
        params: DocumentHighlightParams,
    ) -> Result<Option<Vec<DocumentHighlight>>> {
        let target = params.text_document_position_params;
        if let Some(analysis) = self.analysis(&target.text_document.uri) {
            let highlights = self
                .features
                .highlights(&analysis, from_lsp_position(target.position));
            return Ok(Some(highlights.iter().map(to_document_highlight).collect()));
        }
        Ok(None)
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        if let Some(analysis) = self.analysis(&params.text_document.uri) {
            let symbols = self.features.document_symbols(&analysis);
            let converted: Vec<DocumentSymbol> = symbols.iter().map(to_document_symbol).collect();
            Ok(Some(DocumentSymbolResponse::Nested(converted)))
        } else {
            Ok(None)
        }
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<Value>> {
        execute_command(
            self.orchestrator.documents(),
            &params.command,
            &params.arguments,
        )
    }
}
