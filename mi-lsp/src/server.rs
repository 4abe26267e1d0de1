//! Main language server implementation

use std::collections::HashMap;
use std::sync::Arc;

use crate::features::semantic_tokens::{
    collect_semantic_tokens, semantic_tokens_legend, SemanticTokensBuilder,
};
use mi_analysis::{Legend, SemanticTokensProvider};
use mi_config::MiConfig;
use tokio::sync::RwLock;
use tower_lsp::async_trait;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    DocumentFilter, InitializeParams, InitializeResult, InitializedParams, SemanticTokens,
    SemanticTokensFullOptions, SemanticTokensOptions, SemanticTokensParams,
    SemanticTokensRangeParams, SemanticTokensRangeResult, SemanticTokensRegistrationOptions,
    SemanticTokensResult, SemanticTokensServerCapabilities, ServerCapabilities, ServerInfo,
    StaticRegistrationOptions, TextDocumentItem, TextDocumentRegistrationOptions,
    TextDocumentSyncCapability, TextDocumentSyncKind, Url, WorkDoneProgressOptions,
};
use tower_lsp::Client;

pub const DEFAULT_LANGUAGE_ID: &str = "mi";

pub trait LspClient: Send + Sync + Clone + 'static {}
impl LspClient for Client {}

pub trait FeatureProvider: Send + Sync + 'static {
    fn legend(&self) -> &Legend;
    fn semantic_tokens(&self, text: &str) -> SemanticTokensBuilder;
}

#[derive(Default)]
pub struct DefaultFeatureProvider {
    tokens: SemanticTokensProvider,
}

impl DefaultFeatureProvider {
    pub fn new(tokens: SemanticTokensProvider) -> Self {
        Self { tokens }
    }
}

impl FeatureProvider for DefaultFeatureProvider {
    fn legend(&self) -> &Legend {
        self.tokens.legend()
    }

    fn semantic_tokens(&self, text: &str) -> SemanticTokensBuilder {
        collect_semantic_tokens(&self.tokens, text)
    }
}

/// Per-process settings derived from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub language_id: String,
    pub range_requests: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            language_id: DEFAULT_LANGUAGE_ID.to_string(),
            range_requests: true,
        }
    }
}

impl From<&MiConfig> for ServerSettings {
    fn from(config: &MiConfig) -> Self {
        Self {
            language_id: config.server.language_id.clone(),
            range_requests: config.semantic_tokens.range,
        }
    }
}

#[derive(Default)]
struct DocumentStore {
    entries: RwLock<HashMap<Url, Arc<String>>>,
}

impl DocumentStore {
    async fn upsert(&self, uri: Url, text: String) {
        self.entries.write().await.insert(uri, Arc::new(text));
    }

    /// Replace the text of a tracked document; untracked documents stay untracked.
    async fn update(&self, uri: &Url, text: String) -> bool {
        match self.entries.write().await.get_mut(uri) {
            Some(entry) => {
                *entry = Arc::new(text);
                true
            }
            None => false,
        }
    }

    async fn get(&self, uri: &Url) -> Option<Arc<String>> {
        self.entries.read().await.get(uri).cloned()
    }

    async fn remove(&self, uri: &Url) {
        self.entries.write().await.remove(uri);
    }
}

pub struct MiLanguageServer<C = Client, P = DefaultFeatureProvider> {
    _client: C,
    settings: ServerSettings,
    documents: DocumentStore,
    features: Arc<P>,
}

impl MiLanguageServer<Client, DefaultFeatureProvider> {
    pub fn new(client: Client, settings: ServerSettings) -> Self {
        Self::with_features(
            client,
            settings,
            Arc::new(DefaultFeatureProvider::default()),
        )
    }
}

impl<C, P> MiLanguageServer<C, P>
where
    C: LspClient,
    P: FeatureProvider,
{
    pub fn with_features(client: C, settings: ServerSettings, features: Arc<P>) -> Self {
        Self {
            _client: client,
            settings,
            documents: DocumentStore::default(),
            features,
        }
    }

    async fn document_text(&self, uri: &Url) -> Option<Arc<String>> {
        self.documents.get(uri).await
    }

    fn semantic_tokens_capability(&self) -> SemanticTokensServerCapabilities {
        let options = SemanticTokensOptions {
            work_done_progress_options: WorkDoneProgressOptions::default(),
            legend: semantic_tokens_legend(self.features.legend()),
            range: Some(self.settings.range_requests),
            full: Some(SemanticTokensFullOptions::Bool(true)),
        };
        SemanticTokensServerCapabilities::SemanticTokensRegistrationOptions(
            SemanticTokensRegistrationOptions {
                text_document_registration_options: TextDocumentRegistrationOptions {
                    document_selector: Some(vec![DocumentFilter {
                        language: Some(self.settings.language_id.clone()),
                        scheme: None,
                        pattern: None,
                    }]),
                },
                semantic_tokens_options: options,
                static_registration_options: StaticRegistrationOptions { id: None },
            },
        )
    }
}

#[async_trait]
impl<C, P> tower_lsp::LanguageServer for MiLanguageServer<C, P>
where
    C: LspClient,
    P: FeatureProvider,
{
    async fn initialize(&self, _: InitializeParams) -> Result<InitializeResult> {
        let capabilities = ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
            semantic_tokens_provider: Some(self.semantic_tokens_capability()),
            ..ServerCapabilities::default()
        };

        tracing::debug!(
            language_id = %self.settings.language_id,
            range = self.settings.range_requests,
            "registering semantic tokens provider"
        );

        Ok(InitializeResult {
            capabilities,
            server_info: Some(ServerInfo {
                name: "mi-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {}

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: tower_lsp::lsp_types::DidOpenTextDocumentParams) {
        let TextDocumentItem {
            uri,
            language_id,
            text,
            ..
        } = params.text_document;
        if language_id != self.settings.language_id {
            tracing::debug!(%uri, %language_id, "ignoring document in another language");
            return;
        }
        tracing::debug!(%uri, "document opened");
        self.documents.upsert(uri, text).await;
    }

    async fn did_change(&self, params: tower_lsp::lsp_types::DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        if let Some(change) = params.content_changes.into_iter().last() {
            if !self.documents.update(&uri, change.text).await {
                tracing::trace!(%uri, "change for untracked document");
            }
        }
    }

    async fn did_close(&self, params: tower_lsp::lsp_types::DidCloseTextDocumentParams) {
        tracing::debug!(uri = %params.text_document.uri, "document closed");
        self.documents.remove(&params.text_document.uri).await;
    }

    async fn semantic_tokens_full(
        &self,
        params: SemanticTokensParams,
    ) -> Result<Option<SemanticTokensResult>> {
        let uri = params.text_document.uri;
        if let Some(text) = self.document_text(&uri).await {
            let data = self.features.semantic_tokens(text.as_str()).build();
            tracing::trace!(%uri, tokens = data.len(), "semantic tokens (full)");
            Ok(Some(SemanticTokensResult::Tokens(SemanticTokens {
                result_id: None,
                data,
            })))
        } else {
            Ok(None)
        }
    }

    async fn semantic_tokens_range(
        &self,
        params: SemanticTokensRangeParams,
    ) -> Result<Option<SemanticTokensRangeResult>> {
        let uri = params.text_document.uri;
        if let Some(text) = self.document_text(&uri).await {
            let data = self
                .features
                .semantic_tokens(text.as_str())
                .build_in_range(&params.range);
            tracing::trace!(%uri, tokens = data.len(), "semantic tokens (range)");
            Ok(Some(SemanticTokensRangeResult::Tokens(SemanticTokens {
                result_id: None,
                data,
            })))
        } else {
            Ok(None)
        }
    }
}
