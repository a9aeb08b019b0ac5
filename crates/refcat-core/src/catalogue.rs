// ── Catalogue facade ──
//
// Entry point for UI consumers. Holds one shared source and vends the
// per-consumer state machines built on it: retrieval hooks, choice
// controls and the management console.

use std::sync::Arc;

use refcat_api::CatalogueClient;
use tracing::info;

use crate::choice::{ChoiceControl, ChoiceProps};
use crate::config::CatalogueConfig;
use crate::console::CatalogueConsole;
use crate::error::CoreError;
use crate::retrieval::{Retrieval, RetrievalSnapshot};
use crate::source::CatalogueSource;

/// Shared handle to a catalogue source. Cheap to clone.
pub struct Catalogue<S: CatalogueSource = CatalogueClient> {
    source: Arc<S>,
}

impl<S: CatalogueSource> Clone for Catalogue<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl Catalogue<CatalogueClient> {
    /// Build an HTTP-backed catalogue. No request is made until a consumer
    /// asks for data.
    pub fn connect(config: &CatalogueConfig) -> Result<Self, CoreError> {
        let client = config.client()?;
        info!(base_url = %client.base_url(), "catalogue client ready");
        Ok(Self::new(client))
    }

    pub fn client(&self) -> &CatalogueClient {
        &self.source
    }
}

impl<S: CatalogueSource> Catalogue<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    pub fn from_shared(source: Arc<S>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// A retrieval hook with no data type yet.
    pub fn retrieval(&self) -> Retrieval<S> {
        Retrieval::new(Arc::clone(&self.source))
    }

    /// A retrieval hook already loading `data_type`.
    pub fn watch(&self, data_type: impl Into<String>) -> Retrieval<S> {
        Retrieval::mount(Arc::clone(&self.source), data_type)
    }

    pub fn choice(&self, props: ChoiceProps) -> ChoiceControl<S> {
        ChoiceControl::new(Arc::clone(&self.source), props)
    }

    pub fn console(&self) -> CatalogueConsole<S> {
        CatalogueConsole::new(Arc::clone(&self.source))
    }

    /// Load one type to completion, with the same fallback behaviour as a
    /// mounted hook. Used by one-shot consumers such as the CLI.
    pub async fn resolve(&self, data_type: impl Into<String>) -> RetrievalSnapshot {
        let hook = self.watch(data_type);
        let mut stream = hook.subscribe();
        stream.settled().await.unwrap_or_else(|| hook.snapshot())
    }
}
