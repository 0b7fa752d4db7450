use std::sync::Arc;

use anyhow::Context;

use crate::config::Config;
use crate::llm::chat_stream::{ChatCompleter, OpenAiChat};
use crate::llm::embeddings::{Embedder, OpenAiEmbedder};
use crate::metadata::PageCatalog;
use crate::telemetry::TelemetrySink;
use crate::vector::{PineconeIndex, VectorIndex};

/// Shared application state. Collaborators are trait objects so handlers
/// never reach for a concrete provider (or a global) directly, and tests
/// can swap in fakes.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub embedder: Arc<dyn Embedder>,
    pub index: Arc<dyn VectorIndex>,
    pub chat: Arc<dyn ChatCompleter>,
    pub catalog: Option<Arc<PageCatalog>>,
    pub telemetry: Arc<dyn TelemetrySink>,
}

impl AppState {
    /// Wire up production collaborators from config. The page catalog is
    /// optional; a configured-but-unreadable catalog fails startup.
    pub fn new(config: Config, telemetry: Arc<dyn TelemetrySink>) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(120))
            .build()?;

        let catalog = match &config.metadata_csv {
            Some(path) => {
                let catalog = PageCatalog::load(path).context("Failed to load page catalog")?;
                tracing::info!(pages = catalog.len(), path = %path.display(), "Loaded page catalog");
                Some(Arc::new(catalog))
            }
            None => None,
        };

        let embedder = OpenAiEmbedder::new(http_client.clone(), config.llm.clone());
        let chat = OpenAiChat::new(http_client.clone(), config.llm.clone());
        let index = PineconeIndex::new(http_client, config.vector.clone());

        Ok(Self {
            config,
            embedder: Arc::new(embedder),
            index: Arc::new(index),
            chat: Arc::new(chat),
            catalog,
            telemetry,
        })
    }
}
