use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::VectorConfig;
use crate::models::Match;

/// Nearest-neighbour lookup against the knowledge-base index.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<Match>>;
}

// ─── Pinecone-style HTTP index ───────────────────────────

#[derive(Serialize)]
struct QueryRequest<'a> {
    vector: &'a [f32],
    #[serde(rename = "topK")]
    top_k: usize,
    #[serde(rename = "includeMetadata")]
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<Match>,
}

/// Vector index backed by a Pinecone-style `/query` endpoint.
pub struct PineconeIndex {
    client: reqwest::Client,
    config: VectorConfig,
}

impl PineconeIndex {
    pub fn new(client: reqwest::Client, config: VectorConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<Match>> {
        let url = format!("{}/query", self.config.base_url);

        let req = QueryRequest {
            vector,
            top_k,
            include_metadata,
        };

        let mut request = self.client.post(&url).json(&req);
        if let Some(api_key) = self.config.api_key.as_deref() {
            request = request.header("Api-Key", api_key);
        }

        let resp = request
            .send()
            .await
            .context("Failed to call vector index")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Vector index returned {status}: {body}");
        }

        let body: QueryResponse = resp
            .json()
            .await
            .context("Failed to parse vector index response")?;

        Ok(body.matches)
    }
}
