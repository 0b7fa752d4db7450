use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;

/// A question embedded into the vector space of the knowledge base, together
/// with the token usage the provider reported for the call.
#[derive(Debug, Clone)]
pub struct QueryEmbedding {
    pub vector: Vec<f32>,
    pub prompt_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// Turns question text into an embedding vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<QueryEmbedding>;
}

// ─── OpenAI-compatible ───────────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest {
    model: String,
    input: String,
    encoding_format: &'static str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    #[serde(default)]
    usage: Option<EmbeddingUsage>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct EmbeddingUsage {
    prompt_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

/// Embedder backed by an OpenAI-compatible `/v1/embeddings` endpoint.
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    config: LlmConfig,
}

impl OpenAiEmbedder {
    pub fn new(client: reqwest::Client, config: LlmConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<QueryEmbedding> {
        let url = format!("{}/v1/embeddings", self.config.base_url);

        let req = EmbeddingRequest {
            model: self.config.embedding_model.clone(),
            input: text.to_string(),
            encoding_format: "float",
        };

        let mut request = self.client.post(&url).json(&req);
        if let Some(api_key) = self.config.api_key.as_deref() {
            request = request.header("Authorization", format!("Bearer {api_key}"));
        }

        let resp = request
            .send()
            .await
            .context("Failed to call embeddings API")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Embeddings API returned {status}: {body}");
        }

        let body: EmbeddingResponse = resp
            .json()
            .await
            .context("Failed to parse embeddings response")?;

        let (prompt_tokens, total_tokens) = body
            .usage
            .map(|u| (u.prompt_tokens, u.total_tokens))
            .unwrap_or((None, None));

        let vector = body
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .context("No embedding returned")?;

        Ok(QueryEmbedding {
            vector,
            prompt_tokens,
            total_tokens,
        })
    }
}
