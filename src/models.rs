use serde::{Deserialize, Serialize};

/// Answer request. `query`/`lang` are accepted as aliases because earlier
/// deployments of this service used those field names.
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerRequest {
    #[serde(default, alias = "query")]
    pub prompt: String,
    /// Response language (e.g. "French"). When absent the model answers in
    /// whatever language it sees fit.
    #[serde(default, alias = "lang")]
    pub language: Option<String>,
}

/// Similarity search request
#[derive(Debug, Clone, Deserialize)]
pub struct SimilarRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_similar_top_k")]
    pub top_k: usize,
}

fn default_similar_top_k() -> usize {
    5
}

/// A single chat turn sent to the completion provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// One retrieved chunk, ranked by the vector index (highest similarity
/// first). Read-only once returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub score: f32,
    #[serde(default)]
    pub metadata: MatchMetadata,
}

/// Metadata stored alongside each vector. Only `text` is guaranteed by the
/// ingestion side; everything else depends on how the chunk was indexed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchMetadata {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// One hit in the similarity search response
#[derive(Debug, Clone, Serialize)]
pub struct SimilarHit {
    pub id: String,
    pub score: f32,
    pub text: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub source: Option<String>,
}

/// Similarity search response
#[derive(Debug, Clone, Serialize)]
pub struct SimilarResponse {
    pub query: String,
    pub matches: Vec<SimilarHit>,
}

/// JSON error body for non-streaming failures
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
