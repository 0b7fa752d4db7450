use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address
    pub bind_addr: String,
    /// Organization whose knowledge base this instance answers for.
    /// Used verbatim in the system prompt.
    pub org_name: String,
    /// How many neighbors to retrieve for answer grounding
    pub top_k: usize,
    /// Emit the vector query result as a leading `debug` SSE frame
    pub debug_frame: bool,
    /// Abort a completion stream after this many seconds without a delta
    pub idle_timeout_secs: u64,
    /// Optional CSV catalog (`name,url,title`) for enriching search hits
    pub metadata_csv: Option<PathBuf>,
    /// Embedding + completion provider configuration
    pub llm: LlmConfig,
    /// Vector index configuration
    pub vector: VectorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL for the OpenAI-compatible API
    pub base_url: String,
    /// API key (omit for keyless local deployments)
    pub api_key: Option<String>,
    /// Model name for chat completions
    pub chat_model: String,
    /// Model name for embeddings
    pub embedding_model: String,
    /// Optional completion token cap
    pub max_tokens: Option<u32>,
    /// Optional sampling temperature
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorConfig {
    /// Index host URL (e.g. "https://my-index-abc123.svc.pinecone.io")
    pub base_url: String,
    /// Index API key
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:9000".to_string(),
            org_name: "the organization".to_string(),
            top_k: 10,
            debug_frame: false,
            idle_timeout_secs: 30,
            metadata_csv: None,
            llm: LlmConfig::default(),
            vector: VectorConfig::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: None,
            chat_model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            max_tokens: None,
            temperature: None,
        }
    }
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8100".to_string(),
            api_key: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("KB_ANSWER_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(name) = std::env::var("KB_ANSWER_ORG_NAME") {
            config.org_name = name;
        }
        if let Ok(val) = std::env::var("KB_ANSWER_TOP_K") {
            if let Ok(v) = val.parse() {
                config.top_k = v;
            }
        }
        if let Ok(val) = std::env::var("KB_ANSWER_DEBUG_FRAME") {
            config.debug_frame = matches!(val.as_str(), "1" | "true" | "yes");
        }
        if let Ok(val) = std::env::var("KB_ANSWER_IDLE_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                config.idle_timeout_secs = v;
            }
        }
        if let Ok(path) = std::env::var("KB_ANSWER_METADATA_CSV") {
            config.metadata_csv = Some(PathBuf::from(path));
        }

        if let Ok(url) = std::env::var("LLM_BASE_URL") {
            config.llm.base_url = url;
        }
        if let Ok(key) = std::env::var("LLM_API_KEY") {
            config.llm.api_key = Some(key);
        }
        if let Ok(model) = std::env::var("LLM_CHAT_MODEL") {
            config.llm.chat_model = model;
        }
        if let Ok(model) = std::env::var("LLM_EMBEDDING_MODEL") {
            config.llm.embedding_model = model;
        }
        if let Ok(val) = std::env::var("LLM_MAX_TOKENS") {
            if let Ok(v) = val.parse() {
                config.llm.max_tokens = Some(v);
            }
        }
        if let Ok(val) = std::env::var("LLM_TEMPERATURE") {
            if let Ok(v) = val.parse() {
                config.llm.temperature = Some(v);
            }
        }

        if let Ok(url) = std::env::var("VECTOR_BASE_URL") {
            config.vector.base_url = url;
        }
        if let Ok(key) = std::env::var("VECTOR_API_KEY") {
            config.vector.api_key = Some(key);
        }

        config
    }
}
