//! # kb-answer
//!
//! A Rust web service that answers questions about an organization from its
//! crawled public documents: retrieval-augmented generation with streaming
//! responses.
//!
//! ## Architecture
//!
//! Each request runs one strictly linear pipeline:
//!
//! ```text
//!   ┌──────────┐    ┌───────────┐    ┌──────────────┐    ┌──────────────┐
//!   │ Question  │───►│ Embedding │───►│ Vector Query │───►│ Prompt Build │
//!   └──────────┘    └───────────┘    └──────────────┘    └──────┬───────┘
//!                                                               │
//!                                                               ▼
//!   ┌──────────────┐    ┌───────────────┐    ┌──────────────────────────┐
//!   │ SSE Response │◄───│   Sanitizer   │◄───│ Streaming Chat Completion │
//!   └──────────────┘    └───────────────┘    └──────────────────────────┘
//! ```
//!
//! No stage retries, no cross-request coordination: a failure before the
//! stream starts maps to an HTTP error, a failure mid-stream to an in-band
//! error frame.
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for server, LLM, and vector index settings
//! - [`models`] - Shared data types: request/response types, `Match`, `ChatMessage`
//! - [`sanitize`] - ASCII normalization applied to context chunks and outbound deltas
//! - [`prompt`] - Context block, grounded system prompt, and message assembly
//! - [`llm::embeddings`] - Question embedding via OpenAI-compatible APIs
//! - [`llm::chat_stream`] - Streaming chat completions, parsed into content deltas
//! - [`vector`] - Nearest-neighbour queries against a Pinecone-style index
//! - [`metadata`] - Optional CSV page catalog for enriching search hits
//! - [`telemetry`] - Fire-and-forget pipeline events behind a sink trait
//! - [`api`] - Axum HTTP handlers: streaming answers and similarity search
//! - [`state`] - Shared application state holding config and collaborators

pub mod api;
pub mod config;
pub mod llm;
pub mod metadata;
pub mod models;
pub mod prompt;
pub mod sanitize;
pub mod state;
pub mod telemetry;
pub mod vector;
