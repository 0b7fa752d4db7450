pub mod chat_stream;
pub mod embeddings;
