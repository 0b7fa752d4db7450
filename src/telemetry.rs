use chrono::Utc;
use uuid::Uuid;

/// How an answer stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// Natural end-of-stream, `done` frame sent
    Completed,
    /// Terminated with an `error` frame
    Failed,
    /// Client went away before the stream finished
    Aborted,
}

impl StreamOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamOutcome::Completed => "completed",
            StreamOutcome::Failed => "failed",
            StreamOutcome::Aborted => "aborted",
        }
    }
}

/// One observation from the request pipeline. Events carry the request id
/// so a single request's stages can be correlated downstream.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    RequestReceived {
        request_id: String,
        route: &'static str,
        prompt_chars: usize,
        language: Option<String>,
    },
    EmbeddingComplete {
        request_id: String,
        model: String,
        duration_ms: u64,
        total_tokens: Option<u32>,
    },
    VectorQueryComplete {
        request_id: String,
        duration_ms: u64,
        matches: usize,
        top_k: usize,
    },
    StreamClosed {
        request_id: String,
        outcome: StreamOutcome,
        duration_ms: u64,
        chunks: usize,
        chars: usize,
    },
    SimilarServed {
        request_id: String,
        duration_ms: u64,
        matches: usize,
    },
    PipelineError {
        request_id: String,
        stage: &'static str,
        message: String,
    },
}

/// Sink for pipeline observations. Recording is fire-and-forget and
/// infallible: a sink can never fail or slow down the request it observes.
pub trait TelemetrySink: Send + Sync {
    fn record(&self, event: PipelineEvent);
}

/// Production sink: structured `tracing` events. Shipping them anywhere
/// (file, log drain, alerting) is the subscriber's concern.
pub struct TracingTelemetry;

impl TelemetrySink for TracingTelemetry {
    fn record(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::RequestReceived {
                request_id,
                route,
                prompt_chars,
                language,
            } => {
                tracing::info!(
                    %request_id,
                    route,
                    prompt_chars,
                    language = language.as_deref().unwrap_or("-"),
                    "request received"
                );
            }
            PipelineEvent::EmbeddingComplete {
                request_id,
                model,
                duration_ms,
                total_tokens,
            } => {
                tracing::info!(
                    %request_id,
                    %model,
                    duration_ms,
                    total_tokens = total_tokens.unwrap_or(0),
                    "embedding complete"
                );
            }
            PipelineEvent::VectorQueryComplete {
                request_id,
                duration_ms,
                matches,
                top_k,
            } => {
                tracing::info!(%request_id, duration_ms, matches, top_k, "vector query complete");
            }
            PipelineEvent::StreamClosed {
                request_id,
                outcome,
                duration_ms,
                chunks,
                chars,
            } => {
                tracing::info!(
                    %request_id,
                    outcome = outcome.as_str(),
                    duration_ms,
                    chunks,
                    chars,
                    "answer stream closed"
                );
            }
            PipelineEvent::SimilarServed {
                request_id,
                duration_ms,
                matches,
            } => {
                tracing::info!(%request_id, duration_ms, matches, "similarity search served");
            }
            PipelineEvent::PipelineError {
                request_id,
                stage,
                message,
            } => {
                tracing::error!(%request_id, stage, %message, "pipeline stage failed");
            }
        }
    }
}

/// Discards everything. Default sink for tests.
pub struct NoopTelemetry;

impl TelemetrySink for NoopTelemetry {
    fn record(&self, _event: PipelineEvent) {}
}

/// Generate a request id: millisecond timestamp plus a short random suffix,
/// unique enough to grep a single request out of interleaved logs.
pub fn request_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("req_{}_{}", Utc::now().timestamp_millis(), &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_have_prefix_and_differ() {
        let a = request_id();
        let b = request_id();
        assert!(a.starts_with("req_"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_noop_sink_accepts_all_events() {
        let sink = NoopTelemetry;
        sink.record(PipelineEvent::RequestReceived {
            request_id: "req_1".to_string(),
            route: "/api/answer",
            prompt_chars: 12,
            language: None,
        });
        sink.record(PipelineEvent::PipelineError {
            request_id: "req_1".to_string(),
            stage: "embedding",
            message: "boom".to_string(),
        });
    }

    #[test]
    fn test_stream_outcome_labels() {
        assert_eq!(StreamOutcome::Completed.as_str(), "completed");
        assert_eq!(StreamOutcome::Failed.as_str(), "failed");
        assert_eq!(StreamOutcome::Aborted.as_str(), "aborted");
    }
}
