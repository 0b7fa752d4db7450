use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use axum::Json;
use futures_util::stream::{self, Stream, StreamExt};

use crate::api::{fail, ApiError};
use crate::models::AnswerRequest;
use crate::prompt::{build_context, build_messages, build_system_prompt};
use crate::sanitize::sanitize;
use crate::state::AppState;
use crate::telemetry::{request_id, PipelineEvent, StreamOutcome, TelemetrySink};

/// POST /api/answer — grounded answer endpoint with SSE streaming.
pub async fn answer(
    State(state): State<AppState>,
    Json(req): Json<AnswerRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    // ── Step 1: Validate input ────────────────────────────
    let question = req.prompt.trim().to_string();
    if question.is_empty() {
        return Err(ApiError::Validation("Question is required".to_string()));
    }
    let language = req
        .language
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string);

    let request_id = request_id();
    let started = Instant::now();
    state.telemetry.record(PipelineEvent::RequestReceived {
        request_id: request_id.clone(),
        route: "/api/answer",
        prompt_chars: question.chars().count(),
        language: language.clone(),
    });

    // ── Step 2: Embed the question ────────────────────────
    let embed_started = Instant::now();
    let embedding = state
        .embedder
        .embed(&question)
        .await
        .map_err(|e| fail(&state, &request_id, "embedding", e))?;
    state.telemetry.record(PipelineEvent::EmbeddingComplete {
        request_id: request_id.clone(),
        model: state.config.llm.embedding_model.clone(),
        duration_ms: embed_started.elapsed().as_millis() as u64,
        total_tokens: embedding.total_tokens,
    });

    // ── Step 3: Query the vector index ────────────────────
    let query_started = Instant::now();
    let matches = state
        .index
        .query(&embedding.vector, state.config.top_k, true)
        .await
        .map_err(|e| fail(&state, &request_id, "vector_query", e))?;
    state.telemetry.record(PipelineEvent::VectorQueryComplete {
        request_id: request_id.clone(),
        duration_ms: query_started.elapsed().as_millis() as u64,
        matches: matches.len(),
        top_k: state.config.top_k,
    });

    // ── Step 4: Build prompt ──────────────────────────────
    let context = build_context(&matches);
    let system_prompt = build_system_prompt(&state.config.org_name, language.as_deref());
    let messages = build_messages(system_prompt, &context, &question);

    // ── Step 5: Start the completion stream ───────────────
    let llm_stream = state
        .chat
        .stream_chat(messages)
        .await
        .map_err(|e| fail(&state, &request_id, "completion", e))?;

    // ── Step 6: Optional debug frame with the raw matches ─
    let head = if state.config.debug_frame {
        Some(AnswerFrame::Debug(serde_json::json!({ "matches": matches })))
    } else {
        None
    };

    // ── Step 7: Map deltas to SSE frames with idle timeout ─
    let idle_timeout = Duration::from_secs(state.config.idle_timeout_secs);
    let telemetry = state.telemetry.clone();
    let rid = request_id.clone();

    let frame_stream = stream::unfold(
        (llm_stream, idle_timeout, false),
        move |(mut llm_stream, timeout, closed)| {
            let telemetry = telemetry.clone();
            let rid = rid.clone();
            async move {
                if closed {
                    return None;
                }
                match tokio::time::timeout(timeout, llm_stream.next()).await {
                    Ok(Some(Ok(content))) => Some((
                        AnswerFrame::Delta(sanitize(&content)),
                        (llm_stream, timeout, false),
                    )),
                    Ok(Some(Err(e))) => {
                        telemetry.record(PipelineEvent::PipelineError {
                            request_id: rid,
                            stage: "completion",
                            message: format!("{e:#}"),
                        });
                        Some((
                            AnswerFrame::Error("The answer stream was interrupted".to_string()),
                            (llm_stream, timeout, true),
                        ))
                    }
                    Ok(None) => Some((AnswerFrame::Done, (llm_stream, timeout, true))),
                    Err(_) => {
                        telemetry.record(PipelineEvent::PipelineError {
                            request_id: rid,
                            stage: "completion",
                            message: format!(
                                "No delta received for {}s, truncating stream",
                                timeout.as_secs()
                            ),
                        });
                        Some((
                            AnswerFrame::Error("The answer stream timed out".to_string()),
                            (llm_stream, timeout, true),
                        ))
                    }
                }
            }
        },
    );

    // The guard lives inside the SSE stream so stream-close telemetry fires
    // even when the client disconnects and the stream is simply dropped.
    let mut guard = StreamTelemetry::new(state.telemetry.clone(), request_id, started);
    let event_stream = stream::iter(head).chain(frame_stream).map(move |frame| {
        guard.observe(&frame);
        Ok::<Event, Infallible>(frame.to_event())
    });

    Ok(Sse::new(event_stream))
}

// ─── SSE frames ──────────────────────────────────────────

/// The answer stream's wire vocabulary. Every frame is an unnamed SSE
/// `data:` line carrying one of these JSON payloads.
enum AnswerFrame {
    Debug(serde_json::Value),
    Delta(String),
    Error(String),
    Done,
}

impl AnswerFrame {
    fn payload(&self) -> serde_json::Value {
        match self {
            AnswerFrame::Debug(value) => serde_json::json!({ "debug": value }),
            AnswerFrame::Delta(text) => serde_json::json!({ "delta": text }),
            AnswerFrame::Error(message) => serde_json::json!({ "error": message }),
            AnswerFrame::Done => serde_json::json!({ "done": true }),
        }
    }

    fn to_event(&self) -> Event {
        Event::default().json_data(self.payload()).unwrap()
    }
}

// ─── Stream-close telemetry ──────────────────────────────

/// Counts forwarded frames and reports how the stream ended. Emission
/// happens in Drop: a stream abandoned by the client still reports, with
/// outcome `Aborted` because no terminal frame was ever observed.
struct StreamTelemetry {
    telemetry: Arc<dyn TelemetrySink>,
    request_id: String,
    started: Instant,
    chunks: usize,
    chars: usize,
    outcome: StreamOutcome,
}

impl StreamTelemetry {
    fn new(telemetry: Arc<dyn TelemetrySink>, request_id: String, started: Instant) -> Self {
        Self {
            telemetry,
            request_id,
            started,
            chunks: 0,
            chars: 0,
            outcome: StreamOutcome::Aborted,
        }
    }

    fn observe(&mut self, frame: &AnswerFrame) {
        match frame {
            AnswerFrame::Delta(text) => {
                self.chunks += 1;
                self.chars += text.chars().count();
            }
            AnswerFrame::Error(_) => self.outcome = StreamOutcome::Failed,
            AnswerFrame::Done => self.outcome = StreamOutcome::Completed,
            AnswerFrame::Debug(_) => {}
        }
    }
}

impl Drop for StreamTelemetry {
    fn drop(&mut self) {
        self.telemetry.record(PipelineEvent::StreamClosed {
            request_id: std::mem::take(&mut self.request_id),
            outcome: self.outcome,
            duration_ms: self.started.elapsed().as_millis() as u64,
            chunks: self.chunks,
            chars: self.chars,
        });
    }
}
