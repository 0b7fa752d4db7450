use std::time::Instant;

use axum::extract::State;
use axum::Json;

use crate::api::{fail, ApiError};
use crate::metadata::PageCatalog;
use crate::models::{Match, SimilarHit, SimilarRequest, SimilarResponse};
use crate::state::AppState;
use crate::telemetry::{request_id, PipelineEvent};

const MAX_SIMILAR_TOP_K: usize = 20;

/// POST /api/similar — plain nearest-neighbour search, no generation.
pub async fn similar(
    State(state): State<AppState>,
    Json(req): Json<SimilarRequest>,
) -> Result<Json<SimilarResponse>, ApiError> {
    // ── Step 1: Validate input ────────────────────────────
    let query = req.query.trim().to_string();
    if query.is_empty() {
        return Err(ApiError::Validation("Query is required".to_string()));
    }
    let top_k = req.top_k.clamp(1, MAX_SIMILAR_TOP_K);

    let request_id = request_id();
    let started = Instant::now();
    state.telemetry.record(PipelineEvent::RequestReceived {
        request_id: request_id.clone(),
        route: "/api/similar",
        prompt_chars: query.chars().count(),
        language: None,
    });

    // ── Step 2: Embed the query ───────────────────────────
    let embed_started = Instant::now();
    let embedding = state
        .embedder
        .embed(&query)
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
        .query(&embedding.vector, top_k, true)
        .await
        .map_err(|e| fail(&state, &request_id, "vector_query", e))?;
    state.telemetry.record(PipelineEvent::VectorQueryComplete {
        request_id: request_id.clone(),
        duration_ms: query_started.elapsed().as_millis() as u64,
        matches: matches.len(),
        top_k,
    });

    // ── Step 4: Enrich and respond ────────────────────────
    let hits: Vec<SimilarHit> = matches
        .into_iter()
        .map(|m| to_hit(m, state.catalog.as_deref()))
        .collect();

    state.telemetry.record(PipelineEvent::SimilarServed {
        request_id,
        duration_ms: started.elapsed().as_millis() as u64,
        matches: hits.len(),
    });

    Ok(Json(SimilarResponse {
        query,
        matches: hits,
    }))
}

/// Flatten a match into a response hit, filling title/url from the page
/// catalog when the index metadata lacks them. A missing catalog or a
/// lookup miss just leaves the fields empty.
fn to_hit(m: Match, catalog: Option<&PageCatalog>) -> SimilarHit {
    let meta = m.metadata;
    let page = meta
        .source
        .as_deref()
        .and_then(|name| catalog.and_then(|c| c.find(name)));

    SimilarHit {
        id: m.id,
        score: m.score,
        text: meta.text,
        title: meta.title.or_else(|| page.map(|p| p.title.clone())),
        url: meta.url.or_else(|| page.map(|p| p.url.clone())),
        source: meta.source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchMetadata;
    use std::io::Write;

    fn catalog_with(rows: &str) -> PageCatalog {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(format!("name,url,title\n{rows}").as_bytes())
            .unwrap();
        file.flush().unwrap();
        PageCatalog::load(file.path()).unwrap()
    }

    fn match_with(source: Option<&str>, title: Option<&str>, url: Option<&str>) -> Match {
        Match {
            id: "chunk-1".to_string(),
            score: 0.9,
            metadata: MatchMetadata {
                text: Some("some text".to_string()),
                title: title.map(str::to_string),
                url: url.map(str::to_string),
                source: source.map(str::to_string),
            },
        }
    }

    #[test]
    fn test_hit_fills_title_and_url_from_catalog() {
        let catalog = catalog_with("visit-us,https://example.org/visit,Visit us\n");
        let hit = to_hit(match_with(Some("visit-us"), None, None), Some(&catalog));
        assert_eq!(hit.title.as_deref(), Some("Visit us"));
        assert_eq!(hit.url.as_deref(), Some("https://example.org/visit"));
        assert_eq!(hit.source.as_deref(), Some("visit-us"));
    }

    #[test]
    fn test_hit_keeps_index_metadata_over_catalog() {
        let catalog = catalog_with("visit-us,https://example.org/visit,Visit us\n");
        let hit = to_hit(
            match_with(Some("visit-us"), Some("Indexed title"), Some("https://indexed")),
            Some(&catalog),
        );
        assert_eq!(hit.title.as_deref(), Some("Indexed title"));
        assert_eq!(hit.url.as_deref(), Some("https://indexed"));
    }

    #[test]
    fn test_hit_tolerates_missing_catalog_and_unknown_source() {
        let hit = to_hit(match_with(Some("unknown-page"), None, None), None);
        assert!(hit.title.is_none());
        assert!(hit.url.is_none());

        let catalog = catalog_with("other,https://example.org/other,Other\n");
        let hit = to_hit(match_with(Some("unknown-page"), None, None), Some(&catalog));
        assert!(hit.title.is_none());
    }

    #[test]
    fn test_hit_without_source_skips_lookup() {
        let catalog = catalog_with("visit-us,https://example.org/visit,Visit us\n");
        let hit = to_hit(match_with(None, None, None), Some(&catalog));
        assert!(hit.title.is_none());
        assert!(hit.source.is_none());
    }
}
