pub mod answer;
pub mod similar;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::models::ErrorBody;
use crate::state::AppState;
use crate::telemetry::PipelineEvent;

/// What a handler is allowed to tell the client. Validation errors carry
/// their message; upstream failures collapse to a generic body plus the
/// failed stage name, with the real cause kept for logs and telemetry.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{stage} stage failed: {source}")]
    Upstream {
        stage: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ApiError {
    pub fn upstream(stage: &'static str, source: anyhow::Error) -> Self {
        ApiError::Upstream { stage, source }
    }
}

/// Record the failed stage, then surface the generic 500.
pub(crate) fn fail(
    state: &AppState,
    request_id: &str,
    stage: &'static str,
    source: anyhow::Error,
) -> ApiError {
    state.telemetry.record(PipelineEvent::PipelineError {
        request_id: request_id.to_string(),
        stage,
        message: format!("{source:#}"),
    });
    ApiError::upstream(stage, source)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: message,
                    details: None,
                },
            ),
            ApiError::Upstream { stage, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "An error occurred while processing your request".to_string(),
                    details: Some(stage.to_string()),
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_is_400_with_message() {
        let response = ApiError::Validation("Question is required".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Question is required");
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn test_upstream_error_is_500_and_generic() {
        let response =
            ApiError::upstream("embedding", anyhow::anyhow!("401 from https://api.example.com"))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "An error occurred while processing your request");
        assert_eq!(json["details"], "embedding");
        // The upstream cause never reaches the client
        assert!(!json.to_string().contains("api.example.com"));
    }
}
