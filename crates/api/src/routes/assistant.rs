//! Assistant query route.
//!
//! The assistant's tool calls arrive as typed [`AssistantQuery`] bodies; the
//! answer comes back both as data and as a sentence it can relay.

use axum::{Json, Router, extract::State, routing::post};
use serde::Serialize;
use stokvel_core::assistant::{AssistantAnswer, AssistantQuery};

use crate::{AppState, error::ApiError};

/// Creates the assistant routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/assistant/query", post(query))
}

/// Answer to one assistant query.
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    /// Structured answer.
    pub answer: AssistantAnswer,
    /// Plain-text rendering of `answer`.
    pub text: String,
}

/// POST `/assistant/query` - Answer a read-only query or withdrawal simulation.
async fn query(
    State(state): State<AppState>,
    Json(query): Json<AssistantQuery>,
) -> Result<Json<QueryResponse>, ApiError> {
    let answer = state
        .assistant
        .answer(query, &state.directory(), &state.withdrawal_store())
        .await?;

    Ok(Json(QueryResponse {
        text: answer.describe(),
        answer,
    }))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{json_request, test_app};
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_unknown_tool_is_rejected() {
        let body = json!({"tool": "delete_everything"});

        let response = test_app()
            .oneshot(json_request("POST", "/api/v1/assistant/query", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_missing_argument_is_rejected() {
        let body = json!({"tool": "get_stokvel"});

        let response = test_app()
            .oneshot(json_request("POST", "/api/v1/assistant/query", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
