//! On-demand history fetch.
//!
//! POST /api/v1/fetch
//!
//! Pages through the history of the requested chats, answers with the
//! fetched events, and also feeds them into the aggregation pipeline in the
//! background so they end up in a persisted batch like live messages do.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use inbrief_core::ingest::forward;
use inbrief_types::chat::ChatId;
use inbrief_types::event::Event;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for the fetch endpoint. Exactly one of `chat_folder_link`
/// and `chat_ids` must be given.
#[derive(Debug, Deserialize)]
pub struct FetchRequest {
    pub chat_folder_link: Option<String>,
    pub chat_ids: Option<Vec<ChatId>>,
    pub left_bound: DateTime<Utc>,
    pub right_bound: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct FetchResponse {
    pub count: usize,
    pub events: Vec<Event>,
}

/// POST /api/v1/fetch
pub async fn fetch(
    State(state): State<AppState>,
    Json(body): Json<FetchRequest>,
) -> Result<ApiResponse<FetchResponse>, AppError> {
    let started = Instant::now();

    if state.cancel.is_cancelled() {
        return Err(AppError::Unavailable("shutting down".to_string()));
    }

    let events = match (&body.chat_folder_link, &body.chat_ids) {
        (Some(link), None) => {
            state
                .fetcher
                .fetch_folder(link, body.left_bound, body.right_bound)
                .await?
        }
        (None, Some(ids)) if !ids.is_empty() => {
            state
                .fetcher
                .fetch_chats(ids, body.left_bound, body.right_bound)
                .await?
        }
        _ => {
            return Err(AppError::Validation(
                "exactly one of chat_folder_link or a non-empty chat_ids is required".to_string(),
            ));
        }
    };

    tracing::info!(count = events.len(), "fetched history, forwarding to pipeline");
    forward(events.clone(), state.fetch_sink.clone(), state.cancel.clone());

    Ok(ApiResponse::success(
        FetchResponse {
            count: events.len(),
            events,
        },
        started,
    ))
}
