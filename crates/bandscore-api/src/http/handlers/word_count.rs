//! POST /api/v1/word-count - Live word count for the compose step.

use std::time::Instant;

use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bandscore_core::word_count::{check_word_count, count_words};
use bandscore_types::task::TaskVariant;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct WordCountRequest {
    #[serde(default)]
    pub text: String,
    /// Task tag; when present the minimum check is included.
    pub task: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WordCountResponse {
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meets_minimum: Option<bool>,
}

pub async fn word_count(
    Json(body): Json<WordCountRequest>,
) -> Result<Json<ApiResponse<WordCountResponse>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let result = match body.task.as_deref() {
        Some(tag) => {
            let variant: TaskVariant = tag.parse().map_err(AppError::Validation)?;
            let check = check_word_count(&body.text, variant);
            WordCountResponse {
                count: check.count,
                minimum: Some(check.minimum),
                meets_minimum: Some(check.meets_minimum),
            }
        }
        None => WordCountResponse {
            count: count_words(&body.text),
            minimum: None,
            meets_minimum: None,
        },
    };

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(result, request_id, elapsed)))
}
