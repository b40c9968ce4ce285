//! GET /api/v1/tasks - Task variants offered in step 1.

use std::time::Instant;

use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use bandscore_types::task::TaskVariant;

use crate::http::response::ApiResponse;

#[derive(Debug, Serialize)]
pub struct TaskInfo {
    pub task: TaskVariant,
    pub label: &'static str,
    pub minimum_words: usize,
}

pub async fn list_tasks() -> Json<ApiResponse<Vec<TaskInfo>>> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let tasks = TaskVariant::ALL
        .iter()
        .map(|variant| TaskInfo {
            task: *variant,
            label: variant.label(),
            minimum_words: variant.minimum_words(),
        })
        .collect();

    let elapsed = start.elapsed().as_millis() as u64;
    Json(ApiResponse::success(tasks, request_id, elapsed).with_link("self", "/api/v1/tasks"))
}
