//! Persisted submission API handlers

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::db::submissions::{StoredSubmission, SubmissionSummary};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /api/submissions
///
/// Summaries of persisted submissions, most recently finished first.
pub async fn list_submissions(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<SubmissionSummary>>> {
    let summaries = crate::db::submissions::list_submissions(&state.db).await?;
    Ok(Json(summaries))
}

/// GET /api/submissions/{id}
///
/// One persisted submission with its full section history.
pub async fn get_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StoredSubmission>> {
    let stored = crate::db::submissions::load_submission(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Submission not found: {}", id)))?;

    Ok(Json(stored))
}

/// Build persisted submission routes
pub fn submission_routes() -> Router<AppState> {
    Router::new()
        .route("/api/submissions", get(list_submissions))
        .route("/api/submissions/:id", get(get_submission))
}
