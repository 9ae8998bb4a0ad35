//! Answer editing API handlers
//!
//! Writes land in the in-progress map of the section being edited; photo
//! attachments get their own add/remove endpoints so the client never has
//! to resend a whole list.

use axum::{
    extract::{Path, State},
    routing::{delete, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ApiResult;
use crate::models::{AnswerValue, AttachmentRef};
use crate::AppState;

/// PUT /api/session/answers request: question id to answer value
#[derive(Debug, Deserialize)]
pub struct BatchAnswersRequest {
    pub answers: BTreeMap<i64, AnswerValue>,
}

/// PUT /api/session/answers response
#[derive(Debug, Serialize)]
pub struct BatchAnswersResponse {
    pub updated: usize,
}

/// PUT /api/session/answers/{id} response
#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub id: i64,
    pub answer: AnswerValue,
}

/// POST /api/session/answers/{id}/photos request
#[derive(Debug, Deserialize)]
pub struct AddPhotoRequest {
    pub name: String,
    #[serde(default)]
    pub size_bytes: Option<u64>,
}

/// Attachment add/remove response
#[derive(Debug, Serialize)]
pub struct PhotoCountResponse {
    pub id: i64,
    /// Attachment count after the operation
    pub count: usize,
}

/// PUT /api/session/answers
///
/// Write several answers at once, in ascending id order. The first
/// rejected id aborts the batch; earlier writes remain in place.
pub async fn put_answers(
    State(state): State<AppState>,
    Json(request): Json<BatchAnswersRequest>,
) -> ApiResult<Json<BatchAnswersResponse>> {
    let mut controller = state.controller.write().await;
    let updated = request.answers.len();

    for (id, value) in request.answers {
        controller.set_answer(id, value)?;
    }

    tracing::debug!(updated, "Answer batch applied");

    Ok(Json(BatchAnswersResponse { updated }))
}

/// PUT /api/session/answers/{id}
///
/// Write one answer. The body is the bare answer value: a string, a
/// number, an attachment array, or null to clear.
pub async fn put_answer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(value): Json<AnswerValue>,
) -> ApiResult<Json<AnswerResponse>> {
    let mut controller = state.controller.write().await;
    controller.set_answer(id, value.clone())?;

    Ok(Json(AnswerResponse { id, answer: value }))
}

/// POST /api/session/answers/{id}/photos
///
/// Register one attachment on a photo question.
pub async fn add_photo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<AddPhotoRequest>,
) -> ApiResult<Json<PhotoCountResponse>> {
    let mut controller = state.controller.write().await;
    let count = controller.add_attachment(
        id,
        AttachmentRef {
            name: request.name,
            size_bytes: request.size_bytes,
        },
    )?;

    Ok(Json(PhotoCountResponse { id, count }))
}

/// DELETE /api/session/answers/{id}/photos/{name}
///
/// Remove one attachment by file name.
pub async fn remove_photo(
    State(state): State<AppState>,
    Path((id, name)): Path<(i64, String)>,
) -> ApiResult<Json<PhotoCountResponse>> {
    let mut controller = state.controller.write().await;
    let count = controller.remove_attachment(id, &name)?;

    Ok(Json(PhotoCountResponse { id, count }))
}

/// Build answer editing routes
pub fn answer_routes() -> Router<AppState> {
    Router::new()
        .route("/api/session/answers", put(put_answers))
        .route("/api/session/answers/:id", put(put_answer))
        .route("/api/session/answers/:id/photos", post(add_photo))
        .route("/api/session/answers/:id/photos/:name", delete(remove_photo))
}
