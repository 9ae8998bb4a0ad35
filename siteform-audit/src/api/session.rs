//! Session lifecycle API handlers
//!
//! Drives the state machine: project selection, section editing, the
//! add-another-phase loop, and the final persist.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use siteform_common::events::AuditEvent;
use uuid::Uuid;

use crate::controller::{SectionView, SessionState};
use crate::engine::MissingField;
use crate::error::{ApiError, ApiResult};
use crate::models::SectionRecord;
use crate::AppState;

/// GET /api/session response
#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_section: Option<String>,
    /// Sections committed so far, in commit order
    pub committed_sections: Vec<String>,
    /// Phase sections selectable once a phase starts
    pub available_phases: Vec<String>,
}

/// POST /api/session/project request
#[derive(Debug, Deserialize)]
pub struct SelectProjectRequest {
    pub name: String,
}

/// POST /api/session/project response
#[derive(Debug, Serialize)]
pub struct SelectProjectResponse {
    pub state: SessionState,
    pub submission_id: Uuid,
    /// Section opened for editing (the identification section)
    pub section: String,
}

/// POST /api/session/submit response
///
/// Validation failure is a 200 with `ok: false`; the session stays in its
/// editing state with the in-progress answers intact.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub ok: bool,
    pub missing: Vec<MissingField>,
    pub justification_required: bool,
    /// Section appended to the history, when validation passed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub committed: Option<String>,
    pub state: SessionState,
}

/// POST /api/session/phase response
#[derive(Debug, Serialize)]
pub struct BeginPhaseResponse {
    pub state: SessionState,
    /// Sections selectable for this phase
    pub sections: Vec<String>,
}

/// POST /api/session/phase/section request
#[derive(Debug, Deserialize)]
pub struct ChooseSectionRequest {
    pub name: String,
}

/// POST /api/session/phase/section response
#[derive(Debug, Serialize)]
pub struct ChooseSectionResponse {
    pub state: SessionState,
    pub section: String,
}

/// Minimal state-only response
#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub state: SessionState,
}

/// POST /api/session/finish response
#[derive(Debug, Serialize)]
pub struct FinishResponse {
    pub state: SessionState,
    pub submission_id: Uuid,
    /// Number of sections persisted
    pub sections: usize,
}

/// GET /api/session/history response
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub submission_id: Uuid,
    pub sections: Vec<SectionRecord>,
}

/// GET /api/session
///
/// Current state snapshot for UI restoration after a page reload.
pub async fn session_status(State(state): State<AppState>) -> Json<SessionStatusResponse> {
    let controller = state.controller.read().await;
    let submission = controller.submission();

    Json(SessionStatusResponse {
        state: controller.state(),
        submission_id: submission.map(|s| s.submission_id),
        project: submission.map(|s| s.project.name.clone()),
        selected_section: submission.and_then(|s| s.selected_section.clone()),
        committed_sections: submission
            .map(|s| s.history.iter().map(|r| r.section.clone()).collect())
            .unwrap_or_default(),
        available_phases: controller.available_phases(),
    })
}

/// POST /api/session/project
///
/// Choose the deployment site. Mints the submission id and opens the
/// identification section.
pub async fn select_project(
    State(state): State<AppState>,
    Json(request): Json<SelectProjectRequest>,
) -> ApiResult<Json<SelectProjectResponse>> {
    let mut controller = state.controller.write().await;
    controller.select_project(&request.name)?;

    let submission = controller
        .submission()
        .ok_or_else(|| ApiError::Internal("Submission missing after project selection".to_string()))?;
    let response = SelectProjectResponse {
        state: controller.state(),
        submission_id: submission.submission_id,
        section: submission.selected_section.clone().unwrap_or_default(),
    };

    state.event_bus.emit_lossy(AuditEvent::SessionStarted {
        submission_id: response.submission_id,
        project_name: request.name.clone(),
        timestamp: Utc::now(),
    });

    tracing::info!(
        submission_id = %response.submission_id,
        project = %request.name,
        "Audit session started"
    );

    Ok(Json(response))
}

/// GET /api/session/section
///
/// The section being edited, filtered through the condition evaluator.
pub async fn current_section(State(state): State<AppState>) -> ApiResult<Json<SectionView>> {
    let controller = state.controller.read().await;
    Ok(Json(controller.visible_questions()?))
}

/// POST /api/session/submit
///
/// Validate the in-progress section; commit it when the report is clean.
pub async fn submit_section(State(state): State<AppState>) -> ApiResult<Json<SubmitResponse>> {
    let mut controller = state.controller.write().await;
    let section = controller
        .submission()
        .and_then(|s| s.selected_section.clone())
        .unwrap_or_default();

    let report = controller.submit_section()?;
    let submission = controller
        .submission()
        .ok_or_else(|| ApiError::Internal("Submission missing after submit".to_string()))?;
    let submission_id = submission.submission_id;

    if report.ok {
        let answered = submission
            .history
            .last()
            .map(|record| record.answers.len())
            .unwrap_or(0);
        state.event_bus.emit_lossy(AuditEvent::SectionCommitted {
            submission_id,
            section: section.clone(),
            answered,
            timestamp: Utc::now(),
        });
        tracing::info!(
            submission_id = %submission_id,
            section = %section,
            answered,
            "Section committed"
        );
    } else {
        state.event_bus.emit_lossy(AuditEvent::ValidationRejected {
            submission_id,
            section: section.clone(),
            missing: report.missing.len(),
            justification_required: report.justification_required,
            timestamp: Utc::now(),
        });
        tracing::info!(
            submission_id = %submission_id,
            section = %section,
            missing = report.missing.len(),
            justification_required = report.justification_required,
            "Section rejected by validation"
        );
    }

    Ok(Json(SubmitResponse {
        ok: report.ok,
        committed: report.ok.then(|| section),
        missing: report.missing,
        justification_required: report.justification_required,
        state: controller.state(),
    }))
}

/// POST /api/session/phase
///
/// Start another audit phase.
pub async fn begin_phase(State(state): State<AppState>) -> ApiResult<Json<BeginPhaseResponse>> {
    let mut controller = state.controller.write().await;
    controller.begin_phase()?;

    Ok(Json(BeginPhaseResponse {
        state: controller.state(),
        sections: controller.available_phases(),
    }))
}

/// POST /api/session/phase/section
///
/// Pick the section for the phase being started.
pub async fn choose_section(
    State(state): State<AppState>,
    Json(request): Json<ChooseSectionRequest>,
) -> ApiResult<Json<ChooseSectionResponse>> {
    let mut controller = state.controller.write().await;
    controller.choose_section(&request.name)?;

    tracing::debug!(section = %request.name, "Phase section chosen");

    Ok(Json(ChooseSectionResponse {
        state: controller.state(),
        section: request.name,
    }))
}

/// POST /api/session/cancel
///
/// Abandon the phase being edited.
pub async fn cancel_phase(State(state): State<AppState>) -> ApiResult<Json<StateResponse>> {
    let mut controller = state.controller.write().await;
    controller.cancel_phase()?;

    tracing::info!("Phase cancelled, in-progress answers discarded");

    Ok(Json(StateResponse {
        state: controller.state(),
    }))
}

/// POST /api/session/finish
///
/// Persist the accumulated history and seal the session. On a store
/// failure the session state is untouched, so the call can be retried.
pub async fn finish_session(State(state): State<AppState>) -> ApiResult<Json<FinishResponse>> {
    // Write lock held across the save so no edit lands between the
    // snapshot and the seal.
    let mut controller = state.controller.write().await;
    let payload = controller.finish_payload()?;

    if let Err(e) = crate::db::submissions::save_submission(&state.db, &payload).await {
        state.event_bus.emit_lossy(AuditEvent::PersistenceFailed {
            submission_id: payload.submission_id,
            error: e.to_string(),
            timestamp: Utc::now(),
        });
        tracing::error!(
            submission_id = %payload.submission_id,
            error = %e,
            "Failed to persist submission, finish may be retried"
        );
        return Err(ApiError::Internal(format!(
            "Failed to persist submission: {}",
            e
        )));
    }

    controller.mark_finished()?;

    state.event_bus.emit_lossy(AuditEvent::SubmissionPersisted {
        submission_id: payload.submission_id,
        sections: payload.history.len(),
        timestamp: Utc::now(),
    });
    tracing::info!(
        submission_id = %payload.submission_id,
        sections = payload.history.len(),
        "Submission persisted"
    );

    Ok(Json(FinishResponse {
        state: controller.state(),
        submission_id: payload.submission_id,
        sections: payload.history.len(),
    }))
}

/// POST /api/session/reset
///
/// Drop everything and return to the upload step.
pub async fn reset_session(State(state): State<AppState>) -> Json<StateResponse> {
    let mut controller = state.controller.write().await;
    controller.reset();

    state.event_bus.emit_lossy(AuditEvent::SessionReset {
        timestamp: Utc::now(),
    });
    tracing::info!("Session reset to upload state");

    Json(StateResponse {
        state: controller.state(),
    })
}

/// GET /api/session/history
///
/// Committed sections of the active submission.
pub async fn session_history(State(state): State<AppState>) -> ApiResult<Json<HistoryResponse>> {
    let controller = state.controller.read().await;
    let submission = controller
        .submission()
        .ok_or_else(|| ApiError::NotFound("No active submission".to_string()))?;

    Ok(Json(HistoryResponse {
        submission_id: submission.submission_id,
        sections: submission.history.clone(),
    }))
}

/// Build session lifecycle routes
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/api/session", get(session_status))
        .route("/api/session/project", post(select_project))
        .route("/api/session/section", get(current_section))
        .route("/api/session/submit", post(submit_section))
        .route("/api/session/phase", post(begin_phase))
        .route("/api/session/phase/section", post(choose_section))
        .route("/api/session/cancel", post(cancel_phase))
        .route("/api/session/finish", post(finish_session))
        .route("/api/session/reset", post(reset_session))
        .route("/api/session/history", get(session_history))
}
