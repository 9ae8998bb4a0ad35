//! Catalog and project table API handlers
//!
//! POST /api/catalog accepts the two uploaded tables as parsed rows; the
//! GET endpoints serve the loaded project table back to the picker UI.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use siteform_common::events::AuditEvent;
use std::collections::BTreeMap;

use crate::controller::SessionState;
use crate::error::{ApiError, ApiResult};
use crate::services::{load_projects, load_questions, RawRow};
use crate::AppState;

/// POST /api/catalog request: both tables, one JSON object per row
#[derive(Debug, Deserialize)]
pub struct LoadTablesRequest {
    pub questions: Vec<RawRow>,
    pub projects: Vec<RawRow>,
}

/// POST /api/catalog response
#[derive(Debug, Serialize)]
pub struct LoadTablesResponse {
    pub state: SessionState,
    /// Section names in catalog order
    pub sections: Vec<String>,
    pub question_count: usize,
    pub project_count: usize,
}

/// GET /api/projects response
#[derive(Debug, Serialize)]
pub struct ProjectListResponse {
    pub projects: Vec<String>,
}

/// GET /api/projects/{name} response
#[derive(Debug, Serialize)]
pub struct ProjectDetailResponse {
    pub name: String,
    /// Metadata cells, blanks rendered as "-"
    pub metadata: BTreeMap<String, Value>,
}

/// POST /api/catalog
///
/// Load the question catalog and project table. Rejects malformed tables
/// with 400 before any session state changes.
pub async fn load_tables(
    State(state): State<AppState>,
    Json(request): Json<LoadTablesRequest>,
) -> ApiResult<Json<LoadTablesResponse>> {
    let catalog =
        load_questions(&request.questions).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let projects =
        load_projects(&request.projects).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let sections: Vec<String> = catalog.sections().to_vec();
    let question_count = catalog.len();
    let project_count = projects.len();

    let new_state = {
        let mut controller = state.controller.write().await;
        controller.load_tables(catalog, projects)?;
        controller.state()
    };

    state.event_bus.emit_lossy(AuditEvent::CatalogLoaded {
        sections: sections.clone(),
        question_count,
        project_count,
        timestamp: Utc::now(),
    });

    tracing::info!(
        question_count,
        project_count,
        sections = sections.len(),
        "Question catalog and project table loaded"
    );

    Ok(Json(LoadTablesResponse {
        state: new_state,
        sections,
        question_count,
        project_count,
    }))
}

/// GET /api/projects
///
/// Names of the loaded projects, in table order.
pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Json<ProjectListResponse>> {
    let controller = state.controller.read().await;
    let table = controller
        .projects()
        .ok_or_else(|| ApiError::Conflict("No project table loaded".to_string()))?;

    Ok(Json(ProjectListResponse {
        projects: table.names().into_iter().map(String::from).collect(),
    }))
}

/// GET /api/projects/{name}
///
/// One project row with its metadata cells.
pub async fn get_project(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<ProjectDetailResponse>> {
    let controller = state.controller.read().await;
    let table = controller
        .projects()
        .ok_or_else(|| ApiError::Conflict("No project table loaded".to_string()))?;
    let record = table
        .get(&name)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown project: {}", name)))?;

    let metadata = record
        .metadata
        .iter()
        .map(|(key, value)| (key.clone(), display_cell(value)))
        .collect();

    Ok(Json(ProjectDetailResponse {
        name: record.name.clone(),
        metadata,
    }))
}

/// Blank or null cells display as "-"
fn display_cell(value: &Value) -> Value {
    match value {
        Value::Null => Value::String("-".to_string()),
        Value::String(s) if s.trim().is_empty() => Value::String("-".to_string()),
        other => other.clone(),
    }
}

/// Build catalog and project routes
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/api/catalog", post(load_tables))
        .route("/api/projects", get(list_projects))
        .route("/api/projects/:name", get(get_project))
}
