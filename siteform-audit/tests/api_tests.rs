//! Integration tests for siteform-audit API endpoints
//!
//! Tests cover:
//! - Health endpoint
//! - Catalog and project table upload, including malformed tables
//! - The full session walk: project selection, identification, phases,
//!   validation failure and recovery, finish and persistence
//! - Photo-count reconciliation and the justification comment over HTTP
//! - Conditional visibility across committed sections
//! - State machine conflicts and unknown-resource errors

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use siteform_audit::{build_router, AppState};
use siteform_common::events::EventBus;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: Create app over a fresh in-memory database
async fn setup_app() -> axum::Router {
    let db = siteform_audit::db::init_memory_pool()
        .await
        .expect("Should create in-memory database");
    let state = AppState::new(db, EventBus::new(16));
    build_router(state)
}

/// Test helper: Create request without body
fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: Create request with JSON body
fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Test fixture: a small question catalog and two projects.
///
/// "Aire de Chartres" plans 2 AC and 1 DC charge point, so the Bornes AC
/// section expects 2 photos on its single photo question.
fn tables_fixture() -> Value {
    json!({
        "questions": [
            {"ID": 1, "Section": "Identification", "Type": "Texte",
             "Obligatoire": "oui", "Description": "Nom du technicien"},
            {"ID": 2, "Section": "Identification", "Type": "Liste", "Options": "oui;non",
             "Obligatoire": "oui", "Description": "Site accessible"},
            {"ID": 10, "Section": "Bornes AC", "Type": "Photo",
             "Obligatoire": "oui", "Description": "Photo de la borne"},
            {"ID": 11, "Section": "Bornes AC", "Type": "Texte",
             "Obligatoire": "non", "Description": "Observations"},
            {"ID": 20, "Section": "Zone de recharge", "Type": "Photo",
             "Obligatoire": "oui", "Description": "Vue de la zone",
             "Champ conditionnel": 1, "Condition": "2 = oui"}
        ],
        "projects": [
            {"Intitulé": "Aire de Chartres",
             "L [Plan de Déploiement]": "2", "R [Plan de Déploiement]": "1"},
            {"Intitulé": "Aire de Vierzon",
             "L [Plan de Déploiement]": "-", "R [Plan de Déploiement]": ""}
        ]
    })
}

/// Test helper: upload the fixture tables
async fn load_tables(app: &axum::Router) {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/catalog", tables_fixture()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// Test helper: drive the session to LOOP_DECISION with the identification
/// section committed, answering "Site accessible" as requested
async fn start_session(app: &axum::Router, accessible: &str) {
    load_tables(app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/session/project",
            json!({"name": "Aire de Chartres"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/session/answers",
            json!({"answers": {"1": "Martin", "2": accessible}}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(test_request("POST", "/api/session/submit"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["ok"], true, "identification should commit: {}", body);
}

/// Test helper: begin a phase and pick a section
async fn begin_phase(app: &axum::Router, section: &str) {
    let response = app
        .clone()
        .oneshot(test_request("POST", "/api/session/phase"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/session/phase/section",
            json!({"name": section}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// Test helper: attach one photo to a question
async fn add_photo(app: &axum::Router, id: i64, name: &str) -> Value {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/session/answers/{}/photos", id),
            json!({"name": name, "size_bytes": 120000}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    extract_json(response.into_body()).await
}

// =============================================================================
// Health Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app().await;

    let request = test_request("GET", "/health");
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "siteform-audit");
    assert!(body["version"].is_string());
    assert!(body["uptime_seconds"].is_number());
}

// =============================================================================
// Catalog Upload Tests
// =============================================================================

#[tokio::test]
async fn test_catalog_upload_returns_sections() {
    let app = setup_app().await;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/catalog", tables_fixture()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["state"], "PROJECT_SELECT");
    assert_eq!(
        body["sections"],
        json!(["Identification", "Bornes AC", "Zone de recharge"])
    );
    assert_eq!(body["question_count"], 5);
    assert_eq!(body["project_count"], 2);
}

#[tokio::test]
async fn test_catalog_upload_rejects_malformed_table() {
    let app = setup_app().await;

    // second question row has no section
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/catalog",
            json!({
                "questions": [
                    {"ID": 1, "Section": "Identification", "Type": "Texte"},
                    {"ID": 2, "Type": "Texte"}
                ],
                "projects": [{"Intitulé": "Aire de Chartres"}]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    // the failed upload must not advance the session
    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/session"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["state"], "UPLOAD");
}

#[tokio::test]
async fn test_project_listing_and_detail() {
    let app = setup_app().await;
    load_tables(&app).await;

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/projects"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(
        body["projects"],
        json!(["Aire de Chartres", "Aire de Vierzon"])
    );

    // blank plan cells display as "-"
    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/projects/Aire%20de%20Vierzon"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["name"], "Aire de Vierzon");
    assert_eq!(body["metadata"]["L [Plan de Déploiement]"], "-");
    assert_eq!(body["metadata"]["R [Plan de Déploiement]"], "-");

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/projects/Aire%20Inconnue"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Full Session Flow
// =============================================================================

#[tokio::test]
async fn test_full_audit_session_flow() {
    let app = setup_app().await;
    load_tables(&app).await;

    // Select the project
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/session/project",
            json!({"name": "Aire de Chartres"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["state"], "IDENTIFICATION");
    assert_eq!(body["section"], "Identification");
    let submission_id = body["submission_id"].as_str().unwrap().to_string();

    // The identification section renders its two questions
    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/session/section"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["section"], "Identification");
    assert_eq!(body["questions"].as_array().unwrap().len(), 2);

    // Submitting unanswered lists every mandatory field
    let response = app
        .clone()
        .oneshot(test_request("POST", "/api/session/submit"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["state"], "IDENTIFICATION");
    let missing = body["missing"].as_array().unwrap();
    assert_eq!(missing.len(), 2);
    assert_eq!(missing[0]["message"], "Question 1 : Nom du technicien");

    // Answer and commit
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/session/answers",
            json!({"answers": {"1": "Martin", "2": "oui"}}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(test_request("POST", "/api/session/submit"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["committed"], "Identification");
    assert_eq!(body["state"], "LOOP_DECISION");

    // Start the Bornes AC phase
    let response = app
        .clone()
        .oneshot(test_request("POST", "/api/session/phase"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["state"], "FILL_PHASE");
    assert_eq!(body["sections"], json!(["Bornes AC", "Zone de recharge"]));

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/session/phase/section",
            json!({"name": "Bornes AC"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // No photos attached: the mandatory photo is missing AND the count is
    // wrong, so the comment requirement is appended last
    let response = app
        .clone()
        .oneshot(test_request("POST", "/api/session/submit"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["justification_required"], true);
    let missing = body["missing"].as_array().unwrap();
    assert_eq!(missing.len(), 2);
    assert_eq!(missing[0]["message"], "Question 10 : Photo de la borne");
    assert_eq!(missing[1]["question_id"], 100);
    assert_eq!(
        missing[1]["message"],
        "Question 100 : Commentaire justificatif requis (photos attendues : 2, photos reçues : 0)"
    );

    // Attach the two expected photos and retry
    let body = add_photo(&app, 10, "borne-1.jpg").await;
    assert_eq!(body["count"], 1);
    let body = add_photo(&app, 10, "borne-2.jpg").await;
    assert_eq!(body["count"], 2);

    let response = app
        .clone()
        .oneshot(test_request("POST", "/api/session/submit"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["ok"], true, "{}", body);
    assert_eq!(body["committed"], "Bornes AC");
    assert_eq!(body["state"], "LOOP_DECISION");

    // Finish: persists and seals
    let response = app
        .clone()
        .oneshot(test_request("POST", "/api/session/finish"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["state"], "FINISHED");
    assert_eq!(body["submission_id"], submission_id.as_str());
    assert_eq!(body["sections"], 2);

    // The submission is readable back with its full history
    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/submissions"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["project_name"], "Aire de Chartres");
    assert_eq!(list[0]["section_count"], 2);

    let response = app
        .clone()
        .oneshot(test_request(
            "GET",
            &format!("/api/submissions/{}", submission_id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    let history = body["history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["section"], "Identification");
    assert_eq!(history[0]["answers"]["1"], "Martin");
    assert_eq!(history[1]["section"], "Bornes AC");
    assert_eq!(
        history[1]["answers"]["10"].as_array().unwrap().len(),
        2
    );
}

// =============================================================================
// Photo Reconciliation Over HTTP
// =============================================================================

#[tokio::test]
async fn test_photo_overage_requires_justification() {
    let app = setup_app().await;
    start_session(&app, "oui").await;
    begin_phase(&app, "Bornes AC").await;

    // three photos against an expectation of two
    add_photo(&app, 10, "borne-1.jpg").await;
    add_photo(&app, 10, "borne-2.jpg").await;
    add_photo(&app, 10, "borne-3.jpg").await;

    let response = app
        .clone()
        .oneshot(test_request("POST", "/api/session/submit"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["justification_required"], true);
    let missing = body["missing"].as_array().unwrap();
    // the photo field itself is satisfied, only the comment is demanded
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0]["question_id"], 100);

    // provide the justification through the generic answer endpoint
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/session/answers/100",
            json!("Borne remplacée, photo supplémentaire du nouvel équipement"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(test_request("POST", "/api/session/submit"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["ok"], true, "{}", body);

    // the committed section keeps the justification text
    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/session/history"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let sections = body["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 2);
    assert_eq!(
        sections[1]["answers"]["100"],
        "Borne remplacée, photo supplémentaire du nouvel équipement"
    );
}

#[tokio::test]
async fn test_unplanned_site_needs_no_photos() {
    let app = setup_app().await;
    load_tables(&app).await;

    // Vierzon's plan cells are "-" and blank, so the expected count is zero
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/session/project",
            json!({"name": "Aire de Vierzon"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/session/answers",
            json!({"answers": {"1": "Martin", "2": "oui"}}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let response = app
        .clone()
        .oneshot(test_request("POST", "/api/session/submit"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["ok"], true);

    begin_phase(&app, "Bornes AC").await;

    // zero expectation relaxes the mandatory photo question entirely
    let response = app
        .clone()
        .oneshot(test_request("POST", "/api/session/submit"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["ok"], true, "{}", body);
    assert_eq!(body["justification_required"], false);
}

// =============================================================================
// Conditional Visibility Across Sections
// =============================================================================

#[tokio::test]
async fn test_condition_reads_committed_history() {
    let app = setup_app().await;
    start_session(&app, "oui").await;
    begin_phase(&app, "Zone de recharge").await;

    // "Site accessible" was answered oui in the identification section,
    // so the conditional zone photo is visible here
    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/session/section"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let ids: Vec<i64> = body["questions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, [20]);
}

#[tokio::test]
async fn test_hidden_question_is_not_validated() {
    let app = setup_app().await;
    start_session(&app, "non").await;
    begin_phase(&app, "Zone de recharge").await;

    // condition fails against the history: nothing to render
    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/session/section"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["questions"].as_array().unwrap().len(), 0);

    // and nothing to validate: the empty section commits
    let response = app
        .clone()
        .oneshot(test_request("POST", "/api/session/submit"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["ok"], true, "{}", body);
}

// =============================================================================
// State Machine Conflicts and Unknown Resources
// =============================================================================

#[tokio::test]
async fn test_operations_in_wrong_state_conflict() {
    let app = setup_app().await;

    let response = app
        .clone()
        .oneshot(test_request("POST", "/api/session/submit"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "CONFLICT");

    let response = app
        .clone()
        .oneshot(test_request("POST", "/api/session/phase"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .clone()
        .oneshot(test_request("POST", "/api/session/finish"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unknown_project_and_section() {
    let app = setup_app().await;
    load_tables(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/session/project",
            json!({"name": "Aire Fantôme"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    // a failed selection leaves the picker usable
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/session/project",
            json!({"name": "Aire de Chartres"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/session/answers",
            json!({"answers": {"1": "Martin", "2": "oui"}}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let response = app
        .clone()
        .oneshot(test_request("POST", "/api/session/submit"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["ok"], true);

    let response = app
        .clone()
        .oneshot(test_request("POST", "/api/session/phase"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // the identification section is not selectable as a phase
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/session/phase/section",
            json!({"name": "Identification"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_answer_type_violations() {
    let app = setup_app().await;
    load_tables(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/session/project",
            json!({"name": "Aire de Chartres"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // attachment list on a text question
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/session/answers/1",
            json!([{"name": "x.jpg"}]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // photo upload on a select question
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/session/answers/2/photos",
            json!({"name": "x.jpg"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // question from another section
    let response = app
        .clone()
        .oneshot(json_request("PUT", "/api/session/answers/10", json!([])))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // unknown question id
    let response = app
        .clone()
        .oneshot(json_request("PUT", "/api/session/answers/999", json!("x")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_remove_missing_photo_is_not_found() {
    let app = setup_app().await;
    start_session(&app, "oui").await;
    begin_phase(&app, "Bornes AC").await;

    add_photo(&app, 10, "borne-1.jpg").await;

    let response = app
        .clone()
        .oneshot(test_request(
            "DELETE",
            "/api/session/answers/10/photos/absente.jpg",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(test_request(
            "DELETE",
            "/api/session/answers/10/photos/borne-1.jpg",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 0);
}

// =============================================================================
// Session Status and Reset
// =============================================================================

#[tokio::test]
async fn test_session_status_midflow() {
    let app = setup_app().await;
    start_session(&app, "oui").await;
    begin_phase(&app, "Bornes AC").await;

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/session"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["state"], "FILL_PHASE");
    assert_eq!(body["project"], "Aire de Chartres");
    assert_eq!(body["selected_section"], "Bornes AC");
    assert_eq!(body["committed_sections"], json!(["Identification"]));
    assert!(body["submission_id"].is_string());
}

#[tokio::test]
async fn test_reset_returns_to_upload() {
    let app = setup_app().await;
    start_session(&app, "oui").await;

    let response = app
        .clone()
        .oneshot(test_request("POST", "/api/session/reset"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["state"], "UPLOAD");

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/session"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["state"], "UPLOAD");
    assert!(body.get("submission_id").is_none());
    assert!(body.get("project").is_none());
}

#[tokio::test]
async fn test_submission_not_found() {
    let app = setup_app().await;

    let response = app
        .clone()
        .oneshot(test_request(
            "GET",
            "/api/submissions/00000000-0000-0000-0000-000000000000",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
