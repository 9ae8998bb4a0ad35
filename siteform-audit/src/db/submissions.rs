//! Submission database operations

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use siteform_common::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::controller::SubmissionPayload;
use crate::models::SectionRecord;

/// A persisted submission as read back from the database
#[derive(Debug, Clone, Serialize)]
pub struct StoredSubmission {
    pub submission_id: Uuid,
    pub project_name: String,
    pub project_metadata: BTreeMap<String, Value>,
    pub history: Vec<SectionRecord>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Listing row: everything except the section payloads
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionSummary {
    pub submission_id: Uuid,
    pub project_name: String,
    pub section_count: i64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Save a finished submission to the database
///
/// Idempotent on submission_id so a retried finish overwrites rather than
/// duplicates.
pub async fn save_submission(pool: &SqlitePool, payload: &SubmissionPayload) -> Result<()> {
    // Prepare all data BEFORE acquiring database connection
    let submission_id = payload.submission_id.to_string();
    let project_metadata = serde_json::to_string(&payload.project_metadata).map_err(|e| {
        siteform_common::Error::Internal(format!("Failed to serialize project metadata: {}", e))
    })?;
    let history = serde_json::to_string(&payload.history).map_err(|e| {
        siteform_common::Error::Internal(format!("Failed to serialize history: {}", e))
    })?;
    let section_count = payload.history.len() as i64;
    let started_at = payload.started_at.to_rfc3339();
    let finished_at = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO submissions (
            submission_id, project_name, project_metadata,
            history, section_count, started_at, finished_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(submission_id) DO UPDATE SET
            project_metadata = excluded.project_metadata,
            history = excluded.history,
            section_count = excluded.section_count,
            finished_at = excluded.finished_at
        "#,
    )
    .bind(&submission_id)
    .bind(&payload.project_name)
    .bind(&project_metadata)
    .bind(&history)
    .bind(section_count)
    .bind(&started_at)
    .bind(&finished_at)
    .execute(pool)
    .await
    .map_err(siteform_common::Error::Database)?;

    Ok(())
}

/// Load one submission with its full section history
pub async fn load_submission(
    pool: &SqlitePool,
    submission_id: Uuid,
) -> Result<Option<StoredSubmission>> {
    let submission_id_str = submission_id.to_string();

    let row = sqlx::query(
        r#"
        SELECT submission_id, project_name, project_metadata,
               history, started_at, finished_at
        FROM submissions
        WHERE submission_id = ?
        "#,
    )
    .bind(submission_id_str)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let project_metadata: String = row.get("project_metadata");
            let project_metadata: BTreeMap<String, Value> =
                serde_json::from_str(&project_metadata).map_err(|e| {
                    siteform_common::Error::Internal(format!(
                        "Failed to deserialize project metadata: {}",
                        e
                    ))
                })?;

            let history: String = row.get("history");
            let history: Vec<SectionRecord> = serde_json::from_str(&history).map_err(|e| {
                siteform_common::Error::Internal(format!("Failed to deserialize history: {}", e))
            })?;

            let started_at: String = row.get("started_at");
            let started_at = DateTime::parse_from_rfc3339(&started_at)
                .map_err(|e| {
                    siteform_common::Error::Internal(format!("Failed to parse started_at: {}", e))
                })?
                .with_timezone(&Utc);

            let finished_at: String = row.get("finished_at");
            let finished_at = DateTime::parse_from_rfc3339(&finished_at)
                .map_err(|e| {
                    siteform_common::Error::Internal(format!("Failed to parse finished_at: {}", e))
                })?
                .with_timezone(&Utc);

            Ok(Some(StoredSubmission {
                submission_id,
                project_name: row.get("project_name"),
                project_metadata,
                history,
                started_at,
                finished_at,
            }))
        }
        None => Ok(None),
    }
}

/// List persisted submissions, most recently finished first
pub async fn list_submissions(pool: &SqlitePool) -> Result<Vec<SubmissionSummary>> {
    let rows = sqlx::query(
        r#"
        SELECT submission_id, project_name, section_count, started_at, finished_at
        FROM submissions
        ORDER BY finished_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut summaries = Vec::with_capacity(rows.len());
    for row in rows {
        let submission_id_str: String = row.get("submission_id");
        let submission_id = Uuid::parse_str(&submission_id_str).map_err(|e| {
            siteform_common::Error::Internal(format!("Failed to parse submission_id: {}", e))
        })?;

        let started_at: String = row.get("started_at");
        let started_at = DateTime::parse_from_rfc3339(&started_at)
            .map_err(|e| {
                siteform_common::Error::Internal(format!("Failed to parse started_at: {}", e))
            })?
            .with_timezone(&Utc);

        let finished_at: String = row.get("finished_at");
        let finished_at = DateTime::parse_from_rfc3339(&finished_at)
            .map_err(|e| {
                siteform_common::Error::Internal(format!("Failed to parse finished_at: {}", e))
            })?
            .with_timezone(&Utc);

        summaries.push(SubmissionSummary {
            submission_id,
            project_name: row.get("project_name"),
            section_count: row.get("section_count"),
            started_at,
            finished_at,
        });
    }

    Ok(summaries)
}
