//! Audit session state machine
//!
//! One session at a time walks: upload the tables, pick the deployment
//! site, fill the one-time identification section, then loop over audit
//! phases until the technician finishes. The controller owns all in-memory
//! session state and sequences the engine; it performs no IO, so the API
//! layer decides when to persist and when a failed write may be retried.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::engine::{is_visible, validate_section, ValidationReport};
use crate::models::{
    AnswerMap, AnswerValue, AttachmentRef, MergedAnswers, ProjectRecord, ProjectTable,
    QuestionCatalog, QuestionType, SectionRecord, COMMENT_QUESTION_ID,
};

/// Session workflow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    /// Waiting for the question catalog and project table
    Upload,
    /// Tables loaded, waiting for a site to be chosen
    ProjectSelect,
    /// Filling the one-time identification section
    Identification,
    /// Between phases: add another phase or finish
    LoopDecision,
    /// Filling an audit phase (section picked once editing starts)
    FillPhase,
    /// Submission persisted, session over
    Finished,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Upload => "UPLOAD",
            SessionState::ProjectSelect => "PROJECT_SELECT",
            SessionState::Identification => "IDENTIFICATION",
            SessionState::LoopDecision => "LOOP_DECISION",
            SessionState::FillPhase => "FILL_PHASE",
            SessionState::Finished => "FINISHED",
        };
        f.write_str(name)
    }
}

/// Errors for operations invoked against the wrong state or unknown targets
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("operation {operation} is not allowed in state {state}")]
    InvalidTransition {
        state: SessionState,
        operation: &'static str,
    },

    #[error("no section selected")]
    NoSectionSelected,

    #[error("a section is already being edited")]
    SectionAlreadyChosen,

    #[error("unknown project: {0}")]
    UnknownProject(String),

    #[error("unknown section: {0}")]
    UnknownSection(String),

    #[error("unknown question id: {0}")]
    UnknownQuestion(i64),

    #[error("question {0} is not part of the section being edited")]
    QuestionOutsideSection(i64),

    #[error("question {0} does not accept attachments")]
    AttachmentsNotAllowed(i64),

    #[error("question {0} accepts only an attachment list")]
    ExpectsAttachments(i64),

    #[error("the justification comment accepts only text")]
    CommentMustBeText,

    #[error("attachment not found on question {question_id}: {name}")]
    AttachmentNotFound { question_id: i64, name: String },
}

/// The active submission: everything accumulated since project selection
#[derive(Debug, Clone)]
pub struct AuditSubmission {
    /// Identifier the persisted submission is keyed by
    pub submission_id: Uuid,
    /// Snapshot of the selected project row
    pub project: ProjectRecord,
    /// Committed sections, append-only
    pub history: Vec<SectionRecord>,
    /// Answers of the section being edited
    pub in_progress: AnswerMap,
    /// Section currently being edited, if one is selected
    pub selected_section: Option<String>,
    /// Whether the justification-comment input should be shown
    pub justification_required: bool,
    /// When the project was selected
    pub started_at: DateTime<Utc>,
}

/// Data handed to the persistence sink when the session finishes
#[derive(Debug, Clone)]
pub struct SubmissionPayload {
    pub submission_id: Uuid,
    pub project_name: String,
    pub project_metadata: std::collections::BTreeMap<String, Value>,
    pub history: Vec<SectionRecord>,
    pub started_at: DateTime<Utc>,
}

/// Render support: one currently-visible question with its answer
#[derive(Debug, Clone, Serialize)]
pub struct VisibleQuestion {
    pub id: i64,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub description: String,
    pub options: Vec<String>,
    pub mandatory: bool,
    pub answer: Option<AnswerValue>,
}

/// Render support: the current section filtered through the evaluator
#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub section: String,
    pub questions: Vec<VisibleQuestion>,
    pub justification_required: bool,
    /// Current justification text, when one was entered
    pub justification: Option<String>,
}

/// The session state machine
pub struct SessionController {
    state: SessionState,
    catalog: Option<Arc<QuestionCatalog>>,
    projects: Option<ProjectTable>,
    submission: Option<AuditSubmission>,
}

impl SessionController {
    pub fn new() -> Self {
        Self {
            state: SessionState::Upload,
            catalog: None,
            projects: None,
            submission: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn catalog(&self) -> Option<&QuestionCatalog> {
        self.catalog.as_deref()
    }

    pub fn projects(&self) -> Option<&ProjectTable> {
        self.projects.as_ref()
    }

    pub fn submission(&self) -> Option<&AuditSubmission> {
        self.submission.as_ref()
    }

    /// Phase sections still selectable after identification
    pub fn available_phases(&self) -> Vec<String> {
        self.catalog
            .as_deref()
            .map(|catalog| {
                catalog
                    .phase_sections()
                    .into_iter()
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Accept the loaded tables. Upload -> ProjectSelect.
    pub fn load_tables(
        &mut self,
        catalog: QuestionCatalog,
        projects: ProjectTable,
    ) -> Result<(), ControllerError> {
        self.require_state(SessionState::Upload, "load_tables")?;
        self.catalog = Some(Arc::new(catalog));
        self.projects = Some(projects);
        self.state = SessionState::ProjectSelect;
        Ok(())
    }

    /// Choose the deployment site. ProjectSelect -> Identification.
    ///
    /// Mints a fresh submission id and selects the identification section
    /// for editing.
    pub fn select_project(&mut self, name: &str) -> Result<(), ControllerError> {
        self.require_state(SessionState::ProjectSelect, "select_project")?;

        let project = self
            .projects
            .as_ref()
            .and_then(|table| table.get(name))
            .ok_or_else(|| ControllerError::UnknownProject(name.to_string()))?
            .clone();
        let identification = self
            .catalog
            .as_deref()
            .ok_or(ControllerError::InvalidTransition {
                state: self.state,
                operation: "select_project",
            })?
            .identification_section()
            .to_string();

        self.submission = Some(AuditSubmission {
            submission_id: Uuid::new_v4(),
            project,
            history: Vec::new(),
            in_progress: AnswerMap::new(),
            selected_section: Some(identification),
            justification_required: false,
            started_at: Utc::now(),
        });
        self.state = SessionState::Identification;
        Ok(())
    }

    /// The current section filtered through the condition evaluator
    pub fn visible_questions(&self) -> Result<SectionView, ControllerError> {
        self.require_editing("visible_questions")?;
        let catalog = self.loaded_catalog("visible_questions")?;
        let submission = self.active_submission("visible_questions")?;
        let section = submission
            .selected_section
            .as_deref()
            .ok_or(ControllerError::NoSectionSelected)?;

        let merged = MergedAnswers::new(&submission.in_progress, &submission.history);
        let questions = catalog
            .section_rows(section)
            .filter(|row| is_visible(row, &merged))
            .map(|row| VisibleQuestion {
                id: row.id,
                question_type: row.question_type,
                description: row.description.clone(),
                options: row.options.clone(),
                mandatory: row.mandatory,
                answer: submission.in_progress.get(&row.id).cloned(),
            })
            .collect();

        let justification = match submission.in_progress.get(&COMMENT_QUESTION_ID) {
            Some(AnswerValue::Text(text)) => Some(text.clone()),
            _ => None,
        };

        Ok(SectionView {
            section: section.to_string(),
            questions,
            justification_required: submission.justification_required,
            justification,
        })
    }

    /// Write one in-progress answer.
    ///
    /// The question must belong to the section being edited. The reserved
    /// comment id is always writable as text, regardless of section.
    /// Attachment lists are only accepted on photo questions, and photo
    /// questions accept nothing else.
    pub fn set_answer(&mut self, id: i64, value: AnswerValue) -> Result<(), ControllerError> {
        self.require_editing("set_answer")?;

        {
            let submission = self.active_submission("set_answer")?;
            let section = submission
                .selected_section
                .as_deref()
                .ok_or(ControllerError::NoSectionSelected)?;

            if id == COMMENT_QUESTION_ID {
                if !matches!(value, AnswerValue::Text(_) | AnswerValue::Empty) {
                    return Err(ControllerError::CommentMustBeText);
                }
            } else {
                let row = self
                    .loaded_catalog("set_answer")?
                    .row(id)
                    .ok_or(ControllerError::UnknownQuestion(id))?;
                if row.section != section {
                    return Err(ControllerError::QuestionOutsideSection(id));
                }
                match (row.question_type, &value) {
                    (QuestionType::Photo, AnswerValue::Photos(_) | AnswerValue::Empty) => {}
                    (QuestionType::Photo, _) => {
                        return Err(ControllerError::ExpectsAttachments(id));
                    }
                    (_, AnswerValue::Photos(_)) => {
                        return Err(ControllerError::AttachmentsNotAllowed(id));
                    }
                    _ => {}
                }
            }
        }

        let submission = self.active_submission_mut("set_answer")?;
        submission.in_progress.insert(id, value);
        Ok(())
    }

    /// Register an attachment on a photo question.
    ///
    /// An attachment with the same name replaces the previous one. Returns
    /// the question's new attachment count.
    pub fn add_attachment(
        &mut self,
        id: i64,
        attachment: AttachmentRef,
    ) -> Result<usize, ControllerError> {
        self.require_editing("add_attachment")?;
        self.require_photo_question(id, "add_attachment")?;

        let submission = self.active_submission_mut("add_attachment")?;
        if !matches!(
            submission.in_progress.get(&id),
            Some(AnswerValue::Photos(_))
        ) {
            submission.in_progress.insert(id, AnswerValue::Photos(Vec::new()));
        }
        let Some(AnswerValue::Photos(photos)) = submission.in_progress.get_mut(&id) else {
            return Err(ControllerError::ExpectsAttachments(id));
        };

        if let Some(existing) = photos.iter_mut().find(|p| p.name == attachment.name) {
            *existing = attachment;
        } else {
            photos.push(attachment);
        }
        Ok(photos.len())
    }

    /// Remove an attachment by name. Returns the remaining count.
    pub fn remove_attachment(&mut self, id: i64, name: &str) -> Result<usize, ControllerError> {
        self.require_editing("remove_attachment")?;
        self.require_photo_question(id, "remove_attachment")?;

        let submission = self.active_submission_mut("remove_attachment")?;
        let Some(AnswerValue::Photos(photos)) = submission.in_progress.get_mut(&id) else {
            return Err(ControllerError::AttachmentNotFound {
                question_id: id,
                name: name.to_string(),
            });
        };

        let before = photos.len();
        photos.retain(|p| p.name != name);
        if photos.len() == before {
            return Err(ControllerError::AttachmentNotFound {
                question_id: id,
                name: name.to_string(),
            });
        }
        Ok(photos.len())
    }

    /// Validate the in-progress section and commit it on success.
    ///
    /// Success moves Identification/FillPhase -> LoopDecision and appends a
    /// timestamped snapshot to the history. Failure keeps the state, stores
    /// the justification flag, and returns the full report; validation
    /// failure is a domain result, not an error.
    pub fn submit_section(&mut self) -> Result<ValidationReport, ControllerError> {
        self.require_editing("submit_section")?;
        let catalog = self
            .catalog
            .as_deref()
            .ok_or(ControllerError::InvalidTransition {
                state: self.state,
                operation: "submit_section",
            })?;
        let submission = self
            .submission
            .as_mut()
            .ok_or(ControllerError::InvalidTransition {
                state: self.state,
                operation: "submit_section",
            })?;
        let section = submission
            .selected_section
            .clone()
            .ok_or(ControllerError::NoSectionSelected)?;

        let report = validate_section(
            &section,
            catalog,
            &mut submission.in_progress,
            &submission.history,
            &submission.project,
        );

        if report.ok {
            let answers = std::mem::take(&mut submission.in_progress);
            submission.history.push(SectionRecord {
                section,
                answers,
                committed_at: Utc::now(),
            });
            submission.selected_section = None;
            submission.justification_required = false;
            self.state = SessionState::LoopDecision;
        } else {
            submission.justification_required = report.justification_required;
        }

        Ok(report)
    }

    /// Start another audit phase. LoopDecision -> FillPhase.
    pub fn begin_phase(&mut self) -> Result<(), ControllerError> {
        self.require_state(SessionState::LoopDecision, "begin_phase")?;
        let submission = self.active_submission_mut("begin_phase")?;
        submission.in_progress.clear();
        submission.selected_section = None;
        submission.justification_required = false;
        self.state = SessionState::FillPhase;
        Ok(())
    }

    /// Pick the section for the phase being started.
    ///
    /// Any catalog section except the identification section is allowed,
    /// including one that was already committed earlier in the session.
    pub fn choose_section(&mut self, name: &str) -> Result<(), ControllerError> {
        self.require_state(SessionState::FillPhase, "choose_section")?;
        let catalog = self.loaded_catalog("choose_section")?;
        if !catalog.has_section(name) || name == catalog.identification_section() {
            return Err(ControllerError::UnknownSection(name.to_string()));
        }

        let submission = self.active_submission_mut("choose_section")?;
        if submission.selected_section.is_some() {
            return Err(ControllerError::SectionAlreadyChosen);
        }
        submission.selected_section = Some(name.to_string());
        Ok(())
    }

    /// Abandon the phase being edited. FillPhase -> LoopDecision.
    pub fn cancel_phase(&mut self) -> Result<(), ControllerError> {
        self.require_state(SessionState::FillPhase, "cancel_phase")?;
        let submission = self.active_submission_mut("cancel_phase")?;
        submission.in_progress.clear();
        submission.selected_section = None;
        submission.justification_required = false;
        self.state = SessionState::LoopDecision;
        Ok(())
    }

    /// Snapshot the accumulated history for persistence.
    ///
    /// Leaves the state untouched so a failed write can simply retry with
    /// the same payload; call [`Self::mark_finished`] once the write
    /// succeeded.
    pub fn finish_payload(&self) -> Result<SubmissionPayload, ControllerError> {
        self.require_state(SessionState::LoopDecision, "finish_payload")?;
        let submission = self.active_submission("finish_payload")?;
        Ok(SubmissionPayload {
            submission_id: submission.submission_id,
            project_name: submission.project.name.clone(),
            project_metadata: submission.project.metadata.clone(),
            history: submission.history.clone(),
            started_at: submission.started_at,
        })
    }

    /// Seal the session after a successful persist. LoopDecision -> Finished.
    pub fn mark_finished(&mut self) -> Result<(), ControllerError> {
        self.require_state(SessionState::LoopDecision, "mark_finished")?;
        self.state = SessionState::Finished;
        Ok(())
    }

    /// Drop everything and return to Upload. Allowed from any state.
    pub fn reset(&mut self) {
        self.state = SessionState::Upload;
        self.catalog = None;
        self.projects = None;
        self.submission = None;
    }

    fn require_state(
        &self,
        expected: SessionState,
        operation: &'static str,
    ) -> Result<(), ControllerError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ControllerError::InvalidTransition {
                state: self.state,
                operation,
            })
        }
    }

    fn require_editing(&self, operation: &'static str) -> Result<(), ControllerError> {
        if matches!(
            self.state,
            SessionState::Identification | SessionState::FillPhase
        ) {
            Ok(())
        } else {
            Err(ControllerError::InvalidTransition {
                state: self.state,
                operation,
            })
        }
    }

    fn require_photo_question(
        &self,
        id: i64,
        operation: &'static str,
    ) -> Result<(), ControllerError> {
        if id == COMMENT_QUESTION_ID {
            return Err(ControllerError::AttachmentsNotAllowed(id));
        }
        let submission = self.active_submission(operation)?;
        let section = submission
            .selected_section
            .as_deref()
            .ok_or(ControllerError::NoSectionSelected)?;
        let row = self
            .loaded_catalog(operation)?
            .row(id)
            .ok_or(ControllerError::UnknownQuestion(id))?;
        if row.section != section {
            return Err(ControllerError::QuestionOutsideSection(id));
        }
        if row.question_type != QuestionType::Photo {
            return Err(ControllerError::AttachmentsNotAllowed(id));
        }
        Ok(())
    }

    fn loaded_catalog(&self, operation: &'static str) -> Result<&QuestionCatalog, ControllerError> {
        self.catalog
            .as_deref()
            .ok_or(ControllerError::InvalidTransition {
                state: self.state,
                operation,
            })
    }

    fn active_submission(&self, operation: &'static str) -> Result<&AuditSubmission, ControllerError> {
        self.submission
            .as_ref()
            .ok_or(ControllerError::InvalidTransition {
                state: self.state,
                operation,
            })
    }

    fn active_submission_mut(
        &mut self,
        operation: &'static str,
    ) -> Result<&mut AuditSubmission, ControllerError> {
        let state = self.state;
        self.submission
            .as_mut()
            .ok_or(ControllerError::InvalidTransition { state, operation })
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}
