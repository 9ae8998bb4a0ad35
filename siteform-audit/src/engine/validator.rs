//! Section validation
//!
//! Runs the mandatory-field pass over the section's visible questions, then
//! applies the photo-count comment gate. The validator is atomic: it
//! returns the complete list of missing fields, not just the first, and the
//! only mutation it ever performs is removing a stale justification comment
//! once the photo count is no longer incorrect.

use serde::Serialize;

use crate::engine::reconciliation::{reconcile, PhotoReconciliation};
use crate::engine::visibility::is_visible;
use crate::models::{
    AnswerMap, AnswerValue, MergedAnswers, ProjectRecord, QuestionCatalog, QuestionRow,
    QuestionType, SectionRecord, COMMENT_QUESTION_ID,
};

/// One missing mandatory field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingField {
    /// Question id, `100` for the justification-comment requirement
    pub question_id: i64,
    /// User-facing message, e.g. `Question 4 : Photo de la borne`
    pub message: String,
}

/// Result of validating a section's in-progress answers
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Whether the section may be committed
    pub ok: bool,
    /// Missing fields in catalog order, comment requirement last
    pub missing: Vec<MissingField>,
    /// Whether the justification-comment input should be shown
    pub justification_required: bool,
}

/// Validate a section's in-progress answers against the catalog.
///
/// Iterates the section's rows in catalog order, skipping hidden rows, and
/// reports every visible mandatory question whose answer is absent or
/// empty. Photo questions are relaxed when the section-level photo count is
/// sufficient or a justification comment is present. The exact-match gate
/// then demands a comment for any count mismatch, and removes a stray
/// comment when the count is not incorrect.
pub fn validate_section(
    section: &str,
    catalog: &QuestionCatalog,
    in_progress: &mut AnswerMap,
    history: &[SectionRecord],
    project: &ProjectRecord,
) -> ValidationReport {
    let rows: Vec<&QuestionRow> = catalog.section_rows(section).collect();

    let (missing, reconciliation) = {
        let merged = MergedAnswers::new(in_progress, history);
        let reconciliation = reconcile(section, &rows, in_progress, &merged, project);
        let comment_present = comment_filled(in_progress);
        let relax_photos = reconciliation.is_sufficient() || comment_present;

        let mut missing: Vec<MissingField> = Vec::new();
        for row in &rows {
            if !row.mandatory || !is_visible(row, &merged) {
                continue;
            }
            if answer_missing(row, in_progress.get(&row.id)) {
                if row.question_type == QuestionType::Photo && relax_photos {
                    continue;
                }
                missing.push(MissingField {
                    question_id: row.id,
                    message: format!("Question {} : {}", row.id, row.description),
                });
            }
        }

        if reconciliation.is_count_incorrect() && !comment_present {
            missing.push(comment_requirement(&reconciliation));
        }

        (missing, reconciliation)
    };

    if !reconciliation.is_count_incorrect() {
        // A justification nobody needed must not outlive the discrepancy
        in_progress.remove(&COMMENT_QUESTION_ID);
    }

    ValidationReport {
        ok: missing.is_empty(),
        missing,
        justification_required: reconciliation.is_count_incorrect(),
    }
}

/// Whether a mandatory row's own answer counts as missing
fn answer_missing(row: &QuestionRow, value: Option<&AnswerValue>) -> bool {
    match value {
        None => true,
        Some(value) => match row.question_type {
            // A photo answer must be a non-empty attachment list
            QuestionType::Photo => value.photos().is_empty(),
            _ => value.is_unanswered(),
        },
    }
}

/// Whether the justification comment carries non-blank content
fn comment_filled(answers: &AnswerMap) -> bool {
    match answers.get(&COMMENT_QUESTION_ID) {
        Some(AnswerValue::Text(text)) => !text.trim().is_empty(),
        Some(AnswerValue::Number(_)) => true,
        _ => false,
    }
}

fn comment_requirement(reconciliation: &PhotoReconciliation) -> MissingField {
    MissingField {
        question_id: COMMENT_QUESTION_ID,
        message: format!(
            "Question {} : Commentaire justificatif requis (photos attendues : {}, photos reçues : {})",
            COMMENT_QUESTION_ID,
            reconciliation.expected_total.unwrap_or(0),
            reconciliation.actual_count
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttachmentRef, Condition};
    use serde_json::json;

    fn question(
        id: i64,
        section: &str,
        question_type: QuestionType,
        mandatory: bool,
        description: &str,
    ) -> QuestionRow {
        QuestionRow {
            id,
            section: section.to_string(),
            question_type,
            options: Vec::new(),
            mandatory,
            description: description.to_string(),
            condition: None,
        }
    }

    fn ac_catalog() -> QuestionCatalog {
        QuestionCatalog::from_rows(vec![question(
            1,
            "Bornes AC",
            QuestionType::Photo,
            true,
            "Photo de la borne",
        )])
        .unwrap()
    }

    fn ac_project(quantity: &str) -> ProjectRecord {
        ProjectRecord {
            name: "Site Test".to_string(),
            metadata: [("L [Plan de Déploiement]".to_string(), json!(quantity))]
                .into_iter()
                .collect(),
        }
    }

    fn photos(count: usize) -> AnswerValue {
        AnswerValue::Photos(
            (0..count)
                .map(|i| AttachmentRef {
                    name: format!("photo-{}.jpg", i),
                    size_bytes: None,
                })
                .collect(),
        )
    }

    fn text(value: &str) -> AnswerValue {
        AnswerValue::Text(value.to_string())
    }

    #[test]
    fn reports_every_missing_mandatory_field() {
        let catalog = QuestionCatalog::from_rows(vec![
            question(1, "Identification", QuestionType::Text, true, "Nom du site"),
            question(2, "Identification", QuestionType::Select, true, "Type de visite"),
            question(3, "Identification", QuestionType::Number, true, "Nombre de bornes"),
            question(4, "Identification", QuestionType::Text, false, "Remarques"),
        ])
        .unwrap();
        let project = ac_project("0");

        let mut answers = AnswerMap::new();
        answers.insert(2, text(""));
        answers.insert(3, AnswerValue::Number(0.0));

        let report = validate_section("Identification", &catalog, &mut answers, &[], &project);

        assert!(!report.ok);
        let messages: Vec<&str> = report.missing.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(
            messages,
            [
                "Question 1 : Nom du site",
                "Question 2 : Type de visite",
                "Question 3 : Nombre de bornes",
            ]
        );
        assert!(!report.justification_required);
    }

    #[test]
    fn hidden_mandatory_questions_are_skipped() {
        let mut conditional = question(2, "Identification", QuestionType::Text, true, "Précisez");
        conditional.condition = Some(Condition {
            target_id: 1,
            expected: "oui".to_string(),
        });
        let catalog = QuestionCatalog::from_rows(vec![
            question(1, "Identification", QuestionType::Select, true, "Problème constaté"),
            conditional,
        ])
        .unwrap();
        let project = ac_project("0");

        let mut answers = AnswerMap::new();
        answers.insert(1, text("non"));

        let report = validate_section("Identification", &catalog, &mut answers, &[], &project);
        assert!(report.ok, "hidden follow-up must not be required: {:?}", report.missing);

        // Flip the parent: the follow-up becomes visible and required
        answers.insert(1, text("oui"));
        let report = validate_section("Identification", &catalog, &mut answers, &[], &project);
        assert!(!report.ok);
        assert_eq!(report.missing[0].question_id, 2);
    }

    #[test]
    fn sufficiency_relaxes_mandatory_photo_rows() {
        let catalog = QuestionCatalog::from_rows(vec![
            question(1, "Bornes AC", QuestionType::Photo, true, "Photo de la borne"),
            question(2, "Bornes AC", QuestionType::Photo, true, "Photo du socle"),
        ])
        .unwrap();
        let project = ac_project("2");

        // expected 2 * 2 = 4, all four photos on row 1, row 2 empty
        let mut answers = AnswerMap::new();
        answers.insert(1, photos(4));

        let report = validate_section("Bornes AC", &catalog, &mut answers, &[], &project);
        assert!(report.ok, "{:?}", report.missing);
        assert!(!report.justification_required);
    }

    #[test]
    fn overage_requires_comment_even_though_sufficient() {
        let catalog = ac_catalog();
        let project = ac_project("4");

        let mut answers = AnswerMap::new();
        answers.insert(1, photos(6));

        let report = validate_section("Bornes AC", &catalog, &mut answers, &[], &project);

        assert!(!report.ok);
        assert_eq!(report.missing.len(), 1);
        assert_eq!(report.missing[0].question_id, COMMENT_QUESTION_ID);
        assert!(report.justification_required);

        // A non-blank comment satisfies the gate
        answers.insert(COMMENT_QUESTION_ID, text("Deux bornes supplémentaires posées"));
        let report = validate_section("Bornes AC", &catalog, &mut answers, &[], &project);
        assert!(report.ok);
        assert!(report.justification_required);
        assert!(answers.contains_key(&COMMENT_QUESTION_ID));
    }

    #[test]
    fn blank_comment_does_not_satisfy_the_gate() {
        let catalog = ac_catalog();
        let project = ac_project("4");

        let mut answers = AnswerMap::new();
        answers.insert(1, photos(6));
        answers.insert(COMMENT_QUESTION_ID, text("   "));

        let report = validate_section("Bornes AC", &catalog, &mut answers, &[], &project);
        assert!(!report.ok);
        assert_eq!(report.missing[0].question_id, COMMENT_QUESTION_ID);
    }

    #[test]
    fn exact_count_removes_stale_comment() {
        let catalog = ac_catalog();
        let project = ac_project("4");

        let mut answers = AnswerMap::new();
        answers.insert(1, photos(4));
        answers.insert(COMMENT_QUESTION_ID, text("plus nécessaire"));

        let report = validate_section("Bornes AC", &catalog, &mut answers, &[], &project);

        assert!(report.ok);
        assert!(!report.justification_required);
        assert!(!answers.contains_key(&COMMENT_QUESTION_ID));
    }

    #[test]
    fn revalidation_is_idempotent() {
        let catalog = ac_catalog();
        let project = ac_project("4");

        let mut answers = AnswerMap::new();
        answers.insert(1, photos(2));

        let first = validate_section("Bornes AC", &catalog, &mut answers, &[], &project);
        let snapshot = answers.clone();
        let second = validate_section("Bornes AC", &catalog, &mut answers, &[], &project);

        assert_eq!(first.ok, second.ok);
        assert_eq!(first.missing, second.missing);
        assert_eq!(first.justification_required, second.justification_required);
        assert_eq!(answers, snapshot);
    }

    // Walks the reference scenario end to end: 0 photos, then the exact
    // count, then an overage without and with a justification.
    #[test]
    fn charge_point_audit_scenario() {
        let catalog = ac_catalog();
        let project = ac_project("4");

        let mut answers = AnswerMap::new();
        let report = validate_section("Bornes AC", &catalog, &mut answers, &[], &project);
        assert!(!report.ok);
        assert_eq!(report.missing.len(), 2);
        assert_eq!(report.missing[0].message, "Question 1 : Photo de la borne");
        assert_eq!(
            report.missing[1].message,
            "Question 100 : Commentaire justificatif requis (photos attendues : 4, photos reçues : 0)"
        );
        assert!(report.justification_required);

        answers.insert(1, photos(4));
        let report = validate_section("Bornes AC", &catalog, &mut answers, &[], &project);
        assert!(report.ok);
        assert!(report.missing.is_empty());

        answers.insert(1, photos(5));
        let report = validate_section("Bornes AC", &catalog, &mut answers, &[], &project);
        assert!(!report.ok);
        assert_eq!(report.missing.len(), 1);
        assert_eq!(report.missing[0].question_id, COMMENT_QUESTION_ID);

        answers.insert(COMMENT_QUESTION_ID, text("Une borne condamnée, photo en double"));
        let report = validate_section("Bornes AC", &catalog, &mut answers, &[], &project);
        assert!(report.ok);
    }

    #[test]
    fn cross_phase_condition_uses_committed_history() {
        let mut follow_up = question(5, "Bornes AC", QuestionType::Text, true, "Précisez l'accès");
        follow_up.condition = Some(Condition {
            target_id: 2,
            expected: "difficile".to_string(),
        });
        let catalog = QuestionCatalog::from_rows(vec![
            question(2, "Identification", QuestionType::Select, true, "Accès au site"),
            follow_up,
        ])
        .unwrap();
        let project = ac_project("0");

        let mut committed = AnswerMap::new();
        committed.insert(2, text("Difficile"));
        let history = vec![SectionRecord {
            section: "Identification".to_string(),
            answers: committed,
            committed_at: chrono::Utc::now(),
        }];

        let mut answers = AnswerMap::new();
        let report = validate_section("Bornes AC", &catalog, &mut answers, &history, &project);

        assert!(!report.ok);
        assert_eq!(report.missing[0].question_id, 5);
    }
}
