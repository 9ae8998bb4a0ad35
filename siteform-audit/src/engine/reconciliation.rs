//! Photo-count reconciliation
//!
//! Certain sections must document every installed equipment unit with
//! photos. The expected count comes from the project metadata (how many
//! units the deployment plan lists), multiplied by the number of visible
//! photo questions in the section; the actual count is what the technician
//! attached. Sufficiency and exact match are assessed separately: a
//! sufficient count relaxes per-field mandatory checks, while any exact
//! mismatch (shortage or overage) demands a justification comment.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::engine::visibility::is_visible;
use crate::models::{AnswerMap, MergedAnswers, ProjectRecord, QuestionRow, QuestionType};

/// Project-metadata fields summed per reconciled section.
///
/// "L" counts the slow (AC) charge points of the deployment plan, "R" the
/// rapid (DC) ones. Sections absent from this table are not reconciled.
static RECONCILED_SECTIONS: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    HashMap::from([
        ("Bornes AC", vec!["L [Plan de Déploiement]"]),
        ("Bornes DC", vec!["R [Plan de Déploiement]"]),
        (
            "Zone de recharge",
            vec!["L [Plan de Déploiement]", "R [Plan de Déploiement]"],
        ),
    ])
});

/// Outcome of the photo-count reconciliation for one section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoReconciliation {
    /// Expected photo total: base quantity times visible photo questions.
    /// `None` when the section is not reconciled at all.
    pub expected_total: Option<i64>,
    /// Photos actually attached across the section's visible photo questions
    pub actual_count: i64,
    /// Whether the section has any visible photo question
    pub photo_questions_found: bool,
}

impl PhotoReconciliation {
    /// Whether the attached photos satisfy the expected count.
    ///
    /// Holds when the rule is inapplicable, the expectation is zero or
    /// negative, or enough photos were attached. Sufficiency relaxes the
    /// per-field mandatory check on photo questions.
    pub fn is_sufficient(&self) -> bool {
        match self.expected_total {
            None => true,
            Some(expected) => expected <= 0 || self.actual_count >= expected,
        }
    }

    /// Whether the count is incorrect in the strict sense.
    ///
    /// Any difference counts, shortage or overage; an overage still needs a
    /// justification even though it is "sufficient".
    pub fn is_count_incorrect(&self) -> bool {
        match self.expected_total {
            Some(expected) if self.photo_questions_found && expected > 0 => {
                self.actual_count != expected
            }
            _ => false,
        }
    }
}

/// Reconcile the photo count for one section.
///
/// `rows` is the section's question rows in catalog order. Visibility is
/// evaluated against the merged view; attachment counts are read from the
/// in-progress answers only.
pub fn reconcile(
    section: &str,
    rows: &[&QuestionRow],
    in_progress: &AnswerMap,
    merged: &MergedAnswers,
    project: &ProjectRecord,
) -> PhotoReconciliation {
    let expected_base: Option<i64> = RECONCILED_SECTIONS
        .get(section)
        .map(|fields| fields.iter().map(|field| project.quantity(field)).sum());

    let mut photo_question_count: i64 = 0;
    let mut actual_count: i64 = 0;
    for row in rows {
        if row.question_type != QuestionType::Photo || !is_visible(row, merged) {
            continue;
        }
        photo_question_count += 1;
        if let Some(value) = in_progress.get(&row.id) {
            actual_count += value.photos().len() as i64;
        }
    }

    // One plan quantity per photo angle: the base multiplies by the number
    // of visible photo questions, zero and absent bases stay as they are
    let expected_total = match expected_base {
        Some(base) if base > 0 => Some(base * photo_question_count),
        other => other,
    };

    PhotoReconciliation {
        expected_total,
        actual_count,
        photo_questions_found: photo_question_count > 0,
    }
}
