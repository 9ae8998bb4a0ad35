//! Condition evaluation
//!
//! Decides whether a question is currently visible, given the merged answer
//! view. Malformed rules fail open: the catalog loader collapses them to
//! "no condition", so the question shows. An unanswered target question
//! fails closed: follow-up questions stay hidden until their parent is
//! answered.

use crate::models::{MergedAnswers, QuestionRow};

/// Whether `row` is visible against the merged answer view.
///
/// A row without a parsed condition is unconditionally visible. Otherwise
/// the target question's answer is compared to the expected value,
/// case-insensitively, after both sides are rendered as text. Conditions
/// may target questions answered in earlier, already-committed sections.
pub fn is_visible(row: &QuestionRow, answers: &MergedAnswers) -> bool {
    let Some(condition) = &row.condition else {
        return true;
    };

    let Some(answer) = answers.get(condition.target_id) else {
        return false;
    };
    let Some(answer_text) = answer.condition_text() else {
        // Cleared answers and photo lists cannot satisfy an equality
        // predicate; the target counts as unanswered
        return false;
    };

    answer_text.to_lowercase() == condition.expected.to_lowercase()
}
