//! Answer values, the per-section answer map, and the merged answer view
//!
//! Answers live in two places during a session: the mutable in-progress map
//! of the section being edited, and the append-only history of committed
//! sections. Visibility conditions consult the merged view of both.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reference to a stored attachment
///
/// The engine only ever tracks names and sizes; attachment bytes never pass
/// through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    /// File name, unique within one photo question
    pub name: String,
    /// Reported size, when the store provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

/// One answer
///
/// Serialized untagged so the wire shape stays natural: a JSON string,
/// number, attachment array, or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// Photo attachments (photo questions only)
    Photos(Vec<AttachmentRef>),
    /// Numeric answer
    Number(f64),
    /// Free text or selected option
    Text(String),
    /// Explicitly cleared / never filled
    Empty,
}

impl AnswerValue {
    /// Whether this value counts as unanswered for mandatory-field checks.
    ///
    /// Empty text and numeric zero both count as unanswered; an empty photo
    /// list does too.
    pub fn is_unanswered(&self) -> bool {
        match self {
            AnswerValue::Empty => true,
            AnswerValue::Text(s) => s.is_empty(),
            AnswerValue::Number(n) => *n == 0.0,
            AnswerValue::Photos(photos) => photos.is_empty(),
        }
    }

    /// Textual form used for condition comparison.
    ///
    /// Returns `None` for values that cannot act as a condition target
    /// (photo lists, cleared answers); a `None` here means the target counts
    /// as unanswered and the dependent question stays hidden.
    pub fn condition_text(&self) -> Option<String> {
        match self {
            AnswerValue::Text(s) => Some(s.clone()),
            // f64 Display renders whole numbers without a decimal point,
            // so Number(4.0) compares equal to an expected "4"
            AnswerValue::Number(n) => Some(n.to_string()),
            AnswerValue::Photos(_) | AnswerValue::Empty => None,
        }
    }

    /// The attachment list of a photo answer, empty for anything else
    pub fn photos(&self) -> &[AttachmentRef] {
        match self {
            AnswerValue::Photos(photos) => photos,
            _ => &[],
        }
    }
}

/// Answers of one section, keyed by question id
pub type AnswerMap = BTreeMap<i64, AnswerValue>;

/// A committed section: one entry of the answer history
///
/// Created by copy on successful validation; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionRecord {
    /// Section name
    pub section: String,
    /// Answer snapshot taken at commit time
    pub answers: AnswerMap,
    /// Commit timestamp
    pub committed_at: DateTime<Utc>,
}

/// Merged answer view: in-progress answers overlaid on committed history
///
/// Lookups hit the in-progress map first, then history entries newest
/// first. Borrows both sides, so building one per evaluation is free.
#[derive(Debug, Clone, Copy)]
pub struct MergedAnswers<'a> {
    in_progress: &'a AnswerMap,
    history: &'a [SectionRecord],
}

impl<'a> MergedAnswers<'a> {
    pub fn new(in_progress: &'a AnswerMap, history: &'a [SectionRecord]) -> Self {
        Self {
            in_progress,
            history,
        }
    }

    /// Look up the effective answer for a question id
    pub fn get(&self, id: i64) -> Option<&'a AnswerValue> {
        if let Some(value) = self.in_progress.get(&id) {
            return Some(value);
        }
        self.history
            .iter()
            .rev()
            .find_map(|record| record.answers.get(&id))
    }
}
