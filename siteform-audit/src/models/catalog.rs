//! Question catalog model
//!
//! The catalog is loaded once per session from the uploaded question table
//! and never mutated afterwards. Rows keep their upload order; the first
//! section encountered is the identification section.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use siteform_common::{Error, Result};

/// Reserved question id for the photo-count justification comment.
///
/// The comment question is injected by the engine, never part of an uploaded
/// catalog. It is always free text and only becomes required when the photo
/// reconciliation detects a count mismatch.
pub const COMMENT_QUESTION_ID: i64 = 100;

/// Question input type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    /// Free text input
    Text,
    /// Single choice among `options`
    Select,
    /// Numeric input
    Number,
    /// List of photo attachments
    Photo,
}

/// Parsed visibility condition
///
/// The catalog encodes conditions as a single equality predicate
/// `"<target_id> = <expected>"`. Parsing happens once at load time; a row
/// whose condition failed to parse carries `None` and is unconditionally
/// visible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Question id whose answer gates visibility
    pub target_id: i64,
    /// Expected answer, compared case-insensitively at evaluation time
    pub expected: String,
}

impl Condition {
    /// Parse a raw condition expression into a `Condition`.
    ///
    /// Returns `None` for every malformed input: blank expression, no `=`,
    /// or a non-integer target id. Malformed rules never block a question,
    /// they make it unconditionally visible.
    ///
    /// The expression splits on the first `=` only, so expected values may
    /// themselves contain `=`. One layer of matching surrounding quotes
    /// (`"…"` or `'…'`) is stripped from the expected value.
    pub fn parse(expr: &str) -> Option<Condition> {
        let expr = expr.trim();
        if expr.is_empty() {
            return None;
        }

        let (target_part, expected_part) = expr.split_once('=')?;
        let target_id: i64 = target_part.trim().parse().ok()?;

        Some(Condition {
            target_id,
            expected: strip_quotes(expected_part.trim()).to_string(),
        })
    }
}

/// Strip one layer of matching surrounding quotes
fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// One question definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRow {
    /// Unique id across the whole catalog (conditions join on it)
    pub id: i64,
    /// Section ("phase") this question belongs to
    pub section: String,
    /// Input type
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// Choices for `select` questions, empty otherwise
    pub options: Vec<String>,
    /// Whether the question must be answered when visible
    pub mandatory: bool,
    /// Display text, e.g. "Photo de la borne"
    pub description: String,
    /// Visibility condition, `None` when unconditionally visible
    pub condition: Option<Condition>,
}

/// Immutable question table, indexed by id and grouped by section
#[derive(Debug, Clone)]
pub struct QuestionCatalog {
    rows: Vec<QuestionRow>,
    /// Section names in first-seen order
    sections: Vec<String>,
    /// id -> position in `rows`
    index: HashMap<i64, usize>,
}

impl QuestionCatalog {
    /// Build a catalog from rows in upload order.
    ///
    /// Rejects an empty row set, duplicate ids, and any row claiming the
    /// reserved comment id.
    pub fn from_rows(rows: Vec<QuestionRow>) -> Result<Self> {
        if rows.is_empty() {
            return Err(Error::InvalidInput(
                "question catalog contains no rows".to_string(),
            ));
        }

        let mut sections: Vec<String> = Vec::new();
        let mut index = HashMap::with_capacity(rows.len());

        for (pos, row) in rows.iter().enumerate() {
            if row.id == COMMENT_QUESTION_ID {
                return Err(Error::InvalidInput(format!(
                    "question id {} is reserved for the justification comment",
                    COMMENT_QUESTION_ID
                )));
            }
            if index.insert(row.id, pos).is_some() {
                return Err(Error::InvalidInput(format!(
                    "duplicate question id {}",
                    row.id
                )));
            }
            if !sections.iter().any(|s| s == &row.section) {
                sections.push(row.section.clone());
            }
        }

        Ok(Self {
            rows,
            sections,
            index,
        })
    }

    /// All rows in catalog order
    pub fn rows(&self) -> &[QuestionRow] {
        &self.rows
    }

    /// Look up a row by question id
    pub fn row(&self, id: i64) -> Option<&QuestionRow> {
        self.index.get(&id).map(|&pos| &self.rows[pos])
    }

    /// Rows of one section, in catalog order
    pub fn section_rows(&self, section: &str) -> impl Iterator<Item = &QuestionRow> {
        let section = section.to_string();
        self.rows.iter().filter(move |row| row.section == section)
    }

    /// Section names in first-seen order
    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    /// The identification section is the first section in catalog order
    pub fn identification_section(&self) -> &str {
        &self.sections[0]
    }

    /// Sections available as repeatable phases (everything but identification)
    pub fn phase_sections(&self) -> Vec<&str> {
        self.sections.iter().skip(1).map(String::as_str).collect()
    }

    /// Whether `name` is a known section
    pub fn has_section(&self, name: &str) -> bool {
        self.sections.iter().any(|s| s == name)
    }

    /// Number of question rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
