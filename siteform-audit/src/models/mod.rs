//! Domain models for the audit service

pub mod answers;
pub mod catalog;
pub mod project;

pub use answers::{AnswerMap, AnswerValue, AttachmentRef, MergedAnswers, SectionRecord};
pub use catalog::{Condition, QuestionCatalog, QuestionRow, QuestionType, COMMENT_QUESTION_ID};
pub use project::{coerce_quantity, ProjectRecord, ProjectTable};
