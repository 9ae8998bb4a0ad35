//! The rule-evaluation engine
//!
//! Three pure building blocks: condition evaluation decides which questions
//! are visible, photo reconciliation compares expected and attached photo
//! counts, and the section validator combines both into the commit
//! decision. All functions here are total; malformed input degrades to the
//! documented fallback instead of erroring.

pub mod reconciliation;
pub mod validator;
pub mod visibility;

pub use reconciliation::{reconcile, PhotoReconciliation};
pub use validator::{validate_section, MissingField, ValidationReport};
pub use visibility::is_visible;
