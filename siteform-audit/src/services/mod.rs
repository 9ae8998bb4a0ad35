//! Loading services sitting between the upload API and the domain models

pub mod catalog_loader;

pub use catalog_loader::{load_projects, load_questions, RawRow};
