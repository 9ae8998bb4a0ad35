//! # SiteForm Common Library
//!
//! Shared code for the SiteForm services including:
//! - Error taxonomy (Error enum, Result alias)
//! - Configuration loading and root folder resolution
//! - Event types (AuditEvent enum) and the broadcast EventBus

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
