//! HTTP API handlers for siteform-audit
//!
//! REST endpoints plus one SSE stream; the session controller behind
//! `AppState` does the actual work.

pub mod answers;
pub mod catalog;
pub mod health;
pub mod session;
pub mod sse;
pub mod submissions;

pub use answers::answer_routes;
pub use catalog::catalog_routes;
pub use health::health_routes;
pub use session::session_routes;
pub use sse::event_stream;
pub use submissions::submission_routes;
