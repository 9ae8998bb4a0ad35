//! Event types for the SiteForm event system
//!
//! Provides the shared `AuditEvent` definitions and the broadcast `EventBus`
//! the audit service uses to notify SSE subscribers. Events describe session
//! lifecycle facts; they carry no engine state and are safe to drop when no
//! subscriber is listening.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Audit session events
///
/// Events are broadcast via [`EventBus`] and serialized for SSE transmission.
/// The `type` tag keeps payloads self-describing for browser clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AuditEvent {
    /// Question catalog and project table accepted
    CatalogLoaded {
        /// Section names in catalog order
        sections: Vec<String>,
        /// Number of question rows loaded
        question_count: usize,
        /// Number of projects loaded
        project_count: usize,
        /// When the tables were loaded
        timestamp: DateTime<Utc>,
    },

    /// Project chosen; a fresh submission was created
    SessionStarted {
        /// Submission identifier minted for this session
        submission_id: Uuid,
        /// Selected project name
        project_name: String,
        /// When the session started
        timestamp: DateTime<Utc>,
    },

    /// A section passed validation and was appended to the answer history
    SectionCommitted {
        submission_id: Uuid,
        /// Committed section name
        section: String,
        /// Number of answered questions in the committed map
        answered: usize,
        timestamp: DateTime<Utc>,
    },

    /// Validation rejected the in-progress section
    ///
    /// The session stays in its editing state; the missing-field list is
    /// returned on the submit response, not carried here.
    ValidationRejected {
        submission_id: Uuid,
        /// Section that failed validation
        section: String,
        /// Number of missing-field entries
        missing: usize,
        /// Whether the photo-count justification input should be revealed
        justification_required: bool,
        timestamp: DateTime<Utc>,
    },

    /// Full answer history persisted to the submission store
    SubmissionPersisted {
        submission_id: Uuid,
        /// Number of committed sections persisted
        sections: usize,
        timestamp: DateTime<Utc>,
    },

    /// Persistence attempt failed; in-memory history is intact and the
    /// finish call may simply be retried
    PersistenceFailed {
        submission_id: Uuid,
        /// Store error message (for diagnostics, not for parsing)
        error: String,
        timestamp: DateTime<Utc>,
    },

    /// Session state cleared back to the upload step
    SessionReset {
        timestamp: DateTime<Utc>,
    },
}

impl AuditEvent {
    /// Event type name, used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            AuditEvent::CatalogLoaded { .. } => "CatalogLoaded",
            AuditEvent::SessionStarted { .. } => "SessionStarted",
            AuditEvent::SectionCommitted { .. } => "SectionCommitted",
            AuditEvent::ValidationRejected { .. } => "ValidationRejected",
            AuditEvent::SubmissionPersisted { .. } => "SubmissionPersisted",
            AuditEvent::PersistenceFailed { .. } => "PersistenceFailed",
            AuditEvent::SessionReset { .. } => "SessionReset",
        }
    }
}

/// Broadcast bus connecting the session controller to SSE subscribers
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AuditEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity
    ///
    /// `capacity` is the number of events buffered before old events are
    /// dropped for slow subscribers.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<AuditEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if nobody is listening.
    pub fn emit(
        &self,
        event: AuditEvent,
    ) -> std::result::Result<usize, broadcast::error::SendError<AuditEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring whether anyone is listening
    ///
    /// Session notifications are non-critical: the engine result is always
    /// returned on the HTTP response, so a missed event loses nothing.
    pub fn emit_lossy(&self, event: AuditEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
