//! Audit events and the sinks that receive them
//!
//! Services emit one [`AuditEvent`] per created, modified, removed or accessed
//! record through an [`AuditRecorder`]. The recorder never fails: a sink error
//! is logged and dropped so the business operation goes on.
//!
//! # Usage
//!
//! ```rust,ignore
//! let sink = Arc::new(MemoryAuditSink::new());
//! let recorder = AuditRecorder::new(sink.clone());
//!
//! recorder.record(
//!     "alice",
//!     AuditOperationType::Create,
//!     "enclosure",
//!     "enclosure.create",
//!     AuditSubject::Identifier("1".into()),
//! );
//! assert_eq!(sink.count(), 1);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Suffix of the action name for each audited operation
pub const ACTION_CREATE: &str = ".create";
pub const ACTION_UPDATE: &str = ".update";
pub const ACTION_DELETE: &str = ".delete";
pub const ACTION_ACCESS: &str = ".access";
pub const ACTION_ACCESS_PAGE: &str = ".access.page";

/// Kind of operation an audit event describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditOperationType {
    Create,
    Modify,
    Remove,
    Access,
}

impl fmt::Display for AuditOperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuditOperationType::Create => "CREATE",
            AuditOperationType::Modify => "MODIFY",
            AuditOperationType::Remove => "REMOVE",
            AuditOperationType::Access => "ACCESS",
        };
        f.write_str(name)
    }
}

/// What an audit event is about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AuditSubject {
    /// The string form of a record identity
    Identifier(String),
    /// A snapshot of the transfer object that was written
    Object(serde_json::Value),
    /// A page of records
    Page,
}

impl AuditSubject {
    pub fn identifier(id: impl ToString) -> Self {
        AuditSubject::Identifier(id.to_string())
    }

    /// Snapshot a serializable value, falling back to `null`
    pub fn object<T: Serialize>(value: &T) -> Self {
        AuditSubject::Object(serde_json::to_value(value).unwrap_or(serde_json::Value::Null))
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            AuditSubject::Identifier(id) => Some(id),
            _ => None,
        }
    }
}

/// An immutable audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID
    pub id: Uuid,
    pub actor: String,
    pub operation: AuditOperationType,
    pub resource_type: String,
    pub action: String,
    pub subject: AuditSubject,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        actor: impl Into<String>,
        operation: AuditOperationType,
        resource_type: impl Into<String>,
        action: impl Into<String>,
        subject: AuditSubject,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor: actor.into(),
            operation,
            resource_type: resource_type.into(),
            action: action.into(),
            subject,
            timestamp: Utc::now(),
        }
    }
}

/// Failure reported by an audit sink
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit sink '{sink}' rejected the event: {message}")]
    Rejected { sink: String, message: String },
}

/// Destination of audit events
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError>;
}

/// Writes every event as a structured `tracing` event under target `audit`
#[derive(Debug, Default, Clone)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        let subject = match &event.subject {
            AuditSubject::Identifier(id) => id.clone(),
            AuditSubject::Object(value) => value.to_string(),
            AuditSubject::Page => "page".to_string(),
        };
        tracing::info!(
            target: "audit",
            event_id = %event.id,
            actor = %event.actor,
            operation = %event.operation,
            resource_type = %event.resource_type,
            action = %event.action,
            subject = %subject,
            "audit event"
        );
        Ok(())
    }
}

/// Keeps events in memory, mostly for tests and diagnostics
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events, oldest first
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Events of one operation type
    pub fn events_of(&self, operation: AuditOperationType) -> Vec<AuditEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.operation == operation)
            .collect()
    }

    pub fn count(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        let mut events = self.events.lock().map_err(|e| AuditError::Rejected {
            sink: "memory".to_string(),
            message: e.to_string(),
        })?;
        events.push(event.clone());
        Ok(())
    }
}

/// Publishes events on a `tokio::sync::broadcast` channel
///
/// Publishing without subscribers is not an error; the event is dropped.
#[derive(Debug, Clone)]
pub struct BroadcastAuditSink {
    sender: broadcast::Sender<AuditEvent>,
}

impl BroadcastAuditSink {
    /// Create a sink with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Receive all future events
    pub fn subscribe(&self) -> broadcast::Receiver<AuditEvent> {
        self.sender.subscribe()
    }

    /// Get the current number of active subscribers
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastAuditSink {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl AuditSink for BroadcastAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        // send() only fails when nobody listens
        let _ = self.sender.send(event.clone());
        Ok(())
    }
}

/// Discards every event
#[derive(Debug, Default, Clone)]
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn record(&self, _event: &AuditEvent) -> Result<(), AuditError> {
        Ok(())
    }
}

/// Front door for services: builds events and hands them to the sink
#[derive(Clone)]
pub struct AuditRecorder {
    sink: Arc<dyn AuditSink>,
}

impl AuditRecorder {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Recorder that writes to `tracing`
    pub fn tracing() -> Self {
        Self::new(Arc::new(TracingAuditSink))
    }

    /// Record one event. Never fails.
    pub fn record(
        &self,
        actor: &str,
        operation: AuditOperationType,
        resource_type: &str,
        action: &str,
        subject: AuditSubject,
    ) {
        let event = AuditEvent::new(actor, operation, resource_type, action, subject);
        tracing::debug!(
            actor = %event.actor,
            operation = %event.operation,
            action = %event.action,
            "recording audit event"
        );
        if let Err(e) = self.sink.record(&event) {
            tracing::warn!(
                error = %e,
                action = %event.action,
                "failed to record audit event"
            );
        }
    }
}

impl Default for AuditRecorder {
    fn default() -> Self {
        Self::tracing()
    }
}

impl fmt::Debug for AuditRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditRecorder").finish_non_exhaustive()
    }
}
