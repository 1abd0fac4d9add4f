//! Post-mutation change notification port
//!
//! The sink is injected into the record services so they stay testable
//! without a live transport. Delivery is fire-and-forget: a failing sink
//! reports the error to the caller, who logs and drops it; it must never
//! fail the mutation that produced the event.

use parking_lot::Mutex;
use serde::Serialize;

/// Notification delivery result type
pub type NotifyResult<T> = Result<T, NotifyError>;

/// Notification transport errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport error: {0}")]
    Transport(String),
}

/// What happened to a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordAction {
    Changed,
    Deleted,
}

impl RecordAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Changed => "changed",
            Self::Deleted => "deleted",
        }
    }
}

/// Change signal emitted after a successful mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecordEvent {
    pub kind: &'static str,
    pub id: i64,
    pub action: RecordAction,
}

impl RecordEvent {
    pub fn changed(kind: &'static str, id: i64) -> Self {
        Self { kind, id, action: RecordAction::Changed }
    }

    pub fn deleted(kind: &'static str, id: i64) -> Self {
        Self { kind, id, action: RecordAction::Deleted }
    }

    /// Wire name, e.g. `incident_changed`.
    pub fn name(&self) -> String {
        format!("{}_{}", self.kind, self.action.as_str())
    }
}

/// Notification sink port.
pub trait NotificationSink: Send + Sync {
    fn emit(&self, event: &RecordEvent) -> NotifyResult<()>;
}

/// Sink that drops every event.
#[derive(Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn emit(&self, _event: &RecordEvent) -> NotifyResult<()> {
        Ok(())
    }
}

/// Sink that captures emitted events (for testing)
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<RecordEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.events.lock().len()
    }
}

impl NotificationSink for RecordingSink {
    fn emit(&self, event: &RecordEvent) -> NotifyResult<()> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}
