//! Event types and EventBus for change notification fan-out
//!
//! Every mutation of a project, file, or analysis emits an event here; SSE
//! handlers forward them to connected browsers. Delivery is best-effort:
//! no persistence, no replay for late subscribers, no acknowledgement. The
//! UI must also fetch state directly and tolerate missed events.

use crate::models::{Analysis, MigrationFile, Project};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Codeshift event types
///
/// Serializes as a `{type, data}` envelope, e.g.
/// `{"type":"project_created","data":{...project...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum CodeshiftEvent {
    /// New project registered
    ProjectCreated(Project),
    /// Project fields changed (status, counters, metadata)
    ProjectUpdated(Project),
    /// Project deleted; its files and analyses are gone too
    ProjectDeleted { id: i64 },

    /// File attached to a project
    FileCreated(MigrationFile),
    /// File changed (typically translated code and status)
    FileUpdated(MigrationFile),
    /// File deleted; its analysis is gone too
    FileDeleted { id: i64 },

    /// Analysis stored for a file
    AnalysisCreated(Analysis),

    /// Single-file migration finished and was persisted
    #[serde(rename_all = "camelCase")]
    MigrationCompleted { file_id: i64, status: String },

    /// Tests were (re)generated for an already-migrated file
    #[serde(rename_all = "camelCase")]
    TestsGenerated { file_id: i64, generated_tests: String },
}

impl CodeshiftEvent {
    /// Get event type as string for filtering and SSE event names
    pub fn event_type(&self) -> &str {
        match self {
            CodeshiftEvent::ProjectCreated(_) => "project_created",
            CodeshiftEvent::ProjectUpdated(_) => "project_updated",
            CodeshiftEvent::ProjectDeleted { .. } => "project_deleted",
            CodeshiftEvent::FileCreated(_) => "file_created",
            CodeshiftEvent::FileUpdated(_) => "file_updated",
            CodeshiftEvent::FileDeleted { .. } => "file_deleted",
            CodeshiftEvent::AnalysisCreated(_) => "analysis_created",
            CodeshiftEvent::MigrationCompleted { .. } => "migration_completed",
            CodeshiftEvent::TestsGenerated { .. } => "tests_generated",
        }
    }
}

/// Central event distribution bus
///
/// Wraps tokio::broadcast:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
/// - Lagged message detection for slow subscribers
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CodeshiftEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events. Events emitted before subscription
    /// are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<CodeshiftEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring whether anyone is listening.
    ///
    /// All codeshift events are observability-only, so a missing subscriber
    /// is never an error.
    pub fn emit_lossy(&self, event: CodeshiftEvent) {
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
