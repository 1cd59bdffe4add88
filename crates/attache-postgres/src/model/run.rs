//! Conversation run model for PostgreSQL database operations.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::runs;
use crate::types::RunStatus;

/// Run model representing one execution context of the agent.
///
/// A run carries the declared list of attached file ids; the retrieval tool
/// resolves that list into a frozen binding when the run is configured.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = runs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Run {
    /// Unique run identifier.
    pub id: Uuid,
    /// Conversation thread this run belongs to.
    pub thread_id: Uuid,
    /// Current lifecycle status.
    pub status: RunStatus,
    /// Files attached to this run, in declaration order.
    pub file_ids: Vec<Uuid>,
    /// Timestamp when the run was created.
    pub created_at: Timestamp,
    /// Timestamp when the run was last updated.
    pub updated_at: Timestamp,
}

/// Data for creating a new run.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = runs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewRun {
    /// Conversation thread (required).
    pub thread_id: Uuid,
    /// Initial status.
    pub status: Option<RunStatus>,
    /// Attached file ids, in declaration order.
    pub file_ids: Vec<Uuid>,
}

impl Run {
    /// Returns whether any files are attached to this run.
    pub fn has_files(&self) -> bool {
        !self.file_ids.is_empty()
    }
}
