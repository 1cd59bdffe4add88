//! Run status enumeration for conversation run lifecycle management.

use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Defines the current status of a conversation run.
///
/// This enumeration corresponds to the `RUN_STATUS` PostgreSQL enum and tracks
/// a run from the moment it is queued until it reaches a terminal state.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::RunStatus"]
pub enum RunStatus {
    /// Run has been created and is waiting to be picked up
    #[db_rename = "queued"]
    #[serde(rename = "queued")]
    #[default]
    Queued,

    /// Run is currently executing
    #[db_rename = "in_progress"]
    #[serde(rename = "in_progress")]
    InProgress,

    /// Run finished successfully
    #[db_rename = "completed"]
    #[serde(rename = "completed")]
    Completed,

    /// Run failed with an error
    #[db_rename = "failed"]
    #[serde(rename = "failed")]
    Failed,

    /// Run was cancelled before completion
    #[db_rename = "cancelled"]
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl RunStatus {
    /// Returns whether the run is still waiting or executing.
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, RunStatus::Queued | RunStatus::InProgress)
    }

    /// Returns whether the run reached a terminal state.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !self.is_active()
    }

    /// Returns whether the run finished successfully.
    #[inline]
    pub fn is_completed(self) -> bool {
        matches!(self, RunStatus::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(RunStatus::Queued.is_active());
        assert!(RunStatus::InProgress.is_active());
        assert!(RunStatus::Completed.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
        assert!(RunStatus::Cancelled.is_terminal());
        assert!(RunStatus::Completed.is_completed());
        assert!(!RunStatus::Failed.is_completed());
    }

    #[test]
    fn serde_renames() {
        let json = serde_json::to_string(&RunStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
