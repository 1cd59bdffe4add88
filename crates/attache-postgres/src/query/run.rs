//! Run repository for conversation run records.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{NewRun, Run};
use crate::types::RunStatus;
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for run table operations.
pub trait RunRepository {
    /// Creates a new run.
    fn create_run(&mut self, new_run: NewRun) -> impl Future<Output = PgResult<Run>> + Send;

    /// Finds a run by its unique identifier.
    fn find_run_by_id(
        &mut self,
        run_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Run>>> + Send;

    /// Updates the lifecycle status of a run.
    fn update_run_status(
        &mut self,
        run_id: Uuid,
        status: RunStatus,
    ) -> impl Future<Output = PgResult<Run>> + Send;
}

impl RunRepository for PgConnection {
    async fn create_run(&mut self, new_run: NewRun) -> PgResult<Run> {
        use schema::runs;

        let run = diesel::insert_into(runs::table)
            .values(&new_run)
            .returning(Run::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(run)
    }

    async fn find_run_by_id(&mut self, run_id: Uuid) -> PgResult<Option<Run>> {
        use schema::runs::{self, dsl};

        let run = runs::table
            .filter(dsl::id.eq(run_id))
            .select(Run::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(run)
    }

    async fn update_run_status(&mut self, run_id: Uuid, status: RunStatus) -> PgResult<Run> {
        use diesel::dsl::now;
        use schema::runs::{self, dsl};

        let run = diesel::update(runs::table.filter(dsl::id.eq(run_id)))
            .set((dsl::status.eq(status), dsl::updated_at.eq(now)))
            .returning(Run::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(run)
    }
}
