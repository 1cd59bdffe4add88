//! File repository for directory lookups of uploaded files.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{File, NewFile};
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Repository for file table operations.
///
/// `find_files_by_ids` is the directory lookup the retrieval tool uses to
/// bind a run's declared file ids to filename/storage-key records.
pub trait FileRepository {
    /// Creates a new file record.
    fn create_file(&mut self, new_file: NewFile) -> impl Future<Output = PgResult<File>> + Send;

    /// Finds a file by its unique identifier.
    fn find_file_by_id(
        &mut self,
        file_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<File>>> + Send;

    /// Finds multiple files by their IDs.
    ///
    /// Soft-deleted files are excluded; ids with no surviving record are
    /// simply absent from the result. Row order follows the database, not
    /// the id list.
    fn find_files_by_ids(
        &mut self,
        file_ids: &[Uuid],
    ) -> impl Future<Output = PgResult<Vec<File>>> + Send;

    /// Soft deletes a file by setting the deletion timestamp.
    fn delete_file(&mut self, file_id: Uuid) -> impl Future<Output = PgResult<()>> + Send;
}

impl FileRepository for PgConnection {
    async fn create_file(&mut self, new_file: NewFile) -> PgResult<File> {
        use schema::files;

        let file = diesel::insert_into(files::table)
            .values(&new_file)
            .returning(File::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            file_id = %file.id,
            filename = %file.filename,
            "Created file record"
        );

        Ok(file)
    }

    async fn find_file_by_id(&mut self, file_id: Uuid) -> PgResult<Option<File>> {
        use schema::files::{self, dsl};

        let file = files::table
            .filter(dsl::id.eq(file_id))
            .filter(dsl::deleted_at.is_null())
            .select(File::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(file)
    }

    async fn find_files_by_ids(&mut self, file_ids: &[Uuid]) -> PgResult<Vec<File>> {
        use schema::files::{self, dsl};

        let files = files::table
            .filter(dsl::id.eq_any(file_ids))
            .filter(dsl::deleted_at.is_null())
            .select(File::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            requested = file_ids.len(),
            resolved = files.len(),
            "Resolved file ids"
        );

        Ok(files)
    }

    async fn delete_file(&mut self, file_id: Uuid) -> PgResult<()> {
        use diesel::dsl::now;
        use schema::files::{self, dsl};

        diesel::update(files::table.filter(dsl::id.eq(file_id)))
            .set(dsl::deleted_at.eq(now))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(())
    }
}
