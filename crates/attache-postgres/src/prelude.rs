//! Prelude module for convenient imports.

pub use crate::client::{
    ConnectionPool, PgClient, PgConfig, PgConn, PgPoolStatus, PooledConnection,
    run_pending_migrations,
};
pub use crate::model::{File, NewFile, NewRun, Run};
pub use crate::query::{FileRepository, RunRepository};
pub use crate::types::RunStatus;
pub use crate::{PgConnection, PgError, PgResult};
