//! Repository traits implemented on pooled database connections.
//!
//! Obtain a connection through [`PgClient::get_connection`] and call the
//! repository methods directly on it.
//!
//! [`PgClient::get_connection`]: crate::PgClient::get_connection

mod file;
mod run;

pub use file::FileRepository;
pub use run::RunRepository;
