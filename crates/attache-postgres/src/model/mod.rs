//! Database models for files and conversation runs.

mod file;
mod run;

pub use file::{File, NewFile};
pub use run::{NewRun, Run};
