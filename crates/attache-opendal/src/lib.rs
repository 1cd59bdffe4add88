#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod backend;
mod config;
mod error;

#[doc(hidden)]
pub mod prelude;

pub use backend::{BlobMetadata, BlobStore};
pub use config::{BlobBackend, BlobCredentials, BlobStoreConfig};
pub use error::{BlobError, BlobResult};

/// Tracing target for blob store operations.
pub const TRACING_TARGET: &str = "attache_opendal";
