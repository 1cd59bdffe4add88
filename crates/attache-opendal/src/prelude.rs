//! Prelude module for convenient imports.

pub use crate::backend::{BlobMetadata, BlobStore};
pub use crate::config::{BlobBackend, BlobCredentials, BlobStoreConfig};
pub use crate::error::{BlobError, BlobResult};
