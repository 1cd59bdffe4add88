//! Blob store configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BlobError, BlobResult};

/// Backend a blob store can be opened against.
///
/// Which variants are actually available depends on the cargo features this
/// crate was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum BlobBackend {
    /// In-memory storage, mainly for tests and local development.
    Memory,
    /// Local filesystem.
    Fs,
    /// Amazon S3 compatible storage.
    S3,
    /// Azure Blob Storage.
    AzureBlob,
}

impl BlobBackend {
    /// Returns the backend name as a static string.
    pub fn name(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Fs => "fs",
            Self::S3 => "s3",
            Self::AzureBlob => "azblob",
        }
    }
}

/// Credential pair for remote backends.
///
/// For S3 this is the access key id and secret access key; for Azure Blob
/// it is the account name and account key.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobCredentials {
    /// Access key id or account name.
    pub id: String,
    /// Secret access key or account key.
    pub secret: String,
}

impl BlobCredentials {
    /// Creates a new credential pair.
    pub fn new(id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for BlobCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobCredentials")
            .field("id", &"***")
            .field("secret", &"***")
            .finish()
    }
}

/// Configuration for opening a blob store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use = "blob store configurations must be used to open a store"]
pub struct BlobStoreConfig {
    /// Which backend to open.
    pub backend: BlobBackend,
    /// Where blobs live: a directory for `fs`, a bucket for `s3`, a
    /// container for `azblob`. Ignored by `memory`.
    pub location: String,
    /// Region for S3-compatible backends.
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible backends.
    pub endpoint: Option<String>,
    /// Credentials for remote backends.
    pub credentials: Option<BlobCredentials>,
}

impl BlobStoreConfig {
    fn for_backend(backend: BlobBackend, location: impl Into<String>) -> Self {
        Self {
            backend,
            location: location.into(),
            region: None,
            endpoint: None,
            credentials: None,
        }
    }

    /// Creates an in-memory configuration.
    pub fn memory() -> Self {
        Self::for_backend(BlobBackend::Memory, "")
    }

    /// Creates a local filesystem configuration rooted at `dir`.
    pub fn fs(dir: impl Into<String>) -> Self {
        Self::for_backend(BlobBackend::Fs, dir)
    }

    /// Creates an S3 configuration for the given bucket.
    pub fn s3(bucket: impl Into<String>) -> Self {
        Self::for_backend(BlobBackend::S3, bucket)
    }

    /// Creates an Azure Blob configuration for the given container.
    pub fn azure_blob(container: impl Into<String>) -> Self {
        Self::for_backend(BlobBackend::AzureBlob, container)
    }

    /// Sets the region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Sets a custom endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets credentials for a remote backend.
    pub fn with_credentials(mut self, id: impl Into<String>, secret: impl Into<String>) -> Self {
        self.credentials = Some(BlobCredentials::new(id, secret));
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> BlobResult<()> {
        if self.backend != BlobBackend::Memory && self.location.is_empty() {
            return Err(BlobError::setup(format!(
                "{} backend requires a location",
                self.backend.name()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names() {
        assert_eq!(BlobBackend::Memory.name(), "memory");
        assert_eq!(BlobBackend::AzureBlob.name(), "azblob");
    }

    #[test]
    fn validation_requires_location() {
        assert!(BlobStoreConfig::memory().validate().is_ok());
        assert!(BlobStoreConfig::s3("bucket").validate().is_ok());
        assert!(BlobStoreConfig::fs("").validate().is_err());
    }

    #[test]
    fn debug_masks_credentials() {
        let config = BlobStoreConfig::s3("bucket").with_credentials("AKIA123", "topsecret");
        let rendered = format!("{:?}", config);

        assert!(!rendered.contains("topsecret"));
        assert!(!rendered.contains("AKIA123"));
        assert!(rendered.contains("bucket"));
    }
}
