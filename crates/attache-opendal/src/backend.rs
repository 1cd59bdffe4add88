//! Blob store built on OpenDAL operators.

use opendal::{Operator, services};

use crate::TRACING_TARGET;
use crate::config::{BlobBackend, BlobStoreConfig};
use crate::error::{BlobError, BlobResult};

/// Blob store mapping opaque storage keys to raw bytes.
///
/// Cloning is cheap; all clones share the underlying operator.
#[derive(Clone)]
pub struct BlobStore {
    operator: Operator,
    backend: BlobBackend,
    location: String,
}

impl BlobStore {
    /// Opens a blob store for the configured backend.
    pub async fn open(config: BlobStoreConfig) -> BlobResult<Self> {
        config.validate()?;

        let operator = match config.backend {
            #[cfg(feature = "memory")]
            BlobBackend::Memory => memory_operator()?,
            #[cfg(feature = "fs")]
            BlobBackend::Fs => fs_operator(&config)?,
            #[cfg(feature = "s3")]
            BlobBackend::S3 => s3_operator(&config)?,
            #[cfg(feature = "azblob")]
            BlobBackend::AzureBlob => azblob_operator(&config)?,
            #[allow(unreachable_patterns)]
            backend => {
                return Err(BlobError::setup(format!(
                    "backend {} is not compiled into this build",
                    backend.name()
                )));
            }
        };

        tracing::info!(
            target: TRACING_TARGET,
            backend = config.backend.name(),
            location = %config.location,
            "Opened blob store"
        );

        Ok(Self {
            operator,
            backend: config.backend,
            location: config.location,
        })
    }

    /// Returns which backend this store talks to.
    pub fn backend(&self) -> BlobBackend {
        self.backend
    }

    /// Returns the configured location (directory, bucket or container).
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Loads the raw bytes stored under `key`.
    ///
    /// Fails with [`BlobError::MissingKey`] if nothing is stored there.
    pub async fn load(&self, key: &str) -> BlobResult<Vec<u8>> {
        let buffer = self
            .operator
            .read(key)
            .await
            .map_err(|err| BlobError::from_opendal("load", key, err))?;

        tracing::debug!(
            target: TRACING_TARGET,
            key = %key,
            bytes = buffer.len(),
            "Loaded blob"
        );

        Ok(buffer.to_vec())
    }

    /// Stores `data` under `key`, replacing any previous blob.
    pub async fn store(&self, key: &str, data: &[u8]) -> BlobResult<()> {
        self.operator
            .write(key, data.to_vec())
            .await
            .map_err(|err| BlobError::from_opendal("store", key, err))?;

        tracing::debug!(
            target: TRACING_TARGET,
            key = %key,
            bytes = data.len(),
            "Stored blob"
        );

        Ok(())
    }

    /// Removes the blob stored under `key`, if any.
    pub async fn remove(&self, key: &str) -> BlobResult<()> {
        self.operator
            .delete(key)
            .await
            .map_err(|err| BlobError::from_opendal("remove", key, err))?;

        tracing::debug!(target: TRACING_TARGET, key = %key, "Removed blob");

        Ok(())
    }

    /// Returns whether a blob exists under `key`.
    pub async fn contains(&self, key: &str) -> BlobResult<bool> {
        self.operator
            .exists(key)
            .await
            .map_err(|err| BlobError::from_opendal("contains", key, err))
    }

    /// Returns size and content information for the blob under `key`.
    pub async fn metadata(&self, key: &str) -> BlobResult<BlobMetadata> {
        let meta = self
            .operator
            .stat(key)
            .await
            .map_err(|err| BlobError::from_opendal("metadata", key, err))?;

        // OpenDAL reports chrono timestamps; the rest of the workspace
        // speaks jiff
        let last_modified = meta
            .last_modified()
            .and_then(|dt| jiff::Timestamp::from_second(dt.timestamp()).ok());

        Ok(BlobMetadata {
            content_length: meta.content_length(),
            content_type: meta.content_type().map(str::to_owned),
            last_modified,
        })
    }
}

impl std::fmt::Debug for BlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobStore")
            .field("backend", &self.backend.name())
            .field("location", &self.location)
            .finish()
    }
}

/// Size and content information for a stored blob.
#[derive(Debug, Clone)]
pub struct BlobMetadata {
    /// Blob size in bytes.
    pub content_length: u64,
    /// MIME type reported by the backend, if any.
    pub content_type: Option<String>,
    /// Last modification time, if the backend tracks one.
    pub last_modified: Option<jiff::Timestamp>,
}

#[cfg(feature = "memory")]
fn memory_operator() -> BlobResult<Operator> {
    finish_operator(services::Memory::default())
}

#[cfg(feature = "fs")]
fn fs_operator(config: &BlobStoreConfig) -> BlobResult<Operator> {
    finish_operator(services::Fs::default().root(&config.location))
}

#[cfg(feature = "s3")]
fn s3_operator(config: &BlobStoreConfig) -> BlobResult<Operator> {
    let mut builder = services::S3::default().bucket(&config.location);

    if let Some(region) = config.region.as_deref() {
        builder = builder.region(region);
    }

    if let Some(endpoint) = config.endpoint.as_deref() {
        builder = builder.endpoint(endpoint);
    }

    if let Some(credentials) = &config.credentials {
        builder = builder
            .access_key_id(&credentials.id)
            .secret_access_key(&credentials.secret);
    }

    finish_operator(builder)
}

#[cfg(feature = "azblob")]
fn azblob_operator(config: &BlobStoreConfig) -> BlobResult<Operator> {
    let mut builder = services::Azblob::default().container(&config.location);

    if let Some(credentials) = &config.credentials {
        builder = builder
            .account_name(&credentials.id)
            .account_key(&credentials.secret);
    }

    finish_operator(builder)
}

#[cfg(any(feature = "memory", feature = "fs", feature = "s3", feature = "azblob"))]
fn finish_operator(builder: impl opendal::Builder) -> BlobResult<Operator> {
    Ok(Operator::new(builder)
        .map_err(|err| BlobError::setup(err))?
        .finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> BlobStore {
        BlobStore::open(BlobStoreConfig::memory()).await.unwrap()
    }

    #[tokio::test]
    async fn store_then_load() {
        let store = memory_store().await;
        assert_eq!(store.backend(), BlobBackend::Memory);

        store.store("thread/key1", b"hello").await.unwrap();

        assert_eq!(store.load("thread/key1").await.unwrap(), b"hello");
        assert!(store.contains("thread/key1").await.unwrap());
    }

    #[tokio::test]
    async fn loading_an_absent_key_is_missing_key() {
        let store = memory_store().await;

        let err = store.load("absent").await.unwrap_err();
        assert!(err.is_missing_key());
    }

    #[tokio::test]
    async fn remove_clears_the_key() {
        let store = memory_store().await;

        store.store("key", b"data").await.unwrap();
        store.remove("key").await.unwrap();

        assert!(!store.contains("key").await.unwrap());
    }

    #[tokio::test]
    async fn metadata_reports_content_length() {
        let store = memory_store().await;

        store.store("key", b"123456").await.unwrap();
        let meta = store.metadata("key").await.unwrap();

        assert_eq!(meta.content_length, 6);
    }

    #[cfg(feature = "fs")]
    #[tokio::test]
    async fn fs_backend_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = BlobStoreConfig::fs(dir.path().to_string_lossy());
        let store = BlobStore::open(config).await.unwrap();

        store.store("doc.txt", b"on disk").await.unwrap();
        assert_eq!(store.load("doc.txt").await.unwrap(), b"on disk");
    }
}
