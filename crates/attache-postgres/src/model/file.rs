//! File model for PostgreSQL database operations.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::files;

/// File model representing an uploaded file known to the directory.
///
/// The record pairs the human-facing `filename` with the opaque
/// `storage_key` used to fetch the raw bytes from the blob store.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = files)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct File {
    /// Unique file identifier.
    pub id: Uuid,
    /// Original filename when uploaded.
    pub filename: String,
    /// Opaque locator for the file's bytes in the blob store.
    pub storage_key: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// MIME type of the file.
    pub mime_type: Option<String>,
    /// Timestamp when the file was uploaded.
    pub created_at: Timestamp,
    /// Timestamp when the file was last updated.
    pub updated_at: Timestamp,
    /// Timestamp when the file was soft-deleted.
    pub deleted_at: Option<Timestamp>,
}

/// Data for creating a new file record.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = files)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewFile {
    /// Original filename.
    pub filename: String,
    /// Blob store locator.
    pub storage_key: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// MIME type.
    pub mime_type: Option<String>,
}

impl File {
    /// Returns whether the file is deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns the file extension, if the filename carries one.
    pub fn extension(&self) -> Option<&str> {
        let (stem, ext) = self.filename.rsplit_once('.')?;
        (!stem.is_empty() && !ext.is_empty()).then_some(ext)
    }

    /// Returns the file size in a human-readable format.
    pub fn size_human(&self) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

        let bytes = self.size_bytes as f64;
        if bytes < 1024.0 {
            return format!("{} B", self.size_bytes);
        }

        let mut size = bytes;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(filename: &str, size_bytes: i64) -> File {
        File {
            id: Uuid::nil(),
            filename: filename.to_string(),
            storage_key: "key".to_string(),
            size_bytes,
            mime_type: None,
            created_at: jiff::Timestamp::default().into(),
            updated_at: jiff::Timestamp::default().into(),
            deleted_at: None,
        }
    }

    #[test]
    fn extension_parsing() {
        assert_eq!(sample("report.pdf", 0).extension(), Some("pdf"));
        assert_eq!(sample("archive.tar.gz", 0).extension(), Some("gz"));
        assert_eq!(sample("Makefile", 0).extension(), None);
        assert_eq!(sample(".env", 0).extension(), None);
    }

    #[test]
    fn human_readable_sizes() {
        assert_eq!(sample("a", 512).size_human(), "512 B");
        assert_eq!(sample("a", 2048).size_human(), "2.0 KB");
        assert_eq!(sample("a", 5 * 1024 * 1024).size_human(), "5.0 MB");
    }
}
