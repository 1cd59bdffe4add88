//! Retrieval tool for looking up the contents of files attached to a run.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use attache_opendal::BlobStore;
use attache_postgres::model::Run;
use attache_postgres::query::FileRepository;
use attache_postgres::{PgConnection, PgError};
use rig::completion::ToolDefinition;
use rig::tool::Tool;
use serde::Deserialize;

use super::extract::{DocumentExtractor, ExtractError, PlainTextExtractor};
use crate::TRACING_TARGET;

/// Hard cap on the text returned per file, to bound LLM context consumption.
pub const MAX_FILE_CHARS: usize = 5000;

/// Error type for retrieval operations.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    /// Requested index is outside the bound file set.
    #[error("file index {index} is out of range for {len} attached files")]
    InvalidIndex { index: i64, len: usize },

    /// The file directory could not be queried during configuration.
    #[error("file lookup failed: {0}")]
    Lookup(#[from] PgError),

    /// The blob store failed to produce bytes for a resolved storage key.
    #[error("storage unavailable: {0}")]
    Storage(#[from] attache_opendal::BlobError),

    /// The document extractor rejected the retrieved bytes.
    #[error("parse failed: {0}")]
    Parse(#[from] ExtractError),

    /// `configure` was called on a tool that already holds a binding.
    #[error("retrieval tool is already configured for a run")]
    AlreadyConfigured,
}

/// One file attached to a run: its display name paired with the opaque
/// locator for its bytes in the blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundFile {
    /// Original filename, shown to the model in the instruction supplement.
    pub filename: String,
    /// Blob store locator.
    pub storage_key: String,
}

impl BoundFile {
    /// Creates a new bound file.
    pub fn new(filename: impl Into<String>, storage_key: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            storage_key: storage_key.into(),
        }
    }
}

/// The immutable per-run file set: index `i` refers to `files[i]`, in the
/// order the file directory returned records for the run's declared ids.
///
/// A binding is built once, when the run is configured, and only read
/// afterwards. Keeping filename and storage key in one record makes the
/// "same index, same file" pairing structural.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileBinding {
    files: Vec<BoundFile>,
}

impl FileBinding {
    /// Creates a binding from files in directory order.
    pub fn new(files: Vec<BoundFile>) -> Self {
        Self { files }
    }

    /// Returns the number of bound files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns whether no files are bound.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Returns the file bound at `index`.
    pub fn get(&self, index: usize) -> Option<&BoundFile> {
        self.files.get(index)
    }

    /// Builds the prompt fragment describing the bound files.
    ///
    /// Empty bindings produce an empty string, signalling the caller to
    /// omit the fragment entirely.
    pub fn instruction_supplement(&self) -> String {
        if self.files.is_empty() {
            return String::new();
        }

        let filenames_info = self
            .files
            .iter()
            .enumerate()
            .map(|(index, file)| format!("({}){}", index, file.filename))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "You can use the \"retrieval\" tool to retrieve relevant context from the following attached files. \
             Each line represents a file in the format \"(index)filename\":\n\
             {filenames_info}\n\
             Make sure to be extremely concise when using attached files. "
        )
    }
}

/// Arguments for the retrieval tool.
#[derive(Debug, Deserialize)]
pub struct RetrievalArgs {
    /// File indexes to look up, as advertised by the instruction supplement.
    ///
    /// Declared as `i64` so a negative index reaches the tool and fails as
    /// an out-of-range index instead of an opaque decode error.
    pub indexes: Vec<i64>,
    /// Free-text query. Opaque to the tool; logged for observability only.
    pub query: String,
}

/// Tool that retrieves the contents of files attached to the current run.
///
/// The orchestrator calls [`configure`] exactly once, before the model can
/// issue any calls; afterwards the binding is frozen and concurrent calls
/// read it without locking.
///
/// [`configure`]: RetrievalTool::configure
pub struct RetrievalTool<X = PlainTextExtractor> {
    storage: BlobStore,
    extractor: Arc<X>,
    binding: OnceLock<FileBinding>,
}

impl<X> RetrievalTool<X> {
    /// Creates a new retrieval tool over the given blob store and extractor.
    pub fn new(storage: BlobStore, extractor: X) -> Self {
        Self {
            storage,
            extractor: Arc::new(extractor),
            binding: OnceLock::new(),
        }
    }

    /// Creates a new retrieval tool from an already shared extractor.
    pub fn from_arc(storage: BlobStore, extractor: Arc<X>) -> Self {
        Self {
            storage,
            extractor,
            binding: OnceLock::new(),
        }
    }

    /// Binds a prepared file set.
    ///
    /// [`configure`] is the normal path; this is the seam for orchestrators
    /// that resolve file records themselves.
    ///
    /// [`configure`]: RetrievalTool::configure
    pub fn bind(&self, binding: FileBinding) -> Result<(), RetrievalError> {
        self.binding
            .set(binding)
            .map_err(|_| RetrievalError::AlreadyConfigured)
    }

    /// Returns whether the tool holds a binding.
    pub fn is_configured(&self) -> bool {
        self.binding.get().is_some()
    }

    fn current_binding(&self) -> &FileBinding {
        static UNCONFIGURED: FileBinding = FileBinding { files: Vec::new() };
        self.binding.get().unwrap_or(&UNCONFIGURED)
    }

    /// Builds the prompt fragment describing which files are available and
    /// how to reference them. Empty string when no files are bound.
    pub fn instruction_supplement(&self) -> String {
        self.current_binding().instruction_supplement()
    }
}

impl RetrievalTool<PlainTextExtractor> {
    /// Creates a retrieval tool with the plain-text extractor.
    pub fn plain_text(storage: BlobStore) -> Self {
        Self::new(storage, PlainTextExtractor::new())
    }
}

impl<X: DocumentExtractor> RetrievalTool<X> {
    /// Binds this tool to a run's attached files.
    ///
    /// Resolves the run's declared file ids through the file directory in a
    /// single up-front query and freezes the resulting binding, so later
    /// (possibly concurrent) calls never touch the database. The binding
    /// reflects exactly the records the directory returned: ids it could
    /// not resolve are logged and left out, and whether that aborts the run
    /// is the caller's policy.
    pub async fn configure(
        &self,
        conn: &mut PgConnection,
        run: &Run,
    ) -> Result<(), RetrievalError> {
        let files = conn.find_files_by_ids(&run.file_ids).await?;

        if files.len() < run.file_ids.len() {
            tracing::warn!(
                target: TRACING_TARGET,
                run_id = %run.id,
                declared = run.file_ids.len(),
                resolved = files.len(),
                "Some declared file ids could not be resolved"
            );
        }

        let binding = FileBinding::new(
            files
                .into_iter()
                .map(|file| BoundFile::new(file.filename, file.storage_key))
                .collect(),
        );

        tracing::debug!(
            target: TRACING_TARGET,
            run_id = %run.id,
            files = binding.len(),
            "Configured retrieval tool"
        );

        self.bind(binding)
    }

    /// Resolves one index to `(storage_key, truncated_text)`.
    async fn fetch(&self, index: i64) -> Result<(String, String), RetrievalError> {
        let binding = self.current_binding();

        let file = usize::try_from(index)
            .ok()
            .and_then(|i| binding.get(i))
            .ok_or(RetrievalError::InvalidIndex {
                index,
                len: binding.len(),
            })?;

        let data = self.storage.load(&file.storage_key).await?;
        let text = self.extractor.extract(&data).await?;

        Ok((file.storage_key.clone(), truncate_chars(text, MAX_FILE_CHARS)))
    }
}

/// Cuts `text` down to at most `max` characters, as a straight prefix with
/// no truncation marker.
fn truncate_chars(text: String, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((boundary, _)) => text[..boundary].to_owned(),
        None => text,
    }
}

impl<X: DocumentExtractor + 'static> Tool for RetrievalTool<X> {
    const NAME: &'static str = "retrieval";

    type Error = RetrievalError;
    type Args = RetrievalArgs;
    type Output = HashMap<String, String>;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Can be used to look up information that was uploaded to this assistant. \
                If the user is referencing particular files, that is often a good hint that \
                information may be here."
                .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "indexes": {
                        "type": "array",
                        "items": { "type": "integer" },
                        "description": "file index list to look up in retrieval"
                    },
                    "query": {
                        "type": "string",
                        "description": "query to look up in retrieval"
                    }
                },
                "required": ["indexes", "query"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        tracing::debug!(
            target: TRACING_TARGET,
            indexes = ?args.indexes,
            query = %args.query,
            "Running retrieval"
        );

        let mut files = HashMap::with_capacity(args.indexes.len());

        // Duplicate indexes, or distinct indexes sharing a storage key,
        // collapse to one entry: last write wins.
        for index in args.indexes {
            let (storage_key, text) = self.fetch(index).await?;
            files.insert(storage_key, text);
        }

        Ok(files)
    }
}

impl<X> std::fmt::Debug for RetrievalTool<X> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalTool")
            .field("configured", &self.is_configured())
            .field("files", &self.current_binding().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use attache_opendal::BlobStoreConfig;

    use super::*;

    /// Builds a configured tool over an in-memory blob store holding the
    /// given `(filename, storage_key, contents)` triples.
    async fn tool_with(files: &[(&str, &str, &[u8])]) -> RetrievalTool {
        let storage = BlobStore::open(BlobStoreConfig::memory()).await.unwrap();

        for (_, key, contents) in files {
            storage.store(key, contents).await.unwrap();
        }

        let tool = RetrievalTool::plain_text(storage);
        tool.bind(FileBinding::new(
            files
                .iter()
                .map(|(filename, key, _)| BoundFile::new(*filename, *key))
                .collect(),
        ))
        .unwrap();

        tool
    }

    fn args(indexes: Vec<i64>) -> RetrievalArgs {
        RetrievalArgs {
            indexes,
            query: "summarize".to_string(),
        }
    }

    #[tokio::test]
    async fn single_index_keyed_by_storage_key() {
        let tool = tool_with(&[("notes.txt", "key1", b"note contents")]).await;

        let files = tool.call(args(vec![0])).await.unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files["key1"], "note contents");
    }

    #[tokio::test]
    async fn empty_indexes_yield_empty_map() {
        let tool = tool_with(&[("notes.txt", "key1", b"note contents")]).await;

        let files = tool.call(args(vec![])).await.unwrap();
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn multiple_indexes_in_any_order() {
        let tool = tool_with(&[
            ("report.pdf", "key1", b"report text".as_slice()),
            ("notes.txt", "key2", b"notes text".as_slice()),
        ])
        .await;

        let files = tool.call(args(vec![1, 0])).await.unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(files["key1"], "report text");
        assert_eq!(files["key2"], "notes text");
    }

    #[tokio::test]
    async fn out_of_range_index_fails() {
        let tool = tool_with(&[("notes.txt", "key1", b"x")]).await;

        let err = tool.call(args(vec![1])).await.unwrap_err();
        assert!(matches!(
            err,
            RetrievalError::InvalidIndex { index: 1, len: 1 }
        ));
    }

    #[tokio::test]
    async fn negative_index_fails() {
        let tool = tool_with(&[("notes.txt", "key1", b"x")]).await;

        let err = tool.call(args(vec![-1])).await.unwrap_err();
        assert!(matches!(
            err,
            RetrievalError::InvalidIndex { index: -1, len: 1 }
        ));
    }

    #[tokio::test]
    async fn one_bad_index_fails_the_whole_call() {
        let tool = tool_with(&[("notes.txt", "key1", b"x")]).await;

        assert!(tool.call(args(vec![0, 7])).await.is_err());
    }

    #[tokio::test]
    async fn long_text_is_cut_to_the_cap() {
        let long = "a".repeat(MAX_FILE_CHARS + 1000);
        let tool = tool_with(&[("big.txt", "key1", long.as_bytes())]).await;

        let files = tool.call(args(vec![0])).await.unwrap();
        assert_eq!(files["key1"].chars().count(), MAX_FILE_CHARS);
    }

    #[tokio::test]
    async fn short_text_is_returned_exactly() {
        let tool = tool_with(&[("small.txt", "key1", b"short enough")]).await;

        let files = tool.call(args(vec![0])).await.unwrap();
        assert_eq!(files["key1"], "short enough");
    }

    #[tokio::test]
    async fn truncation_respects_char_boundaries() {
        // 3-byte characters around the cap must not split mid-codepoint
        let long = "日".repeat(MAX_FILE_CHARS + 10);
        let tool = tool_with(&[("cjk.txt", "key1", long.as_bytes())]).await;

        let files = tool.call(args(vec![0])).await.unwrap();
        assert_eq!(files["key1"].chars().count(), MAX_FILE_CHARS);
        assert!(files["key1"].chars().all(|c| c == '日'));
    }

    #[tokio::test]
    async fn duplicate_indexes_collapse_to_one_entry() {
        let tool = tool_with(&[("notes.txt", "key1", b"note contents")]).await;

        let files = tool.call(args(vec![0, 0, 0])).await.unwrap();
        assert_eq!(files.len(), 1);
    }

    #[tokio::test]
    async fn repeated_calls_are_idempotent() {
        let tool = tool_with(&[
            ("report.pdf", "key1", b"report text".as_slice()),
            ("notes.txt", "key2", b"notes text".as_slice()),
        ])
        .await;

        let first = tool.call(args(vec![0, 1])).await.unwrap();
        let second = tool.call(args(vec![0, 1])).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn missing_storage_key_is_a_storage_error() {
        let storage = BlobStore::open(BlobStoreConfig::memory()).await.unwrap();
        let tool = RetrievalTool::plain_text(storage);
        tool.bind(FileBinding::new(vec![BoundFile::new("ghost.txt", "nope")]))
            .unwrap();

        let err = tool.call(args(vec![0])).await.unwrap_err();
        assert!(matches!(err, RetrievalError::Storage(e) if e.is_missing_key()));
    }

    #[tokio::test]
    async fn unparseable_bytes_are_a_parse_error() {
        let tool = tool_with(&[("blob.bin", "key1", &[0xff, 0xfe, 0x00])]).await;

        let err = tool.call(args(vec![0])).await.unwrap_err();
        assert!(matches!(err, RetrievalError::Parse(_)));
    }

    #[tokio::test]
    async fn binding_twice_is_rejected() {
        let tool = tool_with(&[("notes.txt", "key1", b"x")]).await;

        let err = tool.bind(FileBinding::default()).unwrap_err();
        assert!(matches!(err, RetrievalError::AlreadyConfigured));
    }

    #[tokio::test]
    async fn unconfigured_tool_acts_as_empty_binding() {
        let storage = BlobStore::open(BlobStoreConfig::memory()).await.unwrap();
        let tool = RetrievalTool::plain_text(storage);

        assert_eq!(tool.instruction_supplement(), "");
        assert!(matches!(
            tool.call(args(vec![0])).await.unwrap_err(),
            RetrievalError::InvalidIndex { len: 0, .. }
        ));
    }

    #[tokio::test]
    async fn supplement_lists_files_in_binding_order() {
        let tool = tool_with(&[
            ("a.pdf", "key1", b"".as_slice()),
            ("b.txt", "key2", b"".as_slice()),
        ])
        .await;

        let supplement = tool.instruction_supplement();

        assert!(supplement.starts_with("You can use the \"retrieval\" tool"));
        let zero = supplement.find("(0)a.pdf").unwrap();
        let one = supplement.find("(1)b.txt").unwrap();
        assert!(zero < one);
        assert!(supplement.ends_with("Make sure to be extremely concise when using attached files. "));
    }

    #[tokio::test]
    async fn empty_binding_supplement_is_empty() {
        let tool = tool_with(&[]).await;
        assert_eq!(tool.instruction_supplement(), "");
    }

    #[tokio::test]
    async fn definition_requires_indexes_and_query() {
        let tool = tool_with(&[]).await;
        let definition = tool.definition(String::new()).await;

        assert_eq!(definition.name, "retrieval");
        let required = definition.parameters["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "indexes"));
        assert!(required.iter().any(|v| v == "query"));
    }
}
