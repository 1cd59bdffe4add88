//! Tools module for agent function calling capabilities.
//!
//! - [`RetrievalTool`] - Resolve attached-file indexes into parsed text
//! - [`DocumentExtractor`] - Seam for turning raw file bytes into text

mod extract;
mod retrieval;

pub use extract::{DocumentExtractor, ExtractError, PlainTextExtractor};
pub use retrieval::{
    BoundFile, FileBinding, MAX_FILE_CHARS, RetrievalArgs, RetrievalError, RetrievalTool,
};
