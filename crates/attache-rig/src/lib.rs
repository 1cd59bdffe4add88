#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod tool;

pub use tool::{
    BoundFile, DocumentExtractor, ExtractError, FileBinding, MAX_FILE_CHARS, PlainTextExtractor,
    RetrievalArgs, RetrievalError, RetrievalTool,
};

/// Tracing target for the main library.
pub const TRACING_TARGET: &str = "attache_rig";
