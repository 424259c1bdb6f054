//! Typed error kinds surfaced by configuration validation, trace I/O, and
//! trace-line parsing. Every fatal condition in the simulator maps to one of
//! these; the top level turns whichever one occurs into a single diagnostic
//! line and a non-zero exit.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("cache size must be a positive power of two, got {0}")]
    SizeNotPowerOfTwo(i64),

    #[error("invalid associativity string {0:?}: expected \"direct\", \"assoc\", or \"assoc:N\"")]
    InvalidAssociativity(String),

    #[error("associativity N in \"assoc:N\" must be a positive power of two, got {0}")]
    AssociativityNotPowerOfTwo(i64),

    #[error("replacement policy must be \"lru\", got {0:?}")]
    UnsupportedPolicy(String),

    #[error("block size {block_size} exceeds cache size {cache_size}")]
    BlockSizeExceedsCacheSize { block_size: i64, cache_size: i64 },

    #[error("block size must be a positive power of two, got {0}")]
    BlockSizeNotPowerOfTwo(i64),

    #[error("failed to open trace file {path}: {source}")]
    TraceFileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read trace file {path}: {source}")]
    TraceFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("trace ended before the #eof sentinel")]
    MissingEofSentinel,

    #[error("malformed trace line {line_no}: {line:?}")]
    MalformedTraceLine { line_no: usize, line: String },
}

impl SimError {
    /// Whether this error should be followed by a usage summary, per §7:
    /// configuration errors get one, I/O and parse errors don't.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            SimError::SizeNotPowerOfTwo(_)
                | SimError::InvalidAssociativity(_)
                | SimError::AssociativityNotPowerOfTwo(_)
                | SimError::UnsupportedPolicy(_)
                | SimError::BlockSizeExceedsCacheSize { .. }
                | SimError::BlockSizeNotPowerOfTwo(_)
        )
    }
}
