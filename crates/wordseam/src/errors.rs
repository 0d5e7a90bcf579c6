//! # Error Types

use crate::types::TokenId;

/// Errors from wordseam operations.
#[derive(Debug, thiserror::Error)]
pub enum WordseamError {
    /// Corpus length exceeds the `u32` position space.
    #[error("corpus length ({len}) exceeds the 2^32 position limit")]
    CorpusTooLarge {
        /// The offending corpus length.
        len: usize,
    },

    /// Decode was given an id absent from the vocabulary.
    #[error("invalid token id: {id}")]
    UnknownTokenId {
        /// The offending token id.
        id: TokenId,
    },

    /// Encoding produced a segment with no vocabulary entry.
    #[error("symbol not in vocabulary: {symbol:?}")]
    SymbolNotInVocab {
        /// The unmapped symbol bytes.
        symbol: Vec<u8>,
    },

    /// A loaded vocabulary has a gap in its id space.
    #[error("vocabulary file is missing token id {id}")]
    MissingTokenId {
        /// The first absent id.
        id: TokenId,
    },

    /// A vocabulary file could not be parsed.
    #[error("vocabulary parse error: {0}")]
    Parse(String),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for wordseam operations.
pub type WsResult<T> = core::result::Result<T, WordseamError>;
