//! Error types for mbox-classify.

use thiserror::Error;

/// Result type alias for classification operations.
pub type Result<T> = std::result::Result<T, ClassifyError>;

/// Fatal classification errors. None of these are recoverable: the
/// binary reports a single diagnostic line and exits non-zero.
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// Malformed synthetic descriptor, insufficient sources, or a bad
    /// path argument.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A source stream could not be opened or read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The target email has no extractable tokens.
    #[error("the email to classify contains no words")]
    EmptyVocabulary,
}
