use thiserror::Error;

/// Errors produced by the identity-matching engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The input could not be decoded into an image.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// The embedding extractor failed on a decodable image.
    #[error("embedding extraction failed: {0}")]
    Extraction(String),

    /// An embedding's length disagrees with the database's established
    /// dimension. Never coerced or truncated.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Identity names are non-empty string keys.
    #[error("identity name must not be empty")]
    EmptyIdentityName,
}
