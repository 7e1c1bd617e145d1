//! Error types for the MetalStack core.

/// Core error type for MetalStack infrastructure.
#[derive(Debug, thiserror::Error)]
pub enum MetalStackError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error with context.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience result type for MetalStack operations.
pub type MetalStackResult<T> = Result<T, MetalStackError>;
