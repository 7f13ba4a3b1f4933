/// Convenience result type used across Weft.
pub type WeftResult<T> = Result<T, WeftError>;

/// Top-level error taxonomy used by session and bridge APIs.
#[derive(thiserror::Error, Debug)]
pub enum WeftError {
    /// Invalid user-provided widget, tree or constraint data.
    #[error("validation error: {0}")]
    Validation(String),

    /// An operation addressed a handle whose object was already disposed.
    #[error("object is disposed: {0}")]
    Disposed(String),

    /// Registry lookup or bookkeeping failure.
    #[error("registry error: {0}")]
    Registry(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WeftError {
    /// Build a [`WeftError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`WeftError::Disposed`] value.
    pub fn disposed(msg: impl Into<String>) -> Self {
        Self::Disposed(msg.into())
    }

    /// Build a [`WeftError::Registry`] value.
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry(msg.into())
    }

    /// Build a [`WeftError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
