pub type DrawPoolResult<T> = Result<T, DrawPoolError>;

/// Errors raised while configuring pools and their collaborators.
///
/// Primitive submission never fails: malformed draws are dropped silently.
#[derive(thiserror::Error, Debug)]
pub enum DrawPoolError {
    /// A caller passed an argument or pool that cannot be used.
    #[error("validation error: {0}")]
    Validation(String),

    /// Settings were malformed or the worker pool could not be built.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required texture was missing or empty.
    #[error("resource error: {0}")]
    Resource(String),

    /// Any other failure, carried unchanged.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DrawPoolError {
    /// Build a [`DrawPoolError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`DrawPoolError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`DrawPoolError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
