/// Convenience result type used across rasterpile.
pub type PileResult<T> = Result<T, PileError>;

/// Error taxonomy for the crate's outer surfaces.
///
/// Geometry and cache bookkeeping never return errors: caller bugs are debug assertions and
/// degenerate inputs produce well-defined empty results. Errors only come from configuration
/// and software canvas construction.
#[derive(thiserror::Error, Debug)]
pub enum PileError {
    /// Invalid settings or surface parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing settings and debug snapshots.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PileError {
    /// Build a [`PileError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PileError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for PileError {
    fn from(err: serde_json::Error) -> Self {
        Self::serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
