//! Error types for annoview.

use thiserror::Error;

/// Result type for annoview operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for annoview operations.
///
/// Every variant is terminal for the single operation that produced it.
/// Selection errors leave the state mutated up to the point of failure.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A dependency chain went deeper than the configured ceiling.
    #[error("Recursion limit reached at '{item}' (depth {depth} > {limit})")]
    RecursionLimitExceeded {
        /// Item whose requirements were about to be expanded
        item: String,
        /// Depth at which the walk stopped
        depth: usize,
        /// Configured ceiling
        limit: usize,
    },

    /// The requirement graph contains a cycle.
    #[error("Dependency cycle: {}", path.join(" -> "))]
    DependencyCycle {
        /// Identifiers along the cycle, first and last are the same item
        path: Vec<String>,
    },

    /// A requirement names an identifier that is not in the group.
    #[error("'{item}' requires unknown annotator '{reference}'")]
    UnknownDependencyReference {
        /// Declaring item
        item: String,
        /// Unresolved identifier
        reference: String,
    },

    /// The identifier is not part of the selection group.
    #[error("Unknown annotator: {0}")]
    UnknownItem(String),

    /// The item is locked by a selected dependent and cannot be toggled.
    #[error("Annotator '{0}' is required by another selected annotator")]
    LockedItem(String),

    /// Span offsets do not fit the segment.
    #[error("Invalid span range [{begin}, {end}) for segment at {segment_begin} with length {len}")]
    InvalidSpanRange {
        /// Absolute span begin
        begin: usize,
        /// Absolute span end
        end: usize,
        /// Absolute segment begin
        segment_begin: usize,
        /// Segment length in the configured offset unit
        len: usize,
    },

    /// A span reaches into a region that was already wrapped.
    #[error("Span [{begin}, {end}) overlaps a wrapped region starting at {boundary}")]
    OverlappingSpans {
        /// Absolute span begin
        begin: usize,
        /// Absolute span end
        end: usize,
        /// Absolute begin of the closest wrapped region
        boundary: usize,
    },

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(String),

    /// Input could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a parse error.
    #[must_use]
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Create an unknown item error.
    #[must_use]
    pub fn unknown_item(id: impl Into<String>) -> Self {
        Error::UnknownItem(id.into())
    }

    /// True for conditions the original pages surfaced to the user as an alert.
    #[must_use]
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            Error::RecursionLimitExceeded { .. } | Error::DependencyCycle { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}
