//! Error Types
//!
//! Errors fall into two groups:
//!
//! - **Fatal**: [`BufferError::CapacityExceeded`]. The pool was sized at
//!   construction and cannot grow, so ingestion has to stop and the operator
//!   has to raise the configured maximum.
//! - **Soft**: unknown identifiers and malformed attribute payloads. Events
//!   race with removals in a live stream, so these are logged and absorbed at
//!   the sink boundary. They never reach the render path.

use std::fmt;

use thiserror::Error;

/// Which kind of graph entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Node,
    Edge,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Node => f.write_str("node"),
            EntityKind::Edge => f.write_str("edge"),
        }
    }
}

/// Errors raised by the buffer pool and the event sinks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BufferError {
    /// Allocation requested beyond the configured maximum.
    #[error("out of memory for {kind}s: capacity is {capacity}, set `max_{kind}s` to a higher value")]
    CapacityExceeded { kind: EntityKind, capacity: usize },

    /// No live entity carries this identifier.
    #[error("unknown {kind} identifier `{id}`")]
    UnknownIdentifier { kind: EntityKind, id: String },

    /// An attribute payload had a shape we could not interpret.
    #[error("malformed value for attribute `{attribute}`: {reason}")]
    MalformedAttributeValue { attribute: String, reason: String },
}

impl BufferError {
    pub(crate) fn unknown(kind: EntityKind, id: &str) -> Self {
        Self::UnknownIdentifier {
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn malformed(attribute: &str, reason: impl Into<String>) -> Self {
        Self::MalformedAttributeValue {
            attribute: attribute.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error must terminate ingestion.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BufferError::CapacityExceeded { .. })
    }
}

/// Errors raised while building a [`ViewerConfig`](crate::config::ViewerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value `{value}` for environment variable {var}: {reason}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid configuration document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Raised by a style resolver that cannot load a stylesheet.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("stylesheet rejected: {0}")]
pub struct StyleError(pub String);

/// Errors that stop the viewer run loop.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error("producer task failed: {0}")]
    TaskFailed(String),
}

/// Result alias for buffer operations.
pub type Result<T, E = BufferError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_capacity_exhaustion_is_fatal() {
        let full = BufferError::CapacityExceeded {
            kind: EntityKind::Node,
            capacity: 3,
        };
        assert!(full.is_fatal());
        assert!(!BufferError::unknown(EntityKind::Edge, "e1").is_fatal());
        assert!(!BufferError::malformed("xyz", "text").is_fatal());
    }

    #[test]
    fn capacity_message_names_the_knob() {
        let err = BufferError::CapacityExceeded {
            kind: EntityKind::Edge,
            capacity: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("max_edges"));
        assert!(msg.contains("10"));
    }
}
