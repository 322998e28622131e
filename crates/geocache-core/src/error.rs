use std::fmt;

/// Failures that can reach the world model from its durable backing.
///
/// Neither variant is fatal: the memento store recovers from both by
/// acting as if nothing was ever persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// The backing store could not be read or written.
    StorageUnavailable(String),
    /// A persisted record failed to parse.
    InvalidMementoRecord(String),
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldError::StorageUnavailable(msg) => write!(f, "storage unavailable: {msg}"),
            WorldError::InvalidMementoRecord(msg) => write!(f, "invalid memento record: {msg}"),
        }
    }
}

impl std::error::Error for WorldError {}

pub type Result<T> = std::result::Result<T, WorldError>;
