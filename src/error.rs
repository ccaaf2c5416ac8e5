use std::path::PathBuf;

use thiserror::Error;

/// Errors from writing story files.
///
/// Merging and history recording never fail; only the story file I/O around
/// them can.
#[derive(Debug, Error)]
pub enum StoryError {
    #[error("Invalid story path '{0}': must be relative and stay inside the project root")]
    InvalidPath(String),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoryError {
    /// Stable machine-readable code, surfaced to MCP clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPath(_) => "INVALID_PATH",
            Self::Read { .. } => "READ_FAILED",
            Self::Write { .. } => "WRITE_FAILED",
        }
    }
}
