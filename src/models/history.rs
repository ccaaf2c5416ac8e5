use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The only ledger schema this crate reads or writes.
pub const HISTORY_SCHEMA_VERSION: &str = "1";

/// An append-only log entry recording one generate/update event for a story file.
///
/// Story history is like `git log` for a generated story: each time the file is
/// created, refreshed, or merged with user-added stories, an entry is appended
/// with a per-story version number and a hash of the written content. Entries
/// are never mutated; they only disappear when pruned from the oldest end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Story file path, relative to the project root. Also the ledger key.
    pub story_path: String,
    /// The component file the story was generated from.
    pub component_path: String,
    /// Starts at 1 and increments by exactly 1 per event for this story path.
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub story_hash: String,
    pub action: StoryAction,
}

/// What happened to the story file during a recorded event.
///
/// - `Created`: no file existed before
/// - `Updated`: the file was regenerated and nothing needed preserving
/// - `Merged`: the file was regenerated and user-added stories were carried forward
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoryAction {
    Created,
    Updated,
    Merged,
}

impl StoryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Merged => "merged",
        }
    }
}

/// Input for recording a history entry. The ledger assigns the version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHistoryEntry {
    pub story_path: String,
    pub component_path: String,
    pub generated_at: DateTime<Utc>,
    pub story_hash: String,
    pub action: StoryAction,
}

impl NewHistoryEntry {
    pub(crate) fn with_version(self, version: u32) -> HistoryEntry {
        HistoryEntry {
            story_path: self.story_path,
            component_path: self.component_path,
            version,
            generated_at: self.generated_at,
            story_hash: self.story_hash,
            action: self.action,
        }
    }
}

/// The persisted ledger: one document per project root.
///
/// `entries` maps story paths to their retained history, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryHistory {
    pub schema_version: String,
    pub entries: BTreeMap<String, Vec<HistoryEntry>>,
}

impl Default for StoryHistory {
    fn default() -> Self {
        Self {
            schema_version: HISTORY_SCHEMA_VERSION.to_string(),
            entries: BTreeMap::new(),
        }
    }
}
