use serde::{Deserialize, Serialize};

/// The result of reconciling freshly generated story content with the file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeResult {
    /// The content to write back.
    pub content: String,
    /// User-added story names carried forward, in their on-disk order.
    pub preserved: Vec<String>,
    /// Stories dropped by the merge. Nothing populates this yet; it is kept so the
    /// shape stays stable for callers.
    pub removed: Vec<String>,
}

impl MergeResult {
    pub fn unchanged(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            preserved: Vec::new(),
            removed: Vec::new(),
        }
    }
}

/// The outcome of writing a story file through the sync workflow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WriteStatus {
    Created,
    Updated,
    Merged,
    /// The merged content matched the file on disk; nothing was written or recorded.
    Unchanged,
}

impl WriteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Merged => "merged",
            Self::Unchanged => "unchanged",
        }
    }
}

/// Input for writing one generated story file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryWriteRequest {
    /// Story file path, relative to the project root.
    pub story_path: String,
    /// The component the story was generated from.
    pub component_path: String,
    /// Freshly rendered story file content.
    pub generated: String,
    /// Story export names the generator rendered into `generated`.
    pub generated_exports: Vec<String>,
    /// Overrides the project's `preserve_user_stories` setting when set.
    pub preserve_user_stories: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoryWriteOutcome {
    pub story_path: String,
    pub status: WriteStatus,
    pub preserved: Vec<String>,
    pub story_hash: String,
}
