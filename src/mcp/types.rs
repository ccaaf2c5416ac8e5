//! Request and response types for MCP tools.

use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::{HistoryEntry, MergeResult, StoryWriteOutcome};

// ============================================================
// Request Types
// ============================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListStoryExportsRequest {
    #[schemars(description = "Story file path relative to the project root, e.g. 'src/Button.stories.tsx'")]
    pub story_path: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PreviewMergeRequest {
    #[schemars(description = "Story file path relative to the project root")]
    pub story_path: String,
    #[schemars(description = "Freshly generated story file content")]
    pub generated: String,
    #[schemars(
        description = "Story export names the generator rendered. Derived from 'generated' when omitted."
    )]
    #[serde(default)]
    pub generated_exports: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WriteStoryRequest {
    #[schemars(description = "Story file path relative to the project root")]
    pub story_path: String,
    #[schemars(description = "Component file the story was generated from")]
    pub component_path: String,
    #[schemars(description = "Freshly generated story file content")]
    pub generated: String,
    #[schemars(
        description = "Story export names the generator rendered. Derived from 'generated' when omitted."
    )]
    #[serde(default)]
    pub generated_exports: Option<Vec<String>>,
    #[schemars(
        description = "Keep stories that exist on disk but were not generated. Defaults to the project setting (true)."
    )]
    #[serde(default)]
    pub preserve_user_stories: Option<bool>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetStoryHistoryRequest {
    #[schemars(description = "Story file path relative to the project root")]
    pub story_path: String,
}

// ============================================================
// Response Types
// ============================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StoryExportsResponse {
    pub story_path: String,
    /// Story export names in file order
    pub exports: Vec<String>,
    /// Names declared more than once; non-empty means the file is malformed
    pub duplicates: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct MergePreviewResponse {
    pub story_path: String,
    /// Whether a story file already exists at this path
    pub exists: bool,
    pub content: String,
    pub preserved: Vec<String>,
    pub removed: Vec<String>,
}

impl MergePreviewResponse {
    pub fn new(story_path: String, exists: bool, result: MergeResult) -> Self {
        Self {
            story_path,
            exists,
            content: result.content,
            preserved: result.preserved,
            removed: result.removed,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct WriteStoryResponse {
    pub story_path: String,
    /// created, updated, merged, or unchanged
    pub status: String,
    pub preserved: Vec<String>,
    pub story_hash: String,
}

impl From<StoryWriteOutcome> for WriteStoryResponse {
    fn from(outcome: StoryWriteOutcome) -> Self {
        Self {
            story_path: outcome.story_path,
            status: outcome.status.as_str().to_string(),
            preserved: outcome.preserved,
            story_hash: outcome.story_hash,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct HistoryEntryInfo {
    pub version: u32,
    pub component_path: String,
    pub generated_at: String,
    pub story_hash: String,
    pub action: String,
}

impl From<HistoryEntry> for HistoryEntryInfo {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            version: entry.version,
            component_path: entry.component_path,
            generated_at: entry.generated_at.to_rfc3339(),
            story_hash: entry.story_hash,
            action: entry.action.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StoryHistoryResponse {
    pub story_path: String,
    /// Retained entries, oldest first
    pub entries: Vec<HistoryEntryInfo>,
}
