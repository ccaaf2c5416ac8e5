//! Story write workflow: read, merge, write, record.
//!
//! For a single story the steps run strictly in order, and history is only
//! recorded after the write succeeded so the recorded hash matches the file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use chrono::Utc;

use crate::config::ForgeConfig;
use crate::error::StoryError;
use crate::hash::content_hash;
use crate::history;
use crate::merge::merge_stories;
use crate::models::*;

/// Normalise a story path into its history ledger key.
///
/// `.` components are dropped and components are joined with `/`, so
/// `./src/Button.stories.tsx` and `src/Button.stories.tsx` share one history.
/// Rejects empty, absolute, and `..` paths so writes stay inside the project.
pub fn story_key(story_path: &str) -> Result<String, StoryError> {
    let mut parts = Vec::new();
    for component in Path::new(story_path).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => return Err(StoryError::InvalidPath(story_path.to_string())),
        }
    }

    if parts.is_empty() || story_path.trim().is_empty() {
        return Err(StoryError::InvalidPath(story_path.to_string()));
    }

    Ok(parts.join("/"))
}

/// Resolve a story path against the project root.
pub fn resolve_story_path(root: &Path, story_path: &str) -> Result<PathBuf, StoryError> {
    Ok(root.join(story_key(story_path)?))
}

/// Read a story file, treating a missing file as `None`.
pub fn read_story(path: &Path) -> Result<Option<String>, StoryError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoryError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Write freshly generated story content, preserving user-added stories.
///
/// Returns [`WriteStatus::Unchanged`] without touching the file or the history
/// when the result is identical to what is already on disk.
pub fn write_story(
    config: &ForgeConfig,
    request: StoryWriteRequest,
) -> Result<StoryWriteOutcome, StoryError> {
    let key = story_key(&request.story_path)?;
    let path = config.project_root.join(&key);
    let existing = read_story(&path)?;
    let preserve = request
        .preserve_user_stories
        .unwrap_or(config.preserve_user_stories);

    let (content, preserved, status) = match existing.as_deref() {
        None => (request.generated, Vec::new(), WriteStatus::Created),
        Some(existing) if preserve => {
            let merged = merge_stories(&request.generated, existing, &request.generated_exports);
            let status = if merged.preserved.is_empty() {
                WriteStatus::Updated
            } else {
                WriteStatus::Merged
            };
            (merged.content, merged.preserved, status)
        }
        Some(_) => (request.generated, Vec::new(), WriteStatus::Updated),
    };

    let story_hash = content_hash(&content);

    if existing.as_deref().map(content_hash).as_deref() == Some(story_hash.as_str()) {
        tracing::debug!(story = %key, "Story unchanged, skipping write");
        return Ok(StoryWriteOutcome {
            story_path: key,
            status: WriteStatus::Unchanged,
            preserved,
            story_hash,
        });
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StoryError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(&path, &content).map_err(|source| StoryError::Write {
        path: path.clone(),
        source,
    })?;

    tracing::info!(
        story = %key,
        status = status.as_str(),
        preserved = preserved.len(),
        "Wrote story"
    );

    if config.track_history {
        let action = match status {
            WriteStatus::Created => StoryAction::Created,
            WriteStatus::Merged => StoryAction::Merged,
            WriteStatus::Updated | WriteStatus::Unchanged => StoryAction::Updated,
        };
        history::record(
            &config.project_root,
            NewHistoryEntry {
                story_path: key.clone(),
                component_path: request.component_path,
                generated_at: Utc::now(),
                story_hash: story_hash.clone(),
                action,
            },
        );
    }

    Ok(StoryWriteOutcome {
        story_path: key,
        status,
        preserved,
        story_hash,
    })
}
