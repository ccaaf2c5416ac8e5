//! Per-project story history ledger.
//!
//! The ledger lives in a single JSON document at
//! `<root>/.forgekit/story-history.json`. Every [`record`] call loads the whole
//! document, appends one entry, prunes the story's history to
//! [`MAX_VERSIONS_PER_STORY`] and writes it back. History is best-effort: a
//! missing or corrupted ledger reads as empty, and failed writes are logged and
//! dropped so they never fail a story generation.
//!
//! `record` holds an advisory lock on `story-history.lock` for the whole
//! load-mutate-save cycle, so cooperating processes do not lose each other's
//! entries. Processes that ignore the lock can still race.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs4::fs_std::FileExt;

use crate::models::{HistoryEntry, NewHistoryEntry, StoryHistory, HISTORY_SCHEMA_VERSION};

/// Project-local directory holding forgekit state.
pub const FORGEKIT_DIR: &str = ".forgekit";
const HISTORY_FILE: &str = "story-history.json";
const LOCK_FILE: &str = "story-history.lock";

/// Retained entries per story path; older entries are pruned first.
pub const MAX_VERSIONS_PER_STORY: usize = 10;

/// Path of the ledger document for a project root.
pub fn history_path(root: &Path) -> PathBuf {
    root.join(FORGEKIT_DIR).join(HISTORY_FILE)
}

/// Load the ledger for `root`.
///
/// Returns an empty ledger if the file is missing, unreadable, not valid JSON,
/// or written with an unknown schema version.
pub fn load(root: &Path) -> StoryHistory {
    let path = history_path(root);
    if !path.exists() {
        return StoryHistory::default();
    }

    match try_load(&path) {
        Ok(history) => history,
        Err(e) => {
            tracing::warn!("Ignoring story history at {}: {:#}", path.display(), e);
            StoryHistory::default()
        }
    }
}

fn try_load(path: &Path) -> Result<StoryHistory> {
    let content = fs::read_to_string(path).context("Failed to read story history")?;
    let history: StoryHistory =
        serde_json::from_str(&content).context("Failed to parse story history")?;

    if history.schema_version != HISTORY_SCHEMA_VERSION {
        anyhow::bail!("Unsupported schema version '{}'", history.schema_version);
    }

    Ok(history)
}

/// Record a generation event for a story.
///
/// The entry gets the next version for its story path (1 for a new path). Only
/// the newest [`MAX_VERSIONS_PER_STORY`] entries are kept. Never fails.
pub fn record(root: &Path, entry: NewHistoryEntry) {
    let _lock = acquire_lock(root);

    let mut history = load(root);
    let versions = history.entries.entry(entry.story_path.clone()).or_default();

    let version = versions.last().map_or(1, |last| last.version + 1);
    let story_path = entry.story_path.clone();
    let action = entry.action;
    versions.push(entry.with_version(version));

    if versions.len() > MAX_VERSIONS_PER_STORY {
        let excess = versions.len() - MAX_VERSIONS_PER_STORY;
        versions.drain(..excess);
    }

    match save(root, &history) {
        Ok(()) => tracing::debug!(
            story = %story_path,
            version,
            action = action.as_str(),
            "Recorded story history"
        ),
        Err(e) => tracing::warn!(
            story = %story_path,
            "Failed to save story history: {:#}",
            e
        ),
    }
}

/// All retained history for `story_path`, oldest first.
pub fn versions_for(root: &Path, story_path: &str) -> Vec<HistoryEntry> {
    load(root)
        .entries
        .remove(story_path)
        .unwrap_or_default()
}

/// The most recent history entry for `story_path`, if any.
pub fn latest_for(root: &Path, story_path: &str) -> Option<HistoryEntry> {
    versions_for(root, story_path).pop()
}

/// Write the ledger through a temp file so readers never see a partial document.
fn save(root: &Path, history: &StoryHistory) -> Result<()> {
    let path = history_path(root);
    let dir = root.join(FORGEKIT_DIR);
    fs::create_dir_all(&dir).context("Failed to create .forgekit directory")?;

    let content =
        serde_json::to_string_pretty(history).context("Failed to serialize story history")?;

    let tmp = dir.join(format!("{}.tmp", HISTORY_FILE));
    fs::write(&tmp, content).context("Failed to write story history")?;
    fs::rename(&tmp, &path).context("Failed to replace story history")?;

    Ok(())
}

/// Take the ledger lock. Released when the returned file is dropped.
///
/// Returns `None` (and records unlocked) if the lock cannot be taken.
fn acquire_lock(root: &Path) -> Option<File> {
    match try_lock(root) {
        Ok(file) => Some(file),
        Err(e) => {
            tracing::warn!("Recording story history without a lock: {:#}", e);
            None
        }
    }
}

fn try_lock(root: &Path) -> Result<File> {
    let dir = root.join(FORGEKIT_DIR);
    fs::create_dir_all(&dir).context("Failed to create .forgekit directory")?;

    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(dir.join(LOCK_FILE))
        .context("Failed to open story history lock")?;
    file.lock_exclusive()
        .context("Failed to lock story history")?;

    Ok(file)
}
