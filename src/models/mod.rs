//! Domain models for forgekit stories.
//!
//! # Core Concepts
//!
//! - [`MergeResult`]: Regenerated story content with user-added stories carried forward.
//! - [`StoryHistory`]: The per-project ledger of story generation events, capped per story.
//! - [`HistoryEntry`]: One versioned, hashed event in a story's history (like `git log`
//!   for a generated file).
//! - [`StoryWriteRequest`] / [`StoryWriteOutcome`]: Input and result of the sync workflow
//!   that ties merging, writing and history recording together.

mod history;
mod story;

pub use history::*;
pub use story::*;
