//! Reconciles regenerated story files with hand-written additions.
//!
//! The generator owns every story it renders; anything else found in the file on
//! disk is a user-added story and is carried forward verbatim below
//! [`PRESERVED_MARKER`]. Merging never touches the filesystem.

mod exports;

use std::collections::HashSet;

pub use exports::*;

use crate::models::MergeResult;

/// Separator written between generated stories and preserved user-added stories.
pub const PRESERVED_MARKER: &str =
    "// ─── User-added stories (preserved by forgekit across regeneration) ───";

/// Merge freshly generated story content with the existing file.
///
/// `generated_exports` must list the story names the generator rendered into
/// `generated`; it is trusted, not re-derived. Stories in `existing` whose names
/// are not in that list are appended after the marker in their on-disk order.
/// When there is nothing to preserve, `generated` is returned untouched.
/// Preserved blocks are copied verbatim except for stale [`PRESERVED_MARKER`]
/// lines, which are dropped so the output carries exactly one marker.
///
/// Merging the output again with the same inputs yields the same content.
pub fn merge_stories(generated: &str, existing: &str, generated_exports: &[String]) -> MergeResult {
    let generated_names: HashSet<&str> = generated_exports.iter().map(String::as_str).collect();

    let user_added: Vec<String> = list_story_exports(existing)
        .into_iter()
        .filter(|name| !generated_names.contains(name.as_str()))
        .collect();

    if user_added.is_empty() {
        return MergeResult::unchanged(generated);
    }

    let blocks: Vec<String> = user_added
        .iter()
        .map(|name| strip_marker(extract_story_block(existing, name)))
        .filter(|block| !block.is_empty())
        .collect();

    let mut content = String::with_capacity(generated.len() + existing.len());
    content.push_str(generated.trim_end());
    content.push_str("\n\n");
    content.push_str(PRESERVED_MARKER);
    content.push_str("\n\n");
    content.push_str(&blocks.join("\n"));

    tracing::debug!(preserved = ?user_added, "Preserved user-added stories");

    MergeResult {
        content,
        preserved: user_added,
        removed: Vec::new(),
    }
}

/// Drop separator lines from a preserved block.
///
/// The marker sits inside the block of the story just above it. When the
/// generator stops producing that story it becomes user-added, and its block
/// would otherwise carry the old marker along and duplicate it.
fn strip_marker(block: String) -> String {
    if !block.contains(PRESERVED_MARKER) {
        return block;
    }

    let mut stripped = block
        .lines()
        .filter(|line| line.trim() != PRESERVED_MARKER)
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string();
    stripped.push('\n');
    stripped
}
