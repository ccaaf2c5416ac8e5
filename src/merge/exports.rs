//! Story export scanning.
//!
//! Story files are scanned line by line instead of being parsed as TypeScript.
//! A story export is a top-level `export const Name: Story` (or `StoryObj<...>`)
//! declaration; its block runs until the next top-level `export const` line or
//! the end of the file. A body line that happens to look like a declaration
//! (inside a template literal, say) is treated as a boundary.
//!
//! Only `export const` ends a block. Any other top-level line after the last
//! story in a file, such as a trailing `export default meta;`, belongs to that
//! story's block and travels with it when the story is preserved.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// `export const Name: Story` / `export const Name: StoryObj<typeof meta>`.
static STORY_EXPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^export[ \t]+const[ \t]+([A-Za-z_$][\w$]*)[ \t]*:[ \t]*Story(?:Obj)?\b")
        .expect("story export pattern is valid")
});

/// Any top-level `export const` declaration, which ends the block before it.
static EXPORT_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^export[ \t]+const[ \t]+[A-Za-z_$][\w$]*")
        .expect("export boundary pattern is valid")
});

/// A story export declaration and the byte offset of its declaration line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryExport {
    pub name: String,
    pub start: usize,
}

/// Scan `source` for story export declarations in file order.
pub fn story_exports(source: &str) -> Vec<StoryExport> {
    STORY_EXPORT
        .captures_iter(source)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            Some(StoryExport {
                name: name.as_str().to_string(),
                start: whole.start(),
            })
        })
        .collect()
}

/// List story export names in file order.
///
/// Duplicates are kept so callers can spot malformed files.
pub fn list_story_exports(source: &str) -> Vec<String> {
    story_exports(source).into_iter().map(|e| e.name).collect()
}

/// Names that occur more than once, in the order they were first seen.
pub fn find_duplicate_exports(names: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();
    for name in names {
        if !seen.insert(name.as_str()) && reported.insert(name.as_str()) {
            duplicates.push(name.clone());
        }
    }
    duplicates
}

/// Extract the source block owned by the story export `name`.
///
/// The block starts at the first declaration of `name` and ends right before the
/// next top-level `export const` line, whatever it declares, or at the end of the
/// file. Trailing whitespace is trimmed and a single newline appended. Returns an
/// empty string when `name` is not declared.
pub fn extract_story_block(source: &str, name: &str) -> String {
    let Some(export) = story_exports(source).into_iter().find(|e| e.name == name) else {
        return String::new();
    };

    let end = EXPORT_BOUNDARY
        .find_iter(source)
        .map(|m| m.start())
        .find(|&offset| offset > export.start)
        .unwrap_or(source.len());

    let mut block = source[export.start..end].trim_end().to_string();
    block.push('\n');
    block
}
