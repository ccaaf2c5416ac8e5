//! Regenerate Storybook story files without losing hand-written stories.
//!
//! - [`merge`]: story export scanning and merging of generated and on-disk content
//! - [`history`]: the per-project, capped story history ledger
//! - [`sync`]: the read → merge → write → record workflow
//! - [`mcp`]: the stdio MCP server exposing it all as tools

pub mod config;
pub mod error;
pub mod hash;
pub mod history;
pub mod mcp;
pub mod merge;
pub mod models;
pub mod sync;
