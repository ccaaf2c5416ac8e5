//! MCP server for regenerating story files without losing hand-written stories.

mod types;

pub use types::*;

use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::Serialize;

use crate::config::ForgeConfig;
use crate::error::StoryError;
use crate::history;
use crate::merge::{find_duplicate_exports, list_story_exports, merge_stories};
use crate::models::*;
use crate::sync;

#[derive(Clone)]
pub struct McpServer {
    config: ForgeConfig,
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    pub fn new(config: ForgeConfig) -> Self {
        Self {
            config,
            tool_router: Self::tool_router(),
        }
    }

    fn story_err(e: StoryError) -> McpError {
        let data = Some(serde_json::json!({ "code": e.code() }));
        match &e {
            StoryError::InvalidPath(_) => McpError::invalid_params(e.to_string(), data),
            _ => McpError::internal_error(e.to_string(), data),
        }
    }

    fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    /// Read the story at `story_path`, `None` if it does not exist yet.
    fn read_existing(&self, story_path: &str) -> Result<Option<String>, McpError> {
        let path = sync::resolve_story_path(&self.config.project_root, story_path)
            .map_err(Self::story_err)?;
        sync::read_story(&path).map_err(Self::story_err)
    }

    // ============================================================
    // Tool logic - shared by the tool router and tests
    // ============================================================

    pub fn handle_list_story_exports(
        &self,
        story_path: &str,
    ) -> Result<StoryExportsResponse, McpError> {
        let source = self
            .read_existing(story_path)?
            .ok_or_else(|| McpError::invalid_params("Story file not found", None))?;

        let exports = list_story_exports(&source);
        let duplicates = find_duplicate_exports(&exports);
        if !duplicates.is_empty() {
            tracing::warn!(story = story_path, ?duplicates, "Story file declares duplicate exports");
        }

        Ok(StoryExportsResponse {
            story_path: story_path.to_string(),
            exports,
            duplicates,
        })
    }

    pub fn handle_preview_merge(
        &self,
        req: PreviewMergeRequest,
    ) -> Result<MergePreviewResponse, McpError> {
        let generated_exports = req
            .generated_exports
            .unwrap_or_else(|| list_story_exports(&req.generated));

        let response = match self.read_existing(&req.story_path)? {
            Some(existing) => MergePreviewResponse::new(
                req.story_path,
                true,
                merge_stories(&req.generated, &existing, &generated_exports),
            ),
            None => MergePreviewResponse::new(
                req.story_path,
                false,
                MergeResult::unchanged(req.generated),
            ),
        };

        Ok(response)
    }

    pub fn handle_write_story(&self, req: WriteStoryRequest) -> Result<WriteStoryResponse, McpError> {
        let generated_exports = req
            .generated_exports
            .unwrap_or_else(|| list_story_exports(&req.generated));

        let outcome = sync::write_story(
            &self.config,
            StoryWriteRequest {
                story_path: req.story_path,
                component_path: req.component_path,
                generated: req.generated,
                generated_exports,
                preserve_user_stories: req.preserve_user_stories,
            },
        )
        .map_err(Self::story_err)?;

        Ok(outcome.into())
    }

    pub fn handle_get_story_history(
        &self,
        story_path: &str,
    ) -> Result<StoryHistoryResponse, McpError> {
        let key = sync::story_key(story_path).map_err(Self::story_err)?;

        let entries = history::versions_for(&self.config.project_root, &key)
            .into_iter()
            .map(HistoryEntryInfo::from)
            .collect();

        Ok(StoryHistoryResponse {
            story_path: key,
            entries,
        })
    }
}

#[tool_router]
impl McpServer {
    #[tool(
        description = "List the story exports declared in a story file, in file order. Returns export names and any names declared more than once (a malformed file). Use this to see which stories exist before regenerating."
    )]
    async fn list_story_exports(
        &self,
        params: Parameters<ListStoryExportsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let response = self.handle_list_story_exports(&params.0.story_path)?;
        Self::json_result(&response)
    }

    #[tool(
        description = "Preview merging freshly generated story content with the story file on disk, without writing anything. Stories on disk that the generator did not produce are user-added and are kept after a separator comment. Returns the merged content and the preserved story names."
    )]
    async fn preview_merge(
        &self,
        params: Parameters<PreviewMergeRequest>,
    ) -> Result<CallToolResult, McpError> {
        let response = self.handle_preview_merge(params.0)?;
        Self::json_result(&response)
    }

    #[tool(
        description = "Write freshly generated story content to a story file. User-added stories already in the file are preserved unless preserve_user_stories=false. Skips the write when nothing changed. Side effects: writes the story file and appends a versioned entry to .forgekit/story-history.json (max 10 per story)."
    )]
    async fn write_story(
        &self,
        params: Parameters<WriteStoryRequest>,
    ) -> Result<CallToolResult, McpError> {
        let response = self.handle_write_story(params.0)?;
        Self::json_result(&response)
    }

    #[tool(
        description = "Get the generation history of a story file, oldest first. Each entry has a version number, timestamp, content hash, and action (created, updated, merged). Only the 10 most recent versions are kept."
    )]
    async fn get_story_history(
        &self,
        params: Parameters<GetStoryHistoryRequest>,
    ) -> Result<CallToolResult, McpError> {
        let response = self.handle_get_story_history(&params.0.story_path)?;
        Self::json_result(&response)
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: rmcp::model::Implementation {
                name: "forgekit-stories".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            instructions: Some(
                r#"forgekit keeps generated Storybook story files up to date without losing hand-written stories.

WORKFLOW:
1. Generate story content for a component
2. Call preview_merge to see which user-added stories will be kept
3. Call write_story to write the file and record a history entry
4. Call get_story_history to review past generations

RULES:
- Story paths are relative to the project root
- Stories the generator produces are always replaced with fresh content
- Stories only found on disk are kept verbatim below the separator comment
- Pass generated_exports when the generator reports them; otherwise they are read from the generated content"#
                    .into(),
            ),
            ..Default::default()
        }
    }
}

pub async fn run_stdio_server(config: ForgeConfig) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!(
        root = %config.project_root.display(),
        "Starting MCP server via stdio"
    );

    let service = McpServer::new(config);
    let server = service.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}
