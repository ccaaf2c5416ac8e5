use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use forgekit_stories::config::ForgeConfig;
use forgekit_stories::{history, mcp, merge, sync};

#[derive(Parser)]
#[command(name = "forgekit")]
#[command(about = "Regenerate Storybook stories without losing hand-written ones")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP server via stdio
    Mcp {
        /// Project root (defaults to FORGEKIT_ROOT, then the current directory)
        #[arg(short, long)]
        root: Option<PathBuf>,
    },
    /// Show the generation history of a story file
    History {
        /// Story file path relative to the project root
        story_path: String,

        /// Project root (defaults to FORGEKIT_ROOT, then the current directory)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Print the raw history entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the story exports declared in a story file
    Exports {
        /// Path to the story file
        file: PathBuf,
    },
}

/// Initialize tracing with output to stderr (for MCP mode) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "forgekit_stories=info".into()),
    );

    if use_stderr {
        // MCP mode: log to stderr so stdout is clean for protocol
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // MCP mode needs stderr for logging since stdout is the protocol channel
    let use_stderr = matches!(cli.command, Some(Commands::Mcp { .. }) | None);
    init_tracing(use_stderr);

    match cli.command {
        Some(Commands::Mcp { root }) => {
            let config = ForgeConfig::resolve(root)?;
            mcp::run_stdio_server(config).await?;
        }
        Some(Commands::History {
            story_path,
            root,
            json,
        }) => {
            let config = ForgeConfig::resolve(root)?;
            let story_path = sync::story_key(&story_path)?;
            let entries = history::versions_for(&config.project_root, &story_path);

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("No history recorded for {}", story_path);
            } else {
                for entry in entries {
                    println!(
                        "v{:<3} {}  {:<8} {}  {}",
                        entry.version,
                        entry.generated_at.format("%Y-%m-%d %H:%M:%S"),
                        entry.action.as_str(),
                        entry.story_hash.get(..12).unwrap_or(&entry.story_hash),
                        entry.component_path
                    );
                }
            }
        }
        Some(Commands::Exports { file }) => {
            let source = std::fs::read_to_string(&file)?;
            let exports = merge::list_story_exports(&source);
            for name in &exports {
                println!("{}", name);
            }

            let duplicates = merge::find_duplicate_exports(&exports);
            if !duplicates.is_empty() {
                tracing::warn!("Duplicate story exports: {}", duplicates.join(", "));
            }
        }
        None => {
            // Default: MCP server for the current project
            let config = ForgeConfig::resolve(None)?;
            mcp::run_stdio_server(config).await?;
        }
    }

    Ok(())
}
