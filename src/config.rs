use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::history::FORGEKIT_DIR;

const CONFIG_FILE: &str = "config.json";

/// Environment variable naming the project root when `--root` is not given.
pub const ROOT_ENV: &str = "FORGEKIT_ROOT";

/// Settings for one project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForgeConfig {
    /// Directory story paths and the `.forgekit/` state directory are resolved against.
    pub project_root: PathBuf,
    /// Record generate/update events in the story history ledger.
    pub track_history: bool,
    /// Carry user-added stories forward when regenerating a story file.
    pub preserve_user_stories: bool,
}

/// On-disk shape of `.forgekit/config.json`. Every field is optional.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    track_history: Option<bool>,
    preserve_user_stories: Option<bool>,
}

impl ForgeConfig {
    /// Defaults for `root`, ignoring any config file.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: root.into(),
            track_history: true,
            preserve_user_stories: true,
        }
    }

    /// Load configuration for `root`.
    /// Returns defaults if the config file doesn't exist or fails to parse.
    pub fn load(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let file = match try_load(&root) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                ConfigFile::default()
            }
        };

        let defaults = Self::new(root);
        Self {
            track_history: file.track_history.unwrap_or(defaults.track_history),
            preserve_user_stories: file
                .preserve_user_stories
                .unwrap_or(defaults.preserve_user_stories),
            ..defaults
        }
    }

    /// Resolve the project root from an explicit path, `FORGEKIT_ROOT`, or the
    /// current directory, in that order, and load its configuration.
    pub fn resolve(root: Option<PathBuf>) -> Result<Self> {
        let root = match root.or_else(|| std::env::var_os(ROOT_ENV).map(PathBuf::from)) {
            Some(root) => root,
            None => std::env::current_dir().context("Could not determine current directory")?,
        };
        Ok(Self::load(root))
    }

    pub fn config_path(&self) -> PathBuf {
        config_path(&self.project_root)
    }
}

fn config_path(root: &Path) -> PathBuf {
    root.join(FORGEKIT_DIR).join(CONFIG_FILE)
}

fn try_load(root: &Path) -> Result<ConfigFile> {
    let path = config_path(root);
    if !path.exists() {
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(&path).context("Failed to read config file")?;
    let file = serde_json::from_str(&content).context("Failed to parse config file")?;

    Ok(file)
}
