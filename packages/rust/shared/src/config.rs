//! Application configuration for DeckBuilder.
//!
//! User config lives at `~/.deckbuilder/deckbuilder.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DeckBuilderError, Result};
use crate::types::{ConflictPolicy, SLIDES_SUBDIR};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "deckbuilder.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".deckbuilder";

// ---------------------------------------------------------------------------
// Config structs (matching deckbuilder.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// External converter settings.
    #[serde(default)]
    pub converter: ConverterConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Root directory holding the topic subdirectories.
    #[serde(default = "default_notebooks_dir")]
    pub notebooks_dir: String,

    /// Shared collection directory. Unset means `<root>/slides`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_dir: Option<String>,

    /// Input notebook extension (without the dot).
    #[serde(default = "default_notebook_ext")]
    pub notebook_ext: String,

    /// Generated artifact extension (without the dot).
    #[serde(default = "default_slides_ext")]
    pub slides_ext: String,

    /// Number of concurrent conversions.
    #[serde(default = "default_jobs")]
    pub jobs: u32,

    /// Policy for shared-collection filename collisions.
    #[serde(default)]
    pub on_conflict: ConflictPolicy,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            notebooks_dir: default_notebooks_dir(),
            collection_dir: None,
            notebook_ext: default_notebook_ext(),
            slides_ext: default_slides_ext(),
            jobs: default_jobs(),
            on_conflict: ConflictPolicy::default(),
        }
    }
}

fn default_notebooks_dir() -> String {
    "notebooks".into()
}
fn default_notebook_ext() -> String {
    "ipynb".into()
}
fn default_slides_ext() -> String {
    "html".into()
}
fn default_jobs() -> u32 {
    1
}

/// `[converter]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Converter executable (invoked as `<command> nbconvert ...`).
    #[serde(default = "default_command")]
    pub command: String,

    /// Output format passed as `--to <format>`.
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            format: default_format(),
        }
    }
}

fn default_command() -> String {
    "jupyter".into()
}
fn default_format() -> String {
    "slides".into()
}

// ---------------------------------------------------------------------------
// Batch config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime batch configuration — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Root directory holding the topic subdirectories.
    pub root: PathBuf,
    /// Shared collection directory.
    pub collection_dir: PathBuf,
    /// Input notebook extension (without the dot).
    pub notebook_ext: String,
    /// Generated artifact extension (without the dot).
    pub slides_ext: String,
    /// Number of concurrent conversions.
    pub jobs: u32,
    /// Policy for shared-collection filename collisions.
    pub on_conflict: ConflictPolicy,
}

impl From<&AppConfig> for BatchConfig {
    fn from(config: &AppConfig) -> Self {
        let root = PathBuf::from(&config.defaults.notebooks_dir);
        let collection_dir = match &config.defaults.collection_dir {
            Some(dir) => PathBuf::from(dir),
            None => root.join(SLIDES_SUBDIR),
        };
        Self {
            root,
            collection_dir,
            notebook_ext: config.defaults.notebook_ext.clone(),
            slides_ext: config.defaults.slides_ext.clone(),
            jobs: config.defaults.jobs.max(1),
            on_conflict: config.defaults.on_conflict,
        }
    }
}

impl BatchConfig {
    /// Re-derive the collection directory after a CLI `--root` override,
    /// unless an explicit collection dir was configured.
    pub fn set_root(&mut self, root: PathBuf, explicit_collection: bool) {
        if !explicit_collection {
            self.collection_dir = root.join(SLIDES_SUBDIR);
        }
        self.root = root;
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.deckbuilder/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DeckBuilderError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.deckbuilder/deckbuilder.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DeckBuilderError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DeckBuilderError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DeckBuilderError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DeckBuilderError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DeckBuilderError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
