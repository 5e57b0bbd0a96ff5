use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub indexing: IndexingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// JSON file holding the document index.
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,
    /// Directory the indexed PDFs are copied into.
    #[serde(default = "default_library_dir")]
    pub library_dir: PathBuf,
    /// JSON file holding the knowledge base.
    #[serde(default = "default_knowledge_path")]
    pub knowledge_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            index_path: default_index_path(),
            library_dir: default_library_dir(),
            knowledge_path: default_knowledge_path(),
        }
    }
}

fn default_index_path() -> PathBuf {
    PathBuf::from("resources/index.json")
}
fn default_library_dir() -> PathBuf {
    PathBuf::from("resources/library")
}
fn default_knowledge_path() -> PathBuf {
    PathBuf::from("resources/knowledge.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexingConfig {
    /// Concurrent page units. 0 means one worker per available core.
    #[serde(default)]
    pub workers: usize,
    /// Bounded wait per page unit; a page that exceeds it is recorded as a
    /// failure instead of stalling the whole build.
    #[serde(default = "default_page_timeout")]
    pub page_timeout_secs: u64,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            page_timeout_secs: default_page_timeout(),
        }
    }
}

fn default_page_timeout() -> u64 {
    60
}

impl IndexingConfig {
    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            self.workers
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.indexing.page_timeout_secs == 0 {
        anyhow::bail!("indexing.page_timeout_secs must be > 0");
    }

    Ok(config)
}
