//! Runtime configuration, read from `config.toml` and `FOLIO_*` environment
//! variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

/// Indexer and API server settings.
#[derive(Debug, Deserialize, Clone)]
pub struct IndexerConfig {
  /// SQLite database holding the host tables; a leading `~/` is expanded.
  pub store_path:   PathBuf,
  #[serde(default = "default_index_name")]
  pub index_name:   String,
  #[serde(default = "default_host")]
  pub host:         String,
  #[serde(default = "default_port")]
  pub port:         u16,
  /// Views fetched at once during a reindex.
  #[serde(default = "default_concurrency")]
  pub concurrency:  usize,
  /// Tries per view before a reindex gives up on it.
  #[serde(default = "default_max_attempts")]
  pub max_attempts: u32,
}

fn default_index_name() -> String { "folio".to_string() }

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_concurrency() -> usize { 8 }

fn default_max_attempts() -> u32 { 3 }

impl IndexerConfig {
  /// Layer the optional TOML file at `path` under `FOLIO_`-prefixed
  /// environment variables.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("FOLIO"))
      .build()
      .context("failed to read config file")?;
    Self::from_settings(settings)
  }

  fn from_settings(settings: config::Config) -> anyhow::Result<Self> {
    settings
      .try_deserialize()
      .context("failed to deserialise IndexerConfig")
  }

  /// `store_path` with a leading `~` expanded to the user's home directory.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
