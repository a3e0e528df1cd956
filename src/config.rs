//! Application configuration
//!
//! Settings come from `~/.resico/config.toml` (optional), then environment
//! variables (`RESICO_DB`, `RESICO_OWNER`, `RESICO_TENANT`), then CLI flags.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::db::ScopeKey;

pub const DEFAULT_OWNER: &str = "default";

/// Resolved settings
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// SQLite database file; defaults to ~/.resico/data.db
    pub database_path: Option<PathBuf>,
    /// Owner used when no --owner flag is given
    pub owner: Option<String>,
    /// Tenant used when no --tenant flag is given
    pub tenant: Option<String>,
}

/// Get the application directory (~/.resico)
///
/// Only computes the path; `resico init` creates the directory.
pub fn resico_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".resico"))
}

impl Config {
    /// Parse a TOML document
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse configuration")
    }

    /// Load a config file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .context(format!("Failed to read config file {:?}", path))?;
        Self::from_toml(&contents).context(format!("Invalid config file {:?}", path))
    }

    /// Load ~/.resico/config.toml and apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match resico_home() {
            Ok(home) => Self::load_from(&home.join("config.toml"))?,
            Err(err) => {
                debug!("{:#}, using default settings", err);
                Self::default()
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production). Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(db) = non_empty("RESICO_DB") {
            self.database_path = Some(PathBuf::from(db));
        }
        if let Some(owner) = non_empty("RESICO_OWNER") {
            self.owner = Some(owner);
        }
        if let Some(tenant) = non_empty("RESICO_TENANT") {
            self.tenant = Some(tenant);
        }
    }

    /// Scope for queries, preferring explicit values over configured ones
    pub fn scope(&self, owner: Option<&str>, tenant: Option<&str>) -> ScopeKey {
        let owner = owner
            .map(str::to_string)
            .or_else(|| self.owner.clone())
            .unwrap_or_else(|| DEFAULT_OWNER.to_string());
        let tenant = tenant.map(str::to_string).or_else(|| self.tenant.clone());

        ScopeKey { tenant, owner }
    }
}
