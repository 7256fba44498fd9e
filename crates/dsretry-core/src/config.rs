use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::retry::{saturating_millis, RetryPolicy};

/// Retry policy parameters (optional `[retry]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts per call (including the first).
    pub max_attempts: u32,
    /// Wait before the first retry, in milliseconds.
    pub base_wait_ms: u64,
    /// Multiplier applied to the wait after a timeout failure.
    pub timeout_factor: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            base_wait_ms: saturating_millis(policy.base_wait),
            timeout_factor: policy.timeout_factor,
        }
    }
}

/// Configuration loaded from `~/.config/dsretry/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Emit a diagnostic record (with backtrace) for every datastore call.
    #[serde(default)]
    pub call_logging: bool,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl StoreConfig {
    /// Effective retry policy, validating the `[retry]` section if present.
    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        match &self.retry {
            Some(retry) => RetryPolicy::try_from(retry),
            None => Ok(RetryPolicy::default()),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dsretry")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<StoreConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = StoreConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from_path(&path)
}

/// Load and validate configuration from an explicit path.
pub fn load_from_path(path: &Path) -> Result<StoreConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let cfg: StoreConfig = toml::from_str(&data)
        .with_context(|| format!("invalid config: {}", path.display()))?;
    cfg.retry_policy()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config_values() {
        let cfg = StoreConfig::default();
        assert!(cfg.retry.is_none());
        assert!(!cfg.call_logging);
        assert_eq!(cfg.retry_policy().unwrap(), RetryPolicy::default());
    }

    #[test]
    fn retry_config_defaults_match_policy() {
        let retry = RetryConfig::default();
        assert_eq!(retry.max_attempts, 6);
        assert_eq!(retry.base_wait_ms, 800);
        assert_eq!(retry.timeout_factor, 3);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = StoreConfig {
            retry: Some(RetryConfig::default()),
            call_logging: true,
        };
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: StoreConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_toml_custom_retry() {
        let toml = r#"
            call_logging = true

            [retry]
            max_attempts = 3
            base_wait_ms = 250
        "#;
        let cfg: StoreConfig = toml::from_str(toml).unwrap();
        assert!(cfg.call_logging);
        let retry = cfg.retry.as_ref().unwrap();
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.base_wait_ms, 250);
        // Omitted fields fall back to defaults.
        assert_eq!(retry.timeout_factor, 3);
        let policy = cfg.retry_policy().unwrap();
        assert_eq!(policy.base_wait, Duration::from_millis(250));
    }

    #[test]
    fn empty_file_is_default() {
        let cfg: StoreConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, StoreConfig::default());
    }

    #[test]
    fn load_from_path_reads_file() {
        let f = NamedTempFile::new().unwrap();
        fs::write(f.path(), "[retry]\nmax_attempts = 2\n").unwrap();
        let cfg = load_from_path(f.path()).unwrap();
        assert_eq!(cfg.retry_policy().unwrap().max_attempts, 2);
    }

    #[test]
    fn load_from_path_rejects_zero_factor() {
        let f = NamedTempFile::new().unwrap();
        fs::write(f.path(), "[retry]\ntimeout_factor = 0\n").unwrap();
        assert!(load_from_path(f.path()).is_err());
    }
}
