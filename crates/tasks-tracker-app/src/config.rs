use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

const APP_DIR: &str = "tasks-tracker";
const CONFIG_FILE: &str = "config.toml";
const DATABASE_FILE: &str = "tasks.db";

/// Default quiet period for the title filter.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
/// Upper bound accepted for `filter.debounce_ms`.
pub const MAX_DEBOUNCE_MS: u64 = 10_000;
/// Default timeout for a single store mutation.
pub const DEFAULT_SUBMIT_TIMEOUT_SECS: u64 = 30;

/// Top-level configuration loaded from `config.toml`.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database file; the platform data directory when absent.
    #[serde(default)]
    pub database: Option<PathBuf>,
    /// Title filter settings.
    #[serde(default)]
    pub filter: FilterConfig,
    /// Mutation settings.
    #[serde(default)]
    pub submit: SubmitConfig,
}

/// `[filter]` block.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    /// Quiet period before a typed title query is applied.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

/// `[submit]` block.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SubmitConfig {
    /// Seconds before an in-flight mutation is reported as failed.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_SUBMIT_TIMEOUT_SECS,
        }
    }
}

const fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_SUBMIT_TIMEOUT_SECS
}

impl AppConfig {
    /// Load from `explicit` when given, otherwise from the default location.
    ///
    /// A missing default file yields the defaults; a missing explicit file is an error.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read, parsed or validated.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                bail!("config file {} does not exist", path.display());
            }
            return Self::from_path(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::from_path(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load and validate a specific file.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read, parsed or validated.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Parse and validate TOML text.
    ///
    /// # Errors
    /// Returns an error when parsing or validation fails.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.filter.debounce_ms > MAX_DEBOUNCE_MS {
            bail!(
                "filter.debounce_ms must be between 0 and {MAX_DEBOUNCE_MS}, got {}",
                self.filter.debounce_ms
            );
        }
        if self.submit.timeout_secs == 0 {
            bail!("submit.timeout_secs must be greater than 0");
        }
        if self
            .database
            .as_ref()
            .is_some_and(|path| path.as_os_str().is_empty())
        {
            bail!("database must not be empty");
        }
        Ok(())
    }

    /// Database path, with `override_path` taking precedence.
    ///
    /// # Errors
    /// Returns an error when no path is configured and the platform has no data directory.
    pub fn database_path(&self, override_path: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = override_path.or(self.database.as_deref()) {
            return Ok(path.to_path_buf());
        }
        let base = dirs::data_dir().context("could not determine the data directory")?;
        Ok(base.join(APP_DIR).join(DATABASE_FILE))
    }

    /// Quiet period for the title filter.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.filter.debounce_ms)
    }

    /// Timeout applied to each mutation.
    #[must_use]
    pub const fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit.timeout_secs)
    }
}

/// `<config_dir>/tasks-tracker/config.toml`, when the platform has a config dir.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join(APP_DIR).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_file_yields_defaults() -> Result<()> {
        let config = AppConfig::from_toml("")?;
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.debounce(), Duration::from_millis(500));
        assert_eq!(config.submit_timeout(), Duration::from_secs(30));
        Ok(())
    }

    #[test]
    fn parses_every_section() -> Result<()> {
        let config = AppConfig::from_toml(
            r#"
database = "/tmp/tasks.db"

[filter]
debounce_ms = 0

[submit]
timeout_secs = 5
"#,
        )?;
        assert_eq!(config.database.as_deref(), Some(Path::new("/tmp/tasks.db")));
        assert_eq!(config.debounce(), Duration::ZERO);
        assert_eq!(config.submit_timeout(), Duration::from_secs(5));
        Ok(())
    }

    #[test]
    fn validation_names_offending_key() {
        let err = AppConfig::from_toml("[filter]\ndebounce_ms = 10001\n")
            .err()
            .unwrap_or_else(|| panic!("debounce above range must fail"));
        assert!(format!("{err:#}").contains("filter.debounce_ms"));

        let err = AppConfig::from_toml("[submit]\ntimeout_secs = 0\n")
            .err()
            .unwrap_or_else(|| panic!("zero timeout must fail"));
        assert!(format!("{err:#}").contains("submit.timeout_secs"));

        assert!(AppConfig::from_toml("database = \"\"\n").is_err());
        assert!(AppConfig::from_toml("[filter]\nunknown = 1\n").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() -> Result<()> {
        let temp = TempDir::new()?;
        assert!(AppConfig::load(Some(&temp.path().join("absent.toml"))).is_err());

        let path = temp.path().join("config.toml");
        fs::write(&path, "[submit]\ntimeout_secs = 2\n")?;
        assert_eq!(AppConfig::load(Some(&path))?.submit.timeout_secs, 2);
        Ok(())
    }

    #[test]
    fn database_override_wins() -> Result<()> {
        let config = AppConfig::from_toml("database = \"/data/a.db\"\n")?;
        assert_eq!(config.database_path(None)?, PathBuf::from("/data/a.db"));
        assert_eq!(
            config.database_path(Some(Path::new("/other/b.db")))?,
            PathBuf::from("/other/b.db")
        );
        Ok(())
    }
}
