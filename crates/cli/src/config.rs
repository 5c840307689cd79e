use directories::{BaseDirs, ProjectDirs};
use eyre::Result;
use regswitch_registry::DEFAULT_REGISTRY_NAME;
use regswitch_registry::probe::DEFAULT_PROBE_PATH;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Environment variable that overrides the record file location.
pub const RECORD_ENV: &str = "REGSWITCH_RECORD";

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub record: RecordConfig,
    #[serde(default)]
    pub npm: NpmConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RecordConfig {
    /// Custom registry file; `~/.nrmrc` when unset.
    pub path: Option<String>,
    /// Registry switched to when the one in use is deleted.
    pub fallback: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct NpmConfig {
    pub command: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    pub path: String,
    pub timeout_secs: Option<u64>,
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            path: None,
            fallback: DEFAULT_REGISTRY_NAME.to_string(),
        }
    }
}

impl Default for NpmConfig {
    fn default() -> Self {
        Self {
            command: "npm".to_string(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_PROBE_PATH.to_string(),
            timeout_secs: None,
        }
    }
}

impl Config {
    pub fn get_config_path() -> PathBuf {
        get_default_config_dir().join("config.json")
    }

    /// Load from `path`, writing the defaults there first if it does not exist.
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            let default_config = Self::default();
            default_config.save(path).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Record file location: `$REGSWITCH_RECORD`, then `record.path`, then `~/.nrmrc`.
    pub fn record_path(&self) -> PathBuf {
        if let Some(path) = std::env::var_os(RECORD_ENV).filter(|p| !p.is_empty()) {
            return PathBuf::from(path);
        }
        match &self.record.path {
            Some(path) => PathBuf::from(path),
            None => get_home_dir().join(".nrmrc"),
        }
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["record", "path"] => {
                self.record.path = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            ["record", "fallback"] => {
                if value.is_empty() {
                    return Err(eyre::eyre!("Fallback registry name cannot be empty"));
                }
                self.record.fallback = value.to_string();
            }
            ["npm", "command"] => {
                if value.is_empty() {
                    return Err(eyre::eyre!("npm command cannot be empty"));
                }
                self.npm.command = value.to_string();
            }
            ["probe", "path"] => {
                self.probe.path = value.to_string();
            }
            ["probe", "timeout_secs"] => {
                self.probe.timeout_secs = if value.is_empty() {
                    None
                } else {
                    Some(
                        value
                            .parse::<u64>()
                            .map_err(|_| eyre::eyre!("Invalid number of seconds: {}", value))?,
                    )
                };
            }
            _ => {
                return Err(eyre::eyre!("Unknown configuration key: {}", key));
            }
        }

        Ok(())
    }

    pub fn get_value(&self, key: &str) -> Result<String> {
        let parts: Vec<&str> = key.split('.').collect();

        let value = match parts.as_slice() {
            ["record", "path"] => self.record_path().to_string_lossy().to_string(),
            ["record", "fallback"] => self.record.fallback.clone(),
            ["npm", "command"] => self.npm.command.clone(),
            ["probe", "path"] => self.probe.path.clone(),
            ["probe", "timeout_secs"] => self
                .probe
                .timeout_secs
                .map(|secs| secs.to_string())
                .unwrap_or_default(),
            _ => {
                return Err(eyre::eyre!("Unknown configuration key: {}", key));
            }
        };

        Ok(value)
    }

    pub fn show_all(&self) -> String {
        format!(
            "Configuration:\n\
             Record:\n\
             ├─ path: {}\n\
             └─ fallback: {}\n\
             npm:\n\
             └─ command: {}\n\
             Probe:\n\
             ├─ path: {}\n\
             └─ timeout_secs: {}",
            self.record_path().display(),
            self.record.fallback,
            self.npm.command,
            self.probe.path,
            self.probe
                .timeout_secs
                .map(|secs| secs.to_string())
                .unwrap_or_else(|| "(transport default)".to_string()),
        )
    }

    pub async fn reset(path: &Path) -> Result<Self> {
        let config = Self::default();
        config.save(path).await?;
        Ok(config)
    }
}

/// Get the default configuration directory
fn get_default_config_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("org", "regswitch", "regswitch") {
        proj_dirs.config_dir().to_path_buf()
    } else {
        // Fallback to current directory if we can't determine project dirs
        PathBuf::from(".regswitch").join("config")
    }
}

fn get_home_dir() -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
