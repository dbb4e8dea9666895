use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use photosync_core::ClassifierRules;
use photosync_engine::AgentSettings;
use photosync_logging::{sync_debug, sync_info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::LogDestination;

pub const DEFAULT_CONFIG_FILE: &str = "photosync.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Settings read from `photosync.ron`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub agent_url: String,
    pub connect_timeout_ms: u64,
    pub status_timeout_ms: u64,
    pub submit_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub detail_paths: Vec<String>,
    pub album_list_paths: Vec<String>,
    pub log: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        let agent = AgentSettings::default();
        let rules = ClassifierRules::default();
        Self {
            agent_url: agent.base_url,
            connect_timeout_ms: millis(agent.connect_timeout),
            status_timeout_ms: millis(agent.status_timeout),
            submit_timeout_ms: millis(agent.submit_timeout),
            poll_interval_ms: millis(agent.poll_interval),
            detail_paths: rules.detail_paths,
            album_list_paths: rules.album_list_paths,
            log: LogDestination::default(),
        }
    }
}

impl AppConfig {
    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                sync_debug!("No config at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: AppConfig = ron::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        sync_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn agent_settings(&self) -> AgentSettings {
        AgentSettings {
            base_url: self.agent_url.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            status_timeout: Duration::from_millis(self.status_timeout_ms),
            submit_timeout: Duration::from_millis(self.submit_timeout_ms),
            // A zero period would make the poller spin.
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
        }
    }

    pub fn classifier_rules(&self) -> ClassifierRules {
        ClassifierRules {
            detail_paths: self.detail_paths.clone(),
            album_list_paths: self.album_list_paths.clone(),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig::load(&temp.path().join(DEFAULT_CONFIG_FILE)).unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.agent_settings(), AgentSettings::default());
        assert_eq!(config.classifier_rules(), ClassifierRules::default());
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(
            &path,
            r#"(
                agent_url: "http://127.0.0.1:6001",
                poll_interval_ms: 250,
                album_list_paths: ["/album/list", "/v2/albums"],
                log: Both,
            )"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        let settings = config.agent_settings();

        assert_eq!(settings.base_url, "http://127.0.0.1:6001");
        assert_eq!(settings.poll_interval, Duration::from_millis(250));
        assert_eq!(settings.status_timeout, Duration::from_secs(3));
        assert_eq!(config.log, LogDestination::Both);
        assert_eq!(
            config.classifier_rules().album_list_paths,
            vec!["/album/list".to_string(), "/v2/albums".to_string()]
        );
        assert_eq!(config.detail_paths, vec!["/live/detail".to_string()]);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "(agent_url: 42,").unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
