//! Configuration for the prompt relay
//!
//! Provides configuration parsing and management for the relay root
//! directory, the recognized-agent registry, and advisory locking.
//!
//! # Configuration File Format
//!
//! TOML format in `hermes.toml`:
//!
//! ```toml
//! root = "prompts"
//! agents = ["claude", "gemini"]
//!
//! [lock]
//! enabled = false
//! timeout_ms = 5000
//! poll_ms = 50
//! ```

use crate::error::{RelayError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Root directory holding the stage subdirectories
    #[serde(default = "default_root")]
    pub root: String,

    /// Recognized agent names; approval routing is validated against this
    #[serde(default = "default_agents")]
    pub agents: Vec<String>,

    /// Advisory lock settings
    #[serde(default)]
    pub lock: LockSettings,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            agents: default_agents(),
            lock: LockSettings::default(),
        }
    }
}

/// Per-id advisory lock settings
///
/// Disabled by default: on a single filesystem the stage move is one atomic
/// rename and needs no lock. Enable when the relay tree spans storage that
/// cannot guarantee atomic rename.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockSettings {
    /// Enable the per-id advisory lock around stage moves
    #[serde(default)]
    pub enabled: bool,

    /// Give up waiting for a lock after this long
    #[serde(default = "default_lock_timeout_ms")]
    pub timeout_ms: u64,

    /// Poll interval while waiting for a lock
    #[serde(default = "default_lock_poll_ms")]
    pub poll_ms: u64,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_ms: default_lock_timeout_ms(),
            poll_ms: default_lock_poll_ms(),
        }
    }
}

// Default value helpers
fn default_root() -> String {
    "prompts".to_string()
}

fn default_agents() -> Vec<String> {
    vec!["claude".to_string(), "gemini".to_string()]
}

fn default_lock_timeout_ms() -> u64 {
    5000
}

fn default_lock_poll_ms() -> u64 {
    50
}

impl RelayConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("Config file not found, using defaults: {:?}", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            RelayError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config file: {}", e),
            ))
        })?;

        let config: RelayConfig = toml::from_str(&content)
            .map_err(|e| RelayError::Config(format!("Failed to parse config file: {}", e)))?;

        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| RelayError::Config(format!("Failed to serialize config: {}", e)))?;

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                RelayError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create config directory: {}", e),
                ))
            })?;
        }

        std::fs::write(path, content).map_err(|e| {
            RelayError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write config file: {}", e),
            ))
        })?;

        tracing::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Whether an agent name is in the recognized registry
    pub fn is_known_agent(&self, name: &str) -> bool {
        self.agents.iter().any(|a| a == name)
    }

    /// Get default config path for a project
    pub fn default_path() -> PathBuf {
        PathBuf::from("hermes.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();

        assert_eq!(config.root, "prompts");
        assert!(config.is_known_agent("claude"));
        assert!(config.is_known_agent("gemini"));
        assert!(!config.is_known_agent("unknown"));

        assert!(!config.lock.enabled);
        assert_eq!(config.lock.timeout_ms, 5000);
        assert_eq!(config.lock.poll_ms, 50);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("hermes.toml");

        let mut config = RelayConfig::default();
        config.agents.push("codex".to_string());
        config.save(&config_path).unwrap();

        assert!(config_path.exists());

        let loaded = RelayConfig::load(&config_path).unwrap();
        assert_eq!(loaded.root, config.root);
        assert!(loaded.is_known_agent("codex"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("hermes.toml");
        std::fs::write(&config_path, "agents = [\"alpha\", \"beta\"]\n").unwrap();

        let loaded = RelayConfig::load(&config_path).unwrap();
        assert_eq!(loaded.root, "prompts");
        assert!(loaded.is_known_agent("alpha"));
        assert!(!loaded.is_known_agent("claude"));
        assert_eq!(loaded.lock.timeout_ms, 5000);
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let config = RelayConfig::load(Path::new("/nonexistent/hermes.toml")).unwrap();
        assert_eq!(config.root, "prompts");
    }

    #[test]
    fn test_load_rejects_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("hermes.toml");
        std::fs::write(&config_path, "agents = not-a-list\n").unwrap();

        let err = RelayConfig::load(&config_path).unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));
    }
}
