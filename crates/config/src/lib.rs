use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level configuration, merged from the user config file and an
/// optional per-repository `.quorum/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub scheduler: SchedulerSettings,
    #[serde(default)]
    pub retry: RetrySettings,
}

fn default_backend() -> String {
    "ollama".to_string()
}

fn default_model() -> String {
    "qwen2.5-coder:7b".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Which gateway backend to use: "ollama" or "openai".
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            model: default_model(),
            base_url: None,
            api_key: None,
            temperature: default_temperature(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_cache_capacity() -> usize {
    128
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: default_cache_capacity(),
        }
    }
}

fn default_agent_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerSettings {
    /// Per-agent timeout. An agent still running past this is cancelled
    /// and recorded as errored with message "timeout".
    #[serde(default = "default_agent_timeout_secs")]
    pub agent_timeout_secs: u64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            agent_timeout_secs: default_agent_timeout_secs(),
        }
    }
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Additional attempts after the first failure.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content =
                std::fs::read_to_string(&path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quorum")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn load_project(project_root: &Path) -> Result<Option<Self>> {
        let path = project_root.join(".quorum").join("config.toml");
        if path.exists() {
            let content =
                std::fs::read_to_string(&path).context("Failed to read project config")?;
            let config: Config =
                toml::from_str(&content).context("Failed to parse project config")?;
            Ok(Some(config))
        } else {
            Ok(None)
        }
    }

    /// Project values win over global ones, but only where the project file
    /// actually diverges from the defaults.
    pub fn merge(global: &Config, project: &Config) -> Config {
        fn pick<T: PartialEq + Clone>(global: &T, project: &T, default: &T) -> T {
            if project != default {
                project.clone()
            } else {
                global.clone()
            }
        }

        let d = Config::default();
        Config {
            gateway: GatewayConfig {
                backend: pick(
                    &global.gateway.backend,
                    &project.gateway.backend,
                    &d.gateway.backend,
                ),
                model: pick(&global.gateway.model, &project.gateway.model, &d.gateway.model),
                base_url: pick(
                    &global.gateway.base_url,
                    &project.gateway.base_url,
                    &d.gateway.base_url,
                ),
                api_key: pick(
                    &global.gateway.api_key,
                    &project.gateway.api_key,
                    &d.gateway.api_key,
                ),
                temperature: pick(
                    &global.gateway.temperature,
                    &project.gateway.temperature,
                    &d.gateway.temperature,
                ),
            },
            cache: pick(&global.cache, &project.cache, &d.cache),
            scheduler: pick(&global.scheduler, &project.scheduler, &d.scheduler),
            retry: pick(&global.retry, &project.retry, &d.retry),
        }
    }

    /// Load the user config and overlay the project config, if present.
    pub fn resolve(project_root: &Path) -> Result<Self> {
        let global = Self::load()?;
        match Self::load_project(project_root)? {
            Some(project) => {
                tracing::debug!("using project config from {}", project_root.display());
                Ok(Self::merge(&global, &project))
            }
            None => Ok(global),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.gateway.backend, "ollama");
        assert!(config.cache.enabled);
        assert_eq!(config.cache.capacity, 128);
        assert_eq!(config.scheduler.agent_timeout_secs, 30);
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.retry.retry_delay_ms, 1000);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [gateway]
            backend = "openai"
            model = "gpt-4.1-mini"

            [cache]
            capacity = 16
            "#,
        )
        .unwrap();
        assert_eq!(config.gateway.backend, "openai");
        assert_eq!(config.gateway.model, "gpt-4.1-mini");
        assert_eq!(config.cache.capacity, 16);
        assert!(config.cache.enabled);
        assert_eq!(config.scheduler.agent_timeout_secs, 30);
    }

    #[test]
    fn merge_prefers_non_default_project_values() {
        let mut global = Config::default();
        global.gateway.model = "global-model".to_string();
        global.scheduler.agent_timeout_secs = 60;

        let mut project = Config::default();
        project.gateway.backend = "openai".to_string();

        let merged = Config::merge(&global, &project);
        assert_eq!(merged.gateway.backend, "openai");
        // The project file never set a model, so the global one survives.
        assert_eq!(merged.gateway.model, "global-model");
        assert_eq!(merged.scheduler.agent_timeout_secs, 60);
    }

    #[test]
    fn load_project_reads_dot_quorum() {
        let dir = tempfile::tempdir().unwrap();
        let quorum_dir = dir.path().join(".quorum");
        std::fs::create_dir_all(&quorum_dir).unwrap();
        std::fs::write(
            quorum_dir.join("config.toml"),
            "[scheduler]\nagent_timeout_secs = 5\n",
        )
        .unwrap();

        let loaded = Config::load_project(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.scheduler.agent_timeout_secs, 5);
        assert!(Config::load_project(&dir.path().join("missing"))
            .unwrap()
            .is_none());
    }
}
