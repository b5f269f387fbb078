use crate::agent::AgentConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const AXON_DIR: &str = ".axon";

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. Use the available tools when \
    they help you answer. For multi-step computations, prefer execute_code and call the tool \
    wrappers from there.";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: String,
    pub system_prompt: String,
    pub max_iterations: usize,
    pub sandbox_timeout_secs: u64,
    pub sandbox_interpreter: String,
    pub verbose: bool,
    #[serde(skip)]
    pub state_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: String::new(),
            base_url: None,
            model: "gpt-4o".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_iterations: 10,
            sandbox_timeout_secs: 30,
            sandbox_interpreter: "python3".to_string(),
            verbose: false,
            state_file: get_axon_dir().join("state.json"),
        }
    }
}

impl Config {
    /// Loads the config file, writing a default one on first run so the
    /// user has something to edit.
    pub fn load_or_init() -> Result<Self> {
        let config_path = get_config_path();
        let mut config = if config_path.exists() {
            load_config(&config_path)?
        } else {
            let config = Config::default();
            save_config(&config_path, &config)?;
            config
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Environment wins over the config file for the connection settings.
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("AXON_API_KEY") {
            self.api_key = key;
        }
        if let Ok(model) = std::env::var("AXON_MODEL") {
            self.model = model;
        }
        if let Ok(base_url) = std::env::var("AXON_BASE_URL") {
            self.base_url = Some(base_url);
        }
    }

    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig {
            system_prompt: self.system_prompt.clone(),
            max_iterations: self.max_iterations,
            state_file_path: self.state_file.clone(),
        }
    }
}

pub fn get_axon_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(AXON_DIR)
}

pub fn get_config_path() -> PathBuf {
    get_axon_dir().join("config.toml")
}

pub fn load_config(config_path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("failed to read config from {}", config_path.display()))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("failed to parse config from {}", config_path.display()))?;
    config.state_file = get_axon_dir().join("state.json");

    Ok(config)
}

pub fn save_config(config_path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let content = toml::to_string_pretty(config).context("failed to serialize config to TOML")?;
    std::fs::write(config_path, content)
        .with_context(|| format!("failed to write config to {}", config_path.display()))?;

    Ok(())
}
