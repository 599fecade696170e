use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AgentError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub agent: AgentConfig,
    pub python: PythonConfig,
    pub csv: CsvConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    #[serde(rename = "openai")]
    #[value(name = "openai")]
    OpenAi,
    Anthropic,
}

impl LlmProvider {
    /// Model used when the config does not name one
    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => crate::llm::openai::DEFAULT_MODEL,
            LlmProvider::Anthropic => crate::llm::anthropic::DEFAULT_MODEL,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    /// Unset means the provider's default model
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_ms: u64,
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::OpenAi,
            model: None,
            temperature: 0.0,
            max_tokens: 4096,
            timeout_ms: 300000,
            base_url: None,
        }
    }
}

impl LlmConfig {
    /// Configured model, or the provider's default
    pub fn model_name(&self) -> &str {
        self.model.as_deref().unwrap_or(self.provider.default_model())
    }

    /// Switch provider; a model configured for the other provider is dropped
    pub fn with_provider(mut self, provider: LlmProvider) -> Self {
        if provider != self.provider {
            self.model = None;
            self.provider = provider;
        }
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub max_iterations: u32,
    pub verbose: bool,
    pub return_intermediate_steps: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 15,
            verbose: true,
            return_intermediate_steps: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PythonConfig {
    pub interpreter: String,
    pub timeout_ms: u64,
    pub max_output_bytes: usize,
    pub working_dir: PathBuf,
    /// Print the repr of a trailing expression, like an interactive shell
    pub echo_last_expression: bool,
}

impl Default for PythonConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
            timeout_ms: 120000,
            max_output_bytes: 30000,
            working_dir: PathBuf::from("."),
            echo_last_expression: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    pub path: PathBuf,
    pub preview_rows: usize,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("episode_info.csv"),
            preview_rows: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_results: u32,
    pub search_depth: String,
    pub timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            search_depth: "basic".to_string(),
            timeout_ms: 30000,
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, it must load
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        if let Some(config_dir) = dirs::config_dir() {
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| AgentError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        let config = Self::from_yaml(&content)?;

        log::info!("Loaded config from: {}", path.display());
        Ok(config)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| AgentError::Config(format!("Failed to parse config: {}", e)))
    }
}

/// Provider credentials, read once at startup and passed to constructors
#[derive(Clone, Default)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub tavily_api_key: Option<String>,
}

impl Credentials {
    pub const OPENAI_ENV: &'static str = "OPENAI_API_KEY";
    pub const ANTHROPIC_ENV: &'static str = "ANTHROPIC_API_KEY";
    pub const TAVILY_ENV: &'static str = "TAVILY_API_KEY";

    /// Load `.env` (if present) and snapshot the credential variables
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => log::info!("Loaded environment from {}", path.display()),
            Err(e) => log::debug!("No .env loaded: {}", e),
        }

        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        Self {
            openai_api_key: read(Self::OPENAI_ENV),
            anthropic_api_key: read(Self::ANTHROPIC_ENV),
            tavily_api_key: read(Self::TAVILY_ENV),
        }
    }

    pub fn openai_api_key(&self) -> Result<&str> {
        Self::require(&self.openai_api_key, Self::OPENAI_ENV)
    }

    pub fn anthropic_api_key(&self) -> Result<&str> {
        Self::require(&self.anthropic_api_key, Self::ANTHROPIC_ENV)
    }

    pub fn tavily_api_key(&self) -> Result<&str> {
        Self::require(&self.tavily_api_key, Self::TAVILY_ENV)
    }

    fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
        value
            .as_deref()
            .ok_or_else(|| AgentError::MissingCredential(name.to_string()))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("openai_api_key", &mask(&self.openai_api_key))
            .field("anthropic_api_key", &mask(&self.anthropic_api_key))
            .field("tavily_api_key", &mask(&self.tavily_api_key))
            .finish()
    }
}
