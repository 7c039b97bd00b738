use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub queue: QueueConfig,
    pub anthropic: AnthropicConfig,
    pub openai: OpenAiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Redis broker URL. Job scheduling and retry semantics are the broker's
    /// concern; this service only pushes and pops.
    pub url: String,
    pub key: String,
}

/// Anthropic provider settings for the classification client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnthropicConfig {
    pub api_key: String,
    /// Optional proxy base URL in front of the provider API.
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
}

/// OpenAI provider settings for the response-drafting client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Config {
    /// Load configuration with environment variable override support.
    ///
    /// Loading order:
    /// 1. Load from config.toml file
    /// 2. Override with environment variables (prefixed with APP_)
    /// 3. Validate the final configuration
    pub fn load() -> Result<Self, anyhow::Error> {
        let mut config = if let Some(config_path) = Self::find_config_file() {
            Self::from_toml(&config_path)?
        } else {
            tracing::warn!("Configuration file not found, using defaults");
            Config::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Supported environment variables:
    /// - APP_SERVER_HOST / APP_SERVER_PORT
    /// - APP_DATABASE_URL: SQLite database URL
    /// - APP_QUEUE_URL: Redis broker URL
    /// - APP_ANTHROPIC_API_KEY / APP_ANTHROPIC_BASE_URL / APP_ANTHROPIC_MODEL
    /// - APP_OPENAI_API_KEY / APP_OPENAI_BASE_URL / APP_OPENAI_MODEL
    /// - APP_LOG_LEVEL
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("APP_SERVER_HOST") {
            self.server.host = host;
            tracing::info!("Override server.host from env: {}", self.server.host);
        }

        if let Ok(port) = std::env::var("APP_SERVER_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
                tracing::info!("Override server.port from env: {}", self.server.port);
            }
        }

        if let Ok(db_url) = std::env::var("APP_DATABASE_URL") {
            self.database.url = db_url;
            tracing::info!("Override database.url from env");
        }

        if let Ok(queue_url) = std::env::var("APP_QUEUE_URL") {
            self.queue.url = queue_url;
            tracing::info!("Override queue.url from env");
        }

        if let Ok(key) = std::env::var("APP_ANTHROPIC_API_KEY") {
            self.anthropic.api_key = key;
            tracing::info!("Override anthropic.api_key from env");
        }

        if let Ok(url) = std::env::var("APP_ANTHROPIC_BASE_URL") {
            self.anthropic.base_url = url;
            tracing::info!("Override anthropic.base_url from env: {}", self.anthropic.base_url);
        }

        if let Ok(model) = std::env::var("APP_ANTHROPIC_MODEL") {
            self.anthropic.model = model;
            tracing::info!("Override anthropic.model from env: {}", self.anthropic.model);
        }

        if let Ok(key) = std::env::var("APP_OPENAI_API_KEY") {
            self.openai.api_key = key;
            tracing::info!("Override openai.api_key from env");
        }

        if let Ok(url) = std::env::var("APP_OPENAI_BASE_URL") {
            self.openai.base_url = url;
            tracing::info!("Override openai.base_url from env: {}", self.openai.base_url);
        }

        if let Ok(model) = std::env::var("APP_OPENAI_MODEL") {
            self.openai.model = model;
            tracing::info!("Override openai.model from env: {}", self.openai.model);
        }

        if let Ok(level) = std::env::var("APP_LOG_LEVEL") {
            self.logging.level = level;
            tracing::info!("Override logging.level from env: {}", self.logging.level);
        }
    }

    /// Validate configuration.
    fn validate(&self) -> Result<(), anyhow::Error> {
        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.queue.url.is_empty() {
            anyhow::bail!("Queue broker URL cannot be empty");
        }

        if self.anthropic.timeout_seconds == 0 || self.openai.timeout_seconds == 0 {
            anyhow::bail!("LLM provider timeout_seconds must be > 0");
        }

        // API keys are only required by the worker; the serve process never
        // calls the providers. Warn instead of failing so the API can start.
        if self.anthropic.api_key.is_empty() {
            tracing::warn!("anthropic.api_key is empty; the worker cannot classify tickets");
        }
        if self.openai.api_key.is_empty() {
            tracing::warn!("openai.api_key is empty; the worker cannot draft responses");
        }

        Ok(())
    }

    fn find_config_file() -> Option<String> {
        let possible_paths =
            ["conf/config.toml", "config.toml", "./conf/config.toml", "./config.toml"];

        for path in &possible_paths {
            if Path::new(path).exists() {
                return Some(path.to_string());
            }
        }
        None
    }

    fn from_toml(path: &str) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8000 }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: "sqlite://tickets.db".to_string() }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { url: "redis://localhost:6379".to_string(), key: "ticket_jobs".to_string() }
    }
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-3-5-sonnet-latest".to_string(),
            timeout_seconds: 60,
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_seconds: 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info,ticket_intake=debug".to_string(), file: None }
    }
}
