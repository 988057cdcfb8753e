use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub catalog: CatalogConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    #[serde(rename = "openai")]
    OpenAi,
    Ollama,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub llm_model: Option<String>,
    pub catalog_path: Option<PathBuf>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig {
                provider: LlmProvider::OpenAi,
                api_key: None,
                base_url: None,
                model: "gpt-4o-mini".to_string(),
                timeout_secs: 60,
            },
            catalog: CatalogConfig { path: PathBuf::from("config/products.json") },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8000,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl LlmConfig {
    /// Base URL the completion client should talk to, falling back to the public OpenAI
    /// endpoint when the provider is OpenAI and no override is configured.
    pub fn effective_base_url(&self) -> &str {
        match (&self.base_url, self.provider) {
            (Some(url), _) => url.trim_end_matches('/'),
            (None, LlmProvider::OpenAi) => DEFAULT_OPENAI_BASE_URL,
            (None, LlmProvider::Ollama) => "http://localhost:11434",
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::Validation(format!(
                "unsupported llm provider `{other}` (expected openai|ollama)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        match resolve_config_path(options.config_path.as_deref()) {
            Some(path) => read_patch(&path)?.merge_into(&mut config),
            None if options.require_file => {
                let expected =
                    options.config_path.unwrap_or_else(|| PathBuf::from("supportdesk.toml"));
                return Err(ConfigError::MissingConfigFile(expected));
            }
            None => {}
        }

        config.apply_env()?;
        options.overrides.merge_into(&mut config);
        config.validate()?;

        Ok(config)
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        let llm = &mut self.llm;
        if let Some(provider) = env_parsed("SUPPORTDESK_LLM_PROVIDER")? {
            llm.provider = provider;
        }
        if let Some(key) = env_first(&["SUPPORTDESK_LLM_API_KEY", "OPENAI_API_KEY"]) {
            llm.api_key = Some(secret_value(key));
        }
        llm.base_url = env_first(&["SUPPORTDESK_LLM_BASE_URL"]).or(llm.base_url.take());
        replace_from_env(&mut llm.model, &["SUPPORTDESK_LLM_MODEL"]);
        if let Some(timeout_secs) = env_parsed("SUPPORTDESK_LLM_TIMEOUT_SECS")? {
            llm.timeout_secs = timeout_secs;
        }

        if let Some(path) = env_first(&["SUPPORTDESK_CATALOG_PATH"]) {
            self.catalog.path = PathBuf::from(path);
        }

        let server = &mut self.server;
        replace_from_env(&mut server.bind_address, &["SUPPORTDESK_SERVER_BIND_ADDRESS"]);
        if let Some(port) = env_parsed("SUPPORTDESK_SERVER_PORT")? {
            server.port = port;
        }
        if let Some(grace) = env_parsed("SUPPORTDESK_SERVER_GRACEFUL_SHUTDOWN_SECS")? {
            server.graceful_shutdown_secs = grace;
        }

        replace_from_env(
            &mut self.logging.level,
            &["SUPPORTDESK_LOGGING_LEVEL", "SUPPORTDESK_LOG_LEVEL"],
        );
        if let Some(format) = env_first(&["SUPPORTDESK_LOGGING_FORMAT", "SUPPORTDESK_LOG_FORMAT"])
        {
            self.logging.format = format.parse()?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_llm(&self.llm)?;
        validate_catalog(&self.catalog)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

impl ConfigOverrides {
    fn merge_into(self, config: &mut AppConfig) {
        set_some(&mut config.llm.model, self.llm_model);
        set_some(&mut config.catalog.path, self.catalog_path);
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("supportdesk.toml"), PathBuf::from("config/supportdesk.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let expanded = expand_env_references(&raw)?;
    toml::from_str::<ConfigPatch>(&expanded)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

/// Replaces every `${NAME}` in the raw file with the value of env var `NAME`.
fn expand_env_references(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let end = after_open.find('}').ok_or(ConfigError::UnterminatedInterpolation)?;
        let name = &after_open[..end];

        let value = env::var(name)
            .map_err(|_| ConfigError::MissingEnvInterpolation { var: name.to_string() })?;
        output.push_str(&value);
        rest = &after_open[end + 1..];
    }

    output.push_str(rest);
    Ok(output)
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if llm.model.trim().is_empty() {
        return Err(ConfigError::Validation("llm.model must not be empty".to_string()));
    }

    match llm.provider {
        LlmProvider::OpenAi => {
            let missing = llm
                .api_key
                .as_ref()
                .map(|value| value.expose_secret().trim().is_empty())
                .unwrap_or(true);
            if missing {
                return Err(ConfigError::Validation(
                    "llm.api_key is required for the openai provider (set SUPPORTDESK_LLM_API_KEY or OPENAI_API_KEY)"
                        .to_string(),
                ));
            }
        }
        LlmProvider::Ollama => {
            let missing =
                llm.base_url.as_ref().map(|value| value.trim().is_empty()).unwrap_or(true);
            if missing {
                return Err(ConfigError::Validation(
                    "llm.base_url is required for ollama provider".to_string(),
                ));
            }
        }
    }

    if let Some(base_url) = &llm.base_url {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "llm.base_url must start with http:// or https://".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_catalog(catalog: &CatalogConfig) -> Result<(), ConfigError> {
    if catalog.path.as_os_str().is_empty() {
        return Err(ConfigError::Validation("catalog.path must not be empty".to_string()));
    }
    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn set_some<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// First non-blank value among `keys`, in order.
fn env_first(keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| env::var(key).ok().filter(|value| !value.trim().is_empty()))
}

fn replace_from_env(slot: &mut String, keys: &[&str]) {
    set_some(slot, env_first(keys));
}

fn env_parsed<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
{
    env_first(&[key])
        .map(|value| {
            value.trim().parse::<T>().map_err(|_| ConfigError::InvalidEnvOverride {
                key: key.to_string(),
                value,
            })
        })
        .transpose()
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    llm: Option<LlmPatch>,
    catalog: Option<CatalogPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

impl ConfigPatch {
    fn merge_into(self, config: &mut AppConfig) {
        if let Some(llm) = self.llm {
            set_some(&mut config.llm.provider, llm.provider);
            if let Some(key) = llm.api_key {
                config.llm.api_key = Some(secret_value(key));
            }
            config.llm.base_url = llm.base_url.or(config.llm.base_url.take());
            set_some(&mut config.llm.model, llm.model);
            set_some(&mut config.llm.timeout_secs, llm.timeout_secs);
        }
        if let Some(catalog) = self.catalog {
            set_some(&mut config.catalog.path, catalog.path);
        }
        if let Some(server) = self.server {
            set_some(&mut config.server.bind_address, server.bind_address);
            set_some(&mut config.server.port, server.port);
            set_some(&mut config.server.graceful_shutdown_secs, server.graceful_shutdown_secs);
        }
        if let Some(logging) = self.logging {
            set_some(&mut config.logging.level, logging.level);
            set_some(&mut config.logging.format, logging.format);
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    provider: Option<LlmProvider>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
