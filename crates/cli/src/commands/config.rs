use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;
use supportdesk_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run(options: &LoadOptions) -> String {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines =
        vec!["effective config (source precedence: flag > env > file > default):".to_string()];

    lines.push(render_line(
        "llm.provider",
        &format!("{:?}", config.llm.provider),
        source("llm.provider", &["SUPPORTDESK_LLM_PROVIDER"]),
    ));
    lines.push(render_line(
        "llm.model",
        &config.llm.model,
        flag_or(options.overrides.llm_model.is_some(), "--model", || {
            source("llm.model", &["SUPPORTDESK_LLM_MODEL"])
        }),
    ));
    lines.push(render_line(
        "llm.base_url",
        config.llm.effective_base_url(),
        source("llm.base_url", &["SUPPORTDESK_LLM_BASE_URL"]),
    ));
    let api_key = config
        .llm
        .api_key
        .as_ref()
        .map(|key| redact_key(key.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());
    lines.push(render_line(
        "llm.api_key",
        &api_key,
        source("llm.api_key", &["SUPPORTDESK_LLM_API_KEY", "OPENAI_API_KEY"]),
    ));
    lines.push(render_line(
        "llm.timeout_secs",
        &config.llm.timeout_secs.to_string(),
        source("llm.timeout_secs", &["SUPPORTDESK_LLM_TIMEOUT_SECS"]),
    ));

    lines.push(render_line(
        "catalog.path",
        &config.catalog.path.display().to_string(),
        flag_or(options.overrides.catalog_path.is_some(), "--catalog", || {
            source("catalog.path", &["SUPPORTDESK_CATALOG_PATH"])
        }),
    ));

    lines.push(render_line(
        "server.bind_address",
        &config.server.bind_address,
        source("server.bind_address", &["SUPPORTDESK_SERVER_BIND_ADDRESS"]),
    ));
    lines.push(render_line(
        "server.port",
        &config.server.port.to_string(),
        source("server.port", &["SUPPORTDESK_SERVER_PORT"]),
    ));
    lines.push(render_line(
        "server.graceful_shutdown_secs",
        &config.server.graceful_shutdown_secs.to_string(),
        source("server.graceful_shutdown_secs", &["SUPPORTDESK_SERVER_GRACEFUL_SHUTDOWN_SECS"]),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["SUPPORTDESK_LOGGING_LEVEL", "SUPPORTDESK_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["SUPPORTDESK_LOGGING_FORMAT", "SUPPORTDESK_LOG_FORMAT"]),
    ));

    lines.join("\n")
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    [PathBuf::from("supportdesk.toml"), PathBuf::from("config/supportdesk.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn flag_or(flag_set: bool, flag: &str, fallback: impl FnOnce() -> String) -> String {
    if flag_set {
        format!("flag ({flag})")
    } else {
        fallback()
    }
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps the vendor prefix (`sk-`, `sk-proj-`) and hides the rest.
fn redact_key(key: &str) -> String {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    match trimmed.rsplit_once('-') {
        Some((prefix, _)) if prefix.len() <= 8 => format!("{prefix}-***"),
        _ => "<redacted>".to_string(),
    }
}
