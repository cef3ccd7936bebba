/// `load_config` module: loads a JSON job config from disk or over HTTP and validates it against
/// the JSON schema document before mapping it to [`Config`].
///
/// This module is the only place where untrusted config JSON is parsed.
///
/// # Responsibilities
/// - Resolve a [`ConfigSource`] (local path or `http(s)` URL) to a JSON document
/// - Validate the document against `config_schema.json` before anything is rendered
/// - Deserialise the validated document into type-safe structs, keeping unknown fields
/// - Surface every failure as a [`ConfigError`] the CLI can report
///
/// # Errors
/// A missing config or schema is [`ConfigError::NotFound`], a document that does not satisfy
/// the schema is [`ConfigError::SchemaViolation`], and a non-200 answer from a config server is
/// [`ConfigError::RemoteError`]. All of them abort the run before any rendering.
use render_machine_core::job::RenderJob;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::convert::Infallible;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, error, info};

/// File name of the schema document looked up beside the executable.
pub const SCHEMA_FILE_NAME: &str = "config_schema.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{what} not found at {location}")]
    NotFound {
        what: &'static str,
        location: String,
    },

    #[error("config does not match schema: {}", .0.join("; "))]
    SchemaViolation(Vec<String>),

    #[error("config schema at {path} is not a valid JSON schema: {message}")]
    InvalidSchema { path: PathBuf, message: String },

    #[error("unexpected response from server requesting config: {status}, {body}")]
    RemoteError { status: u16, body: String },

    #[error("failed to parse JSON from {location}: {source}")]
    InvalidJson {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error requesting config: {0}")]
    Http(#[from] reqwest::Error),
}

/// Where the job config comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Local(PathBuf),
    Remote(String),
}

impl FromStr for ConfigSource {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("http://") || s.starts_with("https://") {
            Ok(ConfigSource::Remote(s.to_string()))
        } else {
            Ok(ConfigSource::Local(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Local(path) => write!(f, "{}", path.display()),
            ConfigSource::Remote(url) => write!(f, "{url}"),
        }
    }
}

/// A validated job config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub file_list: Vec<RenderJob>,
    /// Renderer binary, used when neither `--renderer` nor `RENDERER_PATH` is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer_path: Option<PathBuf>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Config {
    pub fn trace_loaded(&self) {
        info!(
            jobs = self.file_list.len(),
            renderer_path = ?self.renderer_path,
            extra_fields = self.extra.len(),
            "Loaded Config"
        );
        debug!(?self, "Config loaded (full debug)");
    }
}

/// `config_schema.json` in the directory of the running executable, falling back to the
/// working directory when the executable location is unknown.
pub fn default_schema_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(SCHEMA_FILE_NAME)))
        .unwrap_or_else(|| PathBuf::from(SCHEMA_FILE_NAME))
}

/// Loads the config from `source`, validates it against the schema at `schema_path` and
/// returns the typed config.
pub async fn load_config(source: &ConfigSource, schema_path: &Path) -> Result<Config, ConfigError> {
    info!(config = %source, schema = %schema_path.display(), "Loading configuration");

    let raw = match source {
        ConfigSource::Local(path) => read_local(path)?,
        ConfigSource::Remote(url) => fetch_remote(url).await?,
    };

    validate_config(&raw, schema_path)?;

    let config: Config = serde_json::from_value(raw).map_err(|e| {
        error!(error = ?e, config = %source, "Validated config did not map onto Config");
        ConfigError::InvalidJson {
            location: source.to_string(),
            source: e,
        }
    })?;
    config.trace_loaded();
    Ok(config)
}

fn read_local(path: &Path) -> Result<Value, ConfigError> {
    if !path.exists() {
        error!(config_path = ?path, "Config file does not exist");
        return Err(ConfigError::NotFound {
            what: "config",
            location: path.display().to_string(),
        });
    }
    read_json(path)
}

async fn fetch_remote(url: &str) -> Result<Value, ConfigError> {
    info!(url, "Requesting remote config");
    let response = reqwest::get(url).await.map_err(|e| {
        error!(error = ?e, url, "Config request failed");
        e
    })?;

    let status = response.status();
    let body = response.text().await?;
    if status != reqwest::StatusCode::OK {
        error!(url, status = status.as_u16(), "Config server answered with non-200 status");
        return Err(ConfigError::RemoteError {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| ConfigError::InvalidJson {
        location: url.to_string(),
        source: e,
    })
}

fn read_json(path: &Path) -> Result<Value, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| {
        error!(error = ?e, path = ?path, "Failed to read file");
        ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }
    })?;
    serde_json::from_str(&content).map_err(|e| {
        error!(error = ?e, path = ?path, "Failed to parse JSON");
        ConfigError::InvalidJson {
            location: path.display().to_string(),
            source: e,
        }
    })
}

/// Checks `config` against the schema document at `schema_path`.
pub fn validate_config(config: &Value, schema_path: &Path) -> Result<(), ConfigError> {
    if !schema_path.exists() {
        error!(schema_path = ?schema_path, "Config schema does not exist");
        return Err(ConfigError::NotFound {
            what: "config schema",
            location: schema_path.display().to_string(),
        });
    }
    let schema = read_json(schema_path)?;

    let compiled =
        jsonschema::JSONSchema::compile(&schema).map_err(|e| ConfigError::InvalidSchema {
            path: schema_path.to_path_buf(),
            message: e.to_string(),
        })?;

    if let Err(errors) = compiled.validate(config) {
        let violations: Vec<String> = errors
            .map(|e| format!("{} (at '{}')", e, e.instance_path))
            .collect();
        error!(?violations, "Config failed schema validation");
        return Err(ConfigError::SchemaViolation(violations));
    }

    info!(schema_path = ?schema_path, "Config passed schema validation");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_remote_sources() {
        assert_eq!(
            "https://example.com/config.json".parse::<ConfigSource>().unwrap(),
            ConfigSource::Remote("https://example.com/config.json".to_string())
        );
        assert_eq!(
            "./config.json".parse::<ConfigSource>().unwrap(),
            ConfigSource::Local(PathBuf::from("./config.json"))
        );
    }

    #[test]
    fn default_schema_sits_beside_executable() {
        let path = default_schema_path();
        assert_eq!(path.file_name().unwrap(), SCHEMA_FILE_NAME);
    }
}
