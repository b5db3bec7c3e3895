// Configuration management for the Sprig container

pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use env::{DEFAULT_PREFIX, EnvLoader};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{ConfigValidator, Validate};

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sprig_core::ContextConfig;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Main configuration manager
///
/// A flat key/value store. Later loads override earlier ones, so load files
/// first and the environment last.
#[derive(Clone)]
pub struct ConfigManager {
    config: Arc<RwLock<HashMap<String, Value>>>,
    env_prefix: Option<String>,
}

impl ConfigManager {
    /// Create a manager reading `SPRIG_*` environment variables
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_PREFIX.to_string())
    }

    /// Create with environment variable prefix
    pub fn with_prefix(prefix: String) -> Self {
        Self {
            config: Arc::new(RwLock::new(HashMap::new())),
            env_prefix: Some(prefix),
        }
    }

    /// Load configuration from environment variables
    pub fn load_env(&self) -> Result<()> {
        let loader = EnvLoader::new(self.env_prefix.clone());
        let env_vars = loader.load()?;

        let mut config = self.config.write();
        for (key, value) in env_vars {
            debug!(key = %key, "Configuration overridden from environment");
            config.insert(key, Value::String(value));
        }

        Ok(())
    }

    /// Load a .env file into the process environment, then the environment
    pub fn load_dotenv(&self, path: Option<&str>) -> Result<()> {
        if let Some(path) = path {
            dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
        } else {
            dotenvy::dotenv().ok(); // Ignore if .env doesn't exist
        }
        self.load_env()
    }

    /// Load configuration from file
    pub fn load_file(&self, path: &str, format: FileFormat) -> Result<()> {
        let data = ConfigLoader::new(format).load_file(path)?;
        self.merge_value(data, path)
    }

    /// Load configuration from file, choosing the format by extension
    pub fn load_file_auto(&self, path: &str) -> Result<()> {
        let data = ConfigLoader::auto(path)?.load_file(path)?;
        self.merge_value(data, path)
    }

    /// Load configuration from an in-memory document
    pub fn load_str(&self, content: &str, format: FileFormat) -> Result<()> {
        let data = ConfigLoader::new(format).parse(content)?;
        self.merge_value(data, "<string>")
    }

    fn merge_value(&self, data: Value, source: &str) -> Result<()> {
        let Value::Object(map) = data else {
            return Err(ConfigError::ParseError(format!(
                "{} does not contain a table of settings",
                source
            )));
        };

        debug!(source, keys = map.len(), "Configuration loaded");
        let mut config = self.config.write();
        for (key, value) in map {
            config.insert(key, value);
        }

        Ok(())
    }

    /// Set a configuration value
    pub fn set<T: serde::Serialize>(&self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value)
            .map_err(|e| ConfigError::SerializationError(e.to_string()))?;

        self.config.write().insert(key.to_string(), json_value);
        Ok(())
    }

    /// Get a configuration value
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self
            .config
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;

        serde_json::from_value(value).map_err(|e| ConfigError::DeserializationError(e.to_string()))
    }

    /// Get a configuration value with default
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Get a string value; numbers and booleans are rendered as text
    pub fn get_string(&self, key: &str) -> Result<String> {
        let value = self
            .lookup(&[key])
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;
        text(key, &value)
    }

    /// Get a value parsed from its text form
    ///
    /// Property and environment sources only produce strings, so typed
    /// settings go through here rather than [`get`](Self::get).
    pub fn get_parsed<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.get_string(key)?;
        parse(key, &raw)
    }

    /// Check if a key exists
    pub fn has(&self, key: &str) -> bool {
        self.config.read().contains_key(key)
    }

    /// Get all configuration keys
    pub fn keys(&self) -> Vec<String> {
        self.config.read().keys().cloned().collect()
    }

    /// Assemble and validate the startup configuration
    ///
    /// Each setting may be spelled in snake case or camel case
    /// (`scan_package` or `scanPackage`); missing settings keep their
    /// defaults. The scan package is required.
    pub fn context_config(&self) -> Result<ContextConfig> {
        let mut config = ContextConfig::default();

        if let Some(value) = self.lookup(&["scan_package", "scanPackage"]) {
            config.scan_package = text("scan_package", &value)?.trim().to_string();
        }
        if let Some(value) = self.lookup(&["context_path", "contextPath"]) {
            config.context_path = text("context_path", &value)?.trim().to_string();
        }
        if let Some(value) = self.lookup(&["route_mode", "routeMode"]) {
            config.route_mode = parse("route_mode", &text("route_mode", &value)?)?;
        }
        if let Some(value) = self.lookup(&["missing_dependency", "missingDependency"]) {
            config.missing_dependency =
                parse("missing_dependency", &text("missing_dependency", &value)?)?;
        }
        if let Some(value) = self.lookup(&["host"]) {
            config.host = text("host", &value)?.trim().to_string();
        }
        if let Some(value) = self.lookup(&["port"]) {
            config.port = parse("port", &text("port", &value)?)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// First present key wins
    fn lookup(&self, keys: &[&str]) -> Option<Value> {
        let config = self.config.read();
        keys.iter().find_map(|key| config.get(*key).cloned())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys = self.keys();
        keys.sort();
        f.debug_struct("ConfigManager")
            .field("keys", &keys)
            .field("env_prefix", &self.env_prefix)
            .finish()
    }
}

fn text(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(ConfigError::DeserializationError(format!(
            "{} must be a scalar, found {}",
            key, other
        ))),
    }
}

fn parse<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| ConfigError::ValidationError(format!("{}: {}", key, e)))
}
