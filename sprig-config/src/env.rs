// Environment variable loading

use crate::{ConfigError, Result};
use std::collections::HashMap;
use std::env;

/// Prefix of the variables that override file settings
pub const DEFAULT_PREFIX: &str = "SPRIG";

/// Environment variable loader
///
/// With a prefix, only `PREFIX_*` variables are read and the returned keys
/// have the prefix removed and are lower-cased: `SPRIG_SCAN_PACKAGE`
/// becomes `scan_package`.
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Load every matching variable
    pub fn load(&self) -> Result<HashMap<String, String>> {
        Ok(self.collect(env::vars()))
    }

    fn collect(&self, vars: impl IntoIterator<Item = (String, String)>) -> HashMap<String, String> {
        let mut config = HashMap::new();

        for (key, value) in vars {
            match &self.prefix {
                Some(prefix) => {
                    let Some(rest) = key
                        .strip_prefix(prefix.as_str())
                        .and_then(|rest| rest.strip_prefix('_'))
                    else {
                        continue;
                    };
                    if !rest.is_empty() {
                        config.insert(rest.to_lowercase(), value);
                    }
                }
                None => {
                    config.insert(key.to_lowercase(), value);
                }
            }
        }

        config
    }

    /// Load a specific variable, `key` taken without the prefix
    pub fn load_var(&self, key: &str) -> Result<String> {
        let full_key = match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        };

        env::var(&full_key).map_err(ConfigError::EnvError)
    }

    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(Some(DEFAULT_PREFIX.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_prefix_is_trimmed_and_keys_lowercased() {
        let loader = EnvLoader::default();
        let loaded = loader.collect(vars(&[
            ("SPRIG_SCAN_PACKAGE", "demo"),
            ("SPRIG_PORT", "9090"),
            ("SPRIGGY_PORT", "1"),
            ("SPRIG_", "empty"),
            ("PATH", "/bin"),
        ]));

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded["scan_package"], "demo");
        assert_eq!(loaded["port"], "9090");
    }

    #[test]
    fn test_no_prefix_reads_everything() {
        let loader = EnvLoader::new(None);
        let loaded = loader.collect(vars(&[("HOME", "/root"), ("Lang", "C")]));
        assert_eq!(loaded["home"], "/root");
        assert_eq!(loaded["lang"], "C");
    }

    #[test]
    fn test_env_loader_with_default() {
        let loader = EnvLoader::default();
        assert_eq!(loader.load_var_or("NONEXISTENT_VAR_12345", "default"), "default");
        assert!(loader.load_var("NONEXISTENT_VAR_12345").is_err());
    }
}
