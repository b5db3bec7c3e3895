// Configuration validation

use crate::{ConfigError, Result};
use sprig_core::ContextConfig;

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Reusable validation rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate that a value is not blank
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    /// Validate that a value is empty or an absolute path
    pub fn is_path(value: &str, field: &str) -> Result<()> {
        if !value.is_empty() && !value.starts_with('/') {
            return Err(ConfigError::ValidationError(format!(
                "{} must start with '/'",
                field
            )));
        }
        Ok(())
    }

    pub fn is_host(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() || value.contains(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "{} must be a host name or address",
                field
            )));
        }
        Ok(())
    }
}

impl Validate for ContextConfig {
    fn validate(&self) -> Result<()> {
        ConfigValidator::not_empty(&self.scan_package, "scan_package")?;
        ConfigValidator::is_path(&self.context_path, "context_path")?;
        ConfigValidator::is_host(&self.host, "host")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_empty_validation() {
        assert!(ConfigValidator::not_empty("value", "field").is_ok());
        assert!(ConfigValidator::not_empty("  ", "field").is_err());
    }

    #[test]
    fn test_path_validation() {
        assert!(ConfigValidator::is_path("", "field").is_ok());
        assert!(ConfigValidator::is_path("/app", "field").is_ok());
        assert!(ConfigValidator::is_path("app", "field").is_err());
    }

    #[test]
    fn test_context_config_validation() {
        assert!(ContextConfig::new("demo").validate().is_ok());
        assert!(ContextConfig::default().validate().is_err());
        assert!(ContextConfig::new("demo").with_context_path("app").validate().is_err());
    }
}
