// Startup configuration consumed by bootstrap

use crate::routing::RouteMode;
use serde::{Deserialize, Serialize};

/// What the injector does when no bean matches an injection point
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDependencyPolicy {
    /// Leave the slot unset; using it later fails with `Error::Unwired`
    #[default]
    LeaveUnset,
    /// Abort bootstrap
    Fail,
}

impl std::str::FromStr for MissingDependencyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "leave_unset" | "ignore" => Ok(MissingDependencyPolicy::LeaveUnset),
            "fail" | "strict" => Ok(MissingDependencyPolicy::Fail),
            other => Err(format!("unknown missing dependency policy: {}", other)),
        }
    }
}

/// Settings for one application context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Namespace to scan for components
    #[serde(alias = "scanPackage")]
    pub scan_package: String,
    /// Deployment prefix stripped from request paths
    #[serde(alias = "contextPath")]
    pub context_path: String,
    #[serde(alias = "routeMode")]
    pub route_mode: RouteMode,
    #[serde(alias = "missingDependency")]
    pub missing_dependency: MissingDependencyPolicy,
    pub host: String,
    pub port: u16,
}

impl ContextConfig {
    pub fn new(scan_package: impl Into<String>) -> Self {
        Self {
            scan_package: scan_package.into(),
            ..Self::default()
        }
    }

    pub fn with_context_path(mut self, context_path: impl Into<String>) -> Self {
        self.context_path = context_path.into();
        self
    }

    pub fn with_route_mode(mut self, route_mode: RouteMode) -> Self {
        self.route_mode = route_mode;
        self
    }

    pub fn with_missing_dependency(mut self, policy: MissingDependencyPolicy) -> Self {
        self.missing_dependency = policy;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            scan_package: String::new(),
            context_path: String::new(),
            route_mode: RouteMode::Exact,
            missing_dependency: MissingDependencyPolicy::LeaveUnset,
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ContextConfig::default();
        assert_eq!(config.route_mode, RouteMode::Exact);
        assert_eq!(config.missing_dependency, MissingDependencyPolicy::LeaveUnset);
        assert_eq!(config.port, 8080);
        assert!(config.context_path.is_empty());
    }

    #[test]
    fn test_deserialize_with_camel_case_keys() {
        let config: ContextConfig = serde_json::from_value(serde_json::json!({
            "scanPackage": "demo",
            "route_mode": "pattern",
            "missing_dependency": "fail",
        }))
        .unwrap();

        assert_eq!(config.scan_package, "demo");
        assert_eq!(config.route_mode, RouteMode::Pattern);
        assert_eq!(config.missing_dependency, MissingDependencyPolicy::Fail);
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            "leave-unset".parse::<MissingDependencyPolicy>(),
            Ok(MissingDependencyPolicy::LeaveUnset)
        );
        assert_eq!("FAIL".parse::<MissingDependencyPolicy>(), Ok(MissingDependencyPolicy::Fail));
        assert!("maybe".parse::<MissingDependencyPolicy>().is_err());
    }
}
