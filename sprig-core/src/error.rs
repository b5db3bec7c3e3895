// Error types for the Sprig container and dispatcher

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Bootstrap-fatal
    #[error("Scan namespace could not be resolved: {0}")]
    UnresolvedNamespace(String),

    #[error("Failed to instantiate component {component}: {reason}")]
    Instantiation { component: String, reason: String },

    #[error("Contract {contract} is already bound to {existing}, cannot bind {incoming}")]
    DuplicateContractBinding {
        contract: String,
        existing: String,
        incoming: String,
    },

    #[error("Bean name already registered: {name}")]
    DuplicateBeanName { name: String },

    #[error("No bean named {target} for {component}.{field}")]
    MissingDependency {
        component: String,
        field: String,
        target: String,
    },

    #[error("Bean {target} cannot be assigned to {component}.{field} of type {expected}")]
    InjectionTypeMismatch {
        component: String,
        field: String,
        target: String,
        expected: String,
    },

    #[error("Invalid route pattern {pattern}")]
    InvalidRoutePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    // Dispatch-caught
    #[error("Cannot convert parameter {parameter}={value:?} to {target}: {reason}")]
    Conversion {
        parameter: String,
        target: String,
        value: String,
        reason: String,
    },

    #[error("Missing parameter at position {0}")]
    MissingParameter(usize),

    #[error("Argument binding error: {0}")]
    Binding(String),

    #[error("Dependency {0} was never injected")]
    Unwired(&'static str),

    #[error("Handler failed: {0}")]
    Handler(String),

    #[error("Handler panicked: {0}")]
    Panic(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error must abort bootstrap
    pub fn is_bootstrap_fatal(&self) -> bool {
        matches!(
            self,
            Error::UnresolvedNamespace(_)
                | Error::Instantiation { .. }
                | Error::DuplicateContractBinding { .. }
                | Error::DuplicateBeanName { .. }
                | Error::MissingDependency { .. }
                | Error::InjectionTypeMismatch { .. }
                | Error::InvalidRoutePattern { .. }
                | Error::Config(_)
        )
    }

    /// Render the error and its source chain as a diagnostic dump
    pub fn diagnostic(&self) -> String {
        let mut dump = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            dump.push_str("\ncaused by: ");
            dump.push_str(&cause.to_string());
            source = std::error::Error::source(cause);
        }
        dump
    }
}
