// Core library for the Sprig container and dispatcher
// Component scanning, bean registry, injection, routing and request dispatch

pub mod application;
pub mod autowired;
pub mod config;
pub mod container;
pub mod convert;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod http;
pub mod injector;
pub mod logging;
pub mod registration;
pub mod routing;
pub mod scanner;
pub mod traits;

// Re-export commonly used types
pub use application::*;
pub use autowired::*;
pub use config::*;
pub use container::*;
pub use convert::*;
pub use dispatcher::*;
pub use error::*;
pub use handler::*;
pub use http::*;
pub use injector::*;
pub use routing::*;
pub use scanner::*;
pub use traits::*;

// Used by the registration macros
#[doc(hidden)]
pub use inventory;
