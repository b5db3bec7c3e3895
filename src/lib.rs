// Sprig - a small spring-style web container for Rust
//
// Components register themselves with `controller!`/`service!`, are scanned by
// namespace, wired together by contract or name, and serve requests whose
// parameters are bound by name.

// Re-export core functionality, including the registration macros
pub use sprig_core::*;

// Re-export optional crates
#[cfg(feature = "config")]
pub use sprig_config;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Application, ApplicationContext, Arguments, Autowired, Component, ContextConfig,
        Controller, Error, HandlerMethod, HandlerResult, HttpResponse, InjectionPoint,
        MissingDependencyPolicy, Param, Result, RouteMode, TypeTag, WebRequest, controller,
        service,
    };

    #[cfg(feature = "config")]
    pub use sprig_config::{ConfigManager, FileFormat};
}
