// Core traits for Sprig components

use crate::autowired::InjectionPoint;
use crate::handler::HandlerMethod;

/// Role marker carried by a registered component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Request handler group
    Controller,
    /// Business-logic provider, reachable by name and by contract
    Service,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Controller => "controller",
            Role::Service => "service",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for types managed by the container
pub trait Component: Send + Sync + 'static {
    /// Returns the slots the injector should fill
    fn injection_points(&self) -> Vec<InjectionPoint<'_>> {
        Vec::new()
    }
}

/// Trait for request handler groups
pub trait Controller: Component + Sized {
    /// Returns the path prefix shared by every handler
    fn request_mapping() -> &'static str {
        ""
    }

    /// Returns the routable methods of this controller
    fn handlers() -> Vec<HandlerMethod<Self>>;
}
