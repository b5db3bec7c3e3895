//! Component discovery.
//!
//! Components are registered at compile time with the
//! [`controller!`](crate::controller) and [`service!`](crate::service) macros,
//! which submit a [`ComponentDescriptor`] to a global `inventory` collection.
//! The [`Scanner`] enumerates the descriptors whose module path lies under a
//! configured namespace.

use crate::container::BeanInstance;
use crate::{Error, Result, Role};
use tracing::{debug, trace};

/// A discovered component
pub struct ComponentDescriptor {
    /// `module_path!()` of the registration site
    pub module_path: &'static str,
    /// Unqualified type name
    pub simple_name: &'static str,
    /// `None` for components carrying no recognized role
    pub role: Option<Role>,
    /// Explicit registry name; empty for the default
    pub name: &'static str,
    /// Constructs the instance and its contract views
    pub factory: fn() -> Result<BeanInstance>,
}

inventory::collect!(ComponentDescriptor);

impl ComponentDescriptor {
    /// `module::path::TypeName`
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.module_path, self.simple_name)
    }

    /// Whether the descriptor is registered under `namespace` (`::`-separated)
    pub fn is_under(&self, namespace: &str) -> bool {
        self.module_path == namespace
            || self
                .module_path
                .strip_prefix(namespace)
                .is_some_and(|rest| rest.starts_with("::"))
    }
}

impl std::fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("module_path", &self.module_path)
            .field("simple_name", &self.simple_name)
            .field("role", &self.role)
            .field("name", &self.name)
            .finish()
    }
}

/// Every descriptor linked into the binary
pub fn registered_components() -> Vec<&'static ComponentDescriptor> {
    inventory::iter::<ComponentDescriptor>.into_iter().collect()
}

/// Enumerates the components under a namespace
#[derive(Debug, Clone)]
pub struct Scanner {
    namespace: String,
}

impl Scanner {
    /// `namespace` may use `.` or `::` as separator
    pub fn new(namespace: &str) -> Self {
        let namespace = namespace
            .trim()
            .trim_matches('.')
            .replace("::", ".")
            .split('.')
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("::");
        Self { namespace }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Scan the inventory collection
    pub fn scan(&self) -> Result<Vec<&'static ComponentDescriptor>> {
        self.scan_from(inventory::iter::<ComponentDescriptor>)
    }

    /// Scan an explicit descriptor source
    ///
    /// The result is ordered by qualified name so repeated bootstraps see
    /// the same order.
    pub fn scan_from<'a, I>(&self, source: I) -> Result<Vec<&'a ComponentDescriptor>>
    where
        I: IntoIterator<Item = &'a ComponentDescriptor>,
    {
        if self.namespace.is_empty() {
            return Err(Error::UnresolvedNamespace(
                "no namespace configured".to_string(),
            ));
        }

        let mut found: Vec<&ComponentDescriptor> = source
            .into_iter()
            .filter(|descriptor| descriptor.is_under(&self.namespace))
            .collect();

        if found.is_empty() {
            return Err(Error::UnresolvedNamespace(self.namespace.clone()));
        }

        found.sort_by_key(|descriptor| descriptor.qualified_name());
        for descriptor in &found {
            trace!(component = %descriptor.qualified_name(), "Discovered component");
        }
        debug!(namespace = %self.namespace, count = found.len(), "Scan complete");

        Ok(found)
    }
}
