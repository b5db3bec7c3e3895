// Bean registry
//
// Built once during bootstrap, then shared read-only behind an Arc.

use crate::handler::{ControllerMapping, MappingFn, mapping_for};
use crate::scanner::ComponentDescriptor;
use crate::{Component, Controller, Error, Result, Role};
use std::any::Any;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tracing::{debug, trace};

/// A type-erased `Arc<T>` pointing at a bean instance
type Handle = Box<dyn Any + Send + Sync>;

/// A freshly constructed component, produced by a descriptor's factory
pub struct BeanInstance {
    type_name: &'static str,
    component: Arc<dyn Component>,
    views: Vec<(&'static str, Handle)>,
    mapping: Option<MappingFn>,
}

impl BeanInstance {
    pub fn new<T: Component>(instance: T) -> Self {
        Self::from_arc(Arc::new(instance))
    }

    pub fn from_arc<T: Component>(instance: Arc<T>) -> Self {
        let type_name = std::any::type_name::<T>();
        let handle: Handle = Box::new(instance.clone());
        Self {
            type_name,
            component: instance,
            views: vec![(type_name, handle)],
            mapping: None,
        }
    }

    /// Wrap a controller, exposing its handler mapping
    pub fn controller<C: Controller>(instance: C) -> Self {
        let mut bean = Self::new(instance);
        bean.mapping = Some(mapping_for::<C>);
        bean
    }

    /// Expose the same instance as contract `C`
    pub fn with_contract<C: ?Sized + Send + Sync + 'static>(mut self, view: Arc<C>) -> Self {
        let handle: Handle = Box::new(view);
        self.views.push((std::any::type_name::<C>(), handle));
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Names of the contracts this instance is exposed as
    pub fn contracts(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.views.iter().skip(1).map(|(name, _)| *name)
    }
}

/// A live component held by the container
pub struct BeanEntry {
    name: String,
    type_name: &'static str,
    role: Role,
    component: Arc<dyn Component>,
    views: Vec<(&'static str, Handle)>,
    mapping: Option<MappingFn>,
}

impl BeanEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn component(&self) -> &Arc<dyn Component> {
        &self.component
    }

    /// View the instance as `T`, either its concrete type or a contract
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.views
            .iter()
            .find_map(|(_, handle)| handle.downcast_ref::<Arc<T>>())
            .cloned()
    }

    /// Names of the contracts this bean implements
    pub fn contracts(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.views.iter().skip(1).map(|(name, _)| *name)
    }

    /// The controller's prefix and bound handlers, `None` for services
    pub fn mapping(&self) -> Option<ControllerMapping> {
        self.mapping.and_then(|mapping| mapping(self))
    }

    /// Address of the shared instance, identical across all aliases
    pub fn instance_addr(&self) -> *const () {
        Arc::as_ptr(&self.component) as *const ()
    }
}

impl std::fmt::Debug for BeanEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeanEntry")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("role", &self.role)
            .finish()
    }
}

/// The bean registry
///
/// Every primary bean appears once in `beans`. `names` maps both primary
/// names and contract aliases to the shared entry.
#[derive(Default)]
pub struct Container {
    beans: Vec<Arc<BeanEntry>>,
    names: HashMap<String, Arc<BeanEntry>>,
}

impl Container {
    pub fn new() -> Self {
        debug!("Creating new bean container");
        Self::default()
    }

    /// Instantiate and register every descriptor, in order
    pub fn from_descriptors<'a, I>(descriptors: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a ComponentDescriptor>,
    {
        let mut container = Self::new();
        for descriptor in descriptors {
            container.register_descriptor(descriptor)?;
        }
        Ok(container)
    }

    /// Instantiate and register one descriptor
    ///
    /// Unmarked descriptors are skipped and yield `None`.
    pub fn register_descriptor(
        &mut self,
        descriptor: &ComponentDescriptor,
    ) -> Result<Option<Arc<BeanEntry>>> {
        let Some(role) = descriptor.role else {
            trace!(component = %descriptor.qualified_name(), "Skipping unmarked component");
            return Ok(None);
        };

        let name = match role {
            Role::Controller => lower_first(descriptor.simple_name),
            Role::Service => match descriptor.name.trim() {
                "" => lower_first(descriptor.simple_name),
                explicit => explicit.to_string(),
            },
        };

        let instance = instantiate(descriptor)?;
        self.register_instance(name, role, instance).map(Some)
    }

    /// Register an already constructed instance
    ///
    /// Services are additionally reachable under each of their contracts.
    pub fn register_instance(
        &mut self,
        name: String,
        role: Role,
        instance: BeanInstance,
    ) -> Result<Arc<BeanEntry>> {
        if self.names.contains_key(&name) {
            return Err(Error::DuplicateBeanName { name });
        }

        let aliases: Vec<&'static str> = match role {
            Role::Service => instance.contracts().collect(),
            Role::Controller => Vec::new(),
        };
        for contract in &aliases {
            if let Some(existing) = self.names.get(*contract) {
                return Err(Error::DuplicateContractBinding {
                    contract: contract.to_string(),
                    existing: existing.name.clone(),
                    incoming: name,
                });
            }
        }

        let entry = Arc::new(BeanEntry {
            name: name.clone(),
            type_name: instance.type_name,
            role,
            component: instance.component,
            views: instance.views,
            mapping: instance.mapping,
        });

        self.names.insert(name.clone(), entry.clone());
        for contract in aliases {
            self.names.insert(contract.to_string(), entry.clone());
            debug!(bean = %name, contract, "Bound contract alias");
        }
        self.beans.push(entry.clone());

        debug!(bean = %name, role = %role, type_name = entry.type_name, "Bean registered");
        Ok(entry)
    }

    /// Look up a bean by primary name or contract alias
    pub fn get(&self, name: &str) -> Option<&Arc<BeanEntry>> {
        self.names.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Resolve a bean by name and view it as `T`
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Option<Arc<T>> {
        self.get(name).and_then(|entry| entry.resolve::<T>())
    }

    /// Resolve the bean bound to contract `T`
    pub fn resolve_contract<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.resolve::<T>(std::any::type_name::<T>())
    }

    /// Primary beans in registration order
    pub fn beans(&self) -> impl Iterator<Item = &Arc<BeanEntry>> {
        self.beans.iter()
    }

    pub fn controllers(&self) -> impl Iterator<Item = &Arc<BeanEntry>> {
        self.beans
            .iter()
            .filter(|entry| entry.role == Role::Controller)
    }

    /// Number of primary beans
    pub fn len(&self) -> usize {
        self.beans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beans.is_empty()
    }

    /// Number of contract alias names
    pub fn alias_count(&self) -> usize {
        self.names.len() - self.beans.len()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("beans", &self.beans)
            .field("aliases", &self.alias_count())
            .finish()
    }
}

fn instantiate(descriptor: &ComponentDescriptor) -> Result<BeanInstance> {
    let component = descriptor.qualified_name();
    trace!(component = %component, "Instantiating component");

    match catch_unwind(AssertUnwindSafe(descriptor.factory)) {
        Ok(Ok(instance)) => Ok(instance),
        Ok(Err(err)) => Err(Error::Instantiation {
            component,
            reason: err.to_string(),
        }),
        Err(panic) => Err(Error::Instantiation {
            component,
            reason: panic_message(panic.as_ref()),
        }),
    }
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "constructor panicked".to_string()
    }
}

/// Default bean name: the simple type name with its first letter lowercased
pub fn lower_first(simple_name: &str) -> String {
    let mut chars = simple_name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
