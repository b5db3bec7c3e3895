//! Injection slots.
//!
//! A component declares its dependencies as [`Autowired`] fields and lists
//! them from [`Component::injection_points`](crate::Component::injection_points).
//! The injector fills every slot once during bootstrap; afterwards the slots
//! are read-only.
//!
//! ```
//! use sprig_core::{Autowired, Component, InjectionPoint};
//!
//! pub trait Greeter: Send + Sync {
//!     fn greet(&self, name: &str) -> String;
//! }
//!
//! #[derive(Default)]
//! struct Front {
//!     greeter: Autowired<dyn Greeter>,
//!     backup: Autowired<dyn Greeter>,
//! }
//!
//! impl Component for Front {
//!     fn injection_points(&self) -> Vec<InjectionPoint<'_>> {
//!         vec![
//!             InjectionPoint::by_type("greeter", &self.greeter),
//!             InjectionPoint::by_name("backup", "backupGreeter", &self.backup),
//!         ]
//!     }
//! }
//! ```

use crate::container::BeanEntry;
use crate::{Error, Result};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// A write-once dependency slot
pub struct Autowired<T: ?Sized> {
    cell: OnceCell<Arc<T>>,
}

impl<T: ?Sized> Autowired<T> {
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// The injected dependency, if the injector found one
    pub fn get(&self) -> Option<&Arc<T>> {
        self.cell.get()
    }

    /// The injected dependency, or [`Error::Unwired`]
    pub fn require(&self) -> Result<&Arc<T>> {
        self.cell
            .get()
            .ok_or(Error::Unwired(std::any::type_name::<T>()))
    }

    pub fn is_wired(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: ?Sized> Default for Autowired<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> std::fmt::Debug for Autowired<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autowired")
            .field("target", &std::any::type_name::<T>())
            .field("wired", &self.is_wired())
            .finish()
    }
}

/// Type-erased view of an [`Autowired`] slot used by the injector
pub trait InjectSlot: Send + Sync {
    /// Full name of the declared contract or type
    fn target_type(&self) -> &'static str;

    fn is_filled(&self) -> bool;

    /// Assign the bean into the slot. Returns `false` if the bean cannot be
    /// viewed as the slot's type.
    fn fill(&self, bean: &BeanEntry) -> bool;
}

impl<T: ?Sized + Send + Sync + 'static> InjectSlot for Autowired<T> {
    fn target_type(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn is_filled(&self) -> bool {
        self.is_wired()
    }

    fn fill(&self, bean: &BeanEntry) -> bool {
        match bean.resolve::<T>() {
            Some(instance) => {
                // First write wins
                let _ = self.cell.set(instance);
                true
            }
            None => false,
        }
    }
}

/// A marked field of a component
pub struct InjectionPoint<'a> {
    pub field: &'static str,
    pub qualifier: Option<&'static str>,
    pub slot: &'a dyn InjectSlot,
}

impl<'a> InjectionPoint<'a> {
    /// Inject by the slot's declared type name
    pub fn by_type(field: &'static str, slot: &'a dyn InjectSlot) -> Self {
        Self {
            field,
            qualifier: None,
            slot,
        }
    }

    /// Inject the bean registered under an explicit name
    pub fn by_name(field: &'static str, name: &'static str, slot: &'a dyn InjectSlot) -> Self {
        Self {
            field,
            qualifier: Some(name),
            slot,
        }
    }

    /// The registry key this point resolves against
    pub fn target_name(&self) -> &'static str {
        match self.qualifier.map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => self.slot.target_type(),
        }
    }
}

impl std::fmt::Debug for InjectionPoint<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectionPoint")
            .field("field", &self.field)
            .field("target", &self.target_name())
            .finish()
    }
}
