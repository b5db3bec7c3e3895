//! Handler methods and their arguments.
//!
//! A controller lists its routable methods through
//! [`Controller::handlers`](crate::Controller::handlers). Each
//! [`HandlerMethod`] carries a path fragment, the ordered parameter
//! declarations and a plain function taking the controller and the assembled
//! [`Arguments`].
//!
//! ```
//! use sprig_core::{Arguments, Component, Controller, HandlerMethod, HandlerResult, Param, TypeTag};
//!
//! #[derive(Default)]
//! struct Calc;
//!
//! impl Component for Calc {}
//!
//! impl Controller for Calc {
//!     fn request_mapping() -> &'static str {
//!         "/calc"
//!     }
//!
//!     fn handlers() -> Vec<HandlerMethod<Self>> {
//!         vec![HandlerMethod::new("double", "/double", Calc::double)
//!             .param(Param::named("n", TypeTag::Integer))]
//!     }
//! }
//!
//! impl Calc {
//!     fn double(&self, args: &mut Arguments<'_>) -> HandlerResult {
//!         let n: i64 = args.require(0)?;
//!         Ok(Some((n * 2).to_string()))
//!     }
//! }
//! ```

use crate::container::BeanEntry;
use crate::convert::{TypeTag, Value};
use crate::http::{ResponseSink, WebRequest};
use crate::{Controller, Error, Result};
use std::sync::Arc;

/// `Ok(None)` leaves the response to whatever the handler wrote itself
pub type HandlerResult = Result<Option<String>>;

/// A handler bound to its controller instance
pub type HandlerFn = Arc<dyn Fn(&mut Arguments<'_>) -> HandlerResult + Send + Sync>;

pub(crate) fn handler_fn<F>(f: F) -> HandlerFn
where
    F: Fn(&mut Arguments<'_>) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Declaration of one handler parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    /// Receives the ambient request
    Request,
    /// Receives the ambient response sink
    Response,
    /// Receives the request parameter with this name, converted to `tag`
    Named { name: &'static str, tag: TypeTag },
    /// Never populated
    Unbound(TypeTag),
}

impl Param {
    pub fn request() -> Self {
        Param::Request
    }

    pub fn response() -> Self {
        Param::Response
    }

    pub fn named(name: &'static str, tag: TypeTag) -> Self {
        Param::Named { name, tag }
    }

    pub fn unbound(tag: TypeTag) -> Self {
        Param::Unbound(tag)
    }
}

/// A routable method of controller `C`
pub struct HandlerMethod<C> {
    pub name: &'static str,
    pub path: &'static str,
    pub params: Vec<Param>,
    invoke: fn(&C, &mut Arguments<'_>) -> HandlerResult,
}

impl<C: Controller> HandlerMethod<C> {
    pub fn new(
        name: &'static str,
        path: &'static str,
        invoke: fn(&C, &mut Arguments<'_>) -> HandlerResult,
    ) -> Self {
        Self {
            name,
            path,
            params: Vec::new(),
            invoke,
        }
    }

    /// Declare the next positional parameter
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    fn bind(self, controller: Arc<C>) -> BoundHandler {
        let invoke = self.invoke;
        BoundHandler {
            name: self.name,
            path: self.path,
            params: self.params,
            invoke: handler_fn(move |args| invoke(&controller, args)),
        }
    }
}

/// A handler method closed over its controller instance
#[derive(Clone)]
pub struct BoundHandler {
    pub name: &'static str,
    pub path: &'static str,
    pub params: Vec<Param>,
    pub invoke: HandlerFn,
}

impl std::fmt::Debug for BoundHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundHandler")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("params", &self.params)
            .finish()
    }
}

/// The prefix and bound handlers of one controller instance
#[derive(Debug)]
pub struct ControllerMapping {
    pub prefix: &'static str,
    pub handlers: Vec<BoundHandler>,
}

impl ControllerMapping {
    pub fn of<C: Controller>(controller: Arc<C>) -> Self {
        let handlers = C::handlers()
            .into_iter()
            .map(|handler| handler.bind(controller.clone()))
            .collect();
        Self {
            prefix: C::request_mapping(),
            handlers,
        }
    }
}

/// Mapping source stored on controller bean entries
pub type MappingFn = fn(&BeanEntry) -> Option<ControllerMapping>;

pub(crate) fn mapping_for<C: Controller>(entry: &BeanEntry) -> Option<ControllerMapping> {
    entry.resolve::<C>().map(ControllerMapping::of)
}

/// One assembled argument
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Absent,
    Value(Value),
    Request,
    Response,
}

/// Types a converted [`Value`] can be read as
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(v) => i32::try_from(*v).ok(),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Decimal(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FromValue for Vec<String> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

/// Positional arguments handed to a handler
pub struct Arguments<'a> {
    slots: Vec<Argument>,
    request: &'a WebRequest,
    response: &'a mut dyn ResponseSink,
}

impl<'a> Arguments<'a> {
    /// `len` absent arguments
    pub fn new(len: usize, request: &'a WebRequest, response: &'a mut dyn ResponseSink) -> Self {
        Self {
            slots: vec![Argument::Absent; len],
            request,
            response,
        }
    }

    pub(crate) fn set(&mut self, index: usize, argument: Argument) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = argument;
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The value at `index`, or `None` if nothing supplied it
    pub fn get<T: FromValue>(&self, index: usize) -> Result<Option<T>> {
        match self.slot(index)? {
            Argument::Absent => Ok(None),
            Argument::Value(value) => T::from_value(value).map(Some).ok_or_else(|| {
                Error::Binding(format!(
                    "argument {} is {:?}, expected {}",
                    index,
                    value,
                    std::any::type_name::<T>()
                ))
            }),
            other => Err(Error::Binding(format!(
                "argument {} is {:?}, expected a value",
                index, other
            ))),
        }
    }

    /// The value at `index`, failing if nothing supplied it
    pub fn require<T: FromValue>(&self, index: usize) -> Result<T> {
        self.get(index)?.ok_or(Error::MissingParameter(index))
    }

    pub fn request(&self, index: usize) -> Result<&'a WebRequest> {
        match self.slot(index)? {
            Argument::Request => Ok(self.request),
            other => Err(Error::Binding(format!(
                "argument {} is {:?}, expected the request",
                index, other
            ))),
        }
    }

    pub fn response(&mut self, index: usize) -> Result<&mut dyn ResponseSink> {
        match self.slot(index)? {
            Argument::Response => Ok(&mut *self.response),
            other => Err(Error::Binding(format!(
                "argument {} is {:?}, expected the response",
                index, other
            ))),
        }
    }

    fn slot(&self, index: usize) -> Result<&Argument> {
        self.slots.get(index).ok_or_else(|| {
            Error::Binding(format!(
                "argument {} out of range, handler takes {}",
                index,
                self.slots.len()
            ))
        })
    }
}
