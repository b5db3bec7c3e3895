// Per-request dispatch: normalize, resolve, bind, convert, invoke, write

use crate::container::panic_message;
use crate::convert::ConversionTable;
use crate::handler::{Argument, Arguments};
use crate::http::{ResponseSink, WebRequest};
use crate::routing::{Route, RouteTable, Slot, collapse_separators};
use crate::{Error, Result};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tracing::{debug, debug_span, error};

/// Body written when no route matches
pub const NOT_FOUND_BODY: &str = "404 Not Found!!!";

/// Prefix of the body written when dispatch fails
pub const FAILURE_PREFIX: &str = "500 Exception, Detail: ";

/// Result of dispatching one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The handler ran; the body holds its output
    Handled,
    /// No route matched; the body holds [`NOT_FOUND_BODY`]
    NotFound,
    /// Binding, conversion or the handler failed; carries the diagnostic
    Failed(String),
}

impl DispatchOutcome {
    pub fn status(&self) -> u16 {
        match self {
            DispatchOutcome::Handled => 200,
            DispatchOutcome::NotFound => 404,
            DispatchOutcome::Failed(_) => 500,
        }
    }
}

/// Routes requests to handlers
///
/// Holds only read-only state, so one dispatcher can serve any number of
/// threads at once.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    routes: Arc<RouteTable>,
    converters: Arc<ConversionTable>,
}

impl Dispatcher {
    pub fn new(routes: Arc<RouteTable>, converters: ConversionTable) -> Self {
        Self {
            routes,
            converters: Arc::new(converters),
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn converters(&self) -> &ConversionTable {
        &self.converters
    }

    /// Dispatch one request, writing exactly one outcome to `response`
    ///
    /// Never panics and never returns an error: failures become a 500 body.
    pub fn dispatch(&self, request: &WebRequest, response: &mut dyn ResponseSink) -> DispatchOutcome {
        let path = normalize_path(&request.path, &request.context_path);
        let span = debug_span!("dispatch", method = %request.method, path = %path);
        let _enter = span.enter();

        let Some(route) = self.routes.resolve(&path) else {
            debug!("No route matched");
            response.write(NOT_FOUND_BODY);
            return DispatchOutcome::NotFound;
        };
        debug!(controller = route.controller(), handler = route.method(), "Route resolved");

        let result = catch_unwind(AssertUnwindSafe(|| self.invoke(route, request, &mut *response)))
            .unwrap_or_else(|panic| Err(Error::Panic(panic_message(panic.as_ref()))));

        match result {
            Ok(()) => DispatchOutcome::Handled,
            Err(err) => {
                let detail = err.diagnostic();
                error!(
                    controller = route.controller(),
                    handler = route.method(),
                    error = %detail,
                    "Dispatch failed"
                );
                response.write(&format!("{}{}", FAILURE_PREFIX, detail));
                DispatchOutcome::Failed(detail)
            }
        }
    }

    fn invoke(&self, route: &Route, request: &WebRequest, response: &mut dyn ResponseSink) -> Result<()> {
        // Handler output is held back until the handler succeeds
        let mut buffer = BufferedSink::default();
        let returned = {
            let mut args = Arguments::new(route.slots().len(), request, &mut buffer);
            self.bind(route, request, &mut args)?;
            (route.handler())(&mut args)?
        };

        let mut body = buffer.0;
        if let Some(value) = returned {
            body.push_str(&value);
        }
        if !body.is_empty() {
            response.write(&body);
        }
        Ok(())
    }

    fn bind(&self, route: &Route, request: &WebRequest, args: &mut Arguments<'_>) -> Result<()> {
        for (position, slot) in route.slots().iter().enumerate() {
            match slot {
                Slot::Request => args.set(position, Argument::Request),
                Slot::Response => args.set(position, Argument::Response),
                Slot::Named { name, tag } => {
                    // Repeated names bind only the last declared position
                    if route.position_of(name) != Some(position) {
                        continue;
                    }
                    let Some(values) = request.param_values(name) else {
                        continue;
                    };
                    let value = self.converters.convert(*tag, values).map_err(|reason| {
                        Error::Conversion {
                            parameter: name.clone(),
                            target: tag.to_string(),
                            value: values.join(","),
                            reason,
                        }
                    })?;
                    args.set(position, Argument::Value(value));
                }
                Slot::Unbound => {}
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct BufferedSink(String);

impl ResponseSink for BufferedSink {
    fn write(&mut self, body: &str) {
        self.0.push_str(body);
    }
}

/// Strip the context prefix and collapse repeated separators
pub fn normalize_path(path: &str, context_path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let context = context_path.trim_end_matches('/');

    let relative = match path.strip_prefix(context) {
        Some(rest) if !context.is_empty() && (rest.is_empty() || rest.starts_with('/')) => rest,
        _ => path,
    };

    let collapsed = collapse_separators(relative);
    if collapsed.is_empty() {
        "/".to_string()
    } else {
        collapsed
    }
}
