// Route table construction and lookup

use crate::convert::TypeTag;
use crate::handler::{BoundHandler, HandlerFn, Param};
use crate::{Container, Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// How route keys are matched against request paths
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteMode {
    /// Literal keys in a lookup table; a later identical key replaces the earlier one
    #[default]
    Exact,
    /// Keys compiled as regular expressions; the first full match wins
    Pattern,
}

impl std::str::FromStr for RouteMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(RouteMode::Exact),
            "pattern" | "regex" => Ok(RouteMode::Pattern),
            other => Err(format!("unknown route mode: {}", other)),
        }
    }
}

/// Where a handler argument comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Named { name: String, tag: TypeTag },
    Request,
    Response,
    Unbound,
}

/// A resolved handler with its argument layout
pub struct Route {
    key: String,
    controller: String,
    method: &'static str,
    slots: Vec<Slot>,
    param_index: HashMap<String, usize>,
    invoke: HandlerFn,
}

impl Route {
    /// Build a route for `handler` under the full path `key`
    pub fn new(key: String, controller: impl Into<String>, handler: BoundHandler) -> Self {
        let mut slots = Vec::with_capacity(handler.params.len());
        let mut param_index = HashMap::new();

        for (position, param) in handler.params.iter().enumerate() {
            let slot = match *param {
                Param::Request => Slot::Request,
                Param::Response => Slot::Response,
                Param::Named { name, tag } if !name.trim().is_empty() => {
                    // Last declaration of a repeated name wins
                    param_index.insert(name.to_string(), position);
                    Slot::Named {
                        name: name.to_string(),
                        tag,
                    }
                }
                Param::Named { .. } | Param::Unbound(_) => Slot::Unbound,
            };
            slots.push(slot);
        }

        Self {
            key,
            controller: controller.into(),
            method: handler.name,
            slots,
            param_index,
            invoke: handler.invoke,
        }
    }

    /// Full path or pattern source
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Bean name of the owning controller
    pub fn controller(&self) -> &str {
        &self.controller
    }

    pub fn method(&self) -> &'static str {
        self.method
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Position of the slot bound to request parameter `name`
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.param_index.get(name).copied()
    }

    pub fn handler(&self) -> &HandlerFn {
        &self.invoke
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("key", &self.key)
            .field("controller", &self.controller)
            .field("method", &self.method)
            .field("slots", &self.slots)
            .finish()
    }
}

/// The routing table, immutable once built
#[derive(Debug)]
pub enum RouteTable {
    Exact(HashMap<String, Arc<Route>>),
    Pattern(Vec<(Regex, Arc<Route>)>),
}

impl RouteTable {
    pub fn new(mode: RouteMode) -> Self {
        match mode {
            RouteMode::Exact => RouteTable::Exact(HashMap::new()),
            RouteMode::Pattern => RouteTable::Pattern(Vec::new()),
        }
    }

    /// Build routes for every controller in the container
    pub fn build(container: &Container, mode: RouteMode) -> Result<Self> {
        let mut table = Self::new(mode);

        for entry in container.controllers() {
            let Some(mapping) = entry.mapping() else {
                continue;
            };
            for handler in mapping.handlers {
                let key = join_path(mapping.prefix, handler.path);
                table.insert(Route::new(key, entry.name(), handler))?;
            }
        }

        info!(mode = ?mode, routes = table.len(), "Route table built");
        Ok(table)
    }

    pub fn mode(&self) -> RouteMode {
        match self {
            RouteTable::Exact(_) => RouteMode::Exact,
            RouteTable::Pattern(_) => RouteMode::Pattern,
        }
    }

    /// Add a route
    ///
    /// Exact keys overwrite silently; patterns append in order.
    pub fn insert(&mut self, route: Route) -> Result<()> {
        debug!(key = %route.key, controller = %route.controller, method = route.method, "Mapped route");
        match self {
            RouteTable::Exact(routes) => {
                if let Some(previous) = routes.insert(route.key.clone(), Arc::new(route)) {
                    debug!(
                        key = %previous.key,
                        replaced = previous.method,
                        "Exact route overwritten by later registration"
                    );
                }
            }
            RouteTable::Pattern(routes) => {
                let pattern = Regex::new(&format!("^(?:{})$", route.key)).map_err(|source| {
                    Error::InvalidRoutePattern {
                        pattern: route.key.clone(),
                        source,
                    }
                })?;
                routes.push((pattern, Arc::new(route)));
            }
        }
        Ok(())
    }

    /// Find the route for a normalized path
    pub fn resolve(&self, path: &str) -> Option<&Arc<Route>> {
        match self {
            RouteTable::Exact(routes) => routes.get(path),
            RouteTable::Pattern(routes) => routes
                .iter()
                .find(|(pattern, _)| pattern.is_match(path))
                .map(|(_, route)| route),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RouteTable::Exact(routes) => routes.len(),
            RouteTable::Pattern(routes) => routes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn routes(&self) -> Vec<&Arc<Route>> {
        match self {
            RouteTable::Exact(routes) => routes.values().collect(),
            RouteTable::Pattern(routes) => routes.iter().map(|(_, route)| route).collect(),
        }
    }
}

/// Join a controller prefix and a method path into a route key
pub fn join_path(prefix: &str, path: &str) -> String {
    collapse_separators(&format!("/{}/{}", prefix, path))
}

/// Replace every run of `/` with a single `/`
pub fn collapse_separators(path: &str) -> String {
    let mut collapsed = String::with_capacity(path.len());
    let mut previous_slash = false;
    for c in path.chars() {
        if c == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        collapsed.push(c);
    }
    collapsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;

    fn handler(name: &'static str, path: &'static str, params: Vec<Param>) -> BoundHandler {
        BoundHandler {
            name,
            path,
            params,
            invoke: handler_fn(move |_args| Ok(Some(name.to_string()))),
        }
    }

    #[test]
    fn test_join_path_collapses_separators() {
        assert_eq!(join_path("/demo", "/query"), "/demo/query");
        assert_eq!(join_path("//demo/", "///query"), "/demo/query");
        assert_eq!(join_path("", "add"), "/add");
        assert_eq!(join_path("", ""), "/");
    }

    #[test]
    fn test_route_slots() {
        let route = Route::new(
            "/add".to_string(),
            "demoAction",
            handler(
                "add",
                "/add",
                vec![
                    Param::response(),
                    Param::named("a", TypeTag::Integer),
                    Param::named("", TypeTag::Integer),
                    Param::unbound(TypeTag::Text),
                    Param::request(),
                ],
            ),
        );

        assert_eq!(
            route.slots(),
            &[
                Slot::Response,
                Slot::Named {
                    name: "a".to_string(),
                    tag: TypeTag::Integer
                },
                Slot::Unbound,
                Slot::Unbound,
                Slot::Request,
            ]
        );
        assert_eq!(route.position_of("a"), Some(1));
        assert_eq!(route.position_of(""), None);
    }

    #[test]
    fn test_exact_last_registration_wins() {
        let mut table = RouteTable::new(RouteMode::Exact);
        table
            .insert(Route::new("/x".into(), "first", handler("one", "/x", vec![])))
            .unwrap();
        table
            .insert(Route::new("/x".into(), "second", handler("two", "/x", vec![])))
            .unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.resolve("/x").unwrap().method(), "two");
        assert!(table.resolve("/x/").is_none());
    }

    #[test]
    fn test_pattern_first_match_wins() {
        let mut table = RouteTable::new(RouteMode::Pattern);
        table
            .insert(Route::new("/item/.*".into(), "c", handler("any", "/item/.*", vec![])))
            .unwrap();
        table
            .insert(Route::new("/item/[0-9]+".into(), "c", handler("numeric", "/item/[0-9]+", vec![])))
            .unwrap();

        assert_eq!(table.resolve("/item/42").unwrap().method(), "any");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_pattern_requires_full_match() {
        let mut table = RouteTable::new(RouteMode::Pattern);
        table
            .insert(Route::new("/demo/q.*".into(), "c", handler("q", "/demo/q.*", vec![])))
            .unwrap();

        assert!(table.resolve("/demo/query").is_some());
        assert!(table.resolve("/prefix/demo/query").is_none());
        assert!(table.resolve("/demo").is_none());
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let mut table = RouteTable::new(RouteMode::Pattern);
        let err = table
            .insert(Route::new("/broken/(".into(), "c", handler("b", "/broken/(", vec![])))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRoutePattern { .. }));
    }

    #[test]
    fn test_route_mode_from_str() {
        assert_eq!("Pattern".parse::<RouteMode>(), Ok(RouteMode::Pattern));
        assert_eq!("exact".parse::<RouteMode>(), Ok(RouteMode::Exact));
        assert!("fuzzy".parse::<RouteMode>().is_err());
    }
}
