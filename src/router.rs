//! Request router: a radix tree per HTTP method, plus one fallback.
//!
//! The fallback is the whole point for a dev server — anything that is not
//! a registered API route falls through to the static-file layer, including
//! unsupported methods on API paths. Build the router once at startup and
//! hand it to [`Server::serve`](crate::Server::serve).

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use matchit::Router as PathTree;

use crate::handler::{BoxedHandler, Handler};

pub struct Router {
    routes: HashMap<Method, PathTree<BoxedHandler>>,
    fallback: Option<BoxedHandler>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), fallback: None }
    }

    /// Registers a handler for a method + path pair. Chains.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route pattern — registration happens
    /// once at startup, so this is a programming error, not a runtime one.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Registers the handler that receives every request no route matched.
    pub fn fallback(mut self, handler: impl Handler) -> Self {
        self.fallback = Some(handler.into_boxed_handler());
        self
    }

    /// Resolves a request to a handler. A miss returns the fallback with no
    /// captured params; `None` only when no fallback is registered.
    pub(crate) fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        if let Some(tree) = self.routes.get(method) {
            if let Ok(matched) = tree.at(path) {
                let params = matched
                    .params
                    .iter()
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect();
                return Some((Arc::clone(matched.value), params));
            }
        }
        self.fallback
            .as_ref()
            .map(|handler| (Arc::clone(handler), HashMap::new()))
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
