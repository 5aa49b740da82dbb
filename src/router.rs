//! Trie request router.
//!
//! One segment trie per HTTP method, plus a flat handler map keyed by
//! `"{METHOD}-{pattern}"`. The trie answers "which pattern matches this
//! path"; the map answers "which handler serves that pattern". Lookup is
//! O(path depth) regardless of how many routes are registered.

use std::collections::HashMap;
use std::sync::Arc;

use http::StatusCode;
use tracing::{debug, warn};

use crate::context::Context;
use crate::error::RouteError;
use crate::handler::HandlerFunc;
use crate::method::Method;
use crate::trie::{split_path, Node};

/// Method roots and registered handlers.
///
/// Built during startup through [`Engine`](crate::Engine) registration
/// calls and read-only afterwards, so concurrent lookups need no locking.
#[derive(Default)]
pub(crate) struct Router {
    roots: HashMap<Method, Node>,
    handlers: HashMap<String, HandlerFunc>,
}

fn route_key(method: Method, pattern: &str) -> String {
    format!("{}-{pattern}", method.as_str())
}

impl Router {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `method` + `pattern`.
    ///
    /// Patterns are keyed by their segments, so `/x` and `/x/` name the same
    /// route. Registering the same pair twice keeps the trie unchanged and
    /// replaces the handler: the last registration wins.
    pub(crate) fn add_route(
        &mut self,
        method: Method,
        pattern: &str,
        handler: HandlerFunc,
    ) -> Result<(), RouteError> {
        if !pattern.starts_with('/') {
            return Err(RouteError::MissingLeadingSlash);
        }

        let parts = split_path(pattern);
        let normalized = format!("/{}", parts.join("/"));
        let pattern = normalized.as_str();
        self.roots.entry(method).or_default().insert(pattern, &parts)?;

        if self.handlers.insert(route_key(method, pattern), handler).is_some() {
            warn!(%method, pattern, "route registered twice, replacing handler");
        } else {
            debug!(%method, pattern, "route registered");
        }
        Ok(())
    }

    /// Resolves a concrete path to the node ending its pattern and the
    /// wildcard bindings collected on the way down.
    pub(crate) fn get_route(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(&Node, HashMap<String, String>)> {
        let root = self.roots.get(&method)?;
        let mut params = Vec::new();
        let node = root.search(&split_path(path), &mut params)?;
        Some((node, params.into_iter().collect()))
    }

    /// Looks up the handler for a concrete request, without touching a
    /// [`Context`].
    pub(crate) fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(HandlerFunc, HashMap<String, String>)> {
        let (node, params) = self.get_route(method, path)?;
        let handler = self.handlers.get(&route_key(method, node.pattern()?))?;
        Some((Arc::clone(handler), params))
    }

    /// Appends the matched handler (or the built-in 404 handler) to the
    /// context's chain and starts it.
    ///
    /// A method no route can be registered for, such as `PURGE`, is a plain
    /// miss.
    pub(crate) fn handle(&self, c: &mut Context) {
        let found = Method::try_from(c.method())
            .ok()
            .and_then(|method| self.lookup(method, c.path()));
        match found {
            Some((handler, params)) => {
                c.params = params;
                c.handlers.push(handler);
            }
            None => c.handlers.push(Arc::new(not_found)),
        }
        c.next();
    }
}

fn not_found(c: &mut Context) {
    let body = format!("404 NOT FOUND: {}", c.path());
    c.string(StatusCode::NOT_FOUND, body);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;

    fn noop() -> HandlerFunc {
        Arc::new(|_: &mut Context| {})
    }

    fn tagged(tag: &'static str) -> HandlerFunc {
        Arc::new(move |c: &mut Context| c.string(StatusCode::OK, tag))
    }

    fn router(patterns: &[&str]) -> Router {
        let mut r = Router::new();
        for p in patterns {
            r.add_route(Method::Get, p, noop()).unwrap();
        }
        r
    }

    fn run(r: &Router, method: Method, path: &str) -> Context {
        let req = http::Request::builder()
            .method(method.as_str())
            .uri(path)
            .body(bytes::Bytes::new())
            .unwrap();
        let mut c = Context::new(Request::new(req).unwrap(), Vec::new(), None);
        r.handle(&mut c);
        c
    }

    #[test]
    fn static_routes_match_exactly() {
        let r = router(&["/", "/hello", "/hello/world", "/assets/css"]);
        for path in ["/", "/hello", "/hello/world", "/assets/css"] {
            let (node, params) = r.get_route(Method::Get, path).unwrap();
            assert_eq!(node.pattern(), Some(path));
            assert!(params.is_empty());
        }
    }

    #[test]
    fn named_param_binds_one_segment() {
        let r = router(&["/p/:lang/doc"]);
        let (node, params) = r.get_route(Method::Get, "/p/go/doc").unwrap();
        assert_eq!(node.pattern(), Some("/p/:lang/doc"));
        assert_eq!(params["lang"], "go");
    }

    #[test]
    fn catch_all_binds_remainder() {
        let r = router(&["/static/*filepath"]);
        let (_, params) = r.get_route(Method::Get, "/static/css/a.css").unwrap();
        assert_eq!(params["filepath"], "css/a.css");
    }

    #[test]
    fn multiple_params() {
        let r = router(&["/users/:uid/posts/:pid"]);
        let (_, params) = r.get_route(Method::Get, "/users/7/posts/42").unwrap();
        assert_eq!(params["uid"], "7");
        assert_eq!(params["pid"], "42");
    }

    #[test]
    fn too_many_segments_is_not_found() {
        let r = router(&["/a/:b", "/a/b/c"]);
        assert!(r.get_route(Method::Get, "/a/b/c/d").is_none());
        assert!(r.get_route(Method::Get, "/x").is_none());
    }

    #[test]
    fn methods_are_independent() {
        let r = router(&["/hello"]);
        assert!(r.get_route(Method::Get, "/hello").is_some());
        assert!(r.get_route(Method::Post, "/hello").is_none());
    }

    #[test]
    fn last_registration_wins() {
        let mut r = Router::new();
        r.add_route(Method::Get, "/dup", tagged("first")).unwrap();
        r.add_route(Method::Get, "/dup", tagged("second")).unwrap();
        let c = run(&r, Method::Get, "/dup");
        assert_eq!(c.writer.body(), b"second");
    }

    #[test]
    fn trailing_slash_names_the_same_route() {
        let mut r = Router::new();
        r.add_route(Method::Get, "/x", tagged("one")).unwrap();
        r.add_route(Method::Get, "/x/", tagged("two")).unwrap();
        assert_eq!(r.handlers.len(), 1);
        assert_eq!(r.get_route(Method::Get, "/x/").unwrap().0.pattern(), Some("/x"));
        assert_eq!(run(&r, Method::Get, "/x").writer.body(), b"two");
        assert_eq!(run(&r, Method::Get, "/x/").writer.body(), b"two");
    }

    #[test]
    fn extension_method_is_a_miss() {
        let r = router(&["/hello"]);
        let req = http::Request::builder()
            .method("PURGE")
            .uri("/hello")
            .body(bytes::Bytes::new())
            .unwrap();
        let mut c = Context::new(Request::new(req).unwrap(), Vec::new(), None);
        r.handle(&mut c);
        assert_eq!(c.writer.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn pattern_needs_leading_slash() {
        let mut r = Router::new();
        assert_eq!(
            r.add_route(Method::Get, "hello", noop()),
            Err(RouteError::MissingLeadingSlash)
        );
    }

    #[test]
    fn miss_runs_not_found_handler() {
        let r = router(&["/hello"]);
        let c = run(&r, Method::Get, "/nope");
        assert_eq!(c.writer.status(), StatusCode::NOT_FOUND);
        assert_eq!(c.writer.body(), b"404 NOT FOUND: /nope");
    }

    #[test]
    fn hit_exposes_params_to_handler() {
        let mut r = Router::new();
        let h: HandlerFunc = Arc::new(|c: &mut Context| {
            let name = c.param("name").unwrap_or_default().to_owned();
            c.string(StatusCode::OK, format!("hello {name}"));
        });
        r.add_route(Method::Get, "/hello/:name", h).unwrap();
        let c = run(&r, Method::Get, "/hello/sprig");
        assert_eq!(c.writer.body(), b"hello sprig");
    }
}
