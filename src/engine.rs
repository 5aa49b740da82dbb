//! The engine: route table, route groups, and request dispatch.

use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use tracing::debug;

use crate::context::Context;
use crate::group::{GroupId, RouterGroup};
use crate::handler::HandlerFunc;
use crate::method::Method;
use crate::middleware;
use crate::render::Render;
use crate::request::Request;
use crate::response::ResponseWriter;
use crate::router::Router;

pub(crate) struct GroupData {
    pub(crate) prefix: String,
    pub(crate) middlewares: Vec<HandlerFunc>,
    pub(crate) parent: Option<GroupId>,
}

/// The application: every route, every group, and the dispatch entry point.
///
/// The engine is also the root group (prefix `""`), so routes and
/// middleware can be registered on it directly. All groups live in one
/// list owned by the engine, in creation order; a [`RouterGroup`] is only a
/// borrowed handle into that list.
///
/// Registration needs `&mut Engine`. Once the engine is handed to
/// [`Server::serve`](crate::Server::serve) it is shared read-only, so the
/// route table cannot change while requests are in flight.
///
/// ```rust
/// use http::StatusCode;
/// use sprig::{Context, Engine};
///
/// fn hello(c: &mut Context) {
///     let name = c.param("name").unwrap_or("world").to_owned();
///     c.string(StatusCode::OK, format!("hello {name}"));
/// }
///
/// let mut app = Engine::with_defaults();
/// app.get("/", |c: &mut Context| c.string(StatusCode::OK, "index"));
///
/// let mut v1 = app.group("/v1");
/// v1.get("/hello/:name", hello);
/// ```
pub struct Engine {
    router: Router,
    groups: Vec<GroupData>,
    renderer: Option<Arc<dyn Render>>,
}

impl Engine {
    /// An engine with no middleware.
    pub fn new() -> Self {
        let root = GroupData { prefix: String::new(), middlewares: Vec::new(), parent: None };
        Self { router: Router::new(), groups: vec![root], renderer: None }
    }

    /// An engine with [`middleware::logger`] and [`middleware::recovery`]
    /// installed on the root group, in that order.
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine
            .use_middleware(middleware::logger())
            .use_middleware(middleware::recovery());
        engine
    }

    // ── Groups ───────────────────────────────────────────────────────────────

    /// Creates a child of the root group.
    pub fn group(&mut self, prefix: &str) -> RouterGroup<'_> {
        let id = self.derive_group(GroupId::ROOT, prefix);
        RouterGroup::new(self, id)
    }

    /// Reopens a group created earlier.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this engine.
    pub fn group_handle(&mut self, id: GroupId) -> RouterGroup<'_> {
        assert!(id.0 < self.groups.len(), "unknown group {id:?}");
        RouterGroup::new(self, id)
    }

    fn root(&mut self) -> RouterGroup<'_> {
        RouterGroup::new(self, GroupId::ROOT)
    }

    pub(crate) fn group_data(&self, id: GroupId) -> &GroupData {
        &self.groups[id.0]
    }

    pub(crate) fn derive_group(&mut self, parent: GroupId, prefix: &str) -> GroupId {
        let prefix = format!("{}{prefix}", self.groups[parent.0].prefix);
        let id = GroupId(self.groups.len());
        self.groups.push(GroupData { prefix, middlewares: Vec::new(), parent: Some(parent) });
        id
    }

    pub(crate) fn add_middleware(&mut self, id: GroupId, handler: HandlerFunc) {
        self.groups[id.0].middlewares.push(handler);
    }

    /// # Panics
    ///
    /// Panics if the combined pattern is rejected by the router.
    pub(crate) fn add_route(&mut self, id: GroupId, method: Method, comp: &str, handler: HandlerFunc) {
        let pattern = format!("{}{comp}", self.groups[id.0].prefix);
        self.router
            .add_route(method, &pattern, handler)
            .unwrap_or_else(|e| panic!("invalid route `{pattern}`: {e}"));
    }

    // ── Root-group shortcuts ─────────────────────────────────────────────────

    pub fn use_middleware(&mut self, handler: impl crate::Handler) -> &mut Self {
        self.root().use_middleware(handler);
        self
    }

    pub fn route(&mut self, method: Method, pattern: &str, handler: impl crate::Handler) -> &mut Self {
        self.root().route(method, pattern, handler);
        self
    }

    pub fn get(&mut self, pattern: &str, handler: impl crate::Handler) -> &mut Self {
        self.route(Method::Get, pattern, handler)
    }

    pub fn post(&mut self, pattern: &str, handler: impl crate::Handler) -> &mut Self {
        self.route(Method::Post, pattern, handler)
    }

    pub fn put(&mut self, pattern: &str, handler: impl crate::Handler) -> &mut Self {
        self.route(Method::Put, pattern, handler)
    }

    pub fn delete(&mut self, pattern: &str, handler: impl crate::Handler) -> &mut Self {
        self.route(Method::Delete, pattern, handler)
    }

    pub fn patch(&mut self, pattern: &str, handler: impl crate::Handler) -> &mut Self {
        self.route(Method::Patch, pattern, handler)
    }

    /// Serves files under `root` at `relative/*filepath`.
    pub fn static_files(&mut self, relative: &str, root: impl Into<std::path::PathBuf>) -> &mut Self {
        self.root().static_files(relative, root);
        self
    }

    /// Installs the template renderer used by [`Context::html`].
    pub fn set_renderer(&mut self, renderer: impl Render) -> &mut Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    // ── Dispatch ─────────────────────────────────────────────────────────────

    /// Middleware of every group whose prefix starts `path`, in group
    /// creation order. The root group's prefix is empty, so its middleware
    /// always comes first.
    pub(crate) fn middlewares_for(&self, path: &str) -> Vec<HandlerFunc> {
        self.groups
            .iter()
            .filter(|g| path.starts_with(&g.prefix))
            .flat_map(|g| g.middlewares.iter().cloned())
            .collect()
    }

    /// Runs one request through its middleware chain and route handler.
    ///
    /// Never fails: a miss, including a method no route uses, runs the
    /// matching middleware and then the built-in `404` handler. A path that
    /// does not percent-decode to UTF-8 gets a bare `400`.
    pub fn handle(&self, req: http::Request<Bytes>) -> http::Response<Full<Bytes>> {
        let request = match Request::new(req) {
            Ok(request) => request,
            Err(e) => {
                debug!("rejecting request path: {e}");
                let mut writer = ResponseWriter::new();
                writer.set_status(StatusCode::BAD_REQUEST);
                return writer.into_http();
            }
        };
        let handlers = self.middlewares_for(request.path());
        let mut c = Context::new(request, handlers, self.renderer.clone());
        self.router.handle(&mut c);
        c.writer.into_http()
    }
}

impl Default for Engine {
    fn default() -> Self { Self::new() }
}
