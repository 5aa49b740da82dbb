//! Route groups.
//!
//! A group is a path prefix plus an ordered list of middleware. Routes
//! registered through a group get the group's prefix prepended; requests
//! whose path starts with the prefix run the group's middleware.
//!
//! ```rust
//! use http::StatusCode;
//! use sprig::{Context, Engine};
//!
//! fn require_token(c: &mut Context) {
//!     if c.header("authorization").is_none() {
//!         c.fail(StatusCode::UNAUTHORIZED, "missing token");
//!     }
//! }
//!
//! let mut app = Engine::new();
//! let mut api = app.group("/api");
//! api.use_middleware(require_token);
//!
//! let mut v1 = api.group("/v1");            // prefix "/api/v1"
//! v1.get("/ping", |c: &mut Context| c.string(StatusCode::OK, "pong"));
//! ```
//!
//! Child groups do not copy their parent's middleware. A request to
//! `/api/v1/ping` still runs `require_token` because `/api/v1/ping` starts
//! with `/api`, not because `v1` descends from `api`.

use std::path::PathBuf;

use crate::engine::Engine;
use crate::fs;
use crate::handler::Handler;
use crate::method::Method;

/// Stable identifier of a group inside its [`Engine`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct GroupId(pub(crate) usize);

impl GroupId {
    /// The engine's own group, prefix `""`.
    pub const ROOT: GroupId = GroupId(0);
}

/// A borrowed handle to one group of an [`Engine`].
///
/// Obtained from [`Engine::group`], [`RouterGroup::group`] or
/// [`Engine::group_handle`]. Keep the [`GroupId`] if you need to come back
/// to a group after the handle is gone.
pub struct RouterGroup<'e> {
    engine: &'e mut Engine,
    id: GroupId,
}

impl<'e> RouterGroup<'e> {
    pub(crate) fn new(engine: &'e mut Engine, id: GroupId) -> Self {
        Self { engine, id }
    }

    pub fn id(&self) -> GroupId { self.id }

    /// The full prefix: every ancestor's prefix followed by this group's own.
    pub fn prefix(&self) -> &str {
        &self.engine.group_data(self.id).prefix
    }

    pub fn parent(&self) -> Option<GroupId> {
        self.engine.group_data(self.id).parent
    }

    /// Creates a child group whose prefix is this group's prefix + `prefix`.
    pub fn group(&mut self, prefix: &str) -> RouterGroup<'_> {
        let id = self.engine.derive_group(self.id, prefix);
        RouterGroup::new(self.engine, id)
    }

    /// Appends middleware. Middleware runs in the order it was added.
    pub fn use_middleware(&mut self, handler: impl Handler) -> &mut Self {
        self.engine.add_middleware(self.id, handler.into_handler_func());
        self
    }

    /// Registers `handler` for `method` at this group's prefix + `pattern`.
    ///
    /// # Panics
    ///
    /// Panics if the resulting pattern is malformed: a `*name` segment that
    /// is not last, an unnamed `:`/`*` segment, a wildcard name that clashes
    /// with another route at the same position, or a pattern that does not
    /// start with `/`.
    pub fn route(&mut self, method: Method, pattern: &str, handler: impl Handler) -> &mut Self {
        self.engine.add_route(self.id, method, pattern, handler.into_handler_func());
        self
    }

    pub fn get(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.route(Method::Get, pattern, handler)
    }

    pub fn post(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.route(Method::Post, pattern, handler)
    }

    pub fn put(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.route(Method::Put, pattern, handler)
    }

    pub fn delete(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.route(Method::Delete, pattern, handler)
    }

    pub fn patch(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.route(Method::Patch, pattern, handler)
    }

    /// Serves the files under `root` at `GET {prefix}{relative}/*filepath`.
    pub fn static_files(&mut self, relative: &str, root: impl Into<PathBuf>) -> &mut Self {
        let pattern = format!("{}/*filepath", relative.trim_end_matches('/'));
        self.get(&pattern, fs::serve_dir(root.into()))
    }
}
