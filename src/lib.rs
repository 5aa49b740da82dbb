//! # sprig
//!
//! A small HTTP framework: a segment-trie router, route groups, and a
//! middleware chain that handlers drive explicitly.
//!
//! ## Routing
//!
//! Patterns are `/`-separated segments. A segment is either literal, a
//! named parameter `:name` (exactly one path segment), or a catch-all
//! `*name` (the rest of the path, must be last):
//!
//! ```text
//! Pattern: /p/:lang/doc          Pattern: /static/*filepath
//!
//!  /p/go/doc      lang = "go"     /static/a.css       filepath = "a.css"
//!  /p/go          no match        /static/css/a.css   filepath = "css/a.css"
//!  /p/go/doc/x    no match        /static/            no match
//! ```
//!
//! When several patterns could serve a path, the literal segment wins over
//! `:name`, which wins over `*name`, level by level.
//!
//! ## Middleware
//!
//! Every request runs one chain: the middleware of each group whose prefix
//! starts the request path (groups in creation order), then the route
//! handler, or a built-in `404` handler on a miss. A middleware wraps the
//! rest of the chain by calling [`Context::next`], and stops it with
//! [`Context::abort`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::StatusCode;
//! use sprig::{Context, Engine, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut app = Engine::with_defaults();          // logger + recovery
//!     app.get("/", |c: &mut Context| c.string(StatusCode::OK, "hello"));
//!
//!     let mut v1 = app.group("/v1");
//!     v1.use_middleware(timing);
//!     v1.get("/users/:id", get_user);
//!
//!     Server::bind("0.0.0.0:9999").serve(app).await.unwrap();
//! }
//!
//! fn timing(c: &mut Context) {
//!     let start = std::time::Instant::now();
//!     c.next();
//!     let elapsed = format!("{:?}", start.elapsed());
//!     c.set_header("x-elapsed", &elapsed);
//! }
//!
//! fn get_user(c: &mut Context) {
//!     let id = c.param("id").unwrap_or_default().to_owned();
//!     c.json(StatusCode::OK, &serde_json::json!({ "id": id }));
//! }
//! ```

mod context;
mod engine;
mod error;
mod group;
mod handler;
mod method;
mod render;
mod request;
mod response;
mod router;
mod server;
mod trie;

pub mod fs;
pub mod middleware;

pub use context::Context;
pub use engine::Engine;
pub use error::{Error, RouteError};
pub use group::{GroupId, RouterGroup};
pub use handler::{Handler, HandlerFunc};
pub use method::Method;
pub use render::{Render, RenderError};
pub use request::Request;
pub use response::{ContentType, ResponseWriter};
pub use server::Server;
