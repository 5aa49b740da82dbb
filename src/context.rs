//! Per-request context and the middleware chain runner.
//!
//! A [`Context`] is created for every inbound request and owns everything
//! that request's handlers touch: the request itself, the path parameters,
//! the response writer, and the chain of handlers resolved for it.
//!
//! # The chain
//!
//! The chain is `[group middleware…, route handler]`. A cursor starts
//! before the first element; [`Context::next`] advances it and runs every
//! remaining handler in order. A middleware that calls `next()` itself
//! wraps everything downstream:
//!
//! ```text
//! A: pre ─┐                                ┌─ A: post
//!         └ B: pre ─┐            ┌─ B: post ┘
//!                   └─ handler ──┘
//! ```
//!
//! A middleware that does not call `next()` still lets the chain continue
//! once it returns. To stop the chain, call [`Context::abort`]: the cursor
//! jumps past the end, every later `next()` is a no-op, and control unwinds
//! back through the middleware already on the stack.

use std::collections::HashMap;
use std::sync::Arc;

use http::StatusCode;
use serde::Serialize;
use tracing::error;

use crate::handler::HandlerFunc;
use crate::render::Render;
use crate::request::Request;
use crate::response::{ContentType, ResponseWriter};

/// Cursor value marking an aborted chain. Far past any realistic chain
/// length, with headroom for the increments `next()` still performs.
const ABORT_INDEX: isize = isize::MAX / 2;

/// State of one request while its chain runs.
pub struct Context {
    pub(crate) request: Request,
    pub(crate) writer: ResponseWriter,
    pub(crate) params: HashMap<String, String>,
    pub(crate) handlers: Vec<HandlerFunc>,
    index: isize,
    renderer: Option<Arc<dyn Render>>,
}

impl Context {
    pub(crate) fn new(
        request: Request,
        handlers: Vec<HandlerFunc>,
        renderer: Option<Arc<dyn Render>>,
    ) -> Self {
        Self {
            request,
            writer: ResponseWriter::new(),
            params: HashMap::new(),
            handlers,
            index: -1,
            renderer,
        }
    }

    // ── Chain control ────────────────────────────────────────────────────────

    /// Runs the remaining handlers in the chain.
    ///
    /// Returns once every downstream handler has returned, so code after the
    /// call runs after the route handler.
    pub fn next(&mut self) {
        self.index += 1;
        while let Some(handler) = self.current() {
            handler(self);
            self.index += 1;
        }
    }

    fn current(&self) -> Option<HandlerFunc> {
        let index = usize::try_from(self.index).ok()?;
        self.handlers.get(index).map(Arc::clone)
    }

    /// Stops the chain. Handlers after the current one never run; handlers
    /// already on the stack finish their post-`next()` code.
    pub fn abort(&mut self) {
        self.index = ABORT_INDEX;
    }

    /// [`abort`](Context::abort) and set the response status.
    pub fn abort_with_status(&mut self, code: StatusCode) {
        self.abort();
        self.writer.set_status(code);
    }

    pub fn is_aborted(&self) -> bool {
        self.index >= ABORT_INDEX
    }

    // ── Request side ─────────────────────────────────────────────────────────

    pub fn request(&self) -> &Request { &self.request }
    pub fn method(&self) -> &http::Method { self.request.method() }
    pub fn path(&self) -> &str { &self.request.path }
    pub fn body(&self) -> &[u8] { self.request.body() }

    /// A path parameter bound by the matched route.
    ///
    /// For the route `/users/:id`, `c.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn query(&self, key: &str) -> Option<String> {
        self.request.query(key)
    }

    pub fn post_form(&self, key: &str) -> Option<String> {
        self.request.post_form(key)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.header(name)
    }

    // ── Response side ────────────────────────────────────────────────────────

    pub fn writer(&self) -> &ResponseWriter { &self.writer }
    pub fn writer_mut(&mut self) -> &mut ResponseWriter { &mut self.writer }

    pub fn status(&mut self, code: StatusCode) {
        self.writer.set_status(code);
    }

    pub fn set_header(&mut self, name: &str, value: &str) {
        self.writer.set_header(name, value);
    }

    /// Writes a `text/plain` body.
    pub fn string(&mut self, code: StatusCode, body: impl Into<String>) {
        self.writer.set_content_type(ContentType::Text);
        self.writer.set_status(code);
        self.writer.write(body.into().as_bytes());
    }

    /// Serializes `value` as an `application/json` body.
    ///
    /// A value that fails to serialize produces a `500` instead.
    pub fn json<T: Serialize + ?Sized>(&mut self, code: StatusCode, value: &T) {
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                self.writer.set_content_type(ContentType::Json);
                self.writer.set_status(code);
                self.writer.write(&bytes);
            }
            Err(e) => {
                error!(path = %self.request.path, "json serialization failed: {e}");
                self.internal_error();
            }
        }
    }

    /// Writes raw bytes with the status given and no content type.
    pub fn data(&mut self, code: StatusCode, bytes: &[u8]) {
        self.writer.set_status(code);
        self.writer.write(bytes);
    }

    /// Renders the named template through the engine's [`Render`] hook.
    ///
    /// Without a renderer, or when rendering fails, the response is a `500`.
    pub fn html<T: Serialize + ?Sized>(&mut self, code: StatusCode, name: &str, data: &T) {
        let rendered = match &self.renderer {
            Some(renderer) => serde_json::to_value(data)
                .map_err(Into::into)
                .and_then(|data| renderer.render(name, &data)),
            None => Err("no renderer configured".into()),
        };
        match rendered {
            Ok(page) => {
                self.writer.set_content_type(ContentType::Html);
                self.writer.set_status(code);
                self.writer.write(page.as_bytes());
            }
            Err(e) => {
                error!(template = name, "render failed: {e}");
                self.internal_error();
            }
        }
    }

    /// Aborts the chain and responds with `{"message": …}`.
    pub fn fail(&mut self, code: StatusCode, message: &str) {
        self.abort();
        self.json(code, &serde_json::json!({ "message": message }));
    }

    fn internal_error(&mut self) {
        self.writer.reset();
        self.string(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bytes::Bytes;

    use super::*;
    use crate::render::RenderError;

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn context(handlers: Vec<HandlerFunc>) -> Context {
        let req = http::Request::builder()
            .uri("/users/42?verbose=1")
            .body(Bytes::new())
            .unwrap();
        Context::new(Request::new(req).unwrap(), handlers, None)
    }

    fn wrap(log: &Log, pre: &'static str, post: &'static str) -> HandlerFunc {
        let log = Arc::clone(log);
        Arc::new(move |c: &mut Context| {
            log.lock().unwrap().push(pre);
            c.next();
            log.lock().unwrap().push(post);
        })
    }

    fn mark(log: &Log, tag: &'static str) -> HandlerFunc {
        let log = Arc::clone(log);
        Arc::new(move |_: &mut Context| log.lock().unwrap().push(tag))
    }

    fn entries(log: &Log) -> Vec<&'static str> {
        log.lock().unwrap().clone()
    }

    #[test]
    fn wrapping_middleware_nests() {
        let log = Log::default();
        let mut c = context(vec![
            wrap(&log, "a:pre", "a:post"),
            wrap(&log, "b:pre", "b:post"),
            mark(&log, "handler"),
        ]);
        c.next();
        assert_eq!(
            entries(&log),
            ["a:pre", "b:pre", "handler", "b:post", "a:post"]
        );
    }

    #[test]
    fn middleware_without_next_still_continues() {
        let log = Log::default();
        let mut c = context(vec![
            mark(&log, "a"),
            mark(&log, "b"),
            mark(&log, "handler"),
        ]);
        c.next();
        assert_eq!(entries(&log), ["a", "b", "handler"]);
    }

    #[test]
    fn each_handler_runs_once() {
        let log = Log::default();
        let mut c = context(vec![
            mark(&log, "a"),
            wrap(&log, "b:pre", "b:post"),
            mark(&log, "handler"),
        ]);
        c.next();
        c.next();
        assert_eq!(entries(&log), ["a", "b:pre", "handler", "b:post"]);
    }

    #[test]
    fn abort_skips_downstream_and_unwinds() {
        let log = Log::default();
        let guard = {
            let log = Arc::clone(&log);
            Arc::new(move |c: &mut Context| {
                log.lock().unwrap().push("guard:pre");
                c.abort_with_status(StatusCode::UNAUTHORIZED);
                c.next();
                log.lock().unwrap().push("guard:post");
            }) as HandlerFunc
        };
        let mut c = context(vec![
            wrap(&log, "outer:pre", "outer:post"),
            guard,
            mark(&log, "inner"),
            mark(&log, "handler"),
        ]);
        c.next();
        assert!(c.is_aborted());
        assert_eq!(c.writer().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            entries(&log),
            ["outer:pre", "guard:pre", "guard:post", "outer:post"]
        );
    }

    #[test]
    fn empty_chain_is_a_noop() {
        let mut c = context(Vec::new());
        c.next();
        assert!(!c.is_aborted());
        assert_eq!(c.writer().status(), StatusCode::OK);
    }

    #[test]
    fn request_accessors() {
        let mut c = context(Vec::new());
        c.params.insert("id".into(), "42".into());
        assert_eq!(*c.method(), http::Method::GET);
        assert_eq!(c.path(), "/users/42");
        assert_eq!(c.param("id"), Some("42"));
        assert_eq!(c.param("missing"), None);
        assert_eq!(c.query("verbose").as_deref(), Some("1"));
    }

    #[test]
    fn json_sets_type_and_status() {
        let mut c = context(Vec::new());
        c.json(StatusCode::CREATED, &serde_json::json!({ "id": 7 }));
        assert_eq!(c.writer().status(), StatusCode::CREATED);
        assert_eq!(c.writer().headers()["content-type"], "application/json");
        assert_eq!(c.writer().body(), br#"{"id":7}"#);
    }

    #[test]
    fn fail_aborts_with_message() {
        let mut c = context(Vec::new());
        c.fail(StatusCode::BAD_REQUEST, "bad input");
        assert!(c.is_aborted());
        assert_eq!(c.writer().status(), StatusCode::BAD_REQUEST);
        assert_eq!(c.writer().body(), br#"{"message":"bad input"}"#);
    }

    #[test]
    fn html_without_renderer_is_500() {
        let mut c = context(Vec::new());
        c.html(StatusCode::OK, "index.html", &());
        assert_eq!(c.writer().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    struct Echo;

    impl Render for Echo {
        fn render(&self, name: &str, data: &serde_json::Value) -> Result<String, RenderError> {
            if name == "broken" {
                return Err("template exploded".into());
            }
            Ok(format!("<p>{name}:{}</p>", data["title"]))
        }
    }

    #[test]
    fn html_uses_renderer() {
        let mut c = context(Vec::new());
        c.renderer = Some(Arc::new(Echo));
        c.html(StatusCode::OK, "page", &serde_json::json!({ "title": "sprig" }));
        assert_eq!(c.writer().headers()["content-type"], "text/html; charset=utf-8");
        assert_eq!(c.writer().body(), br#"<p>page:"sprig"</p>"#);

        let mut c = context(Vec::new());
        c.renderer = Some(Arc::new(Echo));
        c.html(StatusCode::OK, "broken", &());
        assert_eq!(c.writer().status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(c.writer().body(), b"Internal Server Error");
    }
}
