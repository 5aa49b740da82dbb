//! Built-in middleware.
//!
//! Middleware is an ordinary [`Handler`](crate::Handler) that calls
//! [`Context::next`](crate::Context::next) to run the rest of the chain.
//! Code before the call runs on the way in, code after it on the way out.
//!
//! - [`logger`]: one `info` event per request with method, path, status, latency
//! - [`recovery`]: turns a panicking handler into a `500` instead of a dropped connection
//!
//! [`Engine::with_defaults`](crate::Engine::with_defaults) installs both.
//! Put `recovery` ahead of any middleware that may panic: it only protects
//! what runs inside its own `next()`.

mod logger;
mod recovery;

pub use logger::logger;
pub use recovery::recovery;
