//! Handler trait and type erasure.
//!
//! # How handlers are stored
//!
//! Routes, group middleware and the per-request chain all hold handlers of
//! *different* concrete types in one `Vec` / `HashMap`. Rust collections hold
//! one type, so every handler is erased to a shared trait object:
//!
//! ```text
//! fn hello(c: &mut Context) { … }          ← user writes this
//!        ↓ engine.get("/", hello)
//! hello.into_handler_func()                ← Handler blanket impl
//!        ↓
//! Arc::new(hello)                          ← stored as HandlerFunc
//!        ↓  cloned into each request's chain
//! (handler)(&mut ctx)  at request time     ← one vtable dispatch
//! ```
//!
//! Middleware and route handlers share the one signature. A middleware is a
//! handler that calls [`Context::next`] somewhere in its body.

use std::sync::Arc;

use crate::context::Context;

/// A type-erased handler shared across concurrent requests.
///
/// `Arc` lets every request's chain hold the same handler with one atomic
/// increment and no copying.
pub type HandlerFunc = Arc<dyn Fn(&mut Context) + Send + Sync + 'static>;

/// Implemented for every valid handler or middleware.
///
/// You never implement this yourself. It is satisfied by any function or
/// closure with the signature:
///
/// ```text
/// fn name(c: &mut Context)
/// ```
///
/// The trait is **sealed** (via the private `Sealed` supertrait): only the
/// blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_handler_func(self) -> HandlerFunc;
}

mod private {
    pub trait Sealed {}
}

impl<F> private::Sealed for F where F: Fn(&mut Context) + Send + Sync + 'static {}

impl<F> Handler for F
where
    F: Fn(&mut Context) + Send + Sync + 'static,
{
    fn into_handler_func(self) -> HandlerFunc {
        Arc::new(self)
    }
}
