use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use http::StatusCode;
use tracing::error;

use crate::context::Context;
use crate::handler::Handler;

/// Catches panics from everything downstream.
///
/// Whatever the panicking handler had written is discarded, the response
/// becomes `500 Internal Server Error`, and the chain is aborted.
pub fn recovery() -> impl Handler {
    |c: &mut Context| {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| c.next())) {
            error!(
                method = %c.method(),
                path = c.path(),
                "handler panicked: {}",
                panic_message(payload.as_ref())
            );
            c.writer_mut().reset();
            c.string(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
            c.abort();
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}

#[cfg(test)]
mod tests {
    use std::panic::UnwindSafe;

    use super::*;

    fn payload_of(f: impl FnOnce() + UnwindSafe) -> Box<dyn Any + Send> {
        panic::catch_unwind(f).unwrap_err()
    }

    #[test]
    fn extracts_panic_messages() {
        let err = payload_of(|| panic!("static message"));
        assert_eq!(panic_message(err.as_ref()), "static message");

        let err = payload_of(|| panic!("formatted {}", 42));
        assert_eq!(panic_message(err.as_ref()), "formatted 42");

        let err = payload_of(|| panic::panic_any(7_u8));
        assert_eq!(panic_message(err.as_ref()), "<non-string panic payload>");
    }
}
