use std::time::Instant;

use tracing::info;

use crate::context::Context;
use crate::handler::Handler;

/// Logs every request once the rest of the chain has run.
pub fn logger() -> impl Handler {
    |c: &mut Context| {
        let start = Instant::now();
        c.next();
        info!(
            method = %c.method(),
            path = c.path(),
            status = c.writer().status().as_u16(),
            elapsed = ?start.elapsed(),
            "request"
        );
    }
}
