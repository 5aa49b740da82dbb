//! Template rendering hook.
//!
//! sprig does not ship a template engine. Plug one in by implementing
//! [`Render`] and handing it to [`Engine::set_renderer`](crate::Engine::set_renderer);
//! [`Context::html`](crate::Context::html) then renders through it.

use std::error::Error as StdError;

/// Boxed error returned by a [`Render`] implementation.
pub type RenderError = Box<dyn StdError + Send + Sync>;

/// Renders a named template with a JSON data value.
///
/// ```rust
/// use sprig::{Render, RenderError};
///
/// struct Greeting;
///
/// impl Render for Greeting {
///     fn render(&self, name: &str, data: &serde_json::Value) -> Result<String, RenderError> {
///         match name {
///             "hello.html" => Ok(format!("<h1>Hello, {}</h1>", data["name"].as_str().unwrap_or("you"))),
///             _ => Err(format!("unknown template `{name}`").into()),
///         }
///     }
/// }
/// ```
pub trait Render: Send + Sync + 'static {
    fn render(&self, name: &str, data: &serde_json::Value) -> Result<String, RenderError>;
}
