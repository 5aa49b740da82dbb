//! Minimal sprig example: groups, middleware, templates, static files.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:9999/
//!   curl http://localhost:9999/students
//!   curl http://localhost:9999/v1/hello/ada
//!   curl -H 'authorization: token' http://localhost:9999/v2/hello/ada
//!   curl http://localhost:9999/assets/demo.rs
//!   curl http://localhost:9999/panic          ← 500, server keeps running

use http::StatusCode;
use serde::Serialize;
use sprig::{Context, Engine, Render, RenderError, Server};

#[derive(Serialize)]
struct Student {
    name: &'static str,
    age: u8,
}

/// Stand-in for a real template engine.
struct Pages;

impl Render for Pages {
    fn render(&self, name: &str, data: &serde_json::Value) -> Result<String, RenderError> {
        match name {
            "index.html" => Ok("<h1>sprig</h1>".to_owned()),
            "students.html" => {
                let rows: String = data["students"]
                    .as_array()
                    .into_iter()
                    .flatten()
                    .map(|s| format!("<li>{}: {}</li>", s["name"], s["age"]))
                    .collect();
                Ok(format!("<h1>{}</h1><ul>{rows}</ul>", data["title"]))
            }
            _ => Err(format!("unknown template `{name}`").into()),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let mut app = Engine::with_defaults();
    app.set_renderer(Pages)
        .static_files("/assets", "./demos")
        .get("/", index)
        .get("/students", students)
        .get("/panic", |c: &mut Context| {
            let names = vec!["ada"];
            c.string(StatusCode::OK, names[100]);
        });

    app.group("/v1").get("/hello/:name", hello);

    let mut v2 = app.group("/v2");
    v2.use_middleware(require_auth).get("/hello/:name", hello);

    Server::bind("0.0.0.0:9999")
        .serve(app)
        .await
        .expect("server error");
}

fn index(c: &mut Context) {
    c.html(StatusCode::OK, "index.html", &());
}

fn students(c: &mut Context) {
    let students = [
        Student { name: "Ada", age: 20 },
        Student { name: "Grace", age: 22 },
    ];
    c.html(
        StatusCode::OK,
        "students.html",
        &serde_json::json!({ "title": "sprig", "students": students }),
    );
}

// GET /v1/hello/:name?greeting=hi
fn hello(c: &mut Context) {
    let name = c.param("name").unwrap_or_default().to_owned();
    let greeting = c.query("greeting").unwrap_or_else(|| "hello".to_owned());
    let path = c.path().to_owned();
    c.string(StatusCode::OK, format!("{greeting} {name}, you're at {path}\n"));
}

fn require_auth(c: &mut Context) {
    if c.header("authorization").is_none() {
        c.fail(StatusCode::UNAUTHORIZED, "authorization required");
    }
}
