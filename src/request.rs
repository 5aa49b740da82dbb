//! Incoming HTTP request, as seen by handlers.

use std::str::Utf8Error;

use bytes::Bytes;
use http::HeaderMap;
use percent_encoding::percent_decode_str;

/// An incoming HTTP request with its body fully read.
///
/// The path is stored percent-decoded, so routing and path parameters see
/// `/hello/café` rather than `/hello/caf%C3%A9`. The query string stays
/// encoded until [`Request::query`] decodes a single value.
pub struct Request {
    pub(crate) method: http::Method,
    pub(crate) path: String,
    pub(crate) query: Option<String>,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
}

impl Request {
    /// Fails when the percent-decoded path is not valid UTF-8.
    pub(crate) fn new(req: http::Request<Bytes>) -> Result<Self, Utf8Error> {
        let (parts, body) = req.into_parts();
        let path = percent_decode_str(parts.uri.path()).decode_utf8()?.into_owned();
        Ok(Self {
            method: parts.method,
            path,
            query: parts.uri.query().map(str::to_owned),
            headers: parts.headers,
            body,
        })
    }

    /// The method as sent, including extension methods such as `PURGE`.
    pub fn method(&self) -> &http::Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// The raw query string, without the leading `?`.
    pub fn raw_query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Case-insensitive header lookup. Non-UTF-8 values are skipped.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// First value of a query parameter, percent-decoded.
    ///
    /// For `/search?q=rust+web&page=2`, `req.query("q")` returns `Some("rust web")`.
    pub fn query(&self, key: &str) -> Option<String> {
        first_value(self.query.as_deref()?.as_bytes(), key)
    }

    /// First value of a field in an `application/x-www-form-urlencoded` body.
    pub fn post_form(&self, key: &str) -> Option<String> {
        first_value(&self.body, key)
    }
}

fn first_value(encoded: &[u8], key: &str) -> Option<String> {
    url::form_urlencoded::parse(encoded)
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
