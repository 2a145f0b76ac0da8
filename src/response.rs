//! The response sink every stage of a chain writes into.
//!
//! [`ResponseWriter`] buffers the whole response. Middleware can write before
//! and after calling the next stage, and the bytes come out in the order they
//! were written. The server turns the buffer into an HTTP response once the
//! finalized handler returns.

use bytes::{Bytes, BytesMut};
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use http_body_util::Full;

/// A buffered HTTP response under construction.
///
/// # Status rules
///
/// The status defaults to `200 OK`. [`write_header`](Self::write_header)
/// sets it once; later calls are ignored. Writing body bytes commits the
/// status, so a `write_header` after the first write has no effect either.
///
/// ```rust
/// use apollo::ResponseWriter;
/// use http::StatusCode;
///
/// let mut w = ResponseWriter::new();
/// w.write_str("m1\n");
/// w.write_header(StatusCode::INTERNAL_SERVER_ERROR); // too late, ignored
///
/// assert_eq!(w.status(), StatusCode::OK);
/// assert_eq!(w.body(), b"m1\n");
/// ```
#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the status code if it has not been committed yet.
    pub fn write_header(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
        }
    }

    /// Appends bytes to the body, committing the status.
    pub fn write(&mut self, bytes: &[u8]) {
        self.write_header(StatusCode::OK);
        self.body.extend_from_slice(bytes);
    }

    pub fn write_str(&mut self, s: &str) {
        self.write(s.as_bytes());
    }

    /// Replaces a header. Names and values that are not valid HTTP are
    /// ignored and reported as `false`.
    pub fn set_header(&mut self, name: &str, value: &str) -> bool {
        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
                true
            }
            _ => false,
        }
    }

    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }

    /// The status that will be sent: the committed one, or `200 OK`.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub(crate) fn into_response(self) -> http::Response<Full<Bytes>> {
        let status = self.status();
        let mut res = http::Response::new(Full::new(self.body.freeze()));
        *res.status_mut() = status;
        *res.headers_mut() = self.headers;
        res
    }
}
