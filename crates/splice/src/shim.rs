//! Writer installed on the context while a wrapped middleware's inner
//! handler runs.

use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use splice_core::{ResponseWriter, SharedWriter};
use std::io;

/// Redirects body and status writes to the writer a chained-handler
/// middleware passed to its inner handler.
///
/// The shim is built from two writers:
///
/// - `base`: the context's writer at the time the shim is installed. Every
///   operation the shim does not override is delegated to it.
/// - `target`: the writer the middleware supplied. Body bytes and status
///   writes go here, unmodified and unbuffered.
///
/// Only `write`, `write_str`, `write_status` and `status` are overridden.
/// `flush` and the header operations go to `base`.
pub struct ResponseShim {
    base: SharedWriter,
    target: SharedWriter,
    status: Option<StatusCode>,
}

impl ResponseShim {
    /// Creates a shim delegating to `base` and writing to `target`.
    #[must_use]
    pub fn new(base: SharedWriter, target: SharedWriter) -> Self {
        Self {
            base,
            target,
            status: None,
        }
    }

    /// Returns the last status passed to [`ResponseWriter::write_status`],
    /// whether or not forwarding it succeeded.
    #[must_use]
    pub fn captured_status(&self) -> Option<StatusCode> {
        self.status
    }
}

impl ResponseWriter for ResponseShim {
    fn status(&self) -> StatusCode {
        self.status.unwrap_or_else(|| self.base.status())
    }

    fn write_status(&mut self, status: StatusCode) -> io::Result<()> {
        self.status = Some(status);
        self.target.write_status(status)
    }

    fn header(&self, name: &HeaderName) -> Option<HeaderValue> {
        self.base.header(name)
    }

    fn headers(&self) -> HeaderMap {
        self.base.headers()
    }

    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.base.set_header(name, value);
    }

    fn append_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.base.append_header(name, value);
    }

    fn remove_header(&mut self, name: &HeaderName) -> Option<HeaderValue> {
        self.base.remove_header(name)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.target.write(buf)
    }

    fn write_str(&mut self, s: &str) -> io::Result<usize> {
        self.write(s.as_bytes())
    }

    fn written(&self) -> bool {
        self.base.written()
    }

    fn size(&self) -> usize {
        self.base.size()
    }

    fn flush(&mut self) -> io::Result<()> {
        self.base.flush()
    }
}
