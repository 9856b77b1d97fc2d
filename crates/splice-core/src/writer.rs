//! Response writer capability set.
//!
//! [`ResponseWriter`] is the set of operations a stage or a chained-handler
//! middleware may perform on the response: status, headers and body bytes.
//! Writers are shared through [`SharedWriter`], a cloneable handle, so that a
//! writer installed on the pipeline context stays reachable after the
//! context's writer slot has been pointed somewhere else.
//!
//! # Example
//!
//! ```
//! use http::{header, HeaderValue, StatusCode};
//! use splice_core::{ResponseRecorder, SharedWriter};
//!
//! let writer = SharedWriter::new(ResponseRecorder::new());
//! writer.set_header(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
//! writer.write_status(StatusCode::CREATED).unwrap();
//! writer.write_str("created").unwrap();
//!
//! assert_eq!(writer.status(), StatusCode::CREATED);
//! assert_eq!(writer.size(), 7);
//! ```

use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::io;
use std::sync::Arc;

/// Operations available on an HTTP response under construction.
///
/// Implementations decide how bytes reach the client: a
/// [`ResponseRecorder`](crate::ResponseRecorder) buffers them, a compressing
/// writer encodes them before forwarding to an inner writer, and so on.
pub trait ResponseWriter: Send {
    /// Returns the status code that is (or will be) sent.
    fn status(&self) -> StatusCode;

    /// Sets the status code to send.
    ///
    /// Writers accept a new status until the response is committed by the
    /// first body write or flush.
    fn write_status(&mut self, status: StatusCode) -> io::Result<()>;

    /// Returns the first value of a response header.
    fn header(&self, name: &HeaderName) -> Option<HeaderValue>;

    /// Returns a snapshot of all response headers.
    fn headers(&self) -> HeaderMap;

    /// Sets a response header, replacing any existing values.
    fn set_header(&mut self, name: HeaderName, value: HeaderValue);

    /// Appends a value to a response header.
    fn append_header(&mut self, name: HeaderName, value: HeaderValue);

    /// Removes a response header, returning its first value.
    fn remove_header(&mut self, name: &HeaderName) -> Option<HeaderValue>;

    /// Writes body bytes, returning how many were accepted.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Writes a string as body bytes.
    ///
    /// Always equivalent to `write(s.as_bytes())`.
    fn write_str(&mut self, s: &str) -> io::Result<usize> {
        self.write(s.as_bytes())
    }

    /// Returns true once the response has been committed.
    fn written(&self) -> bool;

    /// Returns the number of body bytes accepted so far.
    fn size(&self) -> usize;

    /// Flushes buffered output, if any.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A cloneable, thread-safe handle to a [`ResponseWriter`].
///
/// Every method locks the writer for the duration of one operation only.
/// The lock is never held while calling into another stage, so writers may
/// freely forward to other `SharedWriter`s.
#[derive(Clone)]
pub struct SharedWriter {
    inner: Arc<Mutex<dyn ResponseWriter>>,
}

impl SharedWriter {
    /// Wraps a writer in a new shared handle.
    pub fn new<W: ResponseWriter + 'static>(writer: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(writer)),
        }
    }

    /// Locks the writer for a sequence of operations.
    ///
    /// Do not call other stages while holding the guard.
    pub fn lock(&self) -> MutexGuard<'_, dyn ResponseWriter> {
        self.inner.lock()
    }

    /// Returns true if both handles refer to the same writer.
    #[must_use]
    pub fn same_writer(&self, other: &Self) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.inner).cast::<()>(),
            Arc::as_ptr(&other.inner).cast::<()>(),
        )
    }

    /// See [`ResponseWriter::status`].
    pub fn status(&self) -> StatusCode {
        self.lock().status()
    }

    /// See [`ResponseWriter::write_status`].
    pub fn write_status(&self, status: StatusCode) -> io::Result<()> {
        self.lock().write_status(status)
    }

    /// See [`ResponseWriter::header`].
    pub fn header(&self, name: &HeaderName) -> Option<HeaderValue> {
        self.lock().header(name)
    }

    /// See [`ResponseWriter::headers`].
    pub fn headers(&self) -> HeaderMap {
        self.lock().headers()
    }

    /// See [`ResponseWriter::set_header`].
    pub fn set_header(&self, name: HeaderName, value: HeaderValue) {
        self.lock().set_header(name, value);
    }

    /// See [`ResponseWriter::append_header`].
    pub fn append_header(&self, name: HeaderName, value: HeaderValue) {
        self.lock().append_header(name, value);
    }

    /// See [`ResponseWriter::remove_header`].
    pub fn remove_header(&self, name: &HeaderName) -> Option<HeaderValue> {
        self.lock().remove_header(name)
    }

    /// See [`ResponseWriter::write`].
    pub fn write(&self, buf: &[u8]) -> io::Result<usize> {
        self.lock().write(buf)
    }

    /// See [`ResponseWriter::write_str`].
    pub fn write_str(&self, s: &str) -> io::Result<usize> {
        self.lock().write_str(s)
    }

    /// See [`ResponseWriter::written`].
    pub fn written(&self) -> bool {
        self.lock().written()
    }

    /// See [`ResponseWriter::size`].
    pub fn size(&self) -> usize {
        self.lock().size()
    }

    /// See [`ResponseWriter::flush`].
    pub fn flush(&self) -> io::Result<()> {
        self.lock().flush()
    }
}

impl<W: ResponseWriter + 'static> From<Arc<Mutex<W>>> for SharedWriter {
    /// Shares an already-allocated writer while the caller keeps a typed
    /// handle to it (e.g. to finish an encoder after the chain returns).
    fn from(inner: Arc<Mutex<W>>) -> Self {
        Self { inner }
    }
}

/// Lets byte-oriented encoders (`flate2`, ...) write straight into a response.
impl io::Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock().flush()
    }
}

impl fmt::Debug for SharedWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(writer) => f
                .debug_struct("SharedWriter")
                .field("status", &writer.status())
                .field("written", &writer.written())
                .field("size", &writer.size())
                .finish(),
            None => f.write_str("SharedWriter { <locked> }"),
        }
    }
}
