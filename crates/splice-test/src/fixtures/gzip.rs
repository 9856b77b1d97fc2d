//! Gzip compression in the chained-handler convention.
//!
//! The handler wraps the writer it receives in a [`GzipWriter`] before
//! calling the next handler, and finishes the gzip stream once the next
//! handler has returned. Requests whose `Accept-Encoding` does not allow
//! gzip are passed through untouched.

use flate2::write::GzEncoder;
use flate2::Compression;
use http::header::{ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_LENGTH, VARY};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use parking_lot::Mutex;
use splice_core::{
    BoxHandler, Handler, HandlerMiddleware, Request, ResponseWriter, SharedWriter, SpliceResult,
};
use std::io::{self, Write};
use std::sync::Arc;

/// Gzip middleware with the default compression level.
pub fn gzip<'a>(next: BoxHandler<'a>) -> BoxHandler<'a> {
    Box::new(GzipHandler {
        next,
        level: Compression::default(),
    })
}

/// Gzip middleware with a configurable compression level.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gzip {
    level: Compression,
}

impl Gzip {
    /// Creates a gzip middleware with the given level (0-9).
    #[must_use]
    pub fn new(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(9)),
        }
    }

    /// Returns the compression level.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level.level()
    }
}

impl HandlerMiddleware for Gzip {
    fn wrap<'a>(&'a self, next: BoxHandler<'a>) -> BoxHandler<'a> {
        Box::new(GzipHandler {
            next,
            level: self.level,
        })
    }
}

struct GzipHandler<'a> {
    next: BoxHandler<'a>,
    level: Compression,
}

impl Handler for GzipHandler<'_> {
    fn serve(&self, writer: SharedWriter, request: &mut Request) -> SpliceResult<()> {
        writer.append_header(VARY, HeaderValue::from_static("Accept-Encoding"));

        if !accepts_gzip(request.headers()) {
            return self.next.serve(writer, request);
        }

        let gz = Arc::new(Mutex::new(GzipWriter::new(writer, self.level)));
        let result = self.next.serve(SharedWriter::from(Arc::clone(&gz)), request);
        let finished = gz.lock().finish();

        result?;
        finished?;
        Ok(())
    }
}

/// Returns true if the `Accept-Encoding` headers allow gzip.
fn accepts_gzip(headers: &HeaderMap) -> bool {
    headers
        .get_all(ACCEPT_ENCODING)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .any(|part| {
            let mut params = part.split(';').map(str::trim);
            let coding = params.next().unwrap_or_default();
            if !coding.eq_ignore_ascii_case("gzip") {
                return false;
            }
            let quality = params
                .filter_map(|param| param.strip_prefix("q="))
                .find_map(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            quality > 0.0
        })
}

/// A writer compressing everything written to it into `inner`.
///
/// Compression starts with the first body write, which sets
/// `Content-Encoding: gzip` and drops any `Content-Length` on `inner`.
/// Status writes are forwarded as they are, so a response without a body
/// carries no gzip encoding.
pub struct GzipWriter {
    inner: SharedWriter,
    encoder: Option<GzEncoder<SharedWriter>>,
    level: Compression,
    started: bool,
    finished: bool,
}

impl GzipWriter {
    /// Creates a gzip writer over `inner`.
    #[must_use]
    pub fn new(inner: SharedWriter, level: Compression) -> Self {
        Self {
            inner,
            encoder: None,
            level,
            started: false,
            finished: false,
        }
    }

    /// Returns true once compression has started.
    #[must_use]
    pub fn started(&self) -> bool {
        self.started
    }

    /// Writes the gzip trailer. Later writes fail.
    pub fn finish(&mut self) -> io::Result<()> {
        self.finished = true;
        if let Some(encoder) = self.encoder.take() {
            encoder.finish()?;
        }
        Ok(())
    }

    fn start(&mut self) -> io::Result<&mut GzEncoder<SharedWriter>> {
        if self.finished {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "gzip stream already finished",
            ));
        }
        if self.encoder.is_none() {
            self.inner
                .set_header(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
            self.inner.remove_header(&CONTENT_LENGTH);
            self.started = true;
        }
        let inner = &self.inner;
        let level = self.level;
        Ok(self
            .encoder
            .get_or_insert_with(|| GzEncoder::new(inner.clone(), level)))
    }
}

impl ResponseWriter for GzipWriter {
    fn status(&self) -> StatusCode {
        self.inner.status()
    }

    fn write_status(&mut self, status: StatusCode) -> io::Result<()> {
        self.inner.write_status(status)
    }

    fn header(&self, name: &HeaderName) -> Option<HeaderValue> {
        self.inner.header(name)
    }

    fn headers(&self) -> HeaderMap {
        self.inner.headers()
    }

    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        if name == CONTENT_LENGTH && self.started() {
            return;
        }
        self.inner.set_header(name, value);
    }

    fn append_header(&mut self, name: HeaderName, value: HeaderValue) {
        if name == CONTENT_LENGTH && self.started() {
            return;
        }
        self.inner.append_header(name, value);
    }

    fn remove_header(&mut self, name: &HeaderName) -> Option<HeaderValue> {
        self.inner.remove_header(name)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.start()?.write_all(buf)?;
        Ok(buf.len())
    }

    fn written(&self) -> bool {
        self.inner.written()
    }

    fn size(&self) -> usize {
        self.inner.size()
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(encoder) = self.encoder.as_mut() {
            encoder.flush()?;
        }
        self.inner.flush()
    }
}
