//! Per-request pipeline context.
//!
//! The [`Context`] carries everything a stage needs: the current response
//! writer, the request, the position in the stage list and the aborted flag.
//! Stages advance the pipeline with [`Context::next`] and stop it with
//! [`Context::abort`].

use crate::middleware::Middleware;
use http::header::{HeaderName, CONTENT_TYPE};
use http::{HeaderValue, StatusCode};
use splice_core::{Request, SharedWriter, SpliceResult};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// A type-erased middleware that can be shared between pipelines.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// Context that flows through the middleware pipeline.
///
/// One context exists per request. It owns the request and a handle to the
/// writer the response currently goes to; both can be replaced by stages.
///
/// # Advance semantics
///
/// [`next`](Self::next) runs every remaining stage in order. A stage that
/// returns without calling `next` does not stop the pipeline: the stage after
/// it still runs. Only [`abort`](Self::abort) stops the remaining stages.
///
/// # Example
///
/// ```
/// use splice_core::{Request, ResponseRecorder, SharedWriter};
/// use splice_middleware::Context;
///
/// let writer = SharedWriter::new(ResponseRecorder::new());
/// let mut ctx = Context::new(Request::default(), writer);
///
/// ctx.string(http::StatusCode::OK, "hello").unwrap();
/// assert!(ctx.writer().written());
/// ```
pub struct Context {
    /// Unique identifier for this request (UUID v7).
    request_id: Uuid,

    /// Where the response currently goes.
    writer: SharedWriter,

    /// The request being served.
    request: Request,

    /// All stages of the pipeline, handler included.
    stages: Arc<[BoxedMiddleware]>,

    /// Index of the next stage to run.
    index: usize,

    /// Set once a stage aborts the pipeline.
    aborted: bool,

    /// Whether to log each stage as it is entered.
    trace_stages: bool,

    /// When the request started processing.
    started_at: Instant,

    /// Type-erased extension data.
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Context {
    /// Creates a context with no stages.
    ///
    /// Calling [`next`](Self::next) on such a context is a no-op. Pipelines
    /// create their contexts with the full stage list.
    #[must_use]
    pub fn new(request: Request, writer: SharedWriter) -> Self {
        Self::with_stages(request, writer, Arc::from(Vec::<BoxedMiddleware>::new()), false)
    }

    pub(crate) fn with_stages(
        request: Request,
        writer: SharedWriter,
        stages: Arc<[BoxedMiddleware]>,
        trace_stages: bool,
    ) -> Self {
        Self {
            request_id: Uuid::now_v7(),
            writer,
            request,
            stages,
            index: 0,
            aborted: false,
            trace_stages,
            started_at: Instant::now(),
            extensions: HashMap::new(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Returns the writer the response currently goes to.
    #[must_use]
    pub fn writer(&self) -> &SharedWriter {
        &self.writer
    }

    /// Replaces the current writer, returning the previous one.
    pub fn set_writer(&mut self, writer: SharedWriter) -> SharedWriter {
        std::mem::replace(&mut self.writer, writer)
    }

    /// Returns the request.
    #[must_use]
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Returns the request for modification.
    pub fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    /// Replaces the request, returning the previous one.
    pub fn set_request(&mut self, request: Request) -> Request {
        std::mem::replace(&mut self.request, request)
    }

    /// Runs all remaining stages, in order, until the list is exhausted or
    /// the context is aborted.
    ///
    /// Returns after every remaining stage (including the final handler)
    /// has returned. The first stage error stops the pipeline and is returned
    /// as-is.
    pub fn next(&mut self) -> SpliceResult<()> {
        let stages = Arc::clone(&self.stages);
        while !self.aborted && self.index < stages.len() {
            let stage = &stages[self.index];
            self.index += 1;
            if self.trace_stages {
                tracing::debug!(
                    request_id = %self.request_id,
                    stage = stage.name(),
                    position = self.index,
                    "entering stage"
                );
            }
            stage.handle(self)?;
        }
        Ok(())
    }

    /// Stops the pipeline: no stage that has not started yet will run.
    ///
    /// Stages that are already running (those that called `next` and are
    /// waiting for it to return) are unaffected.
    pub fn abort(&mut self) {
        if !self.aborted {
            tracing::debug!(
                request_id = %self.request_id,
                remaining = self.stages.len().saturating_sub(self.index),
                "pipeline aborted"
            );
        }
        self.aborted = true;
    }

    /// Writes the status and aborts the pipeline.
    pub fn abort_with_status(&mut self, status: StatusCode) -> SpliceResult<()> {
        self.abort();
        self.writer.write_status(status)?;
        Ok(())
    }

    /// Returns true if the pipeline has been aborted.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Returns the number of stages that have been entered so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.index
    }

    /// Sets a response header. An empty value removes the header.
    pub fn header(&self, name: HeaderName, value: &str) -> SpliceResult<()> {
        if value.is_empty() {
            self.writer.remove_header(&name);
            return Ok(());
        }
        self.writer.set_header(name, HeaderValue::from_str(value)?);
        Ok(())
    }

    /// Writes the response status.
    pub fn status(&self, status: StatusCode) -> SpliceResult<()> {
        self.writer.write_status(status)?;
        Ok(())
    }

    /// Writes a plain-text response.
    pub fn string(&self, status: StatusCode, body: &str) -> SpliceResult<()> {
        if self.writer.header(&CONTENT_TYPE).is_none() {
            self.writer.set_header(
                CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            );
        }
        self.writer.write_status(status)?;
        self.writer.write_str(body)?;
        Ok(())
    }

    /// Writes a response with the given content type.
    pub fn bytes(&self, status: StatusCode, content_type: &str, body: &[u8]) -> SpliceResult<()> {
        self.header(CONTENT_TYPE, content_type)?;
        self.writer.write_status(status)?;
        self.writer.write(body)?;
        Ok(())
    }

    /// Returns when the request started processing.
    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Stores a typed extension value.
    ///
    /// # Example
    ///
    /// ```
    /// use splice_core::{Request, ResponseRecorder, SharedWriter};
    /// use splice_middleware::Context;
    ///
    /// struct Visits(u32);
    ///
    /// let mut ctx = Context::new(
    ///     Request::default(),
    ///     SharedWriter::new(ResponseRecorder::new()),
    /// );
    /// ctx.set_extension(Visits(3));
    /// assert_eq!(ctx.get_extension::<Visits>().unwrap().0, 3);
    /// ```
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Retrieves a typed extension value for modification.
    pub fn get_extension_mut<T: Send + Sync + 'static>(&mut self) -> Option<&mut T> {
        self.extensions
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("request_id", &self.request_id)
            .field("method", self.request.method())
            .field("uri", self.request.uri())
            .field("position", &self.index)
            .field("stages", &self.stages.len())
            .field("aborted", &self.aborted)
            .finish_non_exhaustive()
    }
}
