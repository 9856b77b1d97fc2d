//! Context-threaded middleware pipeline.
//!
//! A [`Pipeline`] is an ordered list of stages ending with the request
//! handler. Serving a request creates a [`Context`], installs the native
//! writer and runs [`Context::next`] once; stages decide from there whether
//! and when the rest of the list runs.
//!
//! ```text
//! serve ─► stage 1 ─► next() ─► stage 2 ─► next() ─► handler
//!                                                        │
//!          stage 1 ◄── returns ◄── stage 2 ◄── returns ◄─┘
//! ```

use crate::context::{BoxedMiddleware, Context};
use crate::middleware::{FnMiddleware, Middleware};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use splice_core::{Request, Response, ResponseRecorder, SharedWriter, SpliceResult};
use std::sync::Arc;

/// Pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Name recorded on every request span.
    pub name: String,

    /// Log each stage at `debug` level as it is entered.
    pub trace_stages: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            name: "splice".to_string(),
            trace_stages: false,
        }
    }
}

/// An immutable, shareable list of stages.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use splice_core::Request;
/// use splice_middleware::{FnMiddleware, Pipeline};
///
/// let pipeline = Pipeline::builder()
///     .stage(FnMiddleware::new("powered_by", |ctx| {
///         ctx.header(http::header::SERVER, "splice")?;
///         ctx.next()
///     }))
///     .handler(|ctx| ctx.string(StatusCode::OK, "hello"))
///     .build();
///
/// let response = pipeline.serve(Request::default()).unwrap();
/// assert_eq!(response.status(), StatusCode::OK);
/// assert_eq!(response.headers()["server"], "splice");
/// assert_eq!(response.body().as_ref(), b"hello");
/// ```
#[derive(Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    stages: Arc<[BoxedMiddleware]>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Serves a request, recording the response in memory.
    pub fn serve(&self, request: Request) -> SpliceResult<Response> {
        let recorder = Arc::new(Mutex::new(ResponseRecorder::new()));
        self.serve_with(request, SharedWriter::from(Arc::clone(&recorder)))?;
        let recorded = std::mem::take(&mut *recorder.lock());
        Ok(recorded.into_response())
    }

    /// Serves a request, writing the response to `writer`.
    ///
    /// Returns the finished context so callers can inspect what happened
    /// (aborted, extensions, final request).
    pub fn serve_with(&self, request: Request, writer: SharedWriter) -> SpliceResult<Context> {
        let mut ctx = Context::with_stages(
            request,
            writer,
            Arc::clone(&self.stages),
            self.config.trace_stages,
        );

        let span = tracing::info_span!(
            "request",
            pipeline = %self.config.name,
            request_id = %ctx.request_id(),
            method = %ctx.request().method(),
            path = %ctx.request().uri().path(),
        );
        let _entered = span.enter();

        if let Err(error) = ctx.next() {
            tracing::error!(%error, "pipeline failed");
            return Err(error);
        }

        tracing::debug!(
            status = %ctx.writer().status(),
            aborted = ctx.is_aborted(),
            elapsed_us = u64::try_from(ctx.elapsed().as_micros()).unwrap_or(u64::MAX),
            "request served"
        );
        Ok(ctx)
    }

    /// Returns the configuration this pipeline was built with.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the names of all stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Returns the number of stages, handler included.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

/// Builder for constructing a [`Pipeline`].
///
/// Stages run in the order they are added.
#[derive(Default)]
pub struct PipelineBuilder {
    config: PipelineConfig,
    stages: Vec<BoxedMiddleware>,
}

impl PipelineBuilder {
    /// Creates an empty builder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pipeline configuration.
    #[must_use]
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Appends a stage.
    #[must_use]
    pub fn stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Appends an already shared stage.
    #[must_use]
    pub fn shared_stage(mut self, middleware: BoxedMiddleware) -> Self {
        self.stages.push(middleware);
        self
    }

    /// Appends the request handler.
    ///
    /// The handler is an ordinary stage named `"handler"`; stages added after
    /// it run after it.
    #[must_use]
    pub fn handler<F>(self, handler: F) -> Self
    where
        F: Fn(&mut Context) -> SpliceResult<()> + Send + Sync + 'static,
    {
        self.stage(FnMiddleware::new("handler", handler))
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            config: self.config,
            stages: self.stages.into(),
        }
    }
}
