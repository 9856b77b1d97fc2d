//! The handler a wrapped middleware sees as "next".

use crate::shim::ResponseShim;
use splice_core::{Handler, Request, SharedWriter, SpliceError, SpliceResult};
use splice_middleware::Context;
use std::cell::{Cell, RefCell};

/// Resumes the pipeline when a chained-handler middleware calls its inner
/// handler.
///
/// Serving through a continuation:
///
/// 1. installs a [`ResponseShim`] on the context, so downstream stages write
///    their body and status to the writer the middleware supplied,
/// 2. makes the request the middleware supplied the context's request,
/// 3. runs the rest of the pipeline with [`Context::next`],
/// 4. puts the previous writer back on the context.
///
/// When the middleware passes on the request it was handed (see
/// [`with_origin`](Self::with_origin)), the request, with whatever downstream
/// stages changed, goes back to the middleware after the chain returns. Any
/// other request stays on the context, and the middleware's slot receives the
/// request the context held before.
///
/// A continuation advances the pipeline at most once. Further calls are
/// rejected with [`SpliceError::ContinuationReused`].
pub struct Continuation<'c> {
    ctx: RefCell<&'c mut Context>,
    origin: Option<*const Request>,
    advanced: Cell<bool>,
    replaced: Cell<bool>,
}

impl<'c> Continuation<'c> {
    /// Creates a continuation resuming `ctx`.
    #[must_use]
    pub fn new(ctx: &'c mut Context) -> Self {
        Self {
            ctx: RefCell::new(ctx),
            origin: None,
            advanced: Cell::new(false),
            replaced: Cell::new(false),
        }
    }

    /// Creates a continuation resuming `ctx` on behalf of a middleware that
    /// was handed `origin`. The address is only compared, never read.
    #[must_use]
    pub fn with_origin(ctx: &'c mut Context, origin: &Request) -> Self {
        let origin: *const Request = origin;
        Self {
            origin: Some(origin),
            ..Self::new(ctx)
        }
    }

    /// Returns true once the pipeline has been resumed through this
    /// continuation.
    #[must_use]
    pub fn advanced(&self) -> bool {
        self.advanced.get()
    }

    /// Returns true if the pipeline ran with a request other than the one
    /// the middleware was handed. That request is now the context's.
    #[must_use]
    pub fn replaced_request(&self) -> bool {
        self.replaced.get()
    }
}

impl Handler for Continuation<'_> {
    fn serve(&self, writer: SharedWriter, request: &mut Request) -> SpliceResult<()> {
        if self.advanced.get() {
            tracing::warn!("continuation invoked more than once; ignoring");
            return Err(SpliceError::ContinuationReused);
        }
        let Ok(mut ctx) = self.ctx.try_borrow_mut() else {
            tracing::warn!("continuation invoked while already running; ignoring");
            return Err(SpliceError::ContinuationReused);
        };

        let previous = ctx.writer().clone();
        ctx.set_writer(SharedWriter::new(ResponseShim::new(
            previous.clone(),
            writer,
        )));
        std::mem::swap(ctx.request_mut(), request);

        let result = ctx.next();

        let handed_on = self
            .origin
            .is_some_and(|origin| std::ptr::eq(origin, &*request));
        if handed_on {
            std::mem::swap(ctx.request_mut(), request);
        } else {
            self.replaced.set(true);
        }
        ctx.set_writer(previous);
        self.advanced.set(true);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use parking_lot::Mutex;
    use splice_core::{ResponseRecorder, ResponseWriter};
    use splice_middleware::{FnMiddleware, Pipeline};
    use std::sync::Arc;

    fn native() -> (Arc<Mutex<ResponseRecorder>>, SharedWriter) {
        let typed = Arc::new(Mutex::new(ResponseRecorder::new()));
        let shared = SharedWriter::from(Arc::clone(&typed));
        (typed, shared)
    }

    /// Runs `check` as the first stage of a pipeline whose handler writes
    /// `"downstream"` and records the path it saw.
    fn with_context<F>(check: F) -> (Arc<Mutex<ResponseRecorder>>, Arc<Mutex<Vec<String>>>)
    where
        F: Fn(&mut Context) -> SpliceResult<()> + Send + Sync + 'static,
    {
        let seen: Arc<Mutex<Vec<String>>> = Arc::default();
        let handler_seen = Arc::clone(&seen);
        let pipeline = Pipeline::builder()
            .stage(FnMiddleware::new("check", move |ctx| {
                check(ctx)?;
                ctx.abort();
                Ok(())
            }))
            .handler(move |ctx| {
                handler_seen
                    .lock()
                    .push(ctx.request().uri().path().to_string());
                ctx.string(StatusCode::ACCEPTED, "downstream")
            })
            .build();

        let (recorder, writer) = native();
        pipeline.serve_with(Request::default(), writer).unwrap();
        (recorder, seen)
    }

    #[test]
    fn test_serve_runs_downstream_into_supplied_writer() {
        let (target, target_writer) = native();
        let (recorder, seen) = with_context(move |ctx| {
            let continuation = Continuation::new(ctx);
            continuation.serve(target_writer.clone(), &mut Request::default())?;
            assert!(continuation.advanced());
            Ok(())
        });

        assert_eq!(seen.lock().len(), 1);
        assert!(recorder.lock().body().is_empty());
        let target = target.lock();
        assert_eq!(target.body(), b"downstream");
        assert_eq!(target.status(), StatusCode::ACCEPTED);
    }

    #[test]
    fn test_supplied_request_stays_on_context() {
        let (_recorder, seen) = with_context(|ctx| {
            let original_writer = ctx.writer().clone();
            let mut request = http::Request::builder()
                .uri("/rewritten")
                .body(bytes::Bytes::new())
                .unwrap();

            let continuation = Continuation::new(ctx);
            continuation.serve(original_writer, &mut request)?;
            assert!(continuation.replaced_request());

            assert_eq!(request.uri().path(), "/");
            assert_eq!(ctx.request().uri().path(), "/rewritten");
            Ok(())
        });

        assert_eq!(*seen.lock(), vec!["/rewritten".to_string()]);
    }

    #[test]
    fn test_handed_on_request_comes_back() {
        let (_recorder, seen) = with_context(|ctx| {
            let writer = ctx.writer().clone();
            let mut request = std::mem::take(ctx.request_mut());
            *request.uri_mut() = "/handed".parse().unwrap();

            let continuation = Continuation::with_origin(ctx, &request);
            continuation.serve(writer, &mut request)?;
            assert!(!continuation.replaced_request());

            assert_eq!(request.uri().path(), "/handed");
            Ok(())
        });

        assert_eq!(*seen.lock(), vec!["/handed".to_string()]);
    }

    #[test]
    fn test_serve_restores_previous_writer() {
        with_context(|ctx| {
            let before = ctx.writer().clone();
            let (_target, target_writer) = native();

            Continuation::new(ctx).serve(target_writer, &mut Request::default())?;

            assert!(ctx.writer().same_writer(&before));
            Ok(())
        });
    }

    #[test]
    fn test_second_serve_is_rejected() {
        let (_recorder, seen) = with_context(|ctx| {
            let writer = ctx.writer().clone();
            let continuation = Continuation::new(ctx);

            continuation.serve(writer.clone(), &mut Request::default())?;
            let err = continuation
                .serve(writer, &mut Request::default())
                .unwrap_err();

            assert!(matches!(err, SpliceError::ContinuationReused));
            assert!(continuation.advanced());
            Ok(())
        });

        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn test_unused_continuation_has_not_advanced() {
        let (_recorder, seen) = with_context(|ctx| {
            let continuation = Continuation::new(ctx);
            assert!(!continuation.advanced());
            Ok(())
        });

        assert!(seen.lock().is_empty());
    }
}
