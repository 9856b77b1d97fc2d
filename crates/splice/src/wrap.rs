//! Turning a chained-handler middleware into a pipeline stage.

use crate::continuation::Continuation;
use splice_core::{HandlerMiddleware, SpliceResult};
use splice_middleware::{Context, Middleware};

/// How a wrapped middleware finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The middleware called its inner handler; the rest of the pipeline ran
    /// inside it.
    Advanced,

    /// The middleware returned without calling its inner handler. The
    /// pipeline has been aborted.
    ShortCircuited,
}

/// A chained-handler middleware adapted into a pipeline [`Middleware`].
///
/// Created by [`wrap`] or [`wrap_named`].
pub struct Spliced<M> {
    name: &'static str,
    middleware: M,
}

/// Adapts a chained-handler middleware into a pipeline stage.
///
/// The stage is named after the middleware's type.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use splice::{wrap, BoxHandler, Pipeline, Request};
///
/// fn identity<'a>(next: BoxHandler<'a>) -> BoxHandler<'a> {
///     next
/// }
///
/// let pipeline = Pipeline::builder()
///     .stage(wrap(identity))
///     .handler(|ctx| ctx.string(StatusCode::OK, "through"))
///     .build();
///
/// let response = pipeline.serve(Request::default()).unwrap();
/// assert_eq!(response.body().as_ref(), b"through");
/// ```
#[must_use]
pub fn wrap<M: HandlerMiddleware>(middleware: M) -> Spliced<M> {
    wrap_named(std::any::type_name::<M>(), middleware)
}

/// Adapts a chained-handler middleware into a pipeline stage with the given
/// stage name.
#[must_use]
pub fn wrap_named<M: HandlerMiddleware>(name: &'static str, middleware: M) -> Spliced<M> {
    Spliced { name, middleware }
}

impl<M: HandlerMiddleware> Spliced<M> {
    /// Returns the wrapped middleware.
    #[must_use]
    pub fn middleware(&self) -> &M {
        &self.middleware
    }

    /// Runs the middleware against the context and reports whether it
    /// advanced the pipeline.
    ///
    /// The middleware is called with the context's current writer and
    /// request. If it never calls its inner handler, the context is aborted
    /// so no later stage runs, even when the middleware returned an error.
    /// If it called its inner handler with a request of its own, that request
    /// stays on the context.
    pub fn run(&self, ctx: &mut Context) -> SpliceResult<Outcome> {
        let writer = ctx.writer().clone();
        let mut request = std::mem::take(ctx.request_mut());

        let continuation = Continuation::with_origin(ctx, &request);
        let result = self
            .middleware
            .wrap(Box::new(&continuation))
            .serve(writer, &mut request);
        let advanced = continuation.advanced();

        if !continuation.replaced_request() {
            *ctx.request_mut() = request;
        }

        let outcome = if advanced {
            Outcome::Advanced
        } else {
            tracing::debug!(
                stage = self.name,
                request_id = %ctx.request_id(),
                "middleware did not call its inner handler"
            );
            ctx.abort();
            Outcome::ShortCircuited
        };

        if let Err(error) = &result {
            tracing::debug!(stage = self.name, %error, "wrapped middleware failed");
        }
        result.map(|()| outcome)
    }
}

impl<M: HandlerMiddleware> Middleware for Spliced<M> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn handle(&self, ctx: &mut Context) -> SpliceResult<()> {
        self.run(ctx).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use splice_core::{
        handler_fn, BoxHandler, Handler, Request, ResponseRecorder, SharedWriter, SpliceError,
    };
    use splice_middleware::Pipeline;

    fn identity<'a>(next: BoxHandler<'a>) -> BoxHandler<'a> {
        next
    }

    fn refuse<'a>(_next: BoxHandler<'a>) -> BoxHandler<'a> {
        Box::new(handler_fn(|writer: SharedWriter, _request: &mut Request| {
            writer.write_status(StatusCode::FORBIDDEN)?;
            Ok(())
        }))
    }

    fn fail_before_next<'a>(_next: BoxHandler<'a>) -> BoxHandler<'a> {
        Box::new(handler_fn(|_writer: SharedWriter, _request: &mut Request| {
            Err(SpliceError::handler("refused"))
        }))
    }

    fn replace_request<'a>(next: BoxHandler<'a>) -> BoxHandler<'a> {
        Box::new(handler_fn(move |writer: SharedWriter, _request: &mut Request| {
            let mut replaced = Request::default();
            *replaced.uri_mut() = "/replaced".parse().unwrap();
            next.serve(writer, &mut replaced)
        }))
    }

    fn context() -> Context {
        Context::new(Request::default(), SharedWriter::new(ResponseRecorder::new()))
    }

    #[test]
    fn test_default_name_is_type_name() {
        let stage = wrap(identity);
        assert!(stage.name().ends_with("identity"));
        assert_eq!(wrap_named("gzip", identity).name(), "gzip");
    }

    #[test]
    fn test_run_reports_advanced() {
        let mut ctx = context();
        assert_eq!(wrap(identity).run(&mut ctx).unwrap(), Outcome::Advanced);
        assert!(!ctx.is_aborted());
    }

    #[test]
    fn test_run_reports_short_circuit_and_aborts() {
        let mut ctx = context();
        assert_eq!(wrap(refuse).run(&mut ctx).unwrap(), Outcome::ShortCircuited);
        assert!(ctx.is_aborted());
        assert_eq!(ctx.writer().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_error_without_next_still_aborts() {
        let mut ctx = context();
        let err = wrap(fail_before_next).run(&mut ctx).unwrap_err();

        assert_eq!(err.to_string(), "Handler error: refused");
        assert!(ctx.is_aborted());
    }

    #[test]
    fn test_request_is_returned_to_context() {
        let mut request = Request::default();
        *request.uri_mut() = "/kept".parse().unwrap();
        let mut ctx = Context::new(request, SharedWriter::new(ResponseRecorder::new()));

        wrap(refuse).run(&mut ctx).unwrap();
        assert_eq!(ctx.request().uri().path(), "/kept");
    }

    #[test]
    fn test_replaced_request_stays_on_context() {
        let mut request = Request::default();
        *request.uri_mut() = "/orig".parse().unwrap();
        let mut ctx = Context::new(request, SharedWriter::new(ResponseRecorder::new()));

        assert_eq!(wrap(replace_request).run(&mut ctx).unwrap(), Outcome::Advanced);
        assert_eq!(ctx.request().uri().path(), "/replaced");
    }

    #[test]
    fn test_stage_in_pipeline() {
        let pipeline = Pipeline::builder()
            .stage(wrap(refuse))
            .handler(|ctx| ctx.string(StatusCode::OK, "unreachable"))
            .build();

        let response = pipeline.serve(Request::default()).unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_middleware_accessor() {
        let stage = wrap(identity);
        let inner = handler_fn(|_w: SharedWriter, _r: &mut Request| Ok(()));
        stage
            .middleware()
            .wrap(Box::new(&inner))
            .serve(SharedWriter::new(ResponseRecorder::new()), &mut Request::default())
            .unwrap();
    }
}
