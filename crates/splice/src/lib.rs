//! # Splice
//!
//! Runs chained-handler middleware (a function from "next handler" to
//! "handler") as a native stage of a context-threaded [`Pipeline`].
//!
//! The adapter is made of two pieces:
//!
//! - [`ResponseShim`]: the writer installed on the [`Context`] while the rest
//!   of the pipeline runs, forwarding body and status writes to whatever
//!   writer the middleware handed its inner handler.
//! - [`Continuation`]: the inner handler the middleware receives. Calling it
//!   resumes the pipeline with [`Context::next`].
//!
//! [`wrap`] ties them together. If the middleware never calls its inner
//! handler, the pipeline is aborted and nothing downstream runs.
//!
//! ## Example
//!
//! ```
//! use http::StatusCode;
//! use splice::{handler_fn, wrap, BoxHandler, Pipeline, Request, SharedWriter};
//!
//! /// Refuses requests without an `x-api-key` header.
//! fn require_key<'a>(next: BoxHandler<'a>) -> BoxHandler<'a> {
//!     Box::new(handler_fn(move |writer: SharedWriter, request: &mut Request| {
//!         if !request.headers().contains_key("x-api-key") {
//!             writer.write_status(StatusCode::UNAUTHORIZED)?;
//!             return Ok(());
//!         }
//!         next.serve(writer, request)
//!     }))
//! }
//!
//! let pipeline = Pipeline::builder()
//!     .stage(wrap(require_key))
//!     .handler(|ctx| ctx.string(StatusCode::OK, "welcome"))
//!     .build();
//!
//! let response = pipeline.serve(Request::default()).unwrap();
//! assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
//! assert!(response.body().is_empty());
//! ```

#![doc(html_root_url = "https://docs.rs/splice/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod continuation;
mod shim;
mod wrap;

pub use continuation::Continuation;
pub use shim::ResponseShim;
pub use wrap::{wrap, wrap_named, Outcome, Spliced};

pub use splice_core::{
    handler_fn, BoxHandler, Handler, HandlerFn, HandlerMiddleware, Request, Response,
    ResponseRecorder, ResponseWriter, SharedWriter, SpliceError, SpliceResult,
};
pub use splice_middleware::{
    BoxedMiddleware, Context, FnMiddleware, Middleware, Pipeline, PipelineBuilder, PipelineConfig,
};
