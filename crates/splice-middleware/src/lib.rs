//! # Splice Middleware
//!
//! The context-threaded middleware pipeline Splice adapts into.
//!
//! Every stage receives the same mutable [`Context`] for the lifetime of a
//! request. A stage advances the pipeline explicitly with [`Context::next`],
//! which runs every remaining stage (and the final handler) before returning,
//! so the stage can keep working on the way back out. A stage answering the
//! request on its own calls [`Context::abort`].
//!
//! ## Example
//!
//! ```
//! use http::StatusCode;
//! use splice_core::Request;
//! use splice_middleware::{FnMiddleware, Pipeline};
//!
//! let pipeline = Pipeline::builder()
//!     .stage(FnMiddleware::new("deny_delete", |ctx| {
//!         if ctx.request().method() == http::Method::DELETE {
//!             ctx.abort_with_status(StatusCode::METHOD_NOT_ALLOWED)?;
//!         }
//!         Ok(())
//!     }))
//!     .handler(|ctx| ctx.string(StatusCode::OK, "hello"))
//!     .build();
//!
//! let mut request = Request::default();
//! *request.method_mut() = http::Method::DELETE;
//!
//! let response = pipeline.serve(request).unwrap();
//! assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
//! assert!(response.body().is_empty());
//! ```

#![doc(html_root_url = "https://docs.rs/splice-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod middleware;
pub mod pipeline;

pub use context::{BoxedMiddleware, Context};
pub use middleware::{FnMiddleware, Middleware};
pub use pipeline::{Pipeline, PipelineBuilder, PipelineConfig};
