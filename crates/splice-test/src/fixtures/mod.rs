//! Chained-handler middlewares and writers for exercising the adapter.
//!
//! # Example
//!
//! ```
//! use splice_core::HandlerMiddleware;
//! use splice_test::fixtures::{gzip, Probe, TokenGuard};
//!
//! fn assert_middleware<M: HandlerMiddleware>(_: &M) {}
//!
//! assert_middleware(&gzip);
//! assert_middleware(&Probe::new("outer"));
//! assert_middleware(&TokenGuard::new("s3cret"));
//! ```

mod failing;
mod gzip;
mod guard;
mod probe;

pub use failing::FailingWriter;
pub use gzip::{gzip, Gzip, GzipWriter};
pub use guard::TokenGuard;
pub use probe::{passthrough, repeat, EventLog, Probe, TagRequest};
