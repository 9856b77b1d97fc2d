//! # Splice Core
//!
//! Core types shared by every Splice crate:
//!
//! - [`ResponseWriter`] / [`SharedWriter`] - the response writer capability set
//! - [`ResponseRecorder`] - the in-memory native writer
//! - [`Handler`] / [`HandlerMiddleware`] - the chained-handler convention
//! - [`SpliceError`] - the error type propagated through pipelines and adapters

#![doc(html_root_url = "https://docs.rs/splice-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod handler;
mod recorder;
mod types;
pub mod writer;

pub use error::{SpliceError, SpliceResult};
pub use handler::{handler_fn, BoxHandler, Handler, HandlerFn, HandlerMiddleware};
pub use recorder::ResponseRecorder;
pub use types::{Request, Response};
pub use writer::{ResponseWriter, SharedWriter};
