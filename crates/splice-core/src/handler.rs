//! The chained-handler convention.
//!
//! A [`Handler`] serves a request by writing to a [`SharedWriter`]. A
//! [`HandlerMiddleware`] takes the next handler and returns a new handler that
//! decides on its own whether, when and with which writer to call it.
//!
//! # Example
//!
//! ```
//! use splice_core::{handler_fn, BoxHandler, Handler, Request, SharedWriter};
//!
//! /// Adds a header, then always calls the next handler.
//! fn powered_by<'a>(next: BoxHandler<'a>) -> BoxHandler<'a> {
//!     Box::new(handler_fn(move |writer: SharedWriter, request: &mut Request| {
//!         writer.set_header(
//!             http::header::SERVER,
//!             http::HeaderValue::from_static("splice"),
//!         );
//!         next.serve(writer, request)
//!     }))
//! }
//! ```

use crate::error::SpliceResult;
use crate::types::Request;
use crate::writer::SharedWriter;

/// Something that can serve a request.
///
/// The writer is passed by value: a middleware may hand its inner handler the
/// writer it received, or a writer of its own that wraps it.
pub trait Handler {
    /// Serves the request, writing the response to `writer`.
    fn serve(&self, writer: SharedWriter, request: &mut Request) -> SpliceResult<()>;
}

/// A boxed handler borrowing from its environment for `'a`.
pub type BoxHandler<'a> = Box<dyn Handler + 'a>;

impl<H: Handler + ?Sized> Handler for &H {
    fn serve(&self, writer: SharedWriter, request: &mut Request) -> SpliceResult<()> {
        (**self).serve(writer, request)
    }
}

impl<H: Handler + ?Sized> Handler for Box<H> {
    fn serve(&self, writer: SharedWriter, request: &mut Request) -> SpliceResult<()> {
        (**self).serve(writer, request)
    }
}

/// A [`Handler`] backed by a closure. Created by [`handler_fn`].
#[derive(Clone, Copy)]
pub struct HandlerFn<F> {
    f: F,
}

/// Creates a [`Handler`] from a closure.
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(SharedWriter, &mut Request) -> SpliceResult<()>,
{
    HandlerFn { f }
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(SharedWriter, &mut Request) -> SpliceResult<()>,
{
    fn serve(&self, writer: SharedWriter, request: &mut Request) -> SpliceResult<()> {
        (self.f)(writer, request)
    }
}

/// A middleware in the chained-handler convention.
///
/// Given the next handler, returns the handler that runs the middleware's own
/// logic. Implemented for every function of the shape
/// `fn<'a>(BoxHandler<'a>) -> BoxHandler<'a>`.
pub trait HandlerMiddleware: Send + Sync + 'static {
    /// Wraps `next`, returning the handler to call instead.
    fn wrap<'a>(&'a self, next: BoxHandler<'a>) -> BoxHandler<'a>;
}

impl<F> HandlerMiddleware for F
where
    F: for<'a> Fn(BoxHandler<'a>) -> BoxHandler<'a> + Send + Sync + 'static,
{
    fn wrap<'a>(&'a self, next: BoxHandler<'a>) -> BoxHandler<'a> {
        self(next)
    }
}
