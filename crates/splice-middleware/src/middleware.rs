//! Core middleware trait and types.
//!
//! A [`Middleware`] is one stage of a [`Pipeline`](crate::Pipeline). It
//! receives the mutable [`Context`], may call [`Context::next`] to run the
//! remaining stages, and may keep working after `next` returns.
//!
//! # Example
//!
//! ```
//! use splice_core::SpliceResult;
//! use splice_middleware::{Context, Middleware};
//!
//! struct Timing;
//!
//! impl Middleware for Timing {
//!     fn name(&self) -> &'static str {
//!         "timing"
//!     }
//!
//!     fn handle(&self, ctx: &mut Context) -> SpliceResult<()> {
//!         ctx.next()?;
//!         tracing::info!(elapsed_ms = ctx.elapsed().as_millis() as u64, "request served");
//!         Ok(())
//!     }
//! }
//! ```

use crate::context::Context;
use splice_core::SpliceResult;

/// The core middleware trait.
///
/// # Invariants
///
/// - A stage that wants downstream stages to run before it finishes calls
///   `ctx.next()`; otherwise they run after it returns.
/// - A stage that answers the request itself calls `ctx.abort()` so nothing
///   downstream writes a second response.
/// - Errors from `ctx.next()` are downstream errors and should be returned,
///   not suppressed.
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this stage, used for logging.
    fn name(&self) -> &'static str;

    /// Processes the request at this stage.
    fn handle(&self, ctx: &mut Context) -> SpliceResult<()>;
}

/// A middleware that can be created from a closure.
///
/// # Example
///
/// ```
/// use splice_middleware::FnMiddleware;
///
/// let hello = FnMiddleware::new("hello", |ctx| {
///     ctx.string(http::StatusCode::OK, "hello")
/// });
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F>
where
    F: Fn(&mut Context) -> SpliceResult<()> + Send + Sync + 'static,
{
    /// Creates a new function-based middleware.
    pub fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&mut Context) -> SpliceResult<()> + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn handle(&self, ctx: &mut Context) -> SpliceResult<()> {
        (self.func)(ctx)
    }
}
