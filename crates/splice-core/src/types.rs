//! Common HTTP types used across Splice.

use bytes::Bytes;

/// The HTTP request type threaded through pipelines and handlers.
///
/// The body is fully buffered; Splice never parses or streams request bodies.
pub type Request = http::Request<Bytes>;

/// The HTTP response type produced by [`ResponseRecorder`](crate::ResponseRecorder).
pub type Response = http::Response<Bytes>;
