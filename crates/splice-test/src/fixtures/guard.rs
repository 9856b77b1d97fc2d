//! A CSRF-style token guard.

use http::header::CONTENT_TYPE;
use http::{HeaderName, HeaderValue, Method, StatusCode};
use splice_core::{handler_fn, BoxHandler, HandlerMiddleware, Request, SharedWriter};

/// Rejects unsafe requests that do not carry the expected token.
///
/// `GET`, `HEAD`, `OPTIONS` and `TRACE` always pass. Any other method must
/// send the token in the configured header, otherwise the guard answers
/// `403 Forbidden` itself and never calls its inner handler.
#[derive(Debug, Clone)]
pub struct TokenGuard {
    header: HeaderName,
    token: String,
}

impl TokenGuard {
    /// Default header carrying the token.
    pub const DEFAULT_HEADER: &'static str = "x-csrf-token";

    /// Creates a guard expecting `token` in the `x-csrf-token` header.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            header: HeaderName::from_static(Self::DEFAULT_HEADER),
            token: token.into(),
        }
    }

    /// Reads the token from `header` instead.
    #[must_use]
    pub fn with_header(mut self, header: HeaderName) -> Self {
        self.header = header;
        self
    }

    /// Returns true if the request may proceed.
    #[must_use]
    pub fn allows(&self, request: &Request) -> bool {
        if is_safe(request.method()) {
            return true;
        }
        request
            .headers()
            .get(&self.header)
            .is_some_and(|sent| constant_time_eq(sent.as_bytes(), self.token.as_bytes()))
    }
}

impl HandlerMiddleware for TokenGuard {
    fn wrap<'a>(&'a self, next: BoxHandler<'a>) -> BoxHandler<'a> {
        Box::new(handler_fn(move |writer: SharedWriter, request: &mut Request| {
            if self.allows(request) {
                return next.serve(writer, request);
            }

            tracing::debug!(
                method = %request.method(),
                path = %request.uri().path(),
                "rejecting request without a valid token"
            );
            writer.set_header(
                CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            );
            writer.write_status(StatusCode::FORBIDDEN)?;
            writer.write_str("invalid token")?;
            Ok(())
        }))
    }
}

fn is_safe(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use splice_core::{Handler, ResponseRecorder, ResponseWriter};
    use std::cell::Cell;

    fn request(method: Method, token: Option<&'static str>) -> Request {
        let mut builder = http::Request::builder().method(method).uri("/form");
        if let Some(token) = token {
            builder = builder.header(TokenGuard::DEFAULT_HEADER, token);
        }
        builder.body(Bytes::new()).unwrap()
    }

    #[test]
    fn test_allows() {
        let guard = TokenGuard::new("s3cret");

        assert!(guard.allows(&request(Method::GET, None)));
        assert!(guard.allows(&request(Method::POST, Some("s3cret"))));
        assert!(!guard.allows(&request(Method::POST, None)));
        assert!(!guard.allows(&request(Method::DELETE, Some("wrong"))));
        assert!(!guard.allows(&request(Method::PUT, Some("s3cre"))));
    }

    #[test]
    fn test_custom_header() {
        let guard = TokenGuard::new("t").with_header(HeaderName::from_static("x-other"));
        let mut req = request(Method::POST, Some("t"));
        assert!(!guard.allows(&req));

        req.headers_mut()
            .insert("x-other", HeaderValue::from_static("t"));
        assert!(guard.allows(&req));
    }

    #[test]
    fn test_rejection_never_calls_next() {
        let calls = Cell::new(0);
        let inner = handler_fn(|_w: SharedWriter, _r: &mut Request| {
            calls.set(calls.get() + 1);
            Ok(())
        });
        let guard = TokenGuard::new("s3cret");
        let writer = SharedWriter::new(ResponseRecorder::new());

        guard
            .wrap(Box::new(&inner))
            .serve(writer.clone(), &mut request(Method::POST, None))
            .unwrap();

        assert_eq!(calls.get(), 0);
        assert_eq!(writer.lock().status(), StatusCode::FORBIDDEN);
        assert_eq!(writer.size(), "invalid token".len());
    }
}
