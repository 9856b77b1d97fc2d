//! In-memory native writer.

use crate::types::Response;
use crate::writer::ResponseWriter;
use bytes::{Bytes, BytesMut};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use std::io;

/// A [`ResponseWriter`] that buffers the whole response in memory.
///
/// This is the writer a [`Pipeline`] installs on a fresh context when the
/// caller does not provide one. The status defaults to `200 OK`. Status
/// writes replace it until the first body write or flush commits the
/// response; status writes after that are ignored.
///
/// [`Pipeline`]: https://docs.rs/splice-middleware
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use splice_core::{ResponseRecorder, ResponseWriter};
///
/// let mut recorder = ResponseRecorder::new();
/// recorder.write_str("hello").unwrap();
///
/// let response = recorder.into_response();
/// assert_eq!(response.status(), StatusCode::OK);
/// assert_eq!(response.body().as_ref(), b"hello");
/// ```
#[derive(Debug, Default)]
pub struct ResponseRecorder {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
    committed: bool,
}

impl ResponseRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the body bytes recorded so far.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Consumes the recorder, producing the recorded response.
    #[must_use]
    pub fn into_response(self) -> Response {
        let mut response = http::Response::new(self.body.freeze());
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }

    /// Consumes the recorder, returning its raw parts.
    #[must_use]
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Bytes) {
        (self.status, self.headers, self.body.freeze())
    }
}

impl ResponseWriter for ResponseRecorder {
    fn status(&self) -> StatusCode {
        self.status
    }

    fn write_status(&mut self, status: StatusCode) -> io::Result<()> {
        if self.committed {
            tracing::warn!(
                committed = %self.status,
                requested = %status,
                "superfluous status write ignored"
            );
            return Ok(());
        }
        self.status = status;
        Ok(())
    }

    fn header(&self, name: &HeaderName) -> Option<HeaderValue> {
        self.headers.get(name).cloned()
    }

    fn headers(&self) -> HeaderMap {
        self.headers.clone()
    }

    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    fn append_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.append(name, value);
    }

    fn remove_header(&mut self, name: &HeaderName) -> Option<HeaderValue> {
        self.headers.remove(name)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.committed = true;
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn written(&self) -> bool {
        self.committed
    }

    fn size(&self) -> usize {
        self.body.len()
    }

    fn flush(&mut self) -> io::Result<()> {
        self.committed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header;

    #[test]
    fn test_defaults_to_ok() {
        let recorder = ResponseRecorder::new();
        assert_eq!(recorder.status(), StatusCode::OK);
        assert!(!recorder.written());
        assert_eq!(recorder.size(), 0);
    }

    #[test]
    fn test_last_status_before_body_wins() {
        let mut recorder = ResponseRecorder::new();
        recorder.write_status(StatusCode::OK).unwrap();
        recorder.write_status(StatusCode::NOT_FOUND).unwrap();

        assert_eq!(recorder.status(), StatusCode::NOT_FOUND);
        assert!(!recorder.written());

        recorder.write(b"gone").unwrap();
        recorder.write_status(StatusCode::OK).unwrap();

        assert!(recorder.written());
        assert_eq!(recorder.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_flush_commits_status() {
        let mut recorder = ResponseRecorder::new();
        recorder.write_status(StatusCode::NO_CONTENT).unwrap();
        recorder.flush().unwrap();
        recorder.write_status(StatusCode::OK).unwrap();

        assert!(recorder.written());
        assert_eq!(recorder.status(), StatusCode::NO_CONTENT);
        assert!(recorder.body().is_empty());
    }

    #[test]
    fn test_body_write_commits_status() {
        let mut recorder = ResponseRecorder::new();
        recorder.write(b"x").unwrap();
        recorder.write_status(StatusCode::CREATED).unwrap();

        assert!(recorder.written());
        assert_eq!(recorder.status(), StatusCode::OK);
    }

    #[test]
    fn test_write_str_matches_write() {
        let mut a = ResponseRecorder::new();
        let mut b = ResponseRecorder::new();
        a.write_str("héllo").unwrap();
        b.write("héllo".as_bytes()).unwrap();

        assert_eq!(a.body(), b.body());
    }

    #[test]
    fn test_into_response() {
        let mut recorder = ResponseRecorder::new();
        recorder.set_header(header::CONTENT_LENGTH, HeaderValue::from_static("2"));
        recorder.write_status(StatusCode::ACCEPTED).unwrap();
        recorder.write(b"ok").unwrap();

        let response = recorder.into_response();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "2");
        assert_eq!(response.body().as_ref(), b"ok");
    }
}
