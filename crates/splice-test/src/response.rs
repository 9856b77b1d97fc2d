//! Test response wrapper.

use crate::error::TestError;
use bytes::Bytes;
use flate2::read::GzDecoder;
use http::{header, HeaderMap, HeaderValue, StatusCode};
use splice_core::Response;
use std::io::Read;

/// A recorded response with helper methods for assertions.
#[derive(Debug)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// Creates a test response from raw parts.
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Creates a test response from a recorded pipeline response.
    #[must_use]
    pub fn from_response(response: Response) -> Self {
        let (parts, body) = response.into_parts();
        Self::new(parts.status, parts.headers, body)
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns a reference to the headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Gets a header value by name.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>) -> Option<&HeaderValue> {
        self.headers.get(name.as_ref())
    }

    /// Gets a header value as a string.
    #[must_use]
    pub fn header_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.header(name).and_then(|v| v.to_str().ok())
    }

    /// Returns every value of a header, in insertion order.
    #[must_use]
    pub fn header_all(&self, name: impl AsRef<str>) -> Vec<&str> {
        self.headers
            .get_all(name.as_ref())
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Returns the Content-Length header value.
    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        self.header_str(header::CONTENT_LENGTH.as_str())
            .and_then(|v| v.parse().ok())
    }

    /// Returns the raw body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as a string.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| TestError::BodyRead(format!("Invalid UTF-8: {e}")))
    }

    /// Decompresses a gzip-encoded body.
    pub fn gunzip(&self) -> Result<Vec<u8>, TestError> {
        let mut decoded = Vec::new();
        GzDecoder::new(self.body.as_ref())
            .read_to_end(&mut decoded)
            .map_err(TestError::Decompress)?;
        Ok(decoded)
    }

    /// Asserts that the status code equals the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status, expected,
            "Expected status {}, got {}",
            expected, self.status
        );
        self
    }

    /// Asserts that a header exists with the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the header doesn't exist or doesn't match.
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        let expected = expected.as_ref();
        let actual = self.header_str(name);
        assert_eq!(
            actual,
            Some(expected),
            "Expected header {name} = {expected:?}, got {actual:?}"
        );
        self
    }

    /// Asserts that a header is absent.
    ///
    /// # Panics
    ///
    /// Panics if the header exists.
    pub fn assert_no_header(&self, name: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        assert!(
            self.header(name).is_none(),
            "Expected no {name} header, got {:?}",
            self.header(name)
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn response(body: &'static [u8]) -> TestResponse {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("5"));
        headers.append(header::VARY, HeaderValue::from_static("Accept-Encoding"));
        headers.append(header::VARY, HeaderValue::from_static("Cookie"));
        TestResponse::new(StatusCode::OK, headers, Bytes::from_static(body))
    }

    #[test]
    fn test_accessors() {
        let response = response(b"hello");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.content_length(), Some(5));
        assert_eq!(response.text().unwrap(), "hello");
        assert_eq!(response.header_all("vary"), vec!["Accept-Encoding", "Cookie"]);
        response
            .assert_status(StatusCode::OK)
            .assert_header("content-length", "5")
            .assert_no_header("content-encoding");
    }

    #[test]
    fn test_text_rejects_invalid_utf8() {
        assert!(matches!(response(&[0xff, 0xfe]).text(), Err(TestError::BodyRead(_))));
    }

    #[test]
    fn test_gunzip() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"compressed").unwrap();
        let body = encoder.finish().unwrap();

        let response = TestResponse::new(StatusCode::OK, HeaderMap::new(), Bytes::from(body));
        assert_eq!(response.gunzip().unwrap(), b"compressed");
        assert!(matches!(
            TestResponse::new(StatusCode::OK, HeaderMap::new(), Bytes::from_static(b"plain"))
                .gunzip(),
            Err(TestError::Decompress(_))
        ));
    }

    #[test]
    #[should_panic(expected = "Expected status")]
    fn test_assert_status_panics() {
        response(b"x").assert_status(StatusCode::NOT_FOUND);
    }
}
