//! Test client for in-memory pipeline testing.

use crate::error::TestError;
use crate::request::TestRequestBuilder;
use crate::response::TestResponse;
use bytes::Bytes;
use http::Method;
use splice_middleware::Pipeline;

/// A test client that serves requests through a [`Pipeline`] in memory.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use splice_middleware::Pipeline;
/// use splice_test::TestClient;
///
/// let pipeline = Pipeline::builder()
///     .handler(|ctx| ctx.string(StatusCode::OK, "pong"))
///     .build();
///
/// let client = TestClient::new(pipeline);
/// let response = client.get("/ping").send().unwrap();
/// assert_eq!(response.status(), StatusCode::OK);
/// assert_eq!(response.text().unwrap(), "pong");
/// ```
#[must_use]
pub struct TestClient {
    pipeline: Pipeline,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a test client serving through `pipeline`.
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            default_headers: Vec::new(),
        }
    }

    /// Adds a default header that will be included in all requests.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Returns the pipeline requests are served through.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Creates a GET request builder.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Creates a POST request builder.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Creates a request builder with a custom method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequestBuilder::new(method, uri))
    }
}

/// A request builder bound to a test client.
#[must_use]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl<'a> TestClientRequest<'a> {
    fn new(client: &'a TestClient, builder: TestRequestBuilder) -> Self {
        let builder = client
            .default_headers
            .iter()
            .fold(builder, |builder, (name, value)| builder.header(name, value));
        Self { client, builder }
    }

    /// Sets a header on the request.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Serves the request through the pipeline and returns the recorded
    /// response.
    pub fn send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        let response = self.client.pipeline.serve(request)?;
        Ok(TestResponse::from_response(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use splice_core::SpliceError;

    fn echo() -> Pipeline {
        Pipeline::builder()
            .handler(|ctx| {
                let request = ctx.request();
                let body = format!(
                    "{} {} {}",
                    request.method(),
                    request.uri().path(),
                    String::from_utf8_lossy(request.body())
                );
                ctx.string(StatusCode::OK, &body)
            })
            .build()
    }

    #[test]
    fn test_get() {
        let client = TestClient::new(echo());
        let response = client.get("/a").send().unwrap();
        assert_eq!(response.text().unwrap(), "GET /a ");
    }

    #[test]
    fn test_post_with_body() {
        let client = TestClient::new(echo());
        let response = client.post("/b").body("payload").send().unwrap();
        assert_eq!(response.text().unwrap(), "POST /b payload");
    }

    #[test]
    fn test_default_headers() {
        let pipeline = Pipeline::builder()
            .handler(|ctx| {
                let token = ctx
                    .request()
                    .headers()
                    .get("x-token")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("none")
                    .to_string();
                ctx.string(StatusCode::OK, &token)
            })
            .build();

        let client = TestClient::new(pipeline).with_default_header("X-Token", "abc");
        assert_eq!(client.get("/").send().unwrap().text().unwrap(), "abc");
    }

    #[test]
    fn test_pipeline_error_is_returned() {
        let pipeline = Pipeline::builder()
            .handler(|_ctx| Err(SpliceError::handler("boom")))
            .build();

        let err = TestClient::new(pipeline).get("/").send().unwrap_err();
        assert!(matches!(err, TestError::Processing(_)));
    }

    #[test]
    fn test_invalid_header_is_returned() {
        let err = TestClient::new(echo())
            .get("/")
            .header("bad header", "x")
            .send()
            .unwrap_err();
        assert!(matches!(err, TestError::InvalidHeader(_)));
    }
}
