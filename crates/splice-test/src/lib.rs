//! # Splice Test
//!
//! Test utilities for Splice: an in-memory client that serves requests
//! through a [`Pipeline`](splice_middleware::Pipeline) without any network,
//! and a set of chained-handler [`fixtures`] (gzip, a token guard, probes)
//! to run through the adapter.
//!
//! ## Example
//!
//! ```
//! use http::StatusCode;
//! use splice_middleware::Pipeline;
//! use splice_test::TestClient;
//!
//! let pipeline = Pipeline::builder()
//!     .handler(|ctx| ctx.string(StatusCode::CREATED, "made"))
//!     .build();
//!
//! let response = TestClient::new(pipeline)
//!     .post("/things")
//!     .header("content-type", "text/plain")
//!     .body("thing")
//!     .send()
//!     .unwrap();
//!
//! response
//!     .assert_status(StatusCode::CREATED)
//!     .assert_header("content-type", "text/plain; charset=utf-8");
//! ```

#![doc(html_root_url = "https://docs.rs/splice-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
pub mod fixtures;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::TestRequestBuilder;
pub use response::TestResponse;
