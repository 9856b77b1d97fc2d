//! A native writer with a broken sink.

use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use splice_core::ResponseWriter;
use std::io;

/// A writer standing in for a closed connection.
///
/// [`FailingWriter::new`] fails every status and body write with
/// `BrokenPipe`. [`FailingWriter::accepting`] accepts status writes and at
/// most `limit` bytes per body write, reporting short writes.
/// Headers are kept in memory either way.
#[derive(Debug, Default)]
pub struct FailingWriter {
    limit: Option<usize>,
    status: Option<StatusCode>,
    headers: HeaderMap,
    size: usize,
}

impl FailingWriter {
    /// Creates a writer whose writes always fail.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer accepting at most `limit` bytes per write.
    #[must_use]
    pub fn accepting(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    fn broken() -> io::Error {
        io::Error::new(io::ErrorKind::BrokenPipe, "connection closed")
    }
}

impl ResponseWriter for FailingWriter {
    fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    fn write_status(&mut self, status: StatusCode) -> io::Result<()> {
        if self.limit.is_none() {
            return Err(Self::broken());
        }
        if self.size == 0 {
            self.status = Some(status);
        }
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
        let limit = self.limit.ok_or_else(Self::broken)?;
        let accepted = buf.len().min(limit);
        self.size += accepted;
        Ok(accepted)
    }

    fn written(&self) -> bool {
        self.size > 0
    }

    fn size(&self) -> usize {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_failing() {
        let mut writer = FailingWriter::new();
        assert_eq!(
            writer.write(b"x").unwrap_err().kind(),
            io::ErrorKind::BrokenPipe
        );
        assert!(writer.write_status(StatusCode::OK).is_err());
        assert!(!writer.written());
    }

    #[test]
    fn test_short_writes() {
        let mut writer = FailingWriter::accepting(3);
        writer.write_status(StatusCode::ACCEPTED).unwrap();
        assert!(!writer.written());
        assert_eq!(writer.write(b"abcdef").unwrap(), 3);
        assert_eq!(writer.write(b"ab").unwrap(), 2);
        assert_eq!(writer.size(), 5);
        assert!(writer.written());

        writer.write_status(StatusCode::OK).unwrap();
        assert_eq!(writer.status(), StatusCode::ACCEPTED);
    }
}
