//! Small chained-handler middlewares for observing the adapter.

use parking_lot::Mutex;
use splice_core::{handler_fn, BoxHandler, HandlerMiddleware, Request, SharedWriter};
use std::sync::Arc;

/// A shared, ordered log of probe events.
pub type EventLog = Arc<Mutex<Vec<String>>>;

/// Calls its inner handler with the writer and request it received.
pub fn passthrough<'a>(next: BoxHandler<'a>) -> BoxHandler<'a> {
    Box::new(handler_fn(move |writer: SharedWriter, request: &mut Request| {
        next.serve(writer, request)
    }))
}

/// Calls its inner handler twice. The second call is a misuse.
pub fn repeat<'a>(next: BoxHandler<'a>) -> BoxHandler<'a> {
    Box::new(handler_fn(move |writer: SharedWriter, request: &mut Request| {
        next.serve(writer.clone(), request)?;
        next.serve(writer, request)
    }))
}

/// Records `"<label>:before"` and `"<label>:after"` around its inner handler.
#[derive(Debug, Clone)]
pub struct Probe {
    label: &'static str,
    log: EventLog,
}

impl Probe {
    /// Creates a probe with its own log.
    #[must_use]
    pub fn new(label: &'static str) -> Self {
        Self::shared(label, &EventLog::default())
    }

    /// Creates a probe appending to `log`.
    #[must_use]
    pub fn shared(label: &'static str, log: &EventLog) -> Self {
        Self {
            label,
            log: Arc::clone(log),
        }
    }

    /// Returns the log this probe appends to.
    #[must_use]
    pub fn log(&self) -> EventLog {
        Arc::clone(&self.log)
    }

    /// Returns a snapshot of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    fn record(&self, event: &str) {
        self.log.lock().push(format!("{}:{event}", self.label));
    }
}

impl HandlerMiddleware for Probe {
    fn wrap<'a>(&'a self, next: BoxHandler<'a>) -> BoxHandler<'a> {
        Box::new(handler_fn(move |writer: SharedWriter, request: &mut Request| {
            self.record("before");
            let result = next.serve(writer, request);
            self.record("after");
            result
        }))
    }
}

/// Inserts a clone of its value into the request extensions before calling
/// its inner handler.
#[derive(Debug, Clone)]
pub struct TagRequest<T> {
    value: T,
}

impl<T> TagRequest<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a middleware tagging every request with `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T> HandlerMiddleware for TagRequest<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn wrap<'a>(&'a self, next: BoxHandler<'a>) -> BoxHandler<'a> {
        Box::new(handler_fn(move |writer: SharedWriter, request: &mut Request| {
            request.extensions_mut().insert(self.value.clone());
            next.serve(writer, request)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splice_core::{Handler, ResponseRecorder};

    #[derive(Debug, Clone, PartialEq)]
    struct Tenant(&'static str);

    #[test]
    fn test_probe_records_around_next() {
        let probe = Probe::new("outer");
        let log = probe.log();
        let inner = handler_fn(|_w: SharedWriter, _r: &mut Request| {
            log.lock().push("inner".to_string());
            Ok(())
        });

        probe
            .wrap(Box::new(&inner))
            .serve(SharedWriter::new(ResponseRecorder::new()), &mut Request::default())
            .unwrap();

        assert_eq!(probe.events(), vec!["outer:before", "inner", "outer:after"]);
    }

    #[test]
    fn test_tag_request_inserts_extension() {
        let tag = TagRequest::new(Tenant("acme"));
        let inner = handler_fn(|_w: SharedWriter, r: &mut Request| {
            assert_eq!(r.extensions().get::<Tenant>(), Some(&Tenant("acme")));
            Ok(())
        });

        tag.wrap(Box::new(&inner))
            .serve(SharedWriter::new(ResponseRecorder::new()), &mut Request::default())
            .unwrap();
    }

    #[test]
    fn test_repeat_calls_twice() {
        let calls = std::cell::Cell::new(0);
        let inner = handler_fn(|_w: SharedWriter, _r: &mut Request| {
            calls.set(calls.get() + 1);
            Ok(())
        });

        repeat(Box::new(&inner))
            .serve(SharedWriter::new(ResponseRecorder::new()), &mut Request::default())
            .unwrap();

        assert_eq!(calls.get(), 2);
    }
}
