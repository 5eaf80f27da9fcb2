//! Ambient dependencies handed to effect producers.
//!
//! The machine core never calls any of these. A "world" value bundling them
//! is given to each producer when its effect starts, so tests can swap in
//! [`FixedClock`], [`StubHttpClient`] and a paused tokio clock.

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Source of the current date.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock that counts its reads.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
    reads: AtomicUsize,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    /// Number of times [`Clock::now`] has been called.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        *self.now.lock()
    }
}

/// Delay primitive.
pub trait Scheduler: Send + Sync {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// Scheduler backed by `tokio::time`.
///
/// Under `tokio::time::pause` this becomes a virtual clock advanced by the
/// test.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Worlds that can provide a scheduler.
///
/// Needed by [`Effect::delayed`](crate::effects::Effect::delayed) and the
/// time travel wrapper.
pub trait Scheduling {
    fn scheduler(&self) -> Arc<dyn Scheduler>;
}

impl Scheduling for Arc<dyn Scheduler> {
    fn scheduler(&self) -> Arc<dyn Scheduler> {
        Arc::clone(self)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// Turn non-2xx statuses into [`HttpError::Status`].
    pub fn error_for_status(self) -> Result<Self, HttpError> {
        if (200..300).contains(&self.status) {
            Ok(self)
        } else {
            Err(HttpError::Status(self.status))
        }
    }
}

/// Errors raised by HTTP clients.
///
/// These never reach a machine: producers convert them into inputs.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HttpError {
    #[error("Transport failed: {0}")]
    Transport(String),

    #[error("Unexpected status {0}")]
    Status(u16),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// Network client supplied by the embedding environment.
pub trait HttpClient: Send + Sync {
    fn send(&self, request: HttpRequest) -> BoxFuture<'static, Result<HttpResponse, HttpError>>;
}

/// Canned HTTP client recording every request.
///
/// Unknown URLs fail with `404`.
#[derive(Debug, Default)]
pub struct StubHttpClient {
    routes: Mutex<HashMap<String, Result<HttpResponse, HttpError>>>,
    calls: Mutex<Vec<HttpRequest>>,
    latency: Duration,
}

impl StubHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every response by `latency` (tokio time).
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn respond(&self, url: impl Into<String>, response: HttpResponse) {
        self.routes.lock().insert(url.into(), Ok(response));
    }

    pub fn fail(&self, url: impl Into<String>, error: HttpError) {
        self.routes.lock().insert(url.into(), Err(error));
    }

    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.calls.lock().iter().filter(|r| r.url == url).count()
    }
}

impl HttpClient for StubHttpClient {
    fn send(&self, request: HttpRequest) -> BoxFuture<'static, Result<HttpResponse, HttpError>> {
        let result = self
            .routes
            .lock()
            .get(&request.url)
            .cloned()
            .unwrap_or(Err(HttpError::Status(404)));
        self.calls.lock().push(request);

        let latency = self.latency;
        Box::pin(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_counts_reads() {
        let start = Utc::now();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);
        clock.advance(chrono::Duration::seconds(2));
        assert_eq!(clock.now(), start + chrono::Duration::seconds(2));
        assert_eq!(clock.reads(), 2);
    }

    #[test]
    fn error_for_status_rejects_failures() {
        assert!(HttpResponse::ok("x").error_for_status().is_ok());
        let forbidden = HttpResponse {
            status: 403,
            body: Vec::new(),
        };
        assert_eq!(forbidden.error_for_status(), Err(HttpError::Status(403)));
    }

    #[tokio::test]
    async fn stub_client_replays_routes_and_records_calls() {
        let client = StubHttpClient::new();
        client.respond("https://a", HttpResponse::ok("hello"));

        let ok = client.send(HttpRequest::get("https://a")).await;
        let missing = client.send(HttpRequest::get("https://b")).await;

        assert_eq!(ok.map(|r| r.body), Ok(b"hello".to_vec()));
        assert_eq!(missing, Err(HttpError::Status(404)));
        assert_eq!(client.call_count("https://a"), 1);
        assert_eq!(client.calls().len(), 2);
    }
}
