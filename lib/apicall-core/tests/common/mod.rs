#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use apicall_core::{ComposedRequest, RawResponse, Transport, TransportFuture};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, StatusCode};

/// A scripted response, served after an optional delay.
#[derive(Debug, Clone)]
pub struct Scripted {
    pub delay: Duration,
    pub status: StatusCode,
    pub content_type: Option<&'static str>,
    pub body: String,
}

impl Scripted {
    pub fn json(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            delay: Duration::ZERO,
            status,
            content_type: Some("application/json"),
            body: body.into(),
        }
    }

    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            content_type: Some("text/plain; charset=utf-8"),
            ..Self::json(status, body)
        }
    }

    pub fn delayed(self, delay: Duration) -> Self {
        Self { delay, ..self }
    }

    fn into_response(self) -> RawResponse {
        let mut headers = HeaderMap::new();
        if let Some(content_type) = self.content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        RawResponse::new(self.status, headers, self.body)
    }
}

#[derive(Debug, Default)]
struct Recorder {
    requests: Mutex<Vec<ComposedRequest>>,
    script: Mutex<VecDeque<Scripted>>,
    completed: AtomicUsize,
    aborted: AtomicUsize,
}

/// In-memory transport: records every request and replays scripted responses.
///
/// Without script, answers `200` with a `null` JSON body.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    recorder: Arc<Recorder>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, scripted: Scripted) -> Self {
        self.recorder
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(scripted);
        self
    }

    pub fn requests(&self) -> Vec<ComposedRequest> {
        self.recorder
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn calls(&self) -> usize {
        self.requests().len()
    }

    /// Exchanges that ran to completion.
    pub fn completed(&self) -> usize {
        self.recorder.completed.load(Ordering::SeqCst)
    }

    /// Exchanges dropped before completion.
    pub fn aborted(&self) -> usize {
        self.recorder.aborted.load(Ordering::SeqCst)
    }
}

struct ExchangeGuard {
    recorder: Arc<Recorder>,
    done: bool,
}

impl Drop for ExchangeGuard {
    fn drop(&mut self) {
        let counter = if self.done {
            &self.recorder.completed
        } else {
            &self.recorder.aborted
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

impl Transport for MockTransport {
    fn send(&self, request: ComposedRequest) -> TransportFuture {
        self.recorder
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        let scripted = self
            .recorder
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Scripted::json(StatusCode::OK, "null"));

        let mut guard = ExchangeGuard {
            recorder: Arc::clone(&self.recorder),
            done: false,
        };
        Box::pin(async move {
            if !scripted.delay.is_zero() {
                tokio::time::sleep(scripted.delay).await;
            }
            guard.done = true;
            Ok(scripted.into_response())
        })
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
