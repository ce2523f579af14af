//! Scripted backend for testing
//!
//! [`MockBackend`] implements [`HttpClient`] by matching the method and the
//! path (including the query string) of each request against scripted
//! replies, and records every request it sees. Unscripted routes answer
//! `404 Not Found`.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{ApiError, Result};
use crate::io::{HttpClient, HttpRequest, HttpResponse, Method};

type Route = (Method, String);

#[derive(Debug, Clone)]
enum Reply {
    Respond(HttpResponse),
    Fail(ApiError),
}

#[derive(Debug, Default)]
struct MockState {
    once: HashMap<Route, VecDeque<Reply>>,
    always: HashMap<Route, Reply>,
    requests: Vec<HttpRequest>,
    latency: Option<Duration>,
}

impl MockState {
    fn next_reply(&mut self, route: &Route) -> Reply {
        if let Some(reply) = self.once.get_mut(route).and_then(VecDeque::pop_front) {
            return reply;
        }
        self.always
            .get(route)
            .cloned()
            .unwrap_or_else(|| Reply::Respond(HttpResponse::empty(404, "Not Found")))
    }
}

/// In-memory stand-in for the scheduler backend
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Delay every reply, so concurrent callers overlap
    pub fn with_latency(self, latency: Duration) -> Self {
        self.lock().latency = Some(latency);
        self
    }

    /// Answer every request to the route with `response`
    pub fn respond(&self, method: Method, path: &str, response: HttpResponse) -> &Self {
        self.lock()
            .always
            .insert((method, path.to_string()), Reply::Respond(response));
        self
    }

    /// Answer every request to the route with a 200 JSON body
    pub fn respond_json(&self, method: Method, path: &str, body: &serde_json::Value) -> &Self {
        self.respond(method, path, HttpResponse::json(body.to_string()))
    }

    /// Answer the next request to the route with `response`, ahead of the
    /// standing reply
    pub fn respond_once(&self, method: Method, path: &str, response: HttpResponse) -> &Self {
        self.lock()
            .once
            .entry((method, path.to_string()))
            .or_default()
            .push_back(Reply::Respond(response));
        self
    }

    /// Fail every request to the route at the transport level
    pub fn fail(&self, method: Method, path: &str, error: ApiError) -> &Self {
        self.lock()
            .always
            .insert((method, path.to_string()), Reply::Fail(error));
        self
    }

    pub fn fail_once(&self, method: Method, path: &str, error: ApiError) -> &Self {
        self.lock()
            .once
            .entry((method, path.to_string()))
            .or_default()
            .push_back(Reply::Fail(error));
        self
    }

    /// Every request seen so far, oldest first
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.lock().requests.clone()
    }

    /// Number of requests seen for a route
    pub fn request_count(&self, method: Method, path: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == method && path_of(&r.url) == path)
            .count()
    }

    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }
}

/// Path and query of an absolute URL
fn path_of(url: &str) -> &str {
    let after_scheme = url.find("://").map(|i| &url[i + 3..]).unwrap_or(url);
    after_scheme
        .find('/')
        .map(|i| &after_scheme[i..])
        .unwrap_or("/")
}

#[async_trait]
impl HttpClient for MockBackend {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let route = (request.method, path_of(&request.url).to_string());
        debug!("Mock backend received {} {}", route.0, route.1);

        let (reply, latency) = {
            let mut state = self.lock();
            state.requests.push(request);
            (state.next_reply(&route), state.latency)
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        match reply {
            Reply::Respond(response) => Ok(response),
            Reply::Fail(error) => Err(error),
        }
    }
}
