// ABOUTME: Shared helpers for source integration tests: fixture loading and a scripted HttpClient.
// ABOUTME: Routes are matched in registration order; unmatched requests fail as transport errors.

#![allow(dead_code)]

use std::fs;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use scanlate_core::{HttpClient, Options, Request, Response, Result, SourceError};
use url::Url;

type Route = Box<dyn Fn(&Url) -> Option<(u16, String)> + Send + Sync>;

/// Load a fixture file from `tests/fixtures`.
pub fn fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path, e))
}

/// Fixed clock for relative dates.
pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()
}

pub fn options() -> Options {
    Options::builder().reference_time(reference_time()).build()
}

/// An HttpClient answering from registered routes and recording every request.
#[derive(Default)]
pub struct FakeHttp {
    routes: Vec<Route>,
    hits: Mutex<Vec<Request>>,
}

impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` exactly (query string included) with a 200.
    pub fn page(self, url: &str, body: impl Into<String>) -> Self {
        self.status(url, 200, body)
    }

    pub fn status(self, url: &str, status: u16, body: impl Into<String>) -> Self {
        let expected = Url::parse(url).expect("route url");
        let body = body.into();
        self.when(move |u| (*u == expected).then(|| (status, body.clone())))
    }

    /// Answer any URL with this path, whatever its query.
    pub fn path(self, path: &'static str, body: impl Into<String>) -> Self {
        let body = body.into();
        self.when(move |u| (u.path() == path).then(|| (200, body.clone())))
    }

    pub fn when<F>(mut self, route: F) -> Self
    where
        F: Fn(&Url) -> Option<(u16, String)> + Send + Sync + 'static,
    {
        self.routes.push(Box::new(route));
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn hits(&self) -> Vec<Request> {
        self.hits.lock().unwrap().clone()
    }

    pub fn hit_urls(&self) -> Vec<String> {
        self.hits().into_iter().map(|r| r.url).collect()
    }
}

impl HttpClient for FakeHttp {
    fn fetch(&self, request: &Request) -> Result<Response> {
        self.hits.lock().unwrap().push(request.clone());
        let url = Url::parse(&request.url)
            .map_err(|e| SourceError::invalid_url(request.url.clone(), "fetch", Some(e.into())))?;
        match self.routes.iter().find_map(|route| route(&url)) {
            Some((status, body)) => Ok(Response::new(status, request.url.clone(), body)),
            None => Err(SourceError::transport(
                request.url.clone(),
                "fetch",
                Some(anyhow::anyhow!("no route for {}", request.url)),
            )),
        }
    }
}

/// Value of query parameter `name`.
pub fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

/// The `json` input of the first call in a batched tRPC URL.
pub fn trpc_input(url: &Url) -> Option<serde_json::Value> {
    let raw = query_param(url, "input")?;
    let value: serde_json::Value = serde_json::from_str(&raw).ok()?;
    value.pointer("/0/json").cloned()
}

/// Wrap `payload` the way a batched tRPC response does.
pub fn trpc_response(payload: serde_json::Value) -> String {
    serde_json::json!([{ "result": { "data": { "json": payload } } }]).to_string()
}
