// ABOUTME: SourceClient binds a host HttpClient to one site: base URL, default headers and options.
// ABOUTME: Every request a source makes goes through get/document/json so statuses are checked uniformly.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use crate::document::HtmlDocument;
use crate::error::Result;
use crate::http::{HttpClient, Request, Response};
use crate::options::Options;
use crate::urls::absolute;

/// A site-bound view of the host's HTTP client.
#[derive(Clone)]
pub struct SourceClient {
    http: Arc<dyn HttpClient>,
    base_url: String,
    headers: Vec<(String, String)>,
    opts: Options,
}

impl fmt::Debug for SourceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceClient")
            .field("base_url", &self.base_url)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl SourceClient {
    /// `default_base` is used unless the options override it.
    pub fn new(http: Arc<dyn HttpClient>, default_base: &str, opts: Options) -> Self {
        let base_url = opts
            .base_url
            .clone()
            .unwrap_or_else(|| default_base.to_string())
            .trim_end_matches('/')
            .to_string();
        let mut headers: Vec<(String, String)> = Vec::new();
        if let Some(ua) = &opts.user_agent {
            headers.push(("User-Agent".to_string(), ua.clone()));
        }
        headers.extend(opts.headers.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self {
            http,
            base_url,
            headers,
            opts,
        }
    }

    /// Send `Referer: <base>/` with every request.
    pub fn with_referer(mut self) -> Self {
        let referer = format!("{}/", self.base_url);
        self.headers.push(("Referer".to_string(), referer));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.opts.now()
    }

    /// Absolute URL for a site path.
    pub fn url(&self, path: &str) -> String {
        absolute(&self.base_url, path)
    }

    /// GET `url` (absolute or site path); non-success statuses are transport errors.
    pub fn get(&self, url: &str, op: &str) -> Result<Response> {
        let url = self.url(url);
        let request = self
            .headers
            .iter()
            .fold(Request::get(url.clone()), |req, (k, v)| req.header(k, v));
        log::debug!("{}: GET {}", op, url);
        self.http.fetch(&request)?.error_for_status(op)
    }

    pub fn document(&self, url: &str, op: &str) -> Result<HtmlDocument> {
        Ok(self.get(url, op)?.document())
    }

    pub fn json<T: DeserializeOwned>(&self, url: &str, op: &str) -> Result<T> {
        self.get(url, op)?.json(op)
    }
}
