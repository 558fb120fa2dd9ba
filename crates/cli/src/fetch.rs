// ABOUTME: Blocking reqwest implementation of the scanlate HttpClient interface.
// ABOUTME: HTTP error statuses are returned as responses; only connection failures are errors.

use std::time::Duration;

use log::debug;
use reqwest::header::CONTENT_TYPE;
use scanlate_core::{HttpClient, Request, Response, Result, SourceError};

pub const DEFAULT_USER_AGENT: &str = concat!("scanlate/", env!("CARGO_PKG_VERSION"));

pub struct ReqwestFetcher {
    client: reqwest::blocking::Client,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestFetcher {
    fn fetch(&self, request: &Request) -> Result<Response> {
        let transport = |e: reqwest::Error| {
            SourceError::transport(request.url.clone(), "fetch", Some(e.into()))
        };

        let mut builder = self.client.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let resp = builder.send().map_err(transport)?;

        let status = resp.status().as_u16();
        let url = resp.url().to_string();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.bytes().map_err(transport)?;
        debug!("GET {} -> {} ({} bytes)", request.url, status, body.len());

        let response = Response::new(status, url, body);
        Ok(match content_type {
            Some(ct) => response.with_content_type(ct),
            None => response,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;

    fn fetcher() -> ReqwestFetcher {
        ReqwestFetcher::new(Duration::from_secs(5), "scanlate-test").unwrap()
    }

    #[test]
    fn forwards_headers_and_reports_response_metadata() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/seriler/kara-kilic")
                .header("referer", "https://sadscans.net/")
                .header("user-agent", "scanlate-test");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body("<h1>Kara Kılıç</h1>");
        });

        let request = Request::get(server.url("/seriler/kara-kilic"))
            .header("Referer", "https://sadscans.net/");
        let resp = fetcher().fetch(&request).unwrap();

        mock.assert();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.url, server.url("/seriler/kara-kilic"));
        assert_eq!(
            resp.content_type.as_deref(),
            Some("text/html; charset=utf-8")
        );
        assert_eq!(resp.text(), "<h1>Kara Kılıç</h1>");
    }

    #[test]
    fn error_status_is_a_response() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/series");
            then.status(503).body("busy");
        });

        let resp = fetcher()
            .fetch(&Request::get(server.url("/api/series")))
            .unwrap();
        assert_eq!(resp.status, 503);
        assert!(!resp.is_success());
    }

    #[test]
    fn connection_failure_is_transport_error() {
        let err = fetcher()
            .fetch(&Request::get("http://127.0.0.1:9/unreachable"))
            .unwrap_err();
        assert!(err.is_transport());
        assert_eq!(err.url, "http://127.0.0.1:9/unreachable");
    }
}
