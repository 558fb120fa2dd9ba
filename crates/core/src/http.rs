// ABOUTME: The host-facing HTTP interface: Request, Response and the HttpClient trait.
// ABOUTME: Responses decode text by the declared charset or by detection.

use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::document::HtmlDocument;
use crate::error::{Result, SourceError};

/// A GET request built by a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A fetched response as handed back by the host.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    /// Final URL after redirects.
    pub url: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, url: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            url: url.into(),
            content_type: None,
            body: body.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-success status into a transport error.
    pub fn error_for_status(self, op: &str) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(SourceError::transport(
                self.url.clone(),
                op,
                Some(anyhow::anyhow!("HTTP status {}", self.status)),
            ))
        }
    }

    pub fn text(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }

    pub fn json<T: DeserializeOwned>(&self, op: &str) -> Result<T> {
        serde_json::from_str(&self.text())
            .map_err(|e| SourceError::decode(self.url.clone(), op, Some(e.into())))
    }

    pub fn document(&self) -> HtmlDocument {
        HtmlDocument::parse(&self.text(), &self.url)
    }
}

/// Blocking fetch provided by the host application.
///
/// Implementations return `Err` only for transport failures; HTTP error
/// statuses come back as a [`Response`].
pub trait HttpClient: Send + Sync {
    fn fetch(&self, request: &Request) -> Result<Response>;
}

impl<T: HttpClient + ?Sized> HttpClient for Arc<T> {
    fn fetch(&self, request: &Request) -> Result<Response> {
        (**self).fetch(request)
    }
}

impl<T: HttpClient + ?Sized> HttpClient for &T {
    fn fetch(&self, request: &Request) -> Result<Response> {
        (**self).fetch(request)
    }
}

fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(encoding) = content_type
        .and_then(extract_charset)
        .and_then(|c| encoding_rs::Encoding::for_label(c.as_bytes()))
    {
        let (decoded, _, _) = encoding.decode(body);
        return decoded.into_owned();
    }
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let (decoded, _, _) = detector.guess(None, true).decode(body);
    decoded.into_owned()
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .to_lowercase()
        .split(';')
        .find_map(|part| part.trim().strip_prefix("charset=").map(str::to_string))
        .map(|c| c.trim_matches(['"', '\'']).to_string())
}
