// ABOUTME: Error types for source operations: ErrorCode, SourceError and the field-level DecodeError.
// ABOUTME: SourceError carries the failing op and URL; DecodeError is contained inside fallback chains.

use std::fmt;

/// Categories of operation-level failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidUrl,
    Transport,
    Decode,
    NotFound,
    Unsupported,
    Locked,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidUrl => "invalid URL",
            ErrorCode::Transport => "transport error",
            ErrorCode::Decode => "decode error",
            ErrorCode::NotFound => "not found",
            ErrorCode::Unsupported => "unsupported operation",
            ErrorCode::Locked => "locked content",
        };
        write!(f, "{}", s)
    }
}

/// The error returned by every source operation.
#[derive(Debug, thiserror::Error)]
pub struct SourceError {
    pub code: ErrorCode,
    pub url: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scanlate: {} {}: {}", self.op, self.url, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

pub type Result<T, E = SourceError> = std::result::Result<T, E>;

impl SourceError {
    fn new(
        code: ErrorCode,
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    pub fn invalid_url(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::InvalidUrl, url, op, source)
    }

    /// Fetch failure or a non-success HTTP status.
    pub fn transport(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Transport, url, op, source)
    }

    /// A whole response could not be decoded.
    pub fn decode(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Decode, url, op, source)
    }

    pub fn not_found(url: impl Into<String>, op: impl Into<String>, what: &str) -> Self {
        Self::new(
            ErrorCode::NotFound,
            url,
            op,
            Some(anyhow::anyhow!("{} not found", what)),
        )
    }

    pub fn unsupported(op: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::Unsupported,
            String::new(),
            op,
            Some(anyhow::anyhow!("not supported by this source")),
        )
    }

    pub fn locked(url: impl Into<String>, op: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::Locked,
            url,
            op,
            Some(anyhow::anyhow!("chapter is locked")),
        )
    }

    pub fn is_transport(&self) -> bool {
        self.code == ErrorCode::Transport
    }

    pub fn is_decode(&self) -> bool {
        self.code == ErrorCode::Decode
    }

    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::NotFound
    }

    pub fn is_unsupported(&self) -> bool {
        self.code == ErrorCode::Unsupported
    }

    pub fn is_locked(&self) -> bool {
        self.code == ErrorCode::Locked
    }

    pub fn is_invalid_url(&self) -> bool {
        self.code == ErrorCode::InvalidUrl
    }
}

/// A located value that could not be decoded into the requested type.
///
/// Never crosses an operation boundary: fallback chains log it and move on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed JSON: {0}")]
    Json(String),
    #[error("expected {expected}, found {found:?}")]
    Type { expected: &'static str, found: String },
    #[error("unparsable number {0:?}")]
    Number(String),
    #[error("unresolvable URL {0:?}")]
    Url(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_op_url_and_cause() {
        let err = SourceError::transport(
            "https://example.com/x",
            "chapters",
            Some(anyhow::anyhow!("status 503")),
        );
        assert_eq!(
            err.to_string(),
            "scanlate: chapters https://example.com/x: transport error: status 503"
        );
        assert!(err.is_transport());
        assert!(!err.is_decode());
    }

    #[test]
    fn unsupported_has_no_url() {
        let err = SourceError::unsupported("latest");
        assert!(err.is_unsupported());
        assert!(err.url.is_empty());
        assert_eq!(err.code, ErrorCode::Unsupported);
    }

    #[test]
    fn locked_and_not_found_helpers() {
        assert!(SourceError::locked("/c/1", "pages").is_locked());
        assert!(SourceError::not_found("/s", "chapters", "series id").is_not_found());
    }
}
