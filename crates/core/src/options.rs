// ABOUTME: Per-source configuration (base URL mirror, headers, pagination cap, clock) and its builder.
// ABOUTME: OptionsBuilder provides the fluent API the CLI and tests use to construct Options.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// Default cap on chapter-list pages fetched for one series, first page included.
pub const DEFAULT_MAX_CHAPTER_PAGES: u32 = 50;

/// Configuration shared by every source.
#[derive(Debug, Clone)]
pub struct Options {
    /// Replaces the source's built-in base URL (mirrors, test servers).
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    pub headers: BTreeMap<String, String>,
    /// Chapter-list pages fetched per series, counting the first one.
    pub max_chapter_pages: u32,
    /// Fixed "now" for relative dates; the wall clock when unset.
    pub reference_time: Option<DateTime<Utc>>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            base_url: None,
            user_agent: None,
            headers: BTreeMap::new(),
            max_chapter_pages: DEFAULT_MAX_CHAPTER_PAGES,
            reference_time: None,
        }
    }
}

impl Options {
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::new()
    }

    /// The instant relative dates are resolved against.
    pub fn now(&self) -> DateTime<Utc> {
        self.reference_time.unwrap_or_else(Utc::now)
    }
}

/// Fluent builder for [`Options`].
#[derive(Debug, Clone, Default)]
pub struct OptionsBuilder {
    opts: Options,
}

impl OptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.opts.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = Some(user_agent.into());
        self
    }

    /// Add a header sent with every request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Values below 1 are raised to 1.
    pub fn max_chapter_pages(mut self, pages: u32) -> Self {
        self.opts.max_chapter_pages = pages.max(1);
        self
    }

    pub fn reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.opts.reference_time = Some(now);
        self
    }

    pub fn build(self) -> Options {
        self.opts
    }
}
