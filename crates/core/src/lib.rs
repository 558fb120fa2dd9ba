// ABOUTME: Library entry point for the scanlation extraction core shared by all site plugins.
// ABOUTME: Re-exports the models, errors, options, HTTP interface and extraction building blocks.

//! Scanlate core - building blocks for manga site plugins.
//!
//! A plugin fetches through a host-provided [`HttpClient`], parses the
//! response into an [`HtmlDocument`] or JSON, resolves each field through a
//! [`FallbackChain`], and assembles one record in a single step.
//!
//! ```
//! use scanlate_core::{decode, extract::Locator, FallbackChain, HtmlDocument};
//!
//! let doc = HtmlDocument::parse(
//!     "<h1></h1><meta property='og:title' content='Kara Kılıç'>",
//!     "https://site.test/seri/kara-kilic",
//! );
//! let title = FallbackChain::<HtmlDocument, String>::new("title")
//!     .locate("heading", Locator::Text("h1"), decode::text)
//!     .locate("og", Locator::Meta("og:title"), decode::text)
//!     .resolve(&doc);
//! assert_eq!(title.as_deref(), Some("Kara Kılıç"));
//! ```

pub mod assemble;
pub mod client;
pub mod date;
pub mod decode;
pub mod document;
pub mod error;
pub mod extract;
pub mod filter;
pub mod http;
pub mod models;
pub mod options;
pub mod pages;
pub mod paginate;
pub mod script;
pub mod selectors;
pub mod source;
pub mod text;
pub mod urls;

pub use crate::client::SourceClient;
pub use crate::document::HtmlDocument;
pub use crate::error::{DecodeError, ErrorCode, Result, SourceError};
pub use crate::extract::{extract, FallbackChain, Locate, Locator};
pub use crate::filter::{Filter, FilterOption};
pub use crate::http::{HttpClient, Request, Response};
pub use crate::models::{
    Chapter, Page, Pagination, SeriesDetail, SeriesPage, SeriesStatus, SeriesSummary,
};
pub use crate::options::{Options, OptionsBuilder};
pub use crate::pages::PageCandidate;
pub use crate::paginate::{ChapterAccumulator, ChapterBatch};
pub use crate::script::ScriptScanner;
pub use crate::source::{Source, SourceInfo, SLUG_SEARCH_PREFIX};
