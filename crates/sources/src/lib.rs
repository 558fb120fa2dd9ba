// ABOUTME: Site plugins for Turkish scanlation sites built on scanlate-core, plus deep-link resolution.
// ABOUTME: Sources are chosen by id at configuration time through `source_by_id`.

//! Scanlation site sources.
//!
//! Each site is one struct implementing [`scanlate_core::Source`]:
//! [`Sadscans`], [`AlucardScans`], [`MerlinToon`] and [`MerlinScans`].
//! The host supplies the [`HttpClient`] and [`Options`].

use std::sync::Arc;

use scanlate_core::{HttpClient, Options, Source};

pub mod alucardscans;
pub mod deeplink;
pub mod merlinscans;
pub mod merlintoon;
pub mod sadscans;

pub use crate::alucardscans::AlucardScans;
pub use crate::deeplink::DeepLink;
pub use crate::merlinscans::MerlinScans;
pub use crate::merlintoon::MerlinToon;
pub use crate::sadscans::Sadscans;

/// Ids accepted by [`source_by_id`].
pub const SOURCE_IDS: &[&str] = &["sadscans", "alucardscans", "merlintoon", "merlinscans"];

/// Build the source registered under `id` (case-insensitive).
pub fn source_by_id(id: &str, http: Arc<dyn HttpClient>, opts: Options) -> Option<Box<dyn Source>> {
    let source: Box<dyn Source> = match id.trim().to_ascii_lowercase().as_str() {
        "sadscans" => Box::new(Sadscans::with_options(http, opts)),
        "alucardscans" | "alucard" => Box::new(AlucardScans::with_options(http, opts)),
        "merlintoon" => Box::new(MerlinToon::with_options(http, opts)),
        "merlinscans" => Box::new(MerlinScans::with_options(http, opts)),
        _ => return None,
    };
    Some(source)
}
