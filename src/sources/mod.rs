// src/sources/mod.rs

//! Source adapters mapping raw payloads onto canonical events.
//!
//! Every adapter follows the same contract: `fetch` pulls the raw payload
//! over HTTP and hands it to a pure `extract` function that maps records
//! onto [`Event`]s. A record that fails validation or date parsing is
//! dropped and logged; it never aborts its siblings. Adapter-level errors
//! (transport, malformed payload) surface as `Err` and are absorbed by the
//! aggregator.

mod campus;
mod club;
mod council;
mod partner;

pub use campus::CampusApi;
pub use club::{ClubSite, DateStyle};
pub use council::CouncilListing;
pub use partner::PartnerApi;

use async_trait::async_trait;
use reqwest::Client;
use scraper::ElementRef;

use crate::error::Result;
use crate::models::{Event, Source};
use crate::utils::normalize_whitespace;

/// Common contract for all source adapters.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Source tag this adapter stamps on its events.
    fn source(&self) -> Source;

    /// Fetch and extract all events from this source.
    async fn fetch(&self, client: &Client) -> Result<Vec<Event>>;
}

/// Append an event after enforcing the record invariants.
///
/// An invalid record is logged and dropped; sibling records are
/// unaffected.
pub(crate) fn push_valid(events: &mut Vec<Event>, event: Event) {
    match event.check() {
        Ok(()) => events.push(event),
        Err(e) => log::debug!("{}: dropping record: {}", event.source, e),
    }
}

/// The rendered text of an element, split into normalized non-empty lines.
///
/// Approximates the line structure a browser would render: each HTML text
/// node becomes one candidate line.
pub(crate) fn text_lines(element: ElementRef<'_>) -> Vec<String> {
    element
        .text()
        .map(normalize_whitespace)
        .filter(|line| !line.is_empty())
        .collect()
}

/// The joined, whitespace-normalized text of an element.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

/// Parse a Swiss-franc price from free text.
///
/// Recognizes `CHF 15.00`, `Fr. 5.-`, `15 CHF` and the various "free"
/// spellings, which map to 0.
pub(crate) fn parse_price_chf(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() || text == "-" {
        return Some(0.0);
    }

    let lower = text.to_lowercase();
    for free in ["free", "gratuit", "gratis", "kostenlos", "offert"] {
        if lower.contains(free) {
            return Some(0.0);
        }
    }

    let pattern =
        regex::Regex::new(r"(?i)(?:chf|fr\.)\s*(\d+(?:[.,]\d{1,2})?)|(\d+(?:[.,]\d{1,2})?)\s*(?:chf|fr\.|francs?)")
            .ok()?;
    let caps = pattern.captures(text)?;
    let raw = caps.get(1).or_else(|| caps.get(2))?.as_str().replace(',', ".");
    raw.parse().ok()
}
