// src/sources/council.rs

//! Student council listing page adapter.
//!
//! The council publishes events as a rendered HTML list with no stable
//! markup contract beyond detail links of the form `/events/view/<id>`.
//! Extraction finds those anchors, walks each anchor's enclosing block
//! line-by-line with a small label-driven scanner, and keeps only free
//! events that produced a title and both timestamps.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::datetime;
use crate::error::{AppError, Result};
use crate::models::{Classification, Content, Event, Source, SourceExtra, TimeWindow};
use crate::sources::{Adapter, parse_price_chf, push_valid, text_lines};
use crate::utils::{http, resolve_url};

/// Lines starting a "start time follows" state, lowercased.
const START_LABELS: [&str; 5] = ["start", "début", "debut", "beginn", "from"];

/// Lines starting an "end time follows" state, lowercased.
const END_LABELS: [&str; 4] = ["end", "fin", "ende", "until"];

/// Category labels the council uses verbatim on its cards.
const CATEGORY_LABELS: [&str; 8] = [
    "Party",
    "Concert",
    "Workshop",
    "Talk",
    "Culture",
    "Sport",
    "Networking",
    "Cinema",
];

/// A line shorter than this cannot be a title.
const MIN_TITLE_LEN: usize = 5;

/// Block-level tags considered an event card boundary.
const BLOCK_TAGS: [&str; 5] = ["li", "article", "tr", "section", "div"];

/// Adapter for the student council listing page.
pub struct CouncilListing {
    url: String,
    include_paid: bool,
}

impl CouncilListing {
    pub fn new(url: impl Into<String>, include_paid: bool) -> Self {
        Self {
            url: url.into(),
            include_paid,
        }
    }

    /// Extract events from a rendered listing document.
    pub fn extract(&self, document: &Html) -> Result<Vec<Event>> {
        let anchor_sel = Selector::parse("a[href]")
            .map_err(|e| AppError::selector("a[href]", format!("{e:?}")))?;
        let base = url::Url::parse(&self.url)?;

        let mut seen = HashSet::new();
        let mut events = Vec::new();

        for anchor in document.select(&anchor_sel) {
            let href = anchor.value().attr("href").unwrap_or("");
            let Some(id) = detail_event_id(href) else {
                continue;
            };
            if !seen.insert(id.clone()) {
                continue;
            }

            let block = enclosing_block(anchor);
            let Some(scan) = scan_block(&text_lines(block)) else {
                log::debug!("{}: dropping incomplete card for event {}", Source::Council, id);
                continue;
            };

            let price = scan.price.unwrap_or(0.0);
            if price > 0.0 && !self.include_paid {
                log::debug!("{}: dropping paid event {} (CHF {:.2})", Source::Council, id, price);
                continue;
            }

            let Some(window) = TimeWindow::new(scan.start, scan.end) else {
                log::debug!("{}: dropping event {} with inverted window", Source::Council, id);
                continue;
            };

            push_valid(
                &mut events,
                Event {
                    id: id.clone(),
                    source: Source::Council,
                    content: Content::new(scan.title, String::new())
                        .with_link(resolve_url(&base, href)),
                    location: None,
                    windows: vec![window],
                    classification: scan.category.clone().map(|label| Classification {
                        type_label: label,
                        target_group: None,
                        registration_required: false,
                    }),
                    organizer: None,
                    extra: Some(SourceExtra::Council {
                        price_chf: price,
                        category: scan.category,
                    }),
                },
            );
        }

        Ok(events)
    }
}

#[async_trait]
impl Adapter for CouncilListing {
    fn source(&self) -> Source {
        Source::Council
    }

    async fn fetch(&self, client: &Client) -> Result<Vec<Event>> {
        let document = http::fetch_page(client, &self.url).await?;
        self.extract(&document)
    }
}

/// Numeric event id embedded in a council detail URL, if any.
fn detail_event_id(href: &str) -> Option<String> {
    let id = crate::utils::extract_event_id(href)?;
    id.chars().all(|c| c.is_ascii_digit()).then_some(id)
}

/// Closest block-level ancestor of an anchor, approximating the card that
/// renders around it.
fn enclosing_block(anchor: ElementRef<'_>) -> ElementRef<'_> {
    anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| BLOCK_TAGS.contains(&el.value().name()))
        .unwrap_or(anchor)
}

/// Fields recovered from one card.
struct CardScan {
    title: String,
    start: DateTime<Local>,
    end: DateTime<Local>,
    price: Option<f64>,
    category: Option<String>,
}

/// What the next unlabeled line is expected to hold.
enum Expect {
    Nothing,
    Start,
    End,
}

/// Label-driven scan over a card's rendered lines.
///
/// The first sufficiently long line that is not a recognized label, date,
/// price or category becomes the title. Lines after a start/end label feed
/// the dotted-date parser. Ambiguous cards resolve to `None`.
fn scan_block(lines: &[String]) -> Option<CardScan> {
    let mut title: Option<String> = None;
    let mut start: Option<DateTime<Local>> = None;
    let mut end: Option<DateTime<Local>> = None;
    let mut price: Option<f64> = None;
    let mut category: Option<String> = None;
    let mut expect = Expect::Nothing;

    for line in lines {
        // A pending label consumes the next line as its value.
        match expect {
            Expect::Start => {
                expect = Expect::Nothing;
                if let Some(parsed) = datetime::parse_dotted(line) {
                    start.get_or_insert(parsed);
                    continue;
                }
            }
            Expect::End => {
                expect = Expect::Nothing;
                if let Some(parsed) = datetime::parse_dotted(line) {
                    end.get_or_insert(parsed);
                    continue;
                }
            }
            Expect::Nothing => {}
        }

        // "Label: value" or a bare label line.
        let (label, value) = match line.split_once(':') {
            Some((label, value)) => (label.trim().to_lowercase(), value.trim()),
            None => (line.trim().to_lowercase(), ""),
        };
        if START_LABELS.contains(&label.as_str()) {
            match datetime::parse_dotted(value) {
                Some(parsed) => {
                    start.get_or_insert(parsed);
                }
                None => expect = Expect::Start,
            }
            continue;
        }
        if END_LABELS.contains(&label.as_str()) {
            match datetime::parse_dotted(value) {
                Some(parsed) => {
                    end.get_or_insert(parsed);
                }
                None => expect = Expect::End,
            }
            continue;
        }

        if let Some(found) = CATEGORY_LABELS.iter().find(|c| c.eq_ignore_ascii_case(line)) {
            category.get_or_insert_with(|| found.to_string());
            continue;
        }

        if line.to_lowercase().contains("chf") || line.to_lowercase().contains("fr.") {
            if let Some(parsed) = parse_price_chf(line) {
                price.get_or_insert(parsed);
                continue;
            }
        }

        // Stray date line without a label; not a title.
        if datetime::parse_dotted(line).is_some() {
            continue;
        }

        if title.is_none() && line.chars().count() >= MIN_TITLE_LEN {
            title = Some(line.clone());
        }
    }

    Some(CardScan {
        title: title?,
        start: start?,
        end: end?,
        price,
        category,
    })
}
