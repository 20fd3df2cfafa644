// src/sources/club.rs

//! Two-phase club site adapter, shared by the alumni and sports clubs.
//!
//! Phase 1 scans the listing page for detail links. Phase 2 fetches the
//! detail pages with at most one request outstanding at a time and
//! recovers the fields from a label/value table. Only free events
//! survive.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use scraper::{Html, Selector};

use crate::datetime;
use crate::error::{AppError, Result};
use crate::models::{
    ClubSiteConfig, Content, Event, HttpConfig, Location, Organizer, Source, SourceExtra,
    TimeWindow,
};
use crate::sources::{Adapter, element_text, parse_price_chf, push_valid};
use crate::utils::{extract_event_id, http, resolve_url};

/// How a club writes its date row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// `Tuesday 2. December 2025 18:00 - 20:00`
    VerboseWeekday,
    /// `Dec. 3, 2025, 6 p.m.` plus a separate `H:MM:SS` duration row
    AbbrevMonth,
}

const TITLE_LABELS: [&str; 3] = ["title", "event", "name"];
const DESC_LABELS: [&str; 4] = ["description", "details", "about", "programme"];
const DATE_LABELS: [&str; 4] = ["date", "when", "date and time", "time"];
const DURATION_LABELS: [&str; 1] = ["duration"];
const LOCATION_LABELS: [&str; 4] = ["location", "where", "place", "venue"];
const MEMBER_PRICE_LABELS: [&str; 3] = ["price (members)", "members", "member price"];
const GUEST_PRICE_LABELS: [&str; 4] = [
    "price (non-members)",
    "non-members",
    "guests",
    "guest price",
];
const PRICE_LABELS: [&str; 4] = ["price", "cost", "fee", "entry"];

/// Adapter for a club site scraped in two phases.
pub struct ClubSite {
    source: Source,
    listing_url: String,
    date_style: DateStyle,
    include_paid: bool,
    request_delay: Duration,
}

impl ClubSite {
    /// Alumni club: verbose weekday dates.
    pub fn alumni(config: &ClubSiteConfig, http: &HttpConfig, include_paid: bool) -> Self {
        Self {
            source: Source::Alumni,
            listing_url: config.listing_url.clone(),
            date_style: DateStyle::VerboseWeekday,
            include_paid,
            request_delay: Duration::from_millis(http.request_delay_ms),
        }
    }

    /// Sports club: abbreviated month dates with a duration row.
    pub fn sports(config: &ClubSiteConfig, http: &HttpConfig, include_paid: bool) -> Self {
        Self {
            source: Source::Sports,
            listing_url: config.listing_url.clone(),
            date_style: DateStyle::AbbrevMonth,
            include_paid,
            request_delay: Duration::from_millis(http.request_delay_ms),
        }
    }

    /// Phase 1: collect unique (id, absolute detail URL) pairs from the
    /// listing page, in document order.
    pub fn collect_detail_links(&self, document: &Html) -> Result<Vec<(String, String)>> {
        let anchor_sel = Selector::parse("a[href]")
            .map_err(|e| AppError::selector("a[href]", format!("{e:?}")))?;
        let base = url::Url::parse(&self.listing_url)?;

        let mut seen = HashSet::new();
        let mut links = Vec::new();
        for anchor in document.select(&anchor_sel) {
            let href = anchor.value().attr("href").unwrap_or("");
            let Some(id) = extract_event_id(href) else {
                continue;
            };
            if seen.insert(id.clone()) {
                links.push((id, resolve_url(&base, href)));
            }
        }
        Ok(links)
    }

    /// Phase 2 parser: recover one event from a detail page.
    ///
    /// Returns `None` when the page is missing a usable title or carries a
    /// price that is neither zero nor absent (unless paid events are
    /// allowed by configuration).
    pub fn parse_detail(&self, id: &str, url: &str, document: &Html) -> Option<Event> {
        let row_sel = Selector::parse("table tr").ok()?;
        let cell_sel = Selector::parse("th, td").ok()?;

        let mut title: Option<String> = None;
        let mut description: Option<String> = None;
        let mut date_text: Option<String> = None;
        let mut duration_text: Option<String> = None;
        let mut location_text: Option<String> = None;
        let mut member_price: Option<f64> = None;
        let mut guest_price: Option<f64> = None;
        let mut generic_price: Option<f64> = None;

        for row in document.select(&row_sel) {
            let cells: Vec<_> = row.select(&cell_sel).collect();
            if cells.len() < 2 {
                continue;
            }
            let label = element_text(cells[0])
                .trim_end_matches(':')
                .trim()
                .to_lowercase();
            let value = element_text(cells[1]);
            if value.is_empty() {
                continue;
            }

            if TITLE_LABELS.contains(&label.as_str()) {
                title.get_or_insert(value);
            } else if DESC_LABELS.contains(&label.as_str()) {
                description.get_or_insert(value);
            } else if DATE_LABELS.contains(&label.as_str()) {
                date_text.get_or_insert(value);
            } else if DURATION_LABELS.contains(&label.as_str()) {
                duration_text.get_or_insert(value);
            } else if LOCATION_LABELS.contains(&label.as_str()) {
                location_text.get_or_insert(value);
            } else if GUEST_PRICE_LABELS.contains(&label.as_str()) {
                match parse_price_chf(&value) {
                    Some(price) => guest_price.get_or_insert(price),
                    None => {
                        log::debug!("{}: unreadable price '{}' for {}", self.source, value, id);
                        return None;
                    }
                };
            } else if MEMBER_PRICE_LABELS.contains(&label.as_str()) {
                match parse_price_chf(&value) {
                    Some(price) => member_price.get_or_insert(price),
                    None => {
                        log::debug!("{}: unreadable price '{}' for {}", self.source, value, id);
                        return None;
                    }
                };
            } else if PRICE_LABELS.contains(&label.as_str()) {
                match parse_price_chf(&value) {
                    Some(price) => generic_price.get_or_insert(price),
                    None => {
                        log::debug!("{}: unreadable price '{}' for {}", self.source, value, id);
                        return None;
                    }
                };
            }
        }

        // No labeled title cell: fall back to the page's first heading.
        let title = title.or_else(|| first_heading_text(document))?;

        let member = member_price.or(generic_price).unwrap_or(0.0);
        let guest = guest_price.or(generic_price).unwrap_or(0.0);
        if (member > 0.0 || guest > 0.0) && !self.include_paid {
            log::debug!(
                "{}: dropping paid event {} (member CHF {:.2}, guest CHF {:.2})",
                self.source,
                id,
                member,
                guest
            );
            return None;
        }

        let windows = self.parse_windows(date_text.as_deref(), duration_text.as_deref());

        Some(Event {
            id: id.to_string(),
            source: self.source,
            content: Content::new(title, description.unwrap_or_default()).with_link(url),
            location: location_text.as_deref().and_then(Location::from_free_text),
            windows,
            classification: None,
            organizer: Some(Organizer {
                name: self.source.label().to_string(),
                short_name: Some(self.source.label().to_string()),
            }),
            extra: Some(SourceExtra::Club {
                member_price_chf: member,
                guest_price_chf: guest,
            }),
        })
    }

    /// Interpret the date (and duration) rows per this club's style. A
    /// missing or unparseable date leaves the event undated.
    fn parse_windows(&self, date: Option<&str>, duration: Option<&str>) -> Vec<TimeWindow> {
        let Some(date) = date else {
            return Vec::new();
        };

        let window = match self.date_style {
            DateStyle::VerboseWeekday => datetime::parse_verbose_range(date)
                .and_then(|(start, end)| TimeWindow::new(start, end)),
            DateStyle::AbbrevMonth => datetime::parse_abbrev_start(date).and_then(|start| {
                let length = duration
                    .and_then(datetime::parse_duration_hms)
                    .unwrap_or_else(datetime::default_duration);
                start
                    .checked_add_signed(length)
                    .and_then(|end| TimeWindow::new(start, end))
            }),
        };

        window.into_iter().collect()
    }
}

#[async_trait]
impl Adapter for ClubSite {
    fn source(&self) -> Source {
        self.source
    }

    async fn fetch(&self, client: &Client) -> Result<Vec<Event>> {
        // The parsed listing stays inside this block: the document tree is
        // single-threaded and must not be held across an await.
        let links = {
            let listing = http::fetch_page(client, &self.listing_url).await?;
            self.collect_detail_links(&listing)?
        };

        // At most one detail request is outstanding at any time.
        let mut pages = stream::iter(links)
            .map(|(id, url)| {
                let client = client.clone();
                async move {
                    let parsed = match http::fetch_page(&client, &url).await {
                        Ok(document) => Ok(self.parse_detail(&id, &url, &document)),
                        Err(error) => Err(error),
                    };
                    (url, parsed)
                }
            })
            .buffered(1);

        let mut events = Vec::new();
        while let Some((url, parsed)) = pages.next().await {
            match parsed {
                Ok(Some(event)) => push_valid(&mut events, event),
                Ok(None) => {}
                Err(error) => {
                    log::warn!("{}: detail fetch failed for {}: {}", self.source, url, error);
                }
            }

            if !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }
        }
        Ok(events)
    }
}

/// Text of the first h1/h2/h3 in the document.
fn first_heading_text(document: &Html) -> Option<String> {
    let heading_sel = Selector::parse("h1, h2, h3").ok()?;
    document
        .select(&heading_sel)
        .map(element_text)
        .find(|text| !text.is_empty())
}
