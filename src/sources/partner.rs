// src/sources/partner.rs

//! Partner institute API adapter.
//!
//! The partner feed is JSON with an `events` array of flat records:
//! epoch-millisecond strings for start/end, a speaker field and a virtual
//! flag. Events without a physical venue are dropped, as are records with
//! missing required fields or unparseable dates.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::datetime;
use crate::error::Result;
use crate::models::{Content, Event, Location, Source, SourceExtra, TimeWindow};
use crate::sources::{Adapter, push_valid};
use crate::utils::http;

/// Adapter for the partner institute events API.
pub struct PartnerApi {
    url: String,
}

impl PartnerApi {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Map the raw feed onto canonical events.
    pub fn extract(feed: &PartnerFeed) -> Vec<Event> {
        let mut events = Vec::new();
        for entry in &feed.events {
            if let Some(event) = entry.to_event() {
                push_valid(&mut events, event);
            }
        }
        events
    }
}

#[async_trait]
impl Adapter for PartnerApi {
    fn source(&self) -> Source {
        Source::Partner
    }

    async fn fetch(&self, client: &Client) -> Result<Vec<Event>> {
        let feed: PartnerFeed = http::fetch_json(client, &self.url).await?;
        Ok(Self::extract(&feed))
    }
}

/// Top-level partner feed document.
#[derive(Debug, Default, Deserialize)]
pub struct PartnerFeed {
    #[serde(default)]
    pub events: Vec<PartnerEntry>,
}

/// One flat record of the partner feed.
#[derive(Debug, Deserialize)]
pub struct PartnerEntry {
    #[serde(default)]
    id: Option<String>,

    /// Start instant, epoch milliseconds as a string
    #[serde(default)]
    dtstart: Option<String>,

    /// End instant, epoch milliseconds as a string
    #[serde(default)]
    dtend: Option<String>,

    #[serde(default)]
    title: Option<String>,

    #[serde(default)]
    description: Option<String>,

    /// Link to the partner's event page
    #[serde(default)]
    more: Option<String>,

    #[serde(default)]
    address: Option<String>,

    #[serde(default)]
    bldg: Option<String>,

    #[serde(default)]
    room: Option<String>,

    #[serde(default)]
    room_nr: Option<String>,

    #[serde(default)]
    speaker: Option<String>,

    #[serde(default)]
    is_virtual: bool,
}

impl PartnerEntry {
    /// Validate required fields, parse dates, and map onto the canonical
    /// shape. Purely virtual events carry no attendable occurrence and are
    /// dropped.
    fn to_event(&self) -> Option<Event> {
        let id = self.id.as_deref().filter(|s| !s.trim().is_empty())?;
        let title = self.title.as_deref().filter(|s| !s.trim().is_empty())?;
        let dtstart = self.dtstart.as_deref()?;
        let dtend = self.dtend.as_deref()?;

        if self.is_virtual {
            log::debug!("{}: dropping virtual-only event {}", Source::Partner, id);
            return None;
        }

        let start = datetime::parse_epoch_millis(dtstart)?;
        let end = datetime::parse_epoch_millis(dtend)?;
        let window = TimeWindow::new(start, end)?;

        let mut content = Content::new(title, self.description.clone().unwrap_or_default());
        if let Some(more) = self.more.as_deref().filter(|s| !s.trim().is_empty()) {
            content = content.with_link(more);
        }

        let room = match (self.room.as_deref(), self.room_nr.as_deref()) {
            (Some(room), Some(nr)) if !nr.trim().is_empty() => Some(format!("{room} {nr}")),
            (Some(room), _) => Some(room.to_string()),
            (None, Some(nr)) => Some(nr.to_string()),
            (None, None) => None,
        };
        let location = Location {
            area: self.address.clone().filter(|s| !s.trim().is_empty()),
            building: self.bldg.clone().filter(|s| !s.trim().is_empty()),
            room: room.filter(|s| !s.trim().is_empty()),
            addition: None,
        };

        Some(Event {
            id: id.to_string(),
            source: Source::Partner,
            content,
            location: (!location.is_empty()).then_some(location),
            windows: vec![window],
            classification: None,
            organizer: None,
            extra: Some(SourceExtra::Partner {
                speaker: self.speaker.clone().filter(|s| !s.trim().is_empty()),
                virtual_only: self.is_virtual,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn millis(y: i32, mo: u32, d: u32, h: u32) -> String {
        Local
            .with_ymd_and_hms(y, mo, d, h, 0, 0)
            .unwrap()
            .timestamp_millis()
            .to_string()
    }

    fn fixture() -> PartnerFeed {
        serde_json::from_value(serde_json::json!({
            "events": [
                {
                    "id": "551",
                    "dtstart": millis(2025, 12, 3, 17),
                    "dtend": millis(2025, 12, 3, 19),
                    "title": "Deep Learning Seminar",
                    "description": "With apéro afterwards.",
                    "more": "https://partner.example/events/551",
                    "address": "North Campus",
                    "bldg": "B12",
                    "room": "Auditorium",
                    "room_nr": "2",
                    "speaker": "Prof. N. Keller",
                    "is_virtual": false
                },
                {
                    "id": "552",
                    "dtstart": millis(2025, 12, 4, 12),
                    "dtend": millis(2025, 12, 4, 13),
                    "title": "Online Townhall",
                    "is_virtual": true
                },
                {
                    "id": "553",
                    "dtstart": "not-a-number",
                    "dtend": millis(2025, 12, 4, 13),
                    "title": "Broken dates"
                },
                {
                    "dtstart": millis(2025, 12, 5, 9),
                    "dtend": millis(2025, 12, 5, 10),
                    "title": "Missing id"
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_extract_keeps_only_valid_physical_events() {
        let events = PartnerApi::extract(&fixture());
        assert_eq!(events.len(), 1);

        let event = &events[0];
        assert_eq!(event.id, "551");
        assert_eq!(event.source, Source::Partner);
        assert_eq!(
            event.windows[0].start,
            Local.with_ymd_and_hms(2025, 12, 3, 17, 0, 0).unwrap()
        );
        let location = event.location.as_ref().unwrap();
        assert_eq!(location.building.as_deref(), Some("B12"));
        assert_eq!(location.room.as_deref(), Some("Auditorium 2"));
    }

    #[test]
    fn test_extract_drops_virtual_event() {
        let events = PartnerApi::extract(&fixture());
        assert!(events.iter().all(|e| e.id != "552"));
    }

    #[test]
    fn test_extract_drops_unparseable_dates_and_missing_id() {
        let events = PartnerApi::extract(&fixture());
        assert!(events.iter().all(|e| e.id != "553"));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_empty_feed() {
        let feed: PartnerFeed = serde_json::from_str("{}").unwrap();
        assert!(PartnerApi::extract(&feed).is_empty());
    }
}
