// src/sources/campus.rs

//! Structured campus events API adapter.
//!
//! The API returns a JSON document with a `results` array. Field names are
//! stable but many fields are optional and inconsistently filled, so each
//! entry is deserialized on its own: a malformed entry drops alone instead
//! of failing the whole page.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::datetime;
use crate::error::Result;
use crate::models::{
    Classification, Content, Event, Location, Organizer, Source, SourceExtra, TimeWindow,
};
use crate::sources::{Adapter, push_valid};
use crate::utils::http;

/// Adapter for the structured campus events API.
pub struct CampusApi {
    url: String,
}

impl CampusApi {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Map a raw JSON payload onto canonical events.
    pub fn extract(payload: &serde_json::Value) -> Vec<Event> {
        let Some(results) = payload.get("results").and_then(|r| r.as_array()) else {
            log::warn!("{}: payload has no results array", Source::Campus);
            return Vec::new();
        };

        let mut events = Vec::new();
        for raw in results {
            match serde_json::from_value::<CampusEntry>(raw.clone()) {
                Ok(entry) => {
                    if let Some(event) = entry.into_event() {
                        push_valid(&mut events, event);
                    }
                }
                Err(e) => log::debug!("{}: skipping malformed entry: {}", Source::Campus, e),
            }
        }
        events
    }
}

#[async_trait]
impl Adapter for CampusApi {
    fn source(&self) -> Source {
        Source::Campus
    }

    async fn fetch(&self, client: &Client) -> Result<Vec<Event>> {
        let payload: serde_json::Value = http::fetch_json(client, &self.url).await?;
        Ok(Self::extract(&payload))
    }
}

/// One entry of the `results` array.
#[derive(Debug, Deserialize)]
struct CampusEntry {
    id: serde_json::Value,
    title: String,

    #[serde(default)]
    description: Option<String>,

    #[serde(default)]
    event_url: Option<String>,

    #[serde(default)]
    start_date: Option<String>,

    #[serde(default)]
    end_date: Option<String>,

    #[serde(default)]
    location: Option<CampusLocation>,

    #[serde(default)]
    category: Option<CampusLabel>,

    #[serde(default)]
    audience: Option<CampusLabel>,

    #[serde(default)]
    registration_required: bool,

    #[serde(default)]
    speaker: Option<String>,

    #[serde(default)]
    organizer: Option<CampusOrganizer>,
}

#[derive(Debug, Deserialize)]
struct CampusLocation {
    #[serde(default)]
    description: Option<String>,

    #[serde(default)]
    building: Option<String>,

    #[serde(default)]
    room: Option<String>,

    #[serde(default)]
    addition: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CampusLabel {
    label: String,
}

#[derive(Debug, Deserialize)]
struct CampusOrganizer {
    name: String,

    #[serde(default)]
    short_name: Option<String>,
}

impl CampusEntry {
    /// Fixed key mapping onto the canonical shape. Returns `None` when a
    /// required field is missing or unusable.
    fn into_event(self) -> Option<Event> {
        let id = match &self.id {
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::String(s) if !s.trim().is_empty() => s.clone(),
            _ => return None,
        };

        // A missing or unparseable date leaves the event undated rather
        // than dropping it; the time filter excludes undated events.
        let windows = match self.start_date.as_deref().and_then(datetime::parse_iso) {
            Some(start) => {
                let end = self
                    .end_date
                    .as_deref()
                    .and_then(datetime::parse_iso)
                    .unwrap_or(start);
                TimeWindow::new(start, end).map(|w| vec![w]).unwrap_or_default()
            }
            None => Vec::new(),
        };

        let mut content = Content::new(self.title, self.description.unwrap_or_default());
        if let Some(url) = self.event_url {
            content = content.with_link(url);
        }

        let location = self.location.and_then(|l| {
            let location = Location {
                area: l.description.filter(|s| !s.trim().is_empty()),
                building: l.building.filter(|s| !s.trim().is_empty()),
                room: l.room.filter(|s| !s.trim().is_empty()),
                addition: l.addition.filter(|s| !s.trim().is_empty()),
            };
            (!location.is_empty()).then_some(location)
        });

        let classification = self.category.as_ref().map(|c| Classification {
            type_label: c.label.clone(),
            target_group: self.audience.as_ref().map(|a| a.label.clone()),
            registration_required: self.registration_required,
        });

        Some(Event {
            id,
            source: Source::Campus,
            content,
            location,
            windows,
            classification,
            organizer: self.organizer.map(|o| Organizer {
                name: o.name,
                short_name: o.short_name,
            }),
            extra: Some(SourceExtra::Campus {
                speaker: self.speaker,
                category: self.category.map(|c| c.label),
            }),
        })
    }
}
