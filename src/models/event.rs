//! Canonical event record produced by every source adapter.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Origin of an event. Assigned once by the producing adapter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Structured campus events API
    Campus,
    /// Partner institute API
    Partner,
    /// Student council listing page
    Council,
    /// Alumni club site (listing + detail pages)
    Alumni,
    /// Sports club site (listing + detail pages)
    Sports,
}

impl Source {
    /// All sources in the fixed aggregation order.
    pub const ALL: [Source; 5] = [
        Source::Campus,
        Source::Partner,
        Source::Council,
        Source::Alumni,
        Source::Sports,
    ];

    /// Human-readable source name.
    pub fn label(&self) -> &'static str {
        match self {
            Source::Campus => "Campus",
            Source::Partner => "Partner",
            Source::Council => "Student Council",
            Source::Alumni => "Alumni Club",
            Source::Sports => "Sports Club",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Textual content shared by all events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    /// Event title
    pub title: String,

    /// Free-text description (may be empty)
    #[serde(default)]
    pub description: String,

    /// Link to the source's own event page
    #[serde(default)]
    pub link_url: Option<String>,

    /// Label for the link
    #[serde(default = "Content::default_link_label")]
    pub link_label: String,
}

impl Content {
    /// Create content with the default link label.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            link_url: None,
            link_label: Self::default_link_label(),
        }
    }

    /// Attach a link, keeping the default label.
    pub fn with_link(mut self, url: impl Into<String>) -> Self {
        self.link_url = Some(url.into());
        self
    }

    fn default_link_label() -> String {
        "More information".to_string()
    }
}

/// Structured location. Absence of the whole block means virtual or
/// unspecified.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Location {
    /// Free-form area description
    #[serde(default)]
    pub area: Option<String>,

    /// Building name or code
    #[serde(default)]
    pub building: Option<String>,

    /// Room name or number
    #[serde(default)]
    pub room: Option<String>,

    /// Extra directions (floor, entrance, ...)
    #[serde(default)]
    pub addition: Option<String>,
}

impl Location {
    /// Wrap a scraped one-line location string.
    pub fn from_free_text(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            area: Some(text.to_string()),
            ..Self::default()
        })
    }

    /// True when no field carries a value.
    pub fn is_empty(&self) -> bool {
        self.area.is_none() && self.building.is_none() && self.room.is_none() && self.addition.is_none()
    }
}

/// A single occurrence or opening-hours range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TimeWindow {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
}

impl TimeWindow {
    /// Create a window, rejecting inverted ranges.
    pub fn new(start: DateTime<Local>, end: DateTime<Local>) -> Option<Self> {
        if start <= end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// True when the window intersects `[from, to]`.
    pub fn overlaps(&self, from: DateTime<Local>, to: DateTime<Local>) -> bool {
        self.start <= to && self.end >= from
    }
}

/// Event type and audience classification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    /// Event type or calendar label
    pub type_label: String,

    /// Target audience
    #[serde(default)]
    pub target_group: Option<String>,

    /// Whether attendance requires prior registration
    #[serde(default)]
    pub registration_required: bool,
}

/// Organizing body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Organizer {
    pub name: String,

    #[serde(default)]
    pub short_name: Option<String>,
}

/// Source-specific metadata, opaque to the common pipeline.
///
/// Tagged by origin so presentation code can match exhaustively on the
/// shape that belongs to each source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SourceExtra {
    Campus {
        #[serde(default)]
        speaker: Option<String>,
        #[serde(default)]
        category: Option<String>,
    },
    Partner {
        #[serde(default)]
        speaker: Option<String>,
        #[serde(default)]
        virtual_only: bool,
    },
    Council {
        price_chf: f64,
        #[serde(default)]
        category: Option<String>,
    },
    Club {
        member_price_chf: f64,
        guest_price_chf: f64,
    },
}

/// The canonical record all adapters produce.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    /// Identifier, unique within its source
    pub id: String,

    /// Producing source
    pub source: Source,

    /// Title, description and link
    pub content: Content,

    /// Structured location, if any
    #[serde(default)]
    pub location: Option<Location>,

    /// Occurrences, ordered. Empty means the date is unknown.
    #[serde(default)]
    pub windows: Vec<TimeWindow>,

    /// Type/audience classification
    #[serde(default)]
    pub classification: Option<Classification>,

    /// Organizing body
    #[serde(default)]
    pub organizer: Option<Organizer>,

    /// Source-specific extras
    #[serde(default)]
    pub extra: Option<SourceExtra>,
}

impl Event {
    /// Check the record invariants: non-empty id and title, ordered windows.
    pub fn check(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(AppError::validation("event id is empty"));
        }
        if self.content.title.trim().is_empty() {
            return Err(AppError::validation("event title is empty"));
        }
        for window in &self.windows {
            if window.start > window.end {
                return Err(AppError::validation("event window ends before it starts"));
            }
        }
        Ok(())
    }

    /// URL-safe slug derived from title and id.
    pub fn slug(&self) -> String {
        let mut slug = String::with_capacity(self.content.title.len() + self.id.len() + 1);
        let mut last_dash = true;
        for c in self.content.title.chars() {
            if c.is_alphanumeric() {
                slug.extend(c.to_lowercase());
                last_dash = false;
            } else if !last_dash {
                slug.push('-');
                last_dash = true;
            }
        }
        if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
        slug.push_str(&self.id);
        slug
    }

    /// Start of the next occurrence at or after `now`.
    ///
    /// A window already in progress counts as starting now. `None` means
    /// the event has no determinable future start and sorts last.
    pub fn earliest_upcoming(&self, now: DateTime<Local>) -> Option<DateTime<Local>> {
        self.windows
            .iter()
            .filter_map(|w| {
                if w.start >= now {
                    Some(w.start)
                } else if w.end >= now {
                    Some(now)
                } else {
                    None
                }
            })
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_event() -> Event {
        Event {
            id: "4711".to_string(),
            source: Source::Campus,
            content: Content::new("Open Lab Night", "Tour of the robotics lab"),
            location: None,
            windows: Vec::new(),
            classification: None,
            organizer: None,
            extra: None,
        }
    }

    #[test]
    fn test_check_accepts_valid_event() {
        assert!(sample_event().check().is_ok());
    }

    #[test]
    fn test_check_rejects_blank_fields() {
        let mut event = sample_event();
        event.id = "  ".to_string();
        assert!(event.check().is_err());

        let mut event = sample_event();
        event.content.title = String::new();
        assert!(event.check().is_err());
    }

    #[test]
    fn test_window_rejects_inverted_range() {
        let start = Local.with_ymd_and_hms(2025, 12, 2, 18, 0, 0).unwrap();
        let end = Local.with_ymd_and_hms(2025, 12, 2, 16, 0, 0).unwrap();
        assert!(TimeWindow::new(start, end).is_none());
        assert!(TimeWindow::new(end, start).is_some());
    }

    #[test]
    fn test_slug() {
        let event = sample_event();
        assert_eq!(event.slug(), "open-lab-night-4711");
    }

    #[test]
    fn test_slug_collapses_punctuation() {
        let mut event = sample_event();
        event.content.title = "Apéro & BBQ — 2025!".to_string();
        assert_eq!(event.slug(), "apéro-bbq-2025-4711");
    }

    #[test]
    fn test_earliest_upcoming_prefers_running_window() {
        let now = Local.with_ymd_and_hms(2025, 12, 2, 12, 0, 0).unwrap();
        let mut event = sample_event();
        event.windows = vec![
            TimeWindow::new(
                Local.with_ymd_and_hms(2025, 12, 1, 9, 0, 0).unwrap(),
                Local.with_ymd_and_hms(2025, 12, 20, 18, 0, 0).unwrap(),
            )
            .unwrap(),
            TimeWindow::new(
                Local.with_ymd_and_hms(2025, 12, 5, 9, 0, 0).unwrap(),
                Local.with_ymd_and_hms(2025, 12, 5, 10, 0, 0).unwrap(),
            )
            .unwrap(),
        ];
        assert_eq!(event.earliest_upcoming(now), Some(now));
    }

    #[test]
    fn test_earliest_upcoming_none_for_past_or_undated() {
        let now = Local.with_ymd_and_hms(2025, 12, 2, 12, 0, 0).unwrap();

        let event = sample_event();
        assert_eq!(event.earliest_upcoming(now), None);

        let mut past = sample_event();
        past.windows = vec![
            TimeWindow::new(
                Local.with_ymd_and_hms(2025, 11, 1, 9, 0, 0).unwrap(),
                Local.with_ymd_and_hms(2025, 11, 1, 10, 0, 0).unwrap(),
            )
            .unwrap(),
        ];
        assert_eq!(past.earliest_upcoming(now), None);
    }
}
