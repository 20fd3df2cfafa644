// src/pipeline/group.rs

//! Grouping and chronological ordering for display.

use std::collections::BTreeMap;

use chrono::{DateTime, Local};

use crate::models::Event;

/// Display label an event is grouped under: organizer short name, else the
/// classification label, else "Other".
pub fn source_label(event: &Event) -> String {
    if let Some(short_name) = event
        .organizer
        .as_ref()
        .and_then(|o| o.short_name.as_deref())
        .filter(|s| !s.trim().is_empty())
    {
        return short_name.to_string();
    }
    if let Some(classification) = &event.classification {
        if !classification.type_label.trim().is_empty() {
            return classification.type_label.clone();
        }
    }
    "Other".to_string()
}

/// Group events into a label-keyed map, preserving relative order inside
/// each group.
pub fn group_by_label(events: Vec<Event>) -> BTreeMap<String, Vec<Event>> {
    let mut groups: BTreeMap<String, Vec<Event>> = BTreeMap::new();
    for event in events {
        groups.entry(source_label(&event)).or_default().push(event);
    }
    groups
}

/// Sort by earliest upcoming start, stably; events without a determinable
/// future start go last.
pub fn sort_chronological(events: &mut [Event], now: DateTime<Local>) {
    events.sort_by_key(|event| {
        let key = event.earliest_upcoming(now);
        (key.is_none(), key)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Classification, Content, Organizer, Source, TimeWindow};
    use chrono::{Duration, TimeZone};

    fn base_event(id: &str) -> Event {
        Event {
            id: id.to_string(),
            source: Source::Campus,
            content: Content::new("Event", ""),
            location: None,
            windows: Vec::new(),
            classification: None,
            organizer: None,
            extra: None,
        }
    }

    #[test]
    fn test_source_label_precedence() {
        let mut event = base_event("1");
        assert_eq!(source_label(&event), "Other");

        event.classification = Some(Classification {
            type_label: "Conference".to_string(),
            target_group: None,
            registration_required: false,
        });
        assert_eq!(source_label(&event), "Conference");

        event.organizer = Some(Organizer {
            name: "Physics Section".to_string(),
            short_name: Some("PHYS".to_string()),
        });
        assert_eq!(source_label(&event), "PHYS");
    }

    #[test]
    fn test_organizer_without_short_name_falls_through() {
        let mut event = base_event("2");
        event.organizer = Some(Organizer {
            name: "Physics Section".to_string(),
            short_name: None,
        });
        assert_eq!(source_label(&event), "Other");
    }

    #[test]
    fn test_group_by_label() {
        let mut a = base_event("a");
        a.organizer = Some(Organizer {
            name: "Physics Section".to_string(),
            short_name: Some("PHYS".to_string()),
        });
        let b = base_event("b");
        let mut c = base_event("c");
        c.organizer = a.organizer.clone();

        let groups = group_by_label(vec![a, b, c]);
        assert_eq!(groups.len(), 2);
        let phys: Vec<&str> = groups["PHYS"].iter().map(|e| e.id.as_str()).collect();
        assert_eq!(phys, vec!["a", "c"]);
        assert_eq!(groups["Other"].len(), 1);
    }

    #[test]
    fn test_sort_chronological_undated_last_stable() {
        let now = Local.with_ymd_and_hms(2025, 12, 1, 12, 0, 0).unwrap();
        let window = |days: i64| {
            let start = now + Duration::days(days);
            TimeWindow::new(start, start + Duration::hours(1)).unwrap()
        };

        let mut later = base_event("later");
        later.windows = vec![window(5)];
        let mut sooner = base_event("sooner");
        sooner.windows = vec![window(1)];
        let undated_one = base_event("undated-one");
        let undated_two = base_event("undated-two");
        let mut past = base_event("past");
        past.windows = vec![window(-3)];

        let mut events = vec![undated_one, later, past, sooner, undated_two];
        sort_chronological(&mut events, now);

        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["sooner", "later", "undated-one", "past", "undated-two"]
        );
    }
}
