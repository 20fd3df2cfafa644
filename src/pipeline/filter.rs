// src/pipeline/filter.rs

//! Time-window and food-keyword filters.
//!
//! Both predicates are independent and composable; `apply` runs whichever
//! ones the options enable.

use chrono::{DateTime, Duration, Local};

use crate::keywords::Lexicon;
use crate::models::{Event, FilterConfig, Source};

/// Filter switches and parameters for one pipeline run.
#[derive(Debug, Clone)]
pub struct FilterOptions {
    /// Reference instant for the horizon window
    pub now: DateTime<Local>,

    /// Forward horizon
    pub horizon: Duration,

    /// Apply the time-window filter
    pub by_time: bool,

    /// Apply the food-keyword filter
    pub by_food: bool,

    /// Sources included by the food filter regardless of text
    pub food_sources: Vec<Source>,
}

impl FilterOptions {
    /// Build options from configuration, with both filters enabled.
    pub fn from_config(config: &FilterConfig, now: DateTime<Local>) -> Self {
        Self {
            now,
            horizon: Duration::days(i64::from(config.horizon_days)),
            by_time: true,
            by_food: true,
            food_sources: config.food_sources.clone(),
        }
    }
}

/// True when at least one window intersects `[now, now + horizon]`.
///
/// Covers both cases the sources produce: a discrete occurrence starting
/// inside the horizon, and a wide opening-hours range that began earlier
/// but is still running. Undated events never pass.
pub fn within_horizon(event: &Event, now: DateTime<Local>, horizon: Duration) -> bool {
    let until = now + horizon;
    event.windows.iter().any(|w| w.overlaps(now, until))
}

/// True when the event's text mentions food, or its source is on the
/// always-included list.
pub fn is_food_related(event: &Event, lexicon: &Lexicon, food_sources: &[Source]) -> bool {
    food_sources.contains(&event.source)
        || lexicon.has_match(&event.content.title)
        || lexicon.has_match(&event.content.description)
}

/// Apply the enabled filters, preserving input order.
pub fn apply(events: Vec<Event>, options: &FilterOptions, lexicon: &Lexicon) -> Vec<Event> {
    events
        .into_iter()
        .filter(|event| !options.by_time || within_horizon(event, options.now, options.horizon))
        .filter(|event| {
            !options.by_food || is_food_related(event, lexicon, &options.food_sources)
        })
        .collect()
}
