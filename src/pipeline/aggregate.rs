// src/pipeline/aggregate.rs

//! Concurrent fetch-and-merge across all sources.

use std::sync::Arc;

use chrono::{DateTime, Local};
use futures::future;
use reqwest::Client;

use crate::error::Result;
use crate::keywords::Lexicon;
use crate::models::{Config, Event, Source};
use crate::pipeline::{FilterOptions, filter, group};
use crate::sources::{Adapter, CampusApi, ClubSite, CouncilListing, PartnerApi};
use crate::utils::http;

/// Result of one aggregation run.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// All extracted events, in fixed source order
    pub events: Vec<Event>,

    /// Per-source record counts and failure flags
    pub reports: Vec<SourceReport>,
}

/// What one source contributed to a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub source: Source,
    pub count: usize,
    pub failed: bool,
}

/// Fetches every source concurrently and merges the results.
///
/// A failing source contributes an empty list and a `failed` report entry;
/// the aggregate call itself never fails.
pub struct Aggregator {
    config: Arc<Config>,
    client: Client,
    adapters: Vec<Box<dyn Adapter>>,
}

impl Aggregator {
    /// Build the adapter set from configuration.
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let client = http::create_client(&config.http)?;
        let include_paid = config.filter.include_paid;

        let adapters: Vec<Box<dyn Adapter>> = vec![
            Box::new(CampusApi::new(&config.sources.campus_url)),
            Box::new(PartnerApi::new(&config.sources.partner_url)),
            Box::new(CouncilListing::new(&config.sources.council_url, include_paid)),
            Box::new(ClubSite::alumni(&config.sources.alumni, &config.http, include_paid)),
            Box::new(ClubSite::sports(&config.sources.sports, &config.http, include_paid)),
        ];

        Ok(Self {
            config,
            client,
            adapters,
        })
    }

    /// Fetch all sources concurrently and concatenate their events.
    ///
    /// The two club adapters pace themselves internally; everything else
    /// runs fully in parallel. Always resolves, possibly with zero events.
    pub async fn fetch_all(&self) -> FetchOutcome {
        let runs = self.adapters.iter().map(|adapter| async move {
            let source = adapter.source();
            match adapter.fetch(&self.client).await {
                Ok(events) => {
                    log::info!("{}: {} events", source, events.len());
                    (source, events, false)
                }
                Err(error) => {
                    log::warn!("{}: fetch failed: {}", source, error);
                    (source, Vec::new(), true)
                }
            }
        });

        let mut outcome = FetchOutcome::default();
        for (source, events, failed) in future::join_all(runs).await {
            outcome.reports.push(SourceReport {
                source,
                count: events.len(),
                failed,
            });
            outcome.events.extend(events);
        }
        outcome
    }

    /// Full pipeline: fetch, apply the configured filters, sort.
    ///
    /// This is what a presentation layer's load/refresh action calls.
    pub async fn fetch_filtered(&self, now: DateTime<Local>) -> Vec<Event> {
        let outcome = self.fetch_all().await;
        let options = FilterOptions::from_config(&self.config.filter, now);
        let lexicon = Lexicon::with_extra(&self.config.filter.extra_keywords);

        let mut events = filter::apply(outcome.events, &options, &lexicon);
        group::sort_chronological(&mut events, now);
        events
    }
}
