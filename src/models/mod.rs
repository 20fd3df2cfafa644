// src/models/mod.rs

//! Domain models for the aggregation pipeline.
//!
//! This module contains all data structures used throughout the crate,
//! organized by their primary purpose.

mod config;
mod event;

// Re-export all public types
pub use config::{ClubSiteConfig, Config, FilterConfig, HttpConfig, SourcesConfig};
pub use event::{
    Classification, Content, Event, Location, Organizer, Source, SourceExtra, TimeWindow,
};
