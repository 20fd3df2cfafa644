// src/pipeline/mod.rs

//! Pipeline stages from raw sources to a displayable event list.
//!
//! - `aggregate`: fetch every source concurrently and merge the results
//! - `filter`: time-window and food-keyword predicates
//! - `group`: grouping by source label and chronological ordering

pub mod aggregate;
pub mod filter;
pub mod group;

pub use aggregate::{Aggregator, FetchOutcome, SourceReport};
pub use filter::{FilterOptions, apply, is_food_related, within_horizon};
pub use group::{group_by_label, sort_chronological, source_label};
