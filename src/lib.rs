#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Command-line runner used by the `border_pairs` binary.
pub mod app;
/// Orchestrator and fetch configuration types.
pub mod config;
/// Centralized constants used across sampler, sources, fetcher, and report.
pub mod constants;
/// Country, neighbor, and pair record types.
pub mod data;
/// Concurrent all-or-nothing detail fetching.
pub mod fetch;
mod hash;
/// Pair coverage statistics for a sample.
pub mod metrics;
/// Cycle orchestration with two loading phases and stale-cycle discard.
pub mod orchestrator;
/// Unique neighbor pair computation.
pub mod pairs;
/// Text and JSON rendering of orchestrator state.
pub mod report;
/// Sampling without replacement.
pub mod sampler;
/// Country source traits and built-in sources.
pub mod source;
/// Input transports used by sources (snapshot directories today).
pub mod transport;
/// Shared type aliases.
pub mod types;
/// Name normalization helpers.
pub mod utils;

mod errors;

pub use config::{FetchConfig, PairsConfig};
pub use data::{CountryDetail, CountrySummary, NeighborRef, Pair};
pub use errors::{FailureKind, PairsError};
pub use fetch::DetailFetcher;
pub use orchestrator::{CycleFailure, Orchestrator, PhaseState, PresentationState};
pub use pairs::find_pairs;
pub use sampler::{CountrySampler, sample};
#[cfg(feature = "http")]
pub use source::HttpCountrySource;
pub use source::{CachingSource, CountrySource, InMemorySource, SnapshotCountrySource};
pub use types::{CountryName, CycleId, Locator, SourceId};
