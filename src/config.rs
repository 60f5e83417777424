use std::time::Duration;

use crate::constants::fetch::{DEFAULT_MAX_IN_FLIGHT, DEFAULT_TIMEOUT_SECS};
use crate::constants::sampler::DEFAULT_SAMPLE_SIZE;
use crate::constants::source::DEFAULT_COUNTRIES_URL;
use crate::errors::PairsError;

/// Controls how detail records are fetched for a sample.
#[derive(Clone, Debug)]
pub struct FetchConfig {
    /// Max detail fetches running concurrently; larger samples are fetched in waves.
    pub max_in_flight: usize,
    /// Per-request timeout applied by network sources.
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Top-level configuration for a pairs orchestrator.
#[derive(Clone, Debug)]
pub struct PairsConfig {
    /// Number of countries drawn per cycle.
    pub sample_size: usize,
    /// Base RNG seed. `None` draws a random base seed once per orchestrator.
    pub seed: Option<u64>,
    /// URL of the full country list used by the HTTP source.
    pub countries_url: String,
    /// Detail fetch behavior.
    pub fetch: FetchConfig,
}

impl Default for PairsConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            seed: None,
            countries_url: DEFAULT_COUNTRIES_URL.to_string(),
            fetch: FetchConfig::default(),
        }
    }
}

impl PairsConfig {
    /// Reject settings that can never produce a cycle.
    ///
    /// `sample_size` is checked against the country list at sampling time, not here.
    pub fn validate(&self) -> Result<(), PairsError> {
        if self.fetch.max_in_flight == 0 {
            return Err(PairsError::Configuration(
                "fetch.max_in_flight must be greater than zero".into(),
            ));
        }
        if self.fetch.timeout.is_zero() {
            return Err(PairsError::Configuration(
                "fetch.timeout must be greater than zero".into(),
            ));
        }
        if self.countries_url.trim().is_empty() {
            return Err(PairsError::Configuration(
                "countries_url must not be empty".into(),
            ));
        }
        Ok(())
    }
}
