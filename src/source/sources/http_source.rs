use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};
use ureq::Agent;

use crate::config::PairsConfig;
use crate::constants::source::HTTP_SOURCE_ID;
use crate::data::{CountryDetail, CountrySummary};
use crate::errors::PairsError;
use crate::source::CountrySource;
use crate::source::wire::{decode_country_detail, decode_country_list};
use crate::types::{Locator, SourceId};

/// Country source backed by the travelbriefing.org JSON API.
///
/// Locators are the absolute detail URLs listed in the full country list.
/// Timeouts are enforced by the agent; there are no retries.
pub struct HttpCountrySource {
    id: SourceId,
    countries_url: String,
    agent: Agent,
}

impl HttpCountrySource {
    /// Create a source for `countries_url` with a per-request `timeout`.
    pub fn new(countries_url: impl Into<String>, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            id: HTTP_SOURCE_ID.to_string(),
            countries_url: countries_url.into(),
            agent,
        }
    }

    /// Create a source from the list URL and timeout in `config`.
    pub fn from_config(config: &PairsConfig) -> Self {
        Self::new(config.countries_url.clone(), config.fetch.timeout)
    }

    fn get_body(&self, url: &str) -> Result<String, PairsError> {
        let started = Instant::now();
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|err| PairsError::FetchFailure {
                source_id: self.id.clone(),
                locator: url.to_string(),
                reason: format!("request failed: {err}"),
            })?;
        let body = response
            .into_body()
            .read_to_string()
            .map_err(|err| PairsError::FetchFailure {
                source_id: self.id.clone(),
                locator: url.to_string(),
                reason: format!("failed reading response body: {err}"),
            })?;
        debug!(
            source_id = %self.id,
            url,
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "fetched response"
        );
        Ok(body)
    }
}

impl CountrySource for HttpCountrySource {
    fn id(&self) -> &str {
        &self.id
    }

    fn list_countries(&self) -> Result<Arc<Vec<CountrySummary>>, PairsError> {
        info!(
            "[border_pairs:http] reading full country list from {}",
            self.countries_url
        );
        let body = self.get_body(&self.countries_url)?;
        let countries = decode_country_list(&self.id, &self.countries_url, &body)?;
        Ok(Arc::new(countries))
    }

    fn fetch_detail(&self, locator: &Locator) -> Result<CountryDetail, PairsError> {
        let body = self.get_body(locator)?;
        decode_country_detail(&self.id, locator, &body)
    }
}
