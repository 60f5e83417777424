//! Country source interfaces and built-in adapters.
//!
//! Ownership model:
//! - `CountrySource` is the orchestrator-facing interface: one call for the
//!   full country list, one call per detail record.
//! - The full list is handed out as `Arc<Vec<_>>` so it can be cached and
//!   shared across cycles; consumers only ever borrow it.
//! - `CachingSource` memoizes the full list of any inner source.

use indexmap::IndexMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

use crate::data::{CountryDetail, CountrySummary};
use crate::errors::PairsError;
use crate::types::{Locator, SourceId};

/// Source implementation modules.
pub mod sources;
/// JSON wire decoding shared by sources.
pub mod wire;

#[cfg(feature = "http")]
pub use sources::http_source::HttpCountrySource;
pub use sources::snapshot_source::SnapshotCountrySource;

/// Read capability over a country dataset.
///
/// Implementations must be callable from several threads at once; the
/// detail fetcher issues one `fetch_detail` per sampled country concurrently.
pub trait CountrySource: Send + Sync {
    /// Stable source identifier used in logs and errors.
    fn id(&self) -> &str;

    /// Return the complete list of country summaries.
    fn list_countries(&self) -> Result<Arc<Vec<CountrySummary>>, PairsError>;

    /// Fetch the detail record addressed by `locator`.
    fn fetch_detail(&self, locator: &Locator) -> Result<CountryDetail, PairsError>;
}

impl<S: CountrySource + ?Sized> CountrySource for Arc<S> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn list_countries(&self) -> Result<Arc<Vec<CountrySummary>>, PairsError> {
        (**self).list_countries()
    }

    fn fetch_detail(&self, locator: &Locator) -> Result<CountryDetail, PairsError> {
        (**self).fetch_detail(locator)
    }
}

/// In-memory country source for tests and small fixed datasets.
pub struct InMemorySource {
    id: SourceId,
    countries: Arc<Vec<CountrySummary>>,
    details: IndexMap<Locator, CountryDetail>,
}

impl InMemorySource {
    /// Create a source from explicit summaries and details keyed by locator.
    pub fn new(
        id: impl Into<SourceId>,
        countries: Vec<CountrySummary>,
        details: impl IntoIterator<Item = (Locator, CountryDetail)>,
    ) -> Self {
        Self {
            id: id.into(),
            countries: Arc::new(countries),
            details: details.into_iter().collect(),
        }
    }

    /// Create a source where each detail's locator is its name.
    pub fn from_details(id: impl Into<SourceId>, details: Vec<CountryDetail>) -> Self {
        let countries = details
            .iter()
            .map(|detail| CountrySummary::new(detail.name.clone(), detail.name.clone()))
            .collect();
        let keyed = details
            .into_iter()
            .map(|detail| (detail.name.clone(), detail));
        Self::new(id, countries, keyed)
    }
}

impl CountrySource for InMemorySource {
    fn id(&self) -> &str {
        &self.id
    }

    fn list_countries(&self) -> Result<Arc<Vec<CountrySummary>>, PairsError> {
        Ok(Arc::clone(&self.countries))
    }

    fn fetch_detail(&self, locator: &Locator) -> Result<CountryDetail, PairsError> {
        self.details
            .get(locator)
            .cloned()
            .ok_or_else(|| PairsError::FetchFailure {
                source_id: self.id.clone(),
                locator: locator.clone(),
                reason: "no detail record for locator".into(),
            })
    }
}

/// Wrapper that fetches the full country list once and reuses it.
///
/// Detail reads always pass through to the inner source.
pub struct CachingSource<S> {
    inner: S,
    countries: RwLock<Option<Arc<Vec<CountrySummary>>>>,
}

impl<S: CountrySource> CachingSource<S> {
    /// Wrap `inner` with an empty list cache.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            countries: RwLock::new(None),
        }
    }

    /// Drop the cached list so the next call refetches it.
    pub fn invalidate(&self) {
        let mut guard = self.countries.write().expect("country list cache poisoned");
        guard.take();
    }

    /// Access the wrapped source.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: CountrySource> CountrySource for CachingSource<S> {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn list_countries(&self) -> Result<Arc<Vec<CountrySummary>>, PairsError> {
        if let Some(cached) = self
            .countries
            .read()
            .expect("country list cache poisoned")
            .as_ref()
        {
            return Ok(Arc::clone(cached));
        }
        let fresh = self.inner.list_countries()?;
        let mut guard = self.countries.write().expect("country list cache poisoned");
        // Another thread may have filled the cache while we were fetching.
        let cached = guard.get_or_insert_with(|| Arc::clone(&fresh));
        debug!(
            source_id = %self.inner.id(),
            countries = cached.len(),
            "cached full country list"
        );
        Ok(Arc::clone(cached))
    }

    fn fetch_detail(&self, locator: &Locator) -> Result<CountryDetail, PairsError> {
        self.inner.fetch_detail(locator)
    }
}
