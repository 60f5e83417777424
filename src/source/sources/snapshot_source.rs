use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::constants::source::{COUNTRY_LIST_FILE, DETAIL_FILE_EXTENSION, SNAPSHOT_SOURCE_ID};
use crate::data::{CountryDetail, CountrySummary};
use crate::errors::PairsError;
use crate::source::CountrySource;
use crate::source::wire::{decode_country_detail, decode_country_list, locator_file_name};
use crate::transport::fs::SnapshotDir;
use crate::types::{Locator, SourceId};

/// Offline source reading captured API payloads from a directory.
///
/// Layout:
/// - `countries.json` at the root holds the full list, as served by the API.
/// - Each detail record lives in a file named after its locator's last path
///   segment (query stripped, `.json` appended when missing), so a captured
///   `https://travelbriefing.org/Chad?format=json` is read from `Chad.json`.
pub struct SnapshotCountrySource {
    id: SourceId,
    snapshot: SnapshotDir,
}

impl SnapshotCountrySource {
    /// Create a source over `root` with the default source id.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_id(SNAPSHOT_SOURCE_ID, root)
    }

    /// Create a source over `root` with an explicit source id.
    pub fn with_id(id: impl Into<SourceId>, root: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            snapshot: SnapshotDir::new(root),
        }
    }

    fn read(&self, locator: &str, relative: &str) -> Result<String, PairsError> {
        self.snapshot
            .read_to_string(relative)
            .map_err(|err| self.fetch_failure(locator, &err))
    }

    fn fetch_failure(&self, locator: &str, err: &io::Error) -> PairsError {
        PairsError::FetchFailure {
            source_id: self.id.clone(),
            locator: locator.to_string(),
            reason: format!(
                "failed reading snapshot under {}: {err}",
                self.snapshot.root().display()
            ),
        }
    }
}

impl CountrySource for SnapshotCountrySource {
    fn id(&self) -> &str {
        &self.id
    }

    fn list_countries(&self) -> Result<Arc<Vec<CountrySummary>>, PairsError> {
        let body = self.read(COUNTRY_LIST_FILE, COUNTRY_LIST_FILE)?;
        let countries = decode_country_list(&self.id, COUNTRY_LIST_FILE, &body)?;
        debug!(
            source_id = %self.id,
            countries = countries.len(),
            captured_at = ?self.snapshot.modified_at(COUNTRY_LIST_FILE),
            "loaded country list snapshot"
        );
        Ok(Arc::new(countries))
    }

    fn fetch_detail(&self, locator: &Locator) -> Result<CountryDetail, PairsError> {
        let file_name = locator_file_name(locator, DETAIL_FILE_EXTENSION).ok_or_else(|| {
            PairsError::FetchFailure {
                source_id: self.id.clone(),
                locator: locator.clone(),
                reason: "locator does not name a snapshot file".into(),
            }
        })?;
        let body = self.read(locator, &file_name)?;
        decode_country_detail(&self.id, locator, &body)
    }
}
