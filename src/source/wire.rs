//! Decoding of the travelbriefing.org JSON payloads.
//!
//! Full list: `[{"name": "Netherlands", "url": "https://..."}]`.
//! Detail: `{"names": {"name": "Netherlands", ...},
//! "neighbors": [{"id": "BE", "name": "Belgium"}], ...}`.
//! Unknown fields are ignored. Invalid JSON is a fetch failure; valid JSON
//! with missing names or the wrong shape is a data-integrity failure.

use serde::Deserialize;

use crate::data::{CountryDetail, CountrySummary, NeighborRef};
use crate::errors::PairsError;
use crate::types::Locator;
use crate::utils::{normalize_inline_whitespace, normalize_name};

#[derive(Debug, Deserialize)]
struct RawSummary {
    name: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDetail {
    names: Option<RawNames>,
    #[serde(default)]
    neighbors: Option<Vec<RawNeighbor>>,
}

#[derive(Debug, Deserialize)]
struct RawNames {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawNeighbor {
    name: Option<String>,
}

/// Parse `body` as JSON. Bodies that are not JSON at all are fetch failures.
fn parse_body(
    source_id: &str,
    locator: &str,
    body: &str,
    what: &str,
) -> Result<serde_json::Value, PairsError> {
    serde_json::from_str(body).map_err(|err| PairsError::FetchFailure {
        source_id: source_id.to_string(),
        locator: locator.to_string(),
        reason: format!("failed parsing {what}: {err}"),
    })
}

/// Decode the full country list served at `locator`.
pub fn decode_country_list(
    source_id: &str,
    locator: &str,
    body: &str,
) -> Result<Vec<CountrySummary>, PairsError> {
    let value = parse_body(source_id, locator, body, "country list")?;
    let raw = Vec::<RawSummary>::deserialize(value).map_err(|err| {
        PairsError::DataIntegrity(format!("country list from '{locator}' is malformed: {err}"))
    })?;
    raw.into_iter()
        .enumerate()
        .map(|(idx, entry)| {
            let name = normalize_name(entry.name.as_deref()).ok_or_else(|| {
                PairsError::DataIntegrity(format!(
                    "country list entry {idx} from '{locator}' has no name"
                ))
            })?;
            let url = entry
                .url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .ok_or_else(|| {
                    PairsError::DataIntegrity(format!(
                        "country list entry '{name}' from '{locator}' has no url"
                    ))
                })?;
            Ok(CountrySummary::new(name, url))
        })
        .collect()
}

/// Decode one country detail record fetched from `locator`.
pub fn decode_country_detail(
    source_id: &str,
    locator: &Locator,
    body: &str,
) -> Result<CountryDetail, PairsError> {
    let value = parse_body(source_id, locator, body, "country detail")?;
    let raw = RawDetail::deserialize(value).map_err(|err| {
        PairsError::DataIntegrity(format!("detail record from '{locator}' is malformed: {err}"))
    })?;
    let name = raw
        .names
        .as_ref()
        .and_then(|names| normalize_name(names.name.as_deref()))
        .ok_or_else(|| {
            PairsError::DataIntegrity(format!("detail record from '{locator}' has no name"))
        })?;
    let neighbors = raw
        .neighbors
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(idx, neighbor)| {
            normalize_name(neighbor.name.as_deref())
                .map(NeighborRef::new)
                .ok_or_else(|| {
                    PairsError::DataIntegrity(format!(
                        "neighbor {idx} of '{name}' from '{locator}' has no name"
                    ))
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CountryDetail { name, neighbors })
}

/// File name a locator maps to inside a snapshot directory.
///
/// Uses the last path segment with any query or fragment stripped, and
/// appends `.{extension}` when the segment has no extension.
/// `https://travelbriefing.org/Netherlands?format=json` maps to `Netherlands.json`.
pub fn locator_file_name(locator: &str, extension: &str) -> Option<String> {
    let without_query = locator
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');
    let segment = without_query.rsplit('/').next().unwrap_or_default();
    let segment = normalize_inline_whitespace(segment);
    if segment.is_empty() || segment == "." || segment == ".." {
        return None;
    }
    if segment.contains('.') {
        Some(segment)
    } else {
        Some(format!("{segment}.{extension}"))
    }
}
