//! Unique neighbor pairs among a fully-detailed sample.

use std::collections::HashSet;

use tracing::debug;

use crate::data::{CountryDetail, Pair};
use crate::errors::PairsError;

/// Compute the unique unordered neighbor pairs among `details`.
///
/// Only relationships between two countries that are both present in
/// `details` count. `{A, B}` is emitted at most once no matter how many times
/// or in which direction it appears; the first direction seen decides
/// `name1`/`name2`. Pairs are returned in discovery order.
///
/// A record with a blank name fails the whole computation with
/// [`PairsError::DataIntegrity`]; nothing is dropped silently because the
/// membership set would no longer describe the sample.
pub fn find_pairs(details: &[CountryDetail]) -> Result<Vec<Pair>, PairsError> {
    let mut members: HashSet<&str> = HashSet::with_capacity(details.len());
    for (idx, detail) in details.iter().enumerate() {
        if detail.name.trim().is_empty() {
            return Err(PairsError::DataIntegrity(format!(
                "detail record at position {idx} has no name"
            )));
        }
        members.insert(detail.name.as_str());
    }

    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut pairs = Vec::new();
    for detail in details {
        let own = detail.name.as_str();
        for neighbor in &detail.neighbors {
            let other = neighbor.name.as_str();
            if !members.contains(other) {
                continue;
            }
            if other == own {
                debug!(country = own, "ignoring self-referencing neighbor entry");
                continue;
            }
            if seen.insert(pair_key(own, other)) {
                pairs.push(Pair {
                    name1: own.to_string(),
                    name2: other.to_string(),
                });
            }
        }
    }
    Ok(pairs)
}

/// Direction-independent dedup key.
fn pair_key<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b { (a, b) } else { (b, a) }
}
