use indexmap::IndexMap;
use serde::Serialize;

use crate::data::{CountrySummary, Pair};
use crate::types::CountryName;

/// How the computed pairs cover a sample.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PairCoverage {
    /// Number of sampled countries.
    pub sampled: usize,
    /// Number of pairs.
    pub pairs: usize,
    /// Sampled countries that appear in at least one pair.
    pub connected: usize,
    /// Sampled countries with no sampled neighbor, in sample order.
    pub isolated: Vec<CountryName>,
    /// Highest number of pairs any sampled country takes part in.
    pub max_degree: usize,
    /// Degrees sorted by degree descending, then name.
    pub per_country: Vec<CountryDegree>,
}

/// Number of pairs one sampled country takes part in.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CountryDegree {
    /// Country name.
    pub name: CountryName,
    /// Number of pairs involving it.
    pub degree: usize,
}

/// Compute pair coverage for `sample`. Returns `None` for an empty sample.
pub fn pair_coverage(sample: &[CountrySummary], pairs: &[Pair]) -> Option<PairCoverage> {
    if sample.is_empty() {
        return None;
    }
    let mut degrees: IndexMap<&str, usize> = sample
        .iter()
        .map(|country| (country.name.as_str(), 0usize))
        .collect();
    for pair in pairs {
        for name in [pair.name1.as_str(), pair.name2.as_str()] {
            if let Some(degree) = degrees.get_mut(name) {
                *degree += 1;
            }
        }
    }
    let isolated: Vec<CountryName> = degrees
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(name, _)| (*name).to_string())
        .collect();
    let max_degree = degrees.values().copied().max().unwrap_or(0);
    let mut per_country: Vec<CountryDegree> = degrees
        .iter()
        .map(|(name, degree)| CountryDegree {
            name: (*name).to_string(),
            degree: *degree,
        })
        .collect();
    per_country.sort_by(|a, b| b.degree.cmp(&a.degree).then_with(|| a.name.cmp(&b.name)));
    Some(PairCoverage {
        sampled: degrees.len(),
        pairs: pairs.len(),
        connected: degrees.len() - isolated.len(),
        isolated,
        max_degree,
        per_country,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summaries(names: &[&str]) -> Vec<CountrySummary> {
        names
            .iter()
            .map(|name| CountrySummary::new(*name, *name))
            .collect()
    }

    fn pair(a: &str, b: &str) -> Pair {
        Pair {
            name1: a.to_string(),
            name2: b.to_string(),
        }
    }

    #[test]
    fn coverage_counts_degrees_and_isolated_countries() {
        let sample = summaries(&["France", "Spain", "Andorra", "Japan"]);
        let pairs = vec![
            pair("France", "Spain"),
            pair("France", "Andorra"),
            pair("Andorra", "Spain"),
        ];
        let coverage = pair_coverage(&sample, &pairs).expect("coverage");
        assert_eq!(coverage.sampled, 4);
        assert_eq!(coverage.pairs, 3);
        assert_eq!(coverage.connected, 3);
        assert_eq!(coverage.isolated, vec!["Japan".to_string()]);
        assert_eq!(coverage.max_degree, 2);
        assert_eq!(coverage.per_country[0].name, "Andorra");
        assert_eq!(coverage.per_country[3].name, "Japan");
        assert_eq!(coverage.per_country[3].degree, 0);
    }

    #[test]
    fn empty_sample_has_no_coverage() {
        assert!(pair_coverage(&[], &[]).is_none());
    }
}
