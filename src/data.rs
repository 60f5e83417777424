use serde::{Deserialize, Serialize};

pub use crate::types::{CountryName, Locator};

/// Entry from the full country list.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CountrySummary {
    /// Display name of the country.
    pub name: CountryName,
    /// Reference passed back to the source to fetch the detail record.
    #[serde(rename = "url")]
    pub locator: Locator,
}

impl CountrySummary {
    /// Build a summary from a name and locator.
    pub fn new(name: impl Into<CountryName>, locator: impl Into<Locator>) -> Self {
        Self {
            name: name.into(),
            locator: locator.into(),
        }
    }
}

/// Reference to a bordering country, by name only.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NeighborRef {
    /// Name of the bordering country.
    pub name: CountryName,
}

impl NeighborRef {
    /// Reference a neighbor by name.
    pub fn new(name: impl Into<CountryName>) -> Self {
        Self { name: name.into() }
    }
}

/// Full record for one sampled country.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryDetail {
    /// Country name; must be non-blank for pair computation.
    pub name: CountryName,
    /// Bordering countries. Empty for islands and for records without the field.
    #[serde(default)]
    pub neighbors: Vec<NeighborRef>,
}

impl CountryDetail {
    /// Build a detail record from a name and a list of neighbor names.
    pub fn new<I, N>(name: impl Into<CountryName>, neighbors: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<CountryName>,
    {
        Self {
            name: name.into(),
            neighbors: neighbors.into_iter().map(NeighborRef::new).collect(),
        }
    }
}

/// One unordered neighbor relationship between two sampled countries.
///
/// `name1` is the country whose neighbor list produced the pair first; the
/// direction carries no meaning.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair {
    /// Country that listed the other first.
    pub name1: CountryName,
    /// The neighbor it listed.
    pub name2: CountryName,
}

impl Pair {
    /// Returns `true` when this pair relates `a` and `b`, in either direction.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.name1 == a && self.name2 == b) || (self.name1 == b && self.name2 == a)
    }

    /// Returns `true` when `name` is one side of this pair.
    pub fn involves(&self, name: &str) -> bool {
        self.name1 == name || self.name2 == name
    }
}
