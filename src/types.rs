/// Country display name, also used as the country's identity inside a sample.
/// Example: `Netherlands`
pub type CountryName = String;
/// Opaque reference used to fetch a country's detail record.
/// Examples: `https://travelbriefing.org/Netherlands?format=json`, `Netherlands.json`
pub type Locator = String;
/// Identifier for the source that produced country records.
/// Examples: `travelbriefing`, `snapshot`, `in_memory`
pub type SourceId = String;
/// Monotonic identifier of one sample → fetch → pairs run.
/// Starts at 1; 0 means no cycle has been started.
pub type CycleId = u64;
