/// Constants used by the sampler and per-cycle seeding.
pub mod sampler {
    /// Number of countries drawn per cycle unless configured otherwise.
    pub const DEFAULT_SAMPLE_SIZE: usize = 10;
    /// Offset mixed into per-cycle seed derivation.
    pub const CYCLE_SEED_OFFSET: u64 = 0xB0DE_5EED;
}

/// Constants used by country sources.
pub mod source {
    /// Full country list served by travelbriefing.org.
    pub const DEFAULT_COUNTRIES_URL: &str = "https://travelbriefing.org/countries.json";
    /// Source id reported by the HTTP source.
    pub const HTTP_SOURCE_ID: &str = "travelbriefing";
    /// Source id reported by the snapshot directory source.
    pub const SNAPSHOT_SOURCE_ID: &str = "snapshot";
    /// File name of the full country list inside a snapshot directory.
    pub const COUNTRY_LIST_FILE: &str = "countries.json";
    /// Extension appended to detail file names that lack one.
    pub const DETAIL_FILE_EXTENSION: &str = "json";
}

/// Constants used by the concurrent detail fetcher.
pub mod fetch {
    /// Maximum detail fetches running at once.
    pub const DEFAULT_MAX_IN_FLIGHT: usize = 16;
    /// Per-request timeout for network sources, in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
    /// Failure reason emitted when a fetch worker panics.
    pub const FETCH_PANICKED_REASON: &str = "detail fetch thread panicked";
}

/// Constants used by text rendering.
pub mod report {
    /// Heading above the sampled countries.
    pub const SAMPLE_HEADING: &str = "Selected Countries:";
    /// Heading above the neighbor pairs.
    pub const PAIRS_HEADING: &str = "Neighbors:";
    /// Shown while a phase is loading.
    pub const LOADING_LINE: &str = "Loading...";
    /// Shown when pairing finished with zero pairs.
    pub const NO_GROUPINGS_LINE: &str = "No groupings found!";
    /// Shown for a phase that has not started.
    pub const NOT_STARTED_LINE: &str = "Not started.";
}
