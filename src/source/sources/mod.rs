/// Snapshot-directory-backed source implementation.
pub mod snapshot_source;

#[cfg(feature = "http")]
/// travelbriefing.org HTTP source implementation.
pub mod http_source;
