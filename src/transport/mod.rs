/// Filesystem snapshot transport.
pub mod fs;
