/// Filesystem output for reports, artifacts, and level tables.
pub mod fs;
