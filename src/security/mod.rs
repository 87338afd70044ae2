//! Checkout location validation

pub mod disk_usage;
pub mod path_guard;

pub use disk_usage::{DiskUsageProbe, DuProbe, FixedSizeProbe};
pub use path_guard::PathGuard;
