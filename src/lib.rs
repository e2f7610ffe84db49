pub mod config;
pub mod error;
/// readpref - client-side server selection for MongoDB replica sets
///
/// Given the connections a driver knows about and a read preference, decides
/// which servers may serve a read, in which order they are preferred, and
/// finally which one to use:
/// 1. Candidate collection: role eligibility for the mode, then tag sets
/// 2. Sorting: by latency, or by preferred role then latency
/// 3. Latency window: servers within `cutoff_ms` of the best ranked one
/// 4. Pick: the primary for "primary preferred", otherwise a random member
///
/// The engine performs no I/O. Connection records (roles, latencies, tags)
/// come from a registry kept up to date by the caller's health checks.
pub mod core;
pub mod read_preference;
pub mod selection;
pub mod utils;

pub use crate::core::{Connection, ConnectionRegistry, NodeRole, RoleSet};
pub use crate::error::{ConfigError, ReadPrefError, ReadPrefResult, SelectionError};
pub use crate::read_preference::{mode_display_name, ReadMode, ReadPreference, TagSet};
pub use crate::selection::{
    find_candidates, pick, select_nearest, sort_servers, Candidates, ServerSelector,
    DEFAULT_CUTOFF_MS,
};

/// Tracing target for replica set selection diagnostics
pub const LOG_TARGET: &str = "readpref::rs";
