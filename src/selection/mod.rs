/// Server selection pipeline
///
/// A selection runs four stages over borrowed connection records:
/// - find: role filtering, then the first tag set that matches anything
/// - sort: by latency, or preferred role then latency
/// - narrow: keep servers within the latency window of the head
/// - pick: the primary for "primary preferred", otherwise a random member
pub mod collector;
pub mod nearest;
pub mod picker;
pub mod sort;

pub use collector::find_candidates;
pub use nearest::{select_nearest, DEFAULT_CUTOFF_MS};
pub use picker::pick;
pub use sort::{sort_servers, SortStrategy};

use crate::config::SelectionConfig;
use crate::core::{Connection, ConnectionRegistry};
use crate::error::SelectionError;
use crate::read_preference::ReadPreference;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Borrowed connections flowing between stages; never owns the records
pub type Candidates<'a> = Vec<&'a Connection>;

/// Runs the whole pipeline with a fixed latency window and an owned random source
pub struct ServerSelector<R = StdRng> {
    cutoff_ms: u64,
    rng: R,
}

impl ServerSelector<StdRng> {
    /// Build a selector from configuration; a configured seed makes picks reproducible
    pub fn from_config(config: &SelectionConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config.cutoff_ms, rng)
    }
}

impl Default for ServerSelector<StdRng> {
    fn default() -> Self {
        Self::from_config(&SelectionConfig::default())
    }
}

impl<R: Rng> ServerSelector<R> {
    pub fn with_rng(cutoff_ms: u64, rng: R) -> Self {
        Self { cutoff_ms, rng }
    }

    pub fn cutoff_ms(&self) -> u64 {
        self.cutoff_ms
    }

    /// Sorted candidates inside the latency window, without picking one
    pub fn eligible<'a>(
        &self,
        connections: &'a [Connection],
        rp: &ReadPreference,
    ) -> Result<Candidates<'a>, SelectionError> {
        let candidates = find_candidates(connections, rp)?;
        let sorted = sort_servers(candidates, rp);
        select_nearest(sorted, rp, self.cutoff_ms)
    }

    /// Select a single server for the read preference
    pub fn select<'a>(
        &mut self,
        connections: &'a [Connection],
        rp: &ReadPreference,
    ) -> Result<&'a Connection, SelectionError> {
        let window = self.eligible(connections, rp)?;
        pick(&window, rp, &mut self.rng)
    }

    /// Take one snapshot of the registry and select from it.
    ///
    /// Latency updates landing after the snapshot do not affect this selection.
    pub async fn select_from_registry(
        &mut self,
        registry: &ConnectionRegistry,
        rp: &ReadPreference,
    ) -> Result<Connection, SelectionError> {
        let snapshot = registry.snapshot().await;
        self.select(&snapshot, rp).cloned()
    }
}
