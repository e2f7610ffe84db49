/// Ordering of candidate servers
use super::Candidates;
use crate::core::{Connection, NodeRole};
use crate::read_preference::{ReadMode, ReadPreference};
use std::cmp::Ordering;
use tracing::{debug, Level};

use crate::LOG_TARGET;

/// Comparator used to order candidates, chosen once per selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortStrategy {
    /// Ascending latency
    LatencyOnly,
    /// The preferred role first, ascending latency within each role
    RolePriority { preferred: NodeRole },
}

impl SortStrategy {
    pub fn for_mode(mode: ReadMode) -> Self {
        match mode {
            ReadMode::Primary | ReadMode::Secondary | ReadMode::Nearest => SortStrategy::LatencyOnly,
            ReadMode::PrimaryPreferred => SortStrategy::RolePriority {
                preferred: NodeRole::Primary,
            },
            ReadMode::SecondaryPreferred => SortStrategy::RolePriority {
                preferred: NodeRole::Secondary,
            },
        }
    }

    pub fn compare(&self, a: &Connection, b: &Connection) -> Ordering {
        match self {
            SortStrategy::LatencyOnly => a.latency_ms.cmp(&b.latency_ms),
            SortStrategy::RolePriority { preferred } => {
                let rank = |con: &Connection| u8::from(con.role != *preferred);
                rank(a)
                    .cmp(&rank(b))
                    .then_with(|| a.latency_ms.cmp(&b.latency_ms))
            }
        }
    }
}

/// Order candidates for the read preference's mode.
///
/// Servers with equal keys keep no particular relative order.
pub fn sort_servers<'a>(mut candidates: Candidates<'a>, rp: &ReadPreference) -> Candidates<'a> {
    let strategy = SortStrategy::for_mode(rp.mode);

    debug!(target: LOG_TARGET, "sort_servers: sorting with {:?}", strategy);
    candidates.sort_unstable_by(|a, b| strategy.compare(a, b));
    for con in &candidates {
        con.trace(Level::DEBUG);
    }
    debug!(target: LOG_TARGET, "sort_servers: done");

    candidates
}
