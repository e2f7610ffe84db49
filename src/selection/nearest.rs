/// Acceptable-latency window over sorted candidates
use super::Candidates;
use crate::error::SelectionError;
use crate::read_preference::ReadPreference;
use tracing::debug;

use crate::LOG_TARGET;

/// Default width of the acceptable-latency window
pub const DEFAULT_CUTOFF_MS: u64 = 15;

/// Keep the candidates whose latency is within `cutoff_ms` of the first
/// sorted candidate.
///
/// The baseline is the head of the sorted list, not the minimum latency: for
/// the preferred modes that is the best server of the preferred role.
pub fn select_nearest<'a>(
    candidates: Candidates<'a>,
    rp: &ReadPreference,
    cutoff_ms: u64,
) -> Result<Candidates<'a>, SelectionError> {
    let first = candidates
        .first()
        .ok_or(SelectionError::empty("select_nearest"))?;
    let nearest = first.latency_ms;
    let limit = nearest.saturating_add(cutoff_ms);

    debug!(
        target: LOG_TARGET,
        "select_nearest: {} baseline is {}ms, accepting up to {}ms",
        rp.mode,
        nearest,
        limit
    );

    Ok(candidates
        .into_iter()
        .filter(|con| con.latency_ms <= limit)
        .collect())
}
