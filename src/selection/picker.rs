/// Final choice of a single server
use crate::core::{Connection, NodeRole};
use crate::error::SelectionError;
use crate::read_preference::{ReadMode, ReadPreference};
use rand::Rng;
use tracing::{debug, Level};

use crate::LOG_TARGET;

/// Pick one server from a sorted, narrowed candidate list.
///
/// Under `PrimaryPreferred` a primary at the head of the list is returned
/// without consulting `rng`. Everything else is a uniform draw.
pub fn pick<'a, R: Rng + ?Sized>(
    candidates: &[&'a Connection],
    rp: &ReadPreference,
    rng: &mut R,
) -> Result<&'a Connection, SelectionError> {
    let first = *candidates.first().ok_or(SelectionError::empty("pick"))?;

    let con = if rp.mode == ReadMode::PrimaryPreferred && first.role == NodeRole::Primary {
        debug!(target: LOG_TARGET, "pick: the primary");
        first
    } else {
        let entry = rng.gen_range(0..candidates.len());
        debug!(target: LOG_TARGET, "pick: random element {}", entry);
        candidates[entry]
    };

    con.trace(Level::INFO);
    Ok(con)
}
