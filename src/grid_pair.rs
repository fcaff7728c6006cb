// Grid-Pair Locator: the two spread controls that together form one logical
// editing surface - master list on the left, detail view on the right.

use log::debug;

use crate::errors::{DriverError, DriverResult};
use crate::resolver;
use crate::system::{ClassPattern, ControlDescriptor, WindowSystem};
use crate::HandleId;

/// The master/detail spread pair. Invariant: `source.rect.left < detail.rect.left`.
///
/// The underlying controls are destroyed and recreated whenever their tab is
/// deselected, so a pair is only as fresh as the last [`verify`] call;
/// callers re-verify immediately before every read or write against it.
#[derive(Debug, Clone)]
pub struct GridPair {
    pub source: ControlDescriptor,
    pub detail: ControlDescriptor,
}

/// Find exactly the pair: at least two grids among the window's direct
/// children, ordered left to right by horizontal position.
pub fn locate_grid_pair<S: WindowSystem>(
    system: &S,
    window: HandleId,
    pattern: &ClassPattern,
) -> DriverResult<GridPair> {
    let mut grids = resolver::resolve_grid_controls(system, window, pattern);
    if grids.len() < 2 {
        return Err(DriverError::InsufficientGrids {
            found: grids.len(),
            need: 2,
        });
    }
    grids.sort_by_key(|grid| grid.rect.left);
    let source = grids[0].clone();
    let detail = grids[grids.len() - 1].clone();
    debug!(
        "grid pair: source 0x{:X} at x={}, detail 0x{:X} at x={}",
        source.handle, source.rect.left, detail.handle, detail.rect.left
    );
    Ok(GridPair { source, detail })
}

/// Re-run resolution and re-check the pair precondition.
///
/// Fails if the grids have disappeared since the pair was located (tab
/// switched away, controls destroyed). A passing verify means the *current*
/// tree still holds a pair; it does not resurrect the handles inside a
/// stale `GridPair` - re-locate after any tab transition.
pub fn verify<S: WindowSystem>(
    system: &S,
    window: HandleId,
    pattern: &ClassPattern,
    _pair: &GridPair,
) -> DriverResult<()> {
    let found = resolver::resolve_grid_controls(system, window, pattern).len();
    if found < 2 {
        return Err(DriverError::InsufficientGrids { found, need: 2 });
    }
    Ok(())
}
