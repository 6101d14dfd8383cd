/// Movement rules — truth-table driven.
///
/// Pure functions over grid geometry + an occupancy view; no side effects.
/// These encode "what is legal" without performing the action.
///
/// ### Entering a cell (local player only)
/// ┌────────────────────────────┬───────┐
/// │ Condition                  │ Allow?│
/// ├────────────────────────────┼───────┤
/// │ Out of movement bounds     │ DENY  │
/// │ Parity or border wall      │ DENY  │
/// │ Block occupies the cell    │ DENY  │
/// │ Bomb occupies the cell     │ DENY  │
/// │ Player(s) occupy the cell  │ ALLOW │ players may overlap
/// │ Otherwise                  │ ALLOW │
/// └────────────────────────────┴───────┘
///
/// Remote players' positions are mirrored from inbound announcements and
/// are never passed through these rules — this is a local-only gate, a
/// deliberate trust boundary of the architecture.

use super::grid::{Cell, Grid};

/// Read-only occupancy view for rule queries. Implemented by the spatial
/// index; kept as a trait so rules stay free of simulation state.
pub trait OccupancyView {
    fn has_block(&self, cell: Cell) -> bool;
    fn has_bomb(&self, cell: Cell) -> bool;
}

/// May a movable entity occupy `cell`? See truth table above.
pub fn can_enter(grid: &Grid, occ: &impl OccupancyView, cell: Cell) -> bool {
    if !grid.in_move_bounds(cell) {
        return false;
    }
    if cell.is_wall() {
        return false;
    }
    if occ.has_block(cell) || occ.has_bomb(cell) {
        return false;
    }
    true
}
