//! The observation interface onto the host world.

use crate::cell::{CellKind, HolderId};
use crate::coord::CellCoord;

/// Read access to the host world, as the network layer sees it.
///
/// Implementations classify cells, answer partition residency, and report
/// holder emptiness. Everything the network layer observes about the world
/// flows through this trait; the layer itself stores identifiers only.
pub trait GridView {
    /// Classify the cell at `coord`.
    fn cell_at(&self, coord: CellCoord) -> CellKind;

    /// Whether the partition (16x16 column) containing `coord` is resident.
    fn is_partition_resident(&self, coord: CellCoord) -> bool;

    /// Whether the holder currently has no items. Unknown holders count as
    /// empty.
    fn holder_is_empty(&self, holder: HolderId) -> bool;
}
