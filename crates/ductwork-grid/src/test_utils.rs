//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use std::collections::{BTreeMap, BTreeSet};

use slotmap::SlotMap;

use crate::cell::{CellKind, HolderId, TintId};
use crate::coord::{CellCoord, Direction, WorldId};
use crate::view::GridView;

// ===========================================================================
// Coordinate constructors
// ===========================================================================

/// The default test world.
pub fn world() -> WorldId {
    WorldId(0)
}

/// A coordinate in the default test world.
pub fn at(x: i32, y: i32, z: i32) -> CellCoord {
    CellCoord::new(world(), x, y, z)
}

// ===========================================================================
// Tint constructors
// ===========================================================================

pub fn amber() -> TintId {
    TintId(0)
}
pub fn cobalt() -> TintId {
    TintId(1)
}
pub fn viridian() -> TintId {
    TintId(2)
}

// ===========================================================================
// MemoryGrid
// ===========================================================================

/// An in-memory [`GridView`] backed by plain maps.
///
/// Cells default to [`CellKind::Inert`]; partitions default to resident.
/// Holders are created by the placement helpers and start non-empty.
#[derive(Debug, Default)]
pub struct MemoryGrid {
    cells: BTreeMap<CellCoord, CellKind>,
    unloaded: BTreeSet<(WorldId, i32, i32)>,
    holders: SlotMap<HolderId, HolderState>,
}

#[derive(Debug, Clone, Copy)]
struct HolderState {
    empty: bool,
}

fn partition_of(coord: CellCoord) -> (WorldId, i32, i32) {
    (coord.world, coord.x >> 4, coord.z >> 4)
}

impl MemoryGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a conduit cell of the given tint.
    pub fn place_conduit(&mut self, coord: CellCoord, tint: TintId) {
        self.cells.insert(coord, CellKind::Conduit { tint });
    }

    /// Place `len` conduit cells starting at `start`, stepping in `dir`.
    /// Returns the coordinate of the last cell placed.
    pub fn place_conduit_run(
        &mut self,
        start: CellCoord,
        dir: Direction,
        len: u32,
        tint: TintId,
    ) -> CellCoord {
        let mut coord = start;
        self.place_conduit(coord, tint);
        for _ in 1..len {
            coord = coord.relative(dir);
            self.place_conduit(coord, tint);
        }
        coord
    }

    /// Place an intake part facing `facing`. Returns its holder id.
    pub fn place_input(&mut self, coord: CellCoord, facing: Direction) -> HolderId {
        let holder = self.holders.insert(HolderState { empty: false });
        self.cells.insert(coord, CellKind::Input { facing, holder });
        holder
    }

    /// Place a discharge part facing `facing`. Returns its holder id.
    pub fn place_output(&mut self, coord: CellCoord, facing: Direction) -> HolderId {
        let holder = self.holders.insert(HolderState { empty: false });
        self.cells.insert(coord, CellKind::Output { facing, holder });
        holder
    }

    /// Place a chunk-loader cell.
    pub fn place_loader(&mut self, coord: CellCoord) {
        self.cells.insert(coord, CellKind::ChunkLoader);
    }

    /// Place a plain inventory-capable container cell.
    pub fn place_container(&mut self, coord: CellCoord) {
        self.cells.insert(coord, CellKind::Container);
    }

    /// Place a sink cell.
    pub fn place_sink(&mut self, coord: CellCoord) {
        self.cells.insert(coord, CellKind::Sink);
    }

    /// Clear a cell back to inert.
    pub fn clear(&mut self, coord: CellCoord) {
        self.cells.remove(&coord);
    }

    /// Mark a holder empty or non-empty.
    pub fn set_holder_empty(&mut self, holder: HolderId, empty: bool) {
        if let Some(state) = self.holders.get_mut(holder) {
            state.empty = empty;
        }
    }

    /// Mark the partition containing `coord` as not resident.
    pub fn unload_partition(&mut self, coord: CellCoord) {
        self.unloaded.insert(partition_of(coord));
    }

    /// Mark the partition containing `coord` resident again.
    pub fn load_partition(&mut self, coord: CellCoord) {
        self.unloaded.remove(&partition_of(coord));
    }
}

impl GridView for MemoryGrid {
    fn cell_at(&self, coord: CellCoord) -> CellKind {
        self.cells.get(&coord).copied().unwrap_or(CellKind::Inert)
    }

    fn is_partition_resident(&self, coord: CellCoord) -> bool {
        !self.unloaded.contains(&partition_of(coord))
    }

    fn holder_is_empty(&self, holder: HolderId) -> bool {
        self.holders.get(holder).map(|s| s.empty).unwrap_or(true)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
