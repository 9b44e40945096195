//! Cell classification: what the host world reports at a coordinate.

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::coord::Direction;

new_key_type! {
    /// Identifies an item holder (inventory) owned by the host world.
    pub struct HolderId;
}

/// Identifies a conduit tint (color). Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TintId(pub u16);

/// What occupies a cell. Every coordinate classifies to exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    /// Nothing the network layer cares about.
    Inert,
    /// A pipe segment carrying a tint.
    Conduit { tint: TintId },
    /// An intake part: draws from `holder` and feeds the cell it faces.
    Input { facing: Direction, holder: HolderId },
    /// A discharge part: delivers into the cell it faces. Its own holder
    /// carries the part's filter items.
    Output { facing: Direction, holder: HolderId },
    /// Keeps its surroundings resident; a network containing one is exempt
    /// from residency checks.
    ChunkLoader,
    /// An inventory-capable receiver that is not itself a network part.
    Container,
    /// Consumes delivered items outright.
    Sink,
}

impl CellKind {
    /// Whether this cell can receive items into an inventory.
    pub fn is_inventory_capable(&self) -> bool {
        matches!(
            self,
            CellKind::Input { .. } | CellKind::Output { .. } | CellKind::Container
        )
    }

    /// The conduit tint, if this cell is a conduit.
    pub fn conduit_tint(&self) -> Option<TintId> {
        match self {
            CellKind::Conduit { tint } => Some(*tint),
            _ => None,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
