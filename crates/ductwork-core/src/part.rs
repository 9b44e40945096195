//! Network parts: the cells that give a pipe network its behavior.

use ductwork_grid::{CellCoord, CellKind, Direction, HolderId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Part structs
// ---------------------------------------------------------------------------

/// An intake part: draws items from its holder and feeds the conduit cell
/// it faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipeInput {
    pub coord: CellCoord,
    pub facing: Direction,
    pub holder: HolderId,
}

impl PipeInput {
    /// The conduit cell this input feeds into.
    pub fn target(&self) -> CellCoord {
        self.coord.relative(self.facing)
    }
}

/// A discharge part: delivers items into the cell it faces. Its own holder
/// carries the part's filter items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipeOutput {
    pub coord: CellCoord,
    pub facing: Direction,
    pub holder: HolderId,
}

impl PipeOutput {
    /// The receiving cell this output delivers into.
    pub fn target(&self) -> CellCoord {
        self.coord.relative(self.facing)
    }
}

/// A chunk-loader part: keeps its surroundings resident, moves nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkLoader {
    pub coord: CellCoord,
}

// ---------------------------------------------------------------------------
// Sum type
// ---------------------------------------------------------------------------

/// The role a part plays in a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartKind {
    Input,
    Output,
    ChunkLoader,
}

/// Any of the three part kinds, as stored in the part index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipePart {
    Input(PipeInput),
    Output(PipeOutput),
    ChunkLoader(ChunkLoader),
}

impl PipePart {
    /// The coordinate of the part's cell.
    pub fn coord(&self) -> CellCoord {
        match self {
            PipePart::Input(input) => input.coord,
            PipePart::Output(output) => output.coord,
            PipePart::ChunkLoader(loader) => loader.coord,
        }
    }

    /// The role this part plays.
    pub fn kind(&self) -> PartKind {
        match self {
            PipePart::Input(_) => PartKind::Input,
            PipePart::Output(_) => PartKind::Output,
            PipePart::ChunkLoader(_) => PartKind::ChunkLoader,
        }
    }

    /// Construct the part matching the grid's classification of `coord`,
    /// or `None` if the cell is not a part cell.
    pub fn from_cell(coord: CellCoord, kind: CellKind) -> Option<PipePart> {
        match kind {
            CellKind::Input { facing, holder } => Some(PipePart::Input(PipeInput {
                coord,
                facing,
                holder,
            })),
            CellKind::Output { facing, holder } => Some(PipePart::Output(PipeOutput {
                coord,
                facing,
                holder,
            })),
            CellKind::ChunkLoader => Some(PipePart::ChunkLoader(ChunkLoader { coord })),
            _ => None,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
