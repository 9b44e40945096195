//! The pipe-network aggregate.

use std::collections::{BTreeMap, BTreeSet};

use ductwork_grid::{CellCoord, GridView, Ticks, TintId};
use serde::{Deserialize, Serialize};

use crate::error::NetworkError;
use crate::part::{ChunkLoader, PipeInput, PipeOutput};

/// A discovered pipe network: intake parts, discharge parts, chunk loaders,
/// and the conduit cells connecting them, all sharing one tint.
///
/// Networks are assembled by discovery or by merging and are owned by the
/// manager's arena afterwards; the collections here are only mutated through
/// the manager so the cache tiers stay coherent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipeNetwork {
    pub(crate) tint: TintId,
    pub(crate) segments: BTreeSet<CellCoord>,
    pub(crate) inputs: BTreeMap<CellCoord, PipeInput>,
    pub(crate) outputs: BTreeMap<CellCoord, PipeOutput>,
    pub(crate) chunk_loaders: BTreeMap<CellCoord, ChunkLoader>,
    pub(crate) discovered_at: Ticks,
}

impl PipeNetwork {
    /// Assemble a network from its member collections.
    ///
    /// Outputs that deliver straight into one of the network's own inputs
    /// are dropped here, so every constructed network, discovered or merged,
    /// satisfies the no-self-feed rule.
    pub fn new(
        tint: TintId,
        segments: BTreeSet<CellCoord>,
        inputs: BTreeMap<CellCoord, PipeInput>,
        mut outputs: BTreeMap<CellCoord, PipeOutput>,
        chunk_loaders: BTreeMap<CellCoord, ChunkLoader>,
        discovered_at: Ticks,
    ) -> Self {
        outputs.retain(|_, output| !inputs.contains_key(&output.target()));
        Self {
            tint,
            segments,
            inputs,
            outputs,
            chunk_loaders,
            discovered_at,
        }
    }

    /// The tint every member shares.
    pub fn tint(&self) -> TintId {
        self.tint
    }

    /// The conduit cells.
    pub fn segments(&self) -> &BTreeSet<CellCoord> {
        &self.segments
    }

    /// The intake parts, keyed by coordinate.
    pub fn inputs(&self) -> &BTreeMap<CellCoord, PipeInput> {
        &self.inputs
    }

    /// The discharge parts, keyed by coordinate.
    pub fn outputs(&self) -> &BTreeMap<CellCoord, PipeOutput> {
        &self.outputs
    }

    /// The chunk loaders, keyed by coordinate.
    pub fn chunk_loaders(&self) -> &BTreeMap<CellCoord, ChunkLoader> {
        &self.chunk_loaders
    }

    /// The tick at which this network was assembled.
    pub fn discovered_at(&self) -> Ticks {
        self.discovered_at
    }

    /// Whether this network has the minimum viable shape: at least one
    /// input, one output, and one segment.
    pub fn is_valid(&self) -> bool {
        !self.inputs.is_empty() && !self.outputs.is_empty() && !self.segments.is_empty()
    }

    /// Every member coordinate: segments, inputs, outputs, loaders.
    pub fn member_coords(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.segments
            .iter()
            .copied()
            .chain(self.inputs.keys().copied())
            .chain(self.outputs.keys().copied())
            .chain(self.chunk_loaders.keys().copied())
    }

    /// Re-verify that every member's partition is still resident.
    ///
    /// Networks holding at least one chunk loader pass unconditionally; for
    /// the rest, the first non-resident member coordinate fails the check.
    pub fn check_resident<G: GridView>(&self, grid: &G) -> Result<(), NetworkError> {
        if !self.chunk_loaders.is_empty() {
            return Ok(());
        }
        for coord in self.member_coords() {
            if !grid.is_partition_resident(coord) {
                return Err(NetworkError::ChunkNotLoaded(coord));
            }
        }
        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
