//! Bounded flood-fill discovery of pipe networks.
//!
//! Discovery walks outward from a starting cell through matching-tint
//! conduits, collecting the parts it meets. All state is local to the walk;
//! a failed walk leaves nothing behind.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use ductwork_grid::{CellCoord, CellKind, Direction, GridView, Ticks, TintId};

use crate::config::NetworkConfig;
use crate::error::NetworkError;
use crate::part::{ChunkLoader, PipeInput, PipeOutput};
use crate::pipe::PipeNetwork;

/// Walk the grid from `start` and assemble the network it belongs to.
///
/// The walk is a FIFO flood fill. The first conduit evidence binds the
/// network's tint; conduits of any other tint are boundaries. Inputs join
/// when the cell they face is a conduit of the bound tint, outputs and
/// chunk loaders join on contact. Residency is enforced for every visited
/// cell until a chunk loader has been registered.
///
/// Returns `Ok(None)` when the walk terminates without the minimum viable
/// shape (an input, an output, and a segment). Limit overruns and
/// non-resident partitions fail the whole walk.
pub fn discover<G: GridView>(
    grid: &G,
    start: CellCoord,
    config: &NetworkConfig,
    now: Ticks,
) -> Result<Option<PipeNetwork>, NetworkError> {
    let mut queue: VecDeque<CellCoord> = VecDeque::new();
    let mut visited: BTreeSet<CellCoord> = BTreeSet::new();

    let mut segments: BTreeSet<CellCoord> = BTreeSet::new();
    let mut inputs: BTreeMap<CellCoord, PipeInput> = BTreeMap::new();
    let mut outputs: BTreeMap<CellCoord, PipeOutput> = BTreeMap::new();
    let mut chunk_loaders: BTreeMap<CellCoord, ChunkLoader> = BTreeMap::new();

    let mut tint: Option<TintId> = None;

    queue.push_back(start);

    while let Some(coord) = queue.pop_front() {
        if visited.contains(&coord) {
            continue;
        }
        if !grid.is_partition_resident(coord) && chunk_loaders.is_empty() {
            return Err(NetworkError::ChunkNotLoaded(coord));
        }
        match grid.cell_at(coord) {
            CellKind::Conduit { tint: cell_tint } => {
                if tint.is_none() {
                    tint = Some(cell_tint);
                }
                if tint == Some(cell_tint) {
                    if config.max_segments > 0 && segments.len() >= config.max_segments {
                        return Err(NetworkError::PipeTooLong(coord));
                    }
                    segments.insert(coord);
                    visited.insert(coord);
                    for neighbor in coord.neighbors() {
                        queue.push_back(neighbor);
                    }
                }
            }
            CellKind::Input { facing, holder } => {
                let input = PipeInput {
                    coord,
                    facing,
                    holder,
                };
                if let Some(target_tint) = grid.cell_at(input.target()).conduit_tint() {
                    if tint.is_none() {
                        tint = Some(target_tint);
                    }
                    if tint == Some(target_tint) {
                        inputs.insert(coord, input);
                        visited.insert(coord);
                        queue.push_back(input.target());
                    }
                }
            }
            CellKind::Output { facing, holder } => {
                let output = PipeOutput {
                    coord,
                    facing,
                    holder,
                };
                if config.max_outputs > 0 && outputs.len() >= config.max_outputs {
                    return Err(NetworkError::TooManyOutputs(coord));
                }
                outputs.insert(coord, output);
                if visited.is_empty() {
                    // output-first start: walk exactly one adjoining conduit
                    for dir in Direction::all() {
                        if dir == facing {
                            continue;
                        }
                        let neighbor = coord.relative(dir);
                        let joins = match (tint, grid.cell_at(neighbor).conduit_tint()) {
                            (Some(bound), Some(found)) => bound == found,
                            (None, Some(_)) => true,
                            _ => false,
                        };
                        if joins {
                            queue.push_back(neighbor);
                            break;
                        }
                    }
                }
                visited.insert(coord);
                let target_kind = grid.cell_at(output.target());
                if target_kind.is_inventory_capable() || matches!(target_kind, CellKind::Sink) {
                    // never wander through the receiving cell
                    visited.insert(output.target());
                }
            }
            CellKind::ChunkLoader => {
                chunk_loaders.insert(coord, ChunkLoader { coord });
                visited.insert(coord);
            }
            CellKind::Inert | CellKind::Container | CellKind::Sink => {}
        }
    }

    if let Some(tint) = tint {
        let network = PipeNetwork::new(tint, segments, inputs, outputs, chunk_loaders, now);
        if network.is_valid() {
            return Ok(Some(network));
        }
    }
    Ok(None)
}

// ===========================================================================
// Tests
// ===========================================================================
