//! The network manager: arena, cache tiers, and mutation operations.
//!
//! # Design
//!
//! - Every discovered network lives in a slotmap arena owned by the
//!   manager; the cache tiers store [`NetworkId`]s only, so a dismantled
//!   network cannot be kept alive by a stale cache entry.
//! - Four tiers, all keyed by coordinate: the primary tier (input
//!   coordinate to network, bounded by capacity and ttl), the single-owner
//!   tier (segment to network), the multi-owner tier (output or loader to
//!   the set of networks sharing it), and the part index.
//! - Every departure from the primary tier, whatever its cause, flows
//!   through one removal handler. A non-explicit departure unregisters
//!   that input; the network is dismantled from every tier exactly when
//!   its last input is gone.

use std::collections::{BTreeMap, BTreeSet};

use ductwork_grid::{CellCoord, CellKind, GridView, Ticks, TintId};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::config::NetworkConfig;
use crate::discover::discover;
use crate::error::NetworkError;
use crate::event::NetworkEvent;
use crate::id::NetworkId;
use crate::part::{ChunkLoader, PipeInput, PipeOutput, PipePart};
use crate::pipe::PipeNetwork;
use crate::ttl::{Lookup, Removal, RemovalCause, TtlCache};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Entry counts across the four cache tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub primary_entries: usize,
    pub single_entries: usize,
    pub multi_entries: usize,
    pub part_entries: usize,
}

fn remove_part_entry(
    parts: &mut BTreeMap<CellCoord, PipePart>,
    coord: CellCoord,
    expected: &PipePart,
) {
    if parts.get(&coord) == Some(expected) {
        parts.remove(&coord);
    }
}

/// Drop `id` from the multi-owner set at `coord`, dropping the set's key
/// once it empties. Returns true when no set remains at `coord`.
fn remove_from_multi(
    multi: &mut BTreeMap<CellCoord, BTreeSet<NetworkId>>,
    coord: CellCoord,
    id: NetworkId,
) -> bool {
    let now_empty = match multi.get_mut(&coord) {
        Some(set) => {
            set.remove(&id);
            set.is_empty()
        }
        None => true,
    };
    if now_empty {
        multi.remove(&coord);
    }
    now_empty
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// Owns every discovered network and keeps the cache tiers coherent
/// through lookups, mutations, expiry, and teardown.
///
/// The manager is single-threaded and cooperative: time advances only
/// through [`NetworkManager::tick`], which also sweeps expired primary
/// entries and drains the event buffer.
#[derive(Debug)]
pub struct NetworkManager {
    config: NetworkConfig,
    networks: SlotMap<NetworkId, PipeNetwork>,
    primary: TtlCache,
    single: BTreeMap<CellCoord, NetworkId>,
    multi: BTreeMap<CellCoord, BTreeSet<NetworkId>>,
    parts: BTreeMap<CellCoord, PipePart>,
    clock: Ticks,
    events: Vec<NetworkEvent>,
}

impl Default for NetworkManager {
    fn default() -> Self {
        Self::new(NetworkConfig::default())
    }
}

impl NetworkManager {
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            config,
            networks: SlotMap::with_key(),
            primary: TtlCache::new(config.primary_capacity, config.primary_ttl),
            single: BTreeMap::new(),
            multi: BTreeMap::new(),
            parts: BTreeMap::new(),
            clock: 0,
            events: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// The tick of the most recent [`NetworkManager::tick`] call.
    pub fn clock(&self) -> Ticks {
        self.clock
    }

    pub fn network(&self, id: NetworkId) -> Option<&PipeNetwork> {
        self.networks.get(id)
    }

    pub fn network_count(&self) -> usize {
        self.networks.len()
    }

    pub fn networks(&self) -> impl Iterator<Item = (NetworkId, &PipeNetwork)> {
        self.networks.iter()
    }

    /// Events buffered since the last drain.
    pub fn pending_events(&self) -> &[NetworkEvent] {
        &self.events
    }

    /// Entry counts across the four cache tiers.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            primary_entries: self.primary.len(),
            single_entries: self.single.len(),
            multi_entries: self.multi.len(),
            part_entries: self.parts.len(),
        }
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Advance the manager clock, sweep expired primary entries, and drain
    /// the buffered events.
    pub fn tick(&mut self, now: Ticks) -> Vec<NetworkEvent> {
        self.clock = now;
        for removal in self.primary.sweep(now) {
            self.handle_primary_removal(removal);
        }
        std::mem::take(&mut self.events)
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// Cache-only probe: primary tier first, then single-owner, then
    /// multi-owner. Never discovers, never mutates.
    pub fn cached_networks(&self, coord: CellCoord) -> BTreeSet<NetworkId> {
        if let Some(id) = self.primary.peek(coord, self.clock) {
            return BTreeSet::from([id]);
        }
        if let Some(&id) = self.single.get(&coord) {
            return BTreeSet::from([id]);
        }
        self.multi.get(&coord).cloned().unwrap_or_default()
    }

    /// The networks at `coord`, discovering and installing one on a full
    /// cache miss. A failed discovery caches nothing.
    pub fn networks_at<G: GridView>(
        &mut self,
        grid: &G,
        coord: CellCoord,
    ) -> Result<BTreeSet<NetworkId>, NetworkError> {
        match self.primary.get(coord, self.clock) {
            Lookup::Hit(id) => return Ok(BTreeSet::from([id])),
            Lookup::Expired(removal) => self.handle_primary_removal(removal),
            Lookup::Miss => {}
        }
        if let Some(&id) = self.single.get(&coord) {
            return Ok(BTreeSet::from([id]));
        }
        if let Some(set) = self.multi.get(&coord) {
            if !set.is_empty() {
                return Ok(set.clone());
            }
        }
        match discover(grid, coord, &self.config, self.clock)? {
            Some(network) => {
                let id = self.install(grid, network);
                Ok(BTreeSet::from([id]))
            }
            None => Ok(BTreeSet::new()),
        }
    }

    /// The network fed by the input at `coord`, looking only at the primary
    /// tier before discovering.
    ///
    /// A cache hit re-verifies partition residency. On a miss the cell must
    /// classify as an input part, otherwise no discovery is attempted.
    pub fn network_by_input<G: GridView>(
        &mut self,
        grid: &G,
        coord: CellCoord,
    ) -> Result<Option<NetworkId>, NetworkError> {
        match self.primary.get(coord, self.clock) {
            Lookup::Hit(id) => {
                if let Some(network) = self.networks.get(id) {
                    network.check_resident(grid)?;
                }
                return Ok(Some(id));
            }
            Lookup::Expired(removal) => self.handle_primary_removal(removal),
            Lookup::Miss => {}
        }
        if !matches!(grid.cell_at(coord), CellKind::Input { .. }) {
            return Ok(None);
        }
        match discover(grid, coord, &self.config, self.clock)? {
            Some(network) => Ok(Some(self.install(grid, network))),
            None => Ok(None),
        }
    }

    // -----------------------------------------------------------------------
    // Install / teardown
    // -----------------------------------------------------------------------

    /// Put a discovered network into the arena and write every tier.
    ///
    /// Input coordinates that already carry a primary entry displace the
    /// previous owner first, so a re-discovery cleanly replaces whatever it
    /// shadowed.
    fn install<G: GridView>(&mut self, grid: &G, network: PipeNetwork) -> NetworkId {
        let tint = network.tint();
        let inputs: Vec<PipeInput> = network.inputs().values().copied().collect();
        let segments: Vec<CellCoord> = network.segments().iter().copied().collect();
        let outputs: Vec<PipeOutput> = network.outputs().values().copied().collect();
        let loaders: Vec<ChunkLoader> = network.chunk_loaders().values().copied().collect();

        let id = self.networks.insert(network);

        for input in &inputs {
            if let Some(removal) = self.primary.remove_with(input.coord, RemovalCause::Replaced) {
                self.handle_primary_removal(removal);
            }
        }

        self.events.push(NetworkEvent::NetworkFormed {
            network: id,
            tint,
            tick: self.clock,
        });

        for input in &inputs {
            for removal in self.primary.insert(input.coord, id, self.clock) {
                self.handle_primary_removal(removal);
            }
            self.parts.insert(input.coord, PipePart::Input(*input));
            if !grid.holder_is_empty(input.holder) {
                self.events.push(NetworkEvent::NetworkReady {
                    input: input.coord,
                    tick: self.clock,
                });
            }
        }
        for coord in segments {
            self.single.insert(coord, id);
        }
        for output in &outputs {
            self.multi.entry(output.coord).or_default().insert(id);
            self.parts.insert(output.coord, PipePart::Output(*output));
        }
        for loader in &loaders {
            self.multi.entry(loader.coord).or_default().insert(id);
            self.parts.insert(loader.coord, PipePart::ChunkLoader(*loader));
        }
        id
    }

    /// Remove a network: drain its inputs one at a time through the primary
    /// tier, then dismantle whatever remains. Idempotent.
    pub fn teardown(&mut self, id: NetworkId) {
        loop {
            let entry = match self.networks.get_mut(id) {
                Some(network) => network.inputs.pop_first(),
                None => return,
            };
            let Some((coord, input)) = entry else { break };
            remove_part_entry(&mut self.parts, coord, &PipePart::Input(input));
            if let Some(removal) = self.primary.remove_matching(coord, id) {
                self.handle_primary_removal(removal);
            }
        }
        // no inputs left but nothing settled the network (its entries had
        // already expired or been displaced)
        self.dismantle(id);
    }

    /// One handler for every primary-tier departure. A non-explicit cause
    /// unregisters the departed input; the network is dismantled when its
    /// input map empties.
    fn handle_primary_removal(&mut self, removal: Removal) {
        let Removal {
            coord,
            network: id,
            cause,
        } = removal;
        if cause != RemovalCause::Explicit {
            let removed = match self.networks.get_mut(id) {
                Some(network) => network.inputs.remove(&coord),
                None => return,
            };
            if let Some(input) = removed {
                remove_part_entry(&mut self.parts, coord, &PipePart::Input(input));
            }
        }
        let inputs_empty = match self.networks.get(id) {
            Some(network) => network.inputs.is_empty(),
            None => return,
        };
        if inputs_empty {
            self.dismantle(id);
        }
    }

    /// Purge a network from the arena and every tier. The arena removal
    /// happens first, so re-entrant primary removals are no-ops.
    fn dismantle(&mut self, id: NetworkId) {
        let Some(network) = self.networks.remove(id) else {
            return;
        };
        for (coord, input) in &network.inputs {
            self.primary.remove_matching(*coord, id);
            remove_part_entry(&mut self.parts, *coord, &PipePart::Input(*input));
        }
        for coord in &network.segments {
            if self.single.get(coord) == Some(&id) {
                self.single.remove(coord);
            }
        }
        for (coord, output) in &network.outputs {
            if remove_from_multi(&mut self.multi, *coord, id) {
                remove_part_entry(&mut self.parts, *coord, &PipePart::Output(*output));
            }
        }
        for (coord, loader) in &network.chunk_loaders {
            if remove_from_multi(&mut self.multi, *coord, id) {
                remove_part_entry(&mut self.parts, *coord, &PipePart::ChunkLoader(*loader));
            }
        }
        self.events.push(NetworkEvent::NetworkDismantled {
            network: id,
            tick: self.clock,
        });
    }

    // -----------------------------------------------------------------------
    // Part and segment mutation
    // -----------------------------------------------------------------------

    /// Register a part with a live network and cache it.
    ///
    /// Adding an input rewrites the primary entry of every input, so the
    /// whole network's ttl refreshes. Adding an output past the configured
    /// maximum tears the network down and fails. Unknown network ids are
    /// ignored.
    pub fn add_part(&mut self, id: NetworkId, part: PipePart) -> Result<(), NetworkError> {
        match part {
            PipePart::Input(input) => {
                let coords: Vec<CellCoord> = match self.networks.get_mut(id) {
                    Some(network) => {
                        network.inputs.insert(input.coord, input);
                        network.inputs.keys().copied().collect()
                    }
                    None => return Ok(()),
                };
                for coord in coords {
                    for removal in self.primary.insert(coord, id, self.clock) {
                        self.handle_primary_removal(removal);
                    }
                }
            }
            PipePart::Output(output) => {
                let over = match self.networks.get(id) {
                    Some(network) => {
                        self.config.max_outputs > 0
                            && network.outputs.len() >= self.config.max_outputs
                    }
                    None => return Ok(()),
                };
                if over {
                    self.teardown(id);
                    return Err(NetworkError::TooManyOutputs(output.coord));
                }
                if let Some(network) = self.networks.get_mut(id) {
                    network.outputs.insert(output.coord, output);
                }
                self.multi.entry(output.coord).or_default().insert(id);
            }
            PipePart::ChunkLoader(loader) => {
                match self.networks.get_mut(id) {
                    Some(network) => {
                        network.chunk_loaders.insert(loader.coord, loader);
                    }
                    None => return Ok(()),
                }
                self.multi.entry(loader.coord).or_default().insert(id);
            }
        }
        if self.networks.contains_key(id) {
            self.parts.insert(part.coord(), part);
        }
        Ok(())
    }

    /// Unregister a part from a network and drop its cache entries.
    ///
    /// Removing the last input or the last output dismantles the whole
    /// network; anything less leaves the rest cached.
    pub fn remove_part(&mut self, id: NetworkId, part: &PipePart) {
        match part {
            PipePart::Input(input) => {
                if let Some(network) = self.networks.get_mut(id) {
                    network.inputs.remove(&input.coord);
                }
                match self.primary.remove_matching(input.coord, id) {
                    Some(removal) => self.handle_primary_removal(removal),
                    None => {
                        let inputs_empty = self
                            .networks
                            .get(id)
                            .is_some_and(|network| network.inputs.is_empty());
                        if inputs_empty {
                            self.dismantle(id);
                        }
                    }
                }
            }
            PipePart::Output(output) => {
                let outputs_empty = match self.networks.get_mut(id) {
                    Some(network) => {
                        network.outputs.remove(&output.coord);
                        network.outputs.is_empty()
                    }
                    None => false,
                };
                remove_from_multi(&mut self.multi, output.coord, id);
                if outputs_empty {
                    self.teardown(id);
                }
            }
            PipePart::ChunkLoader(loader) => {
                if let Some(network) = self.networks.get_mut(id) {
                    network.chunk_loaders.remove(&loader.coord);
                }
                remove_from_multi(&mut self.multi, loader.coord, id);
            }
        }
        remove_part_entry(&mut self.parts, part.coord(), part);
    }

    /// Grow a network by one conduit cell, failing past the configured
    /// maximum. Unknown network ids are ignored.
    pub fn add_segment(&mut self, id: NetworkId, coord: CellCoord) -> Result<(), NetworkError> {
        let over = match self.networks.get(id) {
            Some(network) => {
                self.config.max_segments > 0
                    && network.segments.len() >= self.config.max_segments
            }
            None => return Ok(()),
        };
        if over {
            self.teardown(id);
            return Err(NetworkError::PipeTooLong(coord));
        }
        if let Some(network) = self.networks.get_mut(id) {
            network.segments.insert(coord);
            self.single.insert(coord, id);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Merge
    // -----------------------------------------------------------------------

    /// Merge several networks into one.
    ///
    /// Returns `Ok(None)` without touching anything when the tints differ.
    /// Otherwise the originals are torn down and their members unioned,
    /// ordered by discovery tick (ties by id), so the later network wins
    /// duplicate coordinates. The union is re-checked against the limits
    /// before installation; a limit failure leaves the originals dismantled
    /// and caches nothing. A union whose shape is no longer viable (for
    /// example when pruning removed its last output) also caches nothing.
    pub fn merge<G: GridView>(
        &mut self,
        grid: &G,
        ids: &[NetworkId],
    ) -> Result<Option<NetworkId>, NetworkError> {
        let mut sources: Vec<NetworkId> = Vec::new();
        for &id in ids {
            if self.networks.contains_key(id) && !sources.contains(&id) {
                sources.push(id);
            }
        }
        let mut tint: Option<TintId> = None;
        for &id in &sources {
            if let Some(network) = self.networks.get(id) {
                let t = network.tint();
                if *tint.get_or_insert(t) != t {
                    return Ok(None);
                }
            }
        }
        let Some(tint) = tint else {
            return Ok(None);
        };

        sources.sort_by_key(|&id| (self.networks.get(id).map(|n| n.discovered_at()), id));
        let snapshots: Vec<PipeNetwork> = sources
            .iter()
            .filter_map(|&id| self.networks.get(id).cloned())
            .collect();
        for &id in &sources {
            self.teardown(id);
        }

        let mut segments: BTreeSet<CellCoord> = BTreeSet::new();
        let mut inputs: BTreeMap<CellCoord, PipeInput> = BTreeMap::new();
        let mut outputs: BTreeMap<CellCoord, PipeOutput> = BTreeMap::new();
        let mut chunk_loaders: BTreeMap<CellCoord, ChunkLoader> = BTreeMap::new();
        for network in &snapshots {
            segments.extend(network.segments().iter().copied());
            inputs.extend(network.inputs().iter().map(|(c, i)| (*c, *i)));
            outputs.extend(network.outputs().iter().map(|(c, o)| (*c, *o)));
            chunk_loaders.extend(network.chunk_loaders().iter().map(|(c, l)| (*c, *l)));
        }

        let max_segments = self.config.max_segments;
        if max_segments > 0 {
            if let Some(&coord) = segments.iter().nth(max_segments) {
                return Err(NetworkError::PipeTooLong(coord));
            }
        }
        let max_outputs = self.config.max_outputs;
        if max_outputs > 0 {
            if let Some(&coord) = outputs.keys().nth(max_outputs) {
                return Err(NetworkError::TooManyOutputs(coord));
            }
        }

        let merged = PipeNetwork::new(tint, segments, inputs, outputs, chunk_loaders, self.clock);
        if !merged.is_valid() {
            return Ok(None);
        }
        Ok(Some(self.install(grid, merged)))
    }

    // -----------------------------------------------------------------------
    // Parts
    // -----------------------------------------------------------------------

    /// The part at `coord`, if the grid still classifies that cell as a
    /// part. Prefers the cached part; a fresh classification is not cached.
    pub fn part_at<G: GridView>(&self, grid: &G, coord: CellCoord) -> Option<PipePart> {
        let fresh = PipePart::from_cell(coord, grid.cell_at(coord))?;
        Some(self.parts.get(&coord).copied().unwrap_or(fresh))
    }

    /// Materialize the part at `coord` from the grid and cache it. The
    /// placement-time counterpart of [`NetworkManager::part_at`].
    pub fn create_part<G: GridView>(&mut self, grid: &G, coord: CellCoord) -> Option<PipePart> {
        let part = PipePart::from_cell(coord, grid.cell_at(coord))?;
        self.parts.insert(coord, part);
        Some(part)
    }

    /// Part-index probe; no grid access.
    pub fn cached_part(&self, coord: CellCoord) -> Option<PipePart> {
        self.parts.get(&coord).copied()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
