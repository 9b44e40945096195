//! The bounded store behind the primary cache tier.
//!
//! Maps input coordinates to network ids with two bounds: an entry count
//! (evicting the oldest write first) and a time-to-live measured from each
//! entry's last write. Expiry is lazy on mutating reads plus an explicit
//! [`TtlCache::sweep`]; every departure is reported as a [`Removal`] so the
//! caller can settle the other cache tiers.

use std::collections::BTreeMap;

use ductwork_grid::{CellCoord, Ticks};
use serde::{Deserialize, Serialize};

use crate::id::NetworkId;

// ---------------------------------------------------------------------------
// Removal records
// ---------------------------------------------------------------------------

/// Why an entry left the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalCause {
    /// Removed by a caller.
    Explicit,
    /// The time-to-live ran out.
    Expired,
    /// Pushed out by the capacity bound.
    Evicted,
    /// Overwritten by an entry for a different network.
    Replaced,
}

/// A record of one entry leaving the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Removal {
    pub coord: CellCoord,
    pub network: NetworkId,
    pub cause: RemovalCause,
}

/// Outcome of a mutating lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// A fresh entry.
    Hit(NetworkId),
    /// No entry at all.
    Miss,
    /// The entry had outlived its ttl and has been removed.
    Expired(Removal),
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Entry {
    network: NetworkId,
    written_at: Ticks,
    /// Monotonic write counter; eviction takes the smallest.
    seq: u64,
}

/// A coordinate-keyed map bounded by entry count and time since last write.
///
/// A capacity of zero means unbounded; a ttl of zero means entries never
/// expire. An entry written at tick `t` stays fresh for reads at ticks
/// strictly before `t + ttl`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtlCache {
    entries: BTreeMap<CellCoord, Entry>,
    capacity: usize,
    ttl: Ticks,
    next_seq: u64,
}

impl TtlCache {
    pub fn new(capacity: usize, ttl: Ticks) -> Self {
        Self {
            entries: BTreeMap::new(),
            capacity,
            ttl,
            next_seq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_expired(&self, entry: &Entry, now: Ticks) -> bool {
        self.ttl > 0 && now.saturating_sub(entry.written_at) >= self.ttl
    }

    /// Write an entry, returning the displacements the write caused.
    ///
    /// An existing entry for a different network at the same coordinate
    /// leaves as [`RemovalCause::Replaced`]; entries pushed out by the
    /// capacity bound leave as [`RemovalCause::Evicted`], oldest write
    /// first. Rewriting the same network only refreshes the write stamp and
    /// reports nothing.
    pub fn insert(&mut self, coord: CellCoord, network: NetworkId, now: Ticks) -> Vec<Removal> {
        let mut removals = Vec::new();
        let seq = self.next_seq;
        self.next_seq += 1;

        if let Some(entry) = self.entries.get_mut(&coord) {
            if entry.network != network {
                removals.push(Removal {
                    coord,
                    network: entry.network,
                    cause: RemovalCause::Replaced,
                });
            }
            entry.network = network;
            entry.written_at = now;
            entry.seq = seq;
            return removals;
        }

        self.entries.insert(
            coord,
            Entry {
                network,
                written_at: now,
                seq,
            },
        );
        if self.capacity > 0 {
            while self.entries.len() > self.capacity {
                let oldest = self
                    .entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.seq)
                    .map(|(coord, entry)| (*coord, entry.network));
                match oldest {
                    Some((coord, network)) => {
                        self.entries.remove(&coord);
                        removals.push(Removal {
                            coord,
                            network,
                            cause: RemovalCause::Evicted,
                        });
                    }
                    None => break,
                }
            }
        }
        removals
    }

    /// Look up `coord`, lazily removing an expired entry.
    pub fn get(&mut self, coord: CellCoord, now: Ticks) -> Lookup {
        let entry = match self.entries.get(&coord) {
            Some(entry) => *entry,
            None => return Lookup::Miss,
        };
        if self.is_expired(&entry, now) {
            self.entries.remove(&coord);
            return Lookup::Expired(Removal {
                coord,
                network: entry.network,
                cause: RemovalCause::Expired,
            });
        }
        Lookup::Hit(entry.network)
    }

    /// Look up `coord` without mutating; fresh entries only.
    pub fn peek(&self, coord: CellCoord, now: Ticks) -> Option<NetworkId> {
        let entry = self.entries.get(&coord)?;
        if self.is_expired(entry, now) {
            return None;
        }
        Some(entry.network)
    }

    /// Remove the entry at `coord` under the given cause, whatever network
    /// it names.
    pub fn remove_with(&mut self, coord: CellCoord, cause: RemovalCause) -> Option<Removal> {
        self.entries.remove(&coord).map(|entry| Removal {
            coord,
            network: entry.network,
            cause,
        })
    }

    /// Remove the entry at `coord` as an explicit caller removal.
    pub fn remove(&mut self, coord: CellCoord) -> Option<Removal> {
        self.remove_with(coord, RemovalCause::Explicit)
    }

    /// Remove the entry at `coord` only if it names `network`.
    pub fn remove_matching(&mut self, coord: CellCoord, network: NetworkId) -> Option<Removal> {
        if self.entries.get(&coord).map(|entry| entry.network) == Some(network) {
            return self.remove(coord);
        }
        None
    }

    /// Remove every expired entry, in coordinate order.
    pub fn sweep(&mut self, now: Ticks) -> Vec<Removal> {
        if self.ttl == 0 {
            return Vec::new();
        }
        let expired: Vec<CellCoord> = self
            .entries
            .iter()
            .filter(|(_, entry)| self.is_expired(entry, now))
            .map(|(coord, _)| *coord)
            .collect();
        expired
            .into_iter()
            .filter_map(|coord| self.remove_with(coord, RemovalCause::Expired))
            .collect()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
