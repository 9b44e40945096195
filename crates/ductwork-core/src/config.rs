//! Tunable limits for discovery and the primary cache tier.

use ductwork_grid::Ticks;
use serde::{Deserialize, Serialize};

/// Limits for discovery and the primary cache tier.
///
/// Zero disables the corresponding bound: a zero count means unlimited and
/// a zero ttl means entries never expire. A network holding exactly a
/// configured maximum is legal; the error fires when one more member would
/// exceed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Most conduit cells one network may contain.
    pub max_segments: usize,
    /// Most discharge parts one network may contain.
    pub max_outputs: usize,
    /// Most entries the primary tier holds before evicting the oldest write.
    pub primary_capacity: usize,
    /// Ticks a primary entry stays fresh after its last write.
    pub primary_ttl: Ticks,
}

impl NetworkConfig {
    /// A configuration with every bound disabled.
    pub fn unbounded() -> Self {
        Self {
            max_segments: 0,
            max_outputs: 0,
            primary_capacity: 0,
            primary_ttl: 0,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            max_segments: 500,
            max_outputs: 20,
            primary_capacity: 500,
            // five minutes at twenty ticks per second
            primary_ttl: 6000,
        }
    }
}
