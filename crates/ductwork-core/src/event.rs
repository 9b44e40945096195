//! Buffered notifications for the host and its transport scheduler.

use ductwork_grid::{CellCoord, Ticks, TintId};
use serde::{Deserialize, Serialize};

use crate::id::NetworkId;

/// A notification buffered by the manager and drained once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkEvent {
    /// A freshly cached network has an input whose holder already carries
    /// items; the transport scheduler should start draining it.
    NetworkReady { input: CellCoord, tick: Ticks },
    /// A network entered the arena and the caches.
    NetworkFormed {
        network: NetworkId,
        tint: TintId,
        tick: Ticks,
    },
    /// A network left the arena; every cache entry for it is gone.
    NetworkDismantled { network: NetworkId, tick: Ticks },
}

impl NetworkEvent {
    /// The tick at which the event occurred.
    pub fn tick(&self) -> Ticks {
        match self {
            NetworkEvent::NetworkReady { tick, .. } => *tick,
            NetworkEvent::NetworkFormed { tick, .. } => *tick,
            NetworkEvent::NetworkDismantled { tick, .. } => *tick,
        }
    }
}
