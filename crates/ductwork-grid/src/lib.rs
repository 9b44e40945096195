//! Ductwork Grid -- the world vocabulary for pipe-network discovery.
//!
//! This crate defines the coordinate system, the six axis directions, cell
//! classification, and the [`GridView`] trait through which the network core
//! observes the host world. It holds no network state of its own.
//!
//! # Design
//!
//! - Coordinates are absolute and world-qualified: a [`CellCoord`] names one
//!   cell in one world, and adjacency is the six axis directions.
//! - The host world is consumed through [`GridView`]: cell classification,
//!   partition residency, and holder emptiness. The network layer stores
//!   identifiers only, never references into the world.
//! - [`MemoryGrid`] (behind the `test-utils` feature) is a reference
//!   implementation backed by plain maps, for tests and benchmarks.

pub mod cell;
pub mod coord;
pub mod view;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use cell::{CellKind, HolderId, TintId};
pub use coord::{CellCoord, Direction, WorldId};
#[cfg(any(test, feature = "test-utils"))]
pub use test_utils::MemoryGrid;
pub use view::GridView;

/// Simulation tick count.
pub type Ticks = u64;
