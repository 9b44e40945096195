//! Ductwork Core -- discovery and caching for tinted pipe networks.
//!
//! This crate turns a world of cells (seen through
//! [`GridView`](ductwork_grid::GridView)) into [`PipeNetwork`] values: a
//! flood fill walks same-tint conduit runs from a
//! starting cell, collects the intake, discharge, and chunk-loader parts
//! attached to them, and the [`NetworkManager`] caches the result so repeat
//! lookups never touch the grid.
//!
//! # Design
//!
//! - Discovery is pure: [`discover`] reads the grid and builds a candidate
//!   network without touching any cache.
//! - The manager owns every network in a slotmap arena; the cache tiers
//!   (primary per-input, single-owner per-segment, multi-owner per-output,
//!   and the part index) hold [`NetworkId`]s only.
//! - The primary tier is bounded by capacity and ttl. Every entry departure
//!   flows through one removal handler: a non-explicit departure unregisters
//!   that input, and a network is dismantled everywhere exactly when its
//!   last input is gone.
//! - Time is cooperative. The host calls [`NetworkManager::tick`] once per
//!   simulation tick; the call sweeps expired entries and drains buffered
//!   [`NetworkEvent`]s.
//! - All collections iterate in coordinate order, so every operation is
//!   deterministic for a given grid and call sequence.

pub mod config;
pub mod discover;
pub mod error;
pub mod event;
pub mod id;
pub mod manager;
pub mod part;
pub mod pipe;
pub mod ttl;

pub use config::NetworkConfig;
pub use discover::discover;
pub use error::NetworkError;
pub use event::NetworkEvent;
pub use id::NetworkId;
pub use manager::{CacheStats, NetworkManager};
pub use part::{ChunkLoader, PartKind, PipeInput, PipeOutput, PipePart};
pub use pipe::PipeNetwork;
pub use ttl::{Lookup, Removal, RemovalCause, TtlCache};
