//! Partition residency: discovery refusal, hit-time reverification, and
//! chunk-loader waivers.

use std::collections::BTreeSet;

use ductwork_core::{NetworkConfig, NetworkError, NetworkManager, discover};
use ductwork_grid::test_utils::{amber, at};
use ductwork_grid::{Direction, MemoryGrid};

/// A run long enough to cross from partition (0, 0) into (1, 0).
fn border_crossing_pipe() -> MemoryGrid {
    let mut grid = MemoryGrid::new();
    grid.place_input(at(-1, 0, 0), Direction::East);
    grid.place_conduit_run(at(0, 0, 0), Direction::East, 20, amber());
    grid.place_output(at(20, 0, 0), Direction::East);
    grid.place_container(at(21, 0, 0));
    grid
}

#[test]
fn discovery_stops_at_an_unloaded_partition_border() {
    let mut grid = border_crossing_pipe();
    grid.unload_partition(at(16, 0, 0));

    let config = NetworkConfig::unbounded();
    assert_eq!(
        discover(&grid, at(-1, 0, 0), &config, 0),
        Err(NetworkError::ChunkNotLoaded(at(16, 0, 0)))
    );

    // the manager propagates the refusal and caches nothing
    let mut manager = NetworkManager::new(config);
    assert_eq!(
        manager.networks_at(&grid, at(-1, 0, 0)),
        Err(NetworkError::ChunkNotLoaded(at(16, 0, 0)))
    );
    assert_eq!(manager.network_count(), 0);

    grid.load_partition(at(16, 0, 0));
    let ids = manager.networks_at(&grid, at(-1, 0, 0)).unwrap();
    assert_eq!(ids.len(), 1);
    let id = *ids.first().unwrap();
    assert_eq!(manager.network(id).unwrap().segments().len(), 20);
}

#[test]
fn discovery_requires_a_resident_start() {
    let mut grid = border_crossing_pipe();
    grid.unload_partition(at(-1, 0, 0));

    let mut manager = NetworkManager::new(NetworkConfig::unbounded());
    assert_eq!(
        manager.network_by_input(&grid, at(-1, 0, 0)),
        Err(NetworkError::ChunkNotLoaded(at(-1, 0, 0)))
    );
}

#[test]
fn loaders_carry_discovery_through_unloaded_partitions() {
    let mut grid = border_crossing_pipe();
    // the loader sits on the first conduit cell, well inside the resident
    // partition, and is registered long before the walk hits the border
    grid.place_loader(at(0, 1, 0));
    grid.unload_partition(at(16, 0, 0));

    let mut manager = NetworkManager::new(NetworkConfig::unbounded());
    let ids = manager.networks_at(&grid, at(-1, 0, 0)).unwrap();
    assert_eq!(ids.len(), 1);
    let network = manager.network(*ids.first().unwrap()).unwrap();
    assert_eq!(network.segments().len(), 20);
    assert_eq!(network.chunk_loaders().len(), 1);
}

#[test]
fn primary_hits_reverify_while_other_tiers_trust() {
    let mut grid = MemoryGrid::new();
    let input = at(-1, 0, 0);
    grid.place_input(input, Direction::East);
    grid.place_conduit_run(at(0, 0, 0), Direction::East, 3, amber());
    grid.place_output(at(3, 0, 0), Direction::East);
    grid.place_container(at(4, 0, 0));

    let mut manager = NetworkManager::new(NetworkConfig::unbounded());
    let id = manager.network_by_input(&grid, input).unwrap().unwrap();

    grid.unload_partition(at(0, 0, 0));

    // the segment lookup serves the tier without reverifying
    assert_eq!(
        manager.networks_at(&grid, at(1, 0, 0)).unwrap(),
        BTreeSet::from([id])
    );
    // the input lookup reverifies and refuses, keeping the entry
    assert_eq!(
        manager.network_by_input(&grid, input),
        Err(NetworkError::ChunkNotLoaded(at(0, 0, 0)))
    );
    assert_eq!(manager.stats().primary_entries, 1);

    grid.load_partition(at(0, 0, 0));
    assert_eq!(manager.network_by_input(&grid, input).unwrap(), Some(id));
}

#[test]
fn loader_networks_serve_hits_while_fully_unloaded() {
    let mut grid = MemoryGrid::new();
    let input = at(-1, 0, 0);
    grid.place_input(input, Direction::East);
    grid.place_conduit_run(at(0, 0, 0), Direction::East, 3, amber());
    grid.place_output(at(3, 0, 0), Direction::East);
    grid.place_container(at(4, 0, 0));
    grid.place_loader(at(0, 1, 0));

    let mut manager = NetworkManager::new(NetworkConfig::unbounded());
    let id = manager.network_by_input(&grid, input).unwrap().unwrap();

    grid.unload_partition(at(-1, 0, 0));
    grid.unload_partition(at(0, 0, 0));
    assert_eq!(manager.network_by_input(&grid, input).unwrap(), Some(id));
}
