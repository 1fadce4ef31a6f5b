//! # Chunk Graph Module
//!
//! The lazily expanding lattice of chunk nodes. The graph's registry is the
//! single authority for node identity: for any grid coordinates ever
//! requested, exactly one node exists for as long as it stays registered.
//! The registry is also the one permanent owner of every node; neighbors
//! are resolved by key through the registry rather than stored as owning
//! pointers, which keeps the cyclic four-neighbor lattice free of ownership
//! cycles.

pub mod builder;
pub mod node;
pub mod visibility;

pub use builder::ChunkBuilder;
pub use node::{BuildState, ChunkNode, Direction};
pub use visibility::VisibilitySelector;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use cgmath::Point3;
use log::info;

use crate::terrain::TerrainGenerator;

/// Memoizing registry mapping grid coordinates to shared chunk nodes.
///
/// `get_or_create` may be called concurrently from the render thread and
/// from background build tasks requesting neighbors; the registry lock
/// guarantees insertion uniqueness under that contention.
pub struct ChunkGraph {
    chunk_edge: i32,
    generator: TerrainGenerator,
    nodes: Mutex<HashMap<(i64, i64), Arc<ChunkNode>>>,
}

impl ChunkGraph {
    /// Creates an empty graph. All nodes share `chunk_edge` and the seeded
    /// terrain generator.
    pub fn new(chunk_edge: i32, generator: TerrainGenerator) -> Arc<Self> {
        Arc::new(Self {
            chunk_edge,
            generator,
            nodes: Mutex::new(HashMap::new()),
        })
    }

    /// The cube edge length shared by every node in the graph.
    pub fn chunk_edge(&self) -> i32 {
        self.chunk_edge
    }

    /// The terrain generator nodes fill their volumes from.
    pub fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    /// Number of currently registered nodes.
    pub fn len(&self) -> usize {
        self.nodes.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.lock().unwrap().is_empty()
    }

    /// Returns the node at `(grid_x, grid_z)`, creating and registering it
    /// first if absent. Idempotent and safe to call reentrantly while
    /// another node's build is resolving its neighbors.
    pub fn get_or_create(self: &Arc<Self>, grid_x: i64, grid_z: i64) -> Arc<ChunkNode> {
        let mut nodes = self.nodes.lock().unwrap();
        if let Some(node) = nodes.get(&(grid_x, grid_z)) {
            return Arc::clone(node);
        }

        info!("creating chunk node ({grid_x}, {grid_z})");
        let node = Arc::new(ChunkNode::new(
            grid_x,
            grid_z,
            self.chunk_edge,
            Arc::downgrade(self),
        ));
        nodes.insert((grid_x, grid_z), Arc::clone(&node));
        node
    }

    /// Unregisters every node whose chunk center lies farther than
    /// `keep_radius` from `origin` (horizontal distance). Before a node
    /// leaves the registry, the builder joins its own in-flight build and
    /// any in-flight build of its four lateral neighbors: a neighbor's
    /// mesh pass reads this node's volume through the registry, and
    /// removing it mid-mesh would hand those reads a recreated, all-air
    /// node. Reclaim and build requests both come from the render thread,
    /// so no new build can slip in between the joins and the removal.
    ///
    /// Returns the evicted nodes so the caller can release their GPU
    /// buffers; the graph itself never touches GPU state.
    pub fn reclaim_outside(
        &self,
        origin: Point3<f32>,
        keep_radius: f32,
        builder: &ChunkBuilder,
    ) -> Vec<Arc<ChunkNode>> {
        let doomed: Vec<Arc<ChunkNode>> = {
            let nodes = self.nodes.lock().unwrap();
            nodes
                .values()
                .filter(|node| {
                    let center = node.world_center();
                    let dx = center.x - origin.x;
                    let dz = center.z - origin.z;
                    (dx * dx + dz * dz).sqrt() > keep_radius
                })
                .cloned()
                .collect()
        };

        // Join outside the registry lock: a build task may be calling
        // get_or_create for its neighbors right now.
        let mut evicted = Vec::with_capacity(doomed.len());
        for node in doomed {
            let (grid_x, grid_z) = node.key();
            builder.join((grid_x, grid_z));
            for direction in Direction::all() {
                let (dx, dz) = direction.grid_offset();
                builder.join((grid_x + dx, grid_z + dz));
            }
            let removed = self.nodes.lock().unwrap().remove(&node.key());
            if let Some(removed) = removed {
                info!(
                    "evicted chunk node ({}, {})",
                    removed.grid_x(),
                    removed.grid_z()
                );
                evicted.push(removed);
            }
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::{GenerationMethod, TerrainParams};
    use std::thread;

    fn test_graph(edge: i32) -> Arc<ChunkGraph> {
        ChunkGraph::new(
            edge,
            TerrainGenerator::new(0, GenerationMethod::Empty, TerrainParams::default()),
        )
    }

    #[test]
    fn get_or_create_is_idempotent() {
        let graph = test_graph(8);
        let a = graph.get_or_create(2, -3);
        let b = graph.get_or_create(2, -3);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn concurrent_get_or_create_yields_one_node_per_key() {
        let graph = test_graph(8);

        let handles: Vec<Arc<ChunkNode>> = thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|_| {
                    let graph = Arc::clone(&graph);
                    scope.spawn(move || graph.get_or_create(5, 7))
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        for node in &handles[1..] {
            assert!(Arc::ptr_eq(&handles[0], node));
        }
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn neighbor_resolution_is_symmetric() {
        let graph = test_graph(8);
        let origin = graph.get_or_create(0, 0);

        let east = origin.neighbor(Direction::East);
        assert_eq!(east.key(), (1, 0));
        assert!(Arc::ptr_eq(&east.neighbor(Direction::West), &origin));

        let north = origin.neighbor(Direction::North);
        assert_eq!(north.key(), (0, -1));
        assert!(Arc::ptr_eq(&north.neighbor(Direction::South), &origin));
    }

    #[test]
    fn world_position_is_derived_from_grid_identity() {
        let graph = test_graph(16);
        let node = graph.get_or_create(3, -2);
        let corner = node.world_position();
        assert_eq!(corner.x, (3 * 16 - 8) as f32);
        assert_eq!(corner.z, (-2 * 16 - 8) as f32);
    }

    #[test]
    fn reclaim_removes_only_out_of_range_nodes() {
        let graph = test_graph(8);
        let builder = ChunkBuilder::new();

        graph.get_or_create(0, 0);
        graph.get_or_create(1, 0);
        graph.get_or_create(10, 10);

        let evicted = graph.reclaim_outside(Point3::new(0.0, 0.0, 0.0), 20.0, &builder);

        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].key(), (10, 10));
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn reclaim_joins_in_flight_builds_first() {
        let graph = ChunkGraph::new(
            8,
            TerrainGenerator::new(0, GenerationMethod::Noise, TerrainParams::default()),
        );
        let builder = ChunkBuilder::new();

        let far = graph.get_or_create(100, 100);
        builder.start_build(&far);

        let evicted = graph.reclaim_outside(Point3::new(0.0, 0.0, 0.0), 50.0, &builder);

        // The far node and the four neighbors its build created are gone,
        // and the build is no longer in flight.
        assert!(evicted.iter().any(|n| n.key() == (100, 100)));
        assert_eq!(builder.in_flight(), 0);
        assert_eq!(far.build_state(), BuildState::Built);
    }

    #[test]
    fn reclaim_waits_for_builds_reading_a_doomed_neighbor() {
        // A node's mesh pass reads its four lateral neighbors through the
        // registry. Evicting one of them mid-mesh would swap in a
        // recreated all-air volume and leak seam faces into the finished
        // mesh, so reclaim must wait for adjacent builds first.
        for _ in 0..8 {
            let graph = ChunkGraph::new(
                16,
                TerrainGenerator::new(
                    0,
                    GenerationMethod::Flat { height: 8 },
                    TerrainParams::default(),
                ),
            );
            let builder = ChunkBuilder::new();
            let origin = graph.get_or_create(0, 0);

            thread::scope(|scope| {
                let reclaimer = scope.spawn(|| {
                    while origin.build_state() != BuildState::Built {
                        graph.reclaim_outside(Point3::new(0.0, 0.0, 0.0), 8.0, &builder);
                        thread::yield_now();
                    }
                });
                builder.start_build(&origin);
                reclaimer.join().unwrap();
            });
            builder.join_all();

            // A flat world has identical terrain on both sides of every
            // seam, so a correctly built mesh has no lateral faces.
            let mesh = origin.mesh_snapshot();
            for normal in [
                [-1.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 0.0, -1.0],
                [0.0, 0.0, 1.0],
            ] {
                assert_eq!(
                    mesh.quads_with_normal(normal),
                    0,
                    "seam faces leaked after a mid-build eviction"
                );
            }
        }
    }
}
