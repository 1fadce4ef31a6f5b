//! # Visibility Module
//!
//! Breadth-limited traversal of the chunk lattice around the observer.
//! Starting at the observer's node, the walk follows lateral neighbors
//! depth-first, pruning any branch whose accumulated offset leaves the
//! visibility radius and never revisiting a node already collected. The
//! lattice is 4-regular and cyclic, so the visited set is what makes the
//! walk terminate.
//!
//! The traversal doubles as the demand signal for generation: every node
//! it reaches gets a background build requested opportunistically.

use std::collections::HashSet;
use std::sync::Arc;

use cgmath::{InnerSpace, Vector3};

use super::builder::ChunkBuilder;
use super::node::{ChunkNode, Direction};

/// Enumerates nodes within a fixed radius of a traversal origin.
pub struct VisibilitySelector {
    radius: f32,
}

impl VisibilitySelector {
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Walks outward from `origin`, returning every reachable node paired
    /// with its accumulated world-space offset from the true origin.
    ///
    /// The result is finite, duplicate-free, and deterministic for a given
    /// graph. Each visited node gets a build requested through `builder`;
    /// nodes created by those builds only show up on a later call, which is
    /// the expected snapshot behavior.
    pub fn find_reachable(
        &self,
        origin: &Arc<ChunkNode>,
        origin_offset: Vector3<f32>,
        builder: &ChunkBuilder,
    ) -> Vec<(Arc<ChunkNode>, Vector3<f32>)> {
        let mut visited = HashSet::new();
        let mut reachable = Vec::new();
        self.visit(origin, origin_offset, builder, &mut visited, &mut reachable);
        reachable
    }

    fn visit(
        &self,
        node: &Arc<ChunkNode>,
        offset: Vector3<f32>,
        builder: &ChunkBuilder,
        visited: &mut HashSet<(i64, i64)>,
        reachable: &mut Vec<(Arc<ChunkNode>, Vector3<f32>)>,
    ) {
        if visited.contains(&node.key()) {
            return;
        }
        if offset.magnitude() > self.radius {
            return;
        }
        visited.insert(node.key());
        reachable.push((Arc::clone(node), offset));

        builder.start_build(node);

        let edge = node.chunk_edge() as f32;
        for direction in Direction::all() {
            self.visit(
                &node.neighbor(direction),
                offset + direction.world_offset(edge),
                builder,
                visited,
                reachable,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ChunkGraph;
    use crate::terrain::{GenerationMethod, TerrainGenerator, TerrainParams};
    use cgmath::Zero;

    fn empty_graph(edge: i32) -> Arc<ChunkGraph> {
        ChunkGraph::new(
            edge,
            TerrainGenerator::new(0, GenerationMethod::Empty, TerrainParams::default()),
        )
    }

    #[test]
    fn traversal_terminates_with_a_radius_bounded_result() {
        let graph = empty_graph(16);
        let builder = ChunkBuilder::new();
        let selector = VisibilitySelector::new(40.0);

        let reachable =
            selector.find_reachable(&graph.get_or_create(0, 0), Vector3::zero(), &builder);

        // Offsets are multiples of 16 with magnitude <= 40: the origin,
        // four at 16, four at 32, four diagonals at ~22.6 and eight at
        // ~35.8 make 21 nodes.
        assert_eq!(reachable.len(), 21);

        for (_, offset) in &reachable {
            assert!(offset.magnitude() <= 40.0);
        }

        builder.join_all();
    }

    #[test]
    fn no_node_appears_twice() {
        let graph = empty_graph(16);
        let builder = ChunkBuilder::new();
        let selector = VisibilitySelector::new(50.0);

        let reachable =
            selector.find_reachable(&graph.get_or_create(0, 0), Vector3::zero(), &builder);

        let mut keys = HashSet::new();
        for (node, _) in &reachable {
            assert!(keys.insert(node.key()), "duplicate node {:?}", node.key());
        }

        builder.join_all();
    }

    #[test]
    fn traversal_requests_a_build_for_every_reached_node() {
        let graph = empty_graph(16);
        let builder = ChunkBuilder::new();
        let selector = VisibilitySelector::new(40.0);

        let reachable =
            selector.find_reachable(&graph.get_or_create(0, 0), Vector3::zero(), &builder);

        assert_eq!(builder.builds_started(), reachable.len());
        builder.join_all();
    }

    #[test]
    fn zero_radius_still_includes_the_origin() {
        let graph = empty_graph(16);
        let builder = ChunkBuilder::new();
        let selector = VisibilitySelector::new(0.0);

        let reachable =
            selector.find_reachable(&graph.get_or_create(0, 0), Vector3::zero(), &builder);

        assert_eq!(reachable.len(), 1);
        assert_eq!(reachable[0].0.key(), (0, 0));
        builder.join_all();
    }
}
