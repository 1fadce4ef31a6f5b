//! # Engine Module
//!
//! Frame-level coordination. `TerrainEngine` owns the chunk graph, the
//! build coordinator, and the visibility selector, and exposes the three
//! calls a frame loop makes: `update` (traverse and kick builds), `draw`
//! (render what is ready), and `maintain` (reap finished build threads and
//! reclaim out-of-range nodes).

use std::sync::Arc;

use cgmath::{Vector3, Zero};
use log::debug;

use crate::config::EngineConfig;
use crate::graph::{ChunkBuilder, ChunkGraph, ChunkNode, VisibilitySelector};
use crate::render::{Observer, RenderTarget};
use crate::terrain::TerrainGenerator;

/// Per-frame draw outcome.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrawStats {
    /// Nodes whose mesh was drawn this frame.
    pub drawn: usize,
    /// Nodes skipped because their build had not landed yet.
    pub skipped: usize,
}

/// The terrain core wired together.
pub struct TerrainEngine {
    config: EngineConfig,
    graph: Arc<ChunkGraph>,
    builder: ChunkBuilder,
    selector: VisibilitySelector,
}

impl TerrainEngine {
    pub fn new(config: EngineConfig) -> Self {
        let generator = TerrainGenerator::new(
            config.seed,
            config.generation.clone(),
            config.terrain.clone(),
        );
        let graph = ChunkGraph::new(config.chunk_edge, generator);
        let selector = VisibilitySelector::new(config.visibility_radius);
        Self {
            config,
            graph,
            builder: ChunkBuilder::new(),
            selector,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn graph(&self) -> &Arc<ChunkGraph> {
        &self.graph
    }

    pub fn builder(&self) -> &ChunkBuilder {
        &self.builder
    }

    /// Traverses the lattice from the observer's node, requesting builds
    /// for everything reachable, and returns the visible snapshot.
    pub fn update(&self, observer: &Observer) -> Vec<(Arc<ChunkNode>, Vector3<f32>)> {
        let origin = observer.current_node(&self.graph);
        self.selector
            .find_reachable(&origin, Vector3::zero(), &self.builder)
    }

    /// Draws every ready node in `reachable`; nodes still generating are
    /// skipped rather than waited on.
    pub fn draw<R: RenderTarget>(
        &self,
        reachable: &[(Arc<ChunkNode>, Vector3<f32>)],
        target: &mut R,
    ) -> DrawStats {
        let mut stats = DrawStats::default();
        for (node, _) in reachable {
            if node.draw(target) {
                stats.drawn += 1;
            } else {
                stats.skipped += 1;
            }
        }
        stats
    }

    /// End-of-frame housekeeping: reap terminated build threads and, if
    /// reclamation is enabled, evict nodes beyond the reclaim radius and
    /// release their GPU buffers.
    pub fn maintain<R: RenderTarget>(&self, observer: &Observer, target: &mut R) {
        let reaped = self.builder.reap_finished();
        if reaped > 0 {
            debug!("reaped {reaped} finished build threads");
        }

        if self.config.reclaim_radius > 0.0 {
            let evicted = self.graph.reclaim_outside(
                observer.position(),
                self.config.reclaim_radius,
                &self.builder,
            );
            for node in evicted {
                if let Some(handle) = node.take_gpu_handle() {
                    target.discard_mesh(handle);
                }
            }
        }
    }

    /// Joins every outstanding build thread. Call before dropping the
    /// engine so no generation task outlives the graph.
    pub fn shutdown(&self) {
        self.builder.join_all();
    }
}
