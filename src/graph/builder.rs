//! # Chunk Builder Module
//!
//! Concurrency coordinator for node generation. Each requested build runs
//! on its own background thread, spawned on demand rather than pooled, and
//! the builder guarantees at most one in-flight build per node. The caller
//! is never blocked: `start_build` is fire-and-forget, and a node that is
//! not ready yet simply gets skipped by the draw path until its build
//! lands.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use log::debug;

use super::node::ChunkNode;

/// Launches and tracks background build threads, keyed by node identity.
pub struct ChunkBuilder {
    jobs: Mutex<HashMap<(i64, i64), JoinHandle<()>>>,
    started: AtomicUsize,
}

impl ChunkBuilder {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
            started: AtomicUsize::new(0),
        }
    }

    /// Requests a background build for `node`.
    ///
    /// Only a node that is still `Unbuilt` is eligible; the atomic
    /// transition to `Building` makes sure that when several callers race
    /// on the same node, exactly one build thread is spawned. Returns
    /// whether this call launched the build.
    pub fn start_build(&self, node: &Arc<ChunkNode>) -> bool {
        if !node.try_begin_build() {
            return false;
        }

        self.started.fetch_add(1, Ordering::Relaxed);
        debug!(
            "starting background build for ({}, {})",
            node.grid_x(),
            node.grid_z()
        );

        let worker = Arc::clone(node);
        // Spawn while holding the job table lock so the thread is tracked
        // before any concurrent join can scan the table. The build closure
        // never touches the table itself.
        let previous = {
            let mut jobs = self.jobs.lock().unwrap();
            let handle = thread::Builder::new()
                .name(format!("chunk-build-{}x{}", node.grid_x(), node.grid_z()))
                .spawn(move || worker.build())
                .expect("failed to spawn chunk build thread");
            jobs.insert(node.key(), handle)
        };
        if let Some(previous) = previous {
            // A node recreated after eviction reuses its key; the old
            // thread finished before the eviction joined it, so this only
            // reaps the stored handle.
            let _ = previous.join();
        }
        true
    }

    /// Joins the build thread for `key`, if one is tracked. Called before a
    /// node's storage is released so no background write can dangle.
    pub fn join(&self, key: (i64, i64)) {
        let handle = self.jobs.lock().unwrap().remove(&key);
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }

    /// Joins every tracked build thread.
    pub fn join_all(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut jobs = self.jobs.lock().unwrap();
            jobs.drain().map(|(_, handle)| handle).collect()
        };
        for handle in handles {
            let _ = handle.join();
        }
    }

    /// Drops the handles of threads that already terminated. Called once
    /// per frame so the job table does not grow with the world.
    pub fn reap_finished(&self) -> usize {
        let mut jobs = self.jobs.lock().unwrap();
        let finished: Vec<(i64, i64)> = jobs
            .iter()
            .filter(|(_, handle)| handle.is_finished())
            .map(|(key, _)| *key)
            .collect();
        let count = finished.len();
        for key in finished {
            if let Some(handle) = jobs.remove(&key) {
                let _ = handle.join();
            }
        }
        count
    }

    /// Number of tracked threads still running.
    pub fn in_flight(&self) -> usize {
        self.jobs
            .lock()
            .unwrap()
            .values()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    /// Total number of builds ever launched by this builder.
    pub fn builds_started(&self) -> usize {
        self.started.load(Ordering::Relaxed)
    }
}

impl Default for ChunkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::BuildState;
    use crate::graph::ChunkGraph;
    use crate::terrain::{GenerationMethod, TerrainGenerator, TerrainParams};

    fn flat_graph(edge: i32) -> Arc<ChunkGraph> {
        ChunkGraph::new(
            edge,
            TerrainGenerator::new(
                0,
                GenerationMethod::Flat { height: edge / 2 },
                TerrainParams::default(),
            ),
        )
    }

    #[test]
    fn build_runs_in_the_background_and_marks_built() {
        let graph = flat_graph(8);
        let builder = ChunkBuilder::new();
        let node = graph.get_or_create(0, 0);

        assert_eq!(node.build_state(), BuildState::Unbuilt);
        assert!(builder.start_build(&node));
        builder.join_all();

        assert_eq!(node.build_state(), BuildState::Built);
        assert!(node.quad_count() > 0);
        // The four lateral neighbors were generated for seam culling.
        assert_eq!(graph.len(), 5);
    }

    #[test]
    fn racing_start_build_callers_spawn_exactly_one_build() {
        let graph = flat_graph(8);
        let builder = ChunkBuilder::new();
        let node = graph.get_or_create(0, 0);

        let launched: usize = thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|_| {
                    let builder = &builder;
                    let node = Arc::clone(&node);
                    scope.spawn(move || usize::from(builder.start_build(&node)))
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).sum()
        });

        assert_eq!(launched, 1);
        assert_eq!(builder.builds_started(), 1);
        builder.join_all();
        assert_eq!(node.build_state(), BuildState::Built);
    }

    #[test]
    fn join_right_after_start_build_waits_for_that_build() {
        // The handle is registered before start_build returns, so a join
        // issued immediately afterwards cannot miss the thread.
        let graph = flat_graph(8);
        let builder = ChunkBuilder::new();
        let node = graph.get_or_create(0, 0);

        assert!(builder.start_build(&node));
        builder.join(node.key());

        assert_eq!(node.build_state(), BuildState::Built);
        assert_eq!(builder.in_flight(), 0);
    }

    #[test]
    fn start_build_is_a_no_op_on_built_nodes() {
        let graph = flat_graph(8);
        let builder = ChunkBuilder::new();
        let node = graph.get_or_create(0, 0);

        assert!(builder.start_build(&node));
        builder.join_all();
        assert!(!builder.start_build(&node));
        assert_eq!(builder.builds_started(), 1);
    }

    #[test]
    fn reap_finished_clears_terminated_jobs() {
        let graph = flat_graph(8);
        let builder = ChunkBuilder::new();

        builder.start_build(&graph.get_or_create(0, 0));
        builder.start_build(&graph.get_or_create(4, 4));
        builder.join_all();

        // join_all drained everything already; reap on an empty table.
        assert_eq!(builder.reap_finished(), 0);

        builder.start_build(&graph.get_or_create(8, 8));
        while builder.in_flight() > 0 {
            thread::yield_now();
        }
        assert_eq!(builder.reap_finished(), 1);
        assert_eq!(builder.in_flight(), 0);
    }
}
