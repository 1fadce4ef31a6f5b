//! # Chunk Node Module
//!
//! A node wraps one chunk volume with its world-grid identity, its build
//! state, and the ability to resolve lateral neighbors through the owning
//! graph. Nodes are shared between the render thread and background build
//! threads behind `Arc`, with the volume data guarded by a read-write lock
//! and the build state advanced atomically.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, Weak};

use cgmath::Point3;
use log::{debug, info};

use crate::core::Shared;
use crate::render::{MeshHandle, RenderTarget};
use crate::terrain::{BlockType, QuadMesh, VoxelChunk};

use super::ChunkGraph;

/// The four lateral neighbor directions of a node. The world is a single
/// horizontal layer of chunks; there are no vertical neighbors.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All four directions, in traversal order.
    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::East,
            Direction::South,
            Direction::West,
        ]
    }

    /// Grid coordinate offset for this direction.
    pub fn grid_offset(self) -> (i64, i64) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    /// World-space offset of the neighboring chunk center, given the chunk
    /// edge length.
    pub fn world_offset(self, chunk_edge: f32) -> cgmath::Vector3<f32> {
        let (dx, dz) = self.grid_offset();
        cgmath::Vector3::new(dx as f32 * chunk_edge, 0.0, dz as f32 * chunk_edge)
    }
}

/// Generation progress of a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BuildState {
    /// No generation has been requested yet.
    Unbuilt,
    /// A background build task owns the node right now.
    Building,
    /// Volume and mesh are complete and consistent.
    Built,
    /// Volume is generated but an edit invalidated the mesh.
    Stale,
}

const STATE_UNBUILT: u8 = 0;
const STATE_BUILDING: u8 = 1;
const STATE_BUILT: u8 = 2;
const STATE_STALE: u8 = 3;

impl BuildState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            STATE_UNBUILT => BuildState::Unbuilt,
            STATE_BUILDING => BuildState::Building,
            STATE_BUILT => BuildState::Built,
            _ => BuildState::Stale,
        }
    }
}

/// One chunk of the infinite lattice, keyed by `(grid_x, grid_z)`.
///
/// The registry in [`ChunkGraph`] is the one permanent owner; build threads
/// and traversals hold temporary additional references. The node holds only
/// a weak handle back to the graph, so the neighbor lattice stays cyclic
/// without ownership cycles.
pub struct ChunkNode {
    grid_x: i64,
    grid_z: i64,
    chunk_edge: i32,
    graph: Weak<ChunkGraph>,
    blocks: Shared<VoxelChunk>,
    mesh: Mutex<QuadMesh>,
    gpu: Mutex<Option<MeshHandle>>,
    state: AtomicU8,
}

impl ChunkNode {
    pub(super) fn new(grid_x: i64, grid_z: i64, chunk_edge: i32, graph: Weak<ChunkGraph>) -> Self {
        Self {
            grid_x,
            grid_z,
            chunk_edge,
            graph,
            blocks: Shared::new(VoxelChunk::new(chunk_edge)),
            mesh: Mutex::new(QuadMesh::default()),
            gpu: Mutex::new(None),
            state: AtomicU8::new(STATE_UNBUILT),
        }
    }

    pub fn grid_x(&self) -> i64 {
        self.grid_x
    }

    pub fn grid_z(&self) -> i64 {
        self.grid_z
    }

    /// Registry key of this node.
    pub fn key(&self) -> (i64, i64) {
        (self.grid_x, self.grid_z)
    }

    /// Edge length of the owned chunk volume.
    pub fn chunk_edge(&self) -> i32 {
        self.chunk_edge
    }

    /// World position of the chunk's minimum corner.
    pub fn world_position(&self) -> Point3<f32> {
        let n = self.chunk_edge as i64;
        Point3::new(
            (self.grid_x * n - n / 2) as f32,
            0.0,
            (self.grid_z * n - n / 2) as f32,
        )
    }

    /// World position of the chunk's horizontal center.
    pub fn world_center(&self) -> Point3<f32> {
        let n = self.chunk_edge as i64;
        Point3::new((self.grid_x * n) as f32, 0.0, (self.grid_z * n) as f32)
    }

    /// Current build state.
    pub fn build_state(&self) -> BuildState {
        BuildState::from_raw(self.state.load(Ordering::Acquire))
    }

    fn graph(&self) -> std::sync::Arc<ChunkGraph> {
        self.graph
            .upgrade()
            .expect("chunk graph dropped while a node was still in use")
    }

    /// Resolves the neighbor in `direction`, creating it if absent. Always
    /// succeeds: the lattice has no edge.
    pub fn neighbor(&self, direction: Direction) -> std::sync::Arc<ChunkNode> {
        let (dx, dz) = direction.grid_offset();
        self.graph().get_or_create(self.grid_x + dx, self.grid_z + dz)
    }

    /// Fills the node's volume from the graph's terrain generator. A no-op
    /// once the volume is ready, so concurrent callers (the node's own
    /// build and a neighbor's build) serialize on the volume lock and only
    /// the first one generates.
    pub fn generate_self(&self) {
        let mut chunk = self.blocks.write();
        if chunk.ready() {
            return;
        }
        debug!("generating volume for ({}, {})", self.grid_x, self.grid_z);
        self.graph().generator().fill(&mut chunk, self.grid_x, self.grid_z);
        chunk.mark_ready();
    }

    /// Transition `Unbuilt -> Building`. Returns whether this caller won
    /// the right to build. Used by the builder to guarantee at most one
    /// in-flight build per node.
    pub(crate) fn try_begin_build(&self) -> bool {
        self.state
            .compare_exchange(
                STATE_UNBUILT,
                STATE_BUILDING,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// The node-level generation protocol: generate the four lateral
    /// neighbor volumes first, then the node's own volume, then mesh, then
    /// mark `Built`.
    ///
    /// Neighbor volumes must exist before meshing so face culling at the
    /// chunk seams sees real block data instead of a placeholder. A second
    /// call on a `Built` node is a no-op.
    pub fn build(&self) {
        if self.build_state() == BuildState::Built {
            return;
        }

        for direction in Direction::all() {
            self.neighbor(direction).generate_self();
        }
        self.generate_self();

        let mesh = QuadMesh::build(self.chunk_edge, |x, y, z| self.block_at(x, y, z).is_solid());
        *self.mesh.lock().unwrap() = mesh;

        self.state.store(STATE_BUILT, Ordering::Release);
        info!("built chunk node ({}, {})", self.grid_x, self.grid_z);
    }

    /// Reads a block with neighbor redirection.
    ///
    /// Local coordinates outside `[-N/2, N/2)` on the horizontal axes are
    /// translated by one chunk edge and delegated to the neighbor on that
    /// side. Vertical coordinates outside `[0, N)` resolve to air: no
    /// chunks exist above or below the world layer.
    pub fn block_at(&self, x: i32, y: i32, z: i32) -> BlockType {
        let n = self.chunk_edge;
        let hs = n / 2;

        if y < 0 || y >= n {
            return BlockType::Air;
        }
        if x < -hs {
            return self.neighbor(Direction::West).block_at(x + n, y, z);
        }
        if x >= hs {
            return self.neighbor(Direction::East).block_at(x - n, y, z);
        }
        if z < -hs {
            return self.neighbor(Direction::North).block_at(x, y, z + n);
        }
        if z >= hs {
            return self.neighbor(Direction::South).block_at(x, y, z - n);
        }

        self.blocks.read().block(x, y, z)
    }

    /// Writes a block and invalidates the cached mesh. A `Built` node drops
    /// back to `Stale` so the next draw re-meshes it; the volume itself
    /// stays generated and is never re-filled from noise.
    pub fn set_block(&self, x: i32, y: i32, z: i32, value: BlockType) {
        self.blocks.write().set_block(x, y, z, value);
        self.mesh.lock().unwrap().invalidate();
        let _ = self.state.compare_exchange(
            STATE_BUILT,
            STATE_STALE,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Draws the node into `target` if it is ready.
    ///
    /// Nodes that are still `Unbuilt` or `Building` are skipped, never
    /// waited on; they return `false` and get drawn on a later frame. A
    /// `Stale` node is re-meshed exactly once, its previous GPU buffer is
    /// discarded, and it returns to `Built` before uploading.
    pub fn draw<R: RenderTarget>(&self, target: &mut R) -> bool {
        match self.build_state() {
            BuildState::Built | BuildState::Stale => {}
            BuildState::Unbuilt | BuildState::Building => return false,
        }

        let mut mesh = self.mesh.lock().unwrap();

        if self.build_state() == BuildState::Stale {
            *mesh = QuadMesh::build(self.chunk_edge, |x, y, z| {
                self.block_at(x, y, z).is_solid()
            });
            if let Some(old) = self.gpu.lock().unwrap().take() {
                target.discard_mesh(old);
            }
            self.state.store(STATE_BUILT, Ordering::Release);
        }

        if mesh.quad_count() > 0 {
            let mut gpu = self.gpu.lock().unwrap();
            let handle =
                *gpu.get_or_insert_with(|| target.upload_mesh(mesh.vertices(), mesh.normals()));
            target.draw_quads(handle, mesh.quad_count());
        }

        true
    }

    /// Takes the node's GPU handle, if any, so the caller can discard it.
    /// Used when a node is evicted from the graph.
    pub fn take_gpu_handle(&self) -> Option<MeshHandle> {
        self.gpu.lock().unwrap().take()
    }

    /// Snapshot of the current mesh buffers.
    pub fn mesh_snapshot(&self) -> QuadMesh {
        self.mesh.lock().unwrap().clone()
    }

    /// Quad count of the cached mesh. Zero reads as stale or empty.
    pub fn quad_count(&self) -> usize {
        self.mesh.lock().unwrap().quad_count()
    }
}
